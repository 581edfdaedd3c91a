//! Utility functions

pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let visible: String = local.chars().take(2).collect();
        if visible.is_empty() {
            format!("***{}", domain)
        } else {
            format!("{}***{}", visible, domain)
        }
    } else {
        "***".to_string()
    }
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email() {
        assert_eq!(mask_email("karim@example.com"), "ka***@example.com");
        assert_eq!(mask_email("a@b.c"), "a***@b.c");
        assert_eq!(mask_email("no-at-sign"), "***");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
