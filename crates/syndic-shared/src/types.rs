//! Common types

use chrono::Utc;
use rand::Rng;

const ID_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_SUFFIX_LENGTH: usize = 9;

/// Client-generated document id: timestamp plus random suffix, e.g. `1718000000000-k3j9x0a2b`.
pub fn new_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LENGTH)
        .map(|_| ID_SUFFIX_ALPHABET[rng.random_range(0..ID_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_new_id_shape() {
        let id = new_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LENGTH);
    }

    #[test]
    fn test_new_id_distinct() {
        let ids: HashSet<_> = (0..500).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 500);
    }
}
