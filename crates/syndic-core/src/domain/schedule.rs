//! Date and time strings as stored in documents (`DD/MM/YYYY`, `HH:mm`)

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use syndic_shared::constants::{DATE_FORMAT, TIME_FORMAT};

use crate::error::DomainError;

pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::validation(format!("Invalid date '{}', expected DD/MM/YYYY", value)))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| DomainError::validation(format!("Invalid time '{}', expected HH:mm", value)))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn combine(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_date(date).ok()?;
    let time = parse_time(time).ok()?;
    Some(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("05/03/2024").unwrap();
        assert_eq!(format_date(date), "05/03/2024");
        assert!(parse_date("2024-03-05").is_err());
        assert!(parse_date("31/02/2024").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert!(parse_time("18:30").is_ok());
        assert!(parse_time("25:00").is_err());
        assert!(combine("05/03/2024", "9:15").is_some());
    }
}
