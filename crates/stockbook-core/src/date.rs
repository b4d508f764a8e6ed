//! # Day Format
//!
//! Dates are `NaiveDate` everywhere inside the core. The `DD/MM/YYYY` text
//! form survives only at the storage boundary, where older data was written
//! that way.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// Legacy text form of a day (`15/03/2024`).
pub const DAY_FORMAT: &str = "%d/%m/%Y";

/// Parses a `DD/MM/YYYY` day, falling back to ISO `YYYY-MM-DD`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use stockbook_core::date::parse_day;
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(parse_day("05/03/2024").unwrap(), day);
/// assert_eq!(parse_day("2024-03-05").unwrap(), day);
/// assert!(parse_day("31/02/2024").is_err());
/// ```
pub fn parse_day(text: &str) -> ValidationResult<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .map_err(|e| ValidationError::InvalidFormat {
            field: "date".to_string(),
            reason: format!("'{}': {}", text, e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_legacy_and_iso_agree() {
        let day = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(parse_day("31/12/1999").unwrap(), day);
        assert_eq!(parse_day("1999-12-31").unwrap(), day);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_day("").is_err());
        assert!(parse_day("yesterday").is_err());
        assert!(parse_day("13/13/2024").is_err());
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(parse_day(" 02/01/2024 ").unwrap(), day);
    }
}
