//! Error types for dates and currencies.

use thiserror::Error;

/// Errors raised while constructing or parsing dates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    /// Components do not form a calendar date.
    #[error("Invalid date: {year}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year component
        year: i32,
        /// Month component
        month: u32,
        /// Day component
        day: u32,
    },

    /// String is not an ISO 8601 date.
    #[error("Failed to parse date: {0}")]
    ParseError(String),
}

/// Errors raised while resolving currencies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurrencyError {
    /// Currency code is not supported.
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_error_display() {
        let err = DateError::InvalidDate {
            year: 2024,
            month: 2,
            day: 30,
        };
        assert_eq!(format!("{}", err), "Invalid date: 2024-02-30");

        let err = DateError::ParseError("yesterday".to_string());
        assert_eq!(format!("{}", err), "Failed to parse date: yesterday");
    }

    #[test]
    fn test_currency_error_display() {
        let err = CurrencyError::UnknownCurrency("XXX".to_string());
        assert_eq!(format!("{}", err), "Unknown currency code: XXX");
    }
}
