//! Portfolio error types.

use thiserror::Error;

/// Errors raised while building or querying a portfolio.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PortfolioError {
    /// Trade not found in portfolio.
    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    /// Duplicate trade ID encountered.
    #[error("Duplicate trade ID: {0}")]
    DuplicateTrade(String),

    /// Instrument terms are unusable.
    #[error("Invalid instrument in trade {trade}: {reason}")]
    InvalidInstrument {
        /// Trade identifier
        trade: String,
        /// What is wrong
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            PortfolioError::DuplicateTrade("T1".to_string()).to_string(),
            "Duplicate trade ID: T1"
        );
        let err = PortfolioError::InvalidInstrument {
            trade: "T2".to_string(),
            reason: "units must be finite".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid instrument in trade T2: units must be finite");
    }
}
