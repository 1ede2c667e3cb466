//! Portfolio: trades, instruments and identifiers.

mod error;
mod ids;
mod instrument;
mod trade;

pub use error::PortfolioError;
pub use ids::TradeId;
pub use instrument::{Instrument, OptionType};
pub use trade::Trade;

use std::collections::HashSet;

use risk_market::types::Date;

/// An ordered collection of trades with unique identifiers.
///
/// # Examples
///
/// ```
/// use risk_greeks::portfolio::{Instrument, Portfolio, Trade};
/// use risk_market::types::{Currency, Date};
///
/// let bond = Instrument::ZeroCouponBond {
///     discount_curve: "USD-OIS".to_string(),
///     currency: Currency::USD,
///     maturity: Date::from_ymd(2026, 1, 1).unwrap(),
///     notional: 1_000_000.0,
/// };
/// let portfolio = Portfolio::new(vec![Trade::new("ZCB-1", bond)]).unwrap();
/// assert_eq!(portfolio.len(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Portfolio {
    trades: Vec<Trade>,
}

impl Portfolio {
    /// Builds a portfolio, rejecting duplicate IDs and malformed terms.
    pub fn new(trades: Vec<Trade>) -> Result<Self, PortfolioError> {
        let mut portfolio = Self::default();
        for trade in trades {
            portfolio.add_trade(trade)?;
        }
        Ok(portfolio)
    }

    /// Appends a trade.
    pub fn add_trade(&mut self, trade: Trade) -> Result<(), PortfolioError> {
        if self.trades.iter().any(|t| t.id() == trade.id()) {
            return Err(PortfolioError::DuplicateTrade(trade.id().to_string()));
        }
        trade
            .instrument()
            .check_terms()
            .map_err(|reason| PortfolioError::InvalidInstrument {
                trade: trade.id().to_string(),
                reason,
            })?;
        self.trades.push(trade);
        Ok(())
    }

    /// Trades in booking order.
    #[inline]
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Number of trades.
    #[inline]
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// Whether the portfolio has no trades.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Trade by identifier.
    pub fn trade(&self, id: &str) -> Result<&Trade, PortfolioError> {
        self.trades
            .iter()
            .find(|t| t.id().as_str() == id)
            .ok_or_else(|| PortfolioError::TradeNotFound(id.to_string()))
    }

    /// Latest [`Instrument::last_date`] across the book.
    pub fn last_date(&self) -> Option<Date> {
        self.trades.iter().map(|t| t.instrument().last_date()).max()
    }

    /// Every identifier referenced by any trade.
    pub fn references(&self) -> HashSet<String> {
        self.trades
            .iter()
            .flat_map(|t| t.instrument().references())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_market::types::Currency;

    fn bond(id: &str, years: i32) -> Trade {
        Trade::new(
            id,
            Instrument::ZeroCouponBond {
                discount_curve: "USD-OIS".to_string(),
                currency: Currency::USD,
                maturity: Date::from_ymd(2024 + years, 1, 1).unwrap(),
                notional: 100.0,
            },
        )
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Portfolio::new(vec![bond("T1", 1), bond("T1", 2)]).unwrap_err();
        assert_eq!(err, PortfolioError::DuplicateTrade("T1".to_string()));
    }

    #[test]
    fn test_last_date_and_lookup() {
        let portfolio = Portfolio::new(vec![bond("T1", 1), bond("T2", 5)]).unwrap();
        assert_eq!(portfolio.last_date(), Some(Date::from_ymd(2029, 1, 1).unwrap()));
        assert!(portfolio.trade("T2").is_ok());
        assert!(matches!(portfolio.trade("T3"), Err(PortfolioError::TradeNotFound(_))));
        assert!(Portfolio::default().last_date().is_none());
    }

    #[test]
    fn test_tags() {
        let trade = bond("T1", 1).with_tag("Book", "RATES").with_tag("Desk", "NY");
        assert_eq!(trade.tag("Book"), Some("RATES"));
        assert_eq!(trade.tag("Strategy"), None);
    }
}
