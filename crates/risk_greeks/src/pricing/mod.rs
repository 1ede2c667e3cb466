//! Portfolio pricing boundary.
//!
//! The engine never prices instruments itself; it hands a slice of trades
//! and a market model to a [`PortfolioPricer`] and gets back a price cube
//! keyed by `TradeId` and `TradeType`, one row per trade in input order.

mod analytic;
mod distributions;

pub use analytic::AnalyticPricer;
pub use distributions::norm_cdf;

use risk_cube::{CubeError, ResultCube, Schema};
use risk_market::market_data::{MarketDataError, MarketModel};
use risk_market::types::Currency;
use thiserror::Error;

use crate::columns::{TRADE_ID, TRADE_TYPE};
use crate::portfolio::Trade;

/// Pricing failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// A market object the trade needs is missing or unusable.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// Writing the price cube failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// The pricer does not handle this instrument.
    #[error("Unsupported instrument: {0}")]
    UnsupportedInstrument(String),

    /// Inputs produce no meaningful price.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Prices a slice of trades against a market model.
///
/// Implementations must return one row per trade, in input order, under a
/// schema whose first two columns are `TradeId` and `TradeType`. Values are
/// in `reporting_ccy`. Pricing must be deterministic for a given model.
pub trait PortfolioPricer: Send + Sync {
    /// Prices `trades` under `model`.
    fn price(
        &self,
        trades: &[Trade],
        model: &MarketModel,
        reporting_ccy: Currency,
    ) -> Result<ResultCube, PricingError>;
}

/// Schema of the cube a [`PortfolioPricer`] returns.
pub fn price_schema() -> Result<Schema, CubeError> {
    Schema::builder().string(TRADE_ID).string(TRADE_TYPE).build()
}
