//! FX spot matrix against a single base currency.

use std::collections::BTreeMap;

use super::error::MarketDataError;
use crate::types::Currency;

/// Spot rates quoted as units of `base` per one unit of each currency.
///
/// Cross rates are derived through the base, so the matrix is always
/// triangularly consistent.
///
/// # Example
///
/// ```
/// use risk_market::market_data::FxMatrix;
/// use risk_market::types::Currency;
///
/// let fx = FxMatrix::new(Currency::USD)
///     .with_spot(Currency::EUR, 1.10).unwrap()
///     .with_spot(Currency::GBP, 1.25).unwrap();
/// let eurgbp = fx.rate(Currency::EUR, Currency::GBP).unwrap();
/// assert!((eurgbp - 0.88).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FxMatrix {
    base: Currency,
    spots: BTreeMap<Currency, f64>,
}

impl FxMatrix {
    /// Empty matrix for `base`.
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            spots: BTreeMap::new(),
        }
    }

    /// Base currency.
    pub fn base(&self) -> Currency {
        self.base
    }

    /// Non-base currencies with a spot, in code order.
    pub fn currencies(&self) -> impl Iterator<Item = Currency> + '_ {
        self.spots.keys().copied()
    }

    /// Units of base per one unit of `ccy`.
    pub fn spot(&self, ccy: Currency) -> Result<f64, MarketDataError> {
        if ccy == self.base {
            return Ok(1.0);
        }
        self.spots
            .get(&ccy)
            .copied()
            .ok_or(MarketDataError::FxSpotNotFound(ccy))
    }

    /// Units of `to` per one unit of `from`.
    pub fn rate(&self, from: Currency, to: Currency) -> Result<f64, MarketDataError> {
        Ok(self.spot(from)? / self.spot(to)?)
    }

    /// Sets or replaces the spot of `ccy` against base.
    pub fn set_spot(&mut self, ccy: Currency, spot: f64) -> Result<(), MarketDataError> {
        if ccy == self.base {
            return Err(MarketDataError::InvalidBump(format!(
                "cannot set the spot of base currency {}",
                ccy
            )));
        }
        if !spot.is_finite() || spot <= 0.0 {
            return Err(MarketDataError::InvalidValue {
                name: format!("{}/{}", ccy, self.base),
                value: spot,
            });
        }
        self.spots.insert(ccy, spot);
        Ok(())
    }

    /// Builder form of [`set_spot`](Self::set_spot).
    pub fn with_spot(mut self, ccy: Currency, spot: f64) -> Result<Self, MarketDataError> {
        self.set_spot(ccy, spot)?;
        Ok(self)
    }
}
