//! Zero-rate curves.

use super::pillar_values::PillarValues;
use crate::market_data::error::MarketDataError;
use crate::market_data::pillar::Pillar;
use crate::types::{Currency, Date};

/// Continuously compounded zero rates by maturity date.
#[derive(Clone, Debug, PartialEq)]
pub struct RateCurve {
    name: String,
    currency: Currency,
    points: PillarValues,
}

impl RateCurve {
    /// Builds a zero-rate curve.
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        pillars: Vec<Pillar>,
        zero_rates: Vec<f64>,
    ) -> Result<Self, MarketDataError> {
        let name = name.into();
        let points = PillarValues::new(&name, pillars, zero_rates)?;
        Ok(Self {
            name,
            currency,
            points,
        })
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Curve currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Underlying pillar vector.
    pub fn points(&self) -> &PillarValues {
        &self.points
    }

    /// Zero rate to `date`.
    pub fn zero_rate(&self, date: Date) -> f64 {
        self.points.value_at(date)
    }

    /// Discount factor from `asof` to `date`; 1 for dates not after `asof`.
    pub fn discount_factor(&self, asof: Date, date: Date) -> f64 {
        discount_factor(self.zero_rate(date), asof, date)
    }

    pub(crate) fn with_points(&self, points: PillarValues) -> Self {
        Self {
            points,
            ..self.clone()
        }
    }
}

#[inline]
pub(crate) fn discount_factor(zero_rate: f64, asof: Date, date: Date) -> f64 {
    let t = asof.year_fraction_to(date).max(0.0);
    (-zero_rate * t).exp()
}
