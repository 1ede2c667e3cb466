//! Asset price curves.

use super::pillar_values::PillarValues;
use crate::market_data::error::MarketDataError;
use crate::market_data::pillar::Pillar;
use crate::types::{Currency, Date};

/// Whether pillar values are spot-settled prices or forwards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum QuotingConvention {
    /// Values are spot prices
    #[default]
    Spot,
    /// Values are forward prices for delivery on the pillar date
    Forward,
}

/// Price of an underlying by delivery date.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceCurve {
    name: String,
    currency: Currency,
    convention: QuotingConvention,
    discount_curve: Option<String>,
    points: PillarValues,
}

impl PriceCurve {
    /// Spot-quoted curve. Prices must be strictly positive.
    pub fn new(
        name: impl Into<String>,
        currency: Currency,
        pillars: Vec<Pillar>,
        prices: Vec<f64>,
    ) -> Result<Self, MarketDataError> {
        let name = name.into();
        if let Some(&value) = prices.iter().find(|p| **p <= 0.0) {
            return Err(MarketDataError::InvalidValue { name, value });
        }
        let points = PillarValues::new(&name, pillars, prices)?;
        Ok(Self {
            name,
            currency,
            convention: QuotingConvention::Spot,
            discount_curve: None,
            points,
        })
    }

    /// Marks the curve as forward-quoted, discounted on `discount_curve`.
    pub fn forward_quoted(mut self, discount_curve: impl Into<String>) -> Self {
        self.convention = QuotingConvention::Forward;
        self.discount_curve = Some(discount_curve.into());
        self
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quote currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Quoting convention.
    pub fn convention(&self) -> QuotingConvention {
        self.convention
    }

    /// Discount curve used to de-discount forward-quoted sensitivities.
    pub fn discount_curve(&self) -> Option<&str> {
        self.discount_curve.as_deref()
    }

    /// Underlying pillar vector.
    pub fn points(&self) -> &PillarValues {
        &self.points
    }

    /// Price for delivery on `date`.
    pub fn price(&self, date: Date) -> f64 {
        self.points.value_at(date)
    }

    pub(crate) fn with_points(&self, points: PillarValues) -> Self {
        Self {
            points,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_prices() {
        let pillar = Pillar::new("1Y", Date::from_ymd(2025, 1, 1).unwrap());
        let err = PriceCurve::new("X", Currency::USD, vec![pillar], vec![0.0]).unwrap_err();
        assert!(matches!(err, MarketDataError::InvalidValue { .. }));
    }

    #[test]
    fn test_forward_quoted() {
        let pillar = Pillar::new("1Y", Date::from_ymd(2025, 1, 1).unwrap());
        let curve = PriceCurve::new("X", Currency::USD, vec![pillar], vec![100.0])
            .unwrap()
            .forward_quoted("USD-OIS");
        assert_eq!(curve.convention(), QuotingConvention::Forward);
        assert_eq!(curve.discount_curve(), Some("USD-OIS"));
    }
}
