//! Curve construction from benchmark par quotes.

use risk_market::market_data::curves::{CurveEnum, RateCurve};
use risk_market::market_data::{MarketModel, Pillar};
use risk_market::types::Currency;

use crate::error::GreeksError;

/// Builds a curve from par quotes.
///
/// This is the boundary to a bootstrapping solver; the engine only needs
/// the solved curve back.
pub trait CurveStripper: Send + Sync {
    /// Strips `name` from `quotes` on `pillars`. `model` supplies any other
    /// curves the solver needs.
    fn strip(
        &self,
        name: &str,
        currency: Currency,
        pillars: &[Pillar],
        quotes: &[f64],
        model: &MarketModel,
    ) -> Result<CurveEnum, GreeksError>;
}

/// Treats each par quote as the continuously compounded zero rate at its
/// pillar.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroRateStripper;

impl CurveStripper for ZeroRateStripper {
    fn strip(
        &self,
        name: &str,
        currency: Currency,
        pillars: &[Pillar],
        quotes: &[f64],
        _model: &MarketModel,
    ) -> Result<CurveEnum, GreeksError> {
        let curve = RateCurve::new(name, currency, pillars.to_vec(), quotes.to_vec())?;
        Ok(CurveEnum::Rate(curve))
    }
}
