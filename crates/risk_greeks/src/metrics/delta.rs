//! Price curve delta and gamma.

use risk_cube::ResultCube;
use risk_market::market_data::curves::{CurveEnum, CurveKind};
use risk_market::market_data::{BumpConvention, MarketModel};

use super::{factor_not_found, MetricAdapter, MetricSettings, RiskContext};
use crate::calculator::UnitRescale;
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::{BumpMode, CurveScenarioSource, RiskFactorId};

/// First-order metric label.
pub const DELTA: &str = "Delta";
/// Second-order metric label.
pub const GAMMA: &str = "Gamma";

/// Delta and gamma to every pillar of price curves, including basis
/// curves over price curves.
///
/// Delta is per unit relative move when bumps are relative. Sensitivities
/// to forward-quoted curves are divided by the discount factor to the
/// pillar.
///
/// A basis curve's own factor bumps its spread, not its price level, so a
/// relative basis Delta is per unit relative move in the spread. Moves in
/// the parent's price reach basis trades through the parent's factor.
#[derive(Clone, Debug)]
pub struct DeltaGammaAdapter {
    settings: MetricSettings,
}

impl DeltaGammaAdapter {
    /// 1% relative, two-sided, per pillar.
    pub const DEFAULTS: MetricSettings = MetricSettings {
        bump_size: 0.01,
        convention: BumpConvention::Relative,
        two_sided: true,
        mode: BumpMode::PerPillar,
    };

    /// Adapter with explicit settings.
    pub fn new(settings: MetricSettings) -> Self {
        Self { settings }
    }

    /// Adapter from the `[delta]` table.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.delta.apply_to(Self::DEFAULTS))
    }

    /// Active settings.
    pub fn settings(&self) -> &MetricSettings {
        &self.settings
    }

    fn price_curve<'m>(
        &self,
        model: &'m MarketModel,
        factor: &RiskFactorId,
    ) -> Result<&'m CurveEnum, GreeksError> {
        match factor {
            RiskFactorId::Curve(name) => match model.curve(name) {
                Ok(curve) if curve.kind() == CurveKind::Price => Ok(curve),
                _ => Err(factor_not_found(DELTA, factor)),
            },
            _ => Err(factor_not_found(DELTA, factor)),
        }
    }
}

impl Default for DeltaGammaAdapter {
    fn default() -> Self {
        Self::new(Self::DEFAULTS)
    }
}

impl MetricAdapter for DeltaGammaAdapter {
    fn name(&self) -> &str {
        DELTA
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        model
            .curves()
            .filter(|c| c.kind() == CurveKind::Price)
            .map(|c| RiskFactorId::curve(c.name()))
            .collect()
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let curve = self.price_curve(ctx.model(), factor)?;
        let source = CurveScenarioSource::new(curve.name(), self.settings.convention)
            .with_mode(self.settings.mode);
        let rescale = match curve.forward_discount_curve() {
            Some(discount_curve) => UnitRescale::ForwardDeDiscount {
                discount_curve: discount_curve.to_string(),
            },
            None => UnitRescale::Identity,
        };
        let request = self.settings.request(&source, DELTA, Some(GAMMA)).with_rescale(rescale);
        ctx.calculate(&request)
    }
}
