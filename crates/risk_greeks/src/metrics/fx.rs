//! FX spot delta and gamma.

use risk_cube::ResultCube;
use risk_market::market_data::{BumpConvention, MarketModel};

use super::{factor_not_found, MetricAdapter, MetricSettings, RiskContext};
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::{BumpMode, FxSpotScenarioSource, RiskFactorId};

/// First-order metric label.
pub const FX_DELTA: &str = "FXDelta";
/// Second-order metric label.
pub const FX_GAMMA: &str = "FXGamma";

/// Delta and gamma to each FX spot quoted against the matrix base.
///
/// With relative bumps, delta is the value change per unit relative move
/// of the spot, in the reporting currency.
#[derive(Clone, Debug)]
pub struct FxDeltaGammaAdapter {
    settings: MetricSettings,
}

impl FxDeltaGammaAdapter {
    /// 1% relative, two-sided.
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

    /// Adapter from the `[fx]` table.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.fx.apply_to(Self::DEFAULTS))
    }
}

impl Default for FxDeltaGammaAdapter {
    fn default() -> Self {
        Self::new(Self::DEFAULTS)
    }
}

impl MetricAdapter for FxDeltaGammaAdapter {
    fn name(&self) -> &str {
        FX_DELTA
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        let base = model.fx().base();
        model
            .fx()
            .currencies()
            .filter(|ccy| *ccy != base)
            .map(RiskFactorId::FxSpot)
            .collect()
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let fx = ctx.model().fx();
        let ccy = match factor {
            RiskFactorId::FxSpot(ccy) if *ccy != fx.base() && fx.spot(*ccy).is_ok() => *ccy,
            _ => return Err(factor_not_found(FX_DELTA, factor)),
        };
        let source = FxSpotScenarioSource::new(ccy, self.settings.convention);
        let request = self.settings.request(&source, FX_DELTA, Some(FX_GAMMA));
        ctx.calculate(&request)
    }
}
