//! Theta: value change over a valuation date roll.

use risk_cube::ResultCube;
use risk_market::market_data::{BumpConvention, MarketModel};

use super::{factor_not_found, MetricAdapter, MetricSettings, RiskContext};
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::{BumpMode, RiskFactorId, ThetaSource};

/// Metric label.
pub const THETA: &str = "Theta";

/// Value change per day of a forward roll, with every market object held
/// fixed.
#[derive(Clone, Debug)]
pub struct ThetaAdapter {
    settings: MetricSettings,
}

impl ThetaAdapter {
    /// One day, one-sided.
    pub const DEFAULTS: MetricSettings = MetricSettings {
        bump_size: 1.0,
        convention: BumpConvention::Absolute,
        two_sided: false,
        mode: BumpMode::PerPillar,
    };

    /// Adapter with explicit settings. `bump_size` is in days.
    pub fn new(settings: MetricSettings) -> Self {
        Self { settings }
    }

    /// Adapter from the `[theta]` table.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.theta.apply_to(Self::DEFAULTS))
    }
}

impl Default for ThetaAdapter {
    fn default() -> Self {
        Self::new(Self::DEFAULTS)
    }
}

impl MetricAdapter for ThetaAdapter {
    fn name(&self) -> &str {
        THETA
    }

    fn factors(&self, _model: &MarketModel) -> Vec<RiskFactorId> {
        vec![RiskFactorId::Time]
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        if *factor != RiskFactorId::Time {
            return Err(factor_not_found(THETA, factor));
        }
        let request = self.settings.request(&ThetaSource, THETA, None);
        ctx.calculate(&request)
    }
}
