//! Charm: change in delta over a valuation date roll.

use risk_cube::{CubeValue, ResultCube};
use risk_market::market_data::{MarketDataError, MarketModel};

use super::{DeltaGammaAdapter, MetricAdapter, RiskContext, DELTA};
use crate::columns::{GREEK_SORT_ORDER, METRIC};
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::RiskFactorId;

/// Metric label.
pub const CHARM: &str = "Charm";

/// `(Delta(t + n) - Delta(t)) / n` per price curve pillar.
///
/// Delta rows are matched on their full metadata, so a pillar that only
/// carries delta on one of the two dates still reports charm.
#[derive(Clone, Debug)]
pub struct CharmAdapter {
    delta: DeltaGammaAdapter,
    roll_days: u32,
}

impl CharmAdapter {
    /// Charm over `roll_days` using `delta`'s bump settings.
    pub fn new(delta: DeltaGammaAdapter, roll_days: u32) -> Self {
        Self { delta, roll_days }
    }

    /// Adapter from the `[delta]` and `[charm]` tables.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(DeltaGammaAdapter::from_config(config), config.charm.roll_days)
    }

    fn delta_rows(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let cube = self.delta.compute(ctx, factor)?;
        Ok(cube.filter(&[(METRIC, CubeValue::from(DELTA))], false)?)
    }
}

impl Default for CharmAdapter {
    fn default() -> Self {
        Self::new(DeltaGammaAdapter::default(), 1)
    }
}

impl MetricAdapter for CharmAdapter {
    fn name(&self) -> &str {
        CHARM
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        self.delta.factors(model)
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        if self.roll_days == 0 {
            return Err(MarketDataError::InvalidBump("charm roll of zero days".to_string()).into());
        }
        let days = i64::from(self.roll_days);

        let today = self.delta_rows(ctx, factor)?;
        let rolled = ctx.model().rolled_to(ctx.model().valuation_date().add_days(days));
        let tomorrow = self.delta_rows(&ctx.with_model(&rolled), factor)?;

        let mut charm = tomorrow
            .difference(&today)?
            .with_constant_columns(&[(METRIC, CubeValue::from(CHARM))], true)?
            .map_values(|v| v / days as f64);
        charm.retain_non_zero();
        charm.sort_by_columns(&GREEK_SORT_ORDER)?;
        Ok(charm)
    }
}
