//! Volatility surface parameter sensitivities: vega, rega and sega.

use risk_cube::ResultCube;
use risk_market::market_data::{BumpConvention, MarketModel, SurfaceParameter};

use super::{factor_not_found, MetricAdapter, MetricSettings, RiskContext};
use crate::calculator::UnitRescale;
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::{BumpMode, RiskFactorId, SurfaceScenarioSource};

/// ATM volatility sensitivity label.
pub const VEGA: &str = "Vega";
/// Skew sensitivity label.
pub const REGA: &str = "Rega";
/// Curvature sensitivity label.
pub const SEGA: &str = "Sega";

/// Reported per one volatility point.
const PER_VOL_POINT: f64 = 0.01;

/// Sensitivity to one parameter of every volatility surface, per expiry
/// pillar, reported per 1 vol point.
#[derive(Clone, Debug)]
pub struct VolParameterAdapter {
    parameter: SurfaceParameter,
    settings: MetricSettings,
}

impl VolParameterAdapter {
    /// 0.1% absolute, one-sided, per pillar.
    pub const DEFAULTS: MetricSettings = MetricSettings {
        bump_size: 0.001,
        convention: BumpConvention::Absolute,
        two_sided: false,
        mode: BumpMode::PerPillar,
    };

    /// Adapter for `parameter` with explicit settings.
    pub fn new(parameter: SurfaceParameter, settings: MetricSettings) -> Self {
        Self { parameter, settings }
    }

    /// ATM volatility.
    pub fn vega() -> Self {
        Self::new(SurfaceParameter::Atm, Self::DEFAULTS)
    }

    /// Skew.
    pub fn rega() -> Self {
        Self::new(SurfaceParameter::Skew, Self::DEFAULTS)
    }

    /// Curvature.
    pub fn sega() -> Self {
        Self::new(SurfaceParameter::Curvature, Self::DEFAULTS)
    }

    /// Adapter for `parameter` from its `[vega]`, `[rega]` or `[sega]`
    /// table.
    pub fn from_config(parameter: SurfaceParameter, config: &RiskConfig) -> Self {
        let overrides = match parameter {
            SurfaceParameter::Atm => &config.vega,
            SurfaceParameter::Skew => &config.rega,
            SurfaceParameter::Curvature => &config.sega,
        };
        Self::new(parameter, overrides.apply_to(Self::DEFAULTS))
    }

    /// Parameter bumped.
    pub fn parameter(&self) -> SurfaceParameter {
        self.parameter
    }
}

impl MetricAdapter for VolParameterAdapter {
    fn name(&self) -> &str {
        match self.parameter {
            SurfaceParameter::Atm => VEGA,
            SurfaceParameter::Skew => REGA,
            SurfaceParameter::Curvature => SEGA,
        }
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        model
            .surfaces()
            .map(|s| RiskFactorId::vol_surface(s.name(), self.parameter))
            .collect()
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let surface = match factor {
            RiskFactorId::VolSurface { surface, parameter }
                if *parameter == self.parameter && ctx.model().surface(surface).is_ok() =>
            {
                surface
            }
            _ => return Err(factor_not_found(self.name(), factor)),
        };
        let source =
            SurfaceScenarioSource::new(surface.clone(), self.parameter, self.settings.convention)
                .with_mode(self.settings.mode);
        let request = self
            .settings
            .request(&source, self.name(), None)
            .with_rescale(UnitRescale::Multiply(PER_VOL_POINT));
        ctx.calculate(&request)
    }
}
