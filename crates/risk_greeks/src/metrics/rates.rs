//! Interest rate sensitivities: zero-rate delta and benchmark par-quote
//! delta.

use std::sync::Arc;

use risk_cube::ResultCube;
use risk_market::market_data::curves::{CurveEnum, CurveKind};
use risk_market::market_data::{BumpConvention, MarketModel};

use super::{factor_not_found, MetricAdapter, MetricSettings, RiskContext};
use crate::calculator::UnitRescale;
use crate::config::RiskConfig;
use crate::error::GreeksError;
use crate::scenarios::{
    BenchmarkQuotes, BenchmarkScenarioSource, BumpMode, CurveScenarioSource, CurveStripper,
    RiskFactorId,
};

/// Zero-rate delta label.
pub const IR_DELTA: &str = "IRDelta";
/// Par-quote delta label.
pub const BENCHMARK_DELTA: &str = "BenchmarkDelta";

const PER_BASIS_POINT: f64 = 1e-4;

/// Delta to every pillar of rate curves, per basis point.
#[derive(Clone, Debug)]
pub struct IrDeltaAdapter {
    settings: MetricSettings,
}

impl IrDeltaAdapter {
    /// 1bp absolute, one-sided, per pillar.
    pub const DEFAULTS: MetricSettings = MetricSettings {
        bump_size: 1e-4,
        convention: BumpConvention::Absolute,
        two_sided: false,
        mode: BumpMode::PerPillar,
    };

    /// Adapter with explicit settings.
    pub fn new(settings: MetricSettings) -> Self {
        Self { settings }
    }

    /// Adapter from the `[ir_delta]` table.
    pub fn from_config(config: &RiskConfig) -> Self {
        Self::new(config.ir_delta.apply_to(Self::DEFAULTS))
    }
}

impl Default for IrDeltaAdapter {
    fn default() -> Self {
        Self::new(Self::DEFAULTS)
    }
}

impl MetricAdapter for IrDeltaAdapter {
    fn name(&self) -> &str {
        IR_DELTA
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        model
            .curves()
            .filter(|c| c.kind() == CurveKind::Rate)
            .map(|c| RiskFactorId::curve(c.name()))
            .collect()
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let is_rate =
            |name: &str| matches!(ctx.model().curve(name), Ok(c) if c.kind() == CurveKind::Rate);
        let name = match factor {
            RiskFactorId::Curve(name) if is_rate(name) => name,
            _ => return Err(factor_not_found(IR_DELTA, factor)),
        };
        let source = CurveScenarioSource::new(name.clone(), self.settings.convention)
            .with_mode(self.settings.mode);
        let request = self
            .settings
            .request(&source, IR_DELTA, None)
            .with_rescale(UnitRescale::Multiply(PER_BASIS_POINT));
        ctx.calculate(&request)
    }
}

/// Delta to the par quotes a curve is stripped from, per basis point.
///
/// The configured convention and mode apply to the quotes, so a relative
/// bump moves each quote by a fraction of itself.
///
/// Each scenario bumps one quote, re-strips the curve through the
/// [`CurveStripper`] and cascades the result to dependent curves. The
/// base model's curve is expected to be the strip of the unbumped quotes.
#[derive(Clone)]
pub struct BenchmarkRiskAdapter {
    quotes: Vec<BenchmarkQuotes>,
    stripper: Arc<dyn CurveStripper>,
    settings: MetricSettings,
}

impl std::fmt::Debug for BenchmarkRiskAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkRiskAdapter")
            .field("quotes", &self.quotes)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BenchmarkRiskAdapter {
    /// 1bp absolute, one-sided.
    pub const DEFAULTS: MetricSettings = MetricSettings {
        bump_size: 1e-4,
        convention: BumpConvention::Absolute,
        two_sided: false,
        mode: BumpMode::PerPillar,
    };

    /// Adapter over explicit quote sets.
    pub fn new(
        quotes: Vec<BenchmarkQuotes>,
        stripper: Arc<dyn CurveStripper>,
        settings: MetricSettings,
    ) -> Self {
        Self {
            quotes,
            stripper,
            settings,
        }
    }

    /// Uses each zero-rate curve of `model` as its own quote set.
    pub fn from_rate_curves(
        model: &MarketModel,
        stripper: Arc<dyn CurveStripper>,
        settings: MetricSettings,
    ) -> Result<Self, GreeksError> {
        let quotes = model
            .curves()
            .filter(|c| matches!(c, CurveEnum::Rate(_)))
            .map(BenchmarkQuotes::from_rate_curve)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(quotes, stripper, settings))
    }

    /// Adapter from the `[benchmark]` table over `model`'s rate curves.
    pub fn from_config(
        config: &RiskConfig,
        model: &MarketModel,
        stripper: Arc<dyn CurveStripper>,
    ) -> Result<Self, GreeksError> {
        Self::from_rate_curves(model, stripper, config.benchmark.apply_to(Self::DEFAULTS))
    }
}

impl MetricAdapter for BenchmarkRiskAdapter {
    fn name(&self) -> &str {
        BENCHMARK_DELTA
    }

    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId> {
        self.quotes
            .iter()
            .filter(|q| model.has_curve(&q.curve))
            .map(|q| RiskFactorId::benchmark(q.curve.clone()))
            .collect()
    }

    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        let quotes = match factor {
            RiskFactorId::Benchmark(name) => self.quotes.iter().find(|q| &q.curve == name),
            _ => None,
        }
        .ok_or_else(|| factor_not_found(BENCHMARK_DELTA, factor))?;

        let source = BenchmarkScenarioSource::new(quotes.clone(), Arc::clone(&self.stripper))
            .with_convention(self.settings.convention)
            .with_mode(self.settings.mode);
        let request = self
            .settings
            .request(&source, BENCHMARK_DELTA, None)
            .with_rescale(UnitRescale::Multiply(PER_BASIS_POINT));
        ctx.calculate(&request)
    }
}
