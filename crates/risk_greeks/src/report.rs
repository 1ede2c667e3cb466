//! Composite risk reports.
//!
//! A report runs a list of metric adapters and merges their cubes into one,
//! tagged with a `MetricGroup` column and any run-level constants.

use std::sync::Arc;
use std::time::Instant;

use risk_cube::{CubeValue, ResultCube};
use risk_market::market_data::{MarketModel, SurfaceParameter};
use risk_market::types::Date;
use tracing::info;

use crate::columns::{GREEK_SORT_ORDER, METRIC_GROUP, VALUATION_DATE};
use crate::config::{MetricKind, RiskConfig};
use crate::error::GreeksError;
use crate::metrics::{
    BenchmarkRiskAdapter, CharmAdapter, DeltaGammaAdapter, FxDeltaGammaAdapter, IrDeltaAdapter,
    MetricAdapter, RiskContext, ThetaAdapter, VolParameterAdapter,
};
use crate::scenarios::CurveStripper;

/// Builds a composite cube from several metrics.
///
/// Any failing metric fails the whole report.
#[derive(Default)]
pub struct RiskReportBuilder {
    adapters: Vec<Box<dyn MetricAdapter>>,
    run_tags: Vec<(String, CubeValue)>,
}

impl RiskReportBuilder {
    /// Empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters for every metric listed in `config.metrics`, in order.
    ///
    /// Benchmark risk strips `model`'s zero-rate curves with `stripper`.
    pub fn from_config(
        config: &RiskConfig,
        model: &MarketModel,
        stripper: Arc<dyn CurveStripper>,
    ) -> Result<Self, GreeksError> {
        let mut builder = Self::new();
        for kind in &config.metrics {
            builder = match kind {
                MetricKind::Delta => builder.with_adapter(DeltaGammaAdapter::from_config(config)),
                MetricKind::Vega => builder
                    .with_adapter(VolParameterAdapter::from_config(SurfaceParameter::Atm, config)),
                MetricKind::Rega => builder
                    .with_adapter(VolParameterAdapter::from_config(SurfaceParameter::Skew, config)),
                MetricKind::Sega => builder.with_adapter(VolParameterAdapter::from_config(
                    SurfaceParameter::Curvature,
                    config,
                )),
                MetricKind::IrDelta => builder.with_adapter(IrDeltaAdapter::from_config(config)),
                MetricKind::Fx => builder.with_adapter(FxDeltaGammaAdapter::from_config(config)),
                MetricKind::Theta => builder.with_adapter(ThetaAdapter::from_config(config)),
                MetricKind::Charm => builder.with_adapter(CharmAdapter::from_config(config)),
                MetricKind::Benchmark => builder.with_adapter(BenchmarkRiskAdapter::from_config(
                    config,
                    model,
                    Arc::clone(&stripper),
                )?),
            };
        }
        Ok(builder)
    }

    /// Appends a metric.
    pub fn with_adapter(mut self, adapter: impl MetricAdapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Adds a constant column to every row.
    pub fn with_tag(mut self, name: impl Into<String>, value: impl Into<CubeValue>) -> Self {
        self.run_tags.push((name.into(), value.into()));
        self
    }

    /// Adds a `ValuationDate` column.
    pub fn with_valuation_date_tag(self, date: Date) -> Self {
        self.with_tag(VALUATION_DATE, date.into_inner())
    }

    /// Number of metrics.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no metric was added.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Runs every metric and merges the results.
    ///
    /// Rows are sorted by metric group, then risk factor, pillar, trade and
    /// metric.
    pub fn build(&self, ctx: &RiskContext<'_>) -> Result<ResultCube, GreeksError> {
        let start = Instant::now();
        let mut report = ResultCube::empty();
        for adapter in &self.adapters {
            let cube = adapter.compute_all(ctx)?;
            let mut constants: Vec<(&str, CubeValue)> = vec![(METRIC_GROUP, adapter.name().into())];
            constants.extend(self.run_tags.iter().map(|(k, v)| (k.as_str(), v.clone())));
            report = report.merge(&cube, &constants, false)?;
        }

        if !report.is_empty() {
            let mut order = vec![METRIC_GROUP];
            order.extend(GREEK_SORT_ORDER);
            report.sort_by_columns(&order)?;
        }

        info!(
            metrics = self.adapters.len(),
            rows = report.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Risk report built"
        );
        Ok(report)
    }
}
