//! Metric adapters: thin bindings of risk factor kinds to the calculator.
//!
//! Each adapter knows which factors of the market model it covers, which
//! scenario source bumps them, the bump defaults, and how to label and
//! rescale the result. All of the numerical work happens in
//! [`GreekCalculator`].

mod charm;
mod delta;
mod fx;
mod rates;
mod theta;
mod vol;

pub use charm::{CharmAdapter, CHARM};
pub use delta::{DeltaGammaAdapter, DELTA, GAMMA};
pub use fx::{FxDeltaGammaAdapter, FX_DELTA, FX_GAMMA};
pub use rates::{BenchmarkRiskAdapter, IrDeltaAdapter, BENCHMARK_DELTA, IR_DELTA};
pub use theta::{ThetaAdapter, THETA};
pub use vol::{VolParameterAdapter, REGA, SEGA, VEGA};

use std::sync::Arc;
use std::time::Instant;

use risk_cube::ResultCube;
use risk_market::market_data::{BumpConvention, MarketModel};
use tracing::info;

use crate::calculator::{GreekCalculator, GreekRequest};
use crate::columns::GREEK_SORT_ORDER;
use crate::dependency::CurveDependencyGraph;
use crate::error::GreeksError;
use crate::parallel;
use crate::portfolio::Portfolio;
use crate::scenarios::{BumpMode, RiskFactorId, ScenarioSource};

/// Bump settings of one metric.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MetricSettings {
    /// Bump size `h`
    pub bump_size: f64,
    /// Absolute or relative bumps
    pub convention: BumpConvention,
    /// Central differences
    pub two_sided: bool,
    /// Per-pillar or parallel scenarios
    pub mode: BumpMode,
}

impl MetricSettings {
    /// Request for `source` labelled `metric`. The second-order label is
    /// only used when two-sided.
    pub fn request<'s>(
        &self,
        source: &'s dyn ScenarioSource,
        metric: &str,
        second_order: Option<&str>,
    ) -> GreekRequest<'s> {
        if self.two_sided {
            GreekRequest::two_sided(
                source,
                self.bump_size,
                metric,
                second_order.map(str::to_string),
            )
        } else {
            GreekRequest::one_sided(source, self.bump_size, metric)
        }
    }
}

/// Everything a metric run reads: market, book, calculator and the
/// dependency graph built once from the market.
#[derive(Clone, Debug)]
pub struct RiskContext<'a> {
    model: &'a MarketModel,
    portfolio: &'a Portfolio,
    calculator: &'a GreekCalculator,
    graph: Arc<CurveDependencyGraph>,
}

impl<'a> RiskContext<'a> {
    /// Builds and validates the dependency graph of `model`.
    pub fn new(
        model: &'a MarketModel,
        portfolio: &'a Portfolio,
        calculator: &'a GreekCalculator,
    ) -> Result<Self, GreeksError> {
        let graph = CurveDependencyGraph::build(model)?;
        Ok(Self {
            model,
            portfolio,
            calculator,
            graph: Arc::new(graph),
        })
    }

    /// Same book, calculator and graph over another model with the same
    /// curves, e.g. a rolled valuation date.
    pub fn with_model<'b>(&'b self, model: &'b MarketModel) -> RiskContext<'b> {
        RiskContext {
            model,
            portfolio: self.portfolio,
            calculator: self.calculator,
            graph: Arc::clone(&self.graph),
        }
    }

    /// Base market model.
    pub fn model(&self) -> &'a MarketModel {
        self.model
    }

    /// Portfolio.
    pub fn portfolio(&self) -> &'a Portfolio {
        self.portfolio
    }

    /// Calculator.
    pub fn calculator(&self) -> &'a GreekCalculator {
        self.calculator
    }

    /// Curve dependency graph.
    pub fn graph(&self) -> &CurveDependencyGraph {
        &self.graph
    }

    /// Runs `request` through the calculator.
    pub fn calculate(&self, request: &GreekRequest<'_>) -> Result<ResultCube, GreeksError> {
        self.calculator
            .calculate(self.model, &self.graph, self.portfolio, request)
    }
}

/// One kind of Greek.
pub trait MetricAdapter: Send + Sync {
    /// Metric group label, e.g. `Delta` or `Vega`.
    fn name(&self) -> &str;

    /// Every factor of this kind in `model`, in a stable order.
    fn factors(&self, model: &MarketModel) -> Vec<RiskFactorId>;

    /// Sensitivities to one factor. Fails with
    /// [`GreeksError::RiskFactorNotFound`] if `factor` is not of this kind
    /// or not in the model.
    fn compute(
        &self,
        ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError>;

    /// Sensitivities to every factor, one rayon task per factor.
    fn compute_all(&self, ctx: &RiskContext<'_>) -> Result<ResultCube, GreeksError> {
        let start = Instant::now();
        let factors = self.factors(ctx.model());
        let calculator = ctx.calculator();

        let cubes = calculator.install(|| {
            parallel::try_map(&factors, &calculator.config().parallel, |factor| {
                self.compute(ctx, factor)
            })
        })?;

        let mut out = calculator.empty_cube();
        for cube in &cubes {
            out.extend_from(cube)?;
        }
        out.sort_by_columns(&GREEK_SORT_ORDER)?;

        info!(
            metric = self.name(),
            factors = factors.len(),
            rows = out.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Metric computed"
        );
        Ok(out)
    }
}

pub(crate) fn factor_not_found(adapter: &str, factor: &RiskFactorId) -> GreeksError {
    GreeksError::RiskFactorNotFound(format!("{} ({} adapter)", factor, adapter))
}
