//! Generic bump-and-revalue calculator.
//!
//! Every metric in this crate is the same loop over a different scenario
//! source:
//!
//! 1. select the trades the risk factor can move
//! 2. price them under the base model (`V0`)
//! 3. for each pillar, apply the scenario, cascade dependent curves and
//!    reprice (`V+`, and `V-` when two-sided)
//! 4. turn the price differences into sensitivities, rescale, drop zeros
//!
//! Scenario tasks run on rayon and write into local row buffers; the join
//! step appends them to one cube and sorts it.

mod config;
mod rescale;

pub use config::CalculatorConfig;
pub use rescale::UnitRescale;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use risk_cube::{CubeError, CubeValue, ResultCube, Schema};
use risk_market::market_data::{covering_pillar, MarketDataError, MarketModel};
use risk_market::types::Date;
use tracing::{debug, info, warn};

use crate::columns::{GREEK_COLUMNS, GREEK_SORT_ORDER, TRADE_ID, TRADE_TYPE};
use crate::dependency::{CurveDependencyGraph, RecalibrationCascade};
use crate::error::GreeksError;
use crate::parallel;
use crate::portfolio::{Portfolio, Trade};
use crate::pricing::PortfolioPricer;
use crate::scenarios::{FactorScenario, RiskFactorId, ScenarioSource};
use crate::selector::SubPortfolioSelector;

/// Finite-difference scheme.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Sidedness {
    /// `(V+ - V0) / h`
    #[default]
    OneSided,
    /// Central difference, optionally with a second-order term
    TwoSided,
}

/// One metric run: what to bump, by how much, and how to report it.
#[derive(Clone)]
pub struct GreekRequest<'a> {
    /// Scenario source of the risk factor
    pub source: &'a dyn ScenarioSource,
    /// Signed bump size `h`
    pub bump_size: f64,
    /// Difference scheme
    pub sidedness: Sidedness,
    /// Metric label of the first-order rows
    pub metric: String,
    /// Metric label of the second-order rows; only used when two-sided
    pub second_order_metric: Option<String>,
    /// Unit conversion applied to every row
    pub rescale: UnitRescale,
}

impl<'a> GreekRequest<'a> {
    /// One-sided request reporting `metric`.
    pub fn one_sided(
        source: &'a dyn ScenarioSource,
        bump_size: f64,
        metric: impl Into<String>,
    ) -> Self {
        Self {
            source,
            bump_size,
            sidedness: Sidedness::OneSided,
            metric: metric.into(),
            second_order_metric: None,
            rescale: UnitRescale::Identity,
        }
    }

    /// Two-sided request reporting `metric` and, if given, `second_order`.
    pub fn two_sided(
        source: &'a dyn ScenarioSource,
        bump_size: f64,
        metric: impl Into<String>,
        second_order: Option<String>,
    ) -> Self {
        Self {
            source,
            bump_size,
            sidedness: Sidedness::TwoSided,
            metric: metric.into(),
            second_order_metric: second_order,
            rescale: UnitRescale::Identity,
        }
    }

    /// Sets the unit rescale.
    pub fn with_rescale(mut self, rescale: UnitRescale) -> Self {
        self.rescale = rescale;
        self
    }
}

/// Schema of every Greek cube: the fixed columns followed by one string
/// column per pass-through tag.
pub fn output_schema(tags: &[String]) -> Result<Schema, CubeError> {
    let mut builder = Schema::builder();
    for column in GREEK_COLUMNS {
        builder = builder.string(column);
    }
    for tag in tags {
        builder = builder.string(tag.as_str());
    }
    builder.build()
}

type RowBuffer = Vec<(Vec<CubeValue>, f64)>;

/// Runs bump-and-revalue loops against a pricer.
#[derive(Clone)]
pub struct GreekCalculator {
    pricer: Arc<dyn PortfolioPricer>,
    config: CalculatorConfig,
    schema: Arc<Schema>,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl std::fmt::Debug for GreekCalculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreekCalculator")
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("dedicated_pool", &self.pool.is_some())
            .finish()
    }
}

impl GreekCalculator {
    /// Calculator pricing with `pricer`.
    ///
    /// Builds a dedicated rayon pool when `config.parallel.num_threads` is
    /// non-zero. Fails if a pass-through tag clashes with a Greek column.
    pub fn new(
        pricer: Arc<dyn PortfolioPricer>,
        config: CalculatorConfig,
    ) -> Result<Self, GreeksError> {
        let schema = Arc::new(output_schema(&config.pass_through_tags)?);
        let pool = match config.parallel.num_threads {
            0 => None,
            n => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("greeks-{}", i))
                    .build()
                    .map_err(|e| GreeksError::ThreadPool(e.to_string()))?,
            )),
        };
        Ok(Self {
            pricer,
            config,
            schema,
            pool,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// Pricer used for every revaluation.
    pub fn pricer(&self) -> &dyn PortfolioPricer {
        self.pricer.as_ref()
    }

    /// Shared output schema.
    pub fn output_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// Empty cube with the output schema.
    pub fn empty_cube(&self) -> ResultCube {
        ResultCube::with_shared_schema(self.output_schema())
    }

    /// Runs `op` on the dedicated pool if there is one.
    pub fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Computes one metric for the factor behind `request.source`.
    ///
    /// Returns an empty cube when no trade is exposed or every sensitivity
    /// is exactly zero. Any scenario failure aborts the whole call.
    pub fn calculate(
        &self,
        model: &MarketModel,
        graph: &CurveDependencyGraph,
        portfolio: &Portfolio,
        request: &GreekRequest<'_>,
    ) -> Result<ResultCube, GreeksError> {
        let start = Instant::now();
        let factor = request.source.risk_factor();
        let factor_label = factor.to_string();
        let h = request.bump_size;
        if h == 0.0 || !h.is_finite() {
            let detail = format!("bump size {} for {}", h, factor_label);
            return Err(MarketDataError::InvalidBump(detail).into());
        }

        let trades = SubPortfolioSelector::new(graph, self.config.reporting_currency)
            .select(portfolio, &factor);
        if trades.is_empty() {
            warn!(factor = %factor_label, metric = %request.metric, "No exposed trades, skipping");
            return Ok(self.empty_cube());
        }

        let base = self.pricer.price(&trades, model, self.config.reporting_currency)?;
        let id_col = base.column_index(TRADE_ID)?;
        let type_col = base.column_index(TRADE_TYPE)?;

        let horizon = if self.config.use_horizon {
            trades
                .iter()
                .map(|t| t.instrument().last_date())
                .max()
                .map(|last| match &factor {
                    RiskFactorId::Curve(name) | RiskFactorId::Benchmark(name) => {
                        read_horizon(model, graph, name, last, &mut Vec::new())
                    }
                    _ => last,
                })
        } else {
            None
        };

        let up = request.source.scenarios(model, h, horizon)?;
        let down = match request.sidedness {
            Sidedness::OneSided => None,
            Sidedness::TwoSided => Some(request.source.scenarios(model, -h, horizon)?),
        };
        let pairs = pair_scenarios(&factor_label, &up, down.as_deref())?;

        let by_id: HashMap<&str, &Trade> = trades.iter().map(|t| (t.id().as_str(), t)).collect();
        let task = ScenarioTask {
            calculator: self,
            model,
            cascade: RecalibrationCascade::new(graph, self.config.cascade),
            trades: &trades,
            by_id: &by_id,
            base: &base,
            id_col,
            type_col,
            factor: &factor_label,
            request,
        };

        let buffers = self.install(|| {
            parallel::try_map(&pairs, &self.config.parallel, |(up, down)| task.run(up, *down))
        })?;

        let mut cube = self.empty_cube();
        for (metadata, value) in buffers.into_iter().flatten() {
            cube.add_row(metadata, value)?;
        }
        cube.sort_by_columns(&GREEK_SORT_ORDER)?;

        info!(
            factor = %factor_label,
            metric = %request.metric,
            trades = trades.len(),
            scenarios = pairs.len(),
            rows = cube.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Greek calculated"
        );
        Ok(cube)
    }
}

/// Latest date of `curve` that a value dated on or before `last` can read.
///
/// A derived curve reads its parent at its own pillar dates, so each child
/// extends the horizon to its first pillar on or after the child's own
/// horizon.
fn read_horizon<'g>(
    model: &MarketModel,
    graph: &'g CurveDependencyGraph,
    curve: &'g str,
    last: Date,
    path: &mut Vec<&'g str>,
) -> Date {
    path.push(curve);
    let mut horizon = last;
    for child in graph.dependents(curve) {
        if path.contains(&child.as_str()) {
            continue;
        }
        let child_horizon = read_horizon(model, graph, child, last, path);
        let reach = model
            .curve(child)
            .ok()
            .and_then(|c| covering_pillar(c.pillars(), child_horizon))
            .map_or(child_horizon, |p| p.date);
        horizon = horizon.max(reach);
    }
    path.pop();
    horizon
}

fn pair_scenarios<'s>(
    factor: &str,
    up: &'s [FactorScenario],
    down: Option<&'s [FactorScenario]>,
) -> Result<Vec<(&'s FactorScenario, Option<&'s FactorScenario>)>, GreeksError> {
    let Some(down) = down else {
        return Ok(up.iter().map(|s| (s, None)).collect());
    };
    if up.len() != down.len() {
        return Err(GreeksError::ScenarioMismatch {
            factor: factor.to_string(),
            detail: format!("{} up scenarios, {} down", up.len(), down.len()),
        });
    }
    up.iter()
        .zip(down)
        .map(|(u, d)| {
            if u.pillar.label != d.pillar.label {
                Err(GreeksError::ScenarioMismatch {
                    factor: factor.to_string(),
                    detail: format!(
                        "up pillar {} paired with down pillar {}",
                        u.pillar.label, d.pillar.label
                    ),
                })
            } else {
                Ok((u, Some(d)))
            }
        })
        .collect()
}

/// Everything a scenario task reads. Shared across rayon workers.
struct ScenarioTask<'a> {
    calculator: &'a GreekCalculator,
    model: &'a MarketModel,
    cascade: RecalibrationCascade<'a>,
    trades: &'a [Trade],
    by_id: &'a HashMap<&'a str, &'a Trade>,
    base: &'a ResultCube,
    id_col: usize,
    type_col: usize,
    factor: &'a str,
    request: &'a GreekRequest<'a>,
}

impl ScenarioTask<'_> {
    fn run(
        &self,
        up: &FactorScenario,
        down: Option<&FactorScenario>,
    ) -> Result<RowBuffer, GreeksError> {
        let (v_up, v_down) = match down {
            None => (self.revalue(up)?, None),
            Some(down) => {
                let (a, b) = rayon::join(|| self.revalue(up), || self.revalue(down));
                (a?, Some(b?))
            }
        };

        let mismatch = |source: CubeError| GreeksError::StructuralMismatch {
            factor: self.factor.to_string(),
            pillar: up.pillar.label.clone(),
            source,
        };
        let up_diff = v_up.quick_difference(self.base).map_err(&mismatch)?;
        let down_diff = v_down
            .map(|v| self.base.quick_difference(&v))
            .transpose()
            .map_err(&mismatch)?;

        let h = self.request.bump_size;
        let scale = self.request.rescale.factor(self.model, &up.pillar)?;
        let mut rows = RowBuffer::new();
        for (i, row) in up_diff.rows().iter().enumerate() {
            let trade_id = &row.metadata()[self.id_col];
            let trade_type = &row.metadata()[self.type_col];
            let up_d = row.value() / h;
            let mut emit = |metric: &str, value: f64| -> Result<(), GreeksError> {
                self.push(&mut rows, trade_id, trade_type, &up.pillar.label, metric, value)
            };
            match &down_diff {
                None => emit(self.request.metric.as_str(), up_d * scale)?,
                Some(down_diff) => {
                    let down_d = down_diff.rows()[i].value() / h;
                    emit(self.request.metric.as_str(), 0.5 * (up_d + down_d) * scale)?;
                    if let Some(second) = &self.request.second_order_metric {
                        emit(second.as_str(), (up_d - down_d) / h * scale)?;
                    }
                }
            }
        }
        debug!(
            factor = %self.factor,
            pillar = %up.pillar.label,
            rows = rows.len(),
            "Scenario revalued"
        );
        Ok(rows)
    }

    fn revalue(&self, scenario: &FactorScenario) -> Result<ResultCube, GreeksError> {
        let mut bumped = self.request.source.apply(self.model, scenario)?;
        if let Some(curve) = scenario.perturbation.touched_curve() {
            self.cascade.run(&mut bumped, curve)?;
        }
        let config = self.calculator.config();
        Ok(self
            .calculator
            .pricer()
            .price(self.trades, &bumped, config.reporting_currency)?)
    }

    fn push(
        &self,
        rows: &mut RowBuffer,
        trade_id: &CubeValue,
        trade_type: &CubeValue,
        pillar: &str,
        metric: &str,
        value: f64,
    ) -> Result<(), GreeksError> {
        if value == 0.0 {
            return Ok(());
        }
        let config = self.calculator.config();
        if config.validate_results && !value.is_finite() {
            return Err(GreeksError::NonFiniteResult {
                metric: metric.to_string(),
                factor: self.factor.to_string(),
                trade: trade_id.to_string(),
                value,
            });
        }

        let trade = trade_id.as_str().and_then(|id| self.by_id.get(id));
        let mut metadata = Vec::with_capacity(GREEK_COLUMNS.len() + config.pass_through_tags.len());
        metadata.push(trade_id.clone());
        metadata.push(trade_type.clone());
        metadata.push(self.factor.into());
        metadata.push(pillar.into());
        metadata.push(metric.into());
        for tag in &config.pass_through_tags {
            let value = trade.and_then(|t| t.tag(tag)).unwrap_or_default();
            metadata.push(value.into());
        }
        rows.push((metadata, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Instrument;
    use crate::pricing::AnalyticPricer;
    use crate::scenarios::{CurveScenarioSource, RiskFactorId};
    use approx::assert_relative_eq;
    use risk_market::market_data::curves::{CurveEnum, PriceCurve, RateCurve};
    use risk_market::market_data::{BumpConvention, FxMatrix, Pillar};
    use risk_market::types::{Currency, Date};

    fn asof() -> Date {
        Date::from_ymd(2024, 1, 2).unwrap()
    }

    fn model() -> MarketModel {
        let pillars = vec![
            Pillar::new("6M", asof().add_days(182)),
            Pillar::new("1Y", asof().add_days(365)),
        ];
        let mut m = MarketModel::new(asof(), FxMatrix::new(Currency::USD));
        m.add_curve(CurveEnum::Price(
            PriceCurve::new("WTI", Currency::USD, pillars.clone(), vec![100.0, 100.0]).unwrap(),
        ));
        m.add_curve(CurveEnum::Rate(
            RateCurve::new("USD-OIS", Currency::USD, pillars, vec![0.0, 0.0]).unwrap(),
        ));
        m.set_discount_curve(Currency::USD, "USD-OIS");
        m
    }

    fn book() -> Portfolio {
        Portfolio::new(vec![Trade::new(
            "F1",
            Instrument::Forward {
                underlying: "WTI".to_string(),
                discount_curve: "USD-OIS".to_string(),
                currency: Currency::USD,
                delivery: asof().add_days(365),
                strike: 0.0,
                units: 10_000.0,
            },
        )
        .with_tag("Book", "ENERGY")])
        .unwrap()
    }

    fn calculator(tags: &[&str]) -> GreekCalculator {
        let config = CalculatorConfig::new().with_pass_through_tags(tags.iter().copied());
        GreekCalculator::new(Arc::new(AnalyticPricer::new()), config).unwrap()
    }

    #[test]
    fn test_output_schema_columns() {
        let schema = output_schema(&["Book".to_string()]).unwrap();
        assert_eq!(schema.len(), 6);
        assert_eq!(schema.index_of("Book"), Some(5));
        assert!(output_schema(&["Metric".to_string()]).is_err());
    }

    #[test]
    fn test_one_sided_delta_on_last_pillar() {
        let model = model();
        let graph = CurveDependencyGraph::build(&model).unwrap();
        let source = CurveScenarioSource::new("WTI", BumpConvention::Relative);
        let request = GreekRequest::one_sided(&source, 0.01, "Delta");

        let cube = calculator(&["Book"]).calculate(&model, &graph, &book(), &request).unwrap();

        // Only the 1Y pillar moves a 1Y forward.
        assert_eq!(cube.len(), 1);
        assert_eq!(cube.value_at(0, "PillarLabel").unwrap(), Some(&CubeValue::from("1Y")));
        assert_eq!(cube.value_at(0, "Book").unwrap(), Some(&CubeValue::from("ENERGY")));
        assert_relative_eq!(cube.rows()[0].value(), 1_000_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_untagged_trade_gets_empty_tag() {
        let model = model();
        let graph = CurveDependencyGraph::build(&model).unwrap();
        let source = CurveScenarioSource::new("WTI", BumpConvention::Relative);
        let request = GreekRequest::one_sided(&source, 0.01, "Delta");

        let cube = calculator(&["Desk"]).calculate(&model, &graph, &book(), &request).unwrap();
        assert_eq!(cube.value_at(0, "Desk").unwrap(), Some(&CubeValue::from("")));
    }

    #[test]
    fn test_zero_bump_rejected() {
        let model = model();
        let graph = CurveDependencyGraph::build(&model).unwrap();
        let source = CurveScenarioSource::new("WTI", BumpConvention::Relative);
        let request = GreekRequest::one_sided(&source, 0.0, "Delta");

        let result = calculator(&[]).calculate(&model, &graph, &book(), &request);
        assert!(matches!(result, Err(GreeksError::MarketData(MarketDataError::InvalidBump(_)))));
    }

    #[test]
    fn test_unexposed_factor_gives_empty_cube() {
        let model = model();
        let graph = CurveDependencyGraph::build(&model).unwrap();
        let source = CurveScenarioSource::new("BRENT", BumpConvention::Relative);
        assert_eq!(source.risk_factor(), RiskFactorId::curve("BRENT"));
        let request = GreekRequest::one_sided(&source, 0.01, "Delta");

        let calc = calculator(&[]);
        let cube = calc.calculate(&model, &graph, &book(), &request).unwrap();
        assert!(cube.is_empty());
        assert_eq!(cube.schema(), calc.output_schema().as_ref());
    }

    #[test]
    fn test_dedicated_pool_matches_global() {
        let model = model();
        let graph = CurveDependencyGraph::build(&model).unwrap();
        let source = CurveScenarioSource::new("WTI", BumpConvention::Relative);
        let request = GreekRequest::two_sided(&source, 0.01, "Delta", Some("Gamma".to_string()));

        let global = calculator(&[]).calculate(&model, &graph, &book(), &request).unwrap();
        let pooled = GreekCalculator::new(
            Arc::new(AnalyticPricer::new()),
            CalculatorConfig::new().with_parallel(parallel::ParallelConfig::new(1, 2)),
        )
        .unwrap()
        .calculate(&model, &graph, &book(), &request)
        .unwrap();
        assert_eq!(global, pooled);
    }
}
