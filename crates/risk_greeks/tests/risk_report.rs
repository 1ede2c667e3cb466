//! Composite reports and configuration-driven runs.

mod common;

use std::sync::Arc;

use risk_cube::{CubeValue, ResultCube};
use risk_greeks::columns::{METRIC_GROUP, VALUATION_DATE};
use risk_greeks::config::{MetricKind, RiskConfig};
use risk_greeks::metrics::{
    DeltaGammaAdapter, MetricAdapter, RiskContext, ThetaAdapter, VolParameterAdapter,
};
use risk_greeks::scenarios::{RiskFactorId, ZeroRateStripper};
use risk_greeks::{GreekCalculator, GreeksError, RiskReportBuilder};
use risk_market::market_data::MarketModel;

use common::*;

/// Always fails.
struct BrokenAdapter;

impl MetricAdapter for BrokenAdapter {
    fn name(&self) -> &str {
        "Broken"
    }

    fn factors(&self, _model: &MarketModel) -> Vec<RiskFactorId> {
        vec![RiskFactorId::curve("WTI")]
    }

    fn compute(
        &self,
        _ctx: &RiskContext<'_>,
        factor: &RiskFactorId,
    ) -> Result<ResultCube, GreeksError> {
        Err(GreeksError::RiskFactorNotFound(factor.to_string()))
    }
}

fn groups(cube: &ResultCube) -> Vec<String> {
    let mut out: Vec<String> = (0..cube.len())
        .filter_map(|i| cube.value_at(i, METRIC_GROUP).unwrap().map(|v| v.to_string()))
        .collect();
    out.dedup();
    out
}

#[test]
fn test_report_merges_metric_groups() {
    let model = market_with_rates(0.02);
    let portfolio = book(vec![forward("F1", "WTI", 10.0), call("C1", 100.0)]);
    let calc = calculator();
    let ctx = RiskContext::new(&model, &portfolio, &calc).unwrap();

    let report = RiskReportBuilder::new()
        .with_adapter(VolParameterAdapter::vega())
        .with_adapter(DeltaGammaAdapter::default())
        .with_adapter(ThetaAdapter::default())
        .with_valuation_date_tag(asof())
        .build(&ctx)
        .unwrap();

    assert_eq!(groups(&report), vec!["Delta", "Theta", "Vega"]);
    assert_eq!(
        report.value_at(0, VALUATION_DATE).unwrap(),
        Some(&CubeValue::Date(asof().into_inner()))
    );

    let delta = report
        .filter(&[(METRIC_GROUP, "Delta".into())], false)
        .unwrap();
    let standalone = DeltaGammaAdapter::default().compute_all(&ctx).unwrap();
    assert_eq!(delta.len(), standalone.len());
    assert!((delta.sum_of_all_rows() - standalone.sum_of_all_rows()).abs() < 1e-9);
}

#[test]
fn test_report_fails_when_any_metric_fails() {
    let model = market();
    let portfolio = book(vec![forward("F1", "WTI", 10.0)]);
    let calc = calculator();
    let ctx = RiskContext::new(&model, &portfolio, &calc).unwrap();

    let result = RiskReportBuilder::new()
        .with_adapter(DeltaGammaAdapter::default())
        .with_adapter(BrokenAdapter)
        .build(&ctx);
    assert!(matches!(result, Err(GreeksError::RiskFactorNotFound(_))));
}

#[test]
fn test_empty_report_is_empty() {
    let model = market();
    let portfolio = book(Vec::new());
    let calc = calculator();
    let ctx = RiskContext::new(&model, &portfolio, &calc).unwrap();

    let builder = RiskReportBuilder::new();
    assert!(builder.is_empty());
    assert!(builder.build(&ctx).unwrap().is_empty());
}

#[test]
fn test_config_driven_report() {
    let config = RiskConfig::from_toml_str(
        r#"
        metrics = ["delta", "ir_delta", "benchmark"]

        [calculator]
        pass_through_tags = ["Desk"]
        parallel_threshold = 1

        [cascade]
        strategy = "topological"

        [delta]
        two_sided = false
        "#,
    )
    .unwrap();
    assert_eq!(
        config.metrics,
        vec![MetricKind::Delta, MetricKind::IrDelta, MetricKind::Benchmark]
    );

    let model = market_with_rates(0.03);
    let portfolio = book(vec![
        forward("F1", "BRENT", 10.0).with_tag("Desk", "OIL"),
        zero_coupon("Z1", 1_000.0),
    ]);
    let calc = GreekCalculator::new(
        Arc::new(risk_greeks::AnalyticPricer::new()),
        config.calculator_config(),
    )
    .unwrap();
    let ctx = RiskContext::new(&model, &portfolio, &calc).unwrap();

    let builder =
        RiskReportBuilder::from_config(&config, &model, Arc::new(ZeroRateStripper)).unwrap();
    assert_eq!(builder.len(), 3);
    let report = builder.build(&ctx).unwrap();

    assert_eq!(groups(&report), vec!["BenchmarkDelta", "Delta", "IRDelta"]);
    let gammas = report.filter(&[("Metric", "Gamma".into())], false).unwrap();
    assert!(gammas.is_empty());

    let oil = report.filter(&[("Desk", "OIL".into())], false).unwrap();
    assert!(!oil.is_empty());
}
