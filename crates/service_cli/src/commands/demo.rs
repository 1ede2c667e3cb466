//! Demo command: a full risk report over a synthetic market and book.
//!
//! The market holds a WTI price curve with a BRENT basis over it, USD and
//! EUR zero-rate curves, a WTI volatility surface with smile and an EURUSD
//! spot. The book cycles through forwards, options, FX forwards and zero
//! coupon bonds, each tagged with a `Book`.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::sync::Arc;

use risk_cube::{Aggregation, ResultCube};
use risk_greeks::columns::{METRIC, METRIC_GROUP, PILLAR_LABEL, RISK_FACTOR_ID};
use risk_greeks::metrics::RiskContext;
use risk_greeks::portfolio::{Instrument, OptionType, Portfolio, Trade};
use risk_greeks::scenarios::ZeroRateStripper;
use risk_greeks::{AnalyticPricer, GreekCalculator, GreeksError, RiskConfig, RiskReportBuilder};
use risk_market::market_data::curves::{BasisCurve, CurveEnum, PriceCurve, RateCurve};
use risk_market::market_data::{FxMatrix, MarketDataError, MarketModel, Pillar, VolSurface};
use risk_market::types::{Currency, Date};
use tracing::info;

use super::output::{write_cube, OutputFormat};
use crate::{CliError, Result};

/// Trade tag carried into the report when no tags are configured.
const BOOK_TAG: &str = "Book";

fn valuation_date() -> Result<Date> {
    Date::from_ymd(2024, 1, 2).map_err(|e| CliError::InvalidArgument(e.to_string()))
}

fn pillars(asof: Date) -> Vec<Pillar> {
    [("3M", 91), ("6M", 182), ("1Y", 365), ("2Y", 730)]
        .into_iter()
        .map(|(label, days)| Pillar::new(label, asof.add_days(days)))
        .collect()
}

/// Synthetic market valued at `asof`.
pub fn demo_market(asof: Date) -> std::result::Result<MarketModel, MarketDataError> {
    let fx = FxMatrix::new(Currency::USD).with_spot(Currency::EUR, 1.08)?;
    let mut model = MarketModel::new(asof, fx);

    let wti = CurveEnum::Price(PriceCurve::new(
        "WTI",
        Currency::USD,
        pillars(asof),
        vec![74.0, 73.2, 71.8, 69.5],
    )?);
    let brent = CurveEnum::Basis(BasisCurve::over(
        "BRENT",
        &wti,
        pillars(asof),
        vec![4.6, 4.4, 4.1, 3.9],
    )?);
    model.add_curve(wti);
    model.add_curve(brent);
    model.add_curve(CurveEnum::Rate(RateCurve::new(
        "USD-OIS",
        Currency::USD,
        pillars(asof),
        vec![0.053, 0.052, 0.049, 0.044],
    )?));
    model.add_curve(CurveEnum::Rate(RateCurve::new(
        "EUR-OIS",
        Currency::EUR,
        pillars(asof),
        vec![0.039, 0.038, 0.035, 0.030],
    )?));
    model.set_discount_curve(Currency::USD, "USD-OIS");
    model.set_discount_curve(Currency::EUR, "EUR-OIS");

    model.add_surface(VolSurface::new(
        "WTI-VOL",
        "WTI",
        pillars(asof),
        vec![0.36, 0.34, 0.32, 0.30],
        vec![-0.08, -0.07, -0.06, -0.05],
        vec![0.15, 0.12, 0.10, 0.08],
    )?);
    Ok(model)
}

/// `n` trades cycling through every instrument kind.
pub fn demo_book(asof: Date, n: usize) -> std::result::Result<Portfolio, GreeksError> {
    let tenors = [91, 182, 365, 730];
    let trades = (0..n)
        .map(|i| {
            let id = format!("T{:03}", i + 1);
            let date = asof.add_days(tenors[i % tenors.len()]);
            let sign = if i % 3 == 0 { -1.0 } else { 1.0 };
            match i % 5 {
                0 | 1 => Trade::new(
                    id,
                    Instrument::Forward {
                        underlying: if i % 5 == 0 { "WTI" } else { "BRENT" }.to_string(),
                        discount_curve: "USD-OIS".to_string(),
                        currency: Currency::USD,
                        delivery: date,
                        strike: 72.0,
                        units: sign * 10_000.0,
                    },
                )
                .with_tag(BOOK_TAG, "OIL"),
                2 => Trade::new(
                    id,
                    Instrument::EuropeanOption {
                        underlying: "WTI".to_string(),
                        surface: "WTI-VOL".to_string(),
                        discount_curve: "USD-OIS".to_string(),
                        currency: Currency::USD,
                        expiry: date,
                        strike: 75.0 + (i % 4) as f64 * 2.5,
                        units: sign * 5_000.0,
                        option_type: if i % 2 == 0 { OptionType::Call } else { OptionType::Put },
                    },
                )
                .with_tag(BOOK_TAG, "OIL-VOL"),
                3 => Trade::new(
                    id,
                    Instrument::FxForward {
                        foreign: Currency::EUR,
                        domestic: Currency::USD,
                        foreign_curve: "EUR-OIS".to_string(),
                        domestic_curve: "USD-OIS".to_string(),
                        delivery: date,
                        strike: 1.09,
                        notional: sign * 1_000_000.0,
                    },
                )
                .with_tag(BOOK_TAG, "FX"),
                _ => Trade::new(
                    id,
                    Instrument::ZeroCouponBond {
                        discount_curve: "USD-OIS".to_string(),
                        currency: Currency::USD,
                        maturity: date,
                        notional: 1_000_000.0,
                    },
                )
                .with_tag(BOOK_TAG, "RATES"),
            }
        })
        .collect();
    Ok(Portfolio::new(trades)?)
}

/// Builds the full report for the demo market and book.
pub fn build_report(config: &RiskConfig, n_trades: usize) -> Result<ResultCube> {
    let asof = valuation_date()?;
    let model = demo_market(asof).map_err(GreeksError::from)?;
    let book = demo_book(asof, n_trades)?;

    let mut calc_config = config.calculator_config();
    if calc_config.pass_through_tags.is_empty() {
        calc_config = calc_config.with_pass_through_tags([BOOK_TAG]);
    }
    let calculator = GreekCalculator::new(Arc::new(AnalyticPricer::new()), calc_config)?;
    let ctx = RiskContext::new(&model, &book, &calculator)?;

    let report = RiskReportBuilder::from_config(config, &model, Arc::new(ZeroRateStripper))?
        .with_valuation_date_tag(asof)
        .build(&ctx)?;
    info!(trades = book.len(), rows = report.len(), "Demo report complete");
    Ok(report)
}

/// Runs the demo and writes the report.
pub fn run(
    config: &RiskConfig,
    n_trades: usize,
    format: OutputFormat,
    summary: bool,
    output: Option<&Path>,
) -> Result<()> {
    if n_trades == 0 {
        return Err(CliError::InvalidArgument("--trades must be at least 1".to_string()));
    }

    let mut report = build_report(config, n_trades)?;
    if summary && !report.is_empty() {
        report = report.pivot(
            &[METRIC_GROUP, RISK_FACTOR_ID, PILLAR_LABEL, METRIC],
            Aggregation::Sum,
        )?;
    }

    match output {
        Some(path) => {
            let file = File::create(path)?;
            write_cube(&report, format, BufWriter::new(file))?;
            info!(path = %path.display(), "Report written");
        }
        None => write_cube(&report, format, io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_cube::CubeValue;
    use risk_greeks::config::MetricKind;

    #[test]
    fn test_demo_book_cycles_instruments() {
        let asof = valuation_date().unwrap();
        let book = demo_book(asof, 10).unwrap();
        assert_eq!(book.len(), 10);
    }

    #[test]
    fn test_demo_report_covers_every_metric() {
        let report = build_report(&RiskConfig::default(), 10).unwrap();
        assert!(!report.is_empty());

        for group in ["Delta", "Vega", "IRDelta", "FXDelta", "Theta", "BenchmarkDelta"] {
            let rows = report.filter(&[(METRIC_GROUP, CubeValue::from(group))], false).unwrap();
            assert!(!rows.is_empty(), "no rows for {}", group);
        }
        assert!(report.schema().index_of(BOOK_TAG).is_some());
    }

    #[test]
    fn test_summary_pivot_has_no_trade_column() {
        let mut config = RiskConfig::default();
        config.metrics = vec![MetricKind::Delta];
        let report = build_report(&config, 5).unwrap();
        let summary = report
            .pivot(&[METRIC_GROUP, RISK_FACTOR_ID, PILLAR_LABEL, METRIC], Aggregation::Sum)
            .unwrap();
        assert!(summary.schema().index_of("TradeId").is_none());
        assert!(summary.len() <= report.len());
    }
}
