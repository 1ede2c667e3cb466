//! Check command: print the resolved configuration and make sure a
//! calculator can be built from it.

use std::io::{self, Write};
use std::sync::Arc;

use risk_greeks::config::MetricKind;
use risk_greeks::metrics::{
    BenchmarkRiskAdapter, DeltaGammaAdapter, FxDeltaGammaAdapter, IrDeltaAdapter, MetricSettings,
    ThetaAdapter, VolParameterAdapter,
};
use risk_greeks::{AnalyticPricer, GreekCalculator, RiskConfig};
use tracing::info;

use crate::Result;

/// Settings `metric` will run with, after config overrides.
fn effective_settings(config: &RiskConfig, metric: MetricKind) -> MetricSettings {
    match metric {
        MetricKind::Delta | MetricKind::Charm => config.delta.apply_to(DeltaGammaAdapter::DEFAULTS),
        MetricKind::Vega => config.vega.apply_to(VolParameterAdapter::DEFAULTS),
        MetricKind::Rega => config.rega.apply_to(VolParameterAdapter::DEFAULTS),
        MetricKind::Sega => config.sega.apply_to(VolParameterAdapter::DEFAULTS),
        MetricKind::IrDelta => config.ir_delta.apply_to(IrDeltaAdapter::DEFAULTS),
        MetricKind::Fx => config.fx.apply_to(FxDeltaGammaAdapter::DEFAULTS),
        MetricKind::Theta => config.theta.apply_to(ThetaAdapter::DEFAULTS),
        MetricKind::Benchmark => config.benchmark.apply_to(BenchmarkRiskAdapter::DEFAULTS),
    }
}

/// Writes a summary of `config` to `out`.
pub fn describe<W: Write>(config: &RiskConfig, mut out: W) -> Result<()> {
    writeln!(out, "reporting_currency = {}", config.reporting_currency)?;
    writeln!(out, "log_level          = {}", config.log_level)?;
    writeln!(out, "cascade            = {:?}", config.cascade.strategy())?;
    writeln!(
        out,
        "threads            = {}",
        match config.calculator.num_threads {
            0 => "global pool".to_string(),
            n => n.to_string(),
        }
    )?;
    writeln!(out, "pass_through_tags  = {:?}", config.calculator.pass_through_tags)?;
    writeln!(out, "metrics:")?;
    for metric in &config.metrics {
        let s = effective_settings(config, *metric);
        write!(
            out,
            "  {:<10} bump={} {:?} {} {:?}",
            format!("{:?}", metric),
            s.bump_size,
            s.convention,
            if s.two_sided { "two-sided" } else { "one-sided" },
            s.mode
        )?;
        if *metric == MetricKind::Charm {
            write!(out, " roll_days={}", config.charm.roll_days)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Runs the check command.
pub fn run(config: &RiskConfig) -> Result<()> {
    GreekCalculator::new(Arc::new(AnalyticPricer::new()), config.calculator_config())?;
    describe(config, io::stdout().lock())?;
    info!("Configuration OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_checks_out() {
        assert!(run(&RiskConfig::default()).is_ok());
    }

    #[test]
    fn test_describe_shows_overrides() {
        let config = RiskConfig::from_toml_str(
            r#"
            metrics = ["vega", "charm"]

            [vega]
            bump_size = 0.005

            [charm]
            roll_days = 7
            "#,
        )
        .unwrap();

        let mut buf = Vec::new();
        describe(&config, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("bump=0.005"));
        assert!(text.contains("roll_days=7"));
        assert!(!text.contains("Theta"));
    }
}
