//! Risk run configuration management
//!
//! Handles loading configuration from TOML files, environment variables and
//! command-line overrides.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use risk_market::market_data::BumpConvention;
use risk_market::types::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::calculator::CalculatorConfig;
use crate::columns::{GREEK_COLUMNS, METRIC_GROUP, VALUATION_DATE};
use crate::dependency::{CascadeStrategy, DEFAULT_MAX_PASSES};
use crate::metrics::MetricSettings;
use crate::parallel::{ParallelConfig, DEFAULT_PARALLEL_THRESHOLD};
use crate::scenarios::BumpMode;

/// Environment variable overriding the reporting currency.
pub const ENV_REPORTING_CCY: &str = "GREEKS_REPORTING_CCY";
/// Environment variable overriding the worker pool size.
pub const ENV_NUM_THREADS: &str = "GREEKS_NUM_THREADS";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "GREEKS_LOG_LEVEL";

/// Configuration error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Unknown log level name
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown currency code
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),

    /// A setting is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Dotted key of the setting
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Reading or parsing the file failed
    #[error("Configuration file error: {0}")]
    FileError(String),

    /// An environment override is malformed
    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Log levels accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Everything, including per-pass cascade detail
    Trace,
    /// Per-scenario detail
    Debug,
    /// Metric and report boundaries
    #[default]
    Info,
    /// Skipped factors
    Warn,
    /// Failures only
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Convert log level to tracing filter string
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter_str())
    }
}

fn deserialize_log_level<'de, D>(deserializer: D) -> Result<LogLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    LogLevel::from_str(&s).map_err(serde::de::Error::custom)
}

fn deserialize_currency<'de, D>(deserializer: D) -> Result<Currency, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Currency::from_str(&s).map_err(serde::de::Error::custom)
}

/// Metric families a report can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Price curve delta and gamma
    Delta,
    /// ATM volatility
    Vega,
    /// Volatility skew
    Rega,
    /// Volatility curvature
    Sega,
    /// Zero-rate curve delta
    IrDelta,
    /// FX spot delta and gamma
    Fx,
    /// Valuation date roll
    Theta,
    /// Delta decay over a date roll
    Charm,
    /// Par-quote delta through a curve stripper
    Benchmark,
}

impl MetricKind {
    /// Every metric, in report order.
    pub const ALL: [MetricKind; 9] = [
        MetricKind::Delta,
        MetricKind::Vega,
        MetricKind::Rega,
        MetricKind::Sega,
        MetricKind::IrDelta,
        MetricKind::Fx,
        MetricKind::Theta,
        MetricKind::Charm,
        MetricKind::Benchmark,
    ];
}

/// `[calculator]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalculatorSection {
    /// Trade tags copied into every row
    pub pass_through_tags: Vec<String>,
    /// Fail on NaN/Inf sensitivities
    pub validate_results: bool,
    /// Skip pillars beyond the exposed trades' last date
    pub use_horizon: bool,
    /// Minimum task count before going parallel
    pub parallel_threshold: usize,
    /// Dedicated pool size; 0 uses the global pool
    pub num_threads: usize,
}

impl Default for CalculatorSection {
    fn default() -> Self {
        Self {
            pass_through_tags: Vec::new(),
            validate_results: true,
            use_horizon: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            num_threads: 0,
        }
    }
}

/// Cascade strategy names accepted in `[cascade]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStrategyName {
    /// `bounded_passes`
    #[default]
    BoundedPasses,
    /// `topological`
    Topological,
}

/// `[cascade]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CascadeSection {
    /// Strategy
    pub strategy: CascadeStrategyName,
    /// Pass budget of the bounded strategy
    pub max_passes: usize,
}

impl Default for CascadeSection {
    fn default() -> Self {
        Self {
            strategy: CascadeStrategyName::BoundedPasses,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl CascadeSection {
    /// Resolved strategy.
    pub fn strategy(&self) -> CascadeStrategy {
        match self.strategy {
            CascadeStrategyName::BoundedPasses => CascadeStrategy::BoundedPasses {
                max_passes: self.max_passes,
            },
            CascadeStrategyName::Topological => CascadeStrategy::Topological,
        }
    }
}

/// Per-metric table. Unset keys keep the metric's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MetricOverrides {
    /// Bump size
    pub bump_size: Option<f64>,
    /// `absolute` or `relative`
    pub convention: Option<BumpConvention>,
    /// Central differences (and the second-order metric where there is one)
    pub two_sided: Option<bool>,
    /// `per_pillar` or `parallel`
    pub mode: Option<BumpMode>,
}

impl MetricOverrides {
    /// `defaults` with every set key replaced.
    pub fn apply_to(&self, defaults: MetricSettings) -> MetricSettings {
        MetricSettings {
            bump_size: self.bump_size.unwrap_or(defaults.bump_size),
            convention: self.convention.unwrap_or(defaults.convention),
            two_sided: self.two_sided.unwrap_or(defaults.two_sided),
            mode: self.mode.unwrap_or(defaults.mode),
        }
    }
}

/// `[charm]` table
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CharmSection {
    /// Valuation date roll, in days
    pub roll_days: u32,
}

impl Default for CharmSection {
    fn default() -> Self {
        Self { roll_days: 1 }
    }
}

/// Full risk run configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Currency every price and sensitivity is reported in
    #[serde(deserialize_with = "deserialize_currency")]
    pub reporting_currency: Currency,
    /// Log level
    #[serde(deserialize_with = "deserialize_log_level")]
    pub log_level: LogLevel,
    /// Metrics a report runs, in order
    pub metrics: Vec<MetricKind>,
    /// Calculator settings
    pub calculator: CalculatorSection,
    /// Recalibration cascade settings
    pub cascade: CascadeSection,
    /// `[delta]`
    pub delta: MetricOverrides,
    /// `[vega]`
    pub vega: MetricOverrides,
    /// `[rega]`
    pub rega: MetricOverrides,
    /// `[sega]`
    pub sega: MetricOverrides,
    /// `[ir_delta]`
    pub ir_delta: MetricOverrides,
    /// `[fx]`
    pub fx: MetricOverrides,
    /// `[theta]`, bump size in days
    pub theta: MetricOverrides,
    /// `[benchmark]`
    pub benchmark: MetricOverrides,
    /// `[charm]`
    pub charm: CharmSection,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            reporting_currency: Currency::USD,
            log_level: LogLevel::Info,
            metrics: MetricKind::ALL.to_vec(),
            calculator: CalculatorSection::default(),
            cascade: CascadeSection::default(),
            delta: MetricOverrides::default(),
            vega: MetricOverrides::default(),
            rega: MetricOverrides::default(),
            sega: MetricOverrides::default(),
            ir_delta: MetricOverrides::default(),
            fx: MetricOverrides::default(),
            theta: MetricOverrides::default(),
            benchmark: MetricOverrides::default(),
            charm: CharmSection::default(),
        }
    }
}

impl RiskConfig {
    /// Create a new RiskConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RiskConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply `GREEKS_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ccy) = lookup(ENV_REPORTING_CCY) {
            self.reporting_currency =
                Currency::from_str(&ccy).map_err(|_| ConfigError::InvalidCurrency(ccy.clone()))?;
        }
        if let Some(threads) = lookup(ENV_NUM_THREADS) {
            self.calculator.num_threads = threads
                .trim()
                .parse()
                .map_err(|_| {
                    ConfigError::EnvError(format!(
                        "{}={} is not a thread count",
                        ENV_NUM_THREADS, threads
                    ))
                })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(ccy) = &cli.reporting_currency {
            self.reporting_currency =
                Currency::from_str(ccy).map_err(|_| ConfigError::InvalidCurrency(ccy.clone()))?;
        }
        if let Some(threads) = cli.num_threads {
            self.calculator.num_threads = threads;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let metrics = [
            ("delta", &self.delta),
            ("vega", &self.vega),
            ("rega", &self.rega),
            ("sega", &self.sega),
            ("ir_delta", &self.ir_delta),
            ("fx", &self.fx),
            ("theta", &self.theta),
            ("benchmark", &self.benchmark),
        ];
        for (name, overrides) in metrics {
            if let Some(size) = overrides.bump_size {
                if size == 0.0 || !size.is_finite() {
                    return Err(invalid(
                        format!("{}.bump_size", name),
                        "must be finite and non-zero",
                    ));
                }
            }
        }
        if let Some(days) = self.theta.bump_size {
            if days.fract() != 0.0 {
                return Err(invalid("theta.bump_size", "must be a whole number of days"));
            }
        }
        if self.charm.roll_days == 0 {
            return Err(invalid("charm.roll_days", "must be at least one day"));
        }
        if self.cascade.strategy == CascadeStrategyName::BoundedPasses
            && self.cascade.max_passes == 0
        {
            return Err(invalid("cascade.max_passes", "must be at least 1"));
        }

        let reserved: BTreeSet<&str> = GREEK_COLUMNS
            .iter()
            .copied()
            .chain([METRIC_GROUP, VALUATION_DATE])
            .collect();
        let mut seen = BTreeSet::new();
        for tag in &self.calculator.pass_through_tags {
            if reserved.contains(tag.as_str()) {
                return Err(invalid(
                    "calculator.pass_through_tags",
                    format!("{} is a reserved column", tag),
                ));
            }
            if !seen.insert(tag.as_str()) {
                return Err(invalid(
                    "calculator.pass_through_tags",
                    format!("{} listed twice", tag),
                ));
            }
        }
        Ok(())
    }

    /// Calculator settings resolved from this configuration
    pub fn calculator_config(&self) -> CalculatorConfig {
        CalculatorConfig::new()
            .with_reporting_currency(self.reporting_currency)
            .with_pass_through_tags(self.calculator.pass_through_tags.iter().cloned())
            .with_validation(self.calculator.validate_results)
            .with_horizon(self.calculator.use_horizon)
            .with_parallel(ParallelConfig::new(
                self.calculator.parallel_threshold,
                self.calculator.num_threads,
            ))
            .with_cascade(self.cascade.strategy())
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Command-line overrides
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Reporting currency override
    pub reporting_currency: Option<String>,
    /// Worker pool size override
    pub num_threads: Option<usize>,
    /// Log level override
    pub log_level: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliOverrides) -> Result<RiskConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => RiskConfig::from_file(path)?,
        None => RiskConfig::default(),
    };
    config.apply_env()?;
    config.merge_with_cli(cli)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = RiskConfig::default();
        assert_eq!(config.reporting_currency, Currency::USD);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.metrics.len(), 9);
        assert!(config.calculator.validate_results);
        assert_eq!(
            config.cascade.strategy(),
            CascadeStrategy::BoundedPasses {
                max_passes: DEFAULT_MAX_PASSES
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("Warn").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
            reporting_currency = "eur"
            log_level = "debug"
            metrics = ["delta", "ir_delta", "charm"]

            [calculator]
            pass_through_tags = ["Book", "Desk"]
            num_threads = 4

            [cascade]
            strategy = "topological"

            [delta]
            bump_size = 0.005
            two_sided = false

            [vega]
            convention = "relative"
            mode = "parallel"
        "#;

        let config = RiskConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.reporting_currency, Currency::EUR);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(
            config.metrics,
            vec![MetricKind::Delta, MetricKind::IrDelta, MetricKind::Charm]
        );
        assert_eq!(config.calculator.pass_through_tags, vec!["Book", "Desk"]);
        assert_eq!(config.calculator.num_threads, 4);
        assert!(config.calculator.validate_results);
        assert_eq!(config.cascade.strategy(), CascadeStrategy::Topological);
        assert_eq!(config.delta.bump_size, Some(0.005));
        assert_eq!(config.delta.two_sided, Some(false));
        assert_eq!(config.delta.convention, None);
        assert_eq!(config.vega.convention, Some(BumpConvention::Relative));
        assert_eq!(config.vega.mode, Some(BumpMode::Parallel));
    }

    #[test]
    fn test_partial_table_keeps_metric_defaults() {
        let config = RiskConfig::from_toml_str("[ir_delta]\nbump_size = 0.0001\n").unwrap();
        let defaults = MetricSettings {
            bump_size: 1e-4,
            convention: BumpConvention::Absolute,
            two_sided: false,
            mode: BumpMode::PerPillar,
        };
        let resolved = config.ir_delta.apply_to(defaults);
        assert_eq!(resolved, defaults);

        let resolved = MetricOverrides {
            two_sided: Some(true),
            ..Default::default()
        }
        .apply_to(defaults);
        assert!(resolved.two_sided);
        assert_eq!(resolved.bump_size, 1e-4);
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(matches!(
            RiskConfig::from_toml_str("reporting_currency = \"XXX\""),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            RiskConfig::from_toml_str("[delta]\nbump_size = 0.0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RiskConfig::from_toml_str("[theta]\nbump_size = 0.5"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RiskConfig::from_toml_str("[calculator]\npass_through_tags = [\"Metric\"]"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            RiskConfig::from_toml_str("[cascade]\nmax_passes = 0"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_REPORTING_CCY, "gbp"),
            (ENV_NUM_THREADS, "8"),
            (ENV_LOG_LEVEL, "warn"),
        ]);
        let mut config = RiskConfig::default();
        config
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.reporting_currency, Currency::GBP);
        assert_eq!(config.calculator.num_threads, 8);
        assert_eq!(config.log_level, LogLevel::Warn);

        let mut config = RiskConfig::default();
        let bad = config.apply_env_from(|k| (k == ENV_NUM_THREADS).then(|| "many".to_string()));
        assert!(matches!(bad, Err(ConfigError::EnvError(_))));
    }

    #[test]
    fn test_cli_takes_precedence() {
        let mut config = RiskConfig::default();
        config
            .apply_env_from(|k| (k == ENV_REPORTING_CCY).then(|| "EUR".to_string()))
            .unwrap();
        let cli = CliOverrides {
            reporting_currency: Some("JPY".to_string()),
            num_threads: Some(2),
            log_level: Some("trace".to_string()),
            config_file: None,
        };
        config.merge_with_cli(&cli).unwrap();
        assert_eq!(config.reporting_currency, Currency::JPY);
        assert_eq!(config.calculator.num_threads, 2);
        assert_eq!(config.log_level, LogLevel::Trace);
    }

    #[test]
    fn test_calculator_config_resolution() {
        let config = RiskConfig::from_toml_str(
            "reporting_currency = \"CHF\"\n\
             [calculator]\nuse_horizon = true\nparallel_threshold = 8\n",
        )
        .unwrap();
        let calc = config.calculator_config();
        assert_eq!(calc.reporting_currency, Currency::CHF);
        assert!(calc.use_horizon);
        assert_eq!(calc.parallel, ParallelConfig::new(8, 0));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidLogLevel("bad".to_string());
        assert!(err.to_string().contains("Invalid log level"));

        let err = invalid("delta.bump_size", "must be finite and non-zero");
        assert_eq!(
            err.to_string(),
            "Invalid value for delta.bump_size: must be finite and non-zero"
        );
    }
}
