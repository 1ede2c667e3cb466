//! Calculator settings.

use risk_market::types::Currency;

use crate::dependency::CascadeStrategy;
use crate::parallel::ParallelConfig;

/// Settings shared by every metric a calculator runs.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculatorConfig {
    /// Currency prices and sensitivities are reported in.
    pub reporting_currency: Currency,

    /// Trade tags copied into every Greek row, in column order.
    pub pass_through_tags: Vec<String>,

    /// Whether to fail on NaN/Inf sensitivities.
    pub validate_results: bool,

    /// Whether to skip pillars dated after the last date of the selected
    /// trades.
    pub use_horizon: bool,

    /// Parallel execution settings.
    pub parallel: ParallelConfig,

    /// Cascade strategy for dependent curves.
    pub cascade: CascadeStrategy,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            reporting_currency: Currency::USD,
            pass_through_tags: Vec::new(),
            validate_results: true,
            use_horizon: false,
            parallel: ParallelConfig::default(),
            cascade: CascadeStrategy::default(),
        }
    }
}

impl CalculatorConfig {
    /// Creates a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reporting currency.
    pub fn with_reporting_currency(mut self, ccy: Currency) -> Self {
        self.reporting_currency = ccy;
        self
    }

    /// Sets the pass-through tags.
    pub fn with_pass_through_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pass_through_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether to validate results for NaN/Inf.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_results = validate;
        self
    }

    /// Sets whether pillars beyond the book's last date are skipped.
    pub fn with_horizon(mut self, use_horizon: bool) -> Self {
        self.use_horizon = use_horizon;
        self
    }

    /// Sets the parallel configuration.
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the cascade strategy.
    pub fn with_cascade(mut self, cascade: CascadeStrategy) -> Self {
        self.cascade = cascade;
        self
    }
}
