//! Error types for Greek calculations.

use risk_cube::CubeError;
use risk_market::market_data::MarketDataError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::portfolio::PortfolioError;
use crate::pricing::PricingError;

/// Every fatal condition a metric call can report.
///
/// Empty exposure and zero sensitivities are not errors: they produce an
/// empty cube.
#[derive(Debug, Error)]
pub enum GreeksError {
    /// Cube construction or algebra failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// Market model lookup or bump generation failed.
    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),

    /// The pricer failed.
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// Portfolio is malformed.
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A bumped price cube does not line up with the base cube.
    #[error("Bumped result for {factor} at {pillar} does not align with base: {source}")]
    StructuralMismatch {
        /// Risk factor being bumped
        factor: String,
        /// Pillar label of the scenario
        pillar: String,
        /// Underlying cube error
        #[source]
        source: CubeError,
    },

    /// Requested risk factor is not in the market model or not handled by
    /// the adapter.
    #[error("Risk factor not found: {0}")]
    RiskFactorNotFound(String),

    /// A derived curve names a parent absent from the model.
    #[error("Curve {curve} depends on missing parent {parent}")]
    MissingParent {
        /// Derived curve
        curve: String,
        /// Missing parent
        parent: String,
    },

    /// The curve dependency graph has a cycle.
    #[error("Cyclic curve dependency among: {}", curves.join(", "))]
    CyclicDependency {
        /// Curves on or behind the cycle
        curves: Vec<String>,
    },

    /// Dependent curves could not be recalibrated within the pass budget.
    #[error("Recalibration cascade unresolved after {passes} passes: {}", curves.join(", "))]
    CascadeUnresolved {
        /// Passes run
        passes: usize,
        /// Curves left unresolved
        curves: Vec<String>,
    },

    /// Up and down scenario sets disagree.
    #[error("Scenario mismatch for {factor}: {detail}")]
    ScenarioMismatch {
        /// Risk factor being bumped
        factor: String,
        /// What differed
        detail: String,
    },

    /// A scenario cannot be applied by this source.
    #[error("Unsupported scenario: {0}")]
    UnsupportedScenario(String),

    /// A computed sensitivity is NaN or infinite.
    #[error("Non-finite {metric} for trade {trade} on {factor}: {value}")]
    NonFiniteResult {
        /// Metric name
        metric: String,
        /// Risk factor
        factor: String,
        /// Trade identifier
        trade: String,
        /// Offending value
        value: f64,
    },

    /// The worker pool could not be built.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cascade_unresolved_display() {
        let err = GreeksError::CascadeUnresolved {
            passes: 10,
            curves: vec!["B".to_string(), "C".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Recalibration cascade unresolved after 10 passes: B, C"
        );
    }

    #[test]
    fn test_cyclic_dependency_display() {
        let err = GreeksError::CyclicDependency {
            curves: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(err.to_string(), "Cyclic curve dependency among: A, B");
    }

    #[test]
    fn test_structural_mismatch_keeps_source() {
        let err = GreeksError::StructuralMismatch {
            factor: "Curve:A".to_string(),
            pillar: "1Y".to_string(),
            source: CubeError::DimensionMismatch { left: 2, right: 3 },
        };
        assert!(err.to_string().contains("Dimensions do not match"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_from_market_data_error() {
        let err: GreeksError = MarketDataError::CurveNotFound("X".to_string()).into();
        assert!(matches!(err, GreeksError::MarketData(_)));
    }
}
