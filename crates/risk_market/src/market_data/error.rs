//! Market data error types.
//!
//! Lookups against the market model, curve construction and bump
//! generation all report through [`MarketDataError`].

use crate::types::Currency;
use thiserror::Error;

/// Market data operation errors.
///
/// # Examples
///
/// ```
/// use risk_market::market_data::MarketDataError;
///
/// let err = MarketDataError::CurveNotFound("USD-OIS".to_string());
/// assert_eq!(format!("{}", err), "Curve not found: USD-OIS");
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// No curve with this name in the model.
    #[error("Curve not found: {0}")]
    CurveNotFound(String),

    /// No surface with this name in the model.
    #[error("Surface not found: {0}")]
    SurfaceNotFound(String),

    /// No FX spot available for this currency.
    #[error("FX spot not found: {0}")]
    FxSpotNotFound(Currency),

    /// No discount curve registered for this currency.
    #[error("No discount curve registered for {0}")]
    DiscountCurveNotFound(Currency),

    /// Curve exists but is of the wrong kind for the query.
    #[error("Curve {name} is a {actual} curve, expected {expected}")]
    WrongCurveKind {
        /// Curve name
        name: String,
        /// Kind the caller needed
        expected: &'static str,
        /// Kind the curve has
        actual: &'static str,
    },

    /// Too few pillars to build the object.
    #[error("Insufficient pillars for {name}: got {got}, need {need}")]
    InsufficientPillars {
        /// Object name
        name: String,
        /// Number of pillars provided
        got: usize,
        /// Minimum number required
        need: usize,
    },

    /// Pillar dates are not strictly increasing.
    #[error("Pillars of {name} are not strictly increasing at index {index}")]
    UnorderedPillars {
        /// Object name
        name: String,
        /// First offending index
        index: usize,
    },

    /// Two pillar vectors that must line up do not.
    #[error("Pillar mismatch for {name}: expected {expected} values, got {actual}")]
    PillarMismatch {
        /// Object name
        name: String,
        /// Expected count
        expected: usize,
        /// Actual count
        actual: usize,
    },

    /// Bump size or spot value is unusable.
    #[error("Invalid bump: {0}")]
    InvalidBump(String),

    /// Quoted value is not finite or not positive where it must be.
    #[error("Invalid market value for {name}: {value}")]
    InvalidValue {
        /// Object name
        name: String,
        /// Offending value
        value: f64,
    },

    /// A derived curve names a parent that is absent from the model.
    #[error("Curve {curve} depends on missing parent {parent}")]
    MissingParent {
        /// Derived curve
        curve: String,
        /// Parent that could not be found
        parent: String,
    },
}
