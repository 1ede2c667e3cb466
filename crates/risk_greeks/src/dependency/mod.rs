//! Curve dependency graph and the recalibration cascade that walks it.

mod cascade;
mod graph;

pub use cascade::{CascadeOutcome, CascadeStrategy, RecalibrationCascade, DEFAULT_MAX_PASSES};
pub use graph::CurveDependencyGraph;
