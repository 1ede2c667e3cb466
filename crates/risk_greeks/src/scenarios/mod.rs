//! Risk factors and the scenario sources that bump them.

mod risk_factor;
mod source;
mod stripper;

pub use risk_factor::RiskFactorId;
pub use source::{
    BenchmarkQuotes, BenchmarkScenarioSource, BumpMode, CurveScenarioSource, FactorScenario,
    FxSpotScenarioSource, Perturbation, ScenarioSource, SurfaceScenarioSource, ThetaSource,
    SPOT_LABEL,
};
pub use stripper::{CurveStripper, ZeroRateStripper};
