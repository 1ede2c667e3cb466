//! Market data: curves, surfaces, FX and the market model.

pub mod curves;
pub mod error;
pub mod fx;
pub mod model;
pub mod pillar;
pub mod surfaces;

pub use curves::{BasisCurve, CurveEnum, CurveKind, PriceCurve, QuotingConvention, RateCurve};
pub use error::MarketDataError;
pub use fx::FxMatrix;
pub use model::MarketModel;
pub use pillar::{
    covering_pillar, pillars_within_horizon, Bump, BumpConvention, Pillar, PillarScenario,
    PARALLEL_LABEL,
};
pub use surfaces::{SurfaceParameter, VolSurface};
