//! Volatility surfaces.

mod vol;

pub use vol::{SurfaceParameter, VolSurface};
