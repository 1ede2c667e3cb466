//! Curves held by the market model.
//!
//! - [`PriceCurve`]: asset prices by delivery date, spot or forward quoted
//! - [`RateCurve`]: continuously compounded zero rates
//! - [`BasisCurve`]: additive spread over a parent curve
//! - [`CurveEnum`]: static dispatch over the three

mod basis;
mod curve_enum;
mod pillar_values;
mod price;
mod rate;

pub use basis::BasisCurve;
pub use curve_enum::{CurveEnum, CurveKind};
pub use pillar_values::PillarValues;
pub use price::{PriceCurve, QuotingConvention};
pub use rate::RateCurve;
