//! # risk_market: Market Model for Bump-and-Revalue Risk
//!
//! ## Layer 1 (Foundation) Role
//!
//! `risk_market` holds everything a pricer reads and a risk engine bumps:
//! - Time and currency types: `Date`, `Currency` (`types`)
//! - Price, zero-rate and basis curves behind `CurveEnum` (`market_data::curves`)
//! - Parametric volatility surfaces (`market_data::surfaces`)
//! - The FX spot matrix and the `Arc`-shared `MarketModel` (`market_data`)
//! - The bumped-copy contract `Bumpable` (`traits`)
//!
//! Curves declare the curves they are derived from (`CurveEnum::depends_on`)
//! and rebuild themselves against a model (`CurveEnum::recalibrate`); the
//! risk engine uses both to cascade a bump through basis curves.
//!
//! ## Usage Examples
//!
//! ```rust
//! use risk_market::market_data::curves::{CurveEnum, PriceCurve};
//! use risk_market::market_data::{Bump, FxMatrix, MarketModel, Pillar};
//! use risk_market::traits::Bumpable;
//! use risk_market::types::{Currency, Date};
//!
//! let asof = Date::from_ymd(2024, 1, 1).unwrap();
//! let pillars = vec![
//!     Pillar::new("1Y", asof.add_days(365)),
//!     Pillar::new("2Y", asof.add_days(730)),
//! ];
//! let curve = CurveEnum::Price(
//!     PriceCurve::new("WTI", Currency::USD, pillars, vec![80.0, 82.0]).unwrap(),
//! );
//!
//! let mut model = MarketModel::new(asof, FxMatrix::new(Currency::USD));
//! model.add_curve(curve.clone());
//!
//! let bumped: Vec<MarketModel> = curve
//!     .scenarios((), &Bump::relative(0.01), None)
//!     .unwrap()
//!     .into_iter()
//!     .map(|s| model.with_curve(s.bumped))
//!     .collect();
//! assert_eq!(bumped.len(), 2);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for dates, currencies, pillars and bumps

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod market_data;
pub mod traits;
pub mod types;
