//! # risk_cube: Typed Result Tables for Risk Reports
//!
//! ## Layer 1 (Foundation) Role
//!
//! `risk_cube` provides the [`ResultCube`], the container every Greek
//! calculation writes into and every report is composed from:
//! - Schema-typed rows of `(metadata tuple, value)` (`schema`, `cube`)
//! - Reject-before-append validation of every row
//! - Cube algebra: filter, keyed and positional difference, merge with
//!   constant tag columns, stable sort, pivot (`algebra`)
//!
//! The crate has no dependencies on other workspace crates.
//!
//! ## Usage Examples
//!
//! ```rust
//! use risk_cube::{Aggregation, ResultCube, Schema};
//!
//! let schema = Schema::builder()
//!     .string("TradeId")
//!     .string("Metric")
//!     .build()
//!     .unwrap();
//!
//! let mut base = ResultCube::new(schema);
//! base.add_row(vec!["T1".into(), "PV".into()], 100.0).unwrap();
//! base.add_row(vec!["T2".into(), "PV".into()], 50.0).unwrap();
//!
//! let bumped = base.map_values(|v| v * 1.01);
//! let diff = bumped.quick_difference(&base).unwrap();
//! assert!((diff.sum_of_all_rows() - 1.5).abs() < 1e-9);
//!
//! let by_metric = diff.pivot(&["Metric"], Aggregation::Sum).unwrap();
//! assert_eq!(by_metric.len(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for schemas, values and rows

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

mod algebra;
mod cube;
mod error;
mod schema;

pub use algebra::Aggregation;
pub use cube::{ResultCube, Row};
pub use error::CubeError;
pub use schema::{Column, ColumnType, CubeValue, Schema, SchemaBuilder};
