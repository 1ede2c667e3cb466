//! # risk_greeks (L4: Application)
//!
//! Bump-and-revalue Greeks over a portfolio and a market model.
//!
//! Every sensitivity is computed the same way: pick the trades a risk
//! factor can move, price them, bump the factor pillar by pillar, cascade
//! the bump into curves derived from it, reprice, and difference. Results
//! come back as a [`risk_cube::ResultCube`] keyed by
//! `{TradeId, TradeType, RiskFactorId, PillarLabel, Metric}` plus any
//! pass-through trade tags.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               risk_greeks (L4)               │
//! ├──────────────────────────────────────────────┤
//! │  report/      - composite reports            │
//! │  metrics/     - delta, vega, IR, FX, theta,  │
//! │                 charm, benchmark adapters    │
//! │  calculator/  - generic bump-and-revalue     │
//! │  selector     - sub-portfolio selection      │
//! │  scenarios/   - risk factors and sources     │
//! │  dependency/  - curve graph and cascade      │
//! │  pricing/     - PortfolioPricer boundary     │
//! │  portfolio/   - trades and instruments       │
//! │  config       - TOML/env/CLI configuration   │
//! └──────────────────────────────────────────────┘
//!          ↓                          ↓
//! ┌──────────────────────┐  ┌────────────────────┐
//! │   risk_market (L1)   │  │   risk_cube (L1)   │
//! └──────────────────────┘  └────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use risk_greeks::calculator::{CalculatorConfig, GreekCalculator};
//! use risk_greeks::metrics::{DeltaGammaAdapter, MetricAdapter, RiskContext};
//! use risk_greeks::portfolio::{Instrument, Portfolio, Trade};
//! use risk_greeks::pricing::AnalyticPricer;
//! use risk_market::market_data::curves::{CurveEnum, PriceCurve, RateCurve};
//! use risk_market::market_data::{FxMatrix, MarketModel, Pillar};
//! use risk_market::types::{Currency, Date};
//!
//! let asof = Date::from_ymd(2024, 1, 2).unwrap();
//! let pillars = vec![Pillar::new("1Y", asof.add_days(365))];
//!
//! let mut model = MarketModel::new(asof, FxMatrix::new(Currency::USD));
//! model.add_curve(CurveEnum::Price(
//!     PriceCurve::new("WTI", Currency::USD, pillars.clone(), vec![100.0]).unwrap(),
//! ));
//! model.add_curve(CurveEnum::Rate(
//!     RateCurve::new("USD-OIS", Currency::USD, pillars, vec![0.0]).unwrap(),
//! ));
//! model.set_discount_curve(Currency::USD, "USD-OIS");
//!
//! let book = Portfolio::new(vec![Trade::new(
//!     "T1",
//!     Instrument::Forward {
//!         underlying: "WTI".to_string(),
//!         discount_curve: "USD-OIS".to_string(),
//!         currency: Currency::USD,
//!         delivery: asof.add_days(365),
//!         strike: 0.0,
//!         units: 10_000.0,
//!     },
//! )])
//! .unwrap();
//!
//! let calculator =
//!     GreekCalculator::new(Arc::new(AnalyticPricer::new()), CalculatorConfig::new()).unwrap();
//! let ctx = RiskContext::new(&model, &book, &calculator).unwrap();
//! let cube = DeltaGammaAdapter::default().compute_all(&ctx).unwrap();
//!
//! // Delta per unit relative move: 10,000 units x 100.
//! let delta = cube.rows()[0].value();
//! assert!((delta - 1_000_000.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod calculator;
pub mod columns;
pub mod config;
pub mod dependency;
pub mod error;
pub mod metrics;
pub mod parallel;
pub mod portfolio;
pub mod pricing;
pub mod report;
pub mod scenarios;
pub mod selector;

// Re-export commonly used types
pub use calculator::{CalculatorConfig, GreekCalculator, GreekRequest, Sidedness, UnitRescale};
pub use config::{build_config, CliOverrides, ConfigError, RiskConfig};
pub use dependency::{CascadeStrategy, CurveDependencyGraph, RecalibrationCascade};
pub use error::GreeksError;
pub use metrics::{MetricAdapter, RiskContext};
pub use parallel::ParallelConfig;
pub use portfolio::{Instrument, Portfolio, Trade, TradeId};
pub use pricing::{AnalyticPricer, PortfolioPricer, PricingError};
pub use report::RiskReportBuilder;
pub use scenarios::{RiskFactorId, ScenarioSource};
pub use selector::SubPortfolioSelector;
