//! Shared market and book fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use risk_greeks::calculator::{CalculatorConfig, GreekCalculator};
use risk_greeks::portfolio::{Instrument, OptionType, Portfolio, Trade};
use risk_greeks::pricing::{AnalyticPricer, PortfolioPricer};
use risk_market::market_data::curves::{BasisCurve, CurveEnum, PriceCurve, RateCurve};
use risk_market::market_data::{FxMatrix, MarketModel, Pillar, VolSurface};
use risk_market::types::{Currency, Date};

pub fn asof() -> Date {
    Date::from_ymd(2024, 1, 2).unwrap()
}

pub fn one_year() -> Date {
    asof().add_days(365)
}

pub fn pillars() -> Vec<Pillar> {
    vec![
        Pillar::new("6M", asof().add_days(182)),
        Pillar::new("1Y", one_year()),
        Pillar::new("2Y", asof().add_days(730)),
    ]
}

/// WTI at 100 flat, BRENT = WTI + 5, zero USD and EUR rates, a flat 30%
/// WTI surface, EURUSD at 1.1.
pub fn market() -> MarketModel {
    market_with_rates(0.0)
}

pub fn market_with_rates(rate: f64) -> MarketModel {
    let fx = FxMatrix::new(Currency::USD).with_spot(Currency::EUR, 1.1).unwrap();
    let mut model = MarketModel::new(asof(), fx);
    let wti =
        CurveEnum::Price(PriceCurve::new("WTI", Currency::USD, pillars(), vec![100.0; 3]).unwrap());
    let brent = CurveEnum::Basis(BasisCurve::over("BRENT", &wti, pillars(), vec![5.0; 3]).unwrap());
    model.add_curve(wti);
    model.add_curve(brent);
    model.add_curve(CurveEnum::Rate(
        RateCurve::new("USD-OIS", Currency::USD, pillars(), vec![rate; 3]).unwrap(),
    ));
    model.add_curve(CurveEnum::Rate(
        RateCurve::new("EUR-OIS", Currency::EUR, pillars(), vec![rate; 3]).unwrap(),
    ));
    model.set_discount_curve(Currency::USD, "USD-OIS");
    model.set_discount_curve(Currency::EUR, "EUR-OIS");
    model.add_surface(VolSurface::flat("WTI-VOL", "WTI", pillars(), 0.3).unwrap());
    model
}

pub fn forward(id: &str, underlying: &str, units: f64) -> Trade {
    Trade::new(
        id,
        Instrument::Forward {
            underlying: underlying.to_string(),
            discount_curve: "USD-OIS".to_string(),
            currency: Currency::USD,
            delivery: one_year(),
            strike: 0.0,
            units,
        },
    )
}

pub fn call(id: &str, strike: f64) -> Trade {
    Trade::new(
        id,
        Instrument::EuropeanOption {
            underlying: "WTI".to_string(),
            surface: "WTI-VOL".to_string(),
            discount_curve: "USD-OIS".to_string(),
            currency: Currency::USD,
            expiry: one_year(),
            strike,
            units: 1_000.0,
            option_type: OptionType::Call,
        },
    )
}

pub fn eur_forward(id: &str, notional: f64) -> Trade {
    Trade::new(
        id,
        Instrument::FxForward {
            foreign: Currency::EUR,
            domestic: Currency::USD,
            foreign_curve: "EUR-OIS".to_string(),
            domestic_curve: "USD-OIS".to_string(),
            delivery: one_year(),
            strike: 1.0,
            notional,
        },
    )
}

pub fn zero_coupon(id: &str, notional: f64) -> Trade {
    Trade::new(
        id,
        Instrument::ZeroCouponBond {
            discount_curve: "USD-OIS".to_string(),
            currency: Currency::USD,
            maturity: one_year(),
            notional,
        },
    )
}

pub fn book(trades: Vec<Trade>) -> Portfolio {
    Portfolio::new(trades).unwrap()
}

pub fn calculator() -> GreekCalculator {
    calculator_with(Arc::new(AnalyticPricer::new()), CalculatorConfig::new())
}

pub fn calculator_with(
    pricer: Arc<dyn PortfolioPricer>,
    config: CalculatorConfig,
) -> GreekCalculator {
    GreekCalculator::new(pricer, config).unwrap()
}
