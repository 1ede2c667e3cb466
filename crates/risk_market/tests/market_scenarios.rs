//! Bumped copies of curves and surfaces substituted into a market model.

use approx::assert_relative_eq;
use risk_market::market_data::curves::{BasisCurve, CurveEnum, PriceCurve, RateCurve};
use risk_market::market_data::{
    Bump, FxMatrix, MarketModel, Pillar, SurfaceParameter, VolSurface, PARALLEL_LABEL,
};
use risk_market::traits::Bumpable;
use risk_market::types::{Currency, Date};

fn asof() -> Date {
    Date::from_ymd(2024, 1, 1).unwrap()
}

fn pillars() -> Vec<Pillar> {
    vec![
        Pillar::new("6M", asof().add_days(182)),
        Pillar::new("1Y", asof().add_days(365)),
        Pillar::new("2Y", asof().add_days(730)),
    ]
}

fn model() -> MarketModel {
    let mut model = MarketModel::new(
        asof(),
        FxMatrix::new(Currency::USD).with_spot(Currency::EUR, 1.1).unwrap(),
    );
    let wti = CurveEnum::Price(
        PriceCurve::new("WTI", Currency::USD, pillars(), vec![80.0, 81.0, 83.0]).unwrap(),
    );
    let brent =
        CurveEnum::Basis(BasisCurve::over("BRENT", &wti, pillars(), vec![3.0, 3.5, 4.0]).unwrap());
    model.add_curve(wti);
    model.add_curve(brent);
    model.add_curve(CurveEnum::Rate(
        RateCurve::new("USD-OIS", Currency::USD, pillars(), vec![0.05, 0.048, 0.045]).unwrap(),
    ));
    model.set_discount_curve(Currency::USD, "USD-OIS");
    model.add_surface(VolSurface::flat("WTI-VOL", "WTI", pillars(), 0.3).unwrap());
    model
}

#[test]
fn test_pillar_scenarios_in_pillar_order() {
    let model = model();
    let wti = model.curve("WTI").unwrap();
    let labels: Vec<String> = wti
        .scenarios((), &Bump::relative(0.01), None)
        .unwrap()
        .into_iter()
        .map(|s| s.pillar.label)
        .collect();
    assert_eq!(labels, vec!["6M", "1Y", "2Y"]);
}

#[test]
fn test_horizon_omits_later_pillars() {
    let model = model();
    let rate = model.curve("USD-OIS").unwrap();
    let scenarios = rate
        .scenarios((), &Bump::absolute(0.0001), Some(asof().add_days(365)))
        .unwrap();
    assert_eq!(scenarios.len(), 2);
    assert!(scenarios.iter().all(|s| s.pillar.date <= asof().add_days(365)));

    let between = rate
        .scenarios((), &Bump::absolute(0.0001), Some(asof().add_days(400)))
        .unwrap();
    let labels: Vec<&str> = between.iter().map(|s| s.pillar.label.as_str()).collect();
    assert_eq!(labels, vec!["6M", "1Y", "2Y"]);
}

#[test]
fn test_up_and_down_share_pillars() {
    let model = model();
    let surface = model.surface("WTI-VOL").unwrap();
    let up = surface
        .scenarios(SurfaceParameter::Atm, &Bump::absolute(0.001), None)
        .unwrap();
    let down = surface
        .scenarios(SurfaceParameter::Atm, &Bump::absolute(-0.001), None)
        .unwrap();
    let up_pillars: Vec<_> = up.iter().map(|s| &s.pillar).collect();
    let down_pillars: Vec<_> = down.iter().map(|s| &s.pillar).collect();
    assert_eq!(up_pillars, down_pillars);
}

#[test]
fn test_substitution_then_recalibration_preserves_spread() {
    let model = model();
    let wti = model.curve("WTI").unwrap();
    let bumped = wti.parallel((), &Bump::relative(0.01)).unwrap();
    assert_eq!(bumped.pillar.label, PARALLEL_LABEL);

    let mut scenario_model = model.with_curve(bumped.bumped);
    let brent = scenario_model.curve("BRENT").unwrap().recalibrate(&scenario_model).unwrap();
    scenario_model.add_curve(brent);

    let a = scenario_model.curve("WTI").unwrap();
    let b = scenario_model.curve("BRENT").unwrap();
    for (pillar, spread) in pillars().iter().zip([3.0, 3.5, 4.0]) {
        assert_relative_eq!(
            b.value_at(pillar.date) - a.value_at(pillar.date),
            spread,
            epsilon = 1e-9
        );
    }
    // base model untouched
    assert_relative_eq!(model.curve("WTI").unwrap().value_at(asof().add_days(182)), 80.0);
}

#[test]
fn test_invalid_bump_rejected() {
    let model = model();
    let wti = model.curve("WTI").unwrap();
    assert!(wti.scenarios((), &Bump::absolute(0.0), None).is_err());
}
