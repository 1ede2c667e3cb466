//! Static dispatch over the curve kinds held by the market model.

use super::rate::discount_factor;
use super::{BasisCurve, PriceCurve, QuotingConvention, RateCurve};
use crate::market_data::error::MarketDataError;
use crate::market_data::model::MarketModel;
use crate::market_data::pillar::{Bump, Pillar, PillarScenario};
use crate::traits::Bumpable;
use crate::types::{Currency, Date};

/// What a curve's values measure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CurveKind {
    /// Asset prices
    Price,
    /// Continuously compounded zero rates
    Rate,
}

impl CurveKind {
    /// Lower-case name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            CurveKind::Price => "price",
            CurveKind::Rate => "rate",
        }
    }
}

/// Every curve the market model can hold.
///
/// # Example
///
/// ```
/// use risk_market::market_data::curves::{BasisCurve, CurveEnum, PriceCurve};
/// use risk_market::market_data::Pillar;
/// use risk_market::types::{Currency, Date};
///
/// let pillars = vec![Pillar::new("1Y", Date::from_ymd(2025, 1, 1).unwrap())];
/// let wti = CurveEnum::Price(
///     PriceCurve::new("WTI", Currency::USD, pillars.clone(), vec![80.0]).unwrap(),
/// );
/// let brent = CurveEnum::Basis(BasisCurve::over("BRENT", &wti, pillars, vec![4.0]).unwrap());
///
/// assert_eq!(brent.depends_on(), vec!["WTI".to_string()]);
/// assert!(wti.depends_on().is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum CurveEnum {
    /// Price curve
    Price(PriceCurve),
    /// Zero-rate curve
    Rate(RateCurve),
    /// Spread over a parent curve
    Basis(BasisCurve),
}

impl CurveEnum {
    /// Curve name.
    pub fn name(&self) -> &str {
        match self {
            CurveEnum::Price(c) => c.name(),
            CurveEnum::Rate(c) => c.name(),
            CurveEnum::Basis(c) => c.name(),
        }
    }

    /// Curve currency.
    pub fn currency(&self) -> Currency {
        match self {
            CurveEnum::Price(c) => c.currency(),
            CurveEnum::Rate(c) => c.currency(),
            CurveEnum::Basis(c) => c.currency(),
        }
    }

    /// Price or rate; basis curves report their parent's kind.
    pub fn kind(&self) -> CurveKind {
        match self {
            CurveEnum::Price(_) => CurveKind::Price,
            CurveEnum::Rate(_) => CurveKind::Rate,
            CurveEnum::Basis(c) => c.kind(),
        }
    }

    /// Pillars that scenarios are generated on.
    pub fn pillars(&self) -> &[Pillar] {
        match self {
            CurveEnum::Price(c) => c.points().pillars(),
            CurveEnum::Rate(c) => c.points().pillars(),
            CurveEnum::Basis(c) => c.spreads().pillars(),
        }
    }

    /// Quoting convention of the pillar values.
    pub fn quoting_convention(&self) -> QuotingConvention {
        match self {
            CurveEnum::Price(c) => c.convention(),
            _ => QuotingConvention::Spot,
        }
    }

    /// Discount curve a forward-quoted price curve is de-discounted on.
    pub fn forward_discount_curve(&self) -> Option<&str> {
        match self {
            CurveEnum::Price(c) if c.convention() == QuotingConvention::Forward => {
                c.discount_curve()
            }
            _ => None,
        }
    }

    /// Raw interpolated value (price or zero rate) at `date`.
    pub fn value_at(&self, date: Date) -> f64 {
        match self {
            CurveEnum::Price(c) => c.price(date),
            CurveEnum::Rate(c) => c.zero_rate(date),
            CurveEnum::Basis(c) => c.value_at(date),
        }
    }

    /// Price for delivery on `date`; fails on rate curves.
    pub fn price(&self, date: Date) -> Result<f64, MarketDataError> {
        self.expect_kind(CurveKind::Price)?;
        Ok(self.value_at(date))
    }

    /// Discount factor from `asof` to `date`; fails on price curves.
    pub fn discount_factor(&self, asof: Date, date: Date) -> Result<f64, MarketDataError> {
        self.expect_kind(CurveKind::Rate)?;
        Ok(discount_factor(self.value_at(date), asof, date))
    }

    /// Names of the curves this curve is derived from.
    pub fn depends_on(&self) -> Vec<String> {
        match self {
            CurveEnum::Basis(c) => vec![c.parent().to_string()],
            _ => Vec::new(),
        }
    }

    /// Rebuilds the curve against the parents currently in `model`.
    ///
    /// Pure: the receiver and the model are left untouched. Curves with no
    /// parents come back unchanged.
    pub fn recalibrate(&self, model: &MarketModel) -> Result<CurveEnum, MarketDataError> {
        match self {
            CurveEnum::Basis(c) => {
                let parent = model.curve(c.parent()).map_err(|_| MarketDataError::MissingParent {
                    curve: c.name().to_string(),
                    parent: c.parent().to_string(),
                })?;
                Ok(CurveEnum::Basis(c.resolved_over(parent)?))
            }
            other => Ok(other.clone()),
        }
    }

    fn expect_kind(&self, expected: CurveKind) -> Result<(), MarketDataError> {
        let actual = self.kind();
        if actual != expected {
            return Err(MarketDataError::WrongCurveKind {
                name: self.name().to_string(),
                expected: expected.name(),
                actual: actual.name(),
            });
        }
        Ok(())
    }
}

/// Bumps the quoted pillars: prices, zero rates, or basis spreads.
impl Bumpable for CurveEnum {
    type Target = ();

    fn scenarios(
        &self,
        _target: (),
        bump: &Bump,
        horizon: Option<Date>,
    ) -> Result<Vec<PillarScenario<Self>>, MarketDataError> {
        match self {
            CurveEnum::Price(c) => c
                .points()
                .pillar_scenarios(bump, horizon, |p| CurveEnum::Price(c.with_points(p))),
            CurveEnum::Rate(c) => c
                .points()
                .pillar_scenarios(bump, horizon, |p| CurveEnum::Rate(c.with_points(p))),
            CurveEnum::Basis(c) => c
                .spreads()
                .pillar_scenarios(bump, horizon, |p| CurveEnum::Basis(c.with_spreads(p))),
        }
    }

    fn parallel(&self, _target: (), bump: &Bump) -> Result<PillarScenario<Self>, MarketDataError> {
        match self {
            CurveEnum::Price(c) => c
                .points()
                .parallel_scenario(bump, |p| CurveEnum::Price(c.with_points(p))),
            CurveEnum::Rate(c) => c
                .points()
                .parallel_scenario(bump, |p| CurveEnum::Rate(c.with_points(p))),
            CurveEnum::Basis(c) => c
                .spreads()
                .parallel_scenario(bump, |p| CurveEnum::Basis(c.with_spreads(p))),
        }
    }
}
