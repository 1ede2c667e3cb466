//! The market model: every curve, surface and FX spot for one valuation.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::curves::CurveEnum;
use super::error::MarketDataError;
use super::fx::FxMatrix;
use super::surfaces::VolSurface;
use crate::types::{Currency, Date};

/// Immutable-by-convention market snapshot.
///
/// Objects are held behind `Arc`, so cloning a model is a handful of
/// reference-count increments. Bumping builds a new model in which only
/// the replaced object is new; every other object is shared with the base.
///
/// # Example
///
/// ```
/// use risk_market::market_data::curves::{CurveEnum, RateCurve};
/// use risk_market::market_data::{FxMatrix, MarketModel, Pillar};
/// use risk_market::types::{Currency, Date};
///
/// let asof = Date::from_ymd(2024, 1, 1).unwrap();
/// let ois = RateCurve::new(
///     "USD-OIS",
///     Currency::USD,
///     vec![Pillar::new("1Y", asof.add_days(365))],
///     vec![0.05],
/// )
/// .unwrap();
///
/// let mut model = MarketModel::new(asof, FxMatrix::new(Currency::USD));
/// model.add_curve(CurveEnum::Rate(ois));
/// model.set_discount_curve(Currency::USD, "USD-OIS");
///
/// let df = model.discount_factor(Currency::USD, asof.add_days(365)).unwrap();
/// assert!((df - (-0.05f64).exp()).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct MarketModel {
    valuation_date: Date,
    curves: BTreeMap<String, Arc<CurveEnum>>,
    surfaces: BTreeMap<String, Arc<VolSurface>>,
    fx: Arc<FxMatrix>,
    discount_curves: BTreeMap<Currency, String>,
}

impl MarketModel {
    /// Empty model.
    pub fn new(valuation_date: Date, fx: FxMatrix) -> Self {
        Self {
            valuation_date,
            curves: BTreeMap::new(),
            surfaces: BTreeMap::new(),
            fx: Arc::new(fx),
            discount_curves: BTreeMap::new(),
        }
    }

    /// Valuation date.
    #[inline]
    pub fn valuation_date(&self) -> Date {
        self.valuation_date
    }

    /// Curve by name.
    pub fn curve(&self, name: &str) -> Result<&CurveEnum, MarketDataError> {
        self.curves
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::CurveNotFound(name.to_string()))
    }

    /// Whether a curve with this name exists.
    pub fn has_curve(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    /// Curves in name order.
    pub fn curves(&self) -> impl Iterator<Item = &CurveEnum> + '_ {
        self.curves.values().map(Arc::as_ref)
    }

    /// Surface by name.
    pub fn surface(&self, name: &str) -> Result<&VolSurface, MarketDataError> {
        self.surfaces
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| MarketDataError::SurfaceNotFound(name.to_string()))
    }

    /// Surfaces in name order.
    pub fn surfaces(&self) -> impl Iterator<Item = &VolSurface> + '_ {
        self.surfaces.values().map(Arc::as_ref)
    }

    /// FX matrix.
    pub fn fx(&self) -> &FxMatrix {
        &self.fx
    }

    /// Units of `to` per one unit of `from`.
    pub fn fx_rate(&self, from: Currency, to: Currency) -> Result<f64, MarketDataError> {
        self.fx.rate(from, to)
    }

    /// Inserts or replaces a curve.
    pub fn add_curve(&mut self, curve: CurveEnum) {
        self.curves.insert(curve.name().to_string(), Arc::new(curve));
    }

    /// Inserts or replaces a surface.
    pub fn add_surface(&mut self, surface: VolSurface) {
        self.surfaces
            .insert(surface.name().to_string(), Arc::new(surface));
    }

    /// Registers the discount curve for a currency.
    pub fn set_discount_curve(&mut self, ccy: Currency, curve: impl Into<String>) {
        self.discount_curves.insert(ccy, curve.into());
    }

    /// Sets the spot of `ccy` against the base currency.
    pub fn set_fx_spot(&mut self, ccy: Currency, spot: f64) -> Result<(), MarketDataError> {
        Arc::make_mut(&mut self.fx).set_spot(ccy, spot)
    }

    /// Copy of the model with `curve` substituted.
    pub fn with_curve(&self, curve: CurveEnum) -> Self {
        let mut model = self.clone();
        model.add_curve(curve);
        model
    }

    /// Copy of the model with `surface` substituted.
    pub fn with_surface(&self, surface: VolSurface) -> Self {
        let mut model = self.clone();
        model.add_surface(surface);
        model
    }

    /// Copy of the model with one FX spot replaced.
    pub fn with_fx_spot(&self, ccy: Currency, spot: f64) -> Result<Self, MarketDataError> {
        let mut model = self.clone();
        model.set_fx_spot(ccy, spot)?;
        Ok(model)
    }

    /// Copy of the model valued on another date. Quotes are unchanged.
    pub fn rolled_to(&self, valuation_date: Date) -> Self {
        Self {
            valuation_date,
            ..self.clone()
        }
    }

    /// Name of the discount curve registered for `ccy`.
    pub fn discount_curve_name(&self, ccy: Currency) -> Result<&str, MarketDataError> {
        self.discount_curves
            .get(&ccy)
            .map(String::as_str)
            .ok_or(MarketDataError::DiscountCurveNotFound(ccy))
    }

    /// Discount curve registered for `ccy`.
    pub fn discount_curve_for(&self, ccy: Currency) -> Result<&CurveEnum, MarketDataError> {
        self.curve(self.discount_curve_name(ccy)?)
    }

    /// Discount factor in `ccy` from the valuation date to `date`.
    pub fn discount_factor(&self, ccy: Currency, date: Date) -> Result<f64, MarketDataError> {
        self.discount_curve_for(ccy)?
            .discount_factor(self.valuation_date, date)
    }

    /// True when both models hold the very same curve object under `name`.
    pub fn shares_curve(&self, other: &MarketModel, name: &str) -> bool {
        match (self.curves.get(name), other.curves.get(name)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}
