//! Scenario sources: one per kind of risk factor.
//!
//! A source turns a signed shift into an ordered list of
//! [`FactorScenario`]s and knows how to apply one to a market model.

use std::sync::Arc;

use risk_market::market_data::curves::CurveEnum;
use risk_market::market_data::{
    pillars_within_horizon, Bump, BumpConvention, MarketDataError, MarketModel, Pillar,
    SurfaceParameter, VolSurface, PARALLEL_LABEL,
};
use risk_market::traits::Bumpable;
use risk_market::types::{Currency, Date};
use serde::Deserialize;

use super::risk_factor::RiskFactorId;
use super::stripper::CurveStripper;
use crate::error::GreeksError;

/// Pillar label of FX spot scenarios.
pub const SPOT_LABEL: &str = "Spot";

/// Per-pillar bumps or one whole-object shift.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BumpMode {
    /// One scenario per pillar
    #[default]
    PerPillar,
    /// One scenario moving every pillar
    Parallel,
}

/// The change a scenario makes to the market model.
#[derive(Clone, Debug, PartialEq)]
pub enum Perturbation {
    /// Substitute this curve
    Curve(CurveEnum),
    /// Substitute this surface
    Surface(VolSurface),
    /// Replace one FX spot
    FxSpot {
        /// Currency moved against base
        currency: Currency,
        /// New spot
        spot: f64,
    },
    /// Move the valuation date
    ValuationDate(Date),
    /// Re-strip a curve from bumped par quotes
    ParQuotes {
        /// Curve to strip
        curve: String,
        /// Full bumped quote vector
        quotes: Vec<f64>,
    },
}

impl Perturbation {
    /// Curve whose dependents must be recalibrated after this change.
    pub fn touched_curve(&self) -> Option<&str> {
        match self {
            Perturbation::Curve(c) => Some(c.name()),
            Perturbation::ParQuotes { curve, .. } => Some(curve),
            _ => None,
        }
    }

    /// Substitutes the perturbed object into a copy of `model`.
    pub fn apply_to(&self, model: &MarketModel) -> Result<MarketModel, GreeksError> {
        match self {
            Perturbation::Curve(c) => Ok(model.with_curve(c.clone())),
            Perturbation::Surface(s) => Ok(model.with_surface(s.clone())),
            Perturbation::FxSpot { currency, spot } => Ok(model.with_fx_spot(*currency, *spot)?),
            Perturbation::ValuationDate(date) => Ok(model.rolled_to(*date)),
            Perturbation::ParQuotes { curve, .. } => Err(GreeksError::UnsupportedScenario(format!(
                "par quotes for {} need a curve stripper",
                curve
            ))),
        }
    }
}

/// One perturbed market state, labelled by the pillar it moved.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorScenario {
    /// Pillar label and date
    pub pillar: Pillar,
    /// What changes
    pub perturbation: Perturbation,
}

/// Generates and applies the scenarios of one risk factor.
///
/// Calls with `+h` and `-h` must produce the same pillars in the same order.
pub trait ScenarioSource: Send + Sync {
    /// The factor this source bumps.
    fn risk_factor(&self) -> RiskFactorId;

    /// Scenarios for a signed shift, in pillar order. Pillars that cannot
    /// move a value dated on or before `horizon` are omitted: everything
    /// past the first pillar on or after it.
    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError>;

    /// Builds the scenario model. Defaults to substitution.
    fn apply(
        &self,
        model: &MarketModel,
        scenario: &FactorScenario,
    ) -> Result<MarketModel, GreeksError> {
        scenario.perturbation.apply_to(model)
    }
}

/// Bumps the pillars of a curve.
#[derive(Clone, Debug)]
pub struct CurveScenarioSource {
    curve: String,
    convention: BumpConvention,
    mode: BumpMode,
}

impl CurveScenarioSource {
    /// Per-pillar source for `curve`.
    pub fn new(curve: impl Into<String>, convention: BumpConvention) -> Self {
        Self {
            curve: curve.into(),
            convention,
            mode: BumpMode::PerPillar,
        }
    }

    /// Sets per-pillar or parallel mode.
    pub fn with_mode(mut self, mode: BumpMode) -> Self {
        self.mode = mode;
        self
    }
}

impl ScenarioSource for CurveScenarioSource {
    fn risk_factor(&self) -> RiskFactorId {
        RiskFactorId::curve(self.curve.clone())
    }

    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError> {
        let curve = model.curve(&self.curve)?;
        let bump = Bump {
            size: shift,
            convention: self.convention,
        };
        let bumped = match self.mode {
            BumpMode::PerPillar => curve.scenarios((), &bump, horizon)?,
            BumpMode::Parallel => vec![curve.parallel((), &bump)?],
        };
        Ok(bumped
            .into_iter()
            .map(|s| FactorScenario {
                pillar: s.pillar,
                perturbation: Perturbation::Curve(s.bumped),
            })
            .collect())
    }
}

/// Bumps one parameter of a volatility surface.
#[derive(Clone, Debug)]
pub struct SurfaceScenarioSource {
    surface: String,
    parameter: SurfaceParameter,
    convention: BumpConvention,
    mode: BumpMode,
}

impl SurfaceScenarioSource {
    /// Per-expiry source for `parameter` of `surface`.
    pub fn new(
        surface: impl Into<String>,
        parameter: SurfaceParameter,
        convention: BumpConvention,
    ) -> Self {
        Self {
            surface: surface.into(),
            parameter,
            convention,
            mode: BumpMode::PerPillar,
        }
    }

    /// Sets per-pillar or parallel mode.
    pub fn with_mode(mut self, mode: BumpMode) -> Self {
        self.mode = mode;
        self
    }
}

impl ScenarioSource for SurfaceScenarioSource {
    fn risk_factor(&self) -> RiskFactorId {
        RiskFactorId::vol_surface(self.surface.clone(), self.parameter)
    }

    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError> {
        let surface = model.surface(&self.surface)?;
        let bump = Bump {
            size: shift,
            convention: self.convention,
        };
        let bumped = match self.mode {
            BumpMode::PerPillar => surface.scenarios(self.parameter, &bump, horizon)?,
            BumpMode::Parallel => vec![surface.parallel(self.parameter, &bump)?],
        };
        Ok(bumped
            .into_iter()
            .map(|s| FactorScenario {
                pillar: s.pillar,
                perturbation: Perturbation::Surface(s.bumped),
            })
            .collect())
    }
}

/// Bumps the spot of one currency against the FX base.
#[derive(Clone, Debug)]
pub struct FxSpotScenarioSource {
    currency: Currency,
    convention: BumpConvention,
}

impl FxSpotScenarioSource {
    /// Source for `currency` against the model's base currency.
    pub fn new(currency: Currency, convention: BumpConvention) -> Self {
        Self { currency, convention }
    }
}

impl ScenarioSource for FxSpotScenarioSource {
    fn risk_factor(&self) -> RiskFactorId {
        RiskFactorId::FxSpot(self.currency)
    }

    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        _horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError> {
        if self.currency == model.fx().base() {
            return Err(GreeksError::RiskFactorNotFound(format!(
                "{} is the FX base currency",
                self.currency
            )));
        }
        let spot = model.fx().spot(self.currency)?;
        let bump = Bump {
            size: shift,
            convention: self.convention,
        };
        bump.validate()?;
        Ok(vec![FactorScenario {
            pillar: Pillar::new(SPOT_LABEL, model.valuation_date()),
            perturbation: Perturbation::FxSpot {
                currency: self.currency,
                spot: bump.apply(spot),
            },
        }])
    }
}

/// Rolls the valuation date by a whole number of days.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThetaSource;

impl ScenarioSource for ThetaSource {
    fn risk_factor(&self) -> RiskFactorId {
        RiskFactorId::Time
    }

    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        _horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError> {
        if shift == 0.0 || shift.fract() != 0.0 || !shift.is_finite() {
            return Err(MarketDataError::InvalidBump(format!(
                "time shift must be a non-zero whole number of days, got {}",
                shift
            ))
            .into());
        }
        let days = shift as i64;
        let rolled = model.valuation_date().add_days(days);
        Ok(vec![FactorScenario {
            pillar: Pillar::new(format!("{}D", days.abs()), rolled),
            perturbation: Perturbation::ValuationDate(rolled),
        }])
    }
}

/// Par quotes a curve is stripped from.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkQuotes {
    /// Curve name
    pub curve: String,
    /// Quote pillars
    pub pillars: Vec<Pillar>,
    /// Par quotes
    pub quotes: Vec<f64>,
}

impl BenchmarkQuotes {
    /// Uses a zero-rate curve's own pillars and rates as its quotes.
    pub fn from_rate_curve(curve: &CurveEnum) -> Result<Self, GreeksError> {
        match curve {
            CurveEnum::Rate(c) => Ok(Self {
                curve: c.name().to_string(),
                pillars: c.points().pillars().to_vec(),
                quotes: c.points().values().to_vec(),
            }),
            other => Err(MarketDataError::WrongCurveKind {
                name: other.name().to_string(),
                expected: "zero-rate",
                actual: other.kind().name(),
            }
            .into()),
        }
    }
}

/// Bumps par quotes and re-strips the curve.
///
/// Per-pillar mode moves one quote at a time. Parallel mode moves every
/// quote in a single scenario labelled [`PARALLEL_LABEL`].
#[derive(Clone)]
pub struct BenchmarkScenarioSource {
    quotes: BenchmarkQuotes,
    stripper: Arc<dyn CurveStripper>,
    convention: BumpConvention,
    mode: BumpMode,
}

impl BenchmarkScenarioSource {
    /// Absolute per-quote source over `quotes`, solved by `stripper`.
    pub fn new(quotes: BenchmarkQuotes, stripper: Arc<dyn CurveStripper>) -> Self {
        Self {
            quotes,
            stripper,
            convention: BumpConvention::Absolute,
            mode: BumpMode::PerPillar,
        }
    }

    /// Sets absolute or relative quote bumps.
    pub fn with_convention(mut self, convention: BumpConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Sets per-pillar or parallel mode.
    pub fn with_mode(mut self, mode: BumpMode) -> Self {
        self.mode = mode;
        self
    }

    fn perturbation(&self, quotes: Vec<f64>) -> Perturbation {
        Perturbation::ParQuotes {
            curve: self.quotes.curve.clone(),
            quotes,
        }
    }
}

impl ScenarioSource for BenchmarkScenarioSource {
    fn risk_factor(&self) -> RiskFactorId {
        RiskFactorId::benchmark(self.quotes.curve.clone())
    }

    fn scenarios(
        &self,
        model: &MarketModel,
        shift: f64,
        horizon: Option<Date>,
    ) -> Result<Vec<FactorScenario>, GreeksError> {
        model.curve(&self.quotes.curve)?;
        let bump = Bump {
            size: shift,
            convention: self.convention,
        };
        bump.validate()?;

        let pillars = &self.quotes.pillars;
        if self.mode == BumpMode::Parallel {
            let last = pillars.last().ok_or_else(|| MarketDataError::InsufficientPillars {
                name: self.quotes.curve.clone(),
                got: 0,
                need: 1,
            })?;
            let quotes = self.quotes.quotes.iter().map(|q| bump.apply(*q)).collect();
            return Ok(vec![FactorScenario {
                pillar: Pillar::new(PARALLEL_LABEL, last.date),
                perturbation: self.perturbation(quotes),
            }]);
        }

        Ok(pillars
            .iter()
            .take(pillars_within_horizon(pillars, horizon))
            .enumerate()
            .map(|(i, p)| {
                let mut quotes = self.quotes.quotes.clone();
                quotes[i] = bump.apply(quotes[i]);
                FactorScenario {
                    pillar: p.clone(),
                    perturbation: self.perturbation(quotes),
                }
            })
            .collect())
    }

    fn apply(
        &self,
        model: &MarketModel,
        scenario: &FactorScenario,
    ) -> Result<MarketModel, GreeksError> {
        match &scenario.perturbation {
            Perturbation::ParQuotes { curve, quotes } => {
                let currency = model.curve(curve)?.currency();
                let stripped = self
                    .stripper
                    .strip(curve, currency, &self.quotes.pillars, quotes, model)?;
                Ok(model.with_curve(stripped))
            }
            other => other.apply_to(model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios::ZeroRateStripper;
    use approx::assert_relative_eq;
    use risk_market::market_data::curves::RateCurve;
    use risk_market::market_data::FxMatrix;

    fn asof() -> Date {
        Date::from_ymd(2024, 1, 1).unwrap()
    }

    fn model() -> MarketModel {
        let pillars = vec![
            Pillar::new("1Y", asof().add_days(365)),
            Pillar::new("2Y", asof().add_days(730)),
        ];
        let mut model = MarketModel::new(
            asof(),
            FxMatrix::new(Currency::USD).with_spot(Currency::EUR, 1.1).unwrap(),
        );
        model.add_curve(CurveEnum::Rate(
            RateCurve::new("USD-OIS", Currency::USD, pillars.clone(), vec![0.05, 0.04]).unwrap(),
        ));
        model.add_surface(VolSurface::flat("V", "X", pillars, 0.2).unwrap());
        model
    }

    #[test]
    fn test_curve_source_up_and_down_labels_match() {
        let source = CurveScenarioSource::new("USD-OIS", BumpConvention::Absolute);
        let up = source.scenarios(&model(), 1e-4, None).unwrap();
        let down = source.scenarios(&model(), -1e-4, None).unwrap();
        let labels =
            |v: &[FactorScenario]| v.iter().map(|s| s.pillar.label.clone()).collect::<Vec<_>>();
        assert_eq!(labels(&up), labels(&down));
        assert_eq!(up[0].perturbation.touched_curve(), Some("USD-OIS"));
    }

    #[test]
    fn test_parallel_mode_single_scenario() {
        let source = CurveScenarioSource::new("USD-OIS", BumpConvention::Absolute)
            .with_mode(BumpMode::Parallel);
        let scenarios = source.scenarios(&model(), 1e-4, None).unwrap();
        assert_eq!(scenarios.len(), 1);
    }

    #[test]
    fn test_missing_curve() {
        let source = CurveScenarioSource::new("EUR-OIS", BumpConvention::Absolute);
        assert!(matches!(
            source.scenarios(&model(), 1e-4, None),
            Err(GreeksError::MarketData(MarketDataError::CurveNotFound(_)))
        ));
    }

    #[test]
    fn test_fx_source_applies_relative_bump() {
        let source = FxSpotScenarioSource::new(Currency::EUR, BumpConvention::Relative);
        let m = model();
        let scenarios = source.scenarios(&m, 0.01, None).unwrap();
        let bumped = source.apply(&m, &scenarios[0]).unwrap();
        assert_relative_eq!(bumped.fx().spot(Currency::EUR).unwrap(), 1.111, epsilon = 1e-12);
        assert!(scenarios[0].perturbation.touched_curve().is_none());

        let base = FxSpotScenarioSource::new(Currency::USD, BumpConvention::Relative);
        assert!(base.scenarios(&m, 0.01, None).is_err());
    }

    #[test]
    fn test_theta_rolls_date() {
        let m = model();
        let scenarios = ThetaSource.scenarios(&m, 1.0, None).unwrap();
        assert_eq!(scenarios[0].pillar.label, "1D");
        let rolled = ThetaSource.apply(&m, &scenarios[0]).unwrap();
        assert_eq!(rolled.valuation_date(), asof().add_days(1));
        assert!(ThetaSource.scenarios(&m, 0.5, None).is_err());
    }

    #[test]
    fn test_benchmark_source_restrips() {
        let m = model();
        let quotes = BenchmarkQuotes::from_rate_curve(m.curve("USD-OIS").unwrap()).unwrap();
        let source = BenchmarkScenarioSource::new(quotes, Arc::new(ZeroRateStripper));
        let scenarios = source.scenarios(&m, 1e-4, Some(asof().add_days(365))).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(source.scenarios(&m, 1e-4, Some(asof().add_days(400))).unwrap().len(), 2);

        let bumped = source.apply(&m, &scenarios[0]).unwrap();
        let curve = bumped.curve("USD-OIS").unwrap();
        assert_relative_eq!(curve.value_at(asof().add_days(365)), 0.0501, epsilon = 1e-12);
        assert_relative_eq!(curve.value_at(asof().add_days(730)), 0.04, epsilon = 1e-12);

        // substitution alone cannot apply par quotes
        assert!(matches!(
            scenarios[0].perturbation.apply_to(&m),
            Err(GreeksError::UnsupportedScenario(_))
        ));
    }

    #[test]
    fn test_benchmark_source_relative_parallel() {
        let m = model();
        let quotes = BenchmarkQuotes::from_rate_curve(m.curve("USD-OIS").unwrap()).unwrap();
        let source = BenchmarkScenarioSource::new(quotes, Arc::new(ZeroRateStripper))
            .with_convention(BumpConvention::Relative)
            .with_mode(BumpMode::Parallel);
        let scenarios = source.scenarios(&m, 0.1, None).unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].pillar.label, PARALLEL_LABEL);

        let bumped = source.apply(&m, &scenarios[0]).unwrap();
        let curve = bumped.curve("USD-OIS").unwrap();
        assert_relative_eq!(curve.value_at(asof().add_days(365)), 0.055, epsilon = 1e-12);
        assert_relative_eq!(curve.value_at(asof().add_days(730)), 0.044, epsilon = 1e-12);
    }
}
