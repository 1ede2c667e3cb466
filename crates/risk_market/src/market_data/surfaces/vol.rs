//! Parametric volatility surface in log-moneyness.

use std::fmt;
use std::str::FromStr;

use crate::market_data::curves::PillarValues;
use crate::market_data::error::MarketDataError;
use crate::market_data::pillar::{Bump, Pillar, PillarScenario};
use crate::traits::Bumpable;
use crate::types::Date;

/// Floor applied to implied volatilities.
const MIN_VOL: f64 = 1e-6;

/// The three per-expiry surface parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceParameter {
    /// At-the-money level
    Atm,
    /// Slope in log-moneyness
    Skew,
    /// Convexity in log-moneyness
    Curvature,
}

impl SurfaceParameter {
    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceParameter::Atm => "ATM",
            SurfaceParameter::Skew => "Skew",
            SurfaceParameter::Curvature => "Curvature",
        }
    }
}

impl fmt::Display for SurfaceParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SurfaceParameter {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "atm" => Ok(SurfaceParameter::Atm),
            "skew" => Ok(SurfaceParameter::Skew),
            "curvature" => Ok(SurfaceParameter::Curvature),
            _ => Err(MarketDataError::InvalidBump(format!(
                "unknown surface parameter: {}",
                s
            ))),
        }
    }
}

/// Volatility surface for one underlying.
///
/// `vol(T, K) = atm(T) + skew(T)·m + curvature(T)·m²` with
/// `m = ln(K / F)`, parameters interpolated linearly between expiry pillars.
#[derive(Clone, Debug, PartialEq)]
pub struct VolSurface {
    name: String,
    underlying: String,
    atm: PillarValues,
    skew: PillarValues,
    curvature: PillarValues,
}

impl VolSurface {
    /// Builds a surface from per-expiry parameters.
    pub fn new(
        name: impl Into<String>,
        underlying: impl Into<String>,
        expiries: Vec<Pillar>,
        atm: Vec<f64>,
        skew: Vec<f64>,
        curvature: Vec<f64>,
    ) -> Result<Self, MarketDataError> {
        let name = name.into();
        if let Some(&value) = atm.iter().find(|v| **v <= 0.0) {
            return Err(MarketDataError::InvalidValue { name, value });
        }
        Ok(Self {
            atm: PillarValues::new(&name, expiries.clone(), atm)?,
            skew: PillarValues::new(&name, expiries.clone(), skew)?,
            curvature: PillarValues::new(&name, expiries, curvature)?,
            underlying: underlying.into(),
            name,
        })
    }

    /// Flat ATM surface with no smile.
    pub fn flat(
        name: impl Into<String>,
        underlying: impl Into<String>,
        expiries: Vec<Pillar>,
        vol: f64,
    ) -> Result<Self, MarketDataError> {
        let n = expiries.len();
        Self::new(name, underlying, expiries, vec![vol; n], vec![0.0; n], vec![0.0; n])
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the price curve the surface is quoted against.
    pub fn underlying(&self) -> &str {
        &self.underlying
    }

    /// Expiry pillars.
    pub fn pillars(&self) -> &[Pillar] {
        self.atm.pillars()
    }

    /// Pillar vector of one parameter.
    pub fn parameter(&self, parameter: SurfaceParameter) -> &PillarValues {
        match parameter {
            SurfaceParameter::Atm => &self.atm,
            SurfaceParameter::Skew => &self.skew,
            SurfaceParameter::Curvature => &self.curvature,
        }
    }

    /// Implied volatility for `expiry` at `strike` given the forward.
    pub fn vol(&self, expiry: Date, strike: f64, forward: f64) -> f64 {
        let m = if strike > 0.0 && forward > 0.0 {
            (strike / forward).ln()
        } else {
            0.0
        };
        let vol = self.atm.value_at(expiry)
            + self.skew.value_at(expiry) * m
            + self.curvature.value_at(expiry) * m * m;
        vol.max(MIN_VOL)
    }

    fn with_parameter(&self, parameter: SurfaceParameter, values: PillarValues) -> Self {
        let mut surface = self.clone();
        match parameter {
            SurfaceParameter::Atm => surface.atm = values,
            SurfaceParameter::Skew => surface.skew = values,
            SurfaceParameter::Curvature => surface.curvature = values,
        }
        surface
    }
}

/// Bumps one parameter per expiry pillar.
impl Bumpable for VolSurface {
    type Target = SurfaceParameter;

    fn scenarios(
        &self,
        target: SurfaceParameter,
        bump: &Bump,
        horizon: Option<Date>,
    ) -> Result<Vec<PillarScenario<Self>>, MarketDataError> {
        self.parameter(target)
            .pillar_scenarios(bump, horizon, |p| self.with_parameter(target, p))
    }

    fn parallel(
        &self,
        target: SurfaceParameter,
        bump: &Bump,
    ) -> Result<PillarScenario<Self>, MarketDataError> {
        self.parameter(target)
            .parallel_scenario(bump, |p| self.with_parameter(target, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn surface() -> VolSurface {
        let expiries = vec![
            Pillar::new("6M", Date::from_ymd(2024, 7, 1).unwrap()),
            Pillar::new("1Y", Date::from_ymd(2025, 1, 1).unwrap()),
        ];
        VolSurface::new(
            "SPX-VOL",
            "SPX",
            expiries,
            vec![0.2, 0.22],
            vec![-0.1, -0.1],
            vec![0.05, 0.05],
        )
            .unwrap()
    }

    #[test]
    fn test_atm_vol_ignores_smile() {
        let s = surface();
        assert_relative_eq!(s.vol(Date::from_ymd(2025, 1, 1).unwrap(), 100.0, 100.0), 0.22);
    }

    #[test]
    fn test_smile_terms() {
        let s = surface();
        let m = (110.0f64 / 100.0).ln();
        let expected = 0.22 - 0.1 * m + 0.05 * m * m;
        assert_relative_eq!(
            s.vol(Date::from_ymd(2025, 1, 1).unwrap(), 110.0, 100.0),
            expected,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_bump_touches_only_target_parameter() {
        let s = surface();
        let scenarios = s
            .scenarios(SurfaceParameter::Skew, &Bump::absolute(0.001), None)
            .unwrap();
        assert_eq!(scenarios.len(), 2);
        let bumped = &scenarios[1].bumped;
        assert_eq!(bumped.parameter(SurfaceParameter::Atm), s.parameter(SurfaceParameter::Atm));
        assert_relative_eq!(
            bumped.parameter(SurfaceParameter::Skew).values()[1],
            -0.099,
            epsilon = 1e-12
        );
        assert_relative_eq!(bumped.parameter(SurfaceParameter::Skew).values()[0], -0.1);
    }

    #[test]
    fn test_parameter_parse() {
        assert_eq!("ATM".parse::<SurfaceParameter>().unwrap(), SurfaceParameter::Atm);
        assert_eq!("curvature".parse::<SurfaceParameter>().unwrap(), SurfaceParameter::Curvature);
        assert!("vanna".parse::<SurfaceParameter>().is_err());
    }
}
