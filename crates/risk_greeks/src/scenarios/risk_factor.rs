//! Risk factor identification.

use std::fmt;

use risk_market::market_data::SurfaceParameter;
use risk_market::types::Currency;

/// A market quantity a Greek is taken against.
///
/// # Examples
///
/// ```rust
/// use risk_greeks::scenarios::RiskFactorId;
/// use risk_market::market_data::SurfaceParameter;
/// use risk_market::types::Currency;
///
/// assert_eq!(RiskFactorId::curve("WTI").to_string(), "Curve:WTI");
/// assert_eq!(
///     RiskFactorId::vol_surface("WTI-VOL", SurfaceParameter::Atm).to_string(),
///     "VolSurface:WTI-VOL:ATM"
/// );
/// assert_eq!(RiskFactorId::FxSpot(Currency::EUR).to_string(), "FxSpot:EUR");
/// assert_eq!(RiskFactorId::Time.to_string(), "Time");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskFactorId {
    /// Pillars of a price, rate or basis curve.
    Curve(String),

    /// One parameter of a volatility surface.
    VolSurface {
        /// Surface name
        surface: String,
        /// Bumped parameter
        parameter: SurfaceParameter,
    },

    /// Spot of a currency against the FX base currency.
    FxSpot(Currency),

    /// The valuation date.
    Time,

    /// Par quotes a curve is stripped from.
    Benchmark(String),
}

impl RiskFactorId {
    /// Curve risk factor.
    #[inline]
    pub fn curve(name: impl Into<String>) -> Self {
        Self::Curve(name.into())
    }

    /// Volatility surface parameter risk factor.
    #[inline]
    pub fn vol_surface(surface: impl Into<String>, parameter: SurfaceParameter) -> Self {
        Self::VolSurface {
            surface: surface.into(),
            parameter,
        }
    }

    /// Benchmark curve risk factor.
    #[inline]
    pub fn benchmark(curve: impl Into<String>) -> Self {
        Self::Benchmark(curve.into())
    }

    /// Kind of factor as a string.
    #[inline]
    pub fn factor_type(&self) -> &'static str {
        match self {
            Self::Curve(_) => "Curve",
            Self::VolSurface { .. } => "VolSurface",
            Self::FxSpot(_) => "FxSpot",
            Self::Time => "Time",
            Self::Benchmark(_) => "Benchmark",
        }
    }

    /// Market object name: curve, surface or currency code.
    pub fn name(&self) -> &str {
        match self {
            Self::Curve(name) | Self::Benchmark(name) => name,
            Self::VolSurface { surface, .. } => surface,
            Self::FxSpot(ccy) => ccy.code(),
            Self::Time => "Time",
        }
    }
}

impl fmt::Display for RiskFactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VolSurface { surface, parameter } => {
                write!(f, "VolSurface:{}:{}", surface, parameter)
            }
            Self::Time => write!(f, "Time"),
            other => write!(f, "{}:{}", other.factor_type(), other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_type_and_name() {
        assert_eq!(RiskFactorId::curve("USD-OIS").factor_type(), "Curve");
        assert_eq!(RiskFactorId::benchmark("USD-OIS").to_string(), "Benchmark:USD-OIS");
        assert_eq!(RiskFactorId::FxSpot(Currency::GBP).name(), "GBP");
        assert_eq!(
            RiskFactorId::vol_surface("S", SurfaceParameter::Curvature).name(),
            "S"
        );
    }

    #[test]
    fn test_ordering_groups_by_kind() {
        let mut factors = vec![
            RiskFactorId::Time,
            RiskFactorId::curve("B"),
            RiskFactorId::curve("A"),
        ];
        factors.sort();
        assert_eq!(factors[0], RiskFactorId::curve("A"));
        assert_eq!(factors[2], RiskFactorId::Time);
    }
}
