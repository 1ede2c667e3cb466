//! Pillars, bump conventions and bumped copies.

use std::fmt;

use super::error::MarketDataError;
use crate::types::Date;

/// Label used for whole-object (parallel) scenarios.
pub const PARALLEL_LABEL: &str = "Parallel";

/// A labelled tenor point of a curve or surface.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pillar {
    /// Tenor label, e.g. `"1Y"`
    pub label: String,
    /// Pillar date
    pub date: Date,
}

impl Pillar {
    /// Creates a pillar.
    pub fn new(label: impl Into<String>, date: Date) -> Self {
        Self {
            label: label.into(),
            date,
        }
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.date)
    }
}

/// How a bump size is applied to a quoted value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BumpConvention {
    /// `x + h`
    #[default]
    Absolute,
    /// `x * (1 + h)`
    Relative,
}

/// A signed bump size with its convention.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bump {
    /// Signed shift
    pub size: f64,
    /// Absolute or relative
    pub convention: BumpConvention,
}

impl Bump {
    /// Absolute bump `x + size`.
    pub fn absolute(size: f64) -> Self {
        Self {
            size,
            convention: BumpConvention::Absolute,
        }
    }

    /// Relative bump `x * (1 + size)`.
    pub fn relative(size: f64) -> Self {
        Self {
            size,
            convention: BumpConvention::Relative,
        }
    }

    /// Same bump in the opposite direction.
    pub fn negated(&self) -> Self {
        Self {
            size: -self.size,
            convention: self.convention,
        }
    }

    /// Applies the bump to one value.
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match self.convention {
            BumpConvention::Absolute => value + self.size,
            BumpConvention::Relative => value * (1.0 + self.size),
        }
    }

    /// Rejects zero and non-finite sizes.
    pub fn validate(&self) -> Result<(), MarketDataError> {
        if !self.size.is_finite() || self.size == 0.0 {
            return Err(MarketDataError::InvalidBump(format!(
                "bump size must be finite and non-zero, got {}",
                self.size
            )));
        }
        if self.convention == BumpConvention::Relative && self.size <= -1.0 {
            return Err(MarketDataError::InvalidBump(format!(
                "relative bump {} would flip the sign of the quote",
                self.size
            )));
        }
        Ok(())
    }
}

/// First pillar dated on or after `date`, if any. `pillars` must be in
/// ascending date order.
pub fn covering_pillar(pillars: &[Pillar], date: Date) -> Option<&Pillar> {
    pillars.iter().find(|p| p.date >= date)
}

/// Number of leading pillars that can move a value dated on or before
/// `horizon`: every pillar before it plus the first one on or after it,
/// which still carries interpolation weight. `None` keeps every pillar.
pub fn pillars_within_horizon(pillars: &[Pillar], horizon: Option<Date>) -> usize {
    match horizon {
        None => pillars.len(),
        Some(h) => pillars
            .iter()
            .position(|p| p.date >= h)
            .map_or(pillars.len(), |i| i + 1),
    }
}

/// A bumped copy of a market object together with the pillar it moved.
#[derive(Clone, Debug, PartialEq)]
pub struct PillarScenario<T> {
    /// Pillar that was shifted (or the parallel pseudo-pillar)
    pub pillar: Pillar,
    /// The perturbed object
    pub bumped: T,
}

impl<T> PillarScenario<T> {
    /// Maps the bumped object, keeping the pillar.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> PillarScenario<U> {
        PillarScenario {
            pillar: self.pillar,
            bumped: f(self.bumped),
        }
    }
}
