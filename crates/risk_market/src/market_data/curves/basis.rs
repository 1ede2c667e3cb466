//! Curves defined as an additive spread over a parent curve.

use super::pillar_values::PillarValues;
use super::{CurveEnum, CurveKind};
use crate::market_data::error::MarketDataError;
use crate::market_data::pillar::Pillar;
use crate::types::{Currency, Date};

/// `value(pillar) = parent(pillar.date) + spread(pillar)`.
///
/// The resolved values are fixed at construction and refreshed only by
/// [`BasisCurve::resolved_over`], so a bumped parent is invisible to a
/// basis curve until it is recalibrated.
#[derive(Clone, Debug, PartialEq)]
pub struct BasisCurve {
    name: String,
    parent: String,
    currency: Currency,
    kind: CurveKind,
    spreads: PillarValues,
    resolved: PillarValues,
}

impl BasisCurve {
    /// Builds a basis curve over `parent`, inheriting its kind and currency.
    pub fn over(
        name: impl Into<String>,
        parent: &CurveEnum,
        pillars: Vec<Pillar>,
        spreads: Vec<f64>,
    ) -> Result<Self, MarketDataError> {
        let name = name.into();
        let spreads = PillarValues::new(&name, pillars, spreads)?;
        let resolved = resolve(&spreads, parent);
        Ok(Self {
            name,
            parent: parent.name().to_string(),
            currency: parent.currency(),
            kind: parent.kind(),
            spreads,
            resolved,
        })
    }

    /// Same spreads recalibrated against a new parent.
    pub fn resolved_over(&self, parent: &CurveEnum) -> Result<Self, MarketDataError> {
        if parent.name() != self.parent {
            return Err(MarketDataError::MissingParent {
                curve: self.name.clone(),
                parent: self.parent.clone(),
            });
        }
        if parent.kind() != self.kind {
            return Err(MarketDataError::WrongCurveKind {
                name: parent.name().to_string(),
                expected: self.kind.name(),
                actual: parent.kind().name(),
            });
        }
        Ok(Self {
            resolved: resolve(&self.spreads, parent),
            ..self.clone()
        })
    }

    /// Curve name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent curve name.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Currency inherited from the parent.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Kind inherited from the parent.
    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    /// Spread vector.
    pub fn spreads(&self) -> &PillarValues {
        &self.spreads
    }

    /// Parent plus spread at each pillar.
    pub fn resolved(&self) -> &PillarValues {
        &self.resolved
    }

    /// Resolved value at `date`.
    pub fn value_at(&self, date: Date) -> f64 {
        self.resolved.value_at(date)
    }

    /// Copy with new spreads; resolved values move by the spread change.
    pub(crate) fn with_spreads(&self, spreads: PillarValues) -> Self {
        let resolved = self.resolved.with_values(
            self.resolved
                .values()
                .iter()
                .zip(self.spreads.values())
                .zip(spreads.values())
                .map(|((r, old), new)| r - old + new)
                .collect(),
        );
        Self {
            spreads,
            resolved,
            ..self.clone()
        }
    }
}

fn resolve(spreads: &PillarValues, parent: &CurveEnum) -> PillarValues {
    spreads.with_values(
        spreads
            .pillars()
            .iter()
            .zip(spreads.values())
            .map(|(p, s)| parent.value_at(p.date) + s)
            .collect(),
    )
}
