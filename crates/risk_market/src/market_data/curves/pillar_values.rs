//! Pillar-indexed value vectors shared by every curve kind.

use crate::market_data::error::MarketDataError;
use crate::market_data::pillar::{
    pillars_within_horizon, Bump, Pillar, PillarScenario, PARALLEL_LABEL,
};
use crate::types::Date;

/// Values quoted on strictly increasing pillar dates.
///
/// Interpolation is linear in calendar days between pillars and flat
/// outside the pillar range.
#[derive(Clone, Debug, PartialEq)]
pub struct PillarValues {
    pillars: Vec<Pillar>,
    values: Vec<f64>,
}

impl PillarValues {
    /// Validates and builds a pillar vector for the object called `name`.
    pub fn new(
        name: &str,
        pillars: Vec<Pillar>,
        values: Vec<f64>,
    ) -> Result<Self, MarketDataError> {
        if pillars.is_empty() {
            return Err(MarketDataError::InsufficientPillars {
                name: name.to_string(),
                got: 0,
                need: 1,
            });
        }
        if pillars.len() != values.len() {
            return Err(MarketDataError::PillarMismatch {
                name: name.to_string(),
                expected: pillars.len(),
                actual: values.len(),
            });
        }
        if let Some(index) = pillars
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
        {
            return Err(MarketDataError::UnorderedPillars {
                name: name.to_string(),
                index: index + 1,
            });
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(MarketDataError::InvalidValue {
                name: name.to_string(),
                value,
            });
        }
        Ok(Self { pillars, values })
    }

    /// Pillars in date order.
    #[inline]
    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    /// Quoted values aligned with [`pillars`](Self::pillars).
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of pillars.
    #[inline]
    pub fn len(&self) -> usize {
        self.pillars.len()
    }

    /// Always false for a validated vector.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pillars.is_empty()
    }

    /// Interpolated value at `date`.
    pub fn value_at(&self, date: Date) -> f64 {
        let first = &self.pillars[0];
        if date <= first.date {
            return self.values[0];
        }
        let last = self.pillars.len() - 1;
        if date >= self.pillars[last].date {
            return self.values[last];
        }
        let upper = self.pillars.partition_point(|p| p.date <= date);
        let lower = upper - 1;
        let (d0, d1) = (self.pillars[lower].date, self.pillars[upper].date);
        let w = (date - d0) as f64 / (d1 - d0) as f64;
        self.values[lower] + w * (self.values[upper] - self.values[lower])
    }

    /// Same pillars with replacement values. Lengths must agree.
    pub(crate) fn with_values(&self, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), self.pillars.len());
        Self {
            pillars: self.pillars.clone(),
            values,
        }
    }

    /// Copy with one pillar shifted.
    pub fn bumped_at(&self, index: usize, bump: &Bump) -> Self {
        let mut values = self.values.clone();
        if let Some(v) = values.get_mut(index) {
            *v = bump.apply(*v);
        }
        self.with_values(values)
    }

    /// Copy with every pillar shifted.
    pub fn bumped_all(&self, bump: &Bump) -> Self {
        self.with_values(self.values.iter().map(|v| bump.apply(*v)).collect())
    }

    /// One bumped copy per pillar that can move a value dated on or before
    /// `horizon`, in pillar order. `rebuild` turns the bumped vector back
    /// into the owning object.
    pub(crate) fn pillar_scenarios<T, F>(
        &self,
        bump: &Bump,
        horizon: Option<Date>,
        rebuild: F,
    ) -> Result<Vec<PillarScenario<T>>, MarketDataError>
    where
        F: Fn(PillarValues) -> T,
    {
        bump.validate()?;
        Ok(self
            .pillars
            .iter()
            .take(pillars_within_horizon(&self.pillars, horizon))
            .enumerate()
            .map(|(i, p)| PillarScenario {
                pillar: p.clone(),
                bumped: rebuild(self.bumped_at(i, bump)),
            })
            .collect())
    }

    /// Single whole-vector shift labelled [`PARALLEL_LABEL`] and dated at
    /// the last pillar.
    pub(crate) fn parallel_scenario<T, F>(
        &self,
        bump: &Bump,
        rebuild: F,
    ) -> Result<PillarScenario<T>, MarketDataError>
    where
        F: FnOnce(PillarValues) -> T,
    {
        bump.validate()?;
        let last = self.pillars[self.pillars.len() - 1].date;
        Ok(PillarScenario {
            pillar: Pillar::new(PARALLEL_LABEL, last),
            bumped: rebuild(self.bumped_all(bump)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    fn sample() -> PillarValues {
        PillarValues::new(
            "S",
            vec![
                Pillar::new("1Y", d(2025, 1, 1)),
                Pillar::new("2Y", d(2026, 1, 1)),
            ],
            vec![100.0, 110.0],
        )
        .unwrap()
    }

    #[test]
    fn test_interpolation_and_flat_extrapolation() {
        let pv = sample();
        assert_relative_eq!(pv.value_at(d(2024, 1, 1)), 100.0);
        assert_relative_eq!(pv.value_at(d(2030, 1, 1)), 110.0);
        let fifth = d(2025, 1, 1).add_days(73);
        assert_relative_eq!(pv.value_at(fifth), 102.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_unordered_pillars() {
        let err = PillarValues::new(
            "S",
            vec![
                Pillar::new("2Y", d(2026, 1, 1)),
                Pillar::new("1Y", d(2025, 1, 1)),
            ],
            vec![1.0, 2.0],
        )
        .unwrap_err();
        assert!(matches!(err, MarketDataError::UnorderedPillars { index: 1, .. }));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let err = PillarValues::new("S", vec![Pillar::new("1Y", d(2025, 1, 1))], vec![1.0, 2.0])
            .unwrap_err();
        assert!(matches!(err, MarketDataError::PillarMismatch { .. }));
    }

    #[test]
    fn test_pillar_scenarios_respect_horizon() {
        let pv = sample();
        let scenarios = pv
            .pillar_scenarios(&Bump::relative(0.01), Some(d(2024, 6, 1)), |p| p)
            .unwrap();
        assert_eq!(scenarios.len(), 1);
        assert_eq!(scenarios[0].pillar.label, "1Y");
        assert_relative_eq!(scenarios[0].bumped.values()[0], 101.0, epsilon = 1e-12);
        assert_relative_eq!(scenarios[0].bumped.values()[1], 110.0);

        // Between pillars the later one still interpolates into the horizon.
        let between = pv
            .pillar_scenarios(&Bump::relative(0.01), Some(d(2025, 6, 1)), |p| p)
            .unwrap();
        assert_eq!(between.len(), 2);
        assert_eq!(between[1].pillar.label, "2Y");
    }

    #[test]
    fn test_parallel_scenario_moves_every_pillar() {
        let s = sample()
            .parallel_scenario(&Bump::absolute(1.0), |p| p)
            .unwrap();
        assert_eq!(s.pillar.label, PARALLEL_LABEL);
        assert_eq!(s.bumped.values(), &[101.0, 111.0]);
    }
}
