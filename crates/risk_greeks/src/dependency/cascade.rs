//! Recalibration cascade: propagate a bumped curve into its dependents.

use std::collections::BTreeSet;

use risk_market::market_data::{MarketDataError, MarketModel};
use tracing::debug;

use super::graph::CurveDependencyGraph;
use crate::error::GreeksError;

/// Default pass budget of [`CascadeStrategy::BoundedPasses`].
pub const DEFAULT_MAX_PASSES: usize = 10;

/// How dependent curves are ordered for recalibration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CascadeStrategy {
    /// Work-set passes: recalibrate every curve whose affected parents are
    /// done, defer the rest, give up after `max_passes`.
    BoundedPasses {
        /// Pass budget
        max_passes: usize,
    },
    /// Recalibrate the affected sub-graph in topological order.
    Topological,
}

impl Default for CascadeStrategy {
    fn default() -> Self {
        CascadeStrategy::BoundedPasses {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// What a cascade run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Curves recalibrated, in recalibration order
    pub recalibrated: Vec<String>,
    /// Passes used
    pub passes: usize,
}

/// Rebuilds every curve derived, directly or transitively, from a bumped
/// curve so that the scenario model is internally consistent.
#[derive(Clone, Copy, Debug)]
pub struct RecalibrationCascade<'g> {
    graph: &'g CurveDependencyGraph,
    strategy: CascadeStrategy,
}

impl<'g> RecalibrationCascade<'g> {
    /// Cascade over `graph`.
    pub fn new(graph: &'g CurveDependencyGraph, strategy: CascadeStrategy) -> Self {
        Self { graph, strategy }
    }

    /// Recalibrates the dependents of `bumped` inside `model`.
    ///
    /// `model` must already hold the bumped curve. On error the model may be
    /// partially updated and must be discarded.
    pub fn run(
        &self,
        model: &mut MarketModel,
        bumped: &str,
    ) -> Result<CascadeOutcome, GreeksError> {
        if self.graph.dependents(bumped).is_empty() {
            return Ok(CascadeOutcome::default());
        }
        match self.strategy {
            CascadeStrategy::BoundedPasses { max_passes } => {
                self.run_passes(model, bumped, max_passes)
            }
            CascadeStrategy::Topological => self.run_topological(model, bumped),
        }
    }

    fn run_passes(
        &self,
        model: &mut MarketModel,
        bumped: &str,
        max_passes: usize,
    ) -> Result<CascadeOutcome, GreeksError> {
        let affected: BTreeSet<String> = self.graph.all_dependents(bumped).into_iter().collect();
        let mut resolved: BTreeSet<String> = BTreeSet::new();
        let mut outcome = CascadeOutcome::default();
        let mut work: Vec<String> = self.graph.dependents(bumped).to_vec();

        while !work.is_empty() && outcome.passes < max_passes {
            outcome.passes += 1;
            let mut deferred = Vec::new();
            let mut next = Vec::new();

            for curve in work {
                if resolved.contains(&curve) {
                    continue;
                }
                let ready = self
                    .graph
                    .parents(&curve)
                    .iter()
                    .all(|p| !affected.contains(p) || resolved.contains(p));
                if !ready {
                    deferred.push(curve);
                    continue;
                }
                recalibrate(model, &curve)?;
                for child in self.graph.dependents(&curve) {
                    next.push(child.clone());
                }
                resolved.insert(curve.clone());
                outcome.recalibrated.push(curve);
            }

            debug!(
                bumped,
                pass = outcome.passes,
                deferred = deferred.len(),
                "Cascade pass complete"
            );

            deferred.extend(next);
            deferred.sort();
            deferred.dedup();
            deferred.retain(|c| !resolved.contains(c));
            work = deferred;
        }

        let unresolved: Vec<String> = affected.difference(&resolved).cloned().collect();
        if !unresolved.is_empty() {
            return Err(GreeksError::CascadeUnresolved {
                passes: outcome.passes,
                curves: unresolved,
            });
        }
        Ok(outcome)
    }

    fn run_topological(
        &self,
        model: &mut MarketModel,
        bumped: &str,
    ) -> Result<CascadeOutcome, GreeksError> {
        let affected = self.graph.all_dependents(bumped);
        let subset: BTreeSet<&str> = affected.iter().map(String::as_str).collect();
        if subset.contains(bumped) {
            return Err(match self.graph.topological_order_of(&subset) {
                Err(e @ GreeksError::CyclicDependency { .. }) => e,
                _ => GreeksError::CyclicDependency { curves: affected },
            });
        }

        let order = self.graph.topological_order_of(&subset)?;
        for curve in &order {
            recalibrate(model, curve)?;
        }
        debug!(bumped, recalibrated = order.len(), "Topological cascade complete");
        Ok(CascadeOutcome {
            recalibrated: order,
            passes: 1,
        })
    }
}

fn recalibrate(model: &mut MarketModel, name: &str) -> Result<(), GreeksError> {
    let rebuilt = model
        .curve(name)?
        .recalibrate(model)
        .map_err(|e| match e {
            MarketDataError::MissingParent { curve, parent } => {
                GreeksError::MissingParent { curve, parent }
            }
            other => GreeksError::MarketData(other),
        })?;
    model.add_curve(rebuilt);
    Ok(())
}
