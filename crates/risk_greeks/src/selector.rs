//! Sub-portfolio selection: which trades a risk factor can move.

use std::collections::BTreeSet;

use risk_market::types::Currency;

use crate::dependency::CurveDependencyGraph;
use crate::portfolio::{Portfolio, Trade};
use crate::scenarios::RiskFactorId;

/// Identifiers whose presence in a trade's references makes it exposed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExposureSet {
    /// Every trade is exposed
    All,
    /// Trades referencing any of these names are exposed
    Names(BTreeSet<String>),
}

impl ExposureSet {
    /// Whether `trade` is exposed.
    pub fn matches(&self, trade: &Trade) -> bool {
        match self {
            ExposureSet::All => true,
            ExposureSet::Names(names) => trade
                .instrument()
                .references()
                .iter()
                .any(|r| names.contains(r)),
        }
    }
}

/// Picks the trades a risk factor can move.
///
/// A curve factor exposes trades referencing the curve or any curve
/// derived from it. A surface factor exposes trades on that surface. An FX
/// factor exposes trades in that currency, or every trade when it is the
/// reporting currency. The time factor exposes every trade.
#[derive(Clone, Copy, Debug)]
pub struct SubPortfolioSelector<'g> {
    graph: &'g CurveDependencyGraph,
    reporting_currency: Currency,
}

impl<'g> SubPortfolioSelector<'g> {
    /// Selector over `graph` for a report in `reporting_currency`.
    pub fn new(graph: &'g CurveDependencyGraph, reporting_currency: Currency) -> Self {
        Self {
            graph,
            reporting_currency,
        }
    }

    /// Exposure set of `factor`.
    pub fn exposure_set(&self, factor: &RiskFactorId) -> ExposureSet {
        match factor {
            RiskFactorId::Curve(name) | RiskFactorId::Benchmark(name) => {
                let mut names: BTreeSet<String> =
                    self.graph.all_dependents(name).into_iter().collect();
                names.insert(name.clone());
                ExposureSet::Names(names)
            }
            RiskFactorId::VolSurface { surface, .. } => {
                ExposureSet::Names(BTreeSet::from([surface.clone()]))
            }
            RiskFactorId::FxSpot(ccy) if *ccy == self.reporting_currency => ExposureSet::All,
            RiskFactorId::FxSpot(ccy) => {
                ExposureSet::Names(BTreeSet::from([ccy.code().to_string()]))
            }
            RiskFactorId::Time => ExposureSet::All,
        }
    }

    /// Exposed trades in portfolio order.
    pub fn select(&self, portfolio: &Portfolio, factor: &RiskFactorId) -> Vec<Trade> {
        let exposure = self.exposure_set(factor);
        portfolio
            .trades()
            .iter()
            .filter(|t| exposure.matches(t))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Instrument;
    use risk_market::types::Date;

    fn forward(id: &str, underlying: &str) -> Trade {
        Trade::new(
            id,
            Instrument::Forward {
                underlying: underlying.to_string(),
                discount_curve: "USD-OIS".to_string(),
                currency: Currency::USD,
                delivery: Date::from_ymd(2025, 1, 1).unwrap(),
                strike: 0.0,
                units: 1.0,
            },
        )
    }

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            forward("T1", "WTI"),
            forward("T2", "BRENT"),
            forward("T3", "GOLD"),
        ])
        .unwrap()
    }

    fn graph() -> CurveDependencyGraph {
        CurveDependencyGraph::from_edges(["WTI", "BRENT", "GOLD", "USD-OIS"], [("BRENT", "WTI")])
    }

    fn ids(trades: &[Trade]) -> Vec<&str> {
        trades.iter().map(|t| t.id().as_str()).collect()
    }

    #[test]
    fn test_curve_factor_includes_dependents() {
        let g = graph();
        let selector = SubPortfolioSelector::new(&g, Currency::USD);
        assert_eq!(
            ids(&selector.select(&portfolio(), &RiskFactorId::curve("WTI"))),
            vec!["T1", "T2"]
        );
        assert_eq!(ids(&selector.select(&portfolio(), &RiskFactorId::curve("BRENT"))), vec!["T2"]);
    }

    #[test]
    fn test_unreferenced_factor_selects_nothing() {
        let g = graph();
        let selector = SubPortfolioSelector::new(&g, Currency::USD);
        assert!(selector.select(&portfolio(), &RiskFactorId::curve("COPPER")).is_empty());
        assert!(selector
            .select(&portfolio(), &RiskFactorId::FxSpot(Currency::EUR))
            .is_empty());
    }

    #[test]
    fn test_time_and_reporting_currency_select_everything() {
        let g = graph();
        let selector = SubPortfolioSelector::new(&g, Currency::EUR);
        assert_eq!(selector.select(&portfolio(), &RiskFactorId::Time).len(), 3);
        assert_eq!(selector.select(&portfolio(), &RiskFactorId::FxSpot(Currency::EUR)).len(), 3);
        assert_eq!(selector.select(&portfolio(), &RiskFactorId::FxSpot(Currency::USD)).len(), 3);
    }
}
