//! Curve dependency graph.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use risk_market::market_data::MarketModel;

use crate::error::GreeksError;

/// Directed "derives-from" edges between curve names.
///
/// The graph never owns curve objects. It is built from a model snapshot
/// and never mutated afterwards; a new snapshot gets a new graph.
///
/// # Examples
///
/// ```
/// use risk_greeks::dependency::CurveDependencyGraph;
///
/// let graph = CurveDependencyGraph::from_edges(
///     ["A", "B", "C"],
///     [("B", "A"), ("C", "B")],
/// );
/// assert_eq!(graph.dependents("A"), ["B".to_string()]);
/// assert_eq!(graph.all_dependents("A"), vec!["B".to_string(), "C".to_string()]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CurveDependencyGraph {
    nodes: BTreeSet<String>,
    parents: BTreeMap<String, Vec<String>>,
    children: BTreeMap<String, Vec<String>>,
}

impl CurveDependencyGraph {
    /// Scans every curve's `depends_on()` and validates the result.
    ///
    /// Fails with [`GreeksError::MissingParent`] or
    /// [`GreeksError::CyclicDependency`].
    pub fn build(model: &MarketModel) -> Result<Self, GreeksError> {
        let nodes: Vec<String> = model.curves().map(|c| c.name().to_string()).collect();
        let edges: Vec<(String, String)> = model
            .curves()
            .flat_map(|c| {
                c.depends_on()
                    .into_iter()
                    .map(move |parent| (c.name().to_string(), parent))
            })
            .collect();
        let graph = Self::from_edges(nodes, edges);
        graph.validate()?;
        Ok(graph)
    }

    /// Builds a graph from nodes and `(child, parent)` edges without
    /// validation.
    pub fn from_edges<N, E, S, T>(nodes: N, edges: E) -> Self
    where
        N: IntoIterator<Item = S>,
        E: IntoIterator<Item = (T, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut graph = Self {
            nodes: nodes.into_iter().map(Into::into).collect(),
            ..Self::default()
        };
        for (child, parent) in edges {
            let (child, parent) = (child.into(), parent.into());
            graph.nodes.insert(child.clone());
            insert_sorted(graph.parents.entry(child.clone()).or_default(), parent.clone());
            insert_sorted(graph.children.entry(parent).or_default(), child);
        }
        graph
    }

    /// Whether `name` is a curve in the graph.
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Curve names in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.nodes.iter().map(String::as_str)
    }

    /// Direct parents of `name`.
    pub fn parents(&self, name: &str) -> &[String] {
        self.parents.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Curves directly derived from `name`.
    pub fn dependents(&self, name: &str) -> &[String] {
        self.children.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive closure of [`dependents`](Self::dependents), breadth
    /// first, each curve once. `name` itself appears only when it lies on
    /// a cycle.
    pub fn all_dependents(&self, name: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut order = Vec::new();
        let mut queue: VecDeque<&str> = VecDeque::from([name]);
        while let Some(current) = queue.pop_front() {
            for child in self.dependents(current) {
                if seen.insert(child.as_str()) {
                    order.push(child.clone());
                    queue.push_back(child);
                }
            }
        }
        order
    }

    /// Every curve ordered parents-before-children (Kahn's algorithm, ties
    /// broken by name).
    pub fn topological_order(&self) -> Result<Vec<String>, GreeksError> {
        let all: BTreeSet<&str> = self.nodes().collect();
        self.topological_order_of(&all)
    }

    /// Topological order of the sub-graph induced by `subset`; edges from
    /// curves outside the subset are ignored.
    pub(crate) fn topological_order_of(
        &self,
        subset: &BTreeSet<&str>,
    ) -> Result<Vec<String>, GreeksError> {
        let mut in_degree: BTreeMap<&str, usize> = subset
            .iter()
            .map(|n| {
                let degree = self
                    .parents(n)
                    .iter()
                    .filter(|p| subset.contains(p.as_str()))
                    .count();
                (*n, degree)
            })
            .collect();

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(n, _)| *n)
            .collect();
        let mut order = Vec::with_capacity(subset.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.to_string());
            for child in self.dependents(node) {
                if let Some(degree) = in_degree.get_mut(child.as_str()) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(child.as_str());
                    }
                }
            }
        }

        if order.len() < subset.len() {
            let curves = in_degree
                .into_iter()
                .filter(|(_, d)| *d > 0)
                .map(|(n, _)| n.to_string())
                .collect();
            return Err(GreeksError::CyclicDependency { curves });
        }
        Ok(order)
    }

    /// Checks that every parent is a node and that there are no cycles.
    pub fn validate(&self) -> Result<(), GreeksError> {
        for (child, parents) in &self.parents {
            if let Some(parent) = parents.iter().find(|p| !self.nodes.contains(p.as_str())) {
                return Err(GreeksError::MissingParent {
                    curve: child.clone(),
                    parent: parent.clone(),
                });
            }
        }
        self.topological_order().map(|_| ())
    }
}

fn insert_sorted(list: &mut Vec<String>, value: String) {
    if let Err(pos) = list.binary_search(&value) {
        list.insert(pos, value);
    }
}
