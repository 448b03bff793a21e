//! Negative-cycle detection
//!
//! Defensibility only needs one answer from a weighted graph: does it contain
//! a cycle whose weights sum below zero? [`NegativeCycleOracle`] is that seam.
//! Closures of type `Fn(&WeightedDirectedGraph) -> bool` implement it too, so
//! tests can plug in a fixed verdict.

use serde::{Deserialize, Serialize};

use crate::graph::WeightedDirectedGraph;

/// Answers whether a weighted graph has a negative-weight cycle.
pub trait NegativeCycleOracle {
    fn has_negative_cycle(&self, graph: &WeightedDirectedGraph) -> bool;
}

impl<F> NegativeCycleOracle for F
where
    F: Fn(&WeightedDirectedGraph) -> bool,
{
    fn has_negative_cycle(&self, graph: &WeightedDirectedGraph) -> bool {
        self(graph)
    }
}

/// Bellman–Ford from a virtual source joined to every node with weight 0.
///
/// Every cycle is reachable from the virtual source, so one extra relaxation
/// pass that still improves a distance proves a negative cycle. Distances are
/// kept as `i128`: a path of fewer than 2^64 edges of `i64` weights cannot
/// overflow it, and clamping would hide cycles of extreme weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BellmanFord;

impl NegativeCycleOracle for BellmanFord {
    fn has_negative_cycle(&self, graph: &WeightedDirectedGraph) -> bool {
        let mut dist = vec![0i128; graph.node_count()];
        for _ in 1..graph.node_count().max(1) {
            let mut changed = false;
            for &(from, to, weight) in graph.edges() {
                let candidate = dist[from] + i128::from(weight);
                if candidate < dist[to] {
                    dist[to] = candidate;
                    changed = true;
                }
            }
            if !changed {
                return false;
            }
        }
        graph
            .edges()
            .iter()
            .any(|&(from, to, weight)| dist[from] + i128::from(weight) < dist[to])
    }
}

/// Floyd–Warshall all-pairs relaxation; a negative diagonal entry is a negative cycle.
///
/// Path weights are summed in `i128` for the same reason as [`BellmanFord`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FloydWarshall;

impl NegativeCycleOracle for FloydWarshall {
    fn has_negative_cycle(&self, graph: &WeightedDirectedGraph) -> bool {
        let n = graph.node_count();
        let mut dist: Vec<Vec<Option<i128>>> = vec![vec![None; n]; n];
        for &(from, to, weight) in graph.edges() {
            let weight = i128::from(weight);
            let cell = &mut dist[from][to];
            *cell = Some(cell.map_or(weight, |w| w.min(weight)));
        }
        // Self-loops are cycles of length one.
        if (0..n).any(|i| dist[i][i].is_some_and(|w| w < 0)) {
            return true;
        }
        for k in 0..n {
            for i in 0..n {
                let Some(ik) = dist[i][k] else { continue };
                for j in 0..n {
                    let Some(kj) = dist[k][j] else { continue };
                    let candidate = ik + kj;
                    if dist[i][j].map_or(true, |d| candidate < d) {
                        dist[i][j] = Some(candidate);
                    }
                }
                if dist[i][i].is_some_and(|w| w < 0) {
                    return true;
                }
            }
        }
        false
    }
}

/// Run-time choice of oracle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OracleKind {
    #[default]
    BellmanFord,
    FloydWarshall,
}

impl NegativeCycleOracle for OracleKind {
    fn has_negative_cycle(&self, graph: &WeightedDirectedGraph) -> bool {
        match self {
            OracleKind::BellmanFord => BellmanFord.has_negative_cycle(graph),
            OracleKind::FloydWarshall => FloydWarshall.has_negative_cycle(graph),
        }
    }
}
