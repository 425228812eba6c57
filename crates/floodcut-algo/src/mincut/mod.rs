//! Minimum s-t cut backends.
//!
//! A [`MinCutSolver`] turns a validated [`FlowNetwork`] into a [`MinCut`]:
//! the maximum flow value and a source/sink partition of the nodes whose
//! crossing arcs sum to exactly that value. Two backends are provided:
//!
//! | Backend | Algorithm | Cut returned on ties |
//! |---------|-----------|----------------------|
//! | [`DinicSolver`] | Dinic max-flow, iterative DFS | source-closest (residual reachability) |
//! | [`MipMinCutSolver`] | binary covering program via `good_lp` | solver-defined |
//!
//! Both fail with [`FloodError::SolveFailed`](floodcut_core::FloodError)
//! when the result cannot be certified; no partial cut is ever returned.

mod dinic;
mod mip;

pub use dinic::DinicSolver;
pub use mip::MipMinCutSolver;

use floodcut_core::{Capacity, FloodResult, FlowNetwork, NodeIndex, SolverKind};
use petgraph::visit::EdgeRef;

/// Result of a minimum-cut solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinCut {
    /// Maximum flow value, equal to the capacity of the cut
    pub flow_value: Capacity,
    /// `source_side[node.index()]` is true for nodes on the source side
    pub source_side: Vec<bool>,
}

impl MinCut {
    pub fn is_source_side(&self, node: NodeIndex) -> bool {
        self.source_side.get(node.index()).copied().unwrap_or(false)
    }

    pub fn source_side_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.source_side
            .iter()
            .enumerate()
            .filter(|(_, &side)| side)
            .map(|(i, _)| NodeIndex::new(i))
    }

    pub fn sink_side_nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.source_side
            .iter()
            .enumerate()
            .filter(|(_, &side)| !side)
            .map(|(i, _)| NodeIndex::new(i))
    }

    /// Sum of capacities of arcs leaving the source side.
    pub fn cut_capacity(&self, network: &FlowNetwork) -> Capacity {
        network
            .arcs()
            .filter(|edge| self.is_source_side(edge.source()) && !self.is_source_side(edge.target()))
            .map(|edge| edge.weight().capacity)
            .sum()
    }
}

/// Computes a minimum s-t cut of a flow network.
///
/// Implementations must be `Send + Sync` so a sweep can share one solver
/// across threads.
pub trait MinCutSolver: Send + Sync {
    /// Short identifier used in logs and reports (e.g. "dinic")
    fn id(&self) -> &str;

    fn solve(&self, network: &FlowNetwork) -> FloodResult<MinCut>;
}

/// Instantiate the backend selected in the configuration.
pub fn solver_for(kind: SolverKind) -> Box<dyn MinCutSolver> {
    match kind {
        SolverKind::Dinic => Box::new(DinicSolver),
        SolverKind::Mip => Box::new(MipMinCutSolver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_trait_is_object_safe() {
        let solvers: Vec<Box<dyn MinCutSolver>> = vec![
            solver_for(SolverKind::Dinic),
            solver_for(SolverKind::Mip),
        ];
        let ids: Vec<&str> = solvers.iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec!["dinic", "mip"]);
    }

    #[test]
    fn test_partition_iterators() {
        let cut = MinCut {
            flow_value: 0,
            source_side: vec![true, false, true],
        };
        let source: Vec<usize> = cut.source_side_nodes().map(|n| n.index()).collect();
        let sink: Vec<usize> = cut.sink_side_nodes().map(|n| n.index()).collect();
        assert_eq!(source, vec![0, 2]);
        assert_eq!(sink, vec![1]);
        assert!(!cut.is_source_side(NodeIndex::new(7)));
    }
}
