use crate::network::{ArcKind, Capacity, FlowNetwork, NodeCategory};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics produced by `network stats` (node categories, arc kinds, capacity budget).
#[derive(Debug, Clone, Serialize)]
pub struct NetworkStats {
    pub node_count: usize,
    pub arc_count: usize,
    pub nodes_by_category: BTreeMap<NodeCategory, usize>,
    pub barrier_arcs: usize,
    pub sacrifice_arcs: usize,
    pub unbounded_arcs: usize,
    pub finite_capacity_total: Capacity,
    pub infinity: Capacity,
    /// Average out-degree, useful to sanity check the 8-neighbour wiring.
    pub avg_out_degree: f64,
}

impl NetworkStats {
    pub fn nodes_of(&self, category: NodeCategory) -> usize {
        self.nodes_by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Counts nodes per category and arcs per kind.
pub fn network_stats(network: &FlowNetwork) -> NetworkStats {
    let graph = network.graph();
    let mut nodes_by_category = BTreeMap::new();
    for kind in graph.node_weights() {
        *nodes_by_category.entry(kind.category()).or_insert(0) += 1;
    }
    let (mut barrier_arcs, mut sacrifice_arcs, mut unbounded_arcs) = (0, 0, 0);
    for arc in graph.edge_weights() {
        match arc.kind {
            ArcKind::Barrier { .. } => barrier_arcs += 1,
            ArcKind::Sacrifice { .. } => sacrifice_arcs += 1,
            ArcKind::Unbounded => unbounded_arcs += 1,
        }
    }
    let node_count = graph.node_count();
    let arc_count = graph.edge_count();
    let avg_out_degree = if node_count == 0 {
        0.0
    } else {
        arc_count as f64 / node_count as f64
    };
    NetworkStats {
        node_count,
        arc_count,
        nodes_by_category,
        barrier_arcs,
        sacrifice_arcs,
        unbounded_arcs,
        finite_capacity_total: network.finite_capacity_total(),
        infinity: network.infinity(),
        avg_out_degree,
    }
}
