//! Binary covering program for the same cut problem.
//!
//! # Formulation
//!
//! ```text
//! min  Σ_a cap_a · x_a                      (finite arcs a = (u, v))
//! s.t. y_source = 1, y_sink = 0
//!      y_v ≥ y_u              for every unbounded arc (u, v)
//!      y_v ≥ y_u − x_a        for every finite arc a = (u, v)
//!      y, x ∈ {0, 1}
//! ```
//!
//! `y_v = 1` means node `v` is reached by the flood (source side). Flood
//! propagation is monotone along arcs unless the arc is paid for. The optimum
//! equals the max-flow value by LP duality, so the reported flow value is the
//! capacity of the decoded cut.

use super::{MinCut, MinCutSolver};
use floodcut_core::{FloodError, FloodResult, FlowNetwork};
use good_lp::solvers::microlp::microlp;
use good_lp::{constraint, variable, variables, Constraint, Expression, Solution, SolverModel, Variable};
use petgraph::visit::EdgeRef;
use std::time::Instant;
use tracing::debug;

/// MIP backend using the pure-Rust `microlp` solver through `good_lp`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MipMinCutSolver;

impl MinCutSolver for MipMinCutSolver {
    fn id(&self) -> &str {
        "mip"
    }

    fn solve(&self, network: &FlowNetwork) -> FloodResult<MinCut> {
        let start = Instant::now();
        let graph = network.graph();

        let mut vars = variables!();
        let flooded: Vec<Variable> = (0..graph.node_count())
            .map(|_| vars.add(variable().binary()))
            .collect();

        let mut objective = Expression::from(0.0);
        let mut constraints: Vec<Constraint> = Vec::with_capacity(graph.edge_count() + 2);
        let mut cut_vars = 0usize;
        for edge in graph.edge_references() {
            let from = flooded[edge.source().index()];
            let to = flooded[edge.target().index()];
            let arc = edge.weight();
            if arc.is_finite() {
                let cut = vars.add(variable().binary());
                cut_vars += 1;
                objective += (arc.capacity as f64) * cut;
                constraints.push(constraint!(to >= from - cut));
            } else {
                constraints.push(constraint!(to >= from));
            }
        }
        let source = flooded[network.source().index()];
        let sink = flooded[network.sink().index()];
        constraints.push(constraint!(source == 1.0));
        constraints.push(constraint!(sink == 0.0));

        let mut model = vars.minimise(objective).using(microlp);
        for c in constraints {
            model = model.with(c);
        }

        let solution = model
            .solve()
            .map_err(|e| FloodError::SolveFailed(format!("mip min-cut: {e}")))?;

        let source_side: Vec<bool> = flooded.iter().map(|&y| solution.value(y) > 0.5).collect();
        if !source_side[network.source().index()] || source_side[network.sink().index()] {
            return Err(FloodError::SolveFailed(
                "mip solution does not separate source and sink".into(),
            ));
        }

        let mut cut = MinCut {
            flow_value: 0,
            source_side,
        };
        let crosses_unbounded = network.arcs().any(|edge| {
            !edge.weight().is_finite()
                && cut.is_source_side(edge.source())
                && !cut.is_source_side(edge.target())
        });
        if crosses_unbounded {
            return Err(FloodError::SolveFailed(
                "mip solution cuts an unbounded arc".into(),
            ));
        }
        cut.flow_value = cut.cut_capacity(network);

        debug!(
            nodes = flooded.len(),
            cut_vars,
            flow = cut.flow_value,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "mip min-cut finished"
        );
        Ok(cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mincut::DinicSolver;
    use floodcut_core::{ArcKind, Capacity, FlowArc, FlowNetworkParts, NodeIndex, NodeKind};
    use petgraph::graph::DiGraph;
    use std::collections::BTreeMap;

    #[test]
    fn test_matches_dinic_on_small_network() {
        let inf: Capacity = 1_000;
        let unbounded = FlowArc {
            capacity: inf,
            kind: ArcKind::Unbounded,
        };
        let mut graph = DiGraph::new();
        let s = graph.add_node(NodeKind::Source);
        let t = graph.add_node(NodeKind::Sink);
        let pairs: Vec<(NodeIndex, NodeIndex)> = (0..3)
            .map(|cell| {
                let input = graph.add_node(NodeKind::NormalIn { cell });
                let output = graph.add_node(NodeKind::NormalOut { cell });
                graph.add_edge(
                    input,
                    output,
                    FlowArc {
                        capacity: [4, 1, 2][cell],
                        kind: ArcKind::Barrier { cell },
                    },
                );
                (input, output)
            })
            .collect();
        graph.add_edge(s, pairs[0].0, unbounded);
        graph.add_edge(pairs[0].1, pairs[1].0, unbounded);
        graph.add_edge(pairs[0].1, pairs[2].0, unbounded);
        graph.add_edge(pairs[1].1, t, unbounded);
        graph.add_edge(pairs[2].1, t, unbounded);

        let network = FlowNetwork::from_parts(FlowNetworkParts {
            graph,
            source: s,
            sink: t,
            cell_nodes: Vec::new(),
            building_sinks: BTreeMap::new(),
            infinity: inf,
            sacrifice_capacity: 0,
            scaling_factor: 1.0,
        })
        .unwrap();

        let mip = MipMinCutSolver.solve(&network).unwrap();
        let dinic = DinicSolver.solve(&network).unwrap();
        assert_eq!(mip.flow_value, 3);
        assert_eq!(mip.flow_value, dinic.flow_value);
        assert!(!mip.is_source_side(pairs[1].1));
        assert!(!mip.is_source_side(pairs[2].1));
    }
}
