//! Dinic's maximum-flow algorithm on an arc-pair residual representation.
//!
//! Arcs are stored in pairs, `e` forward and `e ^ 1` its reverse, so the
//! residual capacity of the reverse arc is the flow pushed along `e`.
//! Blocking flows are found with an iterative DFS and per-node current-arc
//! pointers, so deep grids cannot overflow the call stack.
//!
//! After the last phase the source side of the cut is the set of nodes
//! still reachable from the source through arcs with residual capacity.
//! This is the unique minimum cut closest to the source.

use super::{MinCut, MinCutSolver};
use floodcut_core::{Capacity, FloodError, FloodResult, FlowNetwork};
use petgraph::visit::EdgeRef;
use std::collections::VecDeque;
use tracing::debug;

const UNREACHED: u32 = u32::MAX;

/// Dinic max-flow backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct DinicSolver;

impl MinCutSolver for DinicSolver {
    fn id(&self) -> &str {
        "dinic"
    }

    fn solve(&self, network: &FlowNetwork) -> FloodResult<MinCut> {
        let source = network.source().index();
        let sink = network.sink().index();
        let mut residual = ResidualGraph::from_network(network);
        let (flow_value, phases) = residual.max_flow(source, sink);
        let source_side = residual.reachable_from(source);

        if source_side[sink] {
            return Err(FloodError::SolveFailed(
                "sink still reachable after max-flow terminated".into(),
            ));
        }
        let cut = MinCut {
            flow_value,
            source_side,
        };
        let capacity = cut.cut_capacity(network);
        if capacity != flow_value {
            return Err(FloodError::SolveFailed(format!(
                "cut capacity {capacity} does not match flow value {flow_value}"
            )));
        }

        debug!(
            flow = flow_value,
            phases,
            source_side = cut.source_side_nodes().count(),
            "dinic finished"
        );
        Ok(cut)
    }
}

struct ResidualGraph {
    /// Outgoing residual arc ids per node
    adjacency: Vec<Vec<usize>>,
    head: Vec<usize>,
    residual: Vec<Capacity>,
}

impl ResidualGraph {
    fn from_network(network: &FlowNetwork) -> Self {
        let mut graph = Self {
            adjacency: vec![Vec::new(); network.node_count()],
            head: Vec::with_capacity(2 * network.arc_count()),
            residual: Vec::with_capacity(2 * network.arc_count()),
        };
        for edge in network.arcs() {
            graph.add_arc(
                edge.source().index(),
                edge.target().index(),
                edge.weight().capacity,
            );
        }
        graph
    }

    fn add_arc(&mut self, from: usize, to: usize, capacity: Capacity) {
        let id = self.head.len();
        self.head.push(to);
        self.residual.push(capacity);
        self.adjacency[from].push(id);
        self.head.push(from);
        self.residual.push(0);
        self.adjacency[to].push(id + 1);
    }

    /// Returns the flow value and the number of phases run.
    fn max_flow(&mut self, source: usize, sink: usize) -> (Capacity, usize) {
        let mut flow = 0;
        let mut phases = 0;
        loop {
            let level = self.levels(source);
            if level[sink] == UNREACHED {
                break;
            }
            phases += 1;
            flow += self.blocking_flow(source, sink, &level);
        }
        (flow, phases)
    }

    /// BFS distance from `source` over arcs with residual capacity.
    fn levels(&self, source: usize) -> Vec<u32> {
        let mut level = vec![UNREACHED; self.adjacency.len()];
        let mut queue = VecDeque::new();
        level[source] = 0;
        queue.push_back(source);
        while let Some(node) = queue.pop_front() {
            for &arc in &self.adjacency[node] {
                let next = self.head[arc];
                if self.residual[arc] > 0 && level[next] == UNREACHED {
                    level[next] = level[node] + 1;
                    queue.push_back(next);
                }
            }
        }
        level
    }

    fn blocking_flow(&mut self, source: usize, sink: usize, level: &[u32]) -> Capacity {
        let mut current = vec![0usize; self.adjacency.len()];
        let mut path: Vec<usize> = Vec::new();
        let mut total = 0;

        loop {
            let node = path.last().map_or(source, |&arc| self.head[arc]);

            if node == sink {
                let bottleneck = path
                    .iter()
                    .map(|&arc| self.residual[arc])
                    .min()
                    .unwrap_or(0);
                for &arc in &path {
                    self.residual[arc] -= bottleneck;
                    self.residual[arc ^ 1] += bottleneck;
                }
                total += bottleneck;
                // resume from the tail of the first saturated arc
                match path.iter().position(|&arc| self.residual[arc] == 0) {
                    Some(pos) => path.truncate(pos),
                    None => path.clear(),
                }
                continue;
            }

            let mut advanced = false;
            while current[node] < self.adjacency[node].len() {
                let arc = self.adjacency[node][current[node]];
                let next = self.head[arc];
                if self.residual[arc] > 0 && level[next] == level[node] + 1 {
                    path.push(arc);
                    advanced = true;
                    break;
                }
                current[node] += 1;
            }
            if advanced {
                continue;
            }

            // dead end: retreat and skip the arc that led here
            let Some(arc) = path.pop() else {
                break;
            };
            let parent = self.head[arc ^ 1];
            current[parent] += 1;
        }

        total
    }

    fn reachable_from(&self, source: usize) -> Vec<bool> {
        self.levels(source)
            .into_iter()
            .map(|l| l != UNREACHED)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodcut_core::{ArcKind, FlowArc, FlowNetworkParts, NodeIndex, NodeKind};
    use petgraph::graph::DiGraph;
    use std::collections::BTreeMap;

    const INF: Capacity = 1_000;

    fn barrier(cell: usize, capacity: Capacity) -> FlowArc {
        FlowArc {
            capacity,
            kind: ArcKind::Barrier { cell },
        }
    }

    fn unbounded() -> FlowArc {
        FlowArc {
            capacity: INF,
            kind: ArcKind::Unbounded,
        }
    }

    /// Source, sink and `cells` split pairs; arcs are added by the caller.
    fn skeleton(cells: usize) -> (DiGraph<NodeKind, FlowArc>, Vec<(NodeIndex, NodeIndex)>) {
        let mut graph = DiGraph::new();
        graph.add_node(NodeKind::Source);
        graph.add_node(NodeKind::Sink);
        let pairs = (0..cells)
            .map(|cell| {
                (
                    graph.add_node(NodeKind::NormalIn { cell }),
                    graph.add_node(NodeKind::NormalOut { cell }),
                )
            })
            .collect();
        (graph, pairs)
    }

    fn finish(graph: DiGraph<NodeKind, FlowArc>) -> FlowNetwork {
        FlowNetwork::from_parts(FlowNetworkParts {
            graph,
            source: NodeIndex::new(0),
            sink: NodeIndex::new(1),
            cell_nodes: Vec::new(),
            building_sinks: BTreeMap::new(),
            infinity: INF,
            sacrifice_capacity: 0,
            scaling_factor: 1.0,
        })
        .unwrap()
    }

    #[test]
    fn test_parallel_paths_add_up() {
        let (mut graph, pairs) = skeleton(2);
        let (s, t) = (NodeIndex::new(0), NodeIndex::new(1));
        for (cell, &(input, output)) in pairs.iter().enumerate() {
            graph.add_edge(s, input, unbounded());
            graph.add_edge(input, output, barrier(cell, 3 - cell as Capacity));
            graph.add_edge(output, t, unbounded());
        }
        let network = finish(graph);
        let cut = DinicSolver.solve(&network).unwrap();
        assert_eq!(cut.flow_value, 5);
        assert!(cut.is_source_side(pairs[0].0));
        assert!(!cut.is_source_side(pairs[0].1));
        assert!(!cut.is_source_side(t));
    }

    #[test]
    fn test_tie_resolves_to_source_closest_cut() {
        let (mut graph, pairs) = skeleton(2);
        let (s, t) = (NodeIndex::new(0), NodeIndex::new(1));
        graph.add_edge(s, pairs[0].0, unbounded());
        graph.add_edge(pairs[0].0, pairs[0].1, barrier(0, 2));
        graph.add_edge(pairs[0].1, pairs[1].0, unbounded());
        graph.add_edge(pairs[1].0, pairs[1].1, barrier(1, 2));
        graph.add_edge(pairs[1].1, t, unbounded());
        let network = finish(graph);
        let cut = DinicSolver.solve(&network).unwrap();
        assert_eq!(cut.flow_value, 2);
        let source_side: Vec<usize> = cut.source_side_nodes().map(|n| n.index()).collect();
        assert_eq!(source_side, vec![0, pairs[0].0.index()]);
    }

    #[test]
    fn test_parallel_arcs_between_same_nodes() {
        let (mut graph, pairs) = skeleton(1);
        let (s, t) = (NodeIndex::new(0), NodeIndex::new(1));
        let (input, output) = pairs[0];
        graph.add_edge(s, input, unbounded());
        graph.add_edge(s, input, unbounded());
        graph.add_edge(input, output, barrier(0, 1));
        graph.add_edge(input, output, barrier(0, 4));
        graph.add_edge(output, t, unbounded());
        let cut = DinicSolver.solve(&finish(graph)).unwrap();
        assert_eq!(cut.flow_value, 5);
    }

    #[test]
    fn test_flow_must_reroute_through_reverse_arc() {
        // s->a(in) splits to two outs, classic case where a greedy path blocks
        let (mut graph, pairs) = skeleton(4);
        let (s, t) = (NodeIndex::new(0), NodeIndex::new(1));
        for (cell, &(input, output)) in pairs.iter().enumerate() {
            graph.add_edge(input, output, barrier(cell, 1));
        }
        graph.add_edge(s, pairs[0].0, unbounded());
        graph.add_edge(s, pairs[1].0, unbounded());
        graph.add_edge(pairs[0].1, pairs[2].0, unbounded());
        graph.add_edge(pairs[0].1, pairs[3].0, unbounded());
        graph.add_edge(pairs[1].1, pairs[2].0, unbounded());
        graph.add_edge(pairs[2].1, t, unbounded());
        graph.add_edge(pairs[3].1, t, unbounded());
        let cut = DinicSolver.solve(&finish(graph)).unwrap();
        assert_eq!(cut.flow_value, 2);
    }

    #[test]
    fn test_disconnected_sink_gives_zero_flow() {
        let (mut graph, pairs) = skeleton(1);
        let s = NodeIndex::new(0);
        graph.add_edge(s, pairs[0].0, unbounded());
        graph.add_edge(pairs[0].0, pairs[0].1, barrier(0, 7));
        let cut = DinicSolver.solve(&finish(graph)).unwrap();
        assert_eq!(cut.flow_value, 0);
        assert_eq!(cut.source_side_nodes().count(), 3);
    }
}
