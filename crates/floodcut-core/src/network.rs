//! Capacitated directed flow network derived from an annotated grid.
//!
//! Every relevant cell becomes either one node (river border and building
//! cells) or an in/out pair joined by a finite "barrier" arc. Each building id
//! gets a building-sink node whose arc to the sink carries the sacrifice
//! price. All other arcs carry the infinite sentinel.
//!
//! Node weights are [`NodeKind`] values that carry the owning cell or building
//! id, so a node can always be traced back to the grid without side tables.

use crate::error::{FloodError, FloodResult};
use crate::grid::BuildingId;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Integer arc capacity.
pub type Capacity = i64;

/// Semantic tag of a flow-network node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    NormalIn { cell: usize },
    NormalOut { cell: usize },
    River { cell: usize },
    Building { cell: usize },
    BuildingSink { building: BuildingId },
    Source,
    Sink,
}

/// Category labels used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    NormalIn,
    NormalOut,
    River,
    Building,
    BuildingSink,
    Source,
    Sink,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::NormalIn => "normal_in",
            NodeCategory::NormalOut => "normal_out",
            NodeCategory::River => "river",
            NodeCategory::Building => "building",
            NodeCategory::BuildingSink => "building_sink",
            NodeCategory::Source => "source",
            NodeCategory::Sink => "sink",
        }
    }
}

impl NodeKind {
    pub fn category(&self) -> NodeCategory {
        match self {
            NodeKind::NormalIn { .. } => NodeCategory::NormalIn,
            NodeKind::NormalOut { .. } => NodeCategory::NormalOut,
            NodeKind::River { .. } => NodeCategory::River,
            NodeKind::Building { .. } => NodeCategory::Building,
            NodeKind::BuildingSink { .. } => NodeCategory::BuildingSink,
            NodeKind::Source => NodeCategory::Source,
            NodeKind::Sink => NodeCategory::Sink,
        }
    }

    /// Grid cell represented by this node, if any.
    pub fn cell(&self) -> Option<usize> {
        match *self {
            NodeKind::NormalIn { cell }
            | NodeKind::NormalOut { cell }
            | NodeKind::River { cell }
            | NodeKind::Building { cell } => Some(cell),
            _ => None,
        }
    }
}

/// What an arc stands for in the planning problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArcKind {
    /// in -> out arc of a split cell; capacity is the cost of raising it
    Barrier { cell: usize },
    /// building-sink -> sink arc; capacity is the sacrifice price
    Sacrifice { building: BuildingId },
    /// Flood propagation arc carrying the infinite sentinel
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowArc {
    pub capacity: Capacity,
    pub kind: ArcKind,
}

impl FlowArc {
    pub fn is_finite(&self) -> bool {
        !matches!(self.kind, ArcKind::Unbounded)
    }
}

/// Role of a node relative to its grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRole {
    Single,
    In,
    Out,
}

/// Graph nodes owned by one relevant cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellNodes {
    Single(NodeIndex),
    Split { input: NodeIndex, output: NodeIndex },
}

impl CellNodes {
    /// Node that flood water enters the cell through.
    pub fn incoming(&self) -> NodeIndex {
        match *self {
            CellNodes::Single(node) => node,
            CellNodes::Split { input, .. } => input,
        }
    }

    /// Node that flood water leaves the cell from.
    pub fn outgoing(&self) -> NodeIndex {
        match *self {
            CellNodes::Single(node) => node,
            CellNodes::Split { output, .. } => output,
        }
    }

    pub fn get(&self, role: CellRole) -> Option<NodeIndex> {
        match (*self, role) {
            (CellNodes::Single(node), CellRole::Single) => Some(node),
            (CellNodes::Split { input, .. }, CellRole::In) => Some(input),
            (CellNodes::Split { output, .. }, CellRole::Out) => Some(output),
            _ => None,
        }
    }

    pub fn is_split(&self) -> bool {
        matches!(self, CellNodes::Split { .. })
    }
}

/// Raw pieces assembled by a network builder, validated by [`FlowNetwork::from_parts`].
#[derive(Debug)]
pub struct FlowNetworkParts {
    pub graph: DiGraph<NodeKind, FlowArc>,
    pub source: NodeIndex,
    pub sink: NodeIndex,
    pub cell_nodes: Vec<Option<CellNodes>>,
    pub building_sinks: BTreeMap<BuildingId, NodeIndex>,
    pub infinity: Capacity,
    /// Capacity of every building-sink -> sink arc
    pub sacrifice_capacity: Capacity,
    pub scaling_factor: f64,
}

/// A validated flow network ready for a min-cut solver.
#[derive(Debug, Clone)]
pub struct FlowNetwork {
    graph: DiGraph<NodeKind, FlowArc>,
    source: NodeIndex,
    sink: NodeIndex,
    cell_nodes: Vec<Option<CellNodes>>,
    building_sinks: BTreeMap<BuildingId, NodeIndex>,
    infinity: Capacity,
    sacrifice_capacity: Capacity,
    scaling_factor: f64,
    finite_total: Capacity,
}

impl FlowNetwork {
    /// Validate the structural invariants and wrap the graph.
    ///
    /// - the source has no incoming arcs and the sink no outgoing arcs
    /// - capacities are non-negative, unbounded arcs carry exactly `infinity`
    /// - `infinity` strictly exceeds the sum of all finite capacities
    pub fn from_parts(parts: FlowNetworkParts) -> FloodResult<Self> {
        let FlowNetworkParts {
            graph,
            source,
            sink,
            cell_nodes,
            building_sinks,
            infinity,
            sacrifice_capacity,
            scaling_factor,
        } = parts;

        if graph.node_weight(source) != Some(&NodeKind::Source)
            || graph.node_weight(sink) != Some(&NodeKind::Sink)
        {
            return Err(FloodError::InvalidInput(
                "source/sink indices do not point at source/sink nodes".into(),
            ));
        }
        if graph
            .edges_directed(source, Direction::Incoming)
            .next()
            .is_some()
        {
            return Err(FloodError::InvalidInput("source has incoming arcs".into()));
        }
        if graph
            .edges_directed(sink, Direction::Outgoing)
            .next()
            .is_some()
        {
            return Err(FloodError::InvalidInput("sink has outgoing arcs".into()));
        }

        let mut finite_total: Capacity = 0;
        for edge in graph.edge_references() {
            let arc = edge.weight();
            if arc.capacity < 0 {
                return Err(FloodError::InvalidInput(format!(
                    "arc {} -> {} has negative capacity {}",
                    edge.source().index(),
                    edge.target().index(),
                    arc.capacity
                )));
            }
            if let ArcKind::Sacrifice { building } = arc.kind {
                if arc.capacity != sacrifice_capacity {
                    return Err(FloodError::InvalidInput(format!(
                        "sacrifice arc of building {building} carries {}, expected {sacrifice_capacity}",
                        arc.capacity
                    )));
                }
            }
            if arc.is_finite() {
                finite_total = finite_total.checked_add(arc.capacity).ok_or(
                    FloodError::CapacityOverflowRisk {
                        infinity,
                        finite_total: Capacity::MAX,
                    },
                )?;
            } else if arc.capacity != infinity {
                return Err(FloodError::InvalidInput(format!(
                    "unbounded arc {} -> {} does not carry the sentinel capacity",
                    edge.source().index(),
                    edge.target().index()
                )));
            }
        }
        if finite_total >= infinity {
            return Err(FloodError::CapacityOverflowRisk {
                infinity,
                finite_total,
            });
        }

        Ok(Self {
            graph,
            source,
            sink,
            cell_nodes,
            building_sinks,
            infinity,
            sacrifice_capacity,
            scaling_factor,
            finite_total,
        })
    }

    pub fn graph(&self) -> &DiGraph<NodeKind, FlowArc> {
        &self.graph
    }

    pub fn source(&self) -> NodeIndex {
        self.source
    }

    pub fn sink(&self) -> NodeIndex {
        self.sink
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn infinity(&self) -> Capacity {
        self.infinity
    }

    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    /// Price of sacrificing one building, in scaled capacity units.
    pub fn sacrifice_capacity(&self) -> Capacity {
        self.sacrifice_capacity
    }

    /// Sum of all barrier and sacrifice capacities.
    pub fn finite_capacity_total(&self) -> Capacity {
        self.finite_total
    }

    pub fn kind(&self, node: NodeIndex) -> NodeKind {
        self.graph[node]
    }

    /// Nodes owned by `cell`, or `None` when the cell is not relevant.
    pub fn cell_nodes(&self, cell: usize) -> Option<CellNodes> {
        self.cell_nodes.get(cell).copied().flatten()
    }

    pub fn node_for(&self, cell: usize, role: CellRole) -> Option<NodeIndex> {
        self.cell_nodes(cell).and_then(|nodes| nodes.get(role))
    }

    /// Split cells as `(cell, in, out)`, ascending by cell id.
    pub fn split_cells(&self) -> impl Iterator<Item = (usize, NodeIndex, NodeIndex)> + '_ {
        self.cell_nodes
            .iter()
            .enumerate()
            .filter_map(|(cell, nodes)| match nodes {
                Some(CellNodes::Split { input, output }) => Some((cell, *input, *output)),
                _ => None,
            })
    }

    pub fn building_sink(&self, building: BuildingId) -> Option<NodeIndex> {
        self.building_sinks.get(&building).copied()
    }

    /// Building sinks ascending by building id.
    pub fn building_sinks(&self) -> impl Iterator<Item = (BuildingId, NodeIndex)> + '_ {
        self.building_sinks.iter().map(|(&id, &node)| (id, node))
    }

    pub fn arcs(&self) -> impl Iterator<Item = EdgeReference<'_, FlowArc>> {
        self.graph.edge_references()
    }

    /// Capacity of the barrier arc of `cell`, if the cell is split.
    pub fn barrier_capacity(&self, cell: usize) -> Option<Capacity> {
        let CellNodes::Split { input, output } = self.cell_nodes(cell)? else {
            return None;
        };
        self.graph
            .edges_connecting(input, output)
            .map(|edge| edge.weight())
            .find(|arc| matches!(arc.kind, ArcKind::Barrier { .. }))
            .map(|arc| arc.capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbounded(infinity: Capacity) -> FlowArc {
        FlowArc {
            capacity: infinity,
            kind: ArcKind::Unbounded,
        }
    }

    fn tiny_parts(barrier: Capacity, infinity: Capacity) -> FlowNetworkParts {
        let mut graph = DiGraph::new();
        let input = graph.add_node(NodeKind::NormalIn { cell: 0 });
        let output = graph.add_node(NodeKind::NormalOut { cell: 0 });
        let source = graph.add_node(NodeKind::Source);
        let sink = graph.add_node(NodeKind::Sink);
        graph.add_edge(
            input,
            output,
            FlowArc {
                capacity: barrier,
                kind: ArcKind::Barrier { cell: 0 },
            },
        );
        graph.add_edge(source, input, unbounded(infinity));
        graph.add_edge(output, sink, unbounded(infinity));
        FlowNetworkParts {
            graph,
            source,
            sink,
            cell_nodes: vec![Some(CellNodes::Split { input, output })],
            building_sinks: BTreeMap::new(),
            infinity,
            sacrifice_capacity: 0,
            scaling_factor: 1.0,
        }
    }

    #[test]
    fn test_valid_network() {
        let network = FlowNetwork::from_parts(tiny_parts(3, 100)).unwrap();
        assert_eq!(network.node_count(), 4);
        assert_eq!(network.arc_count(), 3);
        assert_eq!(network.finite_capacity_total(), 3);
        assert_eq!(network.barrier_capacity(0), Some(3));
        assert_eq!(network.split_cells().count(), 1);
        assert!(network.node_for(0, CellRole::Single).is_none());
    }

    #[test]
    fn test_sentinel_must_dominate() {
        let err = FlowNetwork::from_parts(tiny_parts(100, 100)).unwrap_err();
        assert!(matches!(
            err,
            FloodError::CapacityOverflowRisk {
                infinity: 100,
                finite_total: 100
            }
        ));
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = FlowNetwork::from_parts(tiny_parts(-1, 100)).unwrap_err();
        assert!(matches!(err, FloodError::InvalidInput(_)));
    }

    #[test]
    fn test_source_with_incoming_arc_rejected() {
        let mut parts = tiny_parts(1, 100);
        let first = NodeIndex::new(0);
        parts.graph.add_edge(first, parts.source, unbounded(100));
        assert!(FlowNetwork::from_parts(parts).is_err());
    }

    #[test]
    fn test_sacrifice_arcs_must_match_recorded_price() {
        let mut parts = tiny_parts(1, 100);
        let building = parts.graph.add_node(NodeKind::BuildingSink { building: 3 });
        parts.graph.add_edge(
            building,
            parts.sink,
            FlowArc {
                capacity: 4,
                kind: ArcKind::Sacrifice { building: 3 },
            },
        );
        parts.sacrifice_capacity = 5;
        assert!(matches!(
            FlowNetwork::from_parts(parts),
            Err(FloodError::InvalidInput(_))
        ));

        let mut parts = tiny_parts(1, 100);
        let building = parts.graph.add_node(NodeKind::BuildingSink { building: 3 });
        parts.graph.add_edge(
            building,
            parts.sink,
            FlowArc {
                capacity: 4,
                kind: ArcKind::Sacrifice { building: 3 },
            },
        );
        parts.sacrifice_capacity = 4;
        let network = FlowNetwork::from_parts(parts).unwrap();
        assert_eq!(network.sacrifice_capacity(), 4);
    }

    #[test]
    fn test_node_kind_cells() {
        assert_eq!(NodeKind::River { cell: 4 }.cell(), Some(4));
        assert_eq!(NodeKind::BuildingSink { building: 9 }.cell(), None);
        assert_eq!(NodeKind::NormalOut { cell: 1 }.category().as_str(), "normal_out");
    }
}
