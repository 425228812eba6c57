//! Flow-network construction from an annotated grid.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  relevant cell kind      nodes              arcs                     │
//! │  ─────────────────────   ───────────────    ──────────────────────── │
//! │  river border            single  (river)    source ══> single        │
//! │  building footprint      single  (building) single ══> building sink │
//! │  everything else         in, out            in ──cost──> out         │
//! │  each building id        building sink      sink node ──price──> sink│
//! │  8-neighbours (c → n)                       out(c) ══> in(n)         │
//! └──────────────────────────────────────────────────────────────────────┘
//!   ══> infinite sentinel   ──> finite capacity
//! ```
//!
//! The barrier cost of a split cell is `max(0, water_height - elevation)`
//! rounded to two decimals, scaled and truncated to an integer. Building cells
//! are sinks, not conduits: no neighbour arcs leave them. Neighbour arcs
//! between two river-border cells are omitted since both hang off the source.

use floodcut_core::{
    ArcKind, BuildingId, Capacity, CellNodes, FloodConfig, FloodResult, FlowArc, FlowNetwork,
    FlowNetworkParts, NodeIndex, NodeKind, RasterGrid,
};
use petgraph::graph::DiGraph;
use std::collections::BTreeMap;
use tracing::debug;

/// Barrier cost for raising a cell of `elevation` above `water_height`,
/// in elevation units rounded to two decimals.
pub fn barrier_cost(water_height: f64, elevation: f64) -> f64 {
    round_to_cents((water_height - elevation).max(0.0))
}

/// Nearest two-decimal value of the exact binary `value`, ties to even.
///
/// `value * 100.0` may itself round onto a half; the fused residual of the
/// product tells which side of the half the exact value lies on.
fn round_to_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let cents = if scaled - floor == 0.5 {
        let residual = value.mul_add(100.0, -scaled);
        if residual > 0.0 {
            floor + 1.0
        } else if residual < 0.0 {
            floor
        } else {
            scaled.round_ties_even()
        }
    } else {
        scaled.round()
    };
    cents / 100.0
}

/// Builds a [`FlowNetwork`] for one `(grid, water height, building weight)` combination.
pub struct FlowNetworkBuilder<'a> {
    grid: &'a RasterGrid,
    config: &'a FloodConfig,
    redundant_border_arcs: bool,
}

impl<'a> FlowNetworkBuilder<'a> {
    pub fn new(grid: &'a RasterGrid, config: &'a FloodConfig) -> Self {
        Self {
            grid,
            config,
            redundant_border_arcs: false,
        }
    }

    /// Re-add explicit river-border -> neighbouring in-node arcs after the
    /// general neighbour pass. They duplicate existing arcs; off by default.
    pub fn with_redundant_border_arcs(mut self, enabled: bool) -> Self {
        self.redundant_border_arcs = enabled;
        self
    }

    pub fn build(&self) -> FloodResult<FlowNetwork> {
        self.config.validate()?;
        let grid = self.grid;
        let border = grid.require_river_border()?;
        let relevant = grid.require_relevant()?;
        let water_height = self.config.effective_water_height();
        let infinity = self.config.infinity_capacity()?;
        let unbounded = FlowArc {
            capacity: infinity,
            kind: ArcKind::Unbounded,
        };

        let relevant_cells = relevant.iter().filter(|&&r| r).count();
        let buildings = grid.building_ids_present();
        let mut graph: DiGraph<NodeKind, FlowArc> = DiGraph::with_capacity(
            2 * relevant_cells + buildings.len() + 2,
            10 * relevant_cells + buildings.len(),
        );
        let mut cell_nodes: Vec<Option<CellNodes>> = vec![None; grid.len()];

        // Cell nodes
        for cell in (0..grid.len()).filter(|&cell| relevant[cell]) {
            if border[cell] {
                let node = graph.add_node(NodeKind::River { cell });
                cell_nodes[cell] = Some(CellNodes::Single(node));
            } else if grid.is_building(cell) {
                let node = graph.add_node(NodeKind::Building { cell });
                cell_nodes[cell] = Some(CellNodes::Single(node));
            } else {
                let input = graph.add_node(NodeKind::NormalIn { cell });
                let output = graph.add_node(NodeKind::NormalOut { cell });
                let cost = barrier_cost(water_height, grid.elevation(cell));
                graph.add_edge(
                    input,
                    output,
                    FlowArc {
                        capacity: self.config.scale(cost),
                        kind: ArcKind::Barrier { cell },
                    },
                );
                cell_nodes[cell] = Some(CellNodes::Split { input, output });
            }
        }

        let source = graph.add_node(NodeKind::Source);
        let sink = graph.add_node(NodeKind::Sink);

        // The flood has unconstrained access to its own border
        for cell in (0..grid.len()).filter(|&cell| relevant[cell] && border[cell]) {
            if let Some(CellNodes::Single(node)) = cell_nodes[cell] {
                graph.add_edge(source, node, unbounded);
            }
        }

        // One sacrifice decision per building id
        let sacrifice = self.config.sacrifice_capacity();
        let mut building_sinks: BTreeMap<BuildingId, NodeIndex> = BTreeMap::new();
        for &building in &buildings {
            let node = graph.add_node(NodeKind::BuildingSink { building });
            graph.add_edge(
                node,
                sink,
                FlowArc {
                    capacity: sacrifice,
                    kind: ArcKind::Sacrifice { building },
                },
            );
            building_sinks.insert(building, node);
        }

        for cell in (0..grid.len()).filter(|&cell| relevant[cell] && grid.is_building(cell)) {
            if let (Some(CellNodes::Single(node)), Some(&target)) = (
                cell_nodes[cell],
                building_sinks.get(&grid.building_id(cell)),
            ) {
                graph.add_edge(node, target, unbounded);
            }
        }

        // Flood propagation between 8-neighbours
        for cell in (0..grid.len()).filter(|&cell| relevant[cell] && !grid.is_building(cell)) {
            let Some(from) = cell_nodes[cell] else {
                continue;
            };
            for nb in grid.neighbors8(cell) {
                if !relevant[nb] || (border[cell] && border[nb]) {
                    continue;
                }
                if let Some(to) = cell_nodes[nb] {
                    graph.add_edge(from.outgoing(), to.incoming(), unbounded);
                }
            }
        }

        if self.redundant_border_arcs {
            for cell in (0..grid.len()).filter(|&cell| relevant[cell] && border[cell]) {
                let Some(CellNodes::Single(from)) = cell_nodes[cell] else {
                    continue;
                };
                for nb in grid.neighbors8(cell) {
                    if let Some(CellNodes::Split { input, .. }) = cell_nodes[nb] {
                        graph.add_edge(from, input, unbounded);
                    }
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            arcs = graph.edge_count(),
            relevant_cells,
            buildings = buildings.len(),
            water_height,
            "flow network built"
        );

        FlowNetwork::from_parts(FlowNetworkParts {
            graph,
            source,
            sink,
            cell_nodes,
            building_sinks,
            infinity,
            sacrifice_capacity: sacrifice,
            scaling_factor: self.config.scaling_factor,
        })
    }
}

/// Build the network with default options.
pub fn build_flow_network(grid: &RasterGrid, config: &FloodConfig) -> FloodResult<FlowNetwork> {
    FlowNetworkBuilder::new(grid, config).build()
}

/// Sum of barrier capacities over `cells`, as used by conservation checks.
pub fn barrier_capacity_sum(network: &FlowNetwork, cells: &[usize]) -> Capacity {
    cells
        .iter()
        .filter_map(|&cell| network.barrier_capacity(cell))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::select_region;
    use floodcut_core::{network_stats, CellRole, FloodError, NodeCategory};
    use petgraph::visit::EdgeRef;
    use std::collections::BTreeSet;

    fn river_column_grid(rows: usize, cols: usize) -> RasterGrid {
        let mut grid = RasterGrid::flat(rows, cols, 0.0).unwrap();
        for row in 0..rows {
            let cell = grid.cell_id(row, 0);
            grid.set_river(cell, 1);
        }
        grid
    }

    fn arc_set(network: &FlowNetwork) -> BTreeSet<(usize, usize, Capacity)> {
        network
            .arcs()
            .map(|e| (e.source().index(), e.target().index(), e.weight().capacity))
            .collect()
    }

    #[test]
    fn test_barrier_cost_rounding() {
        assert_eq!(barrier_cost(1.0, 0.0), 1.0);
        assert_eq!(barrier_cost(1.0, 2.0), 0.0);
        assert_eq!(barrier_cost(382.5, 381.2345), 1.27);
    }

    #[test]
    fn test_barrier_cost_half_cents_round_to_even() {
        assert_eq!(barrier_cost(0.125, 0.0), 0.12);
        assert_eq!(barrier_cost(0.375, 0.0), 0.38);
        assert_eq!(barrier_cost(0.625, 0.0), 0.62);
        assert_eq!(barrier_cost(0.875, 0.0), 0.88);
        // 2.675 is stored just below the half
        assert_eq!(barrier_cost(2.675, 0.0), 2.67);
        assert_eq!(barrier_cost(1.0, 0.875), 0.12);

        let config = FloodConfig::default();
        assert_eq!(config.scale(barrier_cost(1.0, 0.875)), 120_000);
    }

    #[test]
    fn test_requires_region_fields() {
        let grid = river_column_grid(3, 3);
        let err = build_flow_network(&grid, &FloodConfig::default()).unwrap_err();
        assert!(matches!(err, FloodError::InvalidInput(_)));
    }

    #[test]
    fn test_node_layout_and_capacities() {
        let mut grid = river_column_grid(3, 3);
        grid.set_building(grid.cell_id(1, 2), 42);
        let config = FloodConfig::new(0.0, 1.0).with_scaling_factor(1.0);
        select_region(&mut grid, &config).unwrap();
        let network = build_flow_network(&grid, &config).unwrap();
        let stats = network_stats(&network);

        assert_eq!(stats.nodes_of(NodeCategory::River), 3);
        assert_eq!(stats.nodes_of(NodeCategory::Building), 1);
        assert_eq!(stats.nodes_of(NodeCategory::NormalIn), 5);
        assert_eq!(stats.nodes_of(NodeCategory::NormalOut), 5);
        assert_eq!(stats.nodes_of(NodeCategory::BuildingSink), 1);
        assert_eq!(stats.barrier_arcs, 5);
        assert_eq!(stats.sacrifice_arcs, 1);
        assert_eq!(network.barrier_capacity(grid.cell_id(0, 1)), Some(1));
        assert_eq!(stats.finite_capacity_total, 6);
        assert_eq!(network.infinity(), 1_000_000_000);

        let building_cell = grid.cell_id(1, 2);
        assert!(network.node_for(building_cell, CellRole::Single).is_some());
        assert!(network.building_sink(42).is_some());
    }

    #[test]
    fn test_no_arcs_leave_building_cells() {
        let mut grid = river_column_grid(3, 3);
        let building_cell = grid.cell_id(1, 2);
        grid.set_building(building_cell, 7);
        let config = FloodConfig::default();
        select_region(&mut grid, &config).unwrap();
        let network = build_flow_network(&grid, &config).unwrap();
        let node = network.node_for(building_cell, CellRole::Single).unwrap();
        let targets: Vec<NodeKind> = network
            .graph()
            .edges(node)
            .map(|e| network.kind(e.target()))
            .collect();
        assert_eq!(targets, vec![NodeKind::BuildingSink { building: 7 }]);
    }

    #[test]
    fn test_no_river_to_river_arcs() {
        let mut grid = river_column_grid(4, 3);
        let config = FloodConfig::default();
        select_region(&mut grid, &config).unwrap();
        let network = build_flow_network(&grid, &config).unwrap();
        for edge in network.arcs() {
            let from = network.kind(edge.source());
            let to = network.kind(edge.target());
            assert!(
                !matches!((from, to), (NodeKind::River { .. }, NodeKind::River { .. })),
                "unexpected arc {from:?} -> {to:?}"
            );
        }
    }

    #[test]
    fn test_redundant_border_pass_adds_nothing_new() {
        let mut grid = river_column_grid(5, 5);
        grid.set_elevation(grid.cell_id(2, 3), 0.4);
        grid.set_building(grid.cell_id(4, 4), 3);
        let config = FloodConfig::default();
        select_region(&mut grid, &config).unwrap();

        let plain = FlowNetworkBuilder::new(&grid, &config).build().unwrap();
        let doubled = FlowNetworkBuilder::new(&grid, &config)
            .with_redundant_border_arcs(true)
            .build()
            .unwrap();

        assert!(doubled.arc_count() > plain.arc_count());
        assert_eq!(arc_set(&plain), arc_set(&doubled));
    }

    #[test]
    fn test_infinity_must_dominate_finite_capacities() {
        // sentinel of about one unit against a sacrifice arc of about five
        let mut grid = river_column_grid(2, 2);
        grid.set_building(grid.cell_id(0, 1), 1);
        let config = FloodConfig::default()
            .with_scaling_factor(1e-9)
            .with_building_weight(5e9);
        select_region(&mut grid, &config).unwrap();
        let err = build_flow_network(&grid, &config).unwrap_err();
        assert!(matches!(err, FloodError::CapacityOverflowRisk { .. }));
    }

    #[test]
    fn test_empty_relevance_builds_terminal_only_network() {
        let mut grid = RasterGrid::flat(3, 3, 0.0).unwrap();
        grid.set_building(4, 9);
        let config = FloodConfig::default();
        select_region(&mut grid, &config).unwrap();
        let network = build_flow_network(&grid, &config).unwrap();
        // source, sink and one building sink
        assert_eq!(network.node_count(), 3);
        assert_eq!(network.arc_count(), 1);
    }
}
