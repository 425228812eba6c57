//! Decoding a minimum cut into a protection plan.

use crate::mincut::MinCut;
use floodcut_core::{BuildingId, Capacity, FloodConfig, FloodError, FloodResult, FlowNetwork};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where to build barriers and which buildings to give up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionSolution {
    /// Cells where a barrier must be built, ascending
    pub cut_cells: Vec<usize>,
    /// Buildings sacrificed to the flood, ascending
    pub flooded_buildings: Vec<BuildingId>,
    /// Buildings kept dry, ascending
    pub protected_buildings: Vec<BuildingId>,
    /// Raw max-flow value in scaled capacity units
    pub flow_value: Capacity,
    /// Barrier share of the total cost, in elevation units
    pub sandbags_needed: f64,
    pub building_weight: f64,
    pub water_height: f64,
    /// Backend that produced the cut
    pub solver: String,
    pub solve_time: Duration,
}

impl ProtectionSolution {
    /// Solution for a network with nothing to protect.
    pub fn empty(config: &FloodConfig) -> Self {
        Self {
            cut_cells: Vec::new(),
            flooded_buildings: Vec::new(),
            protected_buildings: Vec::new(),
            flow_value: 0,
            sandbags_needed: 0.0,
            building_weight: config.building_weight,
            water_height: config.effective_water_height(),
            solver: config.solver.as_str().to_string(),
            solve_time: Duration::ZERO,
        }
    }

    /// Total protection cost (barriers plus sacrifices) in elevation units.
    pub fn total_cost(&self, scaling_factor: f64) -> f64 {
        self.flow_value as f64 / scaling_factor
    }

    pub fn flooded_count(&self) -> usize {
        self.flooded_buildings.len()
    }

    pub fn is_flooded(&self, building: BuildingId) -> bool {
        self.flooded_buildings.binary_search(&building).is_ok()
    }

    pub fn summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Flood Protection Plan\n{}\n", "=".repeat(40)));
        s.push_str(&format!("Solver: {}\n", self.solver));
        s.push_str(&format!("Water Height: {:.2}\n", self.water_height));
        s.push_str(&format!("Building Weight: {:.2}\n", self.building_weight));
        s.push_str(&format!("Flow Value: {}\n", self.flow_value));
        s.push_str(&format!("Sandbags Needed: {:.2}\n", self.sandbags_needed));
        s.push_str(&format!("Barrier Cells: {}\n", self.cut_cells.len()));
        s.push_str(&format!(
            "Buildings: {} flooded, {} protected\n",
            self.flooded_buildings.len(),
            self.protected_buildings.len()
        ));
        s.push_str(&format!("Solve Time: {:.2?}\n", self.solve_time));

        if !self.flooded_buildings.is_empty() {
            s.push_str("\nFlooded Buildings:\n");
            for id in &self.flooded_buildings {
                s.push_str(&format!("  [FLOOD] {id}\n"));
            }
        }
        s
    }
}

/// Decode `cut` over `network` into a [`ProtectionSolution`].
///
/// A split cell is a barrier cell when its in-node is on the source side and
/// its out-node is not. A building is flooded when its building-sink node is
/// on the source side. Decoding is a pure function of the partition: the
/// sacrifice price and scale come from `network`, `config` only labels the
/// result.
pub fn interpret(
    network: &FlowNetwork,
    cut: &MinCut,
    config: &FloodConfig,
) -> FloodResult<ProtectionSolution> {
    if cut.source_side.len() != network.node_count() {
        return Err(FloodError::InvalidInput(format!(
            "partition covers {} nodes, network has {}",
            cut.source_side.len(),
            network.node_count()
        )));
    }

    let cut_cells: Vec<usize> = network
        .split_cells()
        .filter(|&(_, input, output)| cut.is_source_side(input) && !cut.is_source_side(output))
        .map(|(cell, _, _)| cell)
        .collect();

    let (flooded_buildings, protected_buildings): (Vec<_>, Vec<_>) = network
        .building_sinks()
        .partition(|&(_, node)| cut.is_source_side(node));
    let flooded_buildings: Vec<BuildingId> = flooded_buildings.into_iter().map(|(id, _)| id).collect();
    let protected_buildings: Vec<BuildingId> =
        protected_buildings.into_iter().map(|(id, _)| id).collect();

    let sacrifice_total = flooded_buildings.len() as Capacity * network.sacrifice_capacity();
    let sandbags_needed = (cut.flow_value - sacrifice_total) as f64 / network.scaling_factor();

    Ok(ProtectionSolution {
        cut_cells,
        flooded_buildings,
        protected_buildings,
        flow_value: cut.flow_value,
        sandbags_needed,
        building_weight: config.building_weight,
        water_height: config.effective_water_height(),
        solver: config.solver.as_str().to_string(),
        solve_time: Duration::ZERO,
    })
}
