//! End-to-end planning: region selection, network construction, solve, decode.

use crate::mincut::{solver_for, MinCutSolver};
use crate::network::build_flow_network;
use crate::region::{select_region, RegionSummary};
use crate::solution::{interpret, ProtectionSolution};
use floodcut_core::{FloodConfig, FloodResult, RasterGrid};
use std::time::Instant;
use tracing::info;

/// Solve one `(grid, water height, building weight)` combination.
///
/// The grid must already carry the `river_border` and `relevant` masks. A
/// fresh network is built on every call; nothing is shared between calls.
pub fn compute_min_cut_solution(
    grid: &RasterGrid,
    config: &FloodConfig,
) -> FloodResult<ProtectionSolution> {
    let solver = solver_for(config.solver);
    compute_with_solver(grid, config, solver.as_ref())
}

/// Like [`compute_min_cut_solution`] with an explicit backend.
///
/// `solve_time` covers the backend call only, not network construction.
pub fn compute_with_solver(
    grid: &RasterGrid,
    config: &FloodConfig,
    solver: &dyn MinCutSolver,
) -> FloodResult<ProtectionSolution> {
    let network = build_flow_network(grid, config)?;
    let start = Instant::now();
    let cut = solver.solve(&network)?;
    let solve_time = start.elapsed();
    let mut solution = interpret(&network, &cut, config)?;
    solution.solver = solver.id().to_string();
    solution.solve_time = solve_time;

    info!(
        solver = solver.id(),
        building_weight = config.building_weight,
        flow = solution.flow_value,
        cut_cells = solution.cut_cells.len(),
        flooded = solution.flooded_buildings.len(),
        sandbags = solution.sandbags_needed,
        elapsed_ms = solution.solve_time.as_millis() as u64,
        "min-cut solution computed"
    );
    Ok(solution)
}

/// Run region selection on a raw grid, then solve.
pub fn plan_protection(
    grid: &mut RasterGrid,
    config: &FloodConfig,
) -> FloodResult<(RegionSummary, ProtectionSolution)> {
    let region = select_region(grid, config)?;
    let solution = compute_min_cut_solution(grid, config)?;
    Ok((region, solution))
}
