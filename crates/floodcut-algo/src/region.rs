//! Region selection: which cells can the flood reach at all?
//!
//! Two derived masks are computed from the raw grid:
//!
//! 1. **River border** - river cells with at least one 4-adjacent dry cell.
//!    These are where the flood enters the decision graph.
//! 2. **Relevance** - a worklist flood fill from the border over cells at or
//!    below the critical elevation (`river_height + elevation_threshold`).
//!    Interior river cells and building cells surrounded by building on all
//!    four sides are visited but never marked or expanded.
//!
//! The per-cell verdict depends only on static fields of that cell and its
//! 4-neighbours, and relevance is only ever added during expansion, so the
//! final mask does not depend on the worklist order. [`WorklistOrder`]
//! selects FIFO (default) or LIFO draining.

use floodcut_core::{FloodConfig, FloodResult, RasterGrid, WorklistOrder};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Counts reported after region selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub river_cells: usize,
    pub border_cells: usize,
    pub relevant_cells: usize,
    /// Worklist pops, including harmless revisits
    pub visits: usize,
}

/// River cells with a 4-adjacent non-river neighbour.
pub fn river_border_mask(grid: &RasterGrid) -> Vec<bool> {
    (0..grid.len())
        .map(|cell| grid.is_river(cell) && grid.neighbors4(cell).any(|nb| !grid.is_river(nb)))
        .collect()
}

/// Compute and store the river-border mask. Returns the number of border cells.
pub fn compute_river_border(grid: &mut RasterGrid) -> FloodResult<usize> {
    let mask = river_border_mask(grid);
    let count = mask.iter().filter(|&&b| b).count();
    grid.set_river_border(mask)?;
    Ok(count)
}

/// Whether a reachable cell below the critical elevation joins the region.
fn joins_region(grid: &RasterGrid, border: &[bool], cell: usize) -> bool {
    if grid.is_river(cell) && !border[cell] {
        // interior river is already wet and not actionable
        return false;
    }
    if grid.is_building(cell) {
        return grid.neighbors4(cell).any(|nb| !grid.is_building(nb));
    }
    true
}

/// Relevance flood fill from the river border.
///
/// Border cells start relevant. A drained cell above `critical_elevation` is
/// skipped without being marked. Otherwise its verdict is written and, when
/// positive, its not-yet-relevant 4-neighbours are queued.
pub fn relevance_mask(
    grid: &RasterGrid,
    border: &[bool],
    critical_elevation: f64,
    order: WorklistOrder,
) -> (Vec<bool>, usize) {
    let mut relevant = border.to_vec();
    let mut queued = border.to_vec();
    let mut worklist: VecDeque<usize> = (0..grid.len()).filter(|&cell| border[cell]).collect();
    let mut visits = 0;

    loop {
        let next = match order {
            WorklistOrder::Fifo => worklist.pop_front(),
            WorklistOrder::Lifo => worklist.pop_back(),
        };
        let Some(cell) = next else { break };
        queued[cell] = false;
        visits += 1;

        if grid.elevation(cell) > critical_elevation {
            continue;
        }
        let value = joins_region(grid, border, cell);
        relevant[cell] = value;
        if value {
            for nb in grid.neighbors4(cell) {
                if !relevant[nb] && !queued[nb] {
                    queued[nb] = true;
                    worklist.push_back(nb);
                }
            }
        }
    }

    (relevant, visits)
}

/// Compute and store the relevance mask. Requires the river-border mask.
pub fn compute_relevant(
    grid: &mut RasterGrid,
    river_height: f64,
    elevation_threshold: f64,
    order: WorklistOrder,
) -> FloodResult<(usize, usize)> {
    let border = grid.require_river_border()?;
    let (mask, visits) = relevance_mask(grid, border, river_height + elevation_threshold, order);
    let count = mask.iter().filter(|&&r| r).count();
    grid.set_relevant(mask)?;
    Ok((count, visits))
}

/// Run both passes with the parameters from `config`.
pub fn select_region(grid: &mut RasterGrid, config: &FloodConfig) -> FloodResult<RegionSummary> {
    config.validate()?;
    let river_cells = (0..grid.len()).filter(|&cell| grid.is_river(cell)).count();
    let border_cells = compute_river_border(grid)?;
    if border_cells == 0 {
        warn!("grid has no river border cells; nothing can flood");
    }
    let (relevant_cells, visits) = compute_relevant(
        grid,
        config.river_height,
        config.elevation_threshold,
        config.worklist,
    )?;
    debug!(
        river_cells,
        border_cells,
        relevant_cells,
        visits,
        critical = config.critical_elevation(),
        "region selection finished"
    );
    Ok(RegionSummary {
        river_cells,
        border_cells,
        relevant_cells,
        visits,
    })
}
