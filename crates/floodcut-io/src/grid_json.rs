//! JSON grid documents.
//!
//! ```json
//! {
//!   "rows": 2, "cols": 3,
//!   "elevation": [380.1, 380.4, 381.0, 380.0, 380.2, 382.3],
//!   "river": [1, 0, 0, 1, 0, 0],
//!   "building_ids": [0, 0, 20004, 0, 0, 20004],
//!   "river_border": [true, false, false, true, false, false]
//! }
//! ```
//!
//! `river_border` and `relevant` are optional; when present they are
//! length-checked and attached to the grid so region selection can be skipped.

use floodcut_core::{BuildingId, FloodResult, RasterGrid};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub rows: usize,
    pub cols: usize,
    pub elevation: Vec<f64>,
    pub river: Vec<u32>,
    pub building_ids: Vec<BuildingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub river_border: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<Vec<bool>>,
}

impl GridDocument {
    pub fn from_grid(grid: &RasterGrid) -> Self {
        Self {
            rows: grid.rows(),
            cols: grid.cols(),
            elevation: grid.elevations().to_vec(),
            river: grid.river_layer().to_vec(),
            building_ids: grid.building_layer().to_vec(),
            river_border: grid.river_border().map(<[bool]>::to_vec),
            relevant: grid.relevant().map(<[bool]>::to_vec),
        }
    }

    pub fn into_grid(self) -> FloodResult<RasterGrid> {
        let mut grid = RasterGrid::new(
            self.rows,
            self.cols,
            self.elevation,
            self.river,
            self.building_ids,
        )?;
        if let Some(mask) = self.river_border {
            grid.set_river_border(mask)?;
        }
        if let Some(mask) = self.relevant {
            grid.set_relevant(mask)?;
        }
        Ok(grid)
    }
}

pub fn parse_grid_json(text: &str) -> FloodResult<RasterGrid> {
    let document: GridDocument = serde_json::from_str(text)?;
    document.into_grid()
}

pub fn load_grid_json(path: &Path) -> FloodResult<RasterGrid> {
    let text = fs::read_to_string(path)?;
    let grid = parse_grid_json(&text)?;
    debug!(
        path = %path.display(),
        rows = grid.rows(),
        cols = grid.cols(),
        "loaded JSON grid"
    );
    Ok(grid)
}

/// Write `grid`, including any derived masks, as a JSON document.
pub fn save_grid_json(grid: &RasterGrid, path: &Path) -> FloodResult<()> {
    let text = serde_json::to_string_pretty(&GridDocument::from_grid(grid))?;
    fs::write(path, text)?;
    Ok(())
}
