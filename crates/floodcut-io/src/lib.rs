//! # floodcut-io: Grid Input and Solution Output
//!
//! - [`grid_json`] - single-file JSON grid documents
//! - [`grid_csv`] - a directory of CSV raster layers
//! - [`export`] - plain-text and JSON solution reports
//!
//! [`load_grid`] picks the reader from the path: a directory is read as CSV
//! layers, anything else as a JSON document.

pub mod export;
pub mod grid_csv;
pub mod grid_json;

use floodcut_core::{FloodResult, RasterGrid};
use std::path::Path;

pub use export::{
    format_solution_text, parse_solution_text, read_solution_text, solution_file_name,
    write_json, write_solution_json, write_solution_text, write_sweep_reports, SolutionReport,
};
pub use grid_csv::{load_grid_csv, load_grid_dir, save_grid_dir};
pub use grid_json::{load_grid_json, parse_grid_json, save_grid_json, GridDocument};

/// Load a grid from a JSON file or a directory of CSV layers.
pub fn load_grid(path: &Path) -> FloodResult<RasterGrid> {
    if path.is_dir() {
        load_grid_dir(path)
    } else {
        load_grid_json(path)
    }
}
