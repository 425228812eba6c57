//! CSV raster layers: one grid row per line, no header.
//!
//! A grid directory holds three equally shaped layers named
//! [`ELEVATION_FILE`], [`RIVER_FILE`] and [`BUILDINGS_FILE`].

use floodcut_core::{FloodError, FloodResult, RasterGrid};
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

pub const ELEVATION_FILE: &str = "elevation.csv";
pub const RIVER_FILE: &str = "river.csv";
pub const BUILDINGS_FILE: &str = "building_ids.csv";

struct Layer<T> {
    rows: usize,
    cols: usize,
    values: Vec<T>,
}

fn csv_error(path: &Path, err: csv::Error) -> FloodError {
    let message = format!("{}: {err}", path.display());
    match err.into_kind() {
        csv::ErrorKind::Io(io) => FloodError::Io(io),
        _ => FloodError::Parse(message),
    }
}

fn read_layer<T>(path: &Path) -> FloodResult<Layer<T>>
where
    T: FromStr,
    T::Err: Display,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut layer = Layer {
        rows: 0,
        cols: 0,
        values: Vec::new(),
    };
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        if layer.rows == 0 {
            layer.cols = record.len();
        }
        for (col, field) in record.iter().enumerate() {
            let value = field.parse::<T>().map_err(|e| {
                FloodError::Parse(format!(
                    "{}: row {}, column {col}: '{field}': {e}",
                    path.display(),
                    layer.rows
                ))
            })?;
            layer.values.push(value);
        }
        layer.rows += 1;
    }
    Ok(layer)
}

fn check_shape<T, U>(name: &str, expected: &Layer<T>, actual: &Layer<U>) -> FloodResult<()> {
    if (expected.rows, expected.cols) != (actual.rows, actual.cols) {
        return Err(FloodError::InvalidInput(format!(
            "{name} layer is {}x{}, elevation layer is {}x{}",
            actual.rows, actual.cols, expected.rows, expected.cols
        )));
    }
    Ok(())
}

/// Load a grid from three CSV layers.
pub fn load_grid_csv(elevation: &Path, river: &Path, buildings: &Path) -> FloodResult<RasterGrid> {
    let elevation_layer: Layer<f64> = read_layer(elevation)?;
    let river_layer: Layer<u32> = read_layer(river)?;
    let building_layer: Layer<u64> = read_layer(buildings)?;
    check_shape("river", &elevation_layer, &river_layer)?;
    check_shape("building", &elevation_layer, &building_layer)?;

    let grid = RasterGrid::new(
        elevation_layer.rows,
        elevation_layer.cols,
        elevation_layer.values,
        river_layer.values,
        building_layer.values,
    )?;
    debug!(rows = grid.rows(), cols = grid.cols(), "loaded CSV grid");
    Ok(grid)
}

/// Load the three standard layer files from `dir`.
pub fn load_grid_dir(dir: &Path) -> FloodResult<RasterGrid> {
    load_grid_csv(
        &dir.join(ELEVATION_FILE),
        &dir.join(RIVER_FILE),
        &dir.join(BUILDINGS_FILE),
    )
}

fn write_layer<T: ToString>(path: &Path, cols: usize, values: &[T]) -> FloodResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;
    for row in values.chunks(cols.max(1)) {
        writer
            .write_record(row.iter().map(ToString::to_string))
            .map_err(|e| csv_error(path, e))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the three standard layer files into `dir`.
pub fn save_grid_dir(grid: &RasterGrid, dir: &Path) -> FloodResult<()> {
    std::fs::create_dir_all(dir)?;
    write_layer(&dir.join(ELEVATION_FILE), grid.cols(), grid.elevations())?;
    write_layer(&dir.join(RIVER_FILE), grid.cols(), grid.river_layer())?;
    write_layer(&dir.join(BUILDINGS_FILE), grid.cols(), grid.building_layer())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_layers(dir: &Path, elevation: &str, river: &str, buildings: &str) {
        fs::write(dir.join(ELEVATION_FILE), elevation).unwrap();
        fs::write(dir.join(RIVER_FILE), river).unwrap();
        fs::write(dir.join(BUILDINGS_FILE), buildings).unwrap();
    }

    #[test]
    fn test_load_grid_dir() {
        let dir = tempdir().unwrap();
        write_layers(
            dir.path(),
            "380.0, 380.5, 381.25\n380.1,380.2,380.3\n",
            "1,0,0\n1,0,0\n",
            "0,0,20004\n0,0,20004\n",
        );
        let grid = load_grid_dir(dir.path()).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.elevation(2), 381.25);
        assert!(grid.is_river(3));
        assert_eq!(grid.building_id(5), 20_004);
    }

    #[test]
    fn test_layer_shape_mismatch() {
        let dir = tempdir().unwrap();
        write_layers(dir.path(), "0,0\n0,0\n", "1,0\n", "0,0\n0,0\n");
        let err = load_grid_dir(dir.path()).unwrap_err();
        assert!(matches!(err, FloodError::InvalidInput(msg) if msg.contains("river")));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let dir = tempdir().unwrap();
        write_layers(dir.path(), "0,0\n0\n", "0,0\n0,0\n", "0,0\n0,0\n");
        let err = load_grid_dir(dir.path()).unwrap_err();
        assert!(matches!(err, FloodError::Parse(_)));
    }

    #[test]
    fn test_bad_number_reports_position() {
        let dir = tempdir().unwrap();
        write_layers(dir.path(), "0,abc\n", "0,0\n", "0,0\n");
        let err = load_grid_dir(dir.path()).unwrap_err();
        assert!(matches!(err, FloodError::Parse(msg) if msg.contains("row 0, column 1")));
    }

    #[test]
    fn test_missing_layer_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_grid_dir(dir.path()).unwrap_err();
        assert!(matches!(err, FloodError::Io(_)));
    }

    #[test]
    fn test_save_then_load_dir() {
        let dir = tempdir().unwrap();
        let mut grid = RasterGrid::flat(2, 2, 1.5).unwrap();
        grid.set_river(0, 2);
        grid.set_building(3, 9);
        save_grid_dir(&grid, dir.path()).unwrap();
        let loaded = load_grid_dir(dir.path()).unwrap();
        assert_eq!(loaded, grid);
    }
}
