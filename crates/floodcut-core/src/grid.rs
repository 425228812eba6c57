//! Row-major raster grid with per-cell terrain, river and building fields.
//!
//! The grid is produced upstream (elevation ingestion and polygon
//! rasterization) and is read-only for the planning core, apart from the two
//! derived masks `river_border` and `relevant` that region selection fills in.

use crate::error::{FloodError, FloodResult};
use std::collections::BTreeSet;

/// Identifier of a building footprint on the grid. `0` means "no building".
pub type BuildingId = u64;

/// Reserved building id for cells without a building.
pub const NO_BUILDING: BuildingId = 0;

const FOUR_NEIGHBORHOOD: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

const EIGHT_NEIGHBORHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Raster elevation model with river and building layers.
///
/// Cells are addressed by a flat id `row * cols + col`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    rows: usize,
    cols: usize,
    elevation: Vec<f64>,
    river: Vec<u32>,
    building_ids: Vec<BuildingId>,
    river_border: Option<Vec<bool>>,
    relevant: Option<Vec<bool>>,
}

impl RasterGrid {
    /// Create a grid from its three required layers.
    ///
    /// Fails with [`FloodError::InvalidInput`] when a layer length does not
    /// match `rows * cols` or an elevation is not finite.
    pub fn new(
        rows: usize,
        cols: usize,
        elevation: Vec<f64>,
        river: Vec<u32>,
        building_ids: Vec<BuildingId>,
    ) -> FloodResult<Self> {
        let len = checked_len(rows, cols)?;
        check_layer("elevation", elevation.len(), len)?;
        check_layer("river", river.len(), len)?;
        check_layer("building_ids", building_ids.len(), len)?;
        if let Some(cell) = elevation.iter().position(|z| !z.is_finite()) {
            return Err(FloodError::InvalidInput(format!(
                "elevation at cell {cell} is not finite"
            )));
        }
        Ok(Self {
            rows,
            cols,
            elevation,
            river,
            building_ids,
            river_border: None,
            relevant: None,
        })
    }

    /// A grid of uniform elevation with no river and no buildings.
    pub fn flat(rows: usize, cols: usize, elevation: f64) -> FloodResult<Self> {
        let len = checked_len(rows, cols)?;
        Self::new(rows, cols, vec![elevation; len], vec![0; len], vec![NO_BUILDING; len])
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn cell_id(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn position(&self, cell: usize) -> (usize, usize) {
        (cell / self.cols, cell % self.cols)
    }

    #[inline]
    pub fn elevation(&self, cell: usize) -> f64 {
        self.elevation[cell]
    }

    /// River-membership count (overlapping polygons may exceed 1).
    #[inline]
    pub fn river(&self, cell: usize) -> u32 {
        self.river[cell]
    }

    #[inline]
    pub fn is_river(&self, cell: usize) -> bool {
        self.river[cell] > 0
    }

    #[inline]
    pub fn building_id(&self, cell: usize) -> BuildingId {
        self.building_ids[cell]
    }

    #[inline]
    pub fn is_building(&self, cell: usize) -> bool {
        self.building_ids[cell] != NO_BUILDING
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevation
    }

    pub fn river_layer(&self) -> &[u32] {
        &self.river
    }

    pub fn building_layer(&self) -> &[BuildingId] {
        &self.building_ids
    }

    pub fn set_elevation(&mut self, cell: usize, elevation: f64) {
        self.elevation[cell] = elevation;
    }

    pub fn set_river(&mut self, cell: usize, count: u32) {
        self.river[cell] = count;
    }

    pub fn set_building(&mut self, cell: usize, id: BuildingId) {
        self.building_ids[cell] = id;
    }

    /// Distinct non-zero building ids, ascending.
    pub fn building_ids_present(&self) -> BTreeSet<BuildingId> {
        self.building_ids
            .iter()
            .copied()
            .filter(|&id| id != NO_BUILDING)
            .collect()
    }

    /// Up/down/left/right neighbours inside the grid.
    pub fn neighbors4(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.offset_cells(cell, &FOUR_NEIGHBORHOOD)
    }

    /// All eight surrounding cells inside the grid, row by row.
    pub fn neighbors8(&self, cell: usize) -> impl Iterator<Item = usize> + '_ {
        self.offset_cells(cell, &EIGHT_NEIGHBORHOOD)
    }

    fn offset_cells<'a>(
        &'a self,
        cell: usize,
        deltas: &'static [(isize, isize)],
    ) -> impl Iterator<Item = usize> + 'a {
        let (row, col) = self.position(cell);
        deltas.iter().filter_map(move |&(dr, dc)| {
            let r = row.checked_add_signed(dr)?;
            let c = col.checked_add_signed(dc)?;
            (r < self.rows && c < self.cols).then(|| r * self.cols + c)
        })
    }

    pub fn river_border(&self) -> Option<&[bool]> {
        self.river_border.as_deref()
    }

    pub fn relevant(&self) -> Option<&[bool]> {
        self.relevant.as_deref()
    }

    /// The river-border mask, or `InvalidInput` if region selection has not run.
    pub fn require_river_border(&self) -> FloodResult<&[bool]> {
        self.river_border().ok_or_else(|| {
            FloodError::InvalidInput("grid is missing the river_border field".into())
        })
    }

    /// The relevance mask, or `InvalidInput` if region selection has not run.
    pub fn require_relevant(&self) -> FloodResult<&[bool]> {
        self.relevant()
            .ok_or_else(|| FloodError::InvalidInput("grid is missing the relevant field".into()))
    }

    pub fn set_river_border(&mut self, mask: Vec<bool>) -> FloodResult<()> {
        check_layer("river_border", mask.len(), self.len())?;
        self.river_border = Some(mask);
        Ok(())
    }

    pub fn set_relevant(&mut self, mask: Vec<bool>) -> FloodResult<()> {
        check_layer("relevant", mask.len(), self.len())?;
        self.relevant = Some(mask);
        Ok(())
    }

    /// Number of cells marked relevant (0 when the mask is absent).
    pub fn relevant_count(&self) -> usize {
        self.relevant()
            .map(|mask| mask.iter().filter(|&&r| r).count())
            .unwrap_or(0)
    }
}

fn checked_len(rows: usize, cols: usize) -> FloodResult<usize> {
    rows.checked_mul(cols)
        .ok_or_else(|| FloodError::InvalidInput(format!("grid {rows}x{cols} is too large")))
}

fn check_layer(name: &str, actual: usize, expected: usize) -> FloodResult<()> {
    if actual != expected {
        return Err(FloodError::InvalidInput(format!(
            "layer '{name}' has {actual} cells, grid shape requires {expected}"
        )));
    }
    Ok(())
}
