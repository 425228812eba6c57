//! Solution reports.
//!
//! The plain-text report is three `key:value` lines:
//!
//! ```text
//! cut_cells:12,13,14
//! sandbags_needed:3.5
//! flooded_buildings:20004
//! ```

use floodcut_algo::{ProtectionSolution, SweepResult};
use floodcut_core::{BuildingId, FloodError, FloodResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Fields carried by the plain-text report.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionReport {
    pub cut_cells: Vec<usize>,
    pub sandbags_needed: f64,
    pub flooded_buildings: Vec<BuildingId>,
}

impl From<&ProtectionSolution> for SolutionReport {
    fn from(solution: &ProtectionSolution) -> Self {
        Self {
            cut_cells: solution.cut_cells.clone(),
            sandbags_needed: solution.sandbags_needed,
            flooded_buildings: solution.flooded_buildings.clone(),
        }
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn format_solution_text(solution: &ProtectionSolution) -> String {
    format!(
        "cut_cells:{}\nsandbags_needed:{}\nflooded_buildings:{}\n",
        join(&solution.cut_cells),
        solution.sandbags_needed,
        join(&solution.flooded_buildings)
    )
}

fn parse_list<T: std::str::FromStr>(key: &str, value: &str) -> FloodResult<Vec<T>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|item| {
            item.trim()
                .parse::<T>()
                .map_err(|_| FloodError::Parse(format!("{key}: invalid entry '{item}'")))
        })
        .collect()
}

/// Parse a plain-text report. Unknown keys are ignored.
pub fn parse_solution_text(text: &str) -> FloodResult<SolutionReport> {
    let mut cut_cells = None;
    let mut sandbags_needed = None;
    let mut flooded_buildings = None;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let Some((key, value)) = line.split_once(':') else {
            return Err(FloodError::Parse(format!("expected key:value, got '{line}'")));
        };
        match key.trim() {
            "cut_cells" => cut_cells = Some(parse_list(key, value)?),
            "flooded_buildings" => flooded_buildings = Some(parse_list(key, value)?),
            "sandbags_needed" => {
                let parsed = value.trim().parse::<f64>().map_err(|_| {
                    FloodError::Parse(format!("sandbags_needed: invalid value '{value}'"))
                })?;
                sandbags_needed = Some(parsed);
            }
            _ => {}
        }
    }

    let missing = |key: &str| FloodError::Parse(format!("report is missing '{key}'"));
    Ok(SolutionReport {
        cut_cells: cut_cells.ok_or_else(|| missing("cut_cells"))?,
        sandbags_needed: sandbags_needed.ok_or_else(|| missing("sandbags_needed"))?,
        flooded_buildings: flooded_buildings.ok_or_else(|| missing("flooded_buildings"))?,
    })
}

pub fn write_solution_text(solution: &ProtectionSolution, path: &Path) -> FloodResult<()> {
    fs::write(path, format_solution_text(solution))?;
    Ok(())
}

pub fn read_solution_text(path: &Path) -> FloodResult<SolutionReport> {
    parse_solution_text(&fs::read_to_string(path)?)
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> FloodResult<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn write_solution_json(solution: &ProtectionSolution, path: &Path) -> FloodResult<()> {
    write_json(solution, path)
}

/// Report file name for one building weight, e.g. `cut_cells_10.txt`.
pub fn solution_file_name(building_weight: f64) -> String {
    format!("cut_cells_{building_weight}.txt")
}

/// Write one text report per sweep point into `dir`. Returns the paths written.
pub fn write_sweep_reports(result: &SweepResult, dir: &Path) -> FloodResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    result
        .points
        .iter()
        .map(|point| {
            let path = dir.join(solution_file_name(point.building_weight));
            write_solution_text(&point.solution, &path)?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodcut_core::FloodConfig;

    fn sample() -> ProtectionSolution {
        let mut solution = ProtectionSolution::empty(&FloodConfig::default());
        solution.cut_cells = vec![12, 13, 14];
        solution.sandbags_needed = 3.5;
        solution.flooded_buildings = vec![20_004];
        solution
    }

    #[test]
    fn test_text_format() {
        assert_eq!(
            format_solution_text(&sample()),
            "cut_cells:12,13,14\nsandbags_needed:3.5\nflooded_buildings:20004\n"
        );
    }

    #[test]
    fn test_empty_lists() {
        let solution = ProtectionSolution::empty(&FloodConfig::default());
        let text = format_solution_text(&solution);
        assert_eq!(text, "cut_cells:\nsandbags_needed:0\nflooded_buildings:\n");
        let report = parse_solution_text(&text).unwrap();
        assert!(report.cut_cells.is_empty());
        assert!(report.flooded_buildings.is_empty());
    }

    #[test]
    fn test_parse_matches_source() {
        let solution = sample();
        let report = parse_solution_text(&format_solution_text(&solution)).unwrap();
        assert_eq!(report, SolutionReport::from(&solution));
    }

    #[test]
    fn test_parse_rejects_missing_key() {
        let err = parse_solution_text("cut_cells:1\n").unwrap_err();
        assert!(matches!(err, FloodError::Parse(msg) if msg.contains("sandbags_needed")));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(solution_file_name(10.0), "cut_cells_10.txt");
        assert_eq!(solution_file_name(3.5), "cut_cells_3.5.txt");
    }
}
