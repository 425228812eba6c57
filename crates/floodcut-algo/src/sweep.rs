//! Building-weight sweep.
//!
//! Traces the trade-off between barrier cost and the number of sacrificed
//! buildings. Starting from a low and a high weight, the sweep probes the
//! weight at which two neighbouring solutions cost the same,
//!
//! ```text
//! λ = (sandbags(hi) - sandbags(lo)) / (flooded(lo) - flooded(hi))
//! ```
//!
//! and recurses into both halves whenever the probe reveals a flooded count
//! different from both neighbours. Every probe builds and solves a fresh
//! network.

use crate::pipeline::compute_min_cut_solution;
use crate::solution::ProtectionSolution;
use floodcut_core::{FloodConfig, FloodError, FloodResult, RasterGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Weights closer than this are treated as the same probe.
const WEIGHT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepOptions {
    pub low_weight: f64,
    pub high_weight: f64,
    /// Upper bound on solves, endpoints included
    pub max_evaluations: usize,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            low_weight: 10.0,
            high_weight: 100.0,
            max_evaluations: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub building_weight: f64,
    pub solution: ProtectionSolution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Evaluated weights, ascending
    pub points: Vec<SweepPoint>,
    pub evaluations: usize,
    /// True if `max_evaluations` stopped the search early
    pub truncated: bool,
}

impl SweepResult {
    /// `(weight, flooded count, sandbags)` triples, ascending by weight.
    pub fn frontier(&self) -> Vec<(f64, usize, f64)> {
        self.points
            .iter()
            .map(|p| {
                (
                    p.building_weight,
                    p.solution.flooded_count(),
                    p.solution.sandbags_needed,
                )
            })
            .collect()
    }
}

/// Weight at which solutions `lower` and `higher` cost the same, if it is
/// strictly between their weights.
fn breakpoint(lower: &SweepPoint, higher: &SweepPoint) -> Option<f64> {
    let flooded_diff =
        lower.solution.flooded_count() as f64 - higher.solution.flooded_count() as f64;
    if flooded_diff == 0.0 {
        return None;
    }
    let lambda =
        (higher.solution.sandbags_needed - lower.solution.sandbags_needed) / flooded_diff;
    let inside = lambda.is_finite()
        && lambda > lower.building_weight + WEIGHT_EPSILON
        && lambda < higher.building_weight - WEIGHT_EPSILON;
    inside.then_some(lambda)
}

fn solve_at(grid: &RasterGrid, config: &FloodConfig, weight: f64) -> FloodResult<SweepPoint> {
    let config = config.clone().with_building_weight(weight);
    let solution = compute_min_cut_solution(grid, &config)?;
    Ok(SweepPoint {
        building_weight: weight,
        solution,
    })
}

/// Sweep the building weight over `[low_weight, high_weight]`.
///
/// The grid must already carry its region masks. The two endpoints are
/// solved in parallel.
pub fn building_weight_sweep(
    grid: &RasterGrid,
    config: &FloodConfig,
    options: &SweepOptions,
) -> FloodResult<SweepResult> {
    let SweepOptions {
        low_weight,
        high_weight,
        max_evaluations,
    } = *options;
    if !(low_weight.is_finite() && high_weight.is_finite() && 0.0 <= low_weight) {
        return Err(FloodError::Config(format!(
            "sweep weights must be finite and non-negative, got [{low_weight}, {high_weight}]"
        )));
    }
    if low_weight >= high_weight {
        return Err(FloodError::Config(format!(
            "sweep low weight {low_weight} must be below high weight {high_weight}"
        )));
    }
    if max_evaluations < 2 {
        return Err(FloodError::Config(
            "sweep needs at least two evaluations".into(),
        ));
    }

    let (low, high) = rayon::join(
        || solve_at(grid, config, low_weight),
        || solve_at(grid, config, high_weight),
    );
    let mut points = vec![low?, high?];
    let mut evaluations = 2;
    let mut truncated = false;

    let mut queue: Vec<f64> = breakpoint(&points[0], &points[1]).into_iter().collect();
    while let Some(lambda) = queue.pop() {
        if points
            .iter()
            .any(|p| (p.building_weight - lambda).abs() <= WEIGHT_EPSILON)
        {
            continue;
        }
        if evaluations >= max_evaluations {
            warn!(
                max_evaluations,
                pending = queue.len() + 1,
                "building-weight sweep stopped at evaluation limit"
            );
            truncated = true;
            break;
        }

        let point = solve_at(grid, config, lambda)?;
        evaluations += 1;
        let index = points.partition_point(|p| p.building_weight < lambda);
        points.insert(index, point);

        // breakpoints always fall strictly inside an evaluated interval
        let (Some(lower), Some(higher)) = (
            index.checked_sub(1).and_then(|i| points.get(i)),
            points.get(index + 1),
        ) else {
            continue;
        };
        let probe = &points[index];
        let flooded = probe.solution.flooded_count();
        debug!(
            lambda,
            flooded,
            sandbags = probe.solution.sandbags_needed,
            "sweep probe"
        );
        if flooded != lower.solution.flooded_count() && flooded != higher.solution.flooded_count()
        {
            queue.extend(breakpoint(lower, probe));
            queue.extend(breakpoint(probe, higher));
        }
    }

    let mut counts: Vec<usize> = points.iter().map(|p| p.solution.flooded_count()).collect();
    counts.dedup();
    info!(
        evaluations,
        distinct_flooded = counts.len(),
        truncated,
        "building-weight sweep finished"
    );
    Ok(SweepResult {
        points,
        evaluations,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(weight: f64, flooded: usize, sandbags: f64) -> SweepPoint {
        let mut solution = ProtectionSolution::empty(&FloodConfig::default());
        solution.flooded_buildings = (1..=flooded as u64).collect();
        solution.sandbags_needed = sandbags;
        SweepPoint {
            building_weight: weight,
            solution,
        }
    }

    #[test]
    fn test_breakpoint_formula() {
        let lo = point(1.0, 2, 0.0);
        let hi = point(10.0, 0, 7.0);
        assert_eq!(breakpoint(&lo, &hi), Some(3.5));
    }

    #[test]
    fn test_breakpoint_requires_different_counts() {
        let lo = point(1.0, 1, 0.0);
        let hi = point(10.0, 1, 7.0);
        assert_eq!(breakpoint(&lo, &hi), None);
    }

    #[test]
    fn test_breakpoint_outside_interval_ignored() {
        let lo = point(1.0, 2, 0.0);
        let hi = point(2.0, 0, 7.0);
        assert_eq!(breakpoint(&lo, &hi), None);
    }

    #[test]
    fn test_invalid_options() {
        let grid = RasterGrid::flat(2, 2, 0.0).unwrap();
        let config = FloodConfig::default();
        let reversed = SweepOptions {
            low_weight: 5.0,
            high_weight: 1.0,
            ..SweepOptions::default()
        };
        assert!(matches!(
            building_weight_sweep(&grid, &config, &reversed),
            Err(FloodError::Config(_))
        ));
        let tiny = SweepOptions {
            max_evaluations: 1,
            ..SweepOptions::default()
        };
        assert!(building_weight_sweep(&grid, &config, &tiny).is_err());
    }
}
