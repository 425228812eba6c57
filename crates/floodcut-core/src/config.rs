//! Planning parameters passed explicitly through every stage.
//!
//! A [`FloodConfig`] fully describes one invocation (water level, sacrifice
//! price, capacity precision, worklist order and solver backend), so a
//! parametric sweep simply clones and tweaks it per probe.

use crate::error::{FloodError, FloodResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Multiplier applied to the scaling factor to derive the "infinite" capacity.
pub const INFINITY_MULTIPLIER: f64 = 1e9;

/// Order in which the relevance worklist is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorklistOrder {
    /// Breadth-first from the river border
    #[default]
    Fifo,
    /// Depth-first from the most recently discovered cell
    Lifo,
}

/// Min-cut backend used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    /// Dinic max-flow, source-side residual reachability cut
    #[default]
    Dinic,
    /// Binary program over the same network (good_lp)
    Mip,
}

impl SolverKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Dinic => "dinic",
            SolverKind::Mip => "mip",
        }
    }
}

impl std::str::FromStr for SolverKind {
    type Err = FloodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dinic" | "maxflow" => Ok(SolverKind::Dinic),
            "mip" | "ilp" => Ok(SolverKind::Mip),
            other => Err(FloodError::Config(format!("unknown solver '{other}'"))),
        }
    }
}

/// Flood protection planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    /// River water level
    pub river_height: f64,
    /// Flood rise above the river level used for relevance propagation
    pub elevation_threshold: f64,
    /// Flood level for barrier capacities; defaults to `river_height + elevation_threshold`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_height: Option<f64>,
    /// Cost of sacrificing one building, in elevation units
    pub building_weight: f64,
    /// Float to integer capacity scale
    pub scaling_factor: f64,
    pub worklist: WorklistOrder,
    pub solver: SolverKind,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self {
            river_height: 0.0,
            elevation_threshold: 1.0,
            water_height: None,
            building_weight: 1.0,
            scaling_factor: 1e6,
            worklist: WorklistOrder::Fifo,
            solver: SolverKind::Dinic,
        }
    }
}

impl FloodConfig {
    pub fn new(river_height: f64, elevation_threshold: f64) -> Self {
        Self {
            river_height,
            elevation_threshold,
            ..Self::default()
        }
    }

    pub fn with_water_height(mut self, water_height: f64) -> Self {
        self.water_height = Some(water_height);
        self
    }

    pub fn with_building_weight(mut self, building_weight: f64) -> Self {
        self.building_weight = building_weight;
        self
    }

    pub fn with_scaling_factor(mut self, scaling_factor: f64) -> Self {
        self.scaling_factor = scaling_factor;
        self
    }

    pub fn with_worklist(mut self, worklist: WorklistOrder) -> Self {
        self.worklist = worklist;
        self
    }

    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Elevation above which flood water does not propagate.
    pub fn critical_elevation(&self) -> f64 {
        self.river_height + self.elevation_threshold
    }

    /// Flood level used for barrier costs.
    pub fn effective_water_height(&self) -> f64 {
        self.water_height.unwrap_or_else(|| self.critical_elevation())
    }

    /// Scale a non-negative cost to an integer capacity, truncating.
    pub fn scale(&self, value: f64) -> i64 {
        (value * self.scaling_factor) as i64
    }

    /// Capacity of the per-building sacrifice arc.
    pub fn sacrifice_capacity(&self) -> i64 {
        self.scale(self.building_weight)
    }

    /// The "infinite" sentinel capacity, `1e9 * scaling_factor`.
    pub fn infinity_capacity(&self) -> FloodResult<i64> {
        let value = INFINITY_MULTIPLIER * self.scaling_factor;
        if !(value.is_finite() && value < i64::MAX as f64) {
            return Err(FloodError::CapacityOverflowRisk {
                infinity: i64::MAX,
                finite_total: i64::MAX,
            });
        }
        Ok(value as i64)
    }

    /// Reject parameters that cannot produce a meaningful network.
    pub fn validate(&self) -> FloodResult<()> {
        let finite = [
            ("river_height", self.river_height),
            ("elevation_threshold", self.elevation_threshold),
            ("water_height", self.effective_water_height()),
            ("building_weight", self.building_weight),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(FloodError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.building_weight < 0.0 {
            return Err(FloodError::Config(format!(
                "building_weight must be non-negative, got {}",
                self.building_weight
            )));
        }
        if !(self.scaling_factor.is_finite() && self.scaling_factor > 0.0) {
            return Err(FloodError::Config(format!(
                "scaling_factor must be positive, got {}",
                self.scaling_factor
            )));
        }
        self.infinity_capacity()?;
        Ok(())
    }

    pub fn from_toml_str(text: &str) -> FloodResult<Self> {
        let config: FloodConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> FloodResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
