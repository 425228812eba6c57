//! # floodcut-algo: Flood Barrier Planning as a Minimum Cut
//!
//! Given a raster grid with elevation, river and building layers, decide
//! where to build barriers and which buildings to give up so that total cost
//! is minimal.
//!
//! ## Pipeline
//!
//! ```text
//! RasterGrid ──region──> +river_border +relevant
//!            ──network──> FlowNetwork (split cells, building sinks)
//!            ──mincut───> MinCut (flow value, source-side partition)
//!            ──solution─> ProtectionSolution (cut cells, flooded buildings)
//! ```
//!
//! ## Quick start
//!
//! ```ignore
//! use floodcut_algo::plan_protection;
//! use floodcut_core::FloodConfig;
//!
//! let config = FloodConfig::new(380.0, 2.5).with_building_weight(10.0);
//! let (region, solution) = plan_protection(&mut grid, &config)?;
//! println!("{}", solution.summary());
//! ```
//!
//! ## Modules
//!
//! - [`region`] - river border and relevance propagation
//! - [`network`] - node-split flow network construction
//! - [`mincut`] - [`MinCutSolver`] trait, Dinic and MIP backends
//! - [`solution`] - decoding a cut into a [`ProtectionSolution`]
//! - [`pipeline`] - one-call build, solve, decode
//! - [`sweep`] - building-weight trade-off search

pub mod mincut;
pub mod network;
pub mod pipeline;
pub mod region;
pub mod solution;
pub mod sweep;

pub use mincut::{solver_for, DinicSolver, MinCut, MinCutSolver, MipMinCutSolver};
pub use network::{barrier_capacity_sum, barrier_cost, build_flow_network, FlowNetworkBuilder};
pub use pipeline::{compute_min_cut_solution, compute_with_solver, plan_protection};
pub use region::{
    compute_relevant, compute_river_border, relevance_mask, river_border_mask, select_region,
    RegionSummary,
};
pub use solution::{interpret, ProtectionSolution};
pub use sweep::{building_weight_sweep, SweepOptions, SweepPoint, SweepResult};
