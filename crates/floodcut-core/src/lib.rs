//! # floodcut-core: Grid and Flow-Network Model for Flood Barrier Planning
//!
//! Provides the data structures shared by the planning pipeline:
//!
//! - [`RasterGrid`] - row-major raster with elevation, river-membership and
//!   building-id layers plus the derived `river_border` / `relevant` masks
//! - [`FloodConfig`] - explicit planning parameters (water level, sacrifice
//!   price, capacity scaling, worklist order, solver backend)
//! - [`FlowNetwork`] - petgraph `DiGraph<NodeKind, FlowArc>` with source,
//!   sink and the cell/building bookkeeping needed to decode a cut
//! - [`FloodError`] - unified error type
//!
//! ## Node splitting
//!
//! Barrier placement is a minimum *vertex* cut: each ordinary cell has a
//! price (how far it must be raised above the flood). The network turns that
//! into a minimum *edge* cut by splitting each priced cell into an `in` and
//! an `out` node joined by one finite arc; every other arc carries an
//! "infinite" sentinel so the cut can only cross priced arcs.
//!
//! ```text
//!   source ══> river border ══> [in ─cost─> out] ══> ... ══> building ══> building sink ─price─> sink
//! ```
//!
//! ## Modules
//!
//! - [`grid`] - raster layers and neighbourhoods
//! - [`config`] - planning parameters, TOML loading
//! - [`network`] - flow-network node/arc types and invariants
//! - [`stats`] - network statistics for reporting

pub mod config;
pub mod error;
pub mod grid;
pub mod network;
pub mod stats;

pub use config::{FloodConfig, SolverKind, WorklistOrder, INFINITY_MULTIPLIER};
pub use error::{FloodError, FloodResult};
pub use grid::{BuildingId, RasterGrid, NO_BUILDING};
pub use network::{
    ArcKind, Capacity, CellNodes, CellRole, FlowArc, FlowNetwork, FlowNetworkParts, NodeCategory,
    NodeKind,
};
pub use petgraph::graph::NodeIndex;
pub use stats::{network_stats, NetworkStats};
