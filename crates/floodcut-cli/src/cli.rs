use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use clap_complete::Shell;
use floodcut_core::{SolverKind, WorklistOrder};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Flood barrier planning on raster grids", long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the river border and relevant cells
    Region {
        #[command(flatten)]
        plan: PlanArgs,
        /// Write the annotated grid as a JSON document
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    /// Solve for barrier cells and flooded buildings
    Solve {
        #[command(flatten)]
        plan: PlanArgs,
        /// Write the cut_cells/sandbags_needed/flooded_buildings text report
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
        /// Write the full solution as JSON
        #[arg(long, value_hint = ValueHint::FilePath)]
        json: Option<PathBuf>,
    },
    /// Sweep the building weight to trace the barrier/sacrifice trade-off
    Sweep {
        #[command(flatten)]
        plan: PlanArgs,
        /// Lowest building weight
        #[arg(long, default_value_t = 10.0)]
        low: f64,
        /// Highest building weight
        #[arg(long, default_value_t = 100.0)]
        high: f64,
        /// Maximum number of solves, endpoints included
        #[arg(long, default_value_t = 64)]
        max_evaluations: usize,
        /// Write one text report per evaluated weight into this directory
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
        /// Write the sweep result as JSON
        #[arg(long, value_hint = ValueHint::FilePath)]
        json: Option<PathBuf>,
        /// Worker threads ("auto" or a number)
        #[arg(long, default_value = "auto")]
        threads: String,
    },
    /// Flow network utilities
    Network {
        #[command(subcommand)]
        command: NetworkCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NetworkCommands {
    /// Node and arc counts of the flow network built for a grid
    Stats {
        #[command(flatten)]
        plan: PlanArgs,
        /// Re-add the duplicate river-border arcs before counting
        #[arg(long)]
        redundant_border_arcs: bool,
    },
}

/// Grid input plus planning parameters; flags override the config file.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Grid JSON document or directory of CSV layers
    #[arg(long, value_hint = ValueHint::AnyPath)]
    pub grid: PathBuf,
    /// TOML configuration file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub river_height: Option<f64>,
    #[arg(long)]
    pub elevation_threshold: Option<f64>,
    /// Flood level for barrier costs [default: river height + threshold]
    #[arg(long)]
    pub water_height: Option<f64>,
    #[arg(long)]
    pub building_weight: Option<f64>,
    #[arg(long)]
    pub scaling_factor: Option<f64>,
    #[arg(long, value_enum)]
    pub worklist: Option<WorklistArg>,
    /// Min-cut backend: dinic or mip
    #[arg(long)]
    pub solver: Option<SolverKind>,
    /// Use the river_border/relevant masks stored in the grid instead of recomputing
    #[arg(long)]
    pub reuse_masks: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum WorklistArg {
    Fifo,
    Lifo,
}

impl From<WorklistArg> for WorklistOrder {
    fn from(arg: WorklistArg) -> Self {
        match arg {
            WorklistArg::Fifo => WorklistOrder::Fifo,
            WorklistArg::Lifo => WorklistOrder::Lifo,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn test_parse_solve_overrides() {
        let cli = Cli::try_parse_from([
            "floodcut",
            "solve",
            "--grid",
            "grid.json",
            "--building-weight",
            "10",
            "--solver",
            "mip",
            "--worklist",
            "lifo",
        ])
        .unwrap();
        let Commands::Solve { plan, .. } = cli.command else {
            panic!("expected solve");
        };
        assert_eq!(plan.building_weight, Some(10.0));
        assert_eq!(plan.solver, Some(SolverKind::Mip));
        assert!(matches!(plan.worklist, Some(WorklistArg::Lifo)));
        assert!(!plan.reuse_masks);
    }
}
