use anyhow::{Context, Result};
use floodcut_algo::FlowNetworkBuilder;
use floodcut_cli::cli::NetworkCommands;
use floodcut_core::network_stats;
use std::io::{self, Write};
use tabwriter::TabWriter;

use crate::commands::util::{load_config, load_planning_grid};

pub fn handle(command: &NetworkCommands) -> Result<()> {
    match command {
        NetworkCommands::Stats {
            plan,
            redundant_border_arcs,
        } => {
            let config = load_config(plan)?;
            let (grid, _) = load_planning_grid(plan, &config)?;
            let network = FlowNetworkBuilder::new(&grid, &config)
                .with_redundant_border_arcs(*redundant_border_arcs)
                .build()
                .context("building flow network")?;
            let stats = network_stats(&network);

            println!("Flow network for {}:", plan.grid.display());
            println!("  Nodes          : {}", stats.node_count);
            println!("  Arcs           : {}", stats.arc_count);
            println!("  Avg out-degree : {:.2}", stats.avg_out_degree);
            println!("  Finite capacity: {}", stats.finite_capacity_total);
            println!("  Infinity       : {}", stats.infinity);

            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "CATEGORY\tNODES")?;
            for (category, count) in &stats.nodes_by_category {
                writeln!(writer, "{}\t{}", category.as_str(), count)?;
            }
            writeln!(writer, "ARC KIND\tARCS")?;
            writeln!(writer, "barrier\t{}", stats.barrier_arcs)?;
            writeln!(writer, "sacrifice\t{}", stats.sacrifice_arcs)?;
            writeln!(writer, "unbounded\t{}", stats.unbounded_arcs)?;
            writer.flush()?;
            Ok(())
        }
    }
}
