use anyhow::{Context, Result};
use floodcut_cli::cli::PlanArgs;
use std::path::Path;

use crate::commands::util::{load_config, load_planning_grid};

pub fn handle(plan: &PlanArgs, out: Option<&Path>) -> Result<()> {
    let config = load_config(plan)?;
    let (grid, region) = load_planning_grid(plan, &config)?;

    println!("Region for {}:", plan.grid.display());
    println!("  Grid          : {} x {}", grid.rows(), grid.cols());
    println!("  Critical elev.: {:.2}", config.critical_elevation());
    match region {
        Some(region) => {
            println!("  River cells   : {}", region.river_cells);
            println!("  Border cells  : {}", region.border_cells);
            println!("  Relevant cells: {}", region.relevant_cells);
            println!("  Worklist pops : {}", region.visits);
        }
        None => println!("  Relevant cells: {} (stored)", grid.relevant_count()),
    }

    if let Some(path) = out {
        floodcut_io::save_grid_json(&grid, path)
            .with_context(|| format!("writing annotated grid {}", path.display()))?;
        println!("Wrote annotated grid to {}", path.display());
    }
    Ok(())
}
