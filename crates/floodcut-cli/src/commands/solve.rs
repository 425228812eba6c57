use anyhow::{Context, Result};
use floodcut_algo::compute_min_cut_solution;
use floodcut_cli::cli::PlanArgs;
use floodcut_io::{write_solution_json, write_solution_text};
use std::path::Path;

use crate::commands::util::{join_ids, load_config, load_planning_grid};

pub fn handle(plan: &PlanArgs, out: Option<&Path>, json: Option<&Path>) -> Result<()> {
    let config = load_config(plan)?;
    let (grid, _) = load_planning_grid(plan, &config)?;

    let solution =
        compute_min_cut_solution(&grid, &config).context("computing min-cut solution")?;

    print!("{}", solution.summary());
    println!("Cut Cells: {}", join_ids(&solution.cut_cells));

    if let Some(path) = out {
        write_solution_text(&solution, path)
            .with_context(|| format!("writing report {}", path.display()))?;
        println!("Wrote report to {}", path.display());
    }
    if let Some(path) = json {
        write_solution_json(&solution, path)
            .with_context(|| format!("writing solution {}", path.display()))?;
        println!("Wrote solution JSON to {}", path.display());
    }
    Ok(())
}
