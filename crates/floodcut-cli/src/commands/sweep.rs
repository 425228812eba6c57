use anyhow::{Context, Result};
use floodcut_algo::{building_weight_sweep, SweepOptions};
use floodcut_cli::cli::PlanArgs;
use floodcut_io::{write_json, write_sweep_reports};
use std::io::{self, Write};
use std::path::Path;
use tabwriter::TabWriter;

use crate::commands::util::{load_config, load_planning_grid};

pub fn handle(
    plan: &PlanArgs,
    low: f64,
    high: f64,
    max_evaluations: usize,
    out_dir: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    let config = load_config(plan)?;
    let (grid, _) = load_planning_grid(plan, &config)?;
    let options = SweepOptions {
        low_weight: low,
        high_weight: high,
        max_evaluations,
    };

    let result =
        building_weight_sweep(&grid, &config, &options).context("running building-weight sweep")?;

    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "WEIGHT\tFLOODED\tSANDBAGS\tCUT CELLS\tSOLVE TIME")?;
    for point in &result.points {
        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{}\t{:.2?}",
            point.building_weight,
            point.solution.flooded_count(),
            point.solution.sandbags_needed,
            point.solution.cut_cells.len(),
            point.solution.solve_time
        )?;
    }
    writer.flush()?;
    println!("Evaluations: {}", result.evaluations);
    if result.truncated {
        println!("Stopped at the evaluation limit of {max_evaluations}");
    }

    if let Some(dir) = out_dir {
        let written = write_sweep_reports(&result, dir)
            .with_context(|| format!("writing reports into {}", dir.display()))?;
        println!("Wrote {} reports to {}", written.len(), dir.display());
    }
    if let Some(path) = json {
        write_json(&result, path)
            .with_context(|| format!("writing sweep result {}", path.display()))?;
        println!("Wrote sweep JSON to {}", path.display());
    }
    Ok(())
}
