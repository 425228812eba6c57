use anyhow::{bail, Context, Result};
use floodcut_algo::{select_region, RegionSummary};
use floodcut_cli::cli::PlanArgs;
use floodcut_core::{FloodConfig, RasterGrid};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

pub fn configure_threads(spec: &str) {
    let count = if spec.eq_ignore_ascii_case("auto") {
        num_cpus::get()
    } else {
        spec.parse().unwrap_or_else(|_| num_cpus::get())
    };
    let _ = ThreadPoolBuilder::new().num_threads(count).build_global();
}

/// Config file (or defaults) with command-line overrides applied.
pub fn load_config(plan: &PlanArgs) -> Result<FloodConfig> {
    let mut config = match &plan.config {
        Some(path) => FloodConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => FloodConfig::default(),
    };
    if let Some(v) = plan.river_height {
        config.river_height = v;
    }
    if let Some(v) = plan.elevation_threshold {
        config.elevation_threshold = v;
    }
    if let Some(v) = plan.water_height {
        config.water_height = Some(v);
    }
    if let Some(v) = plan.building_weight {
        config.building_weight = v;
    }
    if let Some(v) = plan.scaling_factor {
        config.scaling_factor = v;
    }
    if let Some(order) = plan.worklist {
        config.worklist = order.into();
    }
    if let Some(solver) = plan.solver {
        config.solver = solver;
    }
    config.validate().context("validating configuration")?;
    debug!(?config, "configuration resolved");
    Ok(config)
}

/// Load the grid and make sure it carries region masks.
///
/// Returns the region summary when selection ran.
pub fn load_planning_grid(
    plan: &PlanArgs,
    config: &FloodConfig,
) -> Result<(RasterGrid, Option<RegionSummary>)> {
    let mut grid = floodcut_io::load_grid(&plan.grid)
        .with_context(|| format!("loading grid {}", plan.grid.display()))?;
    info!(
        rows = grid.rows(),
        cols = grid.cols(),
        path = %plan.grid.display(),
        "grid loaded"
    );

    if plan.reuse_masks {
        if grid.river_border().is_none() || grid.relevant().is_none() {
            bail!(
                "--reuse-masks requires river_border and relevant in {}",
                plan.grid.display()
            );
        }
        return Ok((grid, None));
    }

    let region = select_region(&mut grid, config).context("selecting relevant region")?;
    Ok((grid, Some(region)))
}

pub fn join_ids<T: ToString>(ids: &[T]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
