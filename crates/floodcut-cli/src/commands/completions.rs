//! Shell completion scripts.

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use floodcut_cli::cli::build_cli_command;
use std::{fs, io, path::Path};
use tracing::info;

const BIN_NAME: &str = "floodcut";

pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            let mut file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            generate(shell, &mut cmd, BIN_NAME, &mut file);
            info!(%shell, path = %path.display(), "completion script written");
        }
        None => generate(shell, &mut cmd, BIN_NAME, &mut io::stdout()),
    }
    Ok(())
}
