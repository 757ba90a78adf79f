use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use clap_complete::{generate, Shell};
use helio_cli::cli::build_cli_command;
use tracing::info;

/// Print the completion script for `shell`, or write it to `out`.
pub fn handle(shell: Shell, out: Option<&Path>) -> Result<()> {
    let mut cmd = build_cli_command();
    let bin = cmd.get_name().to_string();
    let Some(path) = out else {
        generate(shell, &mut cmd, bin, &mut io::stdout());
        return Ok(());
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file =
        fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    generate(shell, &mut cmd, bin, &mut file);
    info!(%shell, path = %path.display(), "completion script written");
    Ok(())
}
