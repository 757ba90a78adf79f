use std::{env, path::Path, time::Instant};

use helio_cli::manifest::{record_manifest, ManifestTelemetry, Param, RunRecord};

/// CI variables copied into manifests next to every `HELIO_*` variable.
const CI_KEYS: [&str; 3] = ["GITHUB_RUN_ID", "GITHUB_WORKFLOW", "GITHUB_SHA"];

fn run_environment() -> Vec<Param> {
    let mut params: Vec<Param> = env::vars()
        .filter(|(name, _)| name.starts_with("HELIO_") || CI_KEYS.contains(&name.as_str()))
        .map(|(name, value)| Param { name, value })
        .collect();
    params.sort_by(|a, b| a.name.cmp(&b.name));
    params
}

/// Record a manifest for a finished command. A manifest that cannot be
/// written is reported on stderr and does not change the command's outcome.
pub fn record_run_timed<T>(dir: &Path, run: &RunRecord<'_>, start: Instant, result: &anyhow::Result<T>) {
    let status = match result {
        Ok(_) => "success",
        Err(_) => "failure",
    };
    let telemetry = ManifestTelemetry {
        status: status.to_string(),
        duration_ms: Some(start.elapsed().as_millis()),
        env: run_environment(),
        correlation_id: env::var("HELIO_CORRELATION_ID")
            .or_else(|_| env::var("GITHUB_RUN_ID"))
            .ok(),
    };
    if let Err(err) = record_manifest(dir, run, telemetry) {
        eprintln!("Failed to record run manifest: {err:#}");
    }
}
