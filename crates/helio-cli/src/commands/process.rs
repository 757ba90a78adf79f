use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use helio_algo::run_pipeline;
use helio_cli::config::load_config;
use helio_cli::manifest::RunRecord;
use tracing::info;

use crate::commands::telemetry::record_run_timed;

pub fn handle(config_path: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;
    let settings = config.to_settings(out)?;
    info!(
        output = %settings.output_dir.display(),
        target_mwc = settings.target.value(),
        "processing {}-{} history, forecasting to {}",
        settings.horizon.first_year,
        settings.horizon.base_year,
        settings.horizon.final_year
    );

    let result = run_pipeline(&settings);

    let config_param = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<defaults>".to_string());
    let output_param = settings.output_dir.display().to_string();
    let target_param = settings.target.value().to_string();
    let horizon_param = format!(
        "{}/{}/{}",
        settings.horizon.first_year, settings.horizon.base_year, settings.horizon.final_year
    );
    let outputs = result
        .as_ref()
        .map(|report| report.outputs.clone())
        .unwrap_or_default();
    let details = result
        .as_ref()
        .ok()
        .and_then(|report| serde_json::to_value(report).ok());
    record_run_timed(
        &settings.output_dir,
        &RunRecord {
            command: "process",
            params: &[
                ("config", config_param.as_str()),
                ("out", output_param.as_str()),
                ("target_mwc", target_param.as_str()),
                ("horizon", horizon_param.as_str()),
            ],
            outputs: &outputs,
            details,
        },
        start,
        &result,
    );

    let report = result?;
    println!(
        "Mapped {} of {} installations to {} districts ({} outside, {} undated)",
        report.join.num_mapped,
        report.join.num_installations,
        report.join.num_districts,
        report.join.num_unmapped,
        report.undated
    );
    println!(
        "Exponential growth {:.2} %/year from {:.2} MWc in {}",
        report.growth.annual_percent(),
        report.growth.base_total,
        report.growth.base_year
    );
    for (name, total) in &report.final_totals {
        println!("{name} {}: {total:.2} MWc", report.final_year);
    }
    println!("Wrote {} files to {}", report.outputs.len(), settings.output_dir.display());
    Ok(())
}
