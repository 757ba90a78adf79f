use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use helio_algo::{derive_potential_file, RoofPotentialOptions};
use helio_cli::manifest::RunRecord;

use crate::commands::telemetry::record_run_timed;
use crate::commands::util::manifest_dir;

pub fn handle(roofs: &Path, out: &Path, options: &RoofPotentialOptions) -> Result<()> {
    let start = Instant::now();
    let result = derive_potential_file(roofs, out, options);

    let roofs_param = roofs.display().to_string();
    let out_param = out.display().to_string();
    let factor_param = options.kw_per_m2.to_string();
    let outputs = if result.is_ok() {
        vec![out.to_path_buf()]
    } else {
        Vec::new()
    };
    record_run_timed(
        manifest_dir(out),
        &RunRecord {
            command: "potential",
            params: &[
                ("roofs", roofs_param.as_str()),
                ("out", out_param.as_str()),
                ("key", options.key_column.as_str()),
                ("area", options.area_column.as_str()),
                ("kwc_per_m2", factor_param.as_str()),
            ],
            outputs: &outputs,
            details: None,
        },
        start,
        &result,
    );

    let districts = result?;
    println!("Wrote potential for {districts} districts to {}", out.display());
    Ok(())
}
