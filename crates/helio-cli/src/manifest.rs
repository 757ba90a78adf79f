use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub run_id: String,
    pub command: String,
    pub version: String,
    pub timestamp: String,
    pub outputs: Vec<String>,
    pub params: Vec<Param>,
    #[serde(default)]
    pub telemetry: Option<ManifestTelemetry>,
    /// Command-specific results, e.g. the pipeline report.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestTelemetry {
    pub status: String,
    pub duration_ms: Option<u128>,
    pub env: Vec<Param>,
    pub correlation_id: Option<String>,
}

/// What a command ran with and produced.
pub struct RunRecord<'a> {
    pub command: &'a str,
    pub params: &'a [(&'a str, &'a str)],
    pub outputs: &'a [PathBuf],
    pub details: Option<serde_json::Value>,
}

/// Write `run-<uuid>.json` into `dir` and return its path.
pub fn record_manifest(dir: &Path, run: &RunRecord<'_>, telemetry: ManifestTelemetry) -> Result<PathBuf> {
    let run_id = Uuid::new_v4().to_string();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let manifest = ManifestEntry {
        run_id: run_id.clone(),
        command: run.command.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        outputs: run.outputs.iter().map(|p| p.display().to_string()).collect(),
        params: run
            .params
            .iter()
            .map(|(k, v)| Param {
                name: k.to_string(),
                value: v.to_string(),
            })
            .collect(),
        telemetry: Some(telemetry),
        details: run.details.clone(),
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    let path = dir.join(format!("run-{}.json", run_id));
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    println!("Recorded run manifest {}", path.display());
    Ok(path)
}

pub fn read_manifest(path: &Path) -> Result<ManifestEntry> {
    let json = fs::read_to_string(path)?;
    let manifest = serde_json::from_str(&json)?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn manifest_round_trips() {
        let dir = tempdir().unwrap();
        let outputs = vec![dir.path().join("girec_lin.geojson")];
        let run = RunRecord {
            command: "process",
            params: &[("config", "helio.toml")],
            outputs: &outputs,
            details: Some(serde_json::json!({"final_year": 2050})),
        };
        let telemetry = ManifestTelemetry {
            status: "success".into(),
            duration_ms: Some(12),
            env: vec![],
            correlation_id: None,
        };
        let path = record_manifest(dir.path(), &run, telemetry).unwrap();
        let manifest = read_manifest(&path).unwrap();
        assert_eq!(manifest.command, "process");
        assert_eq!(manifest.params[0].value, "helio.toml");
        assert_eq!(manifest.outputs.len(), 1);
        assert_eq!(manifest.telemetry.unwrap().status, "success");
        assert_eq!(manifest.details.unwrap()["final_year"], 2050);
    }
}
