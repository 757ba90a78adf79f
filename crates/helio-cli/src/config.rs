//! `helio.toml`: run configuration.
//!
//! Every key is optional; omitted keys take the defaults of the Geneva
//! pipeline (Pronovo register, girec and commune layers under `data/raw/`,
//! 2005-2024 history, 1000 MWc in 2050, LV95 computation, WGS84 output).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use helio_algo::{PipelineSettings, PotentialSource, TabularFormat};
use helio_core::{Crs, HelioError, Horizon, MegawattsPeak};
use helio_io::{FieldNames, LayerPaths};
use helio_ts::HoltLinear;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HelioConfig {
    #[serde(default)]
    pub inputs: InputsConfig,
    #[serde(default)]
    pub fields: FieldNames,
    #[serde(default)]
    pub horizon: Horizon,
    #[serde(default)]
    pub growth: GrowthConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Source files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    #[serde(default = "default_installations")]
    pub installations: PathBuf,
    #[serde(default = "default_districts")]
    pub districts: PathBuf,
    #[serde(default = "default_communes")]
    pub communes: PathBuf,
    /// Per-district potential table; set to `""` to run without one.
    #[serde(default = "default_potential")]
    pub potential: PathBuf,
    #[serde(default = "default_potential_key")]
    pub potential_key: String,
    #[serde(default = "default_potential_value")]
    pub potential_value: String,
    /// CRS of layers without a `crs` member.
    #[serde(default = "default_input_crs")]
    pub crs: String,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            installations: default_installations(),
            districts: default_districts(),
            communes: default_communes(),
            potential: default_potential(),
            potential_key: default_potential_key(),
            potential_value: default_potential_value(),
            crs: default_input_crs(),
        }
    }
}

fn default_installations() -> PathBuf {
    PathBuf::from("data/raw/pronovo.geojson")
}

fn default_districts() -> PathBuf {
    PathBuf::from("data/raw/girec.geojson")
}

fn default_communes() -> PathBuf {
    PathBuf::from("data/raw/communes.geojson")
}

fn default_potential() -> PathBuf {
    PathBuf::from("data/qbuildings/girec_potential.csv")
}

fn default_potential_key() -> String {
    "district".to_string()
}

fn default_potential_value() -> String {
    "pv_potential".to_string()
}

fn default_input_crs() -> String {
    "EPSG:2056".to_string()
}

/// Forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Total installed capacity reached in the final year by the exponential model, MWc.
    #[serde(default = "default_target")]
    pub target_mwc: f64,
    /// Iteration cap of the Holt parameter search.
    #[serde(default = "default_max_iters")]
    pub max_iters: u64,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            target_mwc: default_target(),
            max_iters: default_max_iters(),
        }
    }
}

fn default_target() -> f64 {
    1000.0
}

fn default_max_iters() -> u64 {
    HoltLinear::default().max_iters
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Decimal places kept in published values.
    #[serde(default = "default_precision")]
    pub precision: u32,
    #[serde(default = "default_compute_crs")]
    pub compute_crs: String,
    #[serde(default = "default_display_crs")]
    pub display_crs: String,
    /// Also write each table without geometry (`csv` or `parquet`).
    #[serde(default)]
    pub tabular: Option<TabularFormat>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            precision: default_precision(),
            compute_crs: default_compute_crs(),
            display_crs: default_display_crs(),
            tabular: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_precision() -> u32 {
    2
}

fn default_compute_crs() -> String {
    "EPSG:2056".to_string()
}

fn default_display_crs() -> String {
    "EPSG:4326".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default)]
    pub level: Option<String>,
}

/// Read `path`, or return the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<HelioConfig> {
    let Some(path) = path else {
        return Ok(HelioConfig::default());
    };
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let config: HelioConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

impl HelioConfig {
    pub fn log_level(&self) -> Result<Option<tracing::Level>> {
        let Some(level) = self.logging.level.as_deref() else {
            return Ok(None);
        };
        let parsed = level
            .parse::<tracing::Level>()
            .map_err(|_| HelioError::Config(format!("unknown log level '{level}'")))?;
        Ok(Some(parsed))
    }

    /// Resolve into pipeline settings; `output_dir` overrides the configured one.
    pub fn to_settings(&self, output_dir: Option<&Path>) -> Result<PipelineSettings> {
        self.horizon.validate()?;
        if !(self.growth.target_mwc.is_finite() && self.growth.target_mwc > 0.0) {
            return Err(HelioError::Config(format!(
                "growth.target_mwc must be positive, got {}",
                self.growth.target_mwc
            ))
            .into());
        }
        if self.export.precision > 12 {
            return Err(HelioError::Config(format!(
                "export.precision {} is above 12 decimals",
                self.export.precision
            ))
            .into());
        }

        let potential = (!self.inputs.potential.as_os_str().is_empty()).then(|| PotentialSource {
            path: self.inputs.potential.clone(),
            key_column: self.inputs.potential_key.clone(),
            value_column: self.inputs.potential_value.clone(),
        });

        Ok(PipelineSettings {
            layers: LayerPaths {
                installations: self.inputs.installations.clone(),
                districts: self.inputs.districts.clone(),
                communes: self.inputs.communes.clone(),
            },
            potential,
            fields: self.fields.clone(),
            horizon: self.horizon,
            target: MegawattsPeak(self.growth.target_mwc),
            input_crs: Crs::parse(&self.inputs.crs).context("inputs.crs")?,
            compute_crs: Crs::parse(&self.export.compute_crs).context("export.compute_crs")?,
            display_crs: Crs::parse(&self.export.display_crs).context("export.display_crs")?,
            precision: self.export.precision,
            output_dir: output_dir
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.export.output_dir.clone()),
            tabular: self.export.tabular,
            holt: HoltLinear {
                max_iters: self.growth.max_iters,
                ..HoltLinear::default()
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_file_gives_defaults() {
        let config: HelioConfig = toml::from_str("").unwrap();
        let settings = config.to_settings(None).unwrap();
        assert_eq!(settings.horizon, Horizon::default());
        assert_eq!(settings.target, MegawattsPeak(1000.0));
        assert_eq!(settings.compute_crs, Crs::Lv95);
        assert_eq!(settings.display_crs, Crs::Wgs84);
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.fields.power, "TotalPower");
        assert!(settings.potential.is_some());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("helio.toml");
        fs::write(
            &path,
            r#"
[inputs]
potential = ""

[horizon]
final_year = 2040

[growth]
target_mwc = 600.0

[export]
tabular = "parquet"
precision = 3

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.log_level().unwrap(), Some(tracing::Level::DEBUG));
        let settings = config.to_settings(Some(Path::new("elsewhere"))).unwrap();
        assert!(settings.potential.is_none());
        assert_eq!(settings.horizon.final_year, 2040);
        assert_eq!(settings.horizon.base_year, 2024);
        assert_eq!(settings.target, MegawattsPeak(600.0));
        assert_eq!(settings.tabular, Some(TabularFormat::Parquet));
        assert_eq!(settings.precision, 3);
        assert_eq!(settings.output_dir, PathBuf::from("elsewhere"));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        let bad_target: HelioConfig = toml::from_str("[growth]\ntarget_mwc = 0.0").unwrap();
        assert!(bad_target.to_settings(None).is_err());

        let bad_crs: HelioConfig = toml::from_str("[export]\ndisplay_crs = \"EPSG:3857\"").unwrap();
        assert!(bad_crs.to_settings(None).is_err());

        let bad_horizon: HelioConfig =
            toml::from_str("[horizon]\nfirst_year = 2024\nbase_year = 2020").unwrap();
        assert!(bad_horizon.to_settings(None).is_err());

        let bad_level: HelioConfig = toml::from_str("[logging]\nlevel = \"loud\"").unwrap();
        assert!(bad_level.log_level().is_err());
    }
}
