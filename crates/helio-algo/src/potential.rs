//! Rooftop solar potential per district.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use helio_core::{HelioError, Region, SquareMeters};
use helio_io::{read_frame, write_frame};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const DISTRICT_COLUMN: &str = "district";
pub const AREA_COLUMN: &str = "area_roof_solar_m2";
pub const POTENTIAL_COLUMN: &str = "pv_potential";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoofPotentialOptions {
    /// District key column in the building table.
    #[serde(default = "default_key_column")]
    pub key_column: String,
    /// Usable roof area column, square metres.
    #[serde(default = "default_area_column")]
    pub area_column: String,
    /// Peak power per square metre of usable roof, kWc.
    #[serde(default = "default_kw_per_m2")]
    pub kw_per_m2: f64,
}

fn default_key_column() -> String {
    "geo_girec".to_string()
}

fn default_area_column() -> String {
    AREA_COLUMN.to_string()
}

fn default_kw_per_m2() -> f64 {
    0.2
}

impl Default for RoofPotentialOptions {
    fn default() -> Self {
        Self {
            key_column: default_key_column(),
            area_column: default_area_column(),
            kw_per_m2: default_kw_per_m2(),
        }
    }
}

/// Sum roof area per district and convert it to a peak power potential in
/// MWc. Produces `district`, `area_roof_solar_m2`, `pv_potential`, sorted by
/// district.
pub fn derive_potential(buildings: DataFrame, options: &RoofPotentialOptions) -> Result<DataFrame> {
    if !(options.kw_per_m2.is_finite() && options.kw_per_m2 > 0.0) {
        return Err(HelioError::Validation(format!(
            "kW per square metre must be positive, got {}",
            options.kw_per_m2
        ))
        .into());
    }

    let mut grouped = buildings
        .lazy()
        .select([
            col(&options.key_column)
                .cast(DataType::Utf8)
                .alias(DISTRICT_COLUMN),
            col(&options.area_column)
                .cast(DataType::Float64)
                .fill_null(lit(0.0))
                .alias(AREA_COLUMN),
        ])
        .filter(col(DISTRICT_COLUMN).is_not_null())
        .group_by([col(DISTRICT_COLUMN)])
        .agg([col(AREA_COLUMN).sum()])
        .sort(DISTRICT_COLUMN, SortOptions::default())
        .collect()
        .context("aggregating roof area per district")?;

    let potential: Vec<f64> = grouped
        .column(AREA_COLUMN)?
        .f64()?
        .into_iter()
        .map(|area| {
            SquareMeters::new(area.unwrap_or(0.0))
                .peak_power(options.kw_per_m2)
                .to_megawatts()
                .value()
        })
        .collect();
    grouped
        .with_column(Series::new(POTENTIAL_COLUMN, potential))
        .context("adding potential column")?;

    debug!(districts = grouped.height(), "roof potential derived");
    Ok(grouped)
}

/// Read a building table, derive per-district potential and write it out.
pub fn derive_potential_file(input: &Path, output: &Path, options: &RoofPotentialOptions) -> Result<usize> {
    let buildings = read_frame(input)?;
    let mut df = derive_potential(buildings, options)
        .with_context(|| format!("deriving potential from {}", input.display()))?;
    write_frame(&mut df, output)?;
    info!(
        districts = df.height(),
        output = %output.display(),
        "potential table written"
    );
    Ok(df.height())
}

/// Set each region's potential from a name-keyed table. Regions without a
/// row get zero. Returns how many regions were matched.
pub fn attach_potential(regions: &mut [Region], potentials: &BTreeMap<String, f64>) -> usize {
    let mut matched = 0;
    for region in regions.iter_mut() {
        match potentials.get(&region.name) {
            Some(value) if value.is_finite() => {
                region.potential = *value;
                matched += 1;
            }
            _ => region.potential = 0.0,
        }
    }
    if matched < regions.len() {
        warn!(
            missing = regions.len() - matched,
            "districts without a potential row default to zero"
        );
    }
    matched
}
