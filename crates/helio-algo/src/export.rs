use std::path::{Path, PathBuf};

use anyhow::Result;
use helio_core::{Crs, RegionTable};
use helio_io::{region_table_frame, write_frame, write_region_table};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Flat companion format written next to each GeoJSON table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabularFormat {
    Csv,
    Parquet,
}

impl TabularFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Parquet => "parquet",
        }
    }
}

/// Round half to even, so `0.125` becomes `0.12` at two decimals.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Prepare a table for publication: non-finite values become zero, every
/// number is rounded to `decimals`, geometry moves to `display`.
pub fn finalize(table: &RegionTable, decimals: u32, display: Crs) -> RegionTable {
    let clean = |v: f64| if v.is_finite() { round_to(v, decimals) } else { 0.0 };
    let mut out = table.clone();
    for region in &mut out.regions {
        region.series.map_values(clean);
        region.potential = clean(region.potential);
        region.geometry = table.crs.transform_multipolygon(display, &region.geometry);
    }
    out.crs = display;
    out
}

/// Write a finished table as `<dir>/<name>.geojson`, plus a flat frame when
/// `tabular` is set. Returns the written paths.
pub fn write_outputs(
    table: &RegionTable,
    dir: &Path,
    tabular: Option<TabularFormat>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let geojson = dir.join(format!("{}.geojson", table.name()));
    write_region_table(table, &geojson)?;
    written.push(geojson);

    if let Some(format) = tabular {
        let path = dir.join(format!("{}.{}", table.name(), format.extension()));
        let mut df = region_table_frame(table)?;
        write_frame(&mut df, &path)?;
        written.push(path);
    }
    info!(table = %table.name(), regions = table.len(), "table exported");
    Ok(written)
}
