//! Flat (geometry-free) tables through polars.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use helio_core::{Granularity, RegionTable};
use polars::prelude::*;
#[cfg(feature = "parquet")]
use polars::prelude::{ParquetReader, ParquetWriter};

use crate::tables::POTENTIAL_PROPERTY;

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default()
}

/// Read a CSV or Parquet file into a DataFrame.
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let extension = extension_of(path);
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;

    match extension.as_str() {
        #[cfg(feature = "parquet")]
        "parquet" => {
            let reader = ParquetReader::new(&mut file);
            reader.finish().context("reading Parquet file")
        }
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        "csv" => {
            let reader = CsvReader::new(&mut file);
            reader.has_header(true).finish().context("reading CSV file")
        }
        _ => Err(anyhow!(
            "unsupported file extension '{}'; use .csv or .parquet",
            extension
        )),
    }
}

/// Write a DataFrame as CSV or Parquet depending on the extension of `path`.
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let extension = extension_of(path);
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    match extension.as_str() {
        #[cfg(feature = "parquet")]
        "parquet" => ParquetWriter::new(&mut file)
            .finish(df)
            .map(|_| ())
            .context("writing Parquet file"),
        #[cfg(not(feature = "parquet"))]
        "parquet" => Err(anyhow!(
            "parquet support is disabled; rebuild with the 'parquet' feature"
        )),
        "csv" => CsvWriter::new(&mut file)
            .finish(df)
            .context("writing CSV file"),
        _ => Err(anyhow!(
            "unsupported output extension for {}; use .csv or .parquet",
            path.display()
        )),
    }
}

/// Region table without geometry: `name`, `commune` (districts), one column
/// per year, `pv_potential`.
pub fn region_table_frame(table: &RegionTable) -> Result<DataFrame> {
    let names: Vec<String> = table.regions.iter().map(|r| r.name.clone()).collect();
    let mut columns = vec![Series::new("name", names)];

    if table.granularity == Granularity::District {
        let communes: Vec<Option<String>> =
            table.regions.iter().map(|r| r.commune.clone()).collect();
        columns.push(Series::new("commune", communes));
    }

    for year in table.years() {
        let values: Vec<f64> = table.regions.iter().map(|r| r.series.value(year)).collect();
        columns.push(Series::new(&year.to_string(), values));
    }

    let potential: Vec<f64> = table.regions.iter().map(|r| r.potential).collect();
    columns.push(Series::new(POTENTIAL_PROPERTY, potential));

    DataFrame::new(columns).context("building region frame")
}

/// Read a keyed numeric column, e.g. the per-district potential table.
///
/// Keys are read as text whatever their stored type; null keys are skipped
/// and null values read as zero. Repeated keys are summed.
pub fn read_keyed_values(
    path: &Path,
    key_column: &str,
    value_column: &str,
) -> Result<BTreeMap<String, f64>> {
    let df = read_frame(path)?;
    keyed_values(&df, key_column, value_column)
        .with_context(|| format!("reading '{key_column}' / '{value_column}' from {}", path.display()))
}

pub fn keyed_values(
    df: &DataFrame,
    key_column: &str,
    value_column: &str,
) -> Result<BTreeMap<String, f64>> {
    let keys = df
        .column(key_column)
        .with_context(|| format!("missing '{key_column}' column"))?
        .cast(&DataType::Utf8)
        .context("casting key column to utf8")?;
    let values = df
        .column(value_column)
        .with_context(|| format!("missing '{value_column}' column"))?
        .cast(&DataType::Float64)
        .context("casting value column to Float64")?;

    let mut out = BTreeMap::new();
    for (key, value) in keys.utf8()?.into_iter().zip(values.f64()?.into_iter()) {
        if let Some(key) = key {
            *out.entry(key.trim().to_string()).or_insert(0.0) += value.unwrap_or(0.0);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use helio_core::{CapacitySeries, Crs, GrowthModel, Region};
    use tempfile::tempdir;

    #[test]
    fn keyed_values_sum_duplicate_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("potential.csv");
        fs::write(
            &path,
            "district,pv_potential\nJonction,1.5\nJonction,0.5\nCharmilles,2.0\n",
        )
        .unwrap();
        let values = read_keyed_values(&path, "district", "pv_potential").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["Jonction"], 2.0);
        assert_eq!(values["Charmilles"], 2.0);
    }

    #[test]
    fn missing_column_is_reported() {
        let df = df!["district" => &["a"], "other" => &[1.0]].unwrap();
        let err = keyed_values(&df, "district", "pv_potential").unwrap_err();
        assert!(err.to_string().contains("pv_potential"));
    }

    #[test]
    fn region_frame_has_one_column_per_year() {
        let mut region = Region::new("Onex", MultiPolygon::new(vec![]));
        region.series = CapacitySeries::from_pairs([(2024, 1.0), (2025, 2.0)]);
        region.potential = 5.0;
        let table = RegionTable::new(
            Granularity::Commune,
            GrowthModel::Linear,
            Crs::Wgs84,
            vec![region],
        );
        let mut df = region_table_frame(&table).unwrap();
        assert_eq!(df.width(), 4);
        assert_eq!(df.height(), 1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("communes_lin.csv");
        write_frame(&mut df, &path).unwrap();
        let back = read_frame(&path).unwrap();
        assert_eq!(back.shape(), (1, 4));
    }
}
