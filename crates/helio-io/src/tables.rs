//! GeoJSON serialization of region tables.
//!
//! Each region becomes one feature with id `name` and properties
//! `name`, `commune` (districts only), one key per year (`"2005"` ..
//! `"2050"`) and `pv_potential`. The collection carries the standard `crs`
//! member plus a `helio` member recording granularity and growth model, so a
//! reloaded table knows what it is without relying on its file name.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use geojson::{feature::Id, Feature, FeatureCollection, JsonObject, JsonValue};
use helio_core::{CapacitySeries, Crs, Granularity, GrowthModel, Region, RegionTable};
use serde_json::json;

use crate::layers::{collection_crs, feature_geometry, polygonal, read_collection};
use crate::values::coerce_f64;

pub const POTENTIAL_PROPERTY: &str = "pv_potential";

fn region_feature(region: &Region) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(region.name.clone()));
    if let Some(commune) = &region.commune {
        properties.insert("commune".to_string(), JsonValue::from(commune.clone()));
    }
    for (year, value) in region.series.iter() {
        properties.insert(year.to_string(), JsonValue::from(value));
    }
    properties.insert(POTENTIAL_PROPERTY.to_string(), JsonValue::from(region.potential));

    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&region.geometry))),
        id: Some(Id::String(region.name.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Build the FeatureCollection for `table`.
pub fn table_collection(table: &RegionTable) -> FeatureCollection {
    let mut members = JsonObject::new();
    members.insert(
        "crs".to_string(),
        json!({"type": "name", "properties": {"name": table.crs.urn()}}),
    );
    members.insert(
        "helio".to_string(),
        json!({
            "table": table.name(),
            "granularity": table.granularity,
            "model": table.model,
        }),
    );
    FeatureCollection {
        bbox: None,
        features: table.regions.iter().map(region_feature).collect(),
        foreign_members: Some(members),
    }
}

/// Write `table` as GeoJSON at `path`, creating parent directories.
pub fn write_region_table(table: &RegionTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let collection = table_collection(table);
    fs::write(path, collection.to_string())
        .with_context(|| format!("writing table {}", path.display()))?;
    Ok(())
}

fn table_kind(collection: &FeatureCollection, path: &Path) -> Result<(Granularity, GrowthModel)> {
    let meta = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("helio"));
    if let Some(meta) = meta {
        let granularity = meta
            .get("granularity")
            .cloned()
            .ok_or_else(|| anyhow!("'helio' member lacks granularity"))?;
        let model = meta
            .get("model")
            .cloned()
            .ok_or_else(|| anyhow!("'helio' member lacks model"))?;
        return Ok((
            serde_json::from_value(granularity)?,
            serde_json::from_value(model)?,
        ));
    }

    // fall back to the `<granularity>_<model>` file stem
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("cannot infer table kind from {}", path.display()))?;
    let (granularity, model) = stem
        .rsplit_once('_')
        .ok_or_else(|| anyhow!("cannot infer table kind from file name '{stem}'"))?;
    Ok((granularity.parse()?, model.parse()?))
}

/// Read a table written by [`write_region_table`].
pub fn read_region_table(path: &Path) -> Result<RegionTable> {
    let collection = read_collection(path)?;
    let crs = collection_crs(&collection, Crs::Wgs84)?;
    let (granularity, model) = table_kind(&collection, path)?;

    let mut regions = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.iter().enumerate() {
        let properties = feature
            .properties
            .as_ref()
            .with_context(|| format!("feature {idx} in {} has no properties", path.display()))?;
        let name = properties
            .get("name")
            .and_then(|v| v.as_str())
            .with_context(|| format!("feature {idx} in {} has no name", path.display()))?
            .to_string();
        let commune = properties
            .get("commune")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let series: CapacitySeries = properties
            .iter()
            .filter_map(|(key, value)| {
                let year = key.parse::<i32>().ok()?;
                Some((year, coerce_f64(Some(value)).unwrap_or(0.0)))
            })
            .collect();
        let geometry = feature_geometry(feature)?
            .and_then(polygonal)
            .with_context(|| format!("region '{name}' has no polygon geometry"))?;

        regions.push(Region {
            name,
            commune,
            geometry,
            series,
            potential: coerce_f64(properties.get(POTENTIAL_PROPERTY)).unwrap_or(0.0),
        });
    }

    Ok(RegionTable::new(granularity, model, crs, regions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use tempfile::tempdir;

    fn sample_table() -> RegionTable {
        let mut plainpalais = Region::new(
            "Plainpalais",
            MultiPolygon::new(vec![polygon![
                (x: 6.1401, y: 46.1953),
                (x: 6.1502, y: 46.1954),
                (x: 6.1498, y: 46.2011),
                (x: 6.1401, y: 46.1953),
            ]]),
        )
        .with_commune(Some("Genève".to_string()));
        plainpalais.series = CapacitySeries::from_pairs([(2005, 0.0), (2024, 4.21), (2050, 33.7)]);
        plainpalais.potential = 120.4;
        RegionTable::new(
            Granularity::District,
            GrowthModel::Exponential,
            Crs::Wgs84,
            vec![plainpalais],
        )
    }

    #[test]
    fn round_trip_preserves_names_years_and_geometry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("girec_exp.geojson");
        let table = sample_table();
        write_region_table(&table, &path).unwrap();

        let reloaded = read_region_table(&path).unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn kind_falls_back_to_file_stem() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("communes_lin.geojson");
        let mut collection = table_collection(&sample_table());
        collection
            .foreign_members
            .as_mut()
            .unwrap()
            .remove("helio");
        fs::write(&path, collection.to_string()).unwrap();

        let reloaded = read_region_table(&path).unwrap();
        assert_eq!(reloaded.granularity, Granularity::Commune);
        assert_eq!(reloaded.model, GrowthModel::Linear);
    }

    #[test]
    fn written_collection_names_its_crs() {
        let collection = table_collection(&sample_table());
        let crs = collection_crs(&collection, Crs::Lv95).unwrap();
        assert_eq!(crs, Crs::Wgs84);
    }
}
