//! Readers for the three raw vector layers.
//!
//! Layers are GeoJSON FeatureCollections (convert GeoPackage sources with
//! `ogr2ogr -f GeoJSON`). A `crs` member names the layer's coordinate
//! system; layers without one are taken to be in the caller's default CRS.
//! Every geometry is reprojected into the computation CRS on load so the
//! downstream joins never mix coordinate systems.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use geo::{Geometry, MultiPolygon, Point};
use geojson::{Feature, FeatureCollection, GeoJson};
use helio_core::{CommuneShape, Crs, DistrictShape, Installation, Kilowatts, SourceLayers};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::fields::FieldNames;
use crate::values::{coerce_f64, coerce_key, coerce_year};

/// Locations of the raw layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPaths {
    pub installations: PathBuf,
    pub districts: PathBuf,
    pub communes: PathBuf,
}

/// Parse a GeoJSON file that must hold a FeatureCollection.
pub fn read_collection(path: &Path) -> Result<FeatureCollection> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading layer {}", path.display()))?;
    let geojson = text
        .parse::<GeoJson>()
        .with_context(|| format!("parsing GeoJSON {}", path.display()))?;
    FeatureCollection::try_from(geojson)
        .with_context(|| format!("{} is not a FeatureCollection", path.display()))
}

/// CRS named by the collection's `crs` member, or `default` when absent.
pub fn collection_crs(collection: &FeatureCollection, default: Crs) -> Result<Crs> {
    let Some(member) = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
    else {
        return Ok(default);
    };
    let name = member
        .get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .ok_or_else(|| anyhow!("malformed 'crs' member: {member}"))?;
    Ok(Crs::parse(name)?)
}

pub(crate) fn feature_geometry(feature: &Feature) -> Result<Option<Geometry<f64>>> {
    match feature.geometry.clone() {
        Some(geometry) => {
            let converted = Geometry::<f64>::try_from(geometry)
                .map_err(|err| anyhow!("unsupported geometry: {err}"))?;
            Ok(Some(converted))
        }
        None => Ok(None),
    }
}

pub(crate) fn polygonal(geometry: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Some(multi),
        Geometry::GeometryCollection(collection) => {
            let mut polygons = Vec::new();
            for part in collection {
                polygons.extend(polygonal(part)?.0);
            }
            Some(MultiPolygon::new(polygons))
        }
        _ => None,
    }
}

fn punctual(geometry: Geometry<f64>) -> Option<Point<f64>> {
    match geometry {
        Geometry::Point(point) => Some(point),
        Geometry::MultiPoint(points) => points.0.into_iter().next(),
        _ => None,
    }
}

/// Load installation points, reprojected into `target`.
///
/// Unparseable power values become 0 kW; features without a point geometry
/// are skipped.
pub fn load_installations(
    path: &Path,
    fields: &FieldNames,
    default_crs: Crs,
    target: Crs,
) -> Result<Vec<Installation>> {
    let collection = read_collection(path)?;
    let crs = collection_crs(&collection, default_crs)?;

    let mut installations = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;
    let mut coerced = 0usize;
    for feature in &collection.features {
        let Some(location) = feature_geometry(feature)?.and_then(punctual) else {
            skipped += 1;
            continue;
        };
        let power = match coerce_f64(feature.property(&fields.power)) {
            Some(kw) => Kilowatts(kw),
            None => {
                coerced += 1;
                Kilowatts(0.0)
            }
        };
        installations.push(Installation {
            location: crs.transform_point(target, &location),
            power,
            commissioning_year: coerce_year(feature.property(&fields.commissioning)),
        });
    }

    if skipped > 0 {
        warn!(skipped, "installations without point geometry were skipped");
    }
    if coerced > 0 {
        debug!(coerced, field = %fields.power, "non-numeric power values coerced to zero");
    }
    info!(
        count = installations.len(),
        %crs,
        "loaded installations from {}",
        path.display()
    );
    Ok(installations)
}

/// Load district polygons, reprojected into `target`.
pub fn load_districts(
    path: &Path,
    fields: &FieldNames,
    default_crs: Crs,
    target: Crs,
) -> Result<Vec<DistrictShape>> {
    let collection = read_collection(path)?;
    let crs = collection_crs(&collection, default_crs)?;

    let mut districts = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.iter().enumerate() {
        let name = coerce_key(feature.property(&fields.district_name)).with_context(|| {
            format!(
                "district feature {idx} in {} has no '{}' attribute",
                path.display(),
                fields.district_name
            )
        })?;
        let geometry = feature_geometry(feature)?
            .and_then(polygonal)
            .with_context(|| format!("district '{name}' has no polygon geometry"))?;
        districts.push(DistrictShape {
            name,
            commune_id: coerce_key(feature.property(&fields.district_commune)),
            geometry: crs.transform_multipolygon(target, &geometry),
        });
    }
    info!(count = districts.len(), %crs, "loaded districts from {}", path.display());
    Ok(districts)
}

/// Load commune polygons, reprojected into `target`.
pub fn load_communes(
    path: &Path,
    fields: &FieldNames,
    default_crs: Crs,
    target: Crs,
) -> Result<Vec<CommuneShape>> {
    let collection = read_collection(path)?;
    let crs = collection_crs(&collection, default_crs)?;

    let mut communes = Vec::with_capacity(collection.features.len());
    for (idx, feature) in collection.features.iter().enumerate() {
        let id = coerce_key(feature.property(&fields.commune_id));
        let name = coerce_key(feature.property(&fields.commune_name));
        let (Some(id), Some(name)) = (id, name) else {
            bail!(
                "commune feature {idx} in {} lacks '{}' or '{}'",
                path.display(),
                fields.commune_id,
                fields.commune_name
            );
        };
        let geometry = feature_geometry(feature)?
            .and_then(polygonal)
            .unwrap_or_else(|| MultiPolygon::new(vec![]));
        communes.push(CommuneShape {
            id,
            name,
            geometry: crs.transform_multipolygon(target, &geometry),
        });
    }
    info!(count = communes.len(), %crs, "loaded communes from {}", path.display());
    Ok(communes)
}

/// Load all three layers into the computation CRS.
pub fn load_sources(
    paths: &LayerPaths,
    fields: &FieldNames,
    default_crs: Crs,
    compute_crs: Crs,
) -> Result<SourceLayers> {
    Ok(SourceLayers {
        crs: compute_crs,
        installations: load_installations(&paths.installations, fields, default_crs, compute_crs)?,
        districts: load_districts(&paths.districts, fields, default_crs, compute_crs)?,
        communes: load_communes(&paths.communes, fields, default_crs, compute_crs)?,
    })
}
