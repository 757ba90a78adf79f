//! Coordinate reference systems used by the pipeline.
//!
//! Computation happens in the Swiss projected system CH1903+ / LV95
//! (EPSG:2056), where point-in-polygon tests and unions are done on planar
//! metre coordinates. Published tables are in WGS84 (EPSG:4326) so web maps
//! can draw them directly.
//!
//! The transform between the two uses the swisstopo approximate formulas
//! ("Formeln und Konstanten für die Berechnung der Schweizerischen
//! schiefachsigen Zylinderprojektion", 2016), accurate to about one metre
//! over Switzerland. That is well below the size of any district polygon.

use geo::{Coord, MapCoords, MultiPolygon, Point};
use serde::{Deserialize, Serialize};

use crate::error::{HelioError, HelioResult};

/// Supported coordinate reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crs {
    /// CH1903+ / LV95, easting/northing in metres
    Lv95,
    /// WGS84 geographic, longitude/latitude in degrees
    Wgs84,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::Lv95 => 2056,
            Crs::Wgs84 => 4326,
        }
    }

    pub fn from_epsg(code: u32) -> HelioResult<Self> {
        match code {
            2056 => Ok(Crs::Lv95),
            4326 => Ok(Crs::Wgs84),
            other => Err(HelioError::Geometry(format!(
                "unsupported CRS EPSG:{other}; expected EPSG:2056 or EPSG:4326"
            ))),
        }
    }

    /// OGC URN as written in the GeoJSON `crs` member.
    pub fn urn(self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg())
    }

    /// Parse `EPSG:2056`, `urn:ogc:def:crs:EPSG::2056`, `2056`, or the
    /// `OGC:CRS84` alias used by GDAL for WGS84 GeoJSON.
    pub fn parse(name: &str) -> HelioResult<Self> {
        let trimmed = name.trim();
        if trimmed.ends_with("CRS84") {
            return Ok(Crs::Wgs84);
        }
        let code = trimmed
            .rsplit(':')
            .next()
            .unwrap_or(trimmed)
            .parse::<u32>()
            .map_err(|_| HelioError::Geometry(format!("unrecognised CRS name '{name}'")))?;
        Crs::from_epsg(code)
    }

    /// Transform a single coordinate from `self` into `target`.
    pub fn transform_coord(self, target: Crs, coord: Coord<f64>) -> Coord<f64> {
        match (self, target) {
            (Crs::Lv95, Crs::Wgs84) => lv95_to_wgs84(coord),
            (Crs::Wgs84, Crs::Lv95) => wgs84_to_lv95(coord),
            _ => coord,
        }
    }

    pub fn transform_point(self, target: Crs, point: &Point<f64>) -> Point<f64> {
        point.map_coords(|c| self.transform_coord(target, c))
    }

    pub fn transform_multipolygon(self, target: Crs, shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if self == target {
            return shape.clone();
        }
        shape.map_coords(|c| self.transform_coord(target, c))
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

fn lv95_to_wgs84(coord: Coord<f64>) -> Coord<f64> {
    // auxiliary values in units of 1000 km relative to Bern
    let y = (coord.x - 2_600_000.0) / 1_000_000.0;
    let x = (coord.y - 1_200_000.0) / 1_000_000.0;

    let lambda = 2.677_909_4 + 4.728_982 * y + 0.791_484 * y * x + 0.130_6 * y * x * x
        - 0.043_6 * y * y * y;
    let phi = 16.902_389_2 + 3.238_272 * x
        - 0.270_978 * y * y
        - 0.002_528 * x * x
        - 0.044_7 * y * y * x
        - 0.014_0 * x * x * x;

    // 10000" units to degrees
    Coord {
        x: lambda * 100.0 / 36.0,
        y: phi * 100.0 / 36.0,
    }
}

fn wgs84_to_lv95(coord: Coord<f64>) -> Coord<f64> {
    let phi = (coord.y * 3600.0 - 169_028.66) / 10_000.0;
    let lambda = (coord.x * 3600.0 - 26_782.5) / 10_000.0;

    let east = 2_600_072.37 + 211_455.93 * lambda
        - 10_938.51 * lambda * phi
        - 0.36 * lambda * phi * phi
        - 44.54 * lambda * lambda * lambda;
    let north = 1_200_147.07 + 308_807.95 * phi + 3_745.25 * lambda * lambda + 76.63 * phi * phi
        - 194.56 * lambda * lambda * phi
        + 119.79 * phi * phi * phi;

    Coord { x: east, y: north }
}
