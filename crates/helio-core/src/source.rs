use geo::{MultiPolygon, Point};

use crate::crs::Crs;
use crate::units::Kilowatts;

/// A registered photovoltaic installation.
#[derive(Debug, Clone, PartialEq)]
pub struct Installation {
    pub location: Point<f64>,
    /// Nameplate power; unparseable register values are already zero here.
    pub power: Kilowatts,
    /// `None` when the commissioning date is missing or unparseable.
    pub commissioning_year: Option<i32>,
}

/// A district polygon from the girec layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictShape {
    pub name: String,
    pub commune_id: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// A commune polygon from the communes layer.
#[derive(Debug, Clone, PartialEq)]
pub struct CommuneShape {
    pub id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// The three raw layers, all expressed in `crs`.
#[derive(Debug, Clone)]
pub struct SourceLayers {
    pub crs: Crs,
    pub installations: Vec<Installation>,
    pub districts: Vec<DistrictShape>,
    pub communes: Vec<CommuneShape>,
}
