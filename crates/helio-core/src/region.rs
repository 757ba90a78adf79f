use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::crs::Crs;
use crate::error::HelioError;
use crate::series::CapacitySeries;

/// Spatial level of a region table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Statistical sub-municipal districts (girec)
    District,
    /// Municipalities, unions of districts
    Commune,
}

impl Granularity {
    /// File-name stem used for exported tables.
    pub fn stem(self) -> &'static str {
        match self {
            Granularity::District => "girec",
            Granularity::Commune => "communes",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

impl FromStr for Granularity {
    type Err = HelioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "girec" | "district" | "districts" => Ok(Granularity::District),
            "communes" | "commune" => Ok(Granularity::Commune),
            other => Err(HelioError::Parse(format!(
                "unknown granularity '{other}'; use girec or communes"
            ))),
        }
    }
}

/// Growth model used for the forecast years of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthModel {
    /// Holt's additive trend, fitted per district
    Linear,
    /// Shared exponential rate constrained by a final-year target
    Exponential,
}

impl GrowthModel {
    pub const ALL: [GrowthModel; 2] = [GrowthModel::Linear, GrowthModel::Exponential];

    pub fn suffix(self) -> &'static str {
        match self {
            GrowthModel::Linear => "lin",
            GrowthModel::Exponential => "exp",
        }
    }
}

impl fmt::Display for GrowthModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthModel::Linear => f.write_str("linear"),
            GrowthModel::Exponential => f.write_str("exponential"),
        }
    }
}

impl FromStr for GrowthModel {
    type Err = HelioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" | "lin" => Ok(GrowthModel::Linear),
            "exponential" | "exp" => Ok(GrowthModel::Exponential),
            other => Err(HelioError::Parse(format!(
                "unknown growth model '{other}'; use linear or exponential"
            ))),
        }
    }
}

/// One district or commune with its yearly capacity and potential.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    /// Parent commune name; `None` for communes and orphan districts.
    pub commune: Option<String>,
    pub geometry: MultiPolygon<f64>,
    pub series: CapacitySeries,
    /// Installable rooftop capacity in MWc.
    pub potential: f64,
}

impl Region {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            commune: None,
            geometry,
            series: CapacitySeries::new(),
            potential: 0.0,
        }
    }

    pub fn with_commune(mut self, commune: Option<String>) -> Self {
        self.commune = commune;
        self
    }
}

/// A set of regions at one granularity under one growth model.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable {
    pub granularity: Granularity,
    pub model: GrowthModel,
    pub crs: Crs,
    pub regions: Vec<Region>,
}

impl RegionTable {
    pub fn new(granularity: Granularity, model: GrowthModel, crs: Crs, regions: Vec<Region>) -> Self {
        Self {
            granularity,
            model,
            crs,
            regions,
        }
    }

    /// Table name, e.g. `girec_lin` or `communes_exp`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.granularity.stem(), self.model.suffix())
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Sum of every region's value for `year`.
    pub fn total(&self, year: i32) -> f64 {
        self.regions.iter().map(|r| r.series.value(year)).sum()
    }

    pub fn total_potential(&self) -> f64 {
        self.regions.iter().map(|r| r.potential).sum()
    }

    /// Every year carried by at least one region.
    pub fn years(&self) -> BTreeSet<i32> {
        self.regions.iter().flat_map(|r| r.series.years()).collect()
    }
}
