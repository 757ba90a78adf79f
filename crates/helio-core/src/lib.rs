//! # helio-core: domain model for the Geneva photovoltaic pipeline
//!
//! Shared types for every stage of the pipeline:
//!
//! - [`Horizon`] - first historical, base and final forecast years
//! - [`CapacitySeries`] - cumulative MWc per calendar year
//! - [`Region`] / [`RegionTable`] - districts or communes with geometry,
//!   series and rooftop potential, tagged with a [`Granularity`],
//!   a [`GrowthModel`] and a [`Crs`]
//! - [`Installation`], [`DistrictShape`], [`CommuneShape`] - raw layers
//! - [`crs`] - LV95 / WGS84 transforms
//! - [`units`] - kW / MWc / m² newtypes
//! - [`HelioError`] - structural error type

pub mod crs;
pub mod error;
pub mod horizon;
pub mod region;
pub mod series;
pub mod source;
pub mod units;

pub use crs::Crs;
pub use error::{HelioError, HelioResult};
pub use horizon::Horizon;
pub use region::{Granularity, GrowthModel, Region, RegionTable};
pub use series::CapacitySeries;
pub use source::{CommuneShape, DistrictShape, Installation, SourceLayers};
pub use units::{Kilowatts, MegawattsPeak, SquareMeters};
