//! # helio-io: layer and table I/O
//!
//! - [`layers`] - GeoJSON readers for the installation, district and commune
//!   layers, reprojecting into the computation CRS
//! - [`tables`] - GeoJSON writer/reader for region tables
//! - [`frame`] - CSV / Parquet flat tables through polars
//! - [`fields`] - configurable attribute names
//! - [`values`] - lenient number, key and date coercion

pub mod fields;
pub mod frame;
pub mod layers;
pub mod tables;
pub mod values;

pub use fields::FieldNames;
pub use frame::{read_frame, read_keyed_values, region_table_frame, write_frame};
pub use layers::{load_sources, LayerPaths};
pub use tables::{read_region_table, table_collection, write_region_table};
