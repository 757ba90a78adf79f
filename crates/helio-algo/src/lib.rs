//! # helio-algo: from raw layers to published tables
//!
//! - [`geo_join`] - installations to districts, districts to communes
//! - [`history`] - cumulative capacity per district over the historical years
//! - [`dissolve`] - commune rollup of district tables
//! - [`export`] - rounding, reprojection, GeoJSON and flat outputs
//! - [`potential`] - rooftop potential per district
//! - [`summary`] - expansion curve, per-region metrics and shares
//! - [`pipeline`] - the complete `process` run

pub mod dissolve;
pub mod export;
pub mod geo_join;
pub mod history;
pub mod pipeline;
pub mod potential;
pub mod summary;

pub use dissolve::dissolve_communes;
pub use export::{finalize, write_outputs, TabularFormat};
pub use geo_join::{assign_districts, resolve_communes, DistrictAssignment, GeoJoinSummary};
pub use history::{historical_districts, History};
pub use pipeline::{build_tables, run_pipeline, ModelTables, PipelineReport, PipelineSettings, PotentialSource};
pub use potential::{attach_potential, derive_potential, derive_potential_file, RoofPotentialOptions};
pub use summary::{expansion_curve, region_metrics, value_range, ExpansionCurve, Metric, RegionMetric, ValueRange};
