//! End-to-end processing: raw layers in, four finished tables out.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use helio_core::{
    Crs, Granularity, GrowthModel, HelioError, HelioResult, Horizon, MegawattsPeak, RegionTable,
    SourceLayers,
};
use helio_io::{load_sources, read_keyed_values, FieldNames, LayerPaths};
use helio_ts::{extend_exponential, extend_linear, GrowthRate, HoltLinear, LinearSummary};
use serde::Serialize;
use tracing::info;

use crate::dissolve::dissolve_communes;
use crate::export::{finalize, round_to, write_outputs, TabularFormat};
use crate::geo_join::GeoJoinSummary;
use crate::history::historical_districts;
use crate::potential::attach_potential;

/// Where the per-district potential comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialSource {
    pub path: PathBuf,
    pub key_column: String,
    pub value_column: String,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub layers: LayerPaths,
    /// `None` runs without potential; every region then carries zero.
    pub potential: Option<PotentialSource>,
    pub fields: FieldNames,
    pub horizon: Horizon,
    pub target: MegawattsPeak,
    /// CRS assumed for layers that do not declare one.
    pub input_crs: Crs,
    pub compute_crs: Crs,
    pub display_crs: Crs,
    pub precision: u32,
    pub output_dir: PathBuf,
    pub tabular: Option<TabularFormat>,
    pub holt: HoltLinear,
}

/// The four tables of a run, still in the computation CRS and unrounded.
#[derive(Debug, Clone)]
pub struct ModelTables {
    pub tables: Vec<RegionTable>,
    pub join: GeoJoinSummary,
    pub undated: usize,
    pub linear: LinearSummary,
    pub growth: GrowthRate,
}

impl ModelTables {
    pub fn table(&self, granularity: Granularity, model: GrowthModel) -> Option<&RegionTable> {
        self.tables
            .iter()
            .find(|t| t.granularity == granularity && t.model == model)
    }
}

/// Aggregate history, forecast with both models and dissolve to communes.
pub fn build_tables(
    layers: &SourceLayers,
    potentials: &BTreeMap<String, f64>,
    horizon: &Horizon,
    target: MegawattsPeak,
    holt: &HoltLinear,
) -> HelioResult<ModelTables> {
    horizon.validate()?;
    if layers.districts.is_empty() {
        return Err(HelioError::Validation("district layer is empty".to_string()));
    }

    let mut history = historical_districts(layers, horizon);
    attach_potential(&mut history.districts, potentials);

    let mut linear = history.districts.clone();
    let linear_summary = extend_linear(&mut linear, horizon, holt);
    let mut exponential = history.districts;
    let growth = extend_exponential(&mut exponential, horizon, target)?;

    let mut tables = Vec::with_capacity(4);
    for (model, regions) in [
        (GrowthModel::Linear, linear),
        (GrowthModel::Exponential, exponential),
    ] {
        let districts = RegionTable::new(Granularity::District, model, layers.crs, regions);
        let communes = dissolve_communes(&districts)?;
        tables.push(districts);
        tables.push(communes);
    }

    Ok(ModelTables {
        tables,
        join: history.join,
        undated: history.undated,
        linear: linear_summary,
        growth,
    })
}

/// What a run did, for logs and run manifests.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub join: GeoJoinSummary,
    pub undated: usize,
    pub linear: LinearSummary,
    pub growth: GrowthRate,
    pub final_year: i32,
    /// Commune-level total in the final year, keyed by table name.
    pub final_totals: BTreeMap<String, f64>,
    pub outputs: Vec<PathBuf>,
}

pub fn run_pipeline(settings: &PipelineSettings) -> Result<PipelineReport> {
    let layers = load_sources(
        &settings.layers,
        &settings.fields,
        settings.input_crs,
        settings.compute_crs,
    )?;

    let potentials = match &settings.potential {
        Some(source) => read_keyed_values(&source.path, &source.key_column, &source.value_column)
            .with_context(|| format!("loading potential table {}", source.path.display()))?,
        None => {
            info!("no potential table configured; potential set to zero");
            BTreeMap::new()
        }
    };

    let model = build_tables(
        &layers,
        &potentials,
        &settings.horizon,
        settings.target,
        &settings.holt,
    )?;

    fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("creating {}", settings.output_dir.display()))?;

    let final_year = settings.horizon.final_year;
    let mut outputs = Vec::new();
    let mut final_totals = BTreeMap::new();
    for table in &model.tables {
        if table.granularity == Granularity::Commune {
            let total = round_to(table.total(final_year), settings.precision);
            final_totals.insert(table.name(), total);
        }
        let finished = finalize(table, settings.precision, settings.display_crs);
        outputs.extend(write_outputs(&finished, &settings.output_dir, settings.tabular)?);
    }

    for (name, total) in &final_totals {
        info!(table = %name, year = final_year, total, "commune total");
    }

    Ok(PipelineReport {
        join: model.join,
        undated: model.undated,
        linear: model.linear,
        growth: model.growth,
        final_year,
        final_totals,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Point};
    use helio_core::{CommuneShape, DistrictShape, Installation, Kilowatts};
    use helio_io::read_region_table;
    use tempfile::tempdir;

    fn square(x0: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: 0.0),
            (x: x0 + 10.0, y: 0.0),
            (x: x0 + 10.0, y: 10.0),
            (x: x0, y: 10.0),
        ]])
    }

    fn district(name: &str, x0: f64, commune: &str) -> DistrictShape {
        DistrictShape {
            name: name.to_string(),
            commune_id: Some(commune.to_string()),
            geometry: square(x0),
        }
    }

    fn layers() -> SourceLayers {
        let mut installations = Vec::new();
        for (i, year) in (2005..=2024).enumerate() {
            for x0 in [0.0, 10.0, 20.0] {
                installations.push(Installation {
                    location: Point::new(x0 + 1.0 + i as f64 * 0.1, 5.0),
                    power: Kilowatts(100.0 + x0 * 10.0 + i as f64 * 20.0),
                    commissioning_year: Some(year),
                });
            }
        }
        SourceLayers {
            crs: Crs::Lv95,
            installations,
            districts: vec![
                district("Acacias", 0.0, "6608"),
                district("Bossons", 10.0, "6628"),
                district("Bachet", 20.0, "6628"),
            ],
            communes: vec![
                CommuneShape {
                    id: "6608".into(),
                    name: "Carouge".into(),
                    geometry: square(0.0),
                },
                CommuneShape {
                    id: "6628".into(),
                    name: "Lancy".into(),
                    geometry: MultiPolygon::new(vec![]),
                },
            ],
        }
    }

    fn model() -> ModelTables {
        let potentials = BTreeMap::from([("Bossons".to_string(), 12.0), ("Bachet".to_string(), 8.0)]);
        build_tables(
            &layers(),
            &potentials,
            &Horizon::default(),
            MegawattsPeak(1000.0),
            &HoltLinear::default(),
        )
        .unwrap()
    }

    #[test]
    fn four_tables_are_built() {
        let model = model();
        let names: Vec<String> = model.tables.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["girec_lin", "communes_lin", "girec_exp", "communes_exp"]);
        assert_eq!(model.join.num_mapped, 60);
    }

    #[test]
    fn history_is_non_decreasing_and_forecasts_non_negative() {
        let model = model();
        let horizon = Horizon::default();
        for table in &model.tables {
            for region in &table.regions {
                assert!(region.series.is_non_decreasing(horizon.historical_years()));
                for year in horizon.forecast_years() {
                    assert!(region.series.value(year) >= 0.0, "{} {year}", table.name());
                }
            }
        }
    }

    #[test]
    fn communes_sum_their_districts() {
        let model = model();
        for growth in GrowthModel::ALL {
            let districts = model.table(Granularity::District, growth).unwrap();
            let communes = model.table(Granularity::Commune, growth).unwrap();
            let lancy = communes.region("Lancy").unwrap();
            for year in Horizon::default().all_years() {
                let expected = districts.region("Bossons").unwrap().series.value(year)
                    + districts.region("Bachet").unwrap().series.value(year);
                assert!((lancy.series.value(year) - expected).abs() < 1e-9);
            }
            assert_eq!(lancy.potential, 20.0);
            assert_eq!(communes.region("Carouge").unwrap().potential, 0.0);
        }
    }

    #[test]
    fn exponential_total_reaches_target() {
        let model = model();
        let districts = model
            .table(Granularity::District, GrowthModel::Exponential)
            .unwrap();
        assert!((districts.total(2050) - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_base_total_is_an_error() {
        let mut layers = layers();
        layers.installations.clear();
        let err = build_tables(
            &layers,
            &BTreeMap::new(),
            &Horizon::default(),
            MegawattsPeak(1000.0),
            &HoltLinear::default(),
        );
        assert!(err.is_err());
    }

    const POINTS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2500005.0, 1118005.0]},
         "properties": {"TotalPower": 4000, "BeginningOfOperation": "2010-06-01"}},
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2500006.0, 1118004.0]},
         "properties": {"TotalPower": "6000", "BeginningOfOperation": "2020-03-15"}}
    ]}"#;

    const DISTRICTS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"NOM": "Cité", "NO_COMM": 6621},
         "geometry": {"type": "Polygon", "coordinates": [[[2500000.0, 1118000.0], [2500010.0, 1118000.0],
            [2500010.0, 1118010.0], [2500000.0, 1118010.0], [2500000.0, 1118000.0]]]}}
    ]}"#;

    const COMMUNES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"NO_COMM": 6621, "COMMUNE": "Genève"},
         "geometry": {"type": "Polygon", "coordinates": [[[2500000.0, 1118000.0], [2500010.0, 1118000.0],
            [2500010.0, 1118010.0], [2500000.0, 1118010.0], [2500000.0, 1118000.0]]]}}
    ]}"#;

    #[test]
    fn run_writes_four_reprojected_tables() {
        let dir = tempdir().unwrap();
        let raw = dir.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join("pronovo.geojson"), POINTS).unwrap();
        fs::write(raw.join("girec.geojson"), DISTRICTS).unwrap();
        fs::write(raw.join("communes.geojson"), COMMUNES).unwrap();
        fs::write(raw.join("potential.csv"), "district,pv_potential\nCité,42.5\n").unwrap();

        let settings = PipelineSettings {
            layers: LayerPaths {
                installations: raw.join("pronovo.geojson"),
                districts: raw.join("girec.geojson"),
                communes: raw.join("communes.geojson"),
            },
            potential: Some(PotentialSource {
                path: raw.join("potential.csv"),
                key_column: "district".into(),
                value_column: "pv_potential".into(),
            }),
            fields: FieldNames::default(),
            horizon: Horizon::default(),
            target: MegawattsPeak(1000.0),
            input_crs: Crs::Lv95,
            compute_crs: Crs::Lv95,
            display_crs: Crs::Wgs84,
            precision: 2,
            output_dir: dir.path().join("out"),
            tabular: Some(TabularFormat::Csv),
            holt: HoltLinear::default(),
        };

        let report = run_pipeline(&settings).unwrap();
        assert_eq!(report.outputs.len(), 8);
        assert_eq!(report.final_totals["communes_exp"], 1000.0);

        let table = read_region_table(&dir.path().join("out/girec_exp.geojson")).unwrap();
        assert_eq!(table.crs, Crs::Wgs84);
        let cite = table.region("Cité").unwrap();
        assert_eq!(cite.commune.as_deref(), Some("Genève"));
        assert_eq!(cite.series.value(2015), 4.0);
        assert_eq!(cite.series.value(2024), 10.0);
        assert_eq!(cite.series.value(2050), 1000.0);
        assert_eq!(cite.potential, 42.5);
    }
}
