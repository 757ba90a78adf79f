//! Cumulative installed capacity per district.

use std::collections::BTreeMap;

use helio_core::{CapacitySeries, Horizon, Region, SourceLayers};
use tracing::debug;

use crate::geo_join::{assign_districts, resolve_communes, GeoJoinSummary};

/// District regions carrying their historical series, plus join statistics.
#[derive(Debug, Clone)]
pub struct History {
    pub districts: Vec<Region>,
    pub join: GeoJoinSummary,
    pub undated: usize,
}

/// Build one region per district with a cumulative series over the
/// horizon's historical years.
///
/// The value for year Y is the total MWc of all installations in the
/// district commissioned in or before Y; earlier installations count toward
/// the first year. Installations without a commissioning year are dropped.
pub fn historical_districts(layers: &SourceLayers, horizon: &Horizon) -> History {
    let assignment = assign_districts(&layers.installations, &layers.districts);
    let communes = resolve_communes(&layers.districts, &layers.communes);

    let mut yearly: Vec<BTreeMap<i32, f64>> = vec![BTreeMap::new(); layers.districts.len()];
    let mut undated = 0usize;
    for (installation, district) in layers.installations.iter().zip(&assignment.districts) {
        let Some(idx) = district else { continue };
        let Some(year) = installation.commissioning_year else {
            undated += 1;
            continue;
        };
        *yearly[*idx].entry(year).or_insert(0.0) += installation.power.to_megawatts().value();
    }
    if undated > 0 {
        debug!(undated, "installations without commissioning year ignored");
    }

    let districts = layers
        .districts
        .iter()
        .zip(communes)
        .zip(yearly)
        .map(|((shape, commune), installs)| {
            let mut region =
                Region::new(shape.name.clone(), shape.geometry.clone()).with_commune(commune);
            region.series = cumulative(&installs, horizon);
            region
        })
        .collect();

    History {
        districts,
        join: assignment.summary,
        undated,
    }
}

fn cumulative(installs: &BTreeMap<i32, f64>, horizon: &Horizon) -> CapacitySeries {
    let mut running: f64 = installs
        .range(..horizon.first_year)
        .map(|(_, power)| power)
        .sum();
    horizon
        .historical_years()
        .map(|year| {
            running += installs.get(&year).copied().unwrap_or(0.0);
            (year, running)
        })
        .collect()
}
