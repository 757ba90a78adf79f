//! Commune rollup: union district polygons, sum district values.

use std::collections::BTreeMap;

use geo::{BooleanOps, MultiPolygon};
use helio_core::{Granularity, HelioError, HelioResult, Region, RegionTable};
use tracing::warn;

/// Dissolve a district table into a commune table with the same growth model
/// and CRS. Communes come out sorted by name; districts without a commune
/// are left out.
pub fn dissolve_communes(districts: &RegionTable) -> HelioResult<RegionTable> {
    if districts.granularity != Granularity::District {
        return Err(HelioError::Validation(format!(
            "cannot dissolve '{}': not a district table",
            districts.name()
        )));
    }

    let mut groups: BTreeMap<&str, Vec<&Region>> = BTreeMap::new();
    let mut orphans = 0usize;
    for region in &districts.regions {
        match region.commune.as_deref() {
            Some(commune) => groups.entry(commune).or_default().push(region),
            None => orphans += 1,
        }
    }
    if orphans > 0 {
        warn!(
            orphans,
            table = %districts.name(),
            "districts without a commune left out of the rollup"
        );
    }

    let communes = groups
        .into_iter()
        .map(|(name, members)| {
            let mut commune = Region::new(name, union_all(members.iter().map(|r| &r.geometry)));
            for member in members {
                commune.series.accumulate(&member.series);
                commune.potential += member.potential;
            }
            commune
        })
        .collect();

    Ok(RegionTable::new(
        Granularity::Commune,
        districts.model,
        districts.crs,
        communes,
    ))
}

fn union_all<'a, I>(shapes: I) -> MultiPolygon<f64>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    shapes
        .into_iter()
        .fold(MultiPolygon::new(vec![]), |acc, shape| {
            if acc.0.is_empty() {
                shape.clone()
            } else {
                acc.union(shape)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};
    use helio_core::{CapacitySeries, Crs, GrowthModel};

    fn district(name: &str, commune: Option<&str>, x0: f64, values: &[(i32, f64)]) -> Region {
        let mut r = Region::new(
            name,
            MultiPolygon::new(vec![polygon![
                (x: x0, y: 0.0),
                (x: x0 + 10.0, y: 0.0),
                (x: x0 + 10.0, y: 10.0),
                (x: x0, y: 10.0),
            ]]),
        )
        .with_commune(commune.map(str::to_string));
        r.series = CapacitySeries::from_pairs(values.iter().copied());
        r.potential = 1.0;
        r
    }

    #[test]
    fn commune_values_are_district_sums() {
        let table = RegionTable::new(
            Granularity::District,
            GrowthModel::Linear,
            Crs::Lv95,
            vec![
                district("a", Some("Vernier"), 0.0, &[(2024, 1.0), (2050, 4.0)]),
                district("b", Some("Vernier"), 10.0, &[(2024, 2.0), (2050, 6.0)]),
                district("c", Some("Aire-la-Ville"), 30.0, &[(2024, 0.5), (2050, 0.5)]),
                district("d", None, 50.0, &[(2024, 9.0)]),
            ],
        );
        let communes = dissolve_communes(&table).unwrap();
        assert_eq!(communes.name(), "communes_lin");
        assert_eq!(communes.len(), 2);
        assert_eq!(communes.regions[0].name, "Aire-la-Ville");

        let vernier = communes.region("Vernier").unwrap();
        assert_eq!(vernier.series.value(2024), 3.0);
        assert_eq!(vernier.series.value(2050), 10.0);
        assert_eq!(vernier.potential, 2.0);
        // adjacent squares merge into one 20x10 polygon
        assert!((vernier.geometry.unsigned_area() - 200.0).abs() < 1e-9);
        assert_eq!(vernier.geometry.0.len(), 1);
    }

    #[test]
    fn commune_tables_cannot_be_dissolved_again() {
        let table = RegionTable::new(Granularity::Commune, GrowthModel::Linear, Crs::Lv95, vec![]);
        assert!(dissolve_communes(&table).is_err());
    }
}
