//! Point-in-polygon assignment of installations to districts.
//!
//! "Within" semantics: a point on a district boundary belongs to no district
//! through that boundary. Each point goes to the first district (in layer
//! order) whose interior contains it; points inside no district are dropped
//! from every downstream aggregate.

use std::collections::HashMap;

use geo::{BoundingRect, Contains, Point, Rect};
use helio_core::{CommuneShape, DistrictShape, Installation};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoJoinSummary {
    pub num_installations: usize,
    pub num_districts: usize,
    pub num_mapped: usize,
    pub num_unmapped: usize,
}

/// District index of each installation (`None` when unmatched).
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictAssignment {
    pub districts: Vec<Option<usize>>,
    pub summary: GeoJoinSummary,
}

struct IndexedDistrict<'a> {
    bounds: Option<Rect<f64>>,
    shape: &'a DistrictShape,
}

fn in_bounds(bounds: &Rect<f64>, point: &Point<f64>) -> bool {
    let (min, max) = (bounds.min(), bounds.max());
    point.x() >= min.x && point.x() <= max.x && point.y() >= min.y && point.y() <= max.y
}

/// Assign every installation to the district containing it.
pub fn assign_districts(installations: &[Installation], districts: &[DistrictShape]) -> DistrictAssignment {
    let index: Vec<IndexedDistrict<'_>> = districts
        .iter()
        .map(|shape| IndexedDistrict {
            bounds: shape.geometry.bounding_rect(),
            shape,
        })
        .collect();

    let assigned: Vec<Option<usize>> = installations
        .iter()
        .map(|installation| {
            let point = &installation.location;
            index.iter().position(|district| {
                district
                    .bounds
                    .as_ref()
                    .is_some_and(|bounds| in_bounds(bounds, point))
                    && district.shape.geometry.contains(point)
            })
        })
        .collect();

    let num_mapped = assigned.iter().filter(|a| a.is_some()).count();
    let summary = GeoJoinSummary {
        num_installations: installations.len(),
        num_districts: districts.len(),
        num_mapped,
        num_unmapped: installations.len() - num_mapped,
    };
    if summary.num_unmapped > 0 {
        warn!(
            unmapped = summary.num_unmapped,
            "installations outside every district were dropped"
        );
    }
    info!(
        mapped = summary.num_mapped,
        districts = summary.num_districts,
        "spatial join complete"
    );

    DistrictAssignment {
        districts: assigned,
        summary,
    }
}

/// Commune name of each district, resolved through the commune number.
pub fn resolve_communes(districts: &[DistrictShape], communes: &[CommuneShape]) -> Vec<Option<String>> {
    let by_id: HashMap<&str, &str> = communes
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();

    districts
        .iter()
        .map(|district| {
            let name = district
                .commune_id
                .as_deref()
                .and_then(|id| by_id.get(id))
                .map(|name| name.to_string());
            if name.is_none() {
                warn!(district = %district.name, commune_id = ?district.commune_id, "district has no matching commune");
            }
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use helio_core::Kilowatts;

    fn square(name: &str, x0: f64, commune: &str) -> DistrictShape {
        DistrictShape {
            name: name.to_string(),
            commune_id: Some(commune.to_string()),
            geometry: MultiPolygon::new(vec![polygon![
                (x: x0, y: 0.0),
                (x: x0 + 10.0, y: 0.0),
                (x: x0 + 10.0, y: 10.0),
                (x: x0, y: 10.0),
            ]]),
        }
    }

    fn at(x: f64, y: f64) -> Installation {
        Installation {
            location: Point::new(x, y),
            power: Kilowatts(10.0),
            commissioning_year: Some(2010),
        }
    }

    #[test]
    fn points_are_assigned_or_dropped() {
        let districts = vec![square("west", 0.0, "1"), square("east", 10.0, "2")];
        let installations = vec![at(5.0, 5.0), at(15.0, 5.0), at(25.0, 5.0), at(10.0, 5.0)];
        let result = assign_districts(&installations, &districts);
        assert_eq!(result.districts, vec![Some(0), Some(1), None, None]);
        assert_eq!(result.summary.num_mapped, 2);
        assert_eq!(result.summary.num_unmapped, 2);
    }

    #[test]
    fn overlapping_districts_take_the_first() {
        let districts = vec![square("a", 0.0, "1"), square("b", 5.0, "1")];
        let result = assign_districts(&[at(7.0, 5.0)], &districts);
        assert_eq!(result.districts, vec![Some(0)]);
    }

    #[test]
    fn communes_resolve_by_number() {
        let districts = vec![square("a", 0.0, "21"), square("b", 10.0, "99")];
        let communes = vec![CommuneShape {
            id: "21".to_string(),
            name: "Genève".to_string(),
            geometry: MultiPolygon::new(vec![]),
        }];
        assert_eq!(
            resolve_communes(&districts, &communes),
            vec![Some("Genève".to_string()), None]
        );
    }
}
