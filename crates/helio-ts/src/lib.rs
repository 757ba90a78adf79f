//! # helio-ts: capacity forecasting
//!
//! Extends the historical series of each region past the base year with one
//! of two growth models:
//!
//! - [`holt`] - Holt's linear trend, fitted independently per region
//! - [`growth`] - one exponential rate shared by all regions, constrained so
//!   the total reaches a final-year target

pub mod growth;
pub mod holt;

use helio_core::{HelioResult, Horizon, MegawattsPeak, Region};
use serde::Serialize;
use tracing::{debug, info};

pub use growth::GrowthRate;
pub use holt::{Fallback, HoltFit, HoltLinear, HoltParams, LinearProjection};

/// Counts of how the linear model treated each region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinearSummary {
    pub fitted: usize,
    pub flat: usize,
}

/// Append Holt projections for every forecast year to each region.
pub fn extend_linear(regions: &mut [Region], horizon: &Horizon, model: &HoltLinear) -> LinearSummary {
    let mut summary = LinearSummary::default();
    for region in regions.iter_mut() {
        let history = region.series.window(horizon.historical_years());
        let projection = model.project(&history, horizon.forecast_len());
        match projection.fallback {
            Some(reason) => {
                debug!(region = %region.name, ?reason, "flat linear projection");
                summary.flat += 1;
            }
            None => summary.fitted += 1,
        }
        for (year, value) in horizon.forecast_years().zip(projection.values) {
            region.series.set(year, value);
        }
    }
    info!(
        fitted = summary.fitted,
        flat = summary.flat,
        "linear trend projections complete"
    );
    summary
}

/// Append target-constrained exponential projections to each region and
/// return the shared rate.
pub fn extend_exponential(
    regions: &mut [Region],
    horizon: &Horizon,
    target: MegawattsPeak,
) -> HelioResult<GrowthRate> {
    let base_total: MegawattsPeak = regions
        .iter()
        .map(|r| MegawattsPeak(r.series.value(horizon.base_year)))
        .sum();
    let growth = GrowthRate::to_target(base_total, target, horizon)?;
    for region in regions.iter_mut() {
        let base = region.series.value(horizon.base_year);
        for (year, value) in horizon.forecast_years().zip(growth.project(base)) {
            region.series.set(year, value);
        }
    }
    info!(
        rate = growth.rate,
        annual_percent = growth.annual_percent(),
        base_total = growth.base_total,
        target = growth.target,
        "exponential projections complete"
    );
    Ok(growth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::MultiPolygon;
    use helio_core::CapacitySeries;

    fn region(name: &str, history: impl Fn(i32) -> f64) -> Region {
        let mut r = Region::new(name, MultiPolygon::new(vec![]));
        r.series = (2005..=2024).map(|y| (y, history(y))).collect::<CapacitySeries>();
        r
    }

    #[test]
    fn exponential_total_hits_target() {
        let mut regions = vec![
            region("a", |y| (y - 2004) as f64 * 0.5),
            region("b", |y| if y >= 2020 { 3.0 } else { 0.0 }),
            region("c", |_| 0.0),
        ];
        let growth =
            extend_exponential(&mut regions, &Horizon::default(), MegawattsPeak(1000.0)).unwrap();
        assert!((growth.base_total - 13.0).abs() < 1e-12);
        let total: f64 = regions.iter().map(|r| r.series.value(2050)).sum();
        assert!((total - 1000.0).abs() < 1e-9);
        assert_eq!(regions[2].series.value(2050), 0.0);
        assert_eq!(regions[0].series.len(), 46);
    }

    #[test]
    fn linear_extension_is_non_negative_and_complete() {
        let mut regions = vec![
            region("grows", |y| (y - 2004) as f64 * 0.25),
            region("empty", |_| 0.0),
        ];
        let summary = extend_linear(&mut regions, &Horizon::default(), &HoltLinear::default());
        assert_eq!(summary, LinearSummary { fitted: 1, flat: 1 });
        for r in &regions {
            assert_eq!(r.series.len(), 46);
            assert!((2025..=2050).all(|y| r.series.value(y) >= 0.0));
        }
    }
}
