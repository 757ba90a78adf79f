//! Target-constrained exponential growth.
//!
//! One annual rate drives the summed base-year capacity to the target in the
//! final year:
//!
//! ```text
//! r = ln(target / total_base) / (final − base)
//! capacity(year) = capacity_base · exp(r · (year − base))
//! ```
//!
//! Because every region grows at the same rate from its own base value, the
//! regional forecasts sum to exactly the target in the final year. A region
//! with nothing installed in the base year stays at zero throughout.

use helio_core::{HelioError, HelioResult, Horizon, MegawattsPeak};
use serde::Serialize;

/// The shared growth rate and the quantities it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthRate {
    pub rate: f64,
    pub base_total: f64,
    pub target: f64,
    pub base_year: i32,
    pub final_year: i32,
}

impl GrowthRate {
    /// Rate that grows `base_total` into `target` over the horizon's span.
    pub fn to_target(base_total: MegawattsPeak, target: MegawattsPeak, horizon: &Horizon) -> HelioResult<Self> {
        horizon.validate()?;
        if !(target.is_finite() && target.value() > 0.0) {
            return Err(HelioError::Config(format!(
                "growth target must be positive, got {}",
                target
            )));
        }
        if !(base_total.is_finite() && base_total.value() > 0.0) {
            return Err(HelioError::Forecast(format!(
                "no installed capacity in {}; the exponential growth rate is undefined",
                horizon.base_year
            )));
        }
        let rate = (target.value() / base_total.value()).ln() / horizon.span() as f64;
        Ok(Self {
            rate,
            base_total: base_total.value(),
            target: target.value(),
            base_year: horizon.base_year,
            final_year: horizon.final_year,
        })
    }

    /// Value in `year` of a region holding `base_value` in the base year.
    pub fn value_at(&self, base_value: f64, year: i32) -> f64 {
        base_value * (self.rate * (year - self.base_year) as f64).exp()
    }

    /// Values for base+1 ..= final.
    pub fn project(&self, base_value: f64) -> Vec<f64> {
        ((self.base_year + 1)..=self.final_year)
            .map(|year| self.value_at(base_value, year))
            .collect()
    }

    /// Equivalent compound annual growth, in percent.
    pub fn annual_percent(&self) -> f64 {
        (self.rate.exp() - 1.0) * 100.0
    }
}
