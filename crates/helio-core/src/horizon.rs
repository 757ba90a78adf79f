use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{HelioError, HelioResult};

/// The three calendar anchors of a run: first historical year, base year
/// (last observed year, origin of both forecasts) and final forecast year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    #[serde(default = "default_first_year")]
    pub first_year: i32,
    #[serde(default = "default_base_year")]
    pub base_year: i32,
    #[serde(default = "default_final_year")]
    pub final_year: i32,
}

fn default_first_year() -> i32 {
    2005
}

fn default_base_year() -> i32 {
    2024
}

fn default_final_year() -> i32 {
    2050
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            first_year: default_first_year(),
            base_year: default_base_year(),
            final_year: default_final_year(),
        }
    }
}

impl Horizon {
    pub fn new(first_year: i32, base_year: i32, final_year: i32) -> HelioResult<Self> {
        let horizon = Self {
            first_year,
            base_year,
            final_year,
        };
        horizon.validate()?;
        Ok(horizon)
    }

    pub fn validate(&self) -> HelioResult<()> {
        if self.first_year >= self.base_year || self.base_year >= self.final_year {
            return Err(HelioError::Config(format!(
                "horizon must satisfy first < base < final (got {} / {} / {})",
                self.first_year, self.base_year, self.final_year
            )));
        }
        Ok(())
    }

    /// Observed years, first through base inclusive.
    pub fn historical_years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.base_year
    }

    /// Projected years, the year after base through final inclusive.
    pub fn forecast_years(&self) -> RangeInclusive<i32> {
        (self.base_year + 1)..=self.final_year
    }

    pub fn all_years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.final_year
    }

    pub fn forecast_len(&self) -> usize {
        (self.final_year - self.base_year) as usize
    }

    /// Years between base and final, the exponent span of the growth rate.
    pub fn span(&self) -> i32 {
        self.final_year - self.base_year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_geneva_run() {
        let h = Horizon::default();
        assert_eq!(h.historical_years().count(), 20);
        assert_eq!(h.forecast_years().count(), 26);
        assert_eq!(h.forecast_len(), 26);
        assert_eq!(*h.forecast_years().start(), 2025);
        assert_eq!(h.all_years().count(), 46);
    }

    #[test]
    fn rejects_unordered_years() {
        assert!(Horizon::new(2024, 2024, 2050).is_err());
        assert!(Horizon::new(2005, 2050, 2030).is_err());
        assert!(Horizon::new(2010, 2020, 2040).is_ok());
    }
}
