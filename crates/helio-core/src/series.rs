use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Cumulative installed capacity (MWc) keyed by calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacitySeries {
    values: BTreeMap<i32, f64>,
}

impl CapacitySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, f64)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, year: i32) -> Option<f64> {
        self.values.get(&year).copied()
    }

    /// Value for `year`, zero when the year is absent.
    pub fn value(&self, year: i32) -> f64 {
        self.get(year).unwrap_or(0.0)
    }

    pub fn set(&mut self, year: i32, value: f64) {
        self.values.insert(year, value);
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(y, v)| (*y, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values for every year of `years`, zero-filled.
    pub fn window(&self, years: RangeInclusive<i32>) -> Vec<f64> {
        years.map(|year| self.value(year)).collect()
    }

    /// Year-wise sum; years present in either side are kept.
    pub fn accumulate(&mut self, other: &CapacitySeries) {
        for (year, value) in other.iter() {
            *self.values.entry(year).or_insert(0.0) += value;
        }
    }

    pub fn map_values<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for value in self.values.values_mut() {
            *value = f(*value);
        }
    }

    pub fn is_non_decreasing(&self, years: RangeInclusive<i32>) -> bool {
        let values = self.window(years);
        values.windows(2).all(|pair| pair[1] >= pair[0])
    }
}

impl FromIterator<(i32, f64)> for CapacitySeries {
    fn from_iter<T: IntoIterator<Item = (i32, f64)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_merges_years() {
        let mut a = CapacitySeries::from_pairs([(2020, 1.0), (2021, 2.0)]);
        let b = CapacitySeries::from_pairs([(2021, 3.0), (2022, 4.0)]);
        a.accumulate(&b);
        assert_eq!(a.window(2020..=2022), vec![1.0, 5.0, 4.0]);
    }

    #[test]
    fn window_zero_fills_missing_years() {
        let s = CapacitySeries::from_pairs([(2006, 2.0)]);
        assert_eq!(s.window(2005..=2007), vec![0.0, 2.0, 0.0]);
        assert!(!s.is_non_decreasing(2005..=2007));
        assert!(s.is_non_decreasing(2005..=2006));
    }
}
