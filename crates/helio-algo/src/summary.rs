//! Derived quantities over an exported region table: the expansion curve,
//! per-region metrics and shares.

use std::fmt;
use std::str::FromStr;

use helio_core::{HelioError, HelioResult, RegionTable};
use serde::{Deserialize, Serialize};

/// Cantonal reference targets, MWc.
pub const REFERENCE_TARGETS: [(i32, f64); 2] = [(2030, 350.0), (2050, 1000.0)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub year: i32,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetGap {
    pub year: i32,
    pub target: f64,
    /// `None` when the table has no column for the target year.
    pub total: Option<f64>,
    /// `target - total`; positive means the target is not reached.
    pub gap: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionCurve {
    pub points: Vec<CurvePoint>,
    pub targets: Vec<TargetGap>,
}

/// Total capacity per year across all regions of `table`.
pub fn expansion_curve(table: &RegionTable) -> ExpansionCurve {
    let points: Vec<CurvePoint> = table
        .years()
        .into_iter()
        .map(|year| CurvePoint {
            year,
            total: table.total(year),
        })
        .collect();

    let targets = REFERENCE_TARGETS
        .iter()
        .map(|&(year, target)| {
            let total = points.iter().find(|p| p.year == year).map(|p| p.total);
            TargetGap {
                year,
                target,
                total,
                gap: total.map(|t| target - t),
            }
        })
        .collect();

    ExpansionCurve { points, targets }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Capacity installed in the selected year, MWc.
    Installed,
    /// Calibrated potential, MWc.
    Potential,
    /// Installed over potential, percent.
    Ratio,
}

impl Metric {
    pub fn unit(self) -> &'static str {
        match self {
            Metric::Installed | Metric::Potential => "MWc",
            Metric::Ratio => "%",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Installed => "installed",
            Metric::Potential => "potential",
            Metric::Ratio => "ratio",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = HelioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "installed" | "power" => Ok(Metric::Installed),
            "potential" => Ok(Metric::Potential),
            "ratio" => Ok(Metric::Ratio),
            other => Err(HelioError::Parse(format!("unknown metric '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetric {
    pub name: String,
    pub value: Option<f64>,
    /// Percent of the year's total installed capacity.
    pub share: Option<f64>,
}

/// Evaluate `metric` for every region in `year`.
///
/// The potential is divided by `calibration`, which must be positive. A ratio
/// over a zero potential has no value.
pub fn region_metrics(
    table: &RegionTable,
    year: i32,
    metric: Metric,
    calibration: f64,
) -> HelioResult<Vec<RegionMetric>> {
    if !(calibration.is_finite() && calibration > 0.0) {
        return Err(HelioError::Validation(format!(
            "potential calibration must be positive, got {calibration}"
        )));
    }
    if !table.years().contains(&year) {
        return Err(HelioError::Validation(format!(
            "table {} has no column for {year}",
            table.name()
        )));
    }

    let installed: Vec<f64> = table.regions.iter().map(|r| r.series.value(year)).collect();
    let shares = shares(&installed);

    let metrics = table
        .regions
        .iter()
        .zip(installed.iter().zip(shares))
        .map(|(region, (&value, share))| {
            let potential = region.potential / calibration;
            let value = match metric {
                Metric::Installed => Some(value),
                Metric::Potential => Some(potential),
                Metric::Ratio if potential > 0.0 => Some(100.0 * value / potential),
                Metric::Ratio => None,
            };
            RegionMetric {
                name: region.name.clone(),
                value,
                share,
            }
        })
        .collect();
    Ok(metrics)
}

/// `100 * value / sum(values)`; no shares when the sum is zero.
pub fn shares(values: &[f64]) -> Vec<Option<f64>> {
    let total: f64 = values.iter().sum();
    values
        .iter()
        .map(|v| (total != 0.0).then(|| 100.0 * v / total))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    /// False when the requested bounds were unusable and the data range is used.
    pub constrained: bool,
}

/// Display range for `values`. Uses `[min, max]` when both are given and
/// ordered, otherwise the range of the data itself.
pub fn value_range(values: &[Option<f64>], min: Option<f64>, max: Option<f64>) -> ValueRange {
    if let (Some(min), Some(max)) = (min, max) {
        if min <= max {
            return ValueRange {
                min,
                max,
                constrained: true,
            };
        }
    }
    let present = values.iter().flatten().copied().filter(|v| v.is_finite());
    let (lo, hi) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        ValueRange {
            min: 0.0,
            max: 0.0,
            constrained: false,
        }
    } else {
        ValueRange {
            min: lo,
            max: hi,
            constrained: false,
        }
    }
}
