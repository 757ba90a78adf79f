//! Unit newtypes for photovoltaic capacity.
//!
//! Installation registers report nameplate power in kilowatts while every
//! table the pipeline produces is expressed in megawatt-peak (MWc). Keeping
//! the two apart as types makes the single /1000 rescaling explicit.
//!
//! ```
//! use helio_core::units::{Kilowatts, MegawattsPeak, SquareMeters};
//!
//! let roof = SquareMeters(1250.0);
//! let potential: Kilowatts = roof.peak_power(0.2);
//! assert_eq!(potential.to_megawatts(), MegawattsPeak(0.25));
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.2} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Create a new value
            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Nameplate power in kilowatts (kW), as reported by installation registers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");

impl Kilowatts {
    pub fn to_megawatts(self) -> MegawattsPeak {
        MegawattsPeak(self.0 / 1000.0)
    }
}

/// Nameplate solar capacity in megawatt-peak (MWc).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MegawattsPeak(pub f64);

impl_unit_ops!(MegawattsPeak, "MWc");

/// Roof surface in square meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SquareMeters(pub f64);

impl_unit_ops!(SquareMeters, "m²");

impl SquareMeters {
    /// Installable peak power for this surface at `kw_per_m2` kWc per m².
    ///
    /// The surface is rounded to whole square meters first.
    pub fn peak_power(self, kw_per_m2: f64) -> Kilowatts {
        Kilowatts(self.0.round() * kw_per_m2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kilowatts_rescale_to_mwc() {
        assert_eq!(Kilowatts(2500.0).to_megawatts(), MegawattsPeak(2.5));
    }

    #[test]
    fn peak_power_rounds_area_first() {
        let p = SquareMeters(10.6).peak_power(0.2);
        assert!((p.value() - 2.2).abs() < 1e-12);
    }

    #[test]
    fn sum_and_display() {
        let total: MegawattsPeak = [MegawattsPeak(1.0), MegawattsPeak(2.5)].into_iter().sum();
        assert_eq!(total.to_string(), "3.50 MWc");
    }
}
