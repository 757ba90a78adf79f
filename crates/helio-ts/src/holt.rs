//! Holt's linear trend model (additive trend, no seasonality).
//!
//! ```text
//! ŷ(t)   = ℓ(t-1) + b(t-1)
//! ℓ(t)   = α·y(t) + (1 − α)·(ℓ(t-1) + b(t-1))
//! b(t)   = β·(ℓ(t) − ℓ(t-1)) + (1 − β)·b(t-1)
//! ŷ(n+h) = ℓ(n) + h·b(n)
//! ```
//!
//! α, β and the initial state (ℓ₀, b₀) are estimated by minimising the sum
//! of squared one-step errors: a coarse grid over (α, β) seeds a Nelder-Mead
//! simplex over all four parameters. β is parameterised as `α·s` with
//! `s ∈ [0, 1]`, so the trend never adapts faster than the level.
//!
//! Cumulative capacity series of small rural districts are often all zero or
//! a single step; those are not fitted at all and project flat.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::neldermead::NelderMead;
use helio_core::{HelioError, HelioResult};
use serde::Serialize;

/// Fewest observations a fit is attempted on.
pub const MIN_OBSERVATIONS: usize = 4;

const ALPHA_GRID: [f64; 6] = [0.05, 0.2, 0.4, 0.6, 0.8, 1.0];
const RATIO_GRID: [f64; 4] = [0.0, 0.25, 0.5, 1.0];
const BOUND_PENALTY: f64 = 1e4;

/// Smoothing parameters and initial state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoltParams {
    pub alpha: f64,
    pub beta: f64,
    pub level0: f64,
    pub trend0: f64,
}

/// A fitted model: parameters plus the final level and trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoltFit {
    pub params: HoltParams,
    pub level: f64,
    pub trend: f64,
    pub sse: f64,
}

impl HoltFit {
    /// `steps` values after the last observation.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        (1..=steps)
            .map(|h| self.level + h as f64 * self.trend)
            .collect()
    }
}

/// Why a series was projected flat instead of fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    TooShort,
    Constant,
    NonFinite,
    FitFailed,
}

/// Outcome of [`HoltLinear::project`].
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProjection {
    /// Projected values, floored at zero.
    pub values: Vec<f64>,
    pub fit: Option<HoltFit>,
    pub fallback: Option<Fallback>,
}

/// Estimator settings.
#[derive(Debug, Clone, Copy)]
pub struct HoltLinear {
    pub max_iters: u64,
    pub sd_tolerance: f64,
}

impl Default for HoltLinear {
    fn default() -> Self {
        Self {
            max_iters: 2000,
            sd_tolerance: 1e-12,
        }
    }
}

fn filter(series: &[f64], params: &HoltParams) -> (f64, f64, f64) {
    let mut level = params.level0;
    let mut trend = params.trend0;
    let mut sse = 0.0;
    for &obs in series {
        let error = obs - (level + trend);
        sse += error * error;
        let next_level = params.alpha * obs + (1.0 - params.alpha) * (level + trend);
        trend = params.beta * (next_level - level) + (1.0 - params.beta) * trend;
        level = next_level;
    }
    (sse, level, trend)
}

/// Map an unconstrained parameter vector `[α, s, ℓ₀, b₀]` onto valid
/// parameters plus the squared distance it lies outside the unit box.
fn decode(x: &[f64]) -> (HoltParams, f64) {
    let alpha = x[0].clamp(0.0, 1.0);
    let ratio = x[1].clamp(0.0, 1.0);
    let violation = (x[0] - alpha).powi(2) + (x[1] - ratio).powi(2);
    (
        HoltParams {
            alpha,
            beta: alpha * ratio,
            level0: x[2],
            trend0: x[3],
        },
        violation,
    )
}

struct SseObjective<'a> {
    series: &'a [f64],
}

impl CostFunction for SseObjective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let (params, violation) = decode(x);
        let (sse, _, _) = filter(self.series, &params);
        if !sse.is_finite() {
            return Ok(f64::INFINITY);
        }
        Ok(sse + BOUND_PENALTY * violation * (1.0 + sse))
    }
}

impl HoltLinear {
    /// Fit the model, failing on series that cannot support a trend.
    pub fn fit(&self, series: &[f64]) -> HelioResult<HoltFit> {
        if let Some(reason) = degenerate(series) {
            return Err(HelioError::Forecast(format!(
                "series of {} points not fitted: {reason:?}",
                series.len()
            )));
        }

        let start = grid_start(series);
        let scale = series.iter().fold(0.0_f64, |m, v| m.max(v.abs())).max(1e-3);
        let simplex = vec![
            start.clone(),
            nudge(&start, 0, -0.05),
            nudge(&start, 1, if start[1] > 0.5 { -0.1 } else { 0.1 }),
            nudge(&start, 2, 0.05 * scale),
            nudge(&start, 3, 0.01 * scale),
        ];

        let solver = NelderMead::new(simplex)
            .with_sd_tolerance(self.sd_tolerance)
            .map_err(|err| HelioError::Forecast(err.to_string()))?;
        let result = Executor::new(SseObjective { series }, solver)
            .configure(|state| state.max_iters(self.max_iters))
            .run()
            .map_err(|err| HelioError::Forecast(err.to_string()))?;

        let best = result
            .state()
            .get_best_param()
            .cloned()
            .unwrap_or(start);
        let (params, _) = decode(&best);
        let (sse, level, trend) = filter(series, &params);
        if !(sse.is_finite() && level.is_finite() && trend.is_finite()) {
            return Err(HelioError::Forecast("fit diverged".into()));
        }
        Ok(HoltFit {
            params,
            level,
            trend,
            sse,
        })
    }

    /// Project `steps` values after the series. Never fails: degenerate
    /// series and failed fits repeat the last observation.
    pub fn project(&self, series: &[f64], steps: usize) -> LinearProjection {
        let last = series
            .last()
            .copied()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
            .max(0.0);
        let flat = |fallback| LinearProjection {
            values: vec![last; steps],
            fit: None,
            fallback: Some(fallback),
        };

        if let Some(reason) = degenerate(series) {
            return flat(reason);
        }
        match self.fit(series) {
            Ok(fit) => LinearProjection {
                values: fit.forecast(steps).into_iter().map(|v| v.max(0.0)).collect(),
                fit: Some(fit),
                fallback: None,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Holt fit failed, projecting flat");
                flat(Fallback::FitFailed)
            }
        }
    }
}

fn degenerate(series: &[f64]) -> Option<Fallback> {
    if series.len() < MIN_OBSERVATIONS {
        return Some(Fallback::TooShort);
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Some(Fallback::NonFinite);
    }
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return Some(Fallback::Constant);
    }
    None
}

fn grid_start(series: &[f64]) -> Vec<f64> {
    let level0 = series[0];
    let trend0 = series[1] - series[0];
    let mut best = (f64::INFINITY, vec![0.5, 0.5, level0, trend0]);
    for &alpha in &ALPHA_GRID {
        for &ratio in &RATIO_GRID {
            let params = HoltParams {
                alpha,
                beta: alpha * ratio,
                level0,
                trend0,
            };
            let (sse, _, _) = filter(series, &params);
            if sse < best.0 {
                best = (sse, vec![alpha, ratio, level0, trend0]);
            }
        }
    }
    best.1
}

fn nudge(x: &[f64], idx: usize, delta: f64) -> Vec<f64> {
    let mut out = x.to_vec();
    out[idx] += delta;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflowing_fit_projects_flat() {
        let series: Vec<f64> = (0..8)
            .map(|t| if t % 2 == 0 { -1e200 } else { 1e200 })
            .collect();
        let model = HoltLinear {
            max_iters: 50,
            ..HoltLinear::default()
        };
        assert!(model.fit(&series).is_err());

        let projection = model.project(&series, 3);
        assert_eq!(projection.fallback, Some(Fallback::FitFailed));
        assert!(projection.fit.is_none());
        assert_eq!(projection.values, vec![1e200; 3]);
    }

    #[test]
    fn exact_line_is_reproduced() {
        let series: Vec<f64> = (0..20).map(|t| 2.0 + 0.5 * t as f64).collect();
        let projection = HoltLinear::default().project(&series, 26);
        assert!(projection.fallback.is_none());
        assert!((projection.values[0] - 12.0).abs() < 1e-2, "{}", projection.values[0]);
        assert!((projection.values[25] - 24.5).abs() < 0.1, "{}", projection.values[25]);
    }

    #[test]
    fn fitted_parameters_stay_in_bounds() {
        let series = [0.0, 0.1, 0.1, 0.4, 0.9, 1.0, 1.8, 2.9, 3.0, 4.4, 6.1, 8.0];
        let fit = HoltLinear::default().fit(&series).unwrap();
        assert!((0.0..=1.0).contains(&fit.params.alpha));
        assert!(fit.params.beta >= 0.0 && fit.params.beta <= fit.params.alpha);
        assert!(fit.sse.is_finite());
    }

    #[test]
    fn all_zero_series_projects_flat_zero() {
        let projection = HoltLinear::default().project(&[0.0; 20], 26);
        assert_eq!(projection.fallback, Some(Fallback::Constant));
        assert!(projection.values.iter().all(|v| *v == 0.0));
        assert_eq!(projection.values.len(), 26);
    }

    #[test]
    fn short_series_projects_last_value() {
        let projection = HoltLinear::default().project(&[1.0, 2.0], 3);
        assert_eq!(projection.fallback, Some(Fallback::TooShort));
        assert_eq!(projection.values, vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn constant_series_is_not_fitted() {
        assert!(HoltLinear::default().fit(&[3.0; 10]).is_err());
        let projection = HoltLinear::default().project(&[3.0; 10], 2);
        assert_eq!(projection.values, vec![3.0, 3.0]);
    }

    #[test]
    fn non_finite_values_fall_back() {
        let projection = HoltLinear::default().project(&[0.0, 1.0, f64::NAN, 2.0, 3.0], 2);
        assert_eq!(projection.fallback, Some(Fallback::NonFinite));
        assert_eq!(projection.values, vec![3.0, 3.0]);
    }

    #[test]
    fn single_late_step_never_goes_negative() {
        let mut series = vec![0.0; 19];
        series.push(5.0);
        let projection = HoltLinear::default().project(&series, 26);
        assert!(projection.values.iter().all(|v| *v >= 0.0));
    }
}
