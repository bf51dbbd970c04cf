//! Least-squares fits of the feedforward model.
//!
//! ```text
//! ramp:   power            = kV·v + kStatic          (kStatic = 0 without intercept)
//! accel:  power − kV·v − kStatic·sign(v) = kA·a      (through the origin)
//! ```
//!
//! Velocity and acceleration come from numerical differentiation of the
//! sampled positions: the derivative of the quadratic through each point and
//! its two neighbours (one-sided at both ends), which is exact for the
//! quadratic position trace of a linear velocity ramp.

use drivetune_common::series::{AccelResult, RampResult, SampleSeries};
use tracing::debug;

use crate::error::FitError;

/// Fewest samples the differentiation stencil works with.
pub const MIN_SAMPLES: usize = 3;

/// Slope, intercept and R² of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_square: f64,
}

/// Fit kV (and kStatic when `fit_intercept`) from ramp-phase samples.
pub fn fit_ramp(series: &SampleSeries, fit_intercept: bool) -> Result<RampResult, FitError> {
    check_series(series)?;
    let velocities = numerical_derivative(series.times(), series.positions())?;

    let fit = if fit_intercept {
        fit_line(&velocities, series.powers())?
    } else {
        fit_line_through_origin(&velocities, series.powers())?
    };

    let result = RampResult {
        kv: fit.slope,
        k_static: fit.intercept,
        r_square: fit.r_square,
    };
    debug!("Ramp fit over {} samples: {:?}", series.len(), result);
    Ok(result)
}

/// Fit kA from constant-power samples, removing the ramp model's share of the power first.
pub fn fit_accel(series: &SampleSeries, ramp: RampResult) -> Result<AccelResult, FitError> {
    check_series(series)?;
    let velocities = numerical_derivative(series.times(), series.positions())?;
    let accelerations = numerical_derivative(series.times(), &velocities)?;

    let residual_power: Vec<f64> = series
        .powers()
        .iter()
        .zip(&velocities)
        .map(|(&power, &v)| power - ramp.kv * v - ramp.k_static * sign(v))
        .collect();

    let fit = fit_line_through_origin(&accelerations, &residual_power)?;
    let result = AccelResult {
        ka: fit.slope,
        r_square: fit.r_square,
    };
    debug!("Accel fit over {} samples: {:?}", series.len(), result);
    Ok(result)
}

/// `dy/dx` at every sample.
///
/// # Errors
/// - `FitError::InsufficientSamples` for fewer than [`MIN_SAMPLES`] points
/// - `FitError::MismatchedPairs` when `x` and `y` differ in length
/// - `FitError::DegenerateInput` for repeated `x` values or non-finite results
pub fn numerical_derivative(x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError> {
    let n = x.len();
    if n < MIN_SAMPLES {
        return Err(FitError::InsufficientSamples {
            got: n,
            needed: MIN_SAMPLES,
        });
    }
    if y.len() != n {
        return Err(FitError::MismatchedPairs { x: n, y: y.len() });
    }

    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        // Stencil start: clamp so the three points stay in range.
        let s = i.saturating_sub(1).min(n - MIN_SAMPLES);
        let d = quadratic_slope(
            [x[s], x[s + 1], x[s + 2]],
            [y[s], y[s + 1], y[s + 2]],
            x[i],
        );
        if !d.is_finite() {
            return Err(FitError::DegenerateInput("repeated or non-finite sample times"));
        }
        out.push(d);
    }
    Ok(out)
}

/// Slope at `at` of the quadratic through three points.
#[inline]
fn quadratic_slope(x: [f64; 3], y: [f64; 3], at: f64) -> f64 {
    let [x0, x1, x2] = x;
    let l0 = ((at - x1) + (at - x2)) / ((x0 - x1) * (x0 - x2));
    let l1 = ((at - x0) + (at - x2)) / ((x1 - x0) * (x1 - x2));
    let l2 = ((at - x0) + (at - x1)) / ((x2 - x0) * (x2 - x1));
    y[0] * l0 + y[1] * l1 + y[2] * l2
}

/// Ordinary least squares `y = slope·x + intercept`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit, FitError> {
    check_pairs(x, y)?;
    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sxx += (xi - mean_x) * (xi - mean_x);
        sxy += (xi - mean_x) * (yi - mean_y);
    }
    if sxx <= 0.0 {
        return Err(FitError::DegenerateInput("regressor has zero variance"));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Ok(LineFit {
        slope,
        intercept,
        r_square: r_square(x, y, slope, intercept),
    })
}

/// Least squares `y = slope·x`.
pub fn fit_line_through_origin(x: &[f64], y: &[f64]) -> Result<LineFit, FitError> {
    check_pairs(x, y)?;
    let sxx: f64 = x.iter().map(|xi| xi * xi).sum();
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    if sxx <= 0.0 {
        return Err(FitError::DegenerateInput("regressor is identically zero"));
    }

    let slope = sxy / sxx;
    Ok(LineFit {
        slope,
        intercept: 0.0,
        r_square: r_square(x, y, slope, 0.0),
    })
}

/// `1 − SS_res / SS_tot`; a perfect fit of constant data counts as 1.
fn r_square(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    let mean_y = y.iter().sum::<f64>() / y.len() as f64;
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let e = yi - (slope * xi + intercept);
        ss_res += e * e;
        ss_tot += (yi - mean_y) * (yi - mean_y);
    }
    if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    }
}

fn check_series(series: &SampleSeries) -> Result<(), FitError> {
    let (t, p, u) = (
        series.times().len(),
        series.positions().len(),
        series.powers().len(),
    );
    if t != p || t != u {
        return Err(FitError::MismatchedLengths {
            times: t,
            positions: p,
            powers: u,
        });
    }
    if t < MIN_SAMPLES {
        return Err(FitError::InsufficientSamples {
            got: t,
            needed: MIN_SAMPLES,
        });
    }
    Ok(())
}

fn check_pairs(x: &[f64], y: &[f64]) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::MismatchedPairs {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(FitError::InsufficientSamples {
            got: x.len(),
            needed: 2,
        });
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::DegenerateInput("non-finite sample value"));
    }
    Ok(())
}

/// Sign with `sign(0) = 0`.
#[inline]
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
