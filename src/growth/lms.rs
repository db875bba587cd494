//! The LMS (power-normal) transform and standard-normal percentiles.
//!
//! `score` and `value` are algebraic inverses for any valid parameter set
//! with `S != 0`; when `|L|` vanishes the power form degenerates and the
//! log form is used instead. All math is f64 so results are reproducible
//! across platforms.

use serde::{Deserialize, Serialize};

/// Distribution parameters at one age point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lms {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

/// Threshold below which L is treated as zero and the log form applies.
const L_EPS: f64 = 1e-12;

/// Standardized score of measurement `x` under the LMS distribution.
pub fn score(x: f64, lms: Lms) -> f64 {
    let Lms { l, m, s } = lms;
    if l.abs() < L_EPS {
        (x / m).ln() / s
    } else {
        ((x / m).powf(l) - 1.0) / (l * s)
    }
}

/// Measurement corresponding to standardized score `z` (inverse of [`score`]).
pub fn value(z: f64, lms: Lms) -> f64 {
    let Lms { l, m, s } = lms;
    if l.abs() < L_EPS {
        m * (s * z).exp()
    } else {
        m * (1.0 + l * s * z).powf(1.0 / l)
    }
}

/// Cumulative-probability rank of `z` under the standard normal, in percent.
pub fn percentile(z: f64) -> f64 {
    normal_cdf(z) * 100.0
}

/// Standard-normal CDF via the error function.
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

// Abramowitz & Stegun 7.1.26 rational approximation, |error| < 1.5e-7.
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}
