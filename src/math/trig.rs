//! Angle bookkeeping and the shared unit-circle quadratic solver.

use std::f64::consts::{PI, TAU};

/// Solves `alpha + beta * c + gamma * s = 0` subject to `c² + s² = 1`.
///
/// Returns zero, one (tangency) or two `(c, s)` pairs. `tol` is the residual
/// on the squared half-chord below which the line is considered tangent; it
/// also rejects near-misses caused by numerical noise.
#[must_use]
pub fn solve_unit_quadratic(alpha: f64, beta: f64, gamma: f64, tol: f64) -> Vec<(f64, f64)> {
    let r2 = beta * beta + gamma * gamma;
    let scale = r2.max(alpha * alpha);
    if scale == 0.0 || r2 <= tol * scale {
        return Vec::new();
    }
    let lambda = -alpha / r2;
    let c0 = lambda * beta;
    let s0 = lambda * gamma;
    let h2 = 1.0 - alpha * alpha / r2;
    if h2 < -tol {
        return Vec::new();
    }
    if h2 <= tol {
        let len = c0.hypot(s0);
        return vec![(c0 / len, s0 / len)];
    }
    let h = h2.sqrt() / r2.sqrt();
    vec![
        (c0 - h * gamma, s0 + h * beta),
        (c0 + h * gamma, s0 - h * beta),
    ]
}

/// Brings an angle into `(-π, π]`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}

/// True if `sweep` covers the whole circle.
#[must_use]
pub fn is_full_sweep(sweep: f64) -> bool {
    sweep.abs() >= TAU - 1e-10
}

/// Converts an absolute angle to a fraction of the sweep starting at `start`.
///
/// Returns `None` if the angle is not within the swept range (with `eps`
/// radians of slack at both ends). Full sweeps accept every angle.
#[must_use]
pub fn sweep_fraction(angle: f64, start: f64, sweep: f64, eps: f64) -> Option<f64> {
    if sweep == 0.0 {
        return None;
    }
    let mut delta = (angle - start) * sweep.signum();
    delta = delta.rem_euclid(TAU);
    let span = sweep.abs();
    if delta > span + eps && delta > TAU - eps {
        // Just short of the start when walking the sweep direction.
        delta -= TAU;
    }
    if is_full_sweep(sweep) {
        return Some((delta / span).clamp(0.0, 1.0));
    }
    if delta <= span + eps {
        Some((delta / span).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// True if `angle` lies within `[start, start + sweep]` (either sweep sign).
#[must_use]
pub fn angle_in_sweep(angle: f64, start: f64, sweep: f64, eps: f64) -> bool {
    sweep_fraction(angle, start, sweep, eps).is_some()
}
