/// 2D arc/bulge math utilities.
///
/// Bulge convention: `bulge = tan(sweep_angle / 4)`.
/// - `bulge = 0`: straight line
/// - `bulge > 0`: counter-clockwise arc
/// - `bulge < 0`: clockwise arc
/// - `|bulge| = 1`: semicircle
use std::f64::consts::{FRAC_PI_2, PI};

use super::trig::angle_in_sweep;

/// Bulges smaller than this are straight segments.
pub const MIN_BULGE: f64 = 1e-12;

/// Center-radius-angle form of a bulge arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub start_angle: f64,
    pub sweep: f64,
}

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `None` for zero-length chords and straight segments.
#[must_use]
pub fn arc_from_bulge(x0: f64, y0: f64, x1: f64, y1: f64, bulge: f64) -> Option<ArcGeometry> {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let chord_len = (dx * dx + dy * dy).sqrt();

    if chord_len < 1e-12 || bulge.abs() < MIN_BULGE {
        return None;
    }

    // Distance from chord midpoint to center, in half-chord units.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mx = (x0 + x1) * 0.5;
    let my = (y0 + y1) * 0.5;

    // For positive bulge the center is left of the chord.
    let nx = -dy / chord_len;
    let ny = dx / chord_len;

    let cx = mx + sagitta_ratio * (chord_len * 0.5) * nx;
    let cy = my + sagitta_ratio * (chord_len * 0.5) * ny;

    // r = d*(1+b²)/(4*|b|) derived from r = d/(2*sin(θ/2)) with θ=4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());

    Some(ArcGeometry {
        cx,
        cy,
        radius,
        start_angle: (y0 - cy).atan2(x0 - cx),
        sweep: 4.0 * bulge.atan(),
    })
}

/// Bulge of an arc with the given signed sweep.
#[must_use]
pub fn bulge_from_sweep(sweep: f64) -> f64 {
    (sweep / 4.0).tan()
}

impl ArcGeometry {
    /// Evaluates a point on the arc at parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> (f64, f64) {
        let angle = self.start_angle + self.sweep * t;
        (
            self.cx + self.radius * angle.cos(),
            self.cy + self.radius * angle.sin(),
        )
    }

    /// Unit tangent at parameter `t`, pointing in the direction of increasing `t`.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> (f64, f64) {
        let angle = self.start_angle + self.sweep * t;
        let sign = self.sweep.signum();
        (-sign * angle.sin(), sign * angle.cos())
    }

    /// Arc length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Area between the chord and the arc.
    #[must_use]
    pub fn segment_area(&self) -> f64 {
        let theta = self.sweep.abs();
        0.5 * self.radius * self.radius * (theta - theta.sin())
    }

    /// Axis-aligned bounds `(x_min, y_min, x_max, y_max)`.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.point_at(0.0);
        let (x1, y1) = self.point_at(1.0);
        let mut b = (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1));
        for k in 0..4 {
            let angle = f64::from(k) * FRAC_PI_2 - PI;
            if angle_in_sweep(angle, self.start_angle, self.sweep, 0.0) {
                let px = self.cx + self.radius * angle.cos();
                let py = self.cy + self.radius * angle.sin();
                b = (b.0.min(px), b.1.min(py), b.2.max(px), b.3.max(py));
            }
        }
        b
    }
}
