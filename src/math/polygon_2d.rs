use std::f64::consts::TAU;

use super::{cross_2d, Point2};

/// Computes the signed area of a polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Signed angle subtended at `p` by the chord `a`→`b`, in `(-π, π]`.
#[must_use]
pub fn subtended_angle(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let va = a - p;
    let vb = b - p;
    cross_2d(&va, &vb).atan2(va.dot(&vb))
}

/// Winding number of a closed straight-edged polygon around `p`.
#[must_use]
pub fn winding_number(points: &[Point2], p: &Point2) -> i32 {
    let n = points.len();
    if n < 3 {
        return 0;
    }
    let total: f64 = (0..n)
        .map(|i| subtended_angle(p, &points[i], &points[(i + 1) % n]))
        .sum();
    #[allow(clippy::cast_possible_truncation)]
    let winding = (total / TAU).round() as i32;
    winding
}
