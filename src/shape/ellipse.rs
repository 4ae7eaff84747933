use std::f64::consts::{PI, TAU};

use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Point2, Vector2};

/// Largest chord-to-curve gap of the boundary approximation, relative to
/// the semi-major axis.
const CHORD_FRACTION: f64 = 1e-4;
const MIN_BOUNDARY_VERTICES: u32 = 32;
const MAX_BOUNDARY_VERTICES: u32 = 4096;

/// Axis-aligned ellipse inscribed in a rectangle.
///
/// Queries on the ellipse itself (`area`, `perimeter`, `is_point_in`) are
/// exact. Boolean operations see the inscribed polygon from `boundary`
/// instead, whose chords stay within `CHORD_FRACTION` of the semi-major axis
/// of the curve. Areas of boolean results involving an ellipse therefore fall
/// short of the exact value by up to about `1e-4` relative, which can exceed
/// the shape tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    center: Point2,
    semi_x: f64,
    semi_y: f64,
}

impl Ellipse {
    /// The ellipse inscribed in the rectangle with the given opposite corners.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NonPositiveRadius` if the rectangle is flat.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        let semi_x = (x1 - x0).abs() * 0.5;
        let semi_y = (y1 - y0).abs() * 0.5;
        let smallest = semi_x.min(semi_y);
        if !(smallest > 0.0 && semi_x.is_finite() && semi_y.is_finite()) {
            return Err(ShapeError::NonPositiveRadius(smallest).into());
        }
        Ok(Self {
            center: Point2::new((x0 + x1) * 0.5, (y0 + y1) * 0.5),
            semi_x,
            semi_y,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    #[must_use]
    pub fn semi_major(&self) -> f64 {
        self.semi_x.max(self.semi_y)
    }

    #[must_use]
    pub fn semi_minor(&self) -> f64 {
        self.semi_x.min(self.semi_y)
    }

    /// The two foci, on the major axis.
    #[must_use]
    pub fn foci(&self) -> (Point2, Point2) {
        let c = (self.semi_major().powi(2) - self.semi_minor().powi(2)).sqrt();
        let offset = if self.semi_x >= self.semi_y {
            Vector2::new(c, 0.0)
        } else {
            Vector2::new(0.0, c)
        };
        (self.center - offset, self.center + offset)
    }

    /// The circumscribing rectangle.
    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.center.x - self.semi_x,
            self.center.y - self.semi_y,
            self.center.x + self.semi_x,
            self.center.y + self.semi_y,
        )
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        PI * self.semi_x * self.semi_y
    }

    /// Ramanujan's second approximation of the circumference.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let (a, b) = (self.semi_x, self.semi_y);
        let h = ((a - b) / (a + b)).powi(2);
        PI * (a + b) * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        let u = (p.x - self.center.x) / self.semi_x;
        let v = (p.y - self.center.y) / self.semi_y;
        u * u + v * v < 1.0 && self.distance_to_boundary(p) > tol
    }

    #[must_use]
    pub fn distance_to_boundary(&self, p: &Point2) -> f64 {
        (p - self.closest_point(p)).norm()
    }

    /// Exact closest point on the ellipse.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Point2 {
        let q = p - self.center;
        let swap = self.semi_y > self.semi_x;
        let (e0, e1, y0, y1) = if swap {
            (self.semi_y, self.semi_x, q.y, q.x)
        } else {
            (self.semi_x, self.semi_y, q.x, q.y)
        };
        let (x0, x1) = closest_in_first_quadrant(e0, e1, y0.abs(), y1.abs());
        let (x0, x1) = (x0.copysign(y0), x1.copysign(y1));
        let local = if swap {
            Vector2::new(x1, x0)
        } else {
            Vector2::new(x0, x1)
        };
        self.center + local
    }

    /// Curvature of the boundary at the point of it closest to `p`.
    #[must_use]
    pub fn curvature_at(&self, p: &Point2) -> f64 {
        let on = self.closest_point(p) - self.center;
        let t = (on.y / self.semi_y).atan2(on.x / self.semi_x);
        let (s, c) = t.sin_cos();
        let (a, b) = (self.semi_x, self.semi_y);
        a * b / (a * a * s * s + b * b * c * c).powf(1.5)
    }

    /// Polygon through points of the ellipse, dense enough that chords stay
    /// within `tol` (or a small fraction of the size) of the curve.
    #[must_use]
    pub fn boundary(&self, direction: RotationDirection, tol: f64) -> Pline {
        let n = self.vertex_count(tol);
        let points: Vec<Point2> = (0..n)
            .map(|i| {
                let t = TAU * f64::from(i) / f64::from(n);
                Point2::new(
                    self.center.x + self.semi_x * t.cos(),
                    self.center.y + self.semi_y * t.sin(),
                )
            })
            .collect();
        Pline::from_points(&points, true).oriented(direction)
    }

    fn vertex_count(&self, tol: f64) -> u32 {
        let gap = tol.max(CHORD_FRACTION * self.semi_major());
        // Sagitta bound with the largest radius of curvature.
        let radius = self.semi_major().powi(2) / self.semi_minor();
        let step = 2.0 * (1.0 - (gap / radius).min(1.0)).acos();
        if step <= 0.0 {
            return MAX_BOUNDARY_VERTICES;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (TAU / step).ceil() as u32;
        n.clamp(MIN_BOUNDARY_VERTICES, MAX_BOUNDARY_VERTICES)
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            center: self.center + d,
            ..*self
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            center: origin + (self.center - origin) * factor,
            semi_x: self.semi_x * factor.abs(),
            semi_y: self.semi_y * factor.abs(),
        }
    }
}

/// Closest point of the ellipse `(x/e0)^2 + (y/e1)^2 = 1`, `e0 >= e1 > 0`, to
/// a query point with non-negative coordinates.
fn closest_in_first_quadrant(e0: f64, e1: f64, y0: f64, y1: f64) -> (f64, f64) {
    if y1 > 0.0 {
        if y0 > 0.0 {
            let z0 = y0 / e0;
            let z1 = y1 / e1;
            let g = z0 * z0 + z1 * z1 - 1.0;
            if g == 0.0 {
                return (y0, y1);
            }
            let r0 = (e0 / e1).powi(2);
            let s = bisect_root(r0, z0, z1, g);
            return (r0 * y0 / (s + r0), y1 / (s + 1.0));
        }
        return (0.0, e1);
    }
    let numer = e0 * y0;
    let denom = e0 * e0 - e1 * e1;
    if numer < denom {
        let ratio = numer / denom;
        return (e0 * ratio, e1 * (1.0 - ratio * ratio).max(0.0).sqrt());
    }
    (e0, 0.0)
}

fn bisect_root(r0: f64, z0: f64, z1: f64, g: f64) -> f64 {
    let n0 = r0 * z0;
    let mut s0 = z1 - 1.0;
    let mut s1 = if g < 0.0 { 0.0 } else { n0.hypot(z1) - 1.0 };
    let mut s = 0.0;
    for _ in 0..200 {
        s = 0.5 * (s0 + s1);
        if s == s0 || s == s1 {
            break;
        }
        let ratio0 = n0 / (s + r0);
        let ratio1 = z1 / (s + 1.0);
        let value = ratio0 * ratio0 + ratio1 * ratio1 - 1.0;
        if value > 0.0 {
            s0 = s;
        } else if value < 0.0 {
            s1 = s;
        } else {
            break;
        }
    }
    s
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ellipse() -> Ellipse {
        Ellipse::new(-2.0, -1.0, 2.0, 1.0).unwrap()
    }

    #[test]
    fn flat_rectangle_is_rejected() {
        assert!(Ellipse::new(0.0, 0.0, 2.0, 0.0).is_err());
    }

    #[test]
    fn foci_and_axes() {
        let e = ellipse();
        let (f0, f1) = e.foci();
        let c = 3.0_f64.sqrt();
        assert!((f0 - Point2::new(-c, 0.0)).norm() < 1e-12);
        assert!((f1 - Point2::new(c, 0.0)).norm() < 1e-12);
        assert!((e.semi_major() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn perimeter_of_circle_is_exact() {
        let e = Ellipse::new(-1.0, -1.0, 1.0, 1.0).unwrap();
        assert!((e.perimeter() - TAU).abs() < 1e-12);
        // Known value for a = 2, b = 1: 9.688448...
        assert!((ellipse().perimeter() - 9.688_448_220_5).abs() < 1e-6);
    }

    #[test]
    fn closest_point_on_axes_and_off() {
        let e = ellipse();
        let q = e.closest_point(&Point2::new(0.0, 5.0));
        assert!((q - Point2::new(0.0, 1.0)).norm() < 1e-12);
        let q = e.closest_point(&Point2::new(-5.0, 0.0));
        assert!((q - Point2::new(-2.0, 0.0)).norm() < 1e-12);
        let q = e.closest_point(&Point2::new(1.5, -1.5));
        let on = (q.x / 2.0).powi(2) + q.y.powi(2);
        assert!((on - 1.0).abs() < 1e-10);
        assert!(q.x > 0.0 && q.y < 0.0);
    }

    #[test]
    fn curvature_at_vertices() {
        let e = ellipse();
        // a / b^2 at the ends of the major axis, b / a^2 at the minor ones.
        assert!((e.curvature_at(&Point2::new(3.0, 0.0)) - 2.0).abs() < 1e-9);
        assert!((e.curvature_at(&Point2::new(0.0, 3.0)) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn boundary_area_close_to_closed_form() {
        let e = ellipse();
        let b = e.boundary(RotationDirection::CounterClockwise, 1e-10);
        assert!((b.signed_area() - e.area()).abs() / e.area() < 1e-3);
        assert!(b.signed_area() > 0.0);
    }

    #[test]
    fn point_in_excludes_boundary() {
        let e = ellipse();
        assert!(e.is_point_in(&Point2::new(1.0, 0.5), 1e-10));
        assert!(!e.is_point_in(&Point2::new(2.0, 0.0), 1e-10));
        assert!(!e.is_point_in(&Point2::new(1.9, 0.9), 1e-10));
    }
}
