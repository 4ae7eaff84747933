use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Point2, Vector2};

/// Relative slack accepted when checking that the corners form a rectangle.
const SHAPE_EPS: f64 = 1e-9;

/// A rectangle with arbitrary orientation, stored as its four corners in
/// boundary order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRectangle {
    corners: [Point2; 4],
}

impl OrientedRectangle {
    /// # Errors
    ///
    /// Returns `ShapeError::NotRectangular` unless consecutive sides are
    /// perpendicular and opposite sides are equal.
    pub fn new(corners: [Point2; 4]) -> Result<Self> {
        let [p0, p1, p2, p3] = corners;
        let side_a = p1 - p0;
        let side_b = p3 - p0;
        let scale = side_a.norm().max(side_b.norm()).max(f64::MIN_POSITIVE);
        let closes = ((p2 - p1) - side_b).norm() <= SHAPE_EPS * scale;
        let square_corner = side_a.dot(&side_b).abs() <= SHAPE_EPS * scale * scale;
        if !(closes && square_corner) {
            return Err(ShapeError::NotRectangular.into());
        }
        Ok(Self { corners })
    }

    #[must_use]
    pub fn corners(&self) -> &[Point2; 4] {
        &self.corners
    }

    fn sides(&self) -> (Vector2, Vector2) {
        (
            self.corners[1] - self.corners[0],
            self.corners[3] - self.corners[0],
        )
    }

    /// Empty when two adjacent corners coincide.
    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        let (a, b) = self.sides();
        a.norm() <= tol || b.norm() <= tol
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        let (a, b) = self.sides();
        a.norm() * b.norm()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        let (a, b) = self.sides();
        2.0 * (a.norm() + b.norm())
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::from_points(&self.corners)
    }

    /// Strict interior test in the rectangle's own axes.
    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        if self.is_empty(tol) {
            return false;
        }
        let (a, b) = self.sides();
        let (len_a, len_b) = (a.norm(), b.norm());
        let d = p - self.corners[0];
        let s = d.dot(&a) / len_a;
        let t = d.dot(&b) / len_b;
        s > tol && s < len_a - tol && t > tol && t < len_b - tol
    }

    #[must_use]
    pub fn boundary(&self, direction: RotationDirection) -> Pline {
        Pline::from_points(&self.corners, true).oriented(direction)
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            corners: self.corners.map(|c| c + d),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            corners: self.corners.map(|c| origin + (c - origin) * factor),
        }
    }
}
