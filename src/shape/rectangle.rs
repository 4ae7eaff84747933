use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Point2, Vector2};

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rectangle {
    /// Creates a rectangle from two opposite corners in any order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x_min: x0.min(x1),
            y_min: y0.min(y1),
            x_max: x0.max(x1),
            y_max: y0.max(y1),
        }
    }

    #[must_use]
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    #[must_use]
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    #[must_use]
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    #[must_use]
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        self.width() <= tol || self.height() <= tol
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::new(self.x_min, self.y_min, self.x_max, self.y_max)
    }

    /// Strict interior test.
    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        p.x > self.x_min + tol
            && p.x < self.x_max - tol
            && p.y > self.y_min + tol
            && p.y < self.y_max - tol
    }

    /// Corners, counter-clockwise from the lower left one.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [
            Point2::new(self.x_min, self.y_min),
            Point2::new(self.x_max, self.y_min),
            Point2::new(self.x_max, self.y_max),
            Point2::new(self.x_min, self.y_max),
        ]
    }

    #[must_use]
    pub fn boundary(&self, direction: RotationDirection) -> Pline {
        let mut corners = self.corners();
        if direction == RotationDirection::Clockwise {
            corners.reverse();
        }
        Pline::from_points(&corners, true)
    }

    /// Direct interval intersection; `None` when the overlap has no area.
    #[must_use]
    pub fn intersect_rectangle(&self, other: &Self, tol: f64) -> Option<Self> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        (x_max - x_min > tol && y_max - y_min > tol).then_some(Self {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self::new(self.x_min + d.x, self.y_min + d.y, self.x_max + d.x, self.y_max + d.y)
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        let map = |v: f64, o: f64| o + (v - o) * factor;
        Self::new(
            map(self.x_min, origin.x),
            map(self.y_min, origin.y),
            map(self.x_max, origin.x),
            map(self.y_max, origin.y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_ordered() {
        let r = Rectangle::new(10.0, 10.0, 0.0, 5.0);
        assert!((r.x_min() - 0.0).abs() < 1e-15 && (r.y_max() - 10.0).abs() < 1e-15);
        assert!((r.area() - 50.0).abs() < 1e-12);
        assert!((r.perimeter() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_of_rectangles() {
        let a = Rectangle::new(0.0, 0.0, 10.0, 10.0);
        let b = Rectangle::new(5.0, 5.0, 15.0, 15.0);
        let r = a.intersect_rectangle(&b, 1e-10);
        assert_eq!(r, Some(Rectangle::new(5.0, 5.0, 10.0, 10.0)));
        let touching = Rectangle::new(10.0, 0.0, 12.0, 10.0);
        assert_eq!(a.intersect_rectangle(&touching, 1e-10), None);
    }

    #[test]
    fn boundary_orientation() {
        let r = Rectangle::new(0.0, 0.0, 2.0, 1.0);
        assert!((r.boundary(RotationDirection::CounterClockwise).signed_area() - 2.0).abs() < 1e-12);
        assert!((r.boundary(RotationDirection::Clockwise).signed_area() + 2.0).abs() < 1e-12);
    }

    #[test]
    fn boundary_points_are_not_in() {
        let r = Rectangle::new(0.0, 0.0, 2.0, 1.0);
        assert!(r.is_point_in(&Point2::new(1.0, 0.5), 1e-10));
        assert!(!r.is_point_in(&Point2::new(2.0, 0.5), 1e-10));
    }

    #[test]
    fn negative_scale_reorders() {
        let r = Rectangle::new(0.0, 0.0, 2.0, 1.0).scaled(-1.0, &Point2::origin());
        assert_eq!(r, Rectangle::new(-2.0, -1.0, 0.0, 0.0));
    }
}
