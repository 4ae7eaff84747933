use std::f64::consts::{PI, TAU};

use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, Pline, PlineVertex, RotationDirection};
use crate::math::{Point2, Vector2};

/// A disk bounded by a circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Point2,
    radius: f64,
}

impl Circle {
    /// # Errors
    ///
    /// Returns `ShapeError::NonPositiveRadius` if `radius <= 0` or is not finite.
    pub fn new(center: Point2, radius: f64) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(ShapeError::NonPositiveRadius(radius).into());
        }
        Ok(Self { center, radius })
    }

    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        TAU * self.radius
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::new(
            self.center.x - self.radius,
            self.center.y - self.radius,
            self.center.x + self.radius,
            self.center.y + self.radius,
        )
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        (p - self.center).norm() < self.radius - tol
    }

    #[must_use]
    pub fn distance_to_boundary(&self, p: &Point2) -> f64 {
        ((p - self.center).norm() - self.radius).abs()
    }

    /// Closest point on the circle; the center maps to the rightmost point.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Point2 {
        let d = p - self.center;
        let n = d.norm();
        if n == 0.0 {
            return self.center + Vector2::new(self.radius, 0.0);
        }
        self.center + d * (self.radius / n)
    }

    /// Two semicircular arcs starting at the rightmost point.
    #[must_use]
    pub fn boundary(&self, direction: RotationDirection) -> Pline {
        let bulge = match direction {
            RotationDirection::CounterClockwise => 1.0,
            RotationDirection::Clockwise => -1.0,
        };
        let (cx, cy, r) = (self.center.x, self.center.y, self.radius);
        Pline {
            vertices: vec![
                PlineVertex::new(cx + r, cy, bulge),
                PlineVertex::new(cx - r, cy, bulge),
            ],
            closed: true,
        }
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            center: self.center + d,
            radius: self.radius,
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            center: origin + (self.center - origin) * factor,
            radius: self.radius * factor.abs(),
        }
    }
}
