use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, ExtremityPolicy, Pline, PlineVertex, RotationDirection};
use crate::math::{Point2, Vector2, TOLERANCE};

/// A region bounded by one closed polyline of segments and arcs.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    boundary: Pline,
}

impl Polygon {
    /// Wraps a closed boundary. An open polyline whose last vertex repeats
    /// the first is closed.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NotClosed` for an open polyline that does not
    /// return to its start and `ShapeError::TooFewVertices` when the
    /// boundary cannot enclose anything.
    pub fn new(mut boundary: Pline) -> Result<Self> {
        if !boundary.closed {
            let (Some(first), Some(last)) = (boundary.vertices.first(), boundary.vertices.last())
            else {
                return Err(ShapeError::TooFewVertices(0).into());
            };
            if boundary.vertices.len() < 2 || (first.point() - last.point()).norm() > TOLERANCE {
                return Err(ShapeError::NotClosed.into());
            }
            boundary.vertices.pop();
            boundary.closed = true;
        }
        let n = boundary.vertices.len();
        let has_arc = boundary.vertices.iter().any(|v| v.bulge != 0.0);
        if n < 2 || (n == 2 && !has_arc) {
            return Err(ShapeError::TooFewVertices(n).into());
        }
        Ok(Self { boundary })
    }

    /// Straight-sided polygon through `points`, the last one repeating the first.
    ///
    /// # Errors
    ///
    /// See [`Pline::closed_from_points`].
    pub fn from_points(points: &[Point2]) -> Result<Self> {
        Pline::closed_from_points(points, TOLERANCE).map(|boundary| Self { boundary })
    }

    #[must_use]
    pub fn vertices(&self) -> &[PlineVertex] {
        &self.boundary.vertices
    }

    /// Empty when the enclosed area is no wider than a `tol` wide sliver.
    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        self.area() <= tol * self.perimeter()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.boundary.signed_area().abs()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.boundary.length()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.boundary.extent()
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        self.boundary.winding_number(p) != 0 && self.boundary.distance_to(p) > tol
    }

    #[must_use]
    pub fn is_point_on(&self, p: &Point2, tol: f64) -> bool {
        self.boundary.is_point_on(p, ExtremityPolicy::Include, tol)
    }

    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Option<Point2> {
        self.boundary.closest_point(p)
    }

    #[must_use]
    pub fn boundary(&self, direction: RotationDirection) -> Pline {
        self.boundary.oriented(direction)
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            boundary: self.boundary.translated(d),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            boundary: self.boundary.scaled(factor, origin),
        }
    }
}
