use crate::error::Result;
use crate::geometry::{Extent, ExtremityPolicy, Pline, RotationDirection};
use crate::math::transform_2d::{is_axis_preserving, is_similarity, similarity_scale};
use crate::math::{Matrix3, Point2, Vector2};
use crate::operations::Region;

use super::circle::Circle;
use super::ellipse::Ellipse;
use super::oriented_rectangle::OrientedRectangle;
use super::polygon::Polygon;
use super::rectangle::Rectangle;

/// A region with a single boundary and no holes, or one of the two
/// sentinels.
#[derive(Debug, Clone, PartialEq)]
pub enum SimpleShape {
    /// Contains no point.
    Void,
    /// Contains every point; has no boundary.
    Universe,
    Rectangle(Rectangle),
    Circle(Circle),
    Ellipse(Ellipse),
    OrientedRectangle(OrientedRectangle),
    Polygon(Polygon),
}

impl SimpleShape {
    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        match self {
            Self::Void => true,
            Self::Universe => false,
            Self::Rectangle(r) => r.is_empty(tol),
            Self::Circle(c) => c.radius() <= tol,
            Self::Ellipse(e) => e.semi_minor() <= tol,
            Self::OrientedRectangle(r) => r.is_empty(tol),
            Self::Polygon(p) => p.is_empty(tol),
        }
    }

    #[must_use]
    pub fn is_universe(&self) -> bool {
        matches!(self, Self::Universe)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Void => 0.0,
            Self::Universe => f64::INFINITY,
            Self::Rectangle(r) => r.area(),
            Self::Circle(c) => c.area(),
            Self::Ellipse(e) => e.area(),
            Self::OrientedRectangle(r) => r.area(),
            Self::Polygon(p) => p.area(),
        }
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        match self {
            Self::Void => 0.0,
            Self::Universe => f64::INFINITY,
            Self::Rectangle(r) => r.perimeter(),
            Self::Circle(c) => c.perimeter(),
            Self::Ellipse(e) => e.perimeter(),
            Self::OrientedRectangle(r) => r.perimeter(),
            Self::Polygon(p) => p.perimeter(),
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        match self {
            Self::Void => Extent::empty(),
            Self::Universe => Extent::infinite(),
            Self::Rectangle(r) => r.extent(),
            Self::Circle(c) => c.extent(),
            Self::Ellipse(e) => e.extent(),
            Self::OrientedRectangle(r) => r.extent(),
            Self::Polygon(p) => p.extent(),
        }
    }

    /// Strict interior test; boundary points within `tol` are not in.
    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        match self {
            Self::Void => false,
            Self::Universe => true,
            Self::Rectangle(r) => r.is_point_in(p, tol),
            Self::Circle(c) => c.is_point_in(p, tol),
            Self::Ellipse(e) => e.is_point_in(p, tol),
            Self::OrientedRectangle(r) => r.is_point_in(p, tol),
            Self::Polygon(poly) => poly.is_point_in(p, tol),
        }
    }

    /// True if `p` lies within `tol` of the boundary. Closed boundaries have
    /// no extremities, so the policy never excludes a point here.
    #[must_use]
    pub fn is_point_on(&self, p: &Point2, tol: f64) -> bool {
        match self {
            Self::Void | Self::Universe => false,
            Self::Circle(c) => c.distance_to_boundary(p) <= tol,
            Self::Ellipse(e) => e.distance_to_boundary(p) <= tol,
            Self::Polygon(poly) => poly.is_point_on(p, tol),
            _ => self
                .boundary(RotationDirection::CounterClockwise, tol)
                .is_some_and(|b| b.is_point_on(p, ExtremityPolicy::Include, tol)),
        }
    }

    #[must_use]
    pub fn closest_point(&self, p: &Point2, tol: f64) -> Option<Point2> {
        match self {
            Self::Void | Self::Universe => None,
            Self::Circle(c) => Some(c.closest_point(p)),
            Self::Ellipse(e) => Some(e.closest_point(p)),
            Self::Polygon(poly) => poly.closest_point(p),
            _ => self
                .boundary(RotationDirection::CounterClockwise, tol)
                .and_then(|b| b.closest_point(p)),
        }
    }

    /// The boundary walked in `direction`; `None` for the sentinels. Curves
    /// with no exact bulge form are approximated within `tol`.
    #[must_use]
    pub fn boundary(&self, direction: RotationDirection, tol: f64) -> Option<Pline> {
        match self {
            Self::Void | Self::Universe => None,
            Self::Rectangle(r) => Some(r.boundary(direction)),
            Self::Circle(c) => Some(c.boundary(direction)),
            Self::Ellipse(e) => Some(e.boundary(direction, tol)),
            Self::OrientedRectangle(r) => Some(r.boundary(direction)),
            Self::Polygon(p) => Some(p.boundary(direction)),
        }
    }

    /// Oriented loop set for the boolean engine.
    #[must_use]
    pub fn region(&self, tol: f64) -> Region {
        match self {
            Self::Void => Region::default(),
            Self::Universe => Region::universe(),
            _ => Region::new(
                self.boundary(RotationDirection::CounterClockwise, tol)
                    .into_iter()
                    .collect(),
            ),
        }
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        match self {
            Self::Void => Self::Void,
            Self::Universe => Self::Universe,
            Self::Rectangle(r) => Self::Rectangle(r.translated(d)),
            Self::Circle(c) => Self::Circle(c.translated(d)),
            Self::Ellipse(e) => Self::Ellipse(e.translated(d)),
            Self::OrientedRectangle(r) => Self::OrientedRectangle(r.translated(d)),
            Self::Polygon(p) => Self::Polygon(p.translated(d)),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        match self {
            Self::Void => Self::Void,
            Self::Universe => Self::Universe,
            Self::Rectangle(r) => Self::Rectangle(r.scaled(factor, origin)),
            Self::Circle(c) => Self::Circle(c.scaled(factor, origin)),
            Self::Ellipse(e) => Self::Ellipse(e.scaled(factor, origin)),
            Self::OrientedRectangle(r) => Self::OrientedRectangle(r.scaled(factor, origin)),
            Self::Polygon(p) => Self::Polygon(p.scaled(factor, origin)),
        }
    }

    /// Image under an affine map, keeping the kind whenever the map allows
    /// it and falling back to a polygon within `tol` otherwise.
    ///
    /// # Errors
    ///
    /// Propagates construction errors of the mapped shape, which only arise
    /// for a singular map.
    pub fn transformed(&self, m: &Matrix3, tol: f64) -> Result<Self> {
        let map = |p: &Point2| m.transform_point(p);
        let shape = match self {
            Self::Void => Self::Void,
            Self::Universe => Self::Universe,
            Self::Rectangle(r) if is_axis_preserving(m) => {
                let [lo, _, hi, _] = r.corners().map(|c| map(&c));
                Self::Rectangle(Rectangle::new(lo.x, lo.y, hi.x, hi.y))
            }
            Self::Rectangle(r) if is_similarity(m) => {
                Self::OrientedRectangle(OrientedRectangle::new(r.corners().map(|c| map(&c)))?)
            }
            Self::OrientedRectangle(r) if is_similarity(m) => {
                Self::OrientedRectangle(OrientedRectangle::new(r.corners().map(|c| map(&c)))?)
            }
            Self::Circle(c) if is_similarity(m) => {
                Self::Circle(Circle::new(map(c.center()), c.radius() * similarity_scale(m))?)
            }
            Self::Ellipse(e) if is_axis_preserving(m) => {
                let extent = e.extent();
                let lo = map(&Point2::new(extent.x_min, extent.y_min));
                let hi = map(&Point2::new(extent.x_max, extent.y_max));
                Self::Ellipse(Ellipse::new(lo.x, lo.y, hi.x, hi.y)?)
            }
            _ => match self.boundary(RotationDirection::CounterClockwise, tol) {
                Some(b) => Self::Polygon(Polygon::new(b.transformed(m, tol))?),
                None => self.clone(),
            },
        };
        Ok(shape)
    }
}

impl From<Rectangle> for SimpleShape {
    fn from(r: Rectangle) -> Self {
        Self::Rectangle(r)
    }
}

impl From<Circle> for SimpleShape {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Ellipse> for SimpleShape {
    fn from(e: Ellipse) -> Self {
        Self::Ellipse(e)
    }
}

impl From<OrientedRectangle> for SimpleShape {
    fn from(r: OrientedRectangle) -> Self {
        Self::OrientedRectangle(r)
    }
}

impl From<Polygon> for SimpleShape {
    fn from(p: Polygon) -> Self {
        Self::Polygon(p)
    }
}
