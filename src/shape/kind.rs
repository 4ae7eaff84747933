use tracing::debug;

use crate::error::Result;
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Matrix3, Point2, Vector2};
use crate::operations::boolean::{are_adjacent, are_contiguous, contiguousness_points};
use crate::operations::{spatial_position, Region, SpatialPosition};

use super::complex::ComplexShape;
use super::holed::HoledShape;
use super::polygon::Polygon;
use super::simple::SimpleShape;

/// The geometry of a [`Shape`](super::Shape), without frame or tolerance.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Simple(SimpleShape),
    Holed(HoledShape),
    Complex(ComplexShape),
}

impl ShapeKind {
    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        match self {
            Self::Simple(s) => s.is_empty(tol),
            Self::Holed(h) => h.is_empty(tol),
            Self::Complex(c) => c.is_empty(tol),
        }
    }

    #[must_use]
    pub fn is_universe(&self) -> bool {
        matches!(self, Self::Simple(SimpleShape::Universe))
    }

    /// False when the shape reaches infinity.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        match self {
            Self::Simple(s) => !s.is_universe(),
            Self::Holed(h) => h.is_bounded(),
            Self::Complex(c) => c.parts().iter().all(Self::is_bounded),
        }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        match self {
            Self::Simple(s) => s.area(),
            Self::Holed(h) => h.area(),
            Self::Complex(c) => c.area(),
        }
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        match self {
            Self::Simple(s) => s.perimeter(),
            Self::Holed(h) => h.perimeter(),
            Self::Complex(c) => c.perimeter(),
        }
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        match self {
            Self::Simple(s) => s.extent(),
            Self::Holed(h) => h.extent(),
            Self::Complex(c) => c.extent(),
        }
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        match self {
            Self::Simple(s) => s.is_point_in(p, tol),
            Self::Holed(h) => h.is_point_in(p, tol),
            Self::Complex(c) => c.is_point_in(p, tol),
        }
    }

    #[must_use]
    pub fn is_point_on(&self, p: &Point2, tol: f64) -> bool {
        match self {
            Self::Simple(s) => s.is_point_on(p, tol),
            Self::Holed(h) => h.is_point_on(p, tol),
            Self::Complex(c) => c.is_point_on(p, tol),
        }
    }

    #[must_use]
    pub fn closest_point(&self, p: &Point2, tol: f64) -> Option<Point2> {
        match self {
            Self::Simple(s) => s.closest_point(p, tol),
            Self::Holed(h) => h.closest_point(p, tol),
            Self::Complex(c) => c.closest_point(p, tol),
        }
    }

    /// Every boundary loop, each walked in `direction`.
    #[must_use]
    pub fn boundaries(&self, direction: RotationDirection, tol: f64) -> Vec<Pline> {
        match self {
            Self::Simple(s) => s.boundary(direction, tol).into_iter().collect(),
            Self::Holed(h) => h.boundaries(direction, tol),
            Self::Complex(c) => c.boundaries(direction, tol),
        }
    }

    #[must_use]
    pub fn region(&self, tol: f64) -> Region {
        match self {
            Self::Simple(s) => s.region(tol),
            Self::Holed(h) => h.region(tol),
            Self::Complex(c) => c.region(tol),
        }
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        match self {
            Self::Simple(s) => Self::Simple(s.translated(d)),
            Self::Holed(h) => Self::Holed(h.translated(d)),
            Self::Complex(c) => Self::Complex(c.translated(d)),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        match self {
            Self::Simple(s) => Self::Simple(s.scaled(factor, origin)),
            Self::Holed(h) => Self::Holed(h.scaled(factor, origin)),
            Self::Complex(c) => Self::Complex(c.scaled(factor, origin)),
        }
    }

    /// # Errors
    ///
    /// See [`SimpleShape::transformed`].
    pub fn transformed(&self, m: &Matrix3, tol: f64) -> Result<Self> {
        Ok(match self {
            Self::Simple(s) => Self::Simple(s.transformed(m, tol)?),
            Self::Holed(h) => Self::Holed(h.transformed(m, tol)?),
            Self::Complex(c) => Self::Complex(c.transformed(m, tol)?),
        })
    }

    /// Disjoint parts of the shape; a non-complex shape is its own only part.
    #[must_use]
    pub fn into_components(self) -> Vec<Self> {
        match self {
            Self::Complex(c) => c.into_parts(),
            other => vec![other],
        }
    }

    /// Position of `other` relative to `self`.
    #[must_use]
    pub fn spatial_position_of(&self, other: &Self, tol: f64) -> SpatialPosition {
        spatial_position(&self.region(tol), &other.region(tol), tol)
    }

    #[must_use]
    pub fn are_contiguous(&self, other: &Self, tol: f64) -> bool {
        are_contiguous(&self.region(tol), &other.region(tol), tol)
    }

    #[must_use]
    pub fn are_adjacent(&self, other: &Self, tol: f64) -> bool {
        are_adjacent(&self.region(tol), &other.region(tol), tol)
    }

    #[must_use]
    pub fn contiguousness_points(&self, other: &Self, tol: f64) -> Vec<Point2> {
        contiguousness_points(&self.region(tol), &other.region(tol), tol)
    }

    /// Rebuilds shapes from an oriented loop set.
    ///
    /// Counter-clockwise loops become outer boundaries; every clockwise loop
    /// becomes a hole of the smallest outer boundary around it, or of the
    /// universe when the region is unbounded.
    ///
    /// # Errors
    ///
    /// Returns a shape error if a loop cannot bound a polygon.
    pub fn from_region(region: &Region, tol: f64) -> Result<Self> {
        let mut outers: Vec<(Pline, f64, Vec<Pline>)> = Vec::new();
        let mut holes: Vec<Pline> = Vec::new();
        for l in &region.loops {
            let area = l.signed_area();
            if area > 0.0 {
                outers.push((l.clone(), area, Vec::new()));
            } else if area < 0.0 {
                holes.push(l.clone());
            }
        }

        let mut universe_holes: Vec<Pline> = Vec::new();
        for hole in holes {
            let owner = outers
                .iter_mut()
                .filter(|(outer, _, _)| outer.winding_number(&probe_point(&hole, outer, tol)) != 0)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            match owner {
                Some((_, _, owned)) => owned.push(hole),
                None if region.unbounded => universe_holes.push(hole),
                None => debug!("dropping hole outside every outer boundary"),
            }
        }

        let mut parts: Vec<Self> = Vec::with_capacity(outers.len() + 1);
        if region.unbounded {
            let hole_shapes = polygons(universe_holes)?;
            parts.push(if hole_shapes.is_empty() {
                Self::Simple(SimpleShape::Universe)
            } else {
                Self::Holed(HoledShape::from_parts(SimpleShape::Universe, hole_shapes))
            });
        }
        for (outer, _, owned) in outers {
            let outer = SimpleShape::Polygon(Polygon::new(outer)?);
            parts.push(if owned.is_empty() {
                Self::Simple(outer)
            } else {
                Self::Holed(HoledShape::from_parts(outer, polygons(owned)?))
            });
        }

        Ok(match parts.len() {
            0 => Self::Simple(SimpleShape::Void),
            1 => parts.swap_remove(0),
            _ => Self::Complex(ComplexShape::new(parts)),
        })
    }
}

fn polygons(loops: Vec<Pline>) -> Result<Vec<SimpleShape>> {
    loops
        .into_iter()
        .map(|l| Polygon::new(l).map(SimpleShape::Polygon))
        .collect()
}

/// A point of `hole` off the boundary of `outer`, for the containment test.
fn probe_point(hole: &Pline, outer: &Pline, tol: f64) -> Point2 {
    hole.vertices
        .iter()
        .map(|v| v.point())
        .find(|p| outer.distance_to(p) > tol)
        .unwrap_or_else(|| hole.piece(0).midpoint())
}

impl From<SimpleShape> for ShapeKind {
    fn from(s: SimpleShape) -> Self {
        Self::Simple(s)
    }
}

impl From<HoledShape> for ShapeKind {
    fn from(h: HoledShape) -> Self {
        Self::Holed(h)
    }
}

impl From<ComplexShape> for ShapeKind {
    fn from(c: ComplexShape) -> Self {
        Self::Complex(c)
    }
}
