mod algebra;
mod circle;
mod complex;
mod ellipse;
mod frame;
mod holed;
mod kind;
mod oriented_rectangle;
mod polygon;
mod rectangle;
mod simple;

use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

pub use circle::Circle;
pub use complex::ComplexShape;
pub use ellipse::Ellipse;
pub use frame::Frame;
pub use holed::HoledShape;
pub use kind::ShapeKind;
pub use oriented_rectangle::OrientedRectangle;
pub use polygon::Polygon;
pub use rectangle::Rectangle;
pub use simple::SimpleShape;

use crate::config::TolerancePolicy;
use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Point2, Vector2};
use crate::operations::{Region, SpatialPosition};

/// A planar point set expressed in a coordinate frame, with the tolerance
/// used by every query and operation on it.
///
/// With auto-tolerance active (the default) the tolerance follows the size
/// of the geometry and is recomputed whenever the geometry changes.
#[derive(Debug, Clone)]
pub struct Shape {
    frame: Arc<Frame>,
    tolerance: f64,
    auto_tolerance: bool,
    kind: ShapeKind,
}

impl Shape {
    /// A shape in the world frame with automatic tolerance.
    #[must_use]
    pub fn new(kind: impl Into<ShapeKind>) -> Self {
        Self::in_frame(kind, Frame::world())
    }

    #[must_use]
    pub fn in_frame(kind: impl Into<ShapeKind>, frame: Arc<Frame>) -> Self {
        let mut shape = Self {
            frame,
            tolerance: 0.0,
            auto_tolerance: true,
            kind: kind.into(),
        };
        shape.refresh_tolerance();
        shape
    }

    #[must_use]
    pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(SimpleShape::Rectangle(Rectangle::new(x0, y0, x1, y1)))
    }

    /// # Errors
    ///
    /// Returns `ShapeError::NonPositiveRadius` if `radius <= 0`.
    pub fn circle(center: Point2, radius: f64) -> Result<Self> {
        Ok(Self::new(SimpleShape::Circle(Circle::new(center, radius)?)))
    }

    /// The ellipse inscribed in the given rectangle.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NonPositiveRadius` for a flat rectangle.
    pub fn ellipse(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self> {
        Ok(Self::new(SimpleShape::Ellipse(Ellipse::new(x0, y0, x1, y1)?)))
    }

    /// # Errors
    ///
    /// Returns `ShapeError::NotRectangular` if the corners do not form a
    /// rectangle.
    pub fn oriented_rectangle(corners: [Point2; 4]) -> Result<Self> {
        Ok(Self::new(SimpleShape::OrientedRectangle(OrientedRectangle::new(corners)?)))
    }

    /// # Errors
    ///
    /// See [`Polygon::new`].
    pub fn polygon(boundary: Pline) -> Result<Self> {
        Ok(Self::new(SimpleShape::Polygon(Polygon::new(boundary)?)))
    }

    #[must_use]
    pub fn universe() -> Self {
        Self::new(SimpleShape::Universe)
    }

    #[must_use]
    pub fn void() -> Self {
        Self::new(SimpleShape::Void)
    }

    /// # Errors
    ///
    /// Returns `ShapeError::InvalidHole` for the first hole that does not fit.
    pub fn holed(outer: SimpleShape, holes: Vec<SimpleShape>) -> Result<Self> {
        let tol = TolerancePolicy::default().tolerance_for(&outer.extent());
        Ok(Self::new(HoledShape::with_holes(outer, holes, tol)?))
    }

    #[must_use]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    #[must_use]
    pub fn frame(&self) -> &Arc<Frame> {
        &self.frame
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    #[must_use]
    pub fn is_auto_tolerance(&self) -> bool {
        self.auto_tolerance
    }

    /// Fixes the tolerance and turns auto-tolerance off.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NegativeTolerance` unless `tolerance > 0`.
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<()> {
        if !(tolerance > 0.0 && tolerance.is_finite()) {
            return Err(ShapeError::NegativeTolerance(tolerance).into());
        }
        self.tolerance = tolerance;
        self.auto_tolerance = false;
        Ok(())
    }

    pub fn set_auto_tolerance(&mut self, active: bool) {
        self.auto_tolerance = active;
        self.refresh_tolerance();
    }

    fn refresh_tolerance(&mut self) {
        if self.auto_tolerance {
            self.tolerance = TolerancePolicy::default().tolerance_for(&self.kind.extent());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind.is_empty(self.tolerance)
    }

    /// Enclosed area; infinite for unbounded shapes.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.kind.area()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.kind.perimeter()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.kind.extent()
    }

    /// Strict interior test: points on the boundary are not in.
    #[must_use]
    pub fn is_point_in(&self, p: &Point2) -> bool {
        self.kind.is_point_in(p, self.tolerance)
    }

    /// True if `p` lies on some boundary within the tolerance. Shape
    /// boundaries are closed, so there are no extremities to exclude.
    #[must_use]
    pub fn is_point_on(&self, p: &Point2) -> bool {
        self.kind.is_point_on(p, self.tolerance)
    }

    /// Closest boundary point; `None` for shapes without boundary.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Option<Point2> {
        self.kind.closest_point(p, self.tolerance)
    }

    /// Every boundary loop, walked in `direction`.
    #[must_use]
    pub fn linear(&self, direction: RotationDirection) -> Vec<Pline> {
        self.kind.boundaries(direction, self.tolerance)
    }

    /// Oriented loop set seen by the boolean engine.
    #[must_use]
    pub fn region(&self) -> Region {
        self.kind.region(self.tolerance)
    }

    pub fn translate(&mut self, d: &Vector2) {
        self.kind = self.kind.translated(d);
        self.refresh_tolerance();
    }

    /// # Errors
    ///
    /// Returns `ShapeError::ZeroScale` for a zero factor.
    pub fn scale(&mut self, factor: f64, origin: &Point2) -> Result<()> {
        if factor == 0.0 || !factor.is_finite() {
            return Err(ShapeError::ZeroScale.into());
        }
        self.kind = self.kind.scaled(factor, origin);
        self.refresh_tolerance();
        Ok(())
    }

    /// Cuts a hole, turning a simple shape into a holed one.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::InvalidHole` when the hole does not fit or the
    /// shape cannot carry holes.
    pub fn add_hole(&mut self, hole: SimpleShape) -> Result<()> {
        let tol = self.tolerance;
        match &mut self.kind {
            ShapeKind::Simple(outer) if !outer.is_empty(tol) => {
                let mut holed = HoledShape::new(outer.clone());
                holed.add_hole(hole, tol)?;
                self.kind = holed.into();
            }
            ShapeKind::Holed(holed) => holed.add_hole(hole, tol)?,
            _ => {
                return Err(ShapeError::InvalidHole("shape cannot carry holes".into()).into());
            }
        }
        Ok(())
    }

    /// The same point set expressed in `frame`.
    ///
    /// # Errors
    ///
    /// Propagates shape construction errors of the mapped geometry.
    pub fn transform_to(&self, frame: &Arc<Frame>) -> Result<Self> {
        if *self.frame == **frame {
            return Ok(self.clone());
        }
        debug!(from = self.frame.id(), to = frame.id(), "re-expressing shape");
        let m = self.frame.relative_transform(frame);
        let mut shape = Self {
            frame: Arc::clone(frame),
            tolerance: self.tolerance,
            auto_tolerance: self.auto_tolerance,
            kind: self.kind.transformed(&m, self.tolerance)?,
        };
        shape.refresh_tolerance();
        Ok(shape)
    }

    /// `other` in this shape's frame, copied only when the frames differ.
    fn aligned<'a>(&self, other: &'a Self) -> Result<Cow<'a, Self>> {
        if *self.frame == *other.frame {
            Ok(Cow::Borrowed(other))
        } else {
            other.transform_to(&self.frame).map(Cow::Owned)
        }
    }

    /// `self ∪ other`, in this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn unify(&self, other: &Self) -> Result<Self> {
        self.unify_scs(&*self.aligned(other)?)
    }

    /// `self ∩ other`, in this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn intersect(&self, other: &Self) -> Result<Self> {
        self.intersect_scs(&*self.aligned(other)?)
    }

    /// `self − other`, in this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn differentiate(&self, other: &Self) -> Result<Self> {
        self.differentiate_scs(&*self.aligned(other)?)
    }

    /// `other − self`, in this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn differentiate_from(&self, other: &Self) -> Result<Self> {
        self.differentiate_from_scs(&*self.aligned(other)?)
    }

    /// [`Shape::unify`] for an operand known to share this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn unify_scs(&self, other: &Self) -> Result<Self> {
        self.combine(other, algebra::unify)
    }

    /// [`Shape::intersect`] for an operand known to share this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn intersect_scs(&self, other: &Self) -> Result<Self> {
        self.combine(other, algebra::intersect)
    }

    /// [`Shape::differentiate`] for an operand known to share this shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn differentiate_scs(&self, other: &Self) -> Result<Self> {
        self.combine(other, algebra::differentiate)
    }

    /// [`Shape::differentiate_from`] for an operand known to share this
    /// shape's frame.
    ///
    /// # Errors
    ///
    /// Propagates engine and shape construction errors.
    pub fn differentiate_from_scs(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b, tol| algebra::differentiate(b, a, tol))
    }

    /// Everything this shape does not cover.
    ///
    /// # Errors
    ///
    /// Returns a shape error if a boundary loop cannot bound a polygon.
    pub fn complement(&self) -> Result<Self> {
        let kind = algebra::complement(&self.kind, self.tolerance)?;
        Ok(self.derived(kind, self.tolerance, self.auto_tolerance))
    }

    fn combine(
        &self,
        other: &Self,
        op: impl FnOnce(&ShapeKind, &ShapeKind, f64) -> Result<ShapeKind>,
    ) -> Result<Self> {
        let tol = self.tolerance.max(other.tolerance);
        let kind = op(&self.kind, &other.kind, tol)?;
        Ok(self.derived(kind, tol, self.auto_tolerance && other.auto_tolerance))
    }

    fn derived(&self, kind: ShapeKind, tolerance: f64, auto_tolerance: bool) -> Self {
        let mut shape = Self {
            frame: Arc::clone(&self.frame),
            tolerance,
            auto_tolerance,
            kind,
        };
        shape.refresh_tolerance();
        shape
    }

    /// Position of `other` relative to this shape.
    ///
    /// # Errors
    ///
    /// Propagates errors from re-expressing `other` in this shape's frame.
    pub fn spatial_position_of(&self, other: &Self) -> Result<SpatialPosition> {
        let other = self.aligned(other)?;
        Ok(self
            .kind
            .spatial_position_of(&other.kind, self.tolerance.max(other.tolerance)))
    }

    /// True if the boundaries share a stretch of positive length.
    ///
    /// # Errors
    ///
    /// Propagates errors from re-expressing `other` in this shape's frame.
    pub fn are_contiguous(&self, other: &Self) -> Result<bool> {
        let other = self.aligned(other)?;
        Ok(self
            .kind
            .are_contiguous(&other.kind, self.tolerance.max(other.tolerance)))
    }

    /// True if the boundaries meet without the shapes overlapping.
    ///
    /// # Errors
    ///
    /// Propagates errors from re-expressing `other` in this shape's frame.
    pub fn are_adjacent(&self, other: &Self) -> Result<bool> {
        let other = self.aligned(other)?;
        Ok(self
            .kind
            .are_adjacent(&other.kind, self.tolerance.max(other.tolerance)))
    }

    /// End points of the boundary stretches shared with `other`.
    ///
    /// # Errors
    ///
    /// Propagates errors from re-expressing `other` in this shape's frame.
    pub fn contiguousness_points(&self, other: &Self) -> Result<Vec<Point2>> {
        let other = self.aligned(other)?;
        Ok(self
            .kind
            .contiguousness_points(&other.kind, self.tolerance.max(other.tolerance)))
    }
}

impl From<ShapeKind> for Shape {
    fn from(kind: ShapeKind) -> Self {
        Self::new(kind)
    }
}
