use tracing::trace;

use crate::error::{Result, ShapeError};
use crate::geometry::{Extent, Pline, RotationDirection};
use crate::math::{Matrix3, Point2, Vector2};
use crate::operations::boolean::are_contiguous;
use crate::operations::{spatial_position, Region, SpatialPosition};

use super::algebra::{differentiate, intersect, unify};
use super::complex::ComplexShape;
use super::kind::ShapeKind;
use super::simple::SimpleShape;

/// A simple outer shape with simple holes cut out of it.
///
/// Holes lie inside the outer boundary and do not overlap each other; they
/// may touch the outer boundary or each other at isolated points. The outer
/// shape may be the universe, for a plane with holes.
#[derive(Debug, Clone, PartialEq)]
pub struct HoledShape {
    outer: SimpleShape,
    holes: Vec<SimpleShape>,
}

impl HoledShape {
    #[must_use]
    pub fn new(outer: SimpleShape) -> Self {
        Self {
            outer,
            holes: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns `ShapeError::InvalidHole` for the first hole that does not fit.
    pub fn with_holes(outer: SimpleShape, holes: Vec<SimpleShape>, tol: f64) -> Result<Self> {
        let mut shape = Self::new(outer);
        for hole in holes {
            shape.add_hole(hole, tol)?;
        }
        Ok(shape)
    }

    /// Assembles parts already known to be consistent.
    pub(crate) fn from_parts(outer: SimpleShape, holes: Vec<SimpleShape>) -> Self {
        Self { outer, holes }
    }

    #[must_use]
    pub fn outer(&self) -> &SimpleShape {
        &self.outer
    }

    #[must_use]
    pub fn holes(&self) -> &[SimpleShape] {
        &self.holes
    }

    /// Cuts a new hole.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::InvalidHole` if the hole is empty or unbounded,
    /// is not inside what remains of the shape, or shares a stretch of
    /// boundary with it.
    pub fn add_hole(&mut self, hole: SimpleShape, tol: f64) -> Result<()> {
        if hole.is_empty(tol) || hole.is_universe() {
            return Err(ShapeError::InvalidHole("hole must be bounded and non-empty".into()).into());
        }
        let me = self.region(tol);
        let candidate = hole.region(tol);
        if spatial_position(&me, &candidate, tol) != SpatialPosition::In {
            return Err(ShapeError::InvalidHole("hole is not inside the shape".into()).into());
        }
        if are_contiguous(&me, &candidate, tol) {
            return Err(
                ShapeError::InvalidHole("hole shares a boundary stretch with the shape".into()).into(),
            );
        }
        self.holes.push(hole);
        Ok(())
    }

    pub fn remove_holes(&mut self) {
        self.holes.clear();
    }

    /// Empty whenever the outer shape is, whatever the holes.
    #[must_use]
    pub fn is_empty(&self, tol: f64) -> bool {
        self.outer.is_empty(tol)
    }

    #[must_use]
    pub fn is_bounded(&self) -> bool {
        !self.outer.is_universe()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(SimpleShape::area).sum::<f64>()
    }

    #[must_use]
    pub fn perimeter(&self) -> f64 {
        self.outer.perimeter() + self.holes.iter().map(SimpleShape::perimeter).sum::<f64>()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        self.outer.extent()
    }

    #[must_use]
    pub fn is_point_in(&self, p: &Point2, tol: f64) -> bool {
        self.outer.is_point_in(p, tol)
            && self
                .holes
                .iter()
                .all(|h| !h.is_point_in(p, tol) && !h.is_point_on(p, tol))
    }

    #[must_use]
    pub fn is_point_on(&self, p: &Point2, tol: f64) -> bool {
        self.outer.is_point_on(p, tol) || self.holes.iter().any(|h| h.is_point_on(p, tol))
    }

    #[must_use]
    pub fn closest_point(&self, p: &Point2, tol: f64) -> Option<Point2> {
        std::iter::once(&self.outer)
            .chain(&self.holes)
            .filter_map(|s| s.closest_point(p, tol))
            .min_by(|a, b| (a - p).norm().total_cmp(&(b - p).norm()))
    }

    #[must_use]
    pub fn boundaries(&self, direction: RotationDirection, tol: f64) -> Vec<Pline> {
        std::iter::once(&self.outer)
            .chain(&self.holes)
            .filter_map(|s| s.boundary(direction, tol))
            .collect()
    }

    #[must_use]
    pub fn region(&self, tol: f64) -> Region {
        let holes: Vec<Pline> = self
            .holes
            .iter()
            .filter_map(|h| h.boundary(RotationDirection::Clockwise, tol))
            .collect();
        match self.outer.boundary(RotationDirection::CounterClockwise, tol) {
            Some(outer) => Region::from_outer_and_holes(&outer, &holes),
            None if self.outer.is_universe() => Region::complement_of(&holes),
            None => Region::default(),
        }
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            outer: self.outer.translated(d),
            holes: self.holes.iter().map(|h| h.translated(d)).collect(),
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            outer: self.outer.scaled(factor, origin),
            holes: self.holes.iter().map(|h| h.scaled(factor, origin)).collect(),
        }
    }

    /// # Errors
    ///
    /// See [`SimpleShape::transformed`].
    pub fn transformed(&self, m: &Matrix3, tol: f64) -> Result<Self> {
        Ok(Self {
            outer: self.outer.transformed(m, tol)?,
            holes: self
                .holes
                .iter()
                .map(|h| h.transformed(m, tol))
                .collect::<Result<_>>()?,
        })
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Holed(self.clone())
    }

    fn outer_kind(&self) -> ShapeKind {
        ShapeKind::Simple(self.outer.clone())
    }

    fn hole_kinds(&self) -> impl Iterator<Item = ShapeKind> + '_ {
        self.holes.iter().cloned().map(ShapeKind::Simple)
    }

    /// `(position of self relative to other, position of other relative to self)`.
    fn mutual_positions(&self, other: &ShapeKind, tol: f64) -> (SpatialPosition, SpatialPosition) {
        let me = self.kind();
        (other.spatial_position_of(&me, tol), me.spatial_position_of(other, tol))
    }

    /// `self ∪ shape`.
    pub(crate) fn unify_simple(&self, shape: &SimpleShape, tol: f64) -> Result<ShapeKind> {
        let other = ShapeKind::Simple(shape.clone());
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out
            && given_pos == SpatialPosition::Out
            && !self.kind().are_contiguous(&other, tol)
        {
            return Ok(ComplexShape::new([self.kind(), other]).into());
        }

        let mut result = unify(&self.outer_kind(), &other, tol)?;
        let mut new_holes = Vec::new();
        for hole in self.hole_kinds() {
            match other.spatial_position_of(&hole, tol) {
                SpatialPosition::Out => new_holes.push(hole),
                SpatialPosition::PartiallyIn => {
                    new_holes.extend(differentiate(&hole, &other, tol)?.into_components());
                }
                SpatialPosition::In | SpatialPosition::On => {}
            }
        }
        for hole in new_holes {
            result = carve(result, hole, tol)?;
        }
        Ok(result)
    }

    /// `self ∪ holed`.
    pub(crate) fn unify_holed(&self, holed: &Self, tol: f64) -> Result<ShapeKind> {
        let other = holed.kind();
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out
            && given_pos == SpatialPosition::Out
            && !self.kind().are_contiguous(&other, tol)
        {
            return Ok(ComplexShape::new([self.kind(), other]).into());
        }

        let mut result = unify(&self.outer_kind(), &holed.outer_kind(), tol)?;
        let mut new_holes = Vec::new();
        for (holes, outer) in [(self, holed.outer_kind()), (holed, self.outer_kind())] {
            for hole in holes.hole_kinds() {
                match outer.spatial_position_of(&hole, tol) {
                    SpatialPosition::Out => new_holes.push(hole),
                    SpatialPosition::PartiallyIn => {
                        new_holes.extend(differentiate(&hole, &outer, tol)?.into_components());
                    }
                    SpatialPosition::In | SpatialPosition::On => {}
                }
            }
        }
        for mine in self.hole_kinds() {
            for theirs in holed.hole_kinds() {
                let common = intersect(&mine, &theirs, tol)?;
                if !common.is_empty(tol) {
                    new_holes.extend(common.into_components());
                }
            }
        }
        for hole in new_holes {
            result = carve(result, hole, tol)?;
        }
        Ok(result)
    }

    /// `self ∩ shape`.
    pub(crate) fn intersect_simple(&self, shape: &SimpleShape, tol: f64) -> Result<ShapeKind> {
        let other = ShapeKind::Simple(shape.clone());
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out && given_pos == SpatialPosition::Out {
            return Ok(SimpleShape::Void.into());
        }
        let result = intersect(&self.outer_kind(), &other, tol)?;
        subtract_overlapping(result, self.hole_kinds(), tol)
    }

    /// `self ∩ holed`.
    pub(crate) fn intersect_holed(&self, holed: &Self, tol: f64) -> Result<ShapeKind> {
        let other = holed.kind();
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        match (self_pos, given_pos) {
            (SpatialPosition::Out, SpatialPosition::Out) => return Ok(SimpleShape::Void.into()),
            (SpatialPosition::On, SpatialPosition::On) => return Ok(self.kind()),
            _ => {}
        }
        let result = intersect(&self.outer_kind(), &holed.outer_kind(), tol)?;
        subtract_overlapping(result, self.hole_kinds().chain(holed.hole_kinds()), tol)
    }

    /// `self − shape`.
    pub(crate) fn differentiate_simple(&self, shape: &SimpleShape, tol: f64) -> Result<ShapeKind> {
        let other = ShapeKind::Simple(shape.clone());
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out && given_pos == SpatialPosition::Out {
            return Ok(self.kind());
        }
        if given_pos != SpatialPosition::Out
            && self.outer_kind().spatial_position_of(&other, tol) == SpatialPosition::In
        {
            if let Some(result) = self.cut_inner_hole(&other, tol)? {
                return Ok(result);
            }
        }
        let result = differentiate(&self.outer_kind(), &other, tol)?;
        subtract_overlapping(result, self.hole_kinds(), tol)
    }

    /// Removes `shape`, which lies inside the outer boundary, by merging it
    /// with the holes it touches into a single new hole. `None` when the
    /// merged shape cannot be a hole.
    fn cut_inner_hole(&self, shape: &ShapeKind, tol: f64) -> Result<Option<ShapeKind>> {
        let mut merged = shape.clone();
        let mut kept: Vec<ShapeKind> = self.hole_kinds().collect();
        loop {
            let (touching, apart): (Vec<ShapeKind>, Vec<ShapeKind>) =
                kept.into_iter().partition(|hole| {
                    merged.spatial_position_of(hole, tol) != SpatialPosition::Out
                        || merged.are_contiguous(hole, tol)
                });
            kept = apart;
            if touching.is_empty() {
                break;
            }
            for hole in &touching {
                merged = unify(&merged, hole, tol)?;
            }
        }
        let ShapeKind::Simple(merged) = merged else {
            trace!("merged hole is not simple");
            return Ok(None);
        };
        let holes = kept
            .into_iter()
            .filter_map(|k| match k {
                ShapeKind::Simple(s) => Some(s),
                _ => None,
            })
            .collect();
        let mut result = Self::from_parts(self.outer.clone(), holes);
        Ok(result.add_hole(merged, tol).ok().map(|()| result.into()))
    }

    /// `self − holed`.
    pub(crate) fn differentiate_holed(&self, holed: &Self, tol: f64) -> Result<ShapeKind> {
        let other = holed.kind();
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out && given_pos == SpatialPosition::Out {
            return Ok(self.kind());
        }
        let result = differentiate(&self.outer_kind(), &holed.outer_kind(), tol)?;
        let mut result = subtract_overlapping(result, self.hole_kinds(), tol)?;
        // What lies in the holes of `holed` survives.
        for hole in holed.hole_kinds() {
            let kept = intersect(&self.outer_kind(), &hole, tol)?;
            let kept = subtract_overlapping(kept, self.hole_kinds(), tol)?;
            if !kept.is_empty(tol) {
                result = unify(&result, &kept, tol)?;
            }
        }
        Ok(result)
    }

    /// `shape − self`.
    pub(crate) fn differentiate_from_simple(&self, shape: &SimpleShape, tol: f64) -> Result<ShapeKind> {
        let other = ShapeKind::Simple(shape.clone());
        let (self_pos, given_pos) = self.mutual_positions(&other, tol);
        if self_pos == SpatialPosition::Out && given_pos == SpatialPosition::Out {
            return Ok(other);
        }
        let mut result = differentiate(&other, &self.outer_kind(), tol)?;
        for hole in self.hole_kinds() {
            let kept = intersect(&other, &hole, tol)?;
            if !kept.is_empty(tol) {
                result = unify(&result, &kept, tol)?;
            }
        }
        Ok(result)
    }
}

/// Removes from `shape` every hole that reaches into it.
fn subtract_overlapping(
    mut shape: ShapeKind,
    holes: impl IntoIterator<Item = ShapeKind>,
    tol: f64,
) -> Result<ShapeKind> {
    for hole in holes {
        if shape.is_empty(tol) {
            break;
        }
        if shape.spatial_position_of(&hole, tol) != SpatialPosition::Out {
            shape = differentiate(&shape, &hole, tol)?;
        }
    }
    Ok(shape)
}

/// `shape − part`, kept as a new hole when `part` fits as one.
fn carve(shape: ShapeKind, part: ShapeKind, tol: f64) -> Result<ShapeKind> {
    if let ShapeKind::Simple(hole) = &part {
        let base = match &shape {
            ShapeKind::Simple(outer) if !outer.is_universe() => Some(HoledShape::new(outer.clone())),
            ShapeKind::Holed(h) if h.is_bounded() => Some(h.clone()),
            _ => None,
        };
        if let Some(mut holed) = base {
            if holed.add_hole(hole.clone(), tol).is_ok() {
                return Ok(holed.into());
            }
        }
    }
    differentiate(&shape, &part, tol)
}
