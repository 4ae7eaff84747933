use crate::geometry::{Extent, Piece, Pline, RotationDirection};
use crate::math::Point2;

/// A planar point set described by oriented boundary loops.
///
/// Loops keep the region on their left: outer boundaries run
/// counter-clockwise and holes clockwise. A point belongs to the region when
/// its total winding number, starting from `1` for an unbounded region and
/// `0` otherwise, is positive.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Region {
    pub loops: Vec<Pline>,
    pub unbounded: bool,
}

impl Region {
    /// A bounded region from already oriented loops.
    #[must_use]
    pub fn new(loops: Vec<Pline>) -> Self {
        Self {
            loops,
            unbounded: false,
        }
    }

    /// The whole plane.
    #[must_use]
    pub fn universe() -> Self {
        Self {
            loops: Vec::new(),
            unbounded: true,
        }
    }

    /// The region enclosed by `outer` minus the regions enclosed by `holes`,
    /// whatever the orientation of the given polylines.
    #[must_use]
    pub fn from_outer_and_holes(outer: &Pline, holes: &[Pline]) -> Self {
        let mut loops = Vec::with_capacity(holes.len() + 1);
        loops.push(outer.oriented(RotationDirection::CounterClockwise));
        loops.extend(holes.iter().map(|h| h.oriented(RotationDirection::Clockwise)));
        Self::new(loops)
    }

    /// The plane minus the regions enclosed by `holes`.
    #[must_use]
    pub fn complement_of(holes: &[Pline]) -> Self {
        Self {
            loops: holes
                .iter()
                .map(|h| h.oriented(RotationDirection::Clockwise))
                .collect(),
            unbounded: true,
        }
    }

    /// The rest of the plane: every loop reversed, boundedness flipped.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self {
            loops: self.loops.iter().map(Pline::reversed).collect(),
            unbounded: !self.unbounded,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.unbounded && self.loops.is_empty()
    }

    /// Total winding number around `p`.
    #[must_use]
    pub fn winding_at(&self, p: &Point2) -> i32 {
        let base = i32::from(self.unbounded);
        base + self.loops.iter().map(|l| l.winding_number(p)).sum::<i32>()
    }

    /// True if `p` belongs to the region, boundary handling aside.
    #[must_use]
    pub fn covers(&self, p: &Point2) -> bool {
        self.winding_at(p) > 0
    }

    /// All boundary pieces, loop after loop.
    #[must_use]
    pub fn pieces(&self) -> Vec<Piece> {
        self.loops.iter().flat_map(Pline::pieces).collect()
    }

    /// Bounding box of the boundary loops.
    #[must_use]
    pub fn boundary_extent(&self) -> Extent {
        self.loops
            .iter()
            .fold(Extent::empty(), |acc, l| acc.union(&l.extent()))
    }

    /// Enclosed area, infinite for unbounded regions.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.unbounded {
            return f64::INFINITY;
        }
        self.loops.iter().map(Pline::signed_area).sum()
    }
}
