use tracing::{debug, instrument};

use crate::error::{OperationError, Result};
use crate::geometry::Piece;

use super::assemble::assemble_loops;
use super::classify::{classify_piece, PieceClassification};
use super::region::Region;
use super::select::{should_keep_piece, BooleanOp, KeepDecision};
use super::split::{split_boundaries, Operand, SplitBoundaries};

/// Position of one region relative to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialPosition {
    /// Entirely inside; boundaries may touch.
    In,
    /// Entirely outside; boundaries may touch.
    Out,
    /// Partly inside and partly outside.
    PartiallyIn,
    /// Both boundaries coincide.
    On,
}

/// Executes a boolean operation on two regions.
///
/// Orchestrates the full pipeline: splitting both boundaries at their
/// contacts, classification of every piece against the other region,
/// selection, and assembly of the kept pieces into loops.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` for a negative or non-finite
/// tolerance.
#[instrument(skip(a, b), fields(loops_a = a.loops.len(), loops_b = b.loops.len()))]
pub fn boolean_execute(a: &Region, b: &Region, op: BooleanOp, tol: f64) -> Result<Region> {
    if !tol.is_finite() || tol < 0.0 {
        return Err(OperationError::InvalidInput(format!("tolerance {tol}")).into());
    }
    let unbounded = op.unbounded_result(a.unbounded, b.unbounded);

    // Step 1: extent early-out
    if !a.unbounded
        && !b.unbounded
        && !a.boundary_extent().overlaps(&b.boundary_extent(), tol)
    {
        debug!("disjoint extents");
        return Ok(handle_disjoint(a, b, op));
    }

    // Step 2: split both boundaries at every contact
    let split = split_boundaries(a, b, tol);
    debug!(contacts = split.contacts().len(), pieces = split.len(), "split boundaries");

    if split.contacts().is_empty() && is_simple(a) && is_simple(b) {
        return Ok(handle_no_contact(a, b, op));
    }

    // Step 3: classify and select
    let kept = select_pieces(&split, a, b, op, tol);

    // Step 4: assemble
    let loops = assemble_loops(&kept, tol);
    debug!(kept = kept.len(), loops = loops.len(), "assembled result");
    Ok(Region { loops, unbounded })
}

fn select_pieces(
    split: &SplitBoundaries,
    a: &Region,
    b: &Region,
    op: BooleanOp,
    tol: f64,
) -> Vec<Piece> {
    let boundary_a = a.pieces();
    let boundary_b = b.pieces();
    let mut kept = Vec::with_capacity(split.len());
    for (_, sp) in split.iter() {
        let classification = match sp.operand {
            Operand::A => classify_piece(&sp.piece, b, &boundary_b, tol),
            Operand::B => classify_piece(&sp.piece, a, &boundary_a, tol),
        };
        match should_keep_piece(sp.operand, classification, op) {
            KeepDecision::Keep => kept.push(sp.piece),
            KeepDecision::KeepReversed => kept.push(sp.piece.reversed()),
            KeepDecision::Discard => {}
        }
    }
    kept
}

fn is_simple(region: &Region) -> bool {
    !region.unbounded && region.loops.len() == 1
}

fn handle_disjoint(a: &Region, b: &Region, op: BooleanOp) -> Region {
    match op {
        BooleanOp::Union => Region::new(a.loops.iter().chain(&b.loops).cloned().collect()),
        BooleanOp::Intersect => Region::default(),
        BooleanOp::Difference => a.clone(),
    }
}

/// Two single-loop regions whose boundaries never meet: one lies inside
/// the other or they are apart, and one point test per side tells which.
fn handle_no_contact(a: &Region, b: &Region, op: BooleanOp) -> Region {
    let a_in_b = a.loops[0].vertices.first().is_some_and(|v| b.covers(&v.point()));
    let b_in_a = b.loops[0].vertices.first().is_some_and(|v| a.covers(&v.point()));
    match op {
        BooleanOp::Union if a_in_b => b.clone(),
        BooleanOp::Union if b_in_a => a.clone(),
        BooleanOp::Union => handle_disjoint(a, b, op),
        BooleanOp::Intersect if a_in_b => a.clone(),
        BooleanOp::Intersect if b_in_a => b.clone(),
        BooleanOp::Intersect => Region::default(),
        BooleanOp::Difference if a_in_b => Region::default(),
        BooleanOp::Difference if b_in_a => {
            Region::new(vec![a.loops[0].clone(), b.loops[0].reversed()])
        }
        BooleanOp::Difference => a.clone(),
    }
}

/// Position of `other` relative to `region`.
///
/// Decided from `other`'s boundary pieces; a boundary lying entirely
/// outside still overlaps when `other` swallows `region`.
#[must_use]
pub fn spatial_position(region: &Region, other: &Region, tol: f64) -> SpatialPosition {
    if other.is_empty() || region.is_empty() {
        return SpatialPosition::Out;
    }
    let split = split_boundaries(region, other, tol);
    let boundary = region.pieces();
    let (mut inside, mut outside, mut on) = (false, false, false);
    for (_, sp) in split.iter().filter(|(_, sp)| sp.operand == Operand::B) {
        match classify_piece(&sp.piece, region, &boundary, tol) {
            PieceClassification::Inside => inside = true,
            PieceClassification::Outside => outside = true,
            PieceClassification::OnSameSense | PieceClassification::OnOppositeSense => on = true,
        }
    }

    if !inside && !outside {
        if on {
            return SpatialPosition::On;
        }
        // `other` has no boundary: it is the whole plane.
        return SpatialPosition::PartiallyIn;
    }
    if inside && outside {
        return SpatialPosition::PartiallyIn;
    }
    if inside {
        return if other.unbounded {
            SpatialPosition::PartiallyIn
        } else {
            SpatialPosition::In
        };
    }

    let other_boundary = other.pieces();
    let swallowed = region.unbounded
        || split
            .iter()
            .filter(|(_, sp)| sp.operand == Operand::A)
            .any(|(_, sp)| {
                classify_piece(&sp.piece, other, &other_boundary, tol)
                    == PieceClassification::Inside
            });
    if swallowed {
        SpatialPosition::PartiallyIn
    } else {
        SpatialPosition::Out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::{Pline, PlineVertex};
    use crate::math::Point2;
    use std::f64::consts::PI;

    fn square(x0: f64, y0: f64, size: f64) -> Pline {
        Pline::from_points(
            &[
                Point2::new(x0, y0),
                Point2::new(x0 + size, y0),
                Point2::new(x0 + size, y0 + size),
                Point2::new(x0, y0 + size),
            ],
            true,
        )
    }

    fn circle(cx: f64, cy: f64, r: f64) -> Pline {
        Pline {
            vertices: vec![
                PlineVertex::new(cx + r, cy, 1.0),
                PlineVertex::new(cx - r, cy, 1.0),
            ],
            closed: true,
        }
    }

    fn region(pline: Pline) -> Region {
        Region::new(vec![pline])
    }

    #[test]
    fn overlapping_squares() {
        let a = region(square(0.0, 0.0, 2.0));
        let b = region(square(1.0, 1.0, 2.0));
        let union = boolean_execute(&a, &b, BooleanOp::Union, 1e-10).unwrap();
        assert_eq!(union.loops.len(), 1);
        assert!((union.area() - 7.0).abs() < 1e-9);
        let inter = boolean_execute(&a, &b, BooleanOp::Intersect, 1e-10).unwrap();
        assert_eq!(inter.loops.len(), 1);
        assert!((inter.area() - 1.0).abs() < 1e-9);
        assert_eq!(inter.loops[0].segment_count(), 4);
        let diff = boolean_execute(&a, &b, BooleanOp::Difference, 1e-10).unwrap();
        assert!((diff.area() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn contained_square_becomes_hole() {
        let a = region(square(0.0, 0.0, 4.0));
        let b = region(square(1.0, 1.0, 1.0));
        let diff = boolean_execute(&a, &b, BooleanOp::Difference, 1e-10).unwrap();
        assert_eq!(diff.loops.len(), 2);
        assert!((diff.area() - 15.0).abs() < 1e-9);
        let union = boolean_execute(&a, &b, BooleanOp::Union, 1e-10).unwrap();
        assert_eq!(union, a);
    }

    #[test]
    fn half_disk_by_difference() {
        let disk = region(circle(0.0, 0.0, 5.0));
        let left = region(Pline::from_points(
            &[
                Point2::new(-10.0, -10.0),
                Point2::new(0.0, -10.0),
                Point2::new(0.0, 10.0),
                Point2::new(-10.0, 10.0),
            ],
            true,
        ));
        let half = boolean_execute(&disk, &left, BooleanOp::Difference, 1e-10).unwrap();
        assert!((half.area() - PI * 25.0 / 2.0).abs() < 1e-9, "area {}", half.area());
    }

    #[test]
    fn edge_glued_squares_merge() {
        let a = region(square(0.0, 0.0, 1.0));
        let b = region(square(1.0, 0.0, 1.0));
        let union = boolean_execute(&a, &b, BooleanOp::Union, 1e-10).unwrap();
        assert_eq!(union.loops.len(), 1);
        assert_eq!(union.loops[0].segment_count(), 4);
        assert!((union.area() - 2.0).abs() < 1e-12);
        let inter = boolean_execute(&a, &b, BooleanOp::Intersect, 1e-10).unwrap();
        assert!(inter.loops.is_empty());
    }

    #[test]
    fn identical_regions() {
        let a = region(square(0.0, 0.0, 1.0));
        let inter = boolean_execute(&a, &a, BooleanOp::Intersect, 1e-10).unwrap();
        assert!((inter.area() - 1.0).abs() < 1e-12);
        let diff = boolean_execute(&a, &a, BooleanOp::Difference, 1e-10).unwrap();
        assert!(diff.is_empty());
    }

    #[test]
    fn universe_minus_circle_is_unbounded() {
        let c = region(circle(0.0, 0.0, 1.0));
        let r = boolean_execute(&Region::universe(), &c, BooleanOp::Difference, 1e-10).unwrap();
        assert!(r.unbounded);
        assert!(!r.covers(&Point2::new(0.0, 0.0)));
        assert!(r.covers(&Point2::new(5.0, 5.0)));
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let a = region(square(0.0, 0.0, 1.0));
        assert!(boolean_execute(&a, &a, BooleanOp::Union, -1.0).is_err());
    }

    #[test]
    fn positions() {
        let big = region(square(0.0, 0.0, 4.0));
        let small = region(square(1.0, 1.0, 1.0));
        let far = region(square(10.0, 0.0, 1.0));
        let crossing = region(square(3.0, 3.0, 2.0));
        assert_eq!(spatial_position(&big, &small, 1e-10), SpatialPosition::In);
        assert_eq!(spatial_position(&small, &big, 1e-10), SpatialPosition::PartiallyIn);
        assert_eq!(spatial_position(&big, &far, 1e-10), SpatialPosition::Out);
        assert_eq!(spatial_position(&big, &crossing, 1e-10), SpatialPosition::PartiallyIn);
        assert_eq!(spatial_position(&big, &big, 1e-10), SpatialPosition::On);
        let flush = region(square(0.0, 0.0, 1.0));
        assert_eq!(spatial_position(&big, &flush, 1e-10), SpatialPosition::In);
    }
}
