use crate::math::Point2;

use super::classify::{classify_piece, PieceClassification};
use super::region::Region;
use super::split::{split_boundaries, Operand, SplitBoundaries};

/// Per-loop classification of `a`'s split boundary against `b`.
fn classify_a(split: &SplitBoundaries, b: &Region, tol: f64) -> Vec<Vec<(PieceClassification, f64)>> {
    let boundary = b.pieces();
    split
        .loops(Operand::A)
        .iter()
        .map(|ids| {
            ids.iter()
                .filter_map(|&id| split.get(id))
                .map(|sp| (classify_piece(&sp.piece, b, &boundary, tol), sp.piece.length()))
                .collect()
        })
        .collect()
}

/// True if the boundaries share at least one interval of positive length.
#[must_use]
pub fn are_contiguous(a: &Region, b: &Region, tol: f64) -> bool {
    let split = split_boundaries(a, b, tol);
    classify_a(&split, b, tol)
        .iter()
        .flatten()
        .any(|(class, length)| class.is_on() && *length > tol)
}

/// True if the boundaries meet without crossing each other.
#[must_use]
pub fn are_adjacent(a: &Region, b: &Region, tol: f64) -> bool {
    let split = split_boundaries(a, b, tol);
    let classes_a = classify_a(&split, b, tol);
    let touching = !split.contacts().is_empty()
        || classes_a.iter().flatten().any(|(class, _)| class.is_on());
    if !touching {
        return false;
    }
    let boundary_a = a.pieces();
    let classes_b: Vec<PieceClassification> = split
        .iter()
        .filter(|(_, sp)| sp.operand == Operand::B)
        .map(|(_, sp)| classify_piece(&sp.piece, a, &boundary_a, tol))
        .collect();
    !crosses(classes_a.iter().flatten().map(|(c, _)| *c)) && !crosses(classes_b)
}

/// A boundary crosses the other one when it has pieces on both sides.
fn crosses(classes: impl IntoIterator<Item = PieceClassification>) -> bool {
    let (mut inside, mut outside) = (false, false);
    for class in classes {
        inside |= class == PieceClassification::Inside;
        outside |= class == PieceClassification::Outside;
    }
    inside && outside
}

/// End points of the intervals shared by both boundaries, in the order they
/// are met walking `a`'s loops.
#[must_use]
pub fn contiguousness_points(a: &Region, b: &Region, tol: f64) -> Vec<Point2> {
    let split = split_boundaries(a, b, tol);
    let classes = classify_a(&split, b, tol);
    let mut points: Vec<Point2> = Vec::new();
    let mut push = |p: Point2| {
        if points.iter().all(|q| (q - p).norm() > tol) {
            points.push(p);
        }
    };
    for (ids, loop_classes) in split.loops(Operand::A).iter().zip(&classes) {
        let n = ids.len();
        let on: Vec<bool> = loop_classes.iter().map(|(c, _)| c.is_on()).collect();
        if n == 0 || on.iter().all(|&o| o) {
            continue;
        }
        for i in 0..n {
            let prev = on[(i + n - 1) % n];
            let Some(sp) = split.get(ids[i]) else {
                continue;
            };
            if on[i] && !prev {
                push(sp.piece.start);
            }
            if on[i] && !on[(i + 1) % n] {
                push(sp.piece.end);
            }
        }
    }
    points
}
