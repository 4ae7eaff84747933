use slotmap::SlotMap;

use crate::geometry::{Extent, Piece};
use crate::math::Point2;

use super::region::Region;

slotmap::new_key_type! {
    /// Identifier of a boundary piece produced by splitting.
    pub struct PieceId;
}

/// Which operand a boundary piece originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    A,
    B,
}

/// A boundary piece cut at every contact with the other operand.
#[derive(Debug, Clone, Copy)]
pub struct SplitPiece {
    pub piece: Piece,
    pub operand: Operand,
    pub loop_index: usize,
}

/// Both operands' boundaries, split at their mutual contacts.
#[derive(Debug, Default)]
pub struct SplitBoundaries {
    pieces: SlotMap<PieceId, SplitPiece>,
    loops_a: Vec<Vec<PieceId>>,
    loops_b: Vec<Vec<PieceId>>,
    contacts: Vec<Point2>,
}

impl SplitBoundaries {
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&SplitPiece> {
        self.pieces.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PieceId, &SplitPiece)> {
        self.pieces.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Split pieces of each loop of `operand`, in boundary order.
    #[must_use]
    pub fn loops(&self, operand: Operand) -> &[Vec<PieceId>] {
        match operand {
            Operand::A => &self.loops_a,
            Operand::B => &self.loops_b,
        }
    }

    /// Distinct points where the two boundaries meet, crossing or touching.
    #[must_use]
    pub fn contacts(&self) -> &[Point2] {
        &self.contacts
    }
}

/// Splits the boundaries of `a` and `b` at every crossing, touching vertex
/// and end of a shared interval.
#[must_use]
pub fn split_boundaries(a: &Region, b: &Region, tol: f64) -> SplitBoundaries {
    let pieces_a: Vec<Vec<Piece>> = a.loops.iter().map(|l| l.pieces()).collect();
    let pieces_b: Vec<Vec<Piece>> = b.loops.iter().map(|l| l.pieces()).collect();
    let extents_b: Vec<Vec<Extent>> = pieces_b
        .iter()
        .map(|l| l.iter().map(Piece::extent).collect())
        .collect();

    let mut params_a: Vec<Vec<Vec<f64>>> = pieces_a.iter().map(|l| vec![Vec::new(); l.len()]).collect();
    let mut params_b: Vec<Vec<Vec<f64>>> = pieces_b.iter().map(|l| vec![Vec::new(); l.len()]).collect();
    let mut contacts: Vec<Point2> = Vec::new();

    for (la, loop_a) in pieces_a.iter().enumerate() {
        for (ia, pa) in loop_a.iter().enumerate() {
            let extent_a = pa.extent();
            for (lb, loop_b) in pieces_b.iter().enumerate() {
                for (ib, pb) in loop_b.iter().enumerate() {
                    if !extent_a.overlaps(&extents_b[lb][ib], tol) {
                        continue;
                    }
                    for hit in pa.intersect(pb, tol) {
                        params_a[la][ia].push(hit.t);
                        params_b[lb][ib].push(hit.u);
                        record_contact(&mut contacts, hit.point, tol);
                    }
                    // Vertices resting on the other boundary without a transversal hit.
                    for v in [pb.start, pb.end] {
                        if let Some(t) = touch_param(pa, &v, tol) {
                            params_a[la][ia].push(t);
                            record_contact(&mut contacts, v, tol);
                        }
                    }
                    for v in [pa.start, pa.end] {
                        if let Some(u) = touch_param(pb, &v, tol) {
                            params_b[lb][ib].push(u);
                            record_contact(&mut contacts, v, tol);
                        }
                    }
                }
            }
        }
    }

    let mut split = SplitBoundaries {
        contacts,
        ..SplitBoundaries::default()
    };
    split.loops_a = insert_split(&mut split.pieces, &pieces_a, &params_a, Operand::A, tol);
    split.loops_b = insert_split(&mut split.pieces, &pieces_b, &params_b, Operand::B, tol);
    split
}

fn insert_split(
    arena: &mut SlotMap<PieceId, SplitPiece>,
    loops: &[Vec<Piece>],
    params: &[Vec<Vec<f64>>],
    operand: Operand,
    tol: f64,
) -> Vec<Vec<PieceId>> {
    loops
        .iter()
        .zip(params)
        .enumerate()
        .map(|(loop_index, (pieces, cuts))| {
            let mut ids = Vec::with_capacity(pieces.len());
            for (piece, cuts) in pieces.iter().zip(cuts) {
                let eps = (tol / piece.length().max(f64::MIN_POSITIVE)).max(1e-12);
                for part in piece.split_at(cuts, eps) {
                    ids.push(arena.insert(SplitPiece {
                        piece: part,
                        operand,
                        loop_index,
                    }));
                }
            }
            ids
        })
        .collect()
}

fn touch_param(piece: &Piece, v: &Point2, tol: f64) -> Option<f64> {
    let (closest, t) = piece.closest_point(v);
    ((closest - v).norm() <= tol).then_some(t)
}

fn record_contact(contacts: &mut Vec<Point2>, p: Point2, tol: f64) {
    if contacts.iter().all(|q| (q - p).norm() > tol) {
        contacts.push(p);
    }
}
