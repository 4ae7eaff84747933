use crate::geometry::Piece;
use crate::math::Point2;

use super::region::Region;

/// Classification of a point relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Classification of a split boundary piece relative to the other region.
///
/// On-boundary pieces carry whether the two boundaries run the same way
/// there, i.e. whether both regions lie on the same side of the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceClassification {
    Inside,
    Outside,
    OnSameSense,
    OnOppositeSense,
}

impl PieceClassification {
    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::OnSameSense | Self::OnOppositeSense)
    }
}

/// Classifies a point as inside, outside, or on the boundary of a region.
///
/// Boundary membership is decided by distance within `tol`, everything else
/// by the winding number of the oriented loops.
#[must_use]
pub fn classify_point(region: &Region, point: &Point2, tol: f64) -> PointClassification {
    let on = region
        .loops
        .iter()
        .any(|l| l.distance_to(point) <= tol);
    if on {
        PointClassification::OnBoundary
    } else if region.covers(point) {
        PointClassification::Inside
    } else {
        PointClassification::Outside
    }
}

/// Classifies a split piece against `region`, whose boundary pieces are
/// passed in `boundary` so callers can compute them once.
///
/// Pieces never cross the other boundary, so their midpoint decides.
#[must_use]
pub fn classify_piece(
    piece: &Piece,
    region: &Region,
    boundary: &[Piece],
    tol: f64,
) -> PieceClassification {
    let mid = piece.midpoint();
    let closest = boundary
        .iter()
        .map(|b| {
            let (p, t) = b.closest_point(&mid);
            ((p - mid).norm(), b, t)
        })
        .min_by(|x, y| x.0.total_cmp(&y.0));

    if let Some((distance, other, t)) = closest {
        if distance <= tol {
            let sense = piece.tangent_at(0.5).dot(&other.tangent_at(t));
            return if sense >= 0.0 {
                PieceClassification::OnSameSense
            } else {
                PieceClassification::OnOppositeSense
            };
        }
    }
    if region.covers(&mid) {
        PieceClassification::Inside
    } else {
        PieceClassification::Outside
    }
}
