use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{GeometryError, Result};
use crate::math::transform_2d::{is_affine, is_similarity};
use crate::math::{Matrix3, Point2};

static NEXT_FRAME_ID: AtomicU64 = AtomicU64::new(1);

/// A 2D coordinate system, placed by an affine map into the common world
/// frame.
///
/// Frames compare by identity: two frames built from the same matrix are
/// still different frames. Every world frame shares id `0`.
#[derive(Debug, Clone)]
pub struct Frame {
    id: u64,
    to_world: Matrix3,
    from_world: Matrix3,
}

impl Frame {
    #[must_use]
    pub fn world() -> Arc<Self> {
        Arc::new(Self {
            id: 0,
            to_world: Matrix3::identity(),
            from_world: Matrix3::identity(),
        })
    }

    /// A new frame whose coordinates map to world coordinates by `to_world`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the matrix is not an invertible
    /// affine map.
    pub fn with_transform(to_world: Matrix3) -> Result<Arc<Self>> {
        if !is_affine(&to_world) {
            return Err(GeometryError::Degenerate("frame map is not affine".into()).into());
        }
        let from_world = to_world
            .try_inverse()
            .ok_or_else(|| GeometryError::Degenerate("frame map is singular".into()))?;
        Ok(Arc::new(Self {
            id: NEXT_FRAME_ID.fetch_add(1, Ordering::Relaxed),
            to_world,
            from_world,
        }))
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn to_world(&self) -> &Matrix3 {
        &self.to_world
    }

    /// Map from coordinates in `self` to coordinates in `to`.
    #[must_use]
    pub fn relative_transform(&self, to: &Self) -> Matrix3 {
        to.from_world * self.to_world
    }

    /// True if shapes keep their kind when re-expressed in `other`: the
    /// relative map is a rotation, reflection, translation or uniform scale.
    #[must_use]
    pub fn has_shape_preserving_relation_to(&self, other: &Self) -> bool {
        self == other || is_similarity(&self.relative_transform(other))
    }

    /// `p`, given in `self`, expressed in `to`.
    #[must_use]
    pub fn point_expressed_in(&self, p: &Point2, to: &Self) -> Point2 {
        self.relative_transform(to).transform_point(p)
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Frame {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn worlds_are_equal() {
        assert_eq!(*Frame::world(), *Frame::world());
    }

    #[test]
    fn frames_are_distinct_by_identity() {
        let a = Frame::with_transform(Matrix3::identity()).unwrap();
        let b = Frame::with_transform(Matrix3::identity()).unwrap();
        assert_ne!(*a, *b);
        assert!(a.has_shape_preserving_relation_to(&b));
    }

    #[test]
    fn relative_transform_round_trips_points() {
        let shifted = Frame::with_transform(Matrix3::new(
            0.0, -1.0, 5.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0,
        ))
        .unwrap();
        let world = Frame::world();
        let p = shifted.point_expressed_in(&Point2::new(1.0, 0.0), &world);
        assert!((p - Point2::new(5.0, 1.0)).norm() < 1e-12);
        let back = world.point_expressed_in(&p, &shifted);
        assert!((back - Point2::new(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn stretched_frame_is_not_shape_preserving() {
        let stretched =
            Frame::with_transform(Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0)).unwrap();
        assert!(!stretched.has_shape_preserving_relation_to(&Frame::world()));
    }

    #[test]
    fn singular_map_is_rejected() {
        assert!(Frame::with_transform(Matrix3::zeros()).is_err());
    }
}
