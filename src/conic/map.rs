use crate::error::{ConicError, GeometryError, Result};
use crate::math::{Matrix4, Point3, Vector3, Vector4};

/// A homogeneous 4x4 map from a surface's local space to world space,
/// stored together with its inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementMap {
    forward: Matrix4,
    inverse: Matrix4,
}

impl Default for PlacementMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl PlacementMap {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            forward: Matrix4::identity(),
            inverse: Matrix4::identity(),
        }
    }

    /// Wraps a local-to-world matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::SingularMap`] if `forward` has no inverse.
    pub fn new(forward: Matrix4) -> Result<Self> {
        let inverse = forward.try_inverse().ok_or(ConicError::SingularMap)?;
        Ok(Self { forward, inverse })
    }

    /// Affine map sending the local origin to `origin` and the local unit
    /// axes to `x`, `y`, `z`.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::SingularMap`] if the three vectors are dependent.
    pub fn from_frame(origin: &Point3, x: &Vector3, y: &Vector3, z: &Vector3) -> Result<Self> {
        #[rustfmt::skip]
        let forward = Matrix4::new(
            x.x, y.x, z.x, origin.x,
            x.y, y.y, z.y, origin.y,
            x.z, y.z, z.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        );
        Self::new(forward)
    }

    #[must_use]
    pub fn forward(&self) -> &Matrix4 {
        &self.forward
    }

    #[must_use]
    pub fn inverse(&self) -> &Matrix4 {
        &self.inverse
    }

    /// The map applying `inner` first, then `self`.
    #[must_use]
    pub fn then(&self, inner: &Self) -> Self {
        Self {
            forward: self.forward * inner.forward,
            inverse: inner.inverse * self.inverse,
        }
    }

    #[must_use]
    pub fn to_world(&self, local: &Vector4) -> Vector4 {
        self.forward * local
    }

    #[must_use]
    pub fn to_local(&self, world: &Vector4) -> Vector4 {
        self.inverse * world
    }

    /// # Errors
    ///
    /// Fails if the image lies at infinity.
    pub fn point_to_world(&self, local: &Point3) -> Result<Point3> {
        cartesian(&self.to_world(&homogeneous(local)))
            .ok_or_else(|| GeometryError::Degenerate("point maps to infinity".into()).into())
    }

    /// # Errors
    ///
    /// Fails if the image lies at infinity.
    pub fn point_to_local(&self, world: &Point3) -> Result<Point3> {
        cartesian(&self.to_local(&homogeneous(world)))
            .ok_or_else(|| GeometryError::Degenerate("point maps to infinity".into()).into())
    }

    /// Local coefficients of a world plane `h · X = 0`.
    #[must_use]
    pub fn plane_to_local(&self, world_plane: &Vector4) -> Vector4 {
        self.forward.transpose() * world_plane
    }

    /// World coefficients of a local plane.
    #[must_use]
    pub fn plane_to_world(&self, local_plane: &Vector4) -> Vector4 {
        self.inverse.transpose() * local_plane
    }

    /// Carries a local covector (an implicit gradient) to a world direction.
    #[must_use]
    pub fn gradient_to_world(&self, local_gradient: &Vector3) -> Vector3 {
        let linear = self.inverse.fixed_view::<3, 3>(0, 0);
        linear.transpose() * local_gradient
    }
}

pub(crate) fn homogeneous(p: &Point3) -> Vector4 {
    Vector4::new(p.x, p.y, p.z, 1.0)
}

/// Normalizes a homogeneous point; `None` at (or numerically at) infinity.
pub(crate) fn cartesian(v: &Vector4) -> Option<Point3> {
    let size = v.x.abs().max(v.y.abs()).max(v.z.abs());
    if v.w == 0.0 || v.w.abs() <= 1e-14 * size {
        return None;
    }
    Some(Point3::new(v.x / v.w, v.y / v.w, v.z / v.w))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_round_trip() {
        let map = PlacementMap::from_frame(
            &Point3::new(1.0, 2.0, 3.0),
            &Vector3::new(0.0, 2.0, 0.0),
            &Vector3::new(-2.0, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 0.5),
        )
        .unwrap();
        let world = map.point_to_world(&Point3::new(1.0, 1.0, 2.0)).unwrap();
        assert_relative_eq!(world, Point3::new(-1.0, 4.0, 4.0), epsilon = 1e-12);
        let back = map.point_to_local(&world).unwrap();
        assert_relative_eq!(back, Point3::new(1.0, 1.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn singular_frame_is_rejected() {
        let flat = PlacementMap::from_frame(
            &Point3::origin(),
            &Vector3::x(),
            &Vector3::new(2.0, 0.0, 0.0),
            &Vector3::z(),
        );
        assert!(flat.is_err());
    }

    #[test]
    fn planes_follow_points() {
        let map = PlacementMap::from_frame(
            &Point3::new(0.0, 0.0, 5.0),
            &Vector3::x(),
            &Vector3::y(),
            &Vector3::new(0.0, 0.0, 2.0),
        )
        .unwrap();
        // World plane z = 7 is local plane z = 1.
        let local = map.plane_to_local(&Vector4::new(0.0, 0.0, 1.0, -7.0));
        assert_relative_eq!(local.dot(&Vector4::new(3.0, 4.0, 1.0, 1.0)), 0.0, epsilon = 1e-12);
        let world = map.plane_to_world(&local);
        assert_relative_eq!(world, Vector4::new(0.0, 0.0, 1.0, -7.0), epsilon = 1e-12);
    }

    #[test]
    fn composition_order() {
        let shift = PlacementMap::from_frame(
            &Point3::new(1.0, 0.0, 0.0),
            &Vector3::x(),
            &Vector3::y(),
            &Vector3::z(),
        )
        .unwrap();
        let stretch = PlacementMap::from_frame(
            &Point3::origin(),
            &Vector3::new(3.0, 0.0, 0.0),
            &Vector3::y(),
            &Vector3::z(),
        )
        .unwrap();
        let both = shift.then(&stretch);
        let p = both.point_to_world(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(p.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(both.forward() * both.inverse(), Matrix4::identity(), epsilon = 1e-12);
    }
}
