//! Classification of 2D homogeneous affine maps.

use super::Matrix3;

const RELATIVE_EPS: f64 = 1e-12;

/// True if the last row is `[0, 0, 1]`.
#[must_use]
pub fn is_affine(m: &Matrix3) -> bool {
    m[(2, 0)] == 0.0 && m[(2, 1)] == 0.0 && m[(2, 2)] == 1.0
}

/// True if the linear part is a rotation (or reflection) times a uniform scale.
#[must_use]
pub fn is_similarity(m: &Matrix3) -> bool {
    let a = m.fixed_view::<2, 2>(0, 0);
    let n0 = a.column(0).norm();
    let n1 = a.column(1).norm();
    let scale = n0.max(n1);
    scale > 0.0
        && (n0 - n1).abs() <= RELATIVE_EPS * scale
        && a.column(0).dot(&a.column(1)).abs() <= RELATIVE_EPS * scale * scale
}

/// True if the map sends the coordinate axes onto the coordinate axes,
/// possibly swapping them.
#[must_use]
pub fn is_axis_preserving(m: &Matrix3) -> bool {
    let scale = m.fixed_view::<2, 2>(0, 0).abs().max();
    let tiny = |v: f64| v.abs() <= RELATIVE_EPS * scale;
    (tiny(m[(0, 1)]) && tiny(m[(1, 0)])) || (tiny(m[(0, 0)]) && tiny(m[(1, 1)]))
}

/// Determinant of the linear part.
#[must_use]
pub fn linear_determinant(m: &Matrix3) -> f64 {
    m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)]
}

/// Uniform scale factor of a similarity.
#[must_use]
pub fn similarity_scale(m: &Matrix3) -> f64 {
    linear_determinant(m).abs().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation(angle: f64) -> Matrix3 {
        let (s, c) = angle.sin_cos();
        Matrix3::new(c, -s, 1.0, s, c, 2.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn rotation_is_similarity() {
        let m = rotation(0.3) * Matrix3::new(2.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 1.0);
        assert!(is_affine(&m));
        assert!(is_similarity(&m));
        assert!(!is_axis_preserving(&m));
        assert!((similarity_scale(&m) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn stretch_is_axis_preserving_only() {
        let m = Matrix3::new(2.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(!is_similarity(&m));
        assert!(is_axis_preserving(&m));
        assert!(is_axis_preserving(&rotation(std::f64::consts::FRAC_PI_2)));
    }

    #[test]
    fn points_pick_up_translation() {
        let p = rotation(0.0).transform_point(&crate::math::Point2::new(1.0, 0.0));
        assert!((p.x - 2.0).abs() < 1e-15 && (p.y - 2.0).abs() < 1e-15);
    }
}
