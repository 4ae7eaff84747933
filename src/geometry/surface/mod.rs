use crate::error::Result;
use crate::math::{Point3, Vector3};

/// Parameter rectangle `[u_min, u_max] x [v_min, v_max]` of a surface patch.
/// A bound pair may run backwards when the patch sweeps clockwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    pub u_min: f64,
    pub u_max: f64,
    pub v_min: f64,
    pub v_max: f64,
}

impl SurfaceDomain {
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }
}

/// Two-parameter surface in world space.
pub trait Surface {
    /// World point at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Fails when the placement cannot map the point to world space.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Unit world normal at `(u, v)`.
    ///
    /// # Errors
    ///
    /// Fails at singular points such as a cone apex.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3>;
}
