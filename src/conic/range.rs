use tracing::{debug, instrument};

use crate::config::TracerConfig;
use crate::error::Result;
use crate::geometry::Surface;
use crate::math::{Point3, Vector4};

use super::hconic::{HConic, HEllipse, HSegment};
use super::section::PlaneSection;
use super::{ConicKind, RotatedConic};

/// Axis-aligned 3D box; empty while `low > high`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range3 {
    pub low: Point3,
    pub high: Point3,
}

impl Default for Range3 {
    fn default() -> Self {
        Self::empty()
    }
}

impl Range3 {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            low: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            high: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    pub fn extend(&mut self, p: &Point3) {
        self.low = self.low.inf(p);
        self.high = self.high.sup(p);
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            low: self.low.inf(&other.low),
            high: self.high.sup(&other.high),
        }
    }

    #[must_use]
    pub fn contains(&self, p: &Point3, tol: f64) -> bool {
        (0..3).all(|i| self.low[i] - tol <= p[i] && p[i] <= self.high[i] + tol)
    }
}

const SAMPLE_GRID: u32 = 16;

impl RotatedConic {
    /// Local conics bounding the patch: the curves at both ends of each
    /// parameter. Planes contribute their four edges.
    #[must_use]
    pub fn boundary_conics(&self) -> Vec<HConic> {
        let small = self.tolerances.small_angle;
        let (u0, du) = (self.range.u_min, self.u_sweep());
        let (v0, v1) = (self.range.v_min, self.range.v_max);
        let dv = self.v_sweep();
        let full_u = crate::math::trig::is_full_sweep(du);
        let mut out = Vec::new();
        match self.kind {
            ConicKind::Plane => {
                let (u1, v1) = (self.range.u_max, self.range.v_max);
                let corners = [(u0, v0), (u1, v0), (u1, v1), (u0, v1)];
                for i in 0..4 {
                    let (a, b) = (corners[i], corners[(i + 1) % 4]);
                    out.push(HConic::Line(HSegment::new(
                        Vector4::new(a.0, a.1, 0.0, 1.0),
                        Vector4::new(b.0, b.1, 0.0, 1.0),
                    )));
                }
            }
            ConicKind::Cylinder | ConicKind::Cone => {
                let radius = |z: f64| if self.kind == ConicKind::Cone { z } else { 1.0 };
                for z in [v0, v1] {
                    out.push(HEllipse::z_circle(u0, du, radius(z), z, small));
                }
                if !full_u {
                    for theta in [u0, u0 + du] {
                        let (s, c) = theta.sin_cos();
                        let at = |z: f64| Vector4::new(c * radius(z), s * radius(z), z, 1.0);
                        out.push(HConic::Line(HSegment::new(at(v0), at(v1))));
                    }
                }
            }
            ConicKind::Disk => {
                for r in [v0, v1] {
                    out.push(HEllipse::z_circle(u0, du, r, 0.0, small));
                }
                if !full_u {
                    for theta in [u0, u0 + du] {
                        let (s, c) = theta.sin_cos();
                        out.push(HConic::Line(HSegment::new(
                            Vector4::new(c * v0, s * v0, 0.0, 1.0),
                            Vector4::new(c * v1, s * v1, 0.0, 1.0),
                        )));
                    }
                }
            }
            ConicKind::Sphere => {
                for phi in [v0, v1] {
                    let (s, c) = phi.sin_cos();
                    out.push(HEllipse::z_circle(u0, du, c, s, small));
                }
                if !full_u {
                    for theta in [u0, u0 + du] {
                        out.push(HEllipse::meridian(v0, dv, theta, 1.0, 0.0, small));
                    }
                }
            }
            ConicKind::Torus { hoop_radius: b } => {
                if !crate::math::trig::is_full_sweep(dv) {
                    for phi in [v0, v1] {
                        let (s, c) = phi.sin_cos();
                        out.push(HEllipse::z_circle(u0, du, 1.0 + b * c, b * s, small));
                    }
                }
                if !full_u {
                    for theta in [u0, u0 + du] {
                        out.push(HEllipse::meridian(v0, dv, theta, b, 1.0, small));
                    }
                }
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {}
        }
        out.retain(|c| !c.is_null());
        out
    }

    /// World bounding box of the patch.
    ///
    /// # Errors
    ///
    /// Propagates evaluation failures of the placement map.
    #[instrument(level = "debug", skip(self), fields(kind = ?self.kind))]
    pub fn range(&self) -> Result<Range3> {
        let mut range = Range3::empty();
        match self.kind {
            ConicKind::Plane => {
                let r = self.range;
                for (u, v) in [(r.u_min, r.v_min), (r.u_max, r.v_min), (r.u_max, r.v_max), (r.u_min, r.v_max)] {
                    range.extend(&self.evaluate(u, v)?);
                }
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => self.sampled_range(&mut range)?,
            _ => {
                for conic in self.conics_to_world(self.boundary_conics()) {
                    conic.extend_range(&mut range);
                }
                // Extremes inside the patch lie on silhouettes seen along the axes.
                for axis in 0..3 {
                    let mut eye = Vector4::zeros();
                    eye[axis] = 1.0;
                    self.extend_by_silhouette(&eye, &mut range)?;
                }
                if range.is_empty() {
                    self.sampled_range(&mut range)?;
                }
            }
        }
        debug!(empty = range.is_empty(), "computed surface range");
        Ok(range)
    }

    fn extend_by_silhouette(&self, eye: &Vector4, range: &mut Range3) -> Result<()> {
        match self.silhouette(eye)? {
            PlaneSection::Exact(conics) => {
                for conic in conics {
                    conic.extend_range(range);
                }
            }
            PlaneSection::NoClosedForm => {
                self.trace_silhouette(eye, &TracerConfig::default(), |points, _, _| {
                    for p in points {
                        range.extend(p);
                    }
                    Ok(())
                })?;
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn sampled_range(&self, range: &mut Range3) -> Result<()> {
        let r = self.range;
        for i in 0..=SAMPLE_GRID {
            let u = r.u_min + (r.u_max - r.u_min) * f64::from(i) / f64::from(SAMPLE_GRID);
            for j in 0..=SAMPLE_GRID {
                let v = r.v_min + (r.v_max - r.v_min) * f64::from(j) / f64::from(SAMPLE_GRID);
                range.extend(&self.evaluate(u, v)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conic::PlacementMap;
    use crate::math::{Matrix4, Vector3};
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn box_union_and_contains() {
        let mut a = Range3::empty();
        assert!(a.is_empty());
        a.extend(&Point3::new(0.0, 0.0, 0.0));
        a.extend(&Point3::new(1.0, 2.0, 3.0));
        let mut b = Range3::empty();
        b.extend(&Point3::new(-1.0, 5.0, 0.5));
        let u = a.union(&b);
        assert_relative_eq!(u.low, Point3::new(-1.0, 0.0, 0.0));
        assert_relative_eq!(u.high, Point3::new(1.0, 5.0, 3.0));
        assert!(u.contains(&Point3::new(0.0, 4.0, 1.0), 0.0));
        assert!(!u.contains(&Point3::new(0.0, 4.0, 3.5), 0.1));
    }

    #[test]
    fn full_sphere_range_is_the_unit_cube() {
        let sphere = RotatedConic::frame_and_sweep(ConicKind::Sphere, PlacementMap::identity(), 0.0, TAU, -FRAC_PI_2, PI);
        let r = sphere.range().unwrap();
        assert_relative_eq!(r.low, Point3::new(-1.0, -1.0, -1.0), epsilon = 1e-9);
        assert_relative_eq!(r.high, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn quarter_cylinder_range() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, FRAC_PI_2);
        let r = cyl.range().unwrap();
        assert_relative_eq!(r.low, Point3::new(0.0, 0.0, 0.0), epsilon = 1e-9);
        assert_relative_eq!(r.high, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn moved_torus_range() {
        let torus = RotatedConic::frame_and_sweep(
            ConicKind::Torus { hoop_radius: 0.25 },
            PlacementMap::identity(),
            0.0,
            TAU,
            0.0,
            TAU,
        )
        .transformed(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 2.0)))
        .unwrap();
        let r = torus.range().unwrap();
        assert_relative_eq!(r.high.x, 1.25, epsilon = 1e-3);
        assert_relative_eq!(r.low.y, -1.25, epsilon = 1e-3);
        assert_relative_eq!(r.low.z, 1.75, epsilon = 1e-3);
        assert_relative_eq!(r.high.z, 2.25, epsilon = 1e-3);
    }

    #[test]
    fn plane_range_from_corners() {
        let square = RotatedConic::unit_square(PlacementMap::identity());
        let r = square.range().unwrap();
        assert_relative_eq!(r.high, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(square.boundary_conics().len(), 4);
    }
}
