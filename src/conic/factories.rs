use crate::error::{ConicError, Result};
use crate::geometry::SurfaceDomain;
use crate::math::{Matrix4, Point3, Vector3};

use super::map::PlacementMap;
use super::{ConicKind, RotatedConic};

/// Frustum of a circular cone; `radius0` at local `z = 0`, `radius1` at `z = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeDetail {
    pub frame: Matrix4,
    pub radius0: f64,
    pub radius1: f64,
    pub theta0: f64,
    pub sweep: f64,
}

/// Ellipsoid patch: the unit sphere placed by `frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidDetail {
    pub frame: Matrix4,
    pub theta0: f64,
    pub theta_sweep: f64,
    pub phi0: f64,
    pub phi_sweep: f64,
}

/// Torus patch with major radius 1 and minor radius `minor_ratio` in the
/// local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TorusDetail {
    pub frame: Matrix4,
    pub minor_ratio: f64,
    pub theta0: f64,
    pub theta_sweep: f64,
    pub phi0: f64,
    pub phi_sweep: f64,
}

/// Annular sector in the local `z = 0` plane.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskDetail {
    pub frame: Matrix4,
    pub radius0: f64,
    pub radius1: f64,
    pub theta0: f64,
    pub sweep: f64,
}

impl RotatedConic {
    /// Cylinder patch of height one over the angle range `theta0..theta0 + sweep`.
    #[must_use]
    pub fn unit_cylinder(map: PlacementMap, theta0: f64, sweep: f64) -> Self {
        Self::frame_and_sweep(ConicKind::Cylinder, map, theta0, sweep, 0.0, 1.0)
    }

    #[must_use]
    pub fn frame_and_sweep(kind: ConicKind, map: PlacementMap, theta0: f64, theta_sweep: f64, alpha0: f64, alpha_sweep: f64) -> Self {
        Self::new(
            kind,
            map,
            SurfaceDomain::new(theta0, theta0 + theta_sweep, alpha0, alpha0 + alpha_sweep),
        )
    }

    /// The unit square `[0, 1]²` of the local `z = 0` plane.
    #[must_use]
    pub fn unit_square(map: PlacementMap) -> Self {
        Self::new(ConicKind::Plane, map, SurfaceDomain::new(0.0, 1.0, 0.0, 1.0))
    }

    /// Parallelogram spanned from `origin` to the corners `x_point` and `y_point`.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::DegenerateFrame`] if the corners are collinear
    /// with the origin.
    pub fn parallelogram(origin: &Point3, x_point: &Point3, y_point: &Point3) -> Result<Self> {
        let x = x_point - origin;
        let y = y_point - origin;
        let z = x.cross(&y);
        let (lx, ly, lz) = (x.norm(), y.norm(), z.norm());
        if lz <= crate::math::TOLERANCE * lx * ly || lz == 0.0 {
            return Err(ConicError::DegenerateFrame("parallelogram sides are parallel".into()).into());
        }
        // Normal sized like the sides so the map stays well conditioned.
        let z = z * ((lx * ly).sqrt() / lz);
        Ok(Self::unit_square(PlacementMap::from_frame(origin, &x, &y, &z)?))
    }

    /// Orthonormal frame whose z axis is the line through `center` along
    /// `axis` and whose x axis points at the target farthest from that line.
    ///
    /// # Errors
    ///
    /// Fails for a zero axis, for no targets, or if every target is on the axis.
    pub fn axis_frame(center: &Point3, axis: &Vector3, targets: &[Point3]) -> Result<PlacementMap> {
        let len = axis.norm();
        if len <= crate::math::TOLERANCE {
            return Err(ConicError::DegenerateFrame("zero rotation axis".into()).into());
        }
        let z = axis / len;
        let radial = |p: &Point3| {
            let d = p - center;
            d - z * d.dot(&z)
        };
        let farthest = targets
            .iter()
            .max_by(|a, b| radial(a).norm_squared().total_cmp(&radial(b).norm_squared()))
            .ok_or_else(|| ConicError::DegenerateFrame("no generator points".into()))?;
        let r = radial(farthest);
        let x = if r.norm() > crate::math::TOLERANCE {
            r.normalize()
        } else {
            // Generator on the axis: any perpendicular will do.
            let seed = if z.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
            (seed - z * seed.dot(&z)).normalize()
        };
        let origin = center + z * (farthest - center).dot(&z);
        PlacementMap::from_frame(&origin, &x, &z.cross(&x), &z)
    }

    /// Surface swept by the segment `start..end` turning `sweep` radians
    /// about the axis through `center`.
    ///
    /// # Errors
    ///
    /// See [`Self::axis_frame`].
    pub fn rotated_line(start: &Point3, end: &Point3, center: &Point3, axis: &Vector3, sweep: f64) -> Result<Self> {
        let map = Self::axis_frame(center, axis, &[*start, *end])?;
        let kind = ConicKind::RotatedLine {
            start: map.point_to_local(start)?,
            end: map.point_to_local(end)?,
        };
        Ok(Self::new(kind, map, SurfaceDomain::new(0.0, sweep, 0.0, 1.0)))
    }

    /// Surface swept by the elliptic arc `center + vector0 cos φ + vector90 sin φ`,
    /// `φ` in `phi0..phi0 + phi_sweep`, turning `sweep` radians about the axis
    /// through `axis_center`.
    ///
    /// # Errors
    ///
    /// See [`Self::axis_frame`].
    #[allow(clippy::too_many_arguments)]
    pub fn rotated_ellipse(
        center: &Point3,
        vector0: &Vector3,
        vector90: &Vector3,
        phi0: f64,
        phi_sweep: f64,
        axis_center: &Point3,
        axis: &Vector3,
        sweep: f64,
    ) -> Result<Self> {
        let samples: Vec<Point3> = (0..5_i32)
            .map(|i| {
                let (s, c) = (phi0 + phi_sweep * f64::from(i) / 4.0).sin_cos();
                center + vector0 * c + vector90 * s
            })
            .collect();
        let map = Self::axis_frame(axis_center, axis, &samples)?;
        let linear = map.inverse().fixed_view::<3, 3>(0, 0).into_owned();
        let kind = ConicKind::RotatedEllipse {
            center: map.point_to_local(center)?,
            vector0: linear * vector0,
            vector90: linear * vector90,
        };
        Ok(Self::new(
            kind,
            map,
            SurfaceDomain::new(0.0, sweep, phi0, phi0 + phi_sweep),
        ))
    }

    /// # Errors
    ///
    /// Fails if the frame is singular.
    pub fn from_cone(detail: &ConeDetail) -> Result<Self> {
        let generator = Self::new(
            ConicKind::RotatedLine {
                start: Point3::new(detail.radius0, 0.0, 0.0),
                end: Point3::new(detail.radius1, 0.0, 1.0),
            },
            PlacementMap::identity(),
            SurfaceDomain::new(detail.theta0, detail.theta0 + detail.sweep, 0.0, 1.0),
        );
        generator.copy_classified()?.transformed(&detail.frame)
    }

    /// # Errors
    ///
    /// Fails if the frame is singular.
    pub fn from_ellipsoid(detail: &EllipsoidDetail) -> Result<Self> {
        Ok(Self::frame_and_sweep(
            ConicKind::Sphere,
            PlacementMap::new(detail.frame)?,
            detail.theta0,
            detail.theta_sweep,
            detail.phi0,
            detail.phi_sweep,
        ))
    }

    /// # Errors
    ///
    /// Fails if the frame is singular.
    pub fn from_torus(detail: &TorusDetail) -> Result<Self> {
        Ok(Self::frame_and_sweep(
            ConicKind::Torus {
                hoop_radius: detail.minor_ratio,
            },
            PlacementMap::new(detail.frame)?,
            detail.theta0,
            detail.theta_sweep,
            detail.phi0,
            detail.phi_sweep,
        ))
    }

    /// # Errors
    ///
    /// Fails if the frame is singular.
    pub fn from_disk(detail: &DiskDetail) -> Result<Self> {
        let generator = Self::new(
            ConicKind::RotatedLine {
                start: Point3::new(detail.radius0, 0.0, 0.0),
                end: Point3::new(detail.radius1, 0.0, 0.0),
            },
            PlacementMap::identity(),
            SurfaceDomain::new(detail.theta0, detail.theta0 + detail.sweep, 0.0, 1.0),
        );
        generator.copy_classified()?.transformed(&detail.frame)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Surface;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn parallelogram_corners() {
        let p = RotatedConic::parallelogram(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(3.0, 1.0, 0.0),
            &Point3::new(1.0, 4.0, 0.0),
        )
        .unwrap();
        assert_relative_eq!(p.evaluate(1.0, 1.0).unwrap(), Point3::new(3.0, 4.0, 0.0), epsilon = 1e-12);
        let plane = p.is_planar().unwrap();
        assert_relative_eq!(plane.x.abs() + plane.y.abs(), 0.0, epsilon = 1e-12);
        assert!(RotatedConic::parallelogram(&Point3::origin(), &Point3::new(1.0, 0.0, 0.0), &Point3::new(2.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn axis_frame_points_at_farthest_target() {
        let map = RotatedConic::axis_frame(
            &Point3::origin(),
            &Vector3::new(0.0, 0.0, 2.0),
            &[Point3::new(0.0, 1.0, 3.0), Point3::new(0.0, 2.0, 5.0)],
        )
        .unwrap();
        let origin = map.point_to_world(&Point3::origin()).unwrap();
        assert_relative_eq!(origin, Point3::new(0.0, 0.0, 5.0), epsilon = 1e-12);
        let x = map.point_to_world(&Point3::new(1.0, 0.0, 0.0)).unwrap() - origin;
        assert_relative_eq!(x, Vector3::y(), epsilon = 1e-12);
        assert!(RotatedConic::axis_frame(&Point3::origin(), &Vector3::zeros(), &[Point3::origin()]).is_err());
        assert!(RotatedConic::axis_frame(&Point3::origin(), &Vector3::z(), &[]).is_err());
    }

    #[test]
    fn rotated_line_sweeps_its_segment() {
        let s = RotatedConic::rotated_line(
            &Point3::new(2.0, 0.0, 0.0),
            &Point3::new(3.0, 0.0, 1.0),
            &Point3::origin(),
            &Vector3::z(),
            FRAC_PI_2,
        )
        .unwrap();
        assert_relative_eq!(s.evaluate(0.0, 0.0).unwrap(), Point3::new(2.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(s.evaluate(FRAC_PI_2, 1.0).unwrap(), Point3::new(0.0, 3.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn rotated_ellipse_sweeps_its_arc() {
        let s = RotatedConic::rotated_ellipse(
            &Point3::new(2.0, 0.0, 0.0),
            &Vector3::new(0.5, 0.0, 0.0),
            &Vector3::new(0.0, 0.0, 0.5),
            0.0,
            TAU,
            &Point3::origin(),
            &Vector3::z(),
            PI,
        )
        .unwrap();
        assert_relative_eq!(s.evaluate(PI, 0.0).unwrap(), Point3::new(-2.5, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(s.evaluate(0.0, FRAC_PI_2).unwrap(), Point3::new(2.0, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn cone_detail_becomes_truncated_cone() {
        let detail = ConeDetail {
            frame: Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)),
            radius0: 2.0,
            radius1: 1.0,
            theta0: 0.0,
            sweep: TAU,
        };
        let cone = RotatedConic::from_cone(&detail).unwrap();
        assert_eq!(cone.kind(), &ConicKind::Cone);
        let r = cone.parameter_range();
        assert_relative_eq!(r.v_min, 0.5, epsilon = 1e-12);
        // Bottom rim at world z = 1 with radius 2, top rim at z = 2 with radius 1.
        let bottom = cone.evaluate(0.0, 1.0).unwrap();
        assert_relative_eq!(bottom, Point3::new(2.0, 0.0, 1.0), epsilon = 1e-12);
        let top = cone.evaluate(0.0, 0.5).unwrap();
        assert_relative_eq!(top, Point3::new(1.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn cylinder_detail_and_disk_detail() {
        let cyl = RotatedConic::from_cone(&ConeDetail {
            frame: Matrix4::identity(),
            radius0: 1.5,
            radius1: 1.5,
            theta0: 0.0,
            sweep: PI,
        })
        .unwrap();
        assert_eq!(cyl.kind(), &ConicKind::Cylinder);
        assert_relative_eq!(cyl.evaluate(FRAC_PI_2, 1.0).unwrap(), Point3::new(0.0, 1.5, 1.0), epsilon = 1e-12);

        let annulus = RotatedConic::from_disk(&DiskDetail {
            frame: Matrix4::identity(),
            radius0: 1.0,
            radius1: 3.0,
            theta0: 0.0,
            sweep: TAU,
        })
        .unwrap();
        assert_eq!(annulus.kind(), &ConicKind::Disk);
        let r = annulus.parameter_range();
        assert_relative_eq!(r.v_min, 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn torus_and_ellipsoid_details() {
        let torus = RotatedConic::from_torus(&TorusDetail {
            frame: Matrix4::new_scaling(2.0),
            minor_ratio: 0.25,
            theta0: 0.0,
            theta_sweep: TAU,
            phi0: 0.0,
            phi_sweep: TAU,
        })
        .unwrap();
        assert_relative_eq!(torus.evaluate(0.0, 0.0).unwrap(), Point3::new(2.5, 0.0, 0.0), epsilon = 1e-12);
        let ellipsoid = RotatedConic::from_ellipsoid(&EllipsoidDetail {
            frame: Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 2.0, 3.0)),
            theta0: 0.0,
            theta_sweep: TAU,
            phi0: -FRAC_PI_2,
            phi_sweep: PI,
        })
        .unwrap();
        assert_relative_eq!(ellipsoid.evaluate(0.0, FRAC_PI_2).unwrap().z, 3.0, epsilon = 1e-12);
    }
}
