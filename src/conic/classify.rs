//! Reduction of swept generators to canonical surfaces.
//!
//! A segment turned about the z axis is a disk, cone or cylinder when it is
//! coplanar with the axis; an elliptic arc centered on the axis is a sphere
//! (an ellipsoid after placement) and one beside it is a torus. Anything else
//! stays a generator.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use tracing::{debug, instrument};

use crate::error::Result;
use crate::geometry::SurfaceDomain;
use crate::math::{Point3, Vector3};

use super::map::PlacementMap;
use super::{ConicKind, RotatedConic};

impl RotatedConic {
    /// Copy of the surface rewritten to the most specific kind that
    /// describes it. Canonical kinds and irreducible generators come back
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Fails only if a reduced frame turns out singular.
    #[instrument(level = "debug", skip(self), fields(kind = ?self.kind))]
    pub fn copy_classified(&self) -> Result<Self> {
        let local = match &self.kind {
            ConicKind::RotatedLine { start, end } => self.classify_line(start, end)?,
            ConicKind::RotatedEllipse {
                center,
                vector0,
                vector90,
            } => self.classify_ellipse(center, vector0, vector90)?,
            _ => None,
        };
        match local {
            Some((kind, local_map, v0, v1)) => {
                debug!(to = ?kind, "reclassified generator");
                Ok(Self::new(
                    kind,
                    self.map.then(&local_map),
                    SurfaceDomain::new(self.range.u_min, self.range.u_max, v0, v1),
                )
                .with_tolerances(self.tolerances))
            }
            None => {
                debug!("generator kept");
                Ok(self.clone())
            }
        }
    }

    #[allow(clippy::type_complexity)]
    fn classify_line(&self, start: &Point3, end: &Point3) -> Result<Option<(ConicKind, PlacementMap, f64, f64)>> {
        let scale = start.coords.amax().max(end.coords.amax()).max(1.0);
        let tol = self.tolerances.small_angle * scale;
        let small = self.tolerances.small_angle;

        let (mut s, mut e) = (*start, *end);
        let (mut r0, mut r1) = (s.x.hypot(s.y), e.x.hypot(e.y));
        if r0 < r1 {
            std::mem::swap(&mut s, &mut e);
            std::mem::swap(&mut r0, &mut r1);
        }
        if r0 <= tol {
            return Ok(None);
        }
        let x = Vector3::new(s.x, s.y, 0.0);
        let y = Vector3::new(-s.y, s.x, 0.0);
        // Both ends in the same half-plane through the axis.
        let same_angle = {
            let cross = s.x * e.y - s.y * e.x;
            let dot = s.x * e.x + s.y * e.y;
            cross.abs() <= tol * r0 && dot >= 0.0
        };

        if (s.z - e.z).abs() <= tol {
            let z = Vector3::new(0.0, 0.0, r0);
            let map = PlacementMap::from_frame(&Point3::new(0.0, 0.0, s.z), &x, &y, &z)?;
            if r1 <= tol {
                return Ok(Some((ConicKind::Disk, map, 0.0, 1.0)));
            }
            if !same_angle {
                return Ok(None);
            }
            return Ok(Some((ConicKind::Disk, map, r1 / r0, 1.0)));
        }
        if r1 < small * r0 {
            let z = Vector3::new(0.0, 0.0, s.z - e.z);
            let map = PlacementMap::from_frame(&Point3::new(0.0, 0.0, e.z), &x, &y, &z)?;
            return Ok(Some((ConicKind::Cone, map, 0.0, 1.0)));
        }
        if !same_angle {
            return Ok(None);
        }
        if (r0 - r1).abs() <= tol {
            let z = Vector3::new(0.0, 0.0, e.z - s.z);
            let map = PlacementMap::from_frame(&Point3::new(0.0, 0.0, s.z), &x, &y, &z)?;
            return Ok(Some((ConicKind::Cylinder, map, 0.0, 1.0)));
        }
        let apex = s.z + (e.z - s.z) * r0 / (r0 - r1);
        let z = Vector3::new(0.0, 0.0, s.z - apex);
        let map = PlacementMap::from_frame(&Point3::new(0.0, 0.0, apex), &x, &y, &z)?;
        Ok(Some((ConicKind::Cone, map, r1 / r0, 1.0)))
    }

    #[allow(clippy::type_complexity)]
    fn classify_ellipse(
        &self,
        center: &Point3,
        vector0: &Vector3,
        vector90: &Vector3,
    ) -> Result<Option<(ConicKind, PlacementMap, f64, f64)>> {
        let scale = center.coords.amax().max(vector0.amax()).max(vector90.amax()).max(1.0);
        let tol = self.tolerances.small_angle * scale;
        let small = self.tolerances.small_angle;

        // Rotate the basis so vector0 is horizontal.
        let a = (-vector0.z).atan2(vector90.z);
        let (sa, ca) = a.sin_cos();
        let mut v0 = vector0 * ca + vector90 * sa;
        let v90 = -vector0 * sa + vector90 * ca;
        let mut phi0 = self.range.v_min - a;
        let mut phi1 = self.range.v_max - a;
        if v90.x.hypot(v90.y) > tol || v90.z.abs() <= tol {
            return Ok(None);
        }
        let r0 = v0.norm();
        if r0 <= tol {
            return Ok(None);
        }
        let x_dir = v0 / r0;
        let y_dir = Vector3::z().cross(&x_dir);
        if center.coords.dot(&y_dir).abs() > tol {
            return Ok(None);
        }
        let center_x = center.coords.dot(&x_dir);
        let rx = center.x.hypot(center.y);

        if rx <= tol {
            let half = 0.5 * (phi1 - phi0).abs();
            let mut mid = lock_quarter(0.5 * (phi0 + phi1), small);
            mid = (mid + FRAC_PI_2).rem_euclid(TAU) - FRAC_PI_2;
            let half = lock_quarter(half, small);
            let (lo, hi) = (mid - half, mid + half);
            let eps = small;
            if lo >= -FRAC_PI_2 - eps && hi <= FRAC_PI_2 + eps {
                // Generator already on the +vector0 side.
            } else if lo >= FRAC_PI_2 - eps && hi <= 3.0 * FRAC_PI_2 + eps {
                mid = PI - mid;
                v0 = -v0;
            } else {
                return Ok(None);
            }
            let y = v90.cross(&v0).normalize() * r0;
            let map = PlacementMap::from_frame(&Point3::new(0.0, 0.0, center.z), &v0, &y, &v90)?;
            return Ok(Some((ConicKind::Sphere, map, mid - half, mid + half)));
        }

        if r0 < rx {
            // The tube angle is measured outward from the axis.
            if center_x < 0.0 {
                (phi0, phi1) = (PI - phi0, PI - phi1);
            }
            let lambda = v90.z / r0;
            let map = PlacementMap::from_frame(
                &Point3::new(0.0, 0.0, center.z),
                &Vector3::new(center.x, center.y, 0.0),
                &Vector3::new(-center.y, center.x, 0.0),
                &Vector3::new(0.0, 0.0, lambda * rx),
            )?;
            return Ok(Some((ConicKind::Torus { hoop_radius: r0 / rx }, map, phi0, phi1)));
        }
        Ok(None)
    }
}

/// Snaps an angle lying within `small` of a multiple of π/2 onto it.
fn lock_quarter(angle: f64, small: f64) -> f64 {
    let k = (angle / FRAC_PI_2).round();
    if (angle - k * FRAC_PI_2).abs() <= small {
        k * FRAC_PI_2
    } else {
        angle
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::Surface;
    use approx::assert_relative_eq;

    fn line(start: Point3, end: Point3) -> RotatedConic {
        RotatedConic::new(
            ConicKind::RotatedLine { start, end },
            PlacementMap::identity(),
            SurfaceDomain::new(0.0, TAU, 0.0, 1.0),
        )
    }

    fn ellipse(center: Point3, v0: Vector3, v90: Vector3, phi0: f64, phi1: f64) -> RotatedConic {
        RotatedConic::new(
            ConicKind::RotatedEllipse {
                center,
                vector0: v0,
                vector90: v90,
            },
            PlacementMap::identity(),
            SurfaceDomain::new(0.0, TAU, phi0, phi1),
        )
    }

    /// The reduced surface must cover the same points as the generator.
    fn assert_same_surface(a: &RotatedConic, b: &RotatedConic) {
        for (u, f) in [(0.3, 0.0), (1.7, 0.5), (4.0, 1.0)] {
            let ra = a.parameter_range();
            let v = ra.v_min + f * (ra.v_max - ra.v_min);
            let p = a.evaluate(u, v).unwrap();
            let q = b
                .transform_point(&p, crate::conic::CoordinateSystem::World, crate::conic::CoordinateSystem::Parameter)
                .unwrap();
            assert!(q.z.abs() < 1e-9, "off surface by {}", q.z);
            assert!(b.is_point_on_patch(&p, crate::conic::CoordinateSystem::World).unwrap());
        }
    }

    #[test]
    fn segment_through_axis_point_is_a_disk() {
        let g = line(Point3::new(0.0, 0.0, 2.0), Point3::new(3.0, 0.0, 2.0));
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Disk);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn flat_segment_off_axis_is_an_annulus() {
        let g = line(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Disk);
        assert_relative_eq!(c.parameter_range().v_min, 0.5, epsilon = 1e-12);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn segment_touching_axis_is_a_cone() {
        let g = line(Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 3.0));
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Cone);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn parallel_segment_is_a_cylinder() {
        let g = line(Point3::new(0.0, 2.0, 0.0), Point3::new(0.0, 2.0, -1.0));
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Cylinder);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn slanted_segment_is_a_truncated_cone() {
        let g = line(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 0.0, 1.0));
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Cone);
        assert_relative_eq!(c.parameter_range().v_min, 0.5, epsilon = 1e-12);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn skew_segment_stays_a_generator() {
        let g = line(Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 1.0));
        let c = g.copy_classified().unwrap();
        assert!(matches!(c.kind(), ConicKind::RotatedLine { .. }));
    }

    #[test]
    fn centered_half_ellipse_is_a_sphere() {
        let g = ellipse(Point3::new(0.0, 0.0, 1.0), Vector3::new(2.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 2.0), -1.0, 1.0);
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Sphere);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn back_half_ellipse_is_a_sphere() {
        let g = ellipse(Point3::origin(), Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0), 2.0, 4.0);
        let c = g.copy_classified().unwrap();
        assert_eq!(c.kind(), &ConicKind::Sphere);
        assert_same_surface(&g, &c);
    }

    #[test]
    fn offset_circle_is_a_torus() {
        let g = ellipse(Point3::new(3.0, 0.0, 0.5), Vector3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 0.0), 0.0, TAU);
        let c = g.copy_classified().unwrap();
        assert_eq!(c.hoop_radius(), Some(1.0 / 3.0));
        assert_same_surface(&g, &c);
    }

    #[test]
    fn tilted_ellipse_stays_a_generator() {
        let g = ellipse(Point3::new(3.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0), 0.0, TAU);
        let c = g.copy_classified().unwrap();
        assert!(matches!(c.kind(), ConicKind::RotatedEllipse { .. }));
    }
}
