use tracing::{debug, instrument};

use crate::error::{ConicError, GeometryError, OperationError, Result};
use crate::math::bezier::Bernstein;
use crate::math::{Matrix4, Point2, Point3, Vector4};

use super::map::{cartesian, homogeneous};
use super::{ConicKind, RotatedConic};

/// Parameter resolution for polynomial roots.
const ROOT_TOL: f64 = 1e-12;
/// Largest surface offset a torus root may show before it is dropped as
/// noise, as a fraction of the hoop radius.
const TORUS_OFFSET_TOL: f64 = 1e-2;

/// A line crossing a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineHit {
    pub point: Point3,
    /// `t` in `start + t · (end - start)`.
    pub line_parameter: f64,
    pub surface_parameters: Point2,
}

/// A rational curve crossing a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveHit {
    pub point: Point3,
    pub curve_parameter: f64,
    pub surface_parameters: Point2,
}

impl RotatedConic {
    /// Crossings of the unbounded surface with the line through `start` and
    /// `end`, sorted along the line. The patch's parameter range is not
    /// applied; filter with [`Self::is_point_on_patch`] if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::Unclassified`] for swept generators.
    #[instrument(level = "debug", skip(self), fields(kind = ?self.kind))]
    pub fn intersect_line(&self, start: &Point3, end: &Point3) -> Result<Vec<LineHit>> {
        let b0 = self.map.to_local(&homogeneous(start));
        let b1 = self.map.to_local(&homogeneous(end));
        let params = match &self.kind {
            ConicKind::Sphere | ConicKind::Cylinder | ConicKind::Cone => {
                let sigma = self.is_quadric().unwrap_or_else(Vector4::zeros);
                let q = Matrix4::from_diagonal(&sigma);
                let f00 = b0.dot(&(q * b0));
                let f01 = b0.dot(&(q * b1));
                let f11 = b1.dot(&(q * b1));
                solve_quadratic(f00 - 2.0 * f01 + f11, 2.0 * (f01 - f00), f00)
            }
            ConicKind::Plane | ConicKind::Disk => {
                let dz = b1.z - b0.z;
                if dz == 0.0 {
                    Vec::new()
                } else {
                    let t = -b0.z / dz;
                    if t.abs() <= self.tolerances.max_line_param {
                        vec![t]
                    } else {
                        Vec::new()
                    }
                }
            }
            ConicKind::Torus { hoop_radius } => self.torus_line_params(&b0, &b1, *hoop_radius)?,
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {
                return Err(ConicError::Unclassified("line intersection").into())
            }
        };
        let mut hits = Vec::with_capacity(params.len());
        for t in params {
            let local = b0 * (1.0 - t) + b1 * t;
            let Some(local_point) = cartesian(&local) else {
                continue;
            };
            let q = self.local_to_parameter(&local_point)?;
            hits.push(LineHit {
                point: start + (end - start) * t,
                line_parameter: t,
                surface_parameters: Point2::new(q.x, q.y),
            });
        }
        hits.sort_by(|a, b| a.line_parameter.total_cmp(&b.line_parameter));
        debug!(hits = hits.len(), "line intersection");
        Ok(hits)
    }

    /// Roots of the torus quartic along the line, after clipping the line to
    /// the torus' bounding box.
    fn torus_line_params(&self, b0: &Vector4, b1: &Vector4, b: f64) -> Result<Vec<f64>> {
        let infinite = || GeometryError::Degenerate("line point at infinity".into());
        let p0 = cartesian(b0).ok_or_else(infinite)?;
        let p1 = cartesian(b1).ok_or_else(infinite)?;
        let dir = p1 - p0;
        let half = [1.0 + 1.5 * b, 1.0 + 1.5 * b, 1.5 * b];
        let limit = self.tolerances.max_line_param;
        let (mut t0, mut t1) = (-limit, limit);
        for axis in 0..3 {
            if dir[axis].abs() <= f64::EPSILON {
                if p0[axis].abs() > half[axis] {
                    return Ok(Vec::new());
                }
                continue;
            }
            let a = (-half[axis] - p0[axis]) / dir[axis];
            let c = (half[axis] - p0[axis]) / dir[axis];
            t0 = t0.max(a.min(c));
            t1 = t1.min(a.max(c));
        }
        if t1 <= t0 {
            return Ok(Vec::new());
        }
        let q0 = p0 + dir * t0;
        let q1 = p0 + dir * t1;
        let x = Bernstein::linear(q0.x, q1.x);
        let y = Bernstein::linear(q0.y, q1.y);
        let z = Bernstein::linear(q0.z, q1.z);
        let w = Bernstein::constant(1.0);
        let quartic = torus_polynomial(&x, &y, &z, &w, b);
        let mut out = Vec::new();
        for s in quartic.roots(ROOT_TOL) {
            let t = t0 + (t1 - t0) * s;
            let offset = self.local_to_parameter(&(p0 + dir * t))?.z;
            if offset.abs() <= TORUS_OFFSET_TOL * b {
                out.push(t);
            }
        }
        Ok(out)
    }

    /// Crossings of the unbounded surface with the rational Bézier curve whose
    /// homogeneous world poles are `poles`; the curve parameter runs over `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Fails for an empty pole list and for swept generators.
    #[instrument(level = "debug", skip(self, poles), fields(kind = ?self.kind, order = poles.len()))]
    pub fn intersect_rational_curve(&self, poles: &[Vector4]) -> Result<Vec<CurveHit>> {
        if poles.is_empty() {
            return Err(OperationError::InvalidInput("curve has no poles".into()).into());
        }
        let local: Vec<Vector4> = poles.iter().map(|p| self.map.to_local(p)).collect();
        let component = |i: usize| Bernstein::new(local.iter().map(|p| p[i]).collect());
        let (x, y, z, w) = (component(0), component(1), component(2), component(3));
        let polynomial = match &self.kind {
            ConicKind::Plane | ConicKind::Disk => z.clone(),
            ConicKind::Cylinder => x.product(&x).sum(&y.product(&y)).sum(&w.product(&w).scaled(-1.0)),
            ConicKind::Cone => x.product(&x).sum(&y.product(&y)).sum(&z.product(&z).scaled(-1.0)),
            ConicKind::Sphere => x
                .product(&x)
                .sum(&y.product(&y))
                .sum(&z.product(&z))
                .sum(&w.product(&w).scaled(-1.0)),
            ConicKind::Torus { hoop_radius } => torus_polynomial(&x, &y, &z, &w, *hoop_radius),
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {
                return Err(ConicError::Unclassified("curve intersection").into())
            }
        };
        let mut hits = Vec::new();
        for s in polynomial.roots(ROOT_TOL) {
            let l = Vector4::new(x.evaluate(s), y.evaluate(s), z.evaluate(s), w.evaluate(s));
            let (Some(local_point), Some(point)) = (cartesian(&l), cartesian(&self.map.to_world(&l))) else {
                continue;
            };
            let q = self.local_to_parameter(&local_point)?;
            hits.push(CurveHit {
                point,
                curve_parameter: s,
                surface_parameters: Point2::new(q.x, q.y),
            });
        }
        debug!(hits = hits.len(), "curve intersection");
        Ok(hits)
    }
}

/// `(x² + y² + z² + (1 - b²) w²)² - 4 w² (x² + y²)` on Bernstein components.
fn torus_polynomial(x: &Bernstein, y: &Bernstein, z: &Bernstein, w: &Bernstein, b: f64) -> Bernstein {
    let xx = x.product(x);
    let yy = y.product(y);
    let zz = z.product(z);
    let ww = w.product(w);
    let rho = xx.sum(&yy);
    let f2 = rho.sum(&zz).sum(&ww.scaled(1.0 - b * b));
    f2.product(&f2).sum(&rho.product(&ww).scaled(-4.0))
}

/// Real roots of `a t² + b t + c`, ascending. An identically zero
/// polynomial has no isolated roots.
fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return Vec::new();
    }
    if a.abs() <= 1e-14 * scale {
        if b.abs() <= 1e-14 * scale {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < -1e-14 * scale * scale {
        return Vec::new();
    }
    if disc <= 1e-14 * scale * scale {
        return vec![-b / (2.0 * a)];
    }
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    let (r0, r1) = if q == 0.0 { (0.0, 0.0) } else { (q / a, c / q) };
    if r0 <= r1 {
        vec![r0, r1]
    } else {
        vec![r1, r0]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conic::PlacementMap;
    use crate::math::Vector3;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    fn torus(b: f64) -> RotatedConic {
        RotatedConic::frame_and_sweep(ConicKind::Torus { hoop_radius: b }, PlacementMap::identity(), 0.0, TAU, 0.0, TAU)
    }

    #[test]
    fn quadratic_roots() {
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0), Vec::<f64>::new());
        assert_eq!(solve_quadratic(0.0, 0.0, 0.0), Vec::<f64>::new());
        let r = solve_quadratic(1.0, -3.0, 2.0);
        assert_relative_eq!(r[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(r[1], 2.0, epsilon = 1e-14);
        assert_eq!(solve_quadratic(0.0, 2.0, -1.0), vec![0.5]);
    }

    #[test]
    fn line_through_sphere() {
        let map = PlacementMap::from_frame(
            &Point3::new(1.0, 0.0, 0.0),
            &(Vector3::x() * 2.0),
            &(Vector3::y() * 2.0),
            &(Vector3::z() * 2.0),
        )
        .unwrap();
        let sphere = RotatedConic::frame_and_sweep(ConicKind::Sphere, map, 0.0, TAU, -FRAC_PI_2, PI);
        let hits = sphere
            .intersect_line(&Point3::new(-5.0, 0.0, 0.0), &Point3::new(5.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point, Point3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(hits[1].point, Point3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(hits[1].surface_parameters, Point2::new(0.0, 0.0), epsilon = 1e-12);
        assert!(hits[0].line_parameter < hits[1].line_parameter);
    }

    #[test]
    fn line_tangent_to_cylinder_touches_once() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        let hits = cyl
            .intersect_line(&Point3::new(1.0, -1.0, 0.5), &Point3::new(1.0, 1.0, 0.5))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point, Point3::new(1.0, 0.0, 0.5), epsilon = 1e-9);
        // A line along a ruling lies on the surface and has no isolated hits.
        let on = cyl
            .intersect_line(&Point3::new(1.0, 0.0, 0.0), &Point3::new(1.0, 0.0, 1.0))
            .unwrap();
        assert!(on.is_empty());
    }

    #[test]
    fn line_through_plane() {
        let square = RotatedConic::unit_square(PlacementMap::identity());
        let hits = square
            .intersect_line(&Point3::new(0.5, 0.5, -1.0), &Point3::new(0.5, 0.5, 1.0))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].line_parameter, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hits[0].surface_parameters, Point2::new(0.5, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn line_through_torus_hole_misses() {
        let hits = torus(0.25)
            .intersect_line(&Point3::new(0.0, 0.0, -3.0), &Point3::new(0.0, 0.0, 3.0))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn line_through_torus_tube_hits_twice() {
        let hits = torus(0.25)
            .intersect_line(&Point3::new(1.0, 0.0, -3.0), &Point3::new(1.0, 0.0, 3.0))
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point.z, -0.25, epsilon = 1e-8);
        assert_relative_eq!(hits[1].point.z, 0.25, epsilon = 1e-8);
    }

    #[test]
    fn thin_torus_tube_is_hit_and_missed_at_its_own_scale() {
        let b = 0.005;
        let thin = torus(b);
        let hits = thin
            .intersect_line(&Point3::new(1.0, 0.0, -3.0), &Point3::new(1.0, 0.0, 3.0))
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].point.z, -b, epsilon = 1e-8);
        assert_relative_eq!(hits[1].point.z, b, epsilon = 1e-8);
        // Passes the tube at a gap smaller than the tube itself.
        let gap = 0.6 * b;
        let miss = thin
            .intersect_line(&Point3::new(1.0 + b + gap, 0.0, -3.0), &Point3::new(1.0 + b + gap, 0.0, 3.0))
            .unwrap();
        assert!(miss.is_empty());
        let hole = thin
            .intersect_line(&Point3::new(0.0, 0.0, -3.0), &Point3::new(0.0, 0.0, 3.0))
            .unwrap();
        assert!(hole.is_empty());
    }

    #[test]
    fn line_across_torus_hits_four_times() {
        let hits = torus(0.25)
            .intersect_line(&Point3::new(-3.0, 0.0, 0.0), &Point3::new(3.0, 0.0, 0.0))
            .unwrap();
        let xs: Vec<f64> = hits.iter().map(|h| h.point.x).collect();
        assert_eq!(xs.len(), 4);
        for (x, expected) in xs.iter().zip([-1.25, -0.75, 0.75, 1.25]) {
            assert_relative_eq!(*x, expected, epsilon = 1e-8);
        }
    }

    #[test]
    fn rational_quarter_circle_meets_plane() {
        // Quarter of the unit circle in the xz plane from +x to +z.
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let poles = [
            Vector4::new(1.0, 0.0, 0.0, 1.0),
            Vector4::new(w, 0.0, w, w),
            Vector4::new(0.0, 0.0, 1.0, 1.0),
        ];
        let cone = RotatedConic::frame_and_sweep(ConicKind::Cone, PlacementMap::identity(), 0.0, TAU, 0.0, 1.0);
        let hits = cone.intersect_rational_curve(&poles).unwrap();
        assert_eq!(hits.len(), 1);
        let p = hits[0].point;
        assert_relative_eq!(p.x, p.z, epsilon = 1e-9);
        assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-9);
        assert!(cone.intersect_rational_curve(&[]).is_err());
    }
}
