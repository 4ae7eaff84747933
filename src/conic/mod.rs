//! Rotated conic surfaces: canonical unit surfaces of revolution and planar
//! patches placed in space by a homogeneous map.
//!
//! Every surface keeps a unit-sized local form and a [`PlacementMap`] taking
//! local coordinates to world coordinates:
//!
//! | kind | local point at `(u, v)` |
//! |---|---|
//! | plane | `(u, v, 0)` |
//! | disk | `(v cos u, v sin u, 0)` |
//! | cylinder | `(cos u, sin u, v)` |
//! | cone | `(v cos u, v sin u, v)` |
//! | sphere | `(cos u cos v, sin u cos v, sin v)` |
//! | torus | `((1 + b cos v) cos u, (1 + b cos v) sin u, b sin v)` |
//!
//! Plane and line queries are pulled back to the local form, solved there in
//! closed form and pushed forward again.

mod classify;
mod factories;
mod hconic;
mod line;
mod map;
mod range;
mod section;
mod tracer;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

pub use factories::{ConeDetail, DiskDetail, EllipsoidDetail, TorusDetail};
pub use hconic::{HConic, HEllipse, HSegment, Sector};
pub use line::{CurveHit, LineHit};
pub use map::PlacementMap;
pub use range::Range3;
pub use section::PlaneSection;
pub use tracer::CurveMask;

use crate::config::ConicTolerances;
use crate::error::{ConicError, GeometryError, Result};
use crate::geometry::{Surface, SurfaceDomain};
use crate::math::trig::angle_in_sweep;
use crate::math::{Matrix4, Point3, Vector3, Vector4};

/// Surface type with its shape data.
#[derive(Debug, Clone, PartialEq)]
pub enum ConicKind {
    Plane,
    Disk,
    Cylinder,
    /// Apex at the local origin; the patch runs from `z = v_min` to `z = v_max`.
    Cone,
    Sphere,
    /// Major radius 1, minor radius `hoop_radius`.
    Torus { hoop_radius: f64 },
    /// The local segment `start..end` swept around the z axis.
    RotatedLine { start: Point3, end: Point3 },
    /// The local ellipse `center + vector0 cos φ + vector90 sin φ` swept
    /// around the z axis.
    RotatedEllipse {
        center: Point3,
        vector0: Vector3,
        vector90: Vector3,
    },
}

/// Coordinates a point can be given in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    World,
    /// Coordinates of the canonical unit surface.
    Local,
    /// `(u, v, offset)`: surface parameters plus the distance-like offset
    /// from the surface, zero on it.
    Parameter,
    /// Like `Parameter` with `u` and `v` scaled so the patch spans `[0, 1]`.
    Parameter01,
}

/// A surface of revolution or planar patch in canonical local form.
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedConic {
    kind: ConicKind,
    map: PlacementMap,
    range: SurfaceDomain,
    tolerances: ConicTolerances,
}

impl RotatedConic {
    /// Creates a surface from its parts; `range` is `u` (the angle around
    /// the axis, or `x` for planes) by `v`.
    #[must_use]
    pub fn new(kind: ConicKind, map: PlacementMap, range: SurfaceDomain) -> Self {
        Self {
            kind,
            map,
            range,
            tolerances: ConicTolerances::default(),
        }
    }

    #[must_use]
    pub fn with_tolerances(mut self, tolerances: ConicTolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    #[must_use]
    pub fn kind(&self) -> &ConicKind {
        &self.kind
    }

    #[must_use]
    pub fn map(&self) -> &PlacementMap {
        &self.map
    }

    #[must_use]
    pub fn parameter_range(&self) -> SurfaceDomain {
        self.range
    }

    #[must_use]
    pub fn tolerances(&self) -> &ConicTolerances {
        &self.tolerances
    }

    pub fn set_parameter_range(&mut self, u0: f64, u_sweep: f64, v0: f64, v_sweep: f64) {
        self.range = SurfaceDomain::new(u0, u0 + u_sweep, v0, v0 + v_sweep);
    }

    #[must_use]
    pub fn hoop_radius(&self) -> Option<f64> {
        match self.kind {
            ConicKind::Torus { hoop_radius } => Some(hoop_radius),
            _ => None,
        }
    }

    pub(crate) fn u_sweep(&self) -> f64 {
        self.range.u_max - self.range.u_min
    }

    pub(crate) fn v_sweep(&self) -> f64 {
        self.range.v_max - self.range.v_min
    }

    /// 1 for planar patches, 2 for quadrics, 4 otherwise.
    #[must_use]
    pub fn surface_degree(&self) -> u32 {
        match self.kind {
            ConicKind::Sphere | ConicKind::Cylinder | ConicKind::Cone => 2,
            ConicKind::Disk | ConicKind::Plane => 1,
            _ => 4,
        }
    }

    /// Diagonal of the local characteristic matrix of a quadric.
    #[must_use]
    pub fn is_quadric(&self) -> Option<Vector4> {
        match self.kind {
            ConicKind::Sphere => Some(Vector4::new(1.0, 1.0, 1.0, -1.0)),
            ConicKind::Cylinder => Some(Vector4::new(1.0, 1.0, 0.0, -1.0)),
            ConicKind::Cone => Some(Vector4::new(1.0, 1.0, -1.0, 0.0)),
            _ => None,
        }
    }

    /// World coefficients of the plane carrying a planar patch.
    #[must_use]
    pub fn is_planar(&self) -> Option<Vector4> {
        match self.kind {
            ConicKind::Plane | ConicKind::Disk => Some(self.map.plane_to_world(&Vector4::z())),
            _ => None,
        }
    }

    /// Value of the local implicit equation at a homogeneous local point;
    /// zero on the surface. `None` for unclassified generators.
    #[must_use]
    pub fn local_implicit(&self, x: &Vector4) -> Option<f64> {
        let rxy = x.x * x.x + x.y * x.y;
        match self.kind {
            ConicKind::Plane | ConicKind::Disk => Some(x.z),
            ConicKind::Cylinder => Some(rxy - x.w * x.w),
            ConicKind::Cone => Some(rxy - x.z * x.z),
            ConicKind::Sphere => Some(rxy + x.z * x.z - x.w * x.w),
            ConicKind::Torus { hoop_radius: b } => {
                let w2 = x.w * x.w;
                let f = rxy + x.z * x.z + (1.0 - b * b) * w2;
                Some(f * f - 4.0 * w2 * rxy)
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => None,
        }
    }

    /// Gradient of the local implicit equation at a cartesian local point.
    fn local_gradient(&self, p: &Point3) -> Option<Vector3> {
        match self.kind {
            ConicKind::Plane | ConicKind::Disk => Some(Vector3::z()),
            ConicKind::Cylinder => Some(Vector3::new(p.x, p.y, 0.0)),
            ConicKind::Cone => Some(Vector3::new(p.x, p.y, -p.z)),
            ConicKind::Sphere => Some(p.coords),
            ConicKind::Torus { hoop_radius: b } => {
                let f = p.coords.norm_squared() + 1.0 - b * b;
                Some(p.coords * (4.0 * f) - Vector3::new(p.x, p.y, 0.0) * 8.0)
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => None,
        }
    }

    /// Local point at surface parameters `(u, v)`.
    #[must_use]
    pub fn local_point(&self, u: f64, v: f64) -> Point3 {
        let (su, cu) = u.sin_cos();
        match &self.kind {
            ConicKind::Plane => Point3::new(u, v, 0.0),
            ConicKind::Disk => Point3::new(v * cu, v * su, 0.0),
            ConicKind::Cylinder => Point3::new(cu, su, v),
            ConicKind::Cone => Point3::new(v * cu, v * su, v),
            ConicKind::Sphere => {
                let (sv, cv) = v.sin_cos();
                Point3::new(cu * cv, su * cv, sv)
            }
            ConicKind::Torus { hoop_radius: b } => {
                let (sv, cv) = v.sin_cos();
                let r = 1.0 + b * cv;
                Point3::new(r * cu, r * su, b * sv)
            }
            ConicKind::RotatedLine { start, end } => rotate_z(&(start + (end - start) * v), cu, su),
            ConicKind::RotatedEllipse {
                center,
                vector0,
                vector90,
            } => {
                let (sv, cv) = v.sin_cos();
                rotate_z(&(center + vector0 * cv + vector90 * sv), cu, su)
            }
        }
    }

    fn local_to_parameter(&self, p: &Point3) -> Result<Point3> {
        let rxy = p.x.hypot(p.y);
        let theta = p.y.atan2(p.x);
        Ok(match self.kind {
            ConicKind::Plane => *p,
            ConicKind::Disk => Point3::new(theta, rxy, p.z),
            ConicKind::Cylinder => Point3::new(theta, p.z, rxy - 1.0),
            ConicKind::Cone => {
                // The lower nappe is reached through negative v.
                let theta = if p.z < 0.0 { (-p.y).atan2(-p.x) } else { theta };
                Point3::new(theta, p.z, rxy - p.z.abs())
            }
            ConicKind::Sphere => Point3::new(theta, p.z.atan2(rxy), p.coords.norm() - 1.0),
            ConicKind::Torus { hoop_radius: b } => {
                let dx = rxy - 1.0;
                Point3::new(theta, p.z.atan2(dx), dx.hypot(p.z) - b)
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {
                return Err(ConicError::Unclassified("parameter coordinates").into())
            }
        })
    }

    fn parameter_to_local(&self, q: &Point3) -> Result<Point3> {
        let (u, v, w) = (q.x, q.y, q.z);
        let (su, cu) = u.sin_cos();
        Ok(match self.kind {
            ConicKind::Plane => *q,
            ConicKind::Disk => Point3::new(v * cu, v * su, w),
            ConicKind::Cylinder => Point3::new((1.0 + w) * cu, (1.0 + w) * su, v),
            ConicKind::Cone => {
                let r = v + if v < 0.0 { -w } else { w };
                Point3::new(r * cu, r * su, v)
            }
            ConicKind::Sphere => {
                let (sv, cv) = v.sin_cos();
                Point3::new((1.0 + w) * cu * cv, (1.0 + w) * su * cv, (1.0 + w) * sv)
            }
            ConicKind::Torus { hoop_radius: b } => {
                let (sv, cv) = v.sin_cos();
                let d = b + w;
                let r = 1.0 + d * cv;
                Point3::new(r * cu, r * su, d * sv)
            }
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {
                return Err(ConicError::Unclassified("parameter coordinates").into())
            }
        })
    }

    fn parameter_to_unit(&self, q: &Point3) -> Result<Point3> {
        let du = self.u_sweep();
        let dv = self.v_sweep();
        if du == 0.0 || dv == 0.0 {
            return Err(GeometryError::Degenerate("empty parameter range".into()).into());
        }
        let (u_angular, v_angular) = match self.kind {
            ConicKind::Plane => (false, false),
            ConicKind::Sphere | ConicKind::Torus { .. } | ConicKind::RotatedEllipse { .. } => (true, true),
            _ => (true, false),
        };
        let fraction = |x: f64, start: f64, sweep: f64, angular: bool| {
            if angular {
                angle_fraction(x, start, sweep)
            } else {
                (x - start) / sweep
            }
        };
        Ok(Point3::new(
            fraction(q.x, self.range.u_min, du, u_angular),
            fraction(q.y, self.range.v_min, dv, v_angular),
            q.z,
        ))
    }

    fn unit_to_parameter(&self, q: &Point3) -> Point3 {
        Point3::new(
            self.range.u_min + q.x * self.u_sweep(),
            self.range.v_min + q.y * self.v_sweep(),
            q.z,
        )
    }

    /// Re-expresses a point between coordinate systems.
    ///
    /// # Errors
    ///
    /// Fails for parameter coordinates of unclassified generators, for an
    /// empty parameter range, and for points mapped to infinity.
    pub fn transform_point(&self, p: &Point3, from: CoordinateSystem, to: CoordinateSystem) -> Result<Point3> {
        use CoordinateSystem::{Local, Parameter, Parameter01, World};
        if from == to {
            return Ok(*p);
        }
        let local = match from {
            World => self.map.point_to_local(p)?,
            Local => *p,
            Parameter => self.parameter_to_local(p)?,
            Parameter01 => self.parameter_to_local(&self.unit_to_parameter(p))?,
        };
        match to {
            World => self.map.point_to_world(&local),
            Local => Ok(local),
            Parameter => self.local_to_parameter(&local),
            Parameter01 => self.parameter_to_unit(&self.local_to_parameter(&local)?),
        }
    }

    /// True if `p` falls inside the patch's parameter range. The point need
    /// not lie on the surface; its parameter projection is tested.
    ///
    /// # Errors
    ///
    /// See [`Self::transform_point`].
    pub fn is_point_on_patch(&self, p: &Point3, system: CoordinateSystem) -> Result<bool> {
        let tol = self.tolerances.small_angle;
        let in_unit = |q: &Point3| -tol <= q.x && q.x <= 1.0 + tol && -tol <= q.y && q.y <= 1.0 + tol;
        if self.kind == ConicKind::Sphere && system != CoordinateSystem::Parameter01 {
            let q = self.transform_point(p, system, CoordinateSystem::Parameter)?;
            return Ok(self.point_in_spherical_range(q.x, q.y));
        }
        Ok(in_unit(&self.transform_point(p, system, CoordinateSystem::Parameter01)?))
    }

    /// Longitude/latitude test that also accepts the antipodal reading
    /// `(θ + π, π − φ)` of the same point.
    pub(crate) fn point_in_spherical_range(&self, theta: f64, phi: f64) -> bool {
        let eps = self.tolerances.small_angle;
        let (u0, du) = (self.range.u_min, self.u_sweep());
        let (v0, dv) = (self.range.v_min, self.v_sweep());
        (angle_in_sweep(theta, u0, du, eps) && angle_in_sweep(phi, v0, dv, eps))
            || (angle_in_sweep(theta + PI, u0, du, eps) && angle_in_sweep(PI - phi, v0, dv, eps))
    }

    /// True when a sphere patch covers the whole sphere.
    pub(crate) fn is_full_sphere(&self) -> bool {
        let eps = self.tolerances.small_angle;
        crate::math::trig::is_full_sweep(self.u_sweep())
            && self.range.v_min.min(self.range.v_max) <= -FRAC_PI_2 + eps
            && self.range.v_min.max(self.range.v_max) >= FRAC_PI_2 - eps
    }

    /// Applies a world transform on top of the placement.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::SingularMap`] if `transform` is singular.
    pub fn transformed(&self, transform: &Matrix4) -> Result<Self> {
        let outer = PlacementMap::new(*transform)?;
        Ok(Self {
            map: outer.then(&self.map),
            ..self.clone()
        })
    }

    /// Pushes local conics to world coordinates.
    pub(crate) fn conics_to_world(&self, conics: Vec<HConic>) -> Vec<HConic> {
        conics
            .into_iter()
            .map(|c| c.transformed(self.map.forward()))
            .filter(|c| !c.is_null())
            .collect()
    }
}

fn rotate_z(p: &Point3, c: f64, s: f64) -> Point3 {
    Point3::new(c * p.x - s * p.y, s * p.x + c * p.y, p.z)
}

/// Fraction of `sweep` at which `angle` sits, choosing the nearer end when
/// the angle is outside the sweep.
fn angle_fraction(angle: f64, start: f64, sweep: f64) -> f64 {
    let span = sweep.abs();
    let mut delta = ((angle - start) * sweep.signum()).rem_euclid(TAU);
    if delta > span && TAU - delta < delta - span {
        delta -= TAU;
    }
    delta / span
}

impl Surface for RotatedConic {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        self.map.point_to_world(&self.local_point(u, v))
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let local = self.local_point(u, v);
        let world = match self.local_gradient(&local) {
            Some(g) => self.map.gradient_to_world(&g),
            None => {
                // Generators: cross the two tangent directions.
                let h = 1e-6;
                let at = |du: f64, dv: f64| self.evaluate(u + du, v + dv);
                let scale = 0.5 / h;
                let du = (at(h, 0.0)? - at(-h, 0.0)?) * scale;
                let dv = (at(0.0, h)? - at(0.0, -h)?) * scale;
                du.cross(&dv)
            }
        };
        let len = world.norm();
        if len < crate::math::TOLERANCE {
            return Err(GeometryError::Degenerate("normal vanishes at a singular point".into()).into());
        }
        Ok(world / len)
    }
}
