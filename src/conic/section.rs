use std::f64::consts::TAU;

use tracing::{debug, instrument, trace};

use crate::error::{ConicError, Result};
use crate::math::trig::{angle_in_sweep, is_full_sweep, solve_unit_quadratic};
use crate::math::{Matrix4, Vector2, Vector3, Vector4};

use super::hconic::{HConic, HEllipse, HSegment, Sector};
use super::{ConicKind, RotatedConic};

/// Outcome of a closed-form curve query.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaneSection {
    /// World conics; empty when the surface is missed.
    Exact(Vec<HConic>),
    /// The curve exists but is not a conic; use the grid tracer.
    NoClosedForm,
}

impl PlaneSection {
    #[must_use]
    pub fn conics(&self) -> Option<&[HConic]> {
        match self {
            Self::Exact(conics) => Some(conics),
            Self::NoClosedForm => None,
        }
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

impl RotatedConic {
    /// Intersection of the patch with the world plane `plane · X = 0`.
    #[instrument(level = "debug", skip(self), fields(kind = ?self.kind))]
    #[must_use]
    pub fn intersect_plane(&self, plane: &Vector4) -> PlaneSection {
        let local = self.map.plane_to_local(plane);
        let section = self.local_section(&local);
        self.section_to_world(section)
    }

    /// Contour of the patch seen from `eye`, a homogeneous world point
    /// (`w = 0` for a view direction). For quadrics this is the section by
    /// the polar plane of the eye.
    ///
    /// # Errors
    ///
    /// Returns [`ConicError::Unclassified`] for swept generators.
    #[instrument(level = "debug", skip(self), fields(kind = ?self.kind))]
    pub fn silhouette(&self, eye: &Vector4) -> Result<PlaneSection> {
        let local_eye = self.map.to_local(eye);
        match &self.kind {
            ConicKind::Plane | ConicKind::Disk => Ok(PlaneSection::Exact(Vec::new())),
            ConicKind::Torus { .. } => Ok(PlaneSection::NoClosedForm),
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => {
                Err(ConicError::Unclassified("silhouette").into())
            }
            _ => {
                let sigma = self.is_quadric().unwrap_or_else(Vector4::zeros);
                let polar = Matrix4::from_diagonal(&sigma) * local_eye;
                if polar.amax() <= crate::math::TOLERANCE * local_eye.amax() {
                    return Ok(PlaneSection::Exact(Vec::new()));
                }
                Ok(self.section_to_world(self.local_section(&polar)))
            }
        }
    }

    fn section_to_world(&self, section: PlaneSection) -> PlaneSection {
        match section {
            PlaneSection::Exact(conics) => {
                let world = self.conics_to_world(conics);
                debug!(conics = world.len(), "closed-form section");
                PlaneSection::Exact(world)
            }
            PlaneSection::NoClosedForm => {
                debug!("no closed form");
                PlaneSection::NoClosedForm
            }
        }
    }

    /// Section of the local patch by the local plane `h`.
    pub(crate) fn local_section(&self, h: &Vector4) -> PlaneSection {
        let conics = match self.kind {
            ConicKind::Cylinder => self.cylinder_section(h),
            ConicKind::Cone => self.cone_section(h),
            ConicKind::Sphere => self.sphere_section(h),
            ConicKind::Disk => self.disk_section(h),
            ConicKind::Plane => self.square_section(h),
            ConicKind::Torus { hoop_radius } => match self.torus_section(h, hoop_radius) {
                Some(conics) => conics,
                None => return PlaneSection::NoClosedForm,
            },
            ConicKind::RotatedLine { .. } | ConicKind::RotatedEllipse { .. } => return PlaneSection::NoClosedForm,
        };
        PlaneSection::Exact(conics.into_iter().filter(|c| !c.is_null()).collect())
    }

    fn alpha_bounds(&self) -> (f64, f64) {
        let (a, b) = (self.range.v_min, self.range.v_max);
        (a.min(b), a.max(b))
    }

    /// Rulings `(c, s, z0)..(c, s, z1)` at the unit-circle roots, scaled by
    /// `radius(z)`, kept where the angle is inside the patch.
    fn rulings(&self, roots: &[(f64, f64)], radius: impl Fn(f64) -> f64) -> Vec<HConic> {
        let (a0, a1) = self.alpha_bounds();
        let (u0, du) = (self.range.u_min, self.u_sweep());
        let mut lines: Vec<HSegment> = roots
            .iter()
            .filter(|(c, s)| angle_in_sweep(s.atan2(*c), u0, du, self.tolerances.small_angle))
            .map(|(c, s)| {
                HSegment::new(
                    Vector4::new(c * radius(a0), s * radius(a0), a0, 1.0),
                    Vector4::new(c * radius(a1), s * radius(a1), a1, 1.0),
                )
            })
            .collect();
        trace!(rulings = lines.len(), "ruling section");
        match (lines.pop(), lines.pop()) {
            (Some(a), Some(b)) => vec![HConic::LinePair(b, a)],
            (Some(a), None) => vec![HConic::Line(a)],
            _ => Vec::new(),
        }
    }

    /// Clips an ellipse in `(θ, α)` form to the patch's α bounds.
    fn bounded_ellipse(&self, mut ellipse: HEllipse) -> Vec<HConic> {
        let (a0, a1) = self.alpha_bounds();
        ellipse.abs_center_weight();
        let mut conic = HConic::Ellipse(ellipse);
        conic.clip_to_plane(&Vector4::new(0.0, 0.0, 1.0, -a1));
        conic.clip_to_plane(&Vector4::new(0.0, 0.0, -1.0, a0));
        vec![conic]
    }

    fn cylinder_section(&self, h: &Vector4) -> Vec<HConic> {
        let n = h.xyz().norm();
        if n == 0.0 {
            return Vec::new();
        }
        let h = h / n;
        if h.z.abs() < self.tolerances.vertical_plane {
            let roots = solve_unit_quadratic(h.w, h.x, h.y, self.tolerances.unit_circle);
            return self.rulings(&roots, |_| 1.0);
        }
        let ellipse = HEllipse::new(
            Vector4::new(0.0, 0.0, h.w, -h.z),
            Vector4::new(-h.z, 0.0, h.x, 0.0),
            Vector4::new(0.0, -h.z, h.y, 0.0),
            self.range.u_min,
            self.u_sweep(),
        );
        self.bounded_ellipse(ellipse)
    }

    fn cone_section(&self, h: &Vector4) -> Vec<HConic> {
        let n = h.xyz().norm();
        if n == 0.0 {
            return Vec::new();
        }
        let h = h / n;
        if h.w.abs() < self.tolerances.vertical_plane {
            let roots = solve_unit_quadratic(h.z, h.x, h.y, self.tolerances.unit_circle);
            return self.rulings(&roots, |z| z);
        }
        let ellipse = HEllipse::new(
            Vector4::new(0.0, 0.0, -h.w, h.z),
            Vector4::new(-h.w, 0.0, 0.0, h.x),
            Vector4::new(0.0, -h.w, 0.0, h.y),
            self.range.u_min,
            self.u_sweep(),
        );
        self.bounded_ellipse(ellipse)
    }

    fn sphere_section(&self, h: &Vector4) -> Vec<HConic> {
        let n = h.xyz();
        let len = n.norm();
        if len == 0.0 {
            return Vec::new();
        }
        let normal = n / len;
        let d = -h.w / len;
        let tol = self.tolerances.unit_circle.sqrt();
        if d.abs() > 1.0 + tol {
            return Vec::new();
        }
        let center = normal * d;
        if (d.abs() - 1.0).abs() <= tol {
            let rxy = center.x.hypot(center.y);
            if self.point_in_spherical_range(center.y.atan2(center.x), center.z.atan2(rxy)) {
                return vec![HConic::Point(center.push(1.0))];
            }
            return Vec::new();
        }
        let radius = (1.0 - d * d).sqrt();
        let (e1, e2) = plane_basis(&normal);
        let mut ellipse = HEllipse::new(center.push(1.0), (e1 * radius).push(0.0), (e2 * radius).push(0.0), 0.0, TAU);
        if !self.is_full_sphere() {
            let (u0, u1) = (self.range.u_min, self.range.u_max);
            let (v0, v1) = (self.range.v_min, self.range.v_max);
            let mut breaks = Vec::new();
            for plane in [
                Vector4::new(0.0, 0.0, 1.0, -v0.sin()),
                Vector4::new(0.0, 0.0, 1.0, -v1.sin()),
                Vector4::new(-u0.sin(), u0.cos(), 0.0, 0.0),
                Vector4::new(-u1.sin(), u1.cos(), 0.0, 0.0),
            ] {
                breaks.extend(ellipse.plane_crossings(&plane));
            }
            let probe = ellipse.clone();
            ellipse.restrict(&breaks, |theta| {
                let x = probe.evaluate(theta);
                let rxy = x.x.hypot(x.y);
                self.point_in_spherical_range(x.y.atan2(x.x), x.z.atan2(rxy))
            });
        }
        vec![HConic::Ellipse(ellipse)]
    }

    /// Annular sector cut by the plane: pieces of the line `h ∩ {z = 0}`.
    fn disk_section(&self, h: &Vector4) -> Vec<HConic> {
        let Some((p0, dir)) = trace_line(h, self.tolerances.small_angle) else {
            return Vec::new();
        };
        let (r0, r1) = self.alpha_bounds();
        let (u0, du) = (self.range.u_min, self.u_sweep());
        let mut breaks = Vec::new();
        let foot2 = p0.norm_squared();
        for r in [r0, r1] {
            let t2 = r * r - foot2;
            if t2 >= 0.0 {
                breaks.push(t2.sqrt());
                breaks.push(-t2.sqrt());
            }
        }
        if !is_full_sweep(du) {
            for theta in [u0, u0 + du] {
                let ray = Vector2::new(theta.cos(), theta.sin());
                let denom = crate::math::cross_2d(&dir, &ray);
                if denom.abs() > self.tolerances.small_angle {
                    breaks.push(crate::math::cross_2d(&ray, &p0) / denom);
                }
            }
        }
        let keep = |t: f64| {
            let p = p0 + dir * t;
            let r = p.norm();
            r >= r0 && r <= r1 && angle_in_sweep(p.y.atan2(p.x), u0, du, self.tolerances.small_angle)
        };
        let sectors = kept_intervals(&mut breaks, keep);
        line_with_sectors(p0, dir, sectors)
    }

    /// Liang-Barsky clip of the section line to the parameter rectangle.
    fn square_section(&self, h: &Vector4) -> Vec<HConic> {
        let Some((p0, dir)) = trace_line(h, self.tolerances.small_angle) else {
            return Vec::new();
        };
        let r = self.range;
        let bounds = [
            (r.u_min.min(r.u_max), r.u_min.max(r.u_max)),
            (r.v_min.min(r.v_max), r.v_min.max(r.v_max)),
        ];
        let mut t0 = -self.tolerances.max_line_param;
        let mut t1 = self.tolerances.max_line_param;
        for (axis, (lo, hi)) in bounds.iter().enumerate() {
            let (p, d) = (p0[axis], dir[axis]);
            if d.abs() <= f64::EPSILON {
                if p < *lo || p > *hi {
                    return Vec::new();
                }
                continue;
            }
            let (a, b) = ((lo - p) / d, (hi - p) / d);
            t0 = t0.max(a.min(b));
            t1 = t1.min(a.max(b));
        }
        if t1 <= t0 {
            return Vec::new();
        }
        line_with_sectors(p0, dir, vec![Sector { start: t0, end: t1 }])
    }

    /// Exact cases: planes across the axis and planes containing it.
    fn torus_section(&self, h: &Vector4, b: f64) -> Option<Vec<HConic>> {
        let small = self.tolerances.small_angle;
        let (u0, du) = (self.range.u_min, self.u_sweep());
        let (v0, dv) = (self.range.v_min, self.v_sweep());
        let rxy = h.x.hypot(h.y);
        let scale = h.xyz().norm();
        if scale == 0.0 {
            return Some(Vec::new());
        }
        if rxy <= self.tolerances.unit_circle * h.z.abs() {
            let roots = solve_unit_quadratic(h.w, 0.0, h.z * b, self.tolerances.unit_circle);
            let circles = roots
                .into_iter()
                .map(|(c, s)| (c, s, s.atan2(c)))
                .filter(|(_, _, phi)| angle_in_sweep(*phi, v0, dv, small))
                .map(|(c, s, _)| HEllipse::z_circle(u0, du, 1.0 + b * c, b * s, small))
                .collect();
            return Some(circles);
        }
        if h.z.abs() <= self.tolerances.vertical_plane * scale && h.w.abs() <= self.tolerances.vertical_plane * scale {
            let theta = h.x.atan2(-h.y);
            let meridians = [theta, theta + std::f64::consts::PI]
                .into_iter()
                .filter(|t| angle_in_sweep(*t, u0, du, small))
                .map(|t| HEllipse::meridian(v0, dv, t, b, 1.0, small))
                .collect();
            return Some(meridians);
        }
        None
    }
}

/// Two unit vectors completing `normal` to a right-handed frame; the first
/// is horizontal whenever possible.
fn plane_basis(normal: &Vector3) -> (Vector3, Vector3) {
    let seed = Vector3::z().cross(normal);
    let e1 = if seed.norm() > 1e-8 { seed.normalize() } else { Vector3::x() };
    (e1, normal.cross(&e1))
}

/// Foot point and unit direction of the line `h ∩ {z = 0}`.
fn trace_line(h: &Vector4, small: f64) -> Option<(Vector2, Vector2)> {
    let n = Vector2::new(h.x, h.y);
    let len2 = n.norm_squared();
    if len2 <= small * small * (len2 + h.w * h.w) || len2 == 0.0 {
        return None;
    }
    let len = len2.sqrt();
    Some((-n * (h.w / len2), Vector2::new(-h.y, h.x) / len))
}

/// Sorted pieces between consecutive breaks whose midpoint passes `keep`,
/// merged where adjacent.
fn kept_intervals(breaks: &mut Vec<f64>, keep: impl Fn(f64) -> bool) -> Vec<Sector> {
    breaks.sort_by(f64::total_cmp);
    breaks.dedup_by(|a, b| (*a - *b).abs() <= 1e-14);
    let mut out: Vec<Sector> = Vec::new();
    for pair in breaks.windows(2) {
        if !keep(0.5 * (pair[0] + pair[1])) {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.end == pair[0] => last.end = pair[1],
            _ => out.push(Sector {
                start: pair[0],
                end: pair[1],
            }),
        }
    }
    out
}

fn line_with_sectors(p0: Vector2, dir: Vector2, sectors: Vec<Sector>) -> Vec<HConic> {
    if sectors.is_empty() {
        return Vec::new();
    }
    let mut line = HSegment::new(
        Vector4::new(p0.x, p0.y, 0.0, 1.0),
        Vector4::new(p0.x + dir.x, p0.y + dir.y, 0.0, 1.0),
    );
    line.sectors = sectors;
    vec![HConic::Line(line)]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conic::PlacementMap;
    use crate::math::Point3;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn sphere() -> RotatedConic {
        RotatedConic::frame_and_sweep(ConicKind::Sphere, PlacementMap::identity(), 0.0, TAU, -FRAC_PI_2, PI)
    }

    fn torus(b: f64) -> RotatedConic {
        RotatedConic::frame_and_sweep(ConicKind::Torus { hoop_radius: b }, PlacementMap::identity(), 0.0, TAU, 0.0, TAU)
    }

    fn single_ellipse(section: &PlaneSection) -> &HEllipse {
        match section.conics().unwrap() {
            [HConic::Ellipse(e)] => e,
            other => panic!("expected one ellipse, got {other:?}"),
        }
    }

    #[test]
    fn cylinder_cut_across_axis_is_a_circle() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        let section = cyl.intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -0.5));
        let e = single_ellipse(&section);
        assert_eq!(e.sectors.len(), 1);
        for theta in [0.0, 1.0, 2.5, 4.0] {
            let p = e.point_at(theta).unwrap();
            assert_relative_eq!(p.z, 0.5, epsilon = 1e-12);
            assert_relative_eq!(p.x.hypot(p.y), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn cylinder_plane_above_patch_misses() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        let section = cyl.intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -2.0));
        assert_eq!(section, PlaneSection::Exact(Vec::new()));
    }

    #[test]
    fn oblique_cut_is_clipped_to_height() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        // z = x + 0.5 leaves the patch on both ends.
        let section = cyl.intersect_plane(&Vector4::new(1.0, 0.0, -1.0, 0.5));
        let e = single_ellipse(&section);
        for s in &e.sectors {
            let p = e.point_at(s.mid()).unwrap();
            assert!((0.0..=1.0).contains(&p.z));
        }
        let total: f64 = e.sectors.iter().map(Sector::length).sum();
        assert!(total < TAU && total > 0.0);
    }

    #[test]
    fn vertical_plane_gives_ruling_pair() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        let section = cyl.intersect_plane(&Vector4::new(1.0, 0.0, 0.0, -0.5));
        match section.conics().unwrap() {
            [HConic::LinePair(a, b)] => {
                for l in [a, b] {
                    let p = l.point_at(0.0).unwrap();
                    assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
                }
            }
            other => panic!("expected a line pair, got {other:?}"),
        }
        let half = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, PI);
        let section = half.intersect_plane(&Vector4::new(0.0, 1.0, 0.0, -0.5));
        assert!(matches!(section.conics().unwrap(), [HConic::LinePair(..)]));
        let section = half.intersect_plane(&Vector4::new(1.0, 0.0, 0.0, -0.5));
        assert!(matches!(section.conics().unwrap(), [HConic::Line(_)]));
    }

    #[test]
    fn cone_sections() {
        let cone = RotatedConic::frame_and_sweep(ConicKind::Cone, PlacementMap::identity(), 0.0, TAU, 0.0, 2.0);
        let e = single_ellipse(&cone.intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -1.5))).clone();
        let p = e.point_at(0.7).unwrap();
        assert_relative_eq!(p.x.hypot(p.y), 1.5, epsilon = 1e-12);
        // Plane through the apex cuts along two rulings.
        let rulings = cone.intersect_plane(&Vector4::new(0.0, 1.0, 0.0, 0.0));
        assert!(matches!(rulings.conics().unwrap(), [HConic::LinePair(..)]));
    }

    #[test]
    fn sphere_tangent_plane_touches_at_a_point() {
        let section = sphere().intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -1.0));
        assert!(matches!(section.conics().unwrap(), [HConic::Point(_)]));
        let missed = sphere().intersect_plane(&Vector4::new(0.0, 0.0, 1.0, -1.5));
        assert_eq!(missed, PlaneSection::Exact(Vec::new()));
    }

    #[test]
    fn sphere_silhouette_from_finite_eye() {
        let section = sphere().silhouette(&Vector4::new(0.0, 0.0, 5.0, 1.0)).unwrap();
        let e = single_ellipse(&section);
        let p = e.point_at(1.3).unwrap();
        assert_relative_eq!(p.z, 0.2, epsilon = 1e-12);
        assert_relative_eq!(p.x * p.x + p.y * p.y, 0.96, epsilon = 1e-12);
    }

    #[test]
    fn sphere_silhouette_from_direction_is_equator() {
        let section = sphere().silhouette(&Vector4::new(0.0, 0.0, 1.0, 0.0)).unwrap();
        let e = single_ellipse(&section);
        let p = e.point_at(0.4).unwrap();
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.coords.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn hemisphere_clips_its_sections() {
        let upper = RotatedConic::frame_and_sweep(ConicKind::Sphere, PlacementMap::identity(), 0.0, TAU, 0.0, FRAC_PI_2);
        let e = single_ellipse(&upper.intersect_plane(&Vector4::new(1.0, 0.0, 0.0, 0.0))).clone();
        assert_eq!(e.sectors.len(), 1);
        for s in &e.sectors {
            let p = e.point_at(s.mid()).unwrap();
            assert!(p.z > 0.0);
        }
        assert_relative_eq!(e.sectors[0].length(), PI, epsilon = 1e-9);
    }

    #[test]
    fn disk_section_is_a_chord() {
        let disk = RotatedConic::frame_and_sweep(ConicKind::Disk, PlacementMap::identity(), 0.0, TAU, 0.5, 0.5);
        let section = disk.intersect_plane(&Vector4::new(1.0, 0.0, 0.0, 0.0));
        match section.conics().unwrap() {
            [HConic::Line(l)] => {
                assert_eq!(l.sectors.len(), 2);
                for s in &l.sectors {
                    assert_relative_eq!(s.length(), 0.5, epsilon = 1e-12);
                }
            }
            other => panic!("expected a line, got {other:?}"),
        }
    }

    #[test]
    fn square_section_is_clipped() {
        let square = RotatedConic::unit_square(PlacementMap::identity());
        let section = square.intersect_plane(&Vector4::new(1.0, 1.0, 0.0, -1.0));
        match section.conics().unwrap() {
            [HConic::Line(l)] => {
                let s = l.sectors[0];
                let a = l.point_at(s.start).unwrap();
                let b = l.point_at(s.end).unwrap();
                assert_relative_eq!((a - b).norm(), 2.0_f64.sqrt(), epsilon = 1e-12);
            }
            other => panic!("expected a line, got {other:?}"),
        }
        let outside = square.intersect_plane(&Vector4::new(1.0, 0.0, 0.0, -2.0));
        assert_eq!(outside, PlaneSection::Exact(Vec::new()));
    }

    #[test]
    fn torus_exact_and_general_cuts() {
        let t = torus(0.25);
        let flat = t.intersect_plane(&Vector4::new(0.0, 0.0, 1.0, 0.0));
        let radii: Vec<f64> = flat
            .conics()
            .unwrap()
            .iter()
            .map(|c| match c {
                HConic::Ellipse(e) => e.point_at(0.0).unwrap().x,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(radii.len(), 2);
        assert!(radii.iter().any(|r| (r - 1.25).abs() < 1e-12));
        assert!(radii.iter().any(|r| (r - 0.75).abs() < 1e-12));

        let meridians = t.intersect_plane(&Vector4::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(meridians.conics().unwrap().len(), 2);

        let oblique = t.intersect_plane(&Vector4::new(0.3, 0.0, 1.0, -0.1));
        assert_eq!(oblique, PlaneSection::NoClosedForm);
        assert_eq!(t.silhouette(&Vector4::new(0.0, 0.0, 1.0, 0.0)).unwrap(), PlaneSection::NoClosedForm);
    }

    #[test]
    fn silhouette_follows_placement() {
        let map = PlacementMap::from_frame(
            &Point3::new(0.0, 0.0, 3.0),
            &(Vector3::x() * 2.0),
            &(Vector3::y() * 2.0),
            &(Vector3::z() * 2.0),
        )
        .unwrap();
        let ball = RotatedConic::frame_and_sweep(ConicKind::Sphere, map, 0.0, TAU, -FRAC_PI_2, PI);
        let section = ball.silhouette(&Vector4::new(1.0, 0.0, 0.0, 0.0)).unwrap();
        let e = single_ellipse(&section);
        let p = e.point_at(0.9).unwrap();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!((p - Point3::new(0.0, 0.0, 3.0)).norm(), 2.0, epsilon = 1e-12);
    }
}
