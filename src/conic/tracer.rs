//! Grid contour tracer for torus curves without a closed form.
//!
//! Plane sections and silhouettes of the unit torus are the zero set of a
//! toroidal form `g(θ, φ) = [cos θ, sin θ, 1] · M · [cos φ, sin φ, 1]ᵀ`.
//! The tracer lays a grid over the patch, solves `g = 0` exactly on every
//! grid edge (a unit-circle quadratic), joins the crossings cell by cell and
//! chains the pieces into polylines.

use std::f64::consts::TAU;
use std::ops::BitOr;

use tracing::{debug, instrument, trace};

use crate::config::TracerConfig;
use crate::error::{ConicError, Result};
use crate::geometry::Surface;
use crate::math::trig::{is_full_sweep, solve_unit_quadratic};
use crate::math::{Matrix3, Point3, Vector3, Vector4};

use super::hconic::HConic;
use super::section::PlaneSection;
use super::{ConicKind, RotatedConic};

/// Flags describing a delivered polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CurveMask(u32);

impl CurveMask {
    pub const NONE: Self = Self(0);
    /// Points sample a smooth curve.
    pub const SMOOTH: Self = Self(1);
    /// Points lie on a closed-form conic.
    pub const EXACT: Self = Self(2);

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CurveMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bilinear form in `(cos θ, sin θ, 1)` and `(cos φ, sin φ, 1)`.
#[derive(Debug, Clone, Copy)]
struct ToroidalForm {
    m: Matrix3,
}

impl ToroidalForm {
    /// `h · X(θ, φ)` for the torus with hoop radius `b`.
    fn plane(h: &Vector4, b: f64) -> Self {
        let mut m = Matrix3::zeros();
        m[(0, 0)] = b * h.x;
        m[(0, 2)] = h.x;
        m[(1, 0)] = b * h.y;
        m[(1, 2)] = h.y;
        m[(2, 1)] = b * h.z;
        m[(2, 2)] = h.w;
        Self { m }
    }

    /// Tube normal against the ray from `eye`: zero on the contour.
    fn eye(e: &Vector4, b: f64) -> Self {
        let mut m = Matrix3::zeros();
        m[(0, 0)] = -e.x;
        m[(1, 0)] = -e.y;
        m[(2, 1)] = -e.z;
        m[(2, 0)] = e.w;
        m[(2, 2)] = e.w * b;
        Self { m }
    }

    fn theta_vector(theta: f64) -> Vector3 {
        let (s, c) = theta.sin_cos();
        Vector3::new(c, s, 1.0)
    }

    fn value(&self, theta: f64, phi: f64) -> f64 {
        Self::theta_vector(theta).dot(&(self.m * Self::theta_vector(phi)))
    }

    /// Coefficients in `(cos θ, sin θ, 1)` at fixed `φ`.
    fn at_phi(&self, phi: f64) -> Vector3 {
        self.m * Self::theta_vector(phi)
    }

    /// Coefficients in `(cos φ, sin φ, 1)` at fixed `θ`.
    fn at_theta(&self, theta: f64) -> Vector3 {
        self.m.transpose() * Self::theta_vector(theta)
    }
}

/// One parameter direction of the grid.
#[derive(Debug, Clone, Copy)]
struct Axis {
    start: f64,
    step: f64,
    cells: usize,
    wraps: bool,
}

impl Axis {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn new(start: f64, sweep: f64, max_step: f64) -> Self {
        let cells = ((sweep.abs() / max_step).ceil() as usize).max(1);
        Self {
            start,
            step: sweep / cells as f64,
            cells,
            wraps: is_full_sweep(sweep),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn node(&self, i: usize) -> f64 {
        self.start + self.step * i as f64
    }

    /// Number of distinct node lines.
    fn lines(&self) -> usize {
        if self.wraps {
            self.cells
        } else {
            self.cells + 1
        }
    }

    fn line_index(&self, i: usize) -> usize {
        if self.wraps {
            i % self.cells
        } else {
            i
        }
    }

    /// Fractions along edge `i` at which the angles in `roots` fall; the
    /// edge is half open except at the end of an open sweep.
    fn edge_fractions(&self, i: usize, roots: &[f64]) -> Vec<f64> {
        let width = self.step.abs();
        let closed = !self.wraps && i + 1 == self.cells;
        let mut out: Vec<f64> = roots
            .iter()
            .map(|a| ((a - self.node(i)) * self.step.signum()).rem_euclid(TAU) / width)
            .filter(|f| *f < 1.0 || (closed && *f <= 1.0 + 1e-12))
            .collect();
        out.sort_by(f64::total_cmp);
        out
    }
}

/// Contour polylines in `(θ, φ)` of `form = 0` over the grid.
fn trace_form(form: &ToroidalForm, theta: &Axis, phi: &Axis, unit_circle_tol: f64) -> Vec<Vec<(f64, f64)>> {
    let mut points: Vec<(f64, f64)> = Vec::new();
    let roots = |coeffs: Vector3| -> Vec<f64> {
        solve_unit_quadratic(coeffs.z, coeffs.x, coeffs.y, unit_circle_tol)
            .into_iter()
            .map(|(c, s)| s.atan2(c))
            .collect()
    };

    // Crossing ids on edges running in θ, indexed [phi line][theta cell].
    let mut theta_edges = vec![vec![Vec::new(); theta.cells]; phi.lines()];
    for (j, row) in theta_edges.iter_mut().enumerate() {
        let p = phi.node(j);
        let found = roots(form.at_phi(p));
        for (i, edge) in row.iter_mut().enumerate() {
            for f in theta.edge_fractions(i, &found) {
                edge.push(points.len());
                points.push((theta.node(i) + f * theta.step, p));
            }
        }
    }
    // Crossing ids on edges running in φ, indexed [theta line][phi cell].
    let mut phi_edges = vec![vec![Vec::new(); phi.cells]; theta.lines()];
    for (i, column) in phi_edges.iter_mut().enumerate() {
        let t = theta.node(i);
        let found = roots(form.at_theta(t));
        for (j, edge) in column.iter_mut().enumerate() {
            for f in phi.edge_fractions(j, &found) {
                edge.push(points.len());
                points.push((t, phi.node(j) + f * phi.step));
            }
        }
    }

    let mut links: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for j in 0..phi.cells {
        for i in 0..theta.cells {
            let mut around: Vec<usize> = Vec::with_capacity(4);
            around.extend(&theta_edges[phi.line_index(j)][i]);
            around.extend(&phi_edges[theta.line_index(i + 1)][j]);
            around.extend(theta_edges[phi.line_index(j + 1)][i].iter().rev());
            around.extend(phi_edges[theta.line_index(i)][j].iter().rev());
            let pairs: Vec<(usize, usize)> = match around.as_slice() {
                [] | [_] => Vec::new(),
                [a, b, c, d] => {
                    let corner = form.value(theta.node(i), phi.node(j));
                    let center = form.value(theta.node(i) + 0.5 * theta.step, phi.node(j) + 0.5 * phi.step);
                    if corner * center > 0.0 {
                        vec![(*a, *b), (*c, *d)]
                    } else {
                        vec![(*b, *c), (*d, *a)]
                    }
                }
                ids => ids.chunks_exact(2).map(|p| (p[0], p[1])).collect(),
            };
            for (a, b) in pairs {
                if a != b {
                    links[a].push(b);
                    links[b].push(a);
                }
            }
        }
    }
    trace!(crossings = points.len(), "grid crossings");
    chain(&points, &links)
}

/// Walks the crossing graph into polylines, open chains first.
fn chain(points: &[(f64, f64)], links: &[Vec<usize>]) -> Vec<Vec<(f64, f64)>> {
    let mut used = vec![false; points.len()];
    let mut out = Vec::new();
    let walk = |start: usize, used: &mut [bool]| {
        let mut line = vec![start];
        used[start] = true;
        let mut current = start;
        while let Some(&next) = links[current].iter().find(|n| !used[**n]) {
            used[next] = true;
            line.push(next);
            current = next;
        }
        // Close loops back onto their first point.
        if line.len() > 2 && links[current].contains(&start) {
            line.push(start);
        }
        line
    };
    let ends: Vec<usize> = (0..points.len()).filter(|i| links[*i].len() == 1).collect();
    for start in ends.into_iter().chain(0..points.len()) {
        if used[start] || links[start].is_empty() {
            continue;
        }
        let ids = walk(start, &mut used);
        if ids.len() > 1 {
            out.push(ids.into_iter().map(|i| points[i]).collect());
        }
    }
    out
}

/// Drops points closer than `min_gap` in parameter space to the previous
/// kept point; the last point always stays.
fn filter_close(line: &[(f64, f64)], min_gap: f64) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(line.len());
    for (k, p) in line.iter().enumerate() {
        let last = k + 1 == line.len();
        match out.last() {
            Some(q) if !last && (p.0 - q.0).hypot(p.1 - q.1) < min_gap => {}
            Some(q) if last && (p.0 - q.0).hypot(p.1 - q.1) < min_gap && out.len() > 1 => {
                out.pop();
                out.push(*p);
            }
            _ => out.push(*p),
        }
    }
    out
}

/// Sends `points` in chunks of at most `max_points`; neighbouring chunks
/// share their boundary point.
fn deliver<F>(points: &[Point3], mask: CurveMask, surface: &RotatedConic, max_points: usize, handler: &mut F) -> Result<usize>
where
    F: FnMut(&[Point3], CurveMask, &RotatedConic) -> Result<()>,
{
    if points.len() < 2 {
        return Ok(0);
    }
    let size = max_points.max(2);
    let mut batches = 0;
    let mut start = 0;
    while start + 1 < points.len() {
        let end = (start + size - 1).min(points.len() - 1);
        handler(&points[start..=end], mask, surface)?;
        batches += 1;
        start = end;
    }
    Ok(batches)
}

impl RotatedConic {
    /// Delivers the silhouette seen from `eye` as world polylines. Closed
    /// forms are stroked and flagged [`CurveMask::EXACT`]; torus contours
    /// come from the grid tracer.
    ///
    /// # Errors
    ///
    /// Fails for swept generators and propagates handler errors.
    #[instrument(level = "debug", skip(self, config, handler), fields(kind = ?self.kind))]
    pub fn trace_silhouette<F>(&self, eye: &Vector4, config: &TracerConfig, mut handler: F) -> Result<()>
    where
        F: FnMut(&[Point3], CurveMask, &RotatedConic) -> Result<()>,
    {
        match self.silhouette(eye)? {
            PlaneSection::Exact(conics) => self.deliver_exact(&conics, config, &mut handler),
            PlaneSection::NoClosedForm => match self.kind {
                ConicKind::Torus { hoop_radius } => {
                    let form = ToroidalForm::eye(&self.map.to_local(eye), hoop_radius);
                    self.deliver_traced(&form, config, &mut handler)
                }
                _ => Err(ConicError::Unclassified("silhouette tracing").into()),
            },
        }
    }

    /// Delivers the section by the world plane as polylines, like
    /// [`Self::trace_silhouette`].
    ///
    /// # Errors
    ///
    /// Fails for swept generators and propagates handler errors.
    #[instrument(level = "debug", skip(self, config, handler), fields(kind = ?self.kind))]
    pub fn trace_plane_section<F>(&self, plane: &Vector4, config: &TracerConfig, mut handler: F) -> Result<()>
    where
        F: FnMut(&[Point3], CurveMask, &RotatedConic) -> Result<()>,
    {
        match self.intersect_plane(plane) {
            PlaneSection::Exact(conics) => self.deliver_exact(&conics, config, &mut handler),
            PlaneSection::NoClosedForm => match self.kind {
                ConicKind::Torus { hoop_radius } => {
                    let form = ToroidalForm::plane(&self.map.plane_to_local(plane), hoop_radius);
                    self.deliver_traced(&form, config, &mut handler)
                }
                _ => Err(ConicError::Unclassified("section tracing").into()),
            },
        }
    }

    fn deliver_exact<F>(&self, conics: &[HConic], config: &TracerConfig, handler: &mut F) -> Result<()>
    where
        F: FnMut(&[Point3], CurveMask, &RotatedConic) -> Result<()>,
    {
        let mut batches = 0;
        for conic in conics {
            for line in conic.stroke(config.step()) {
                batches += deliver(&line, CurveMask::SMOOTH | CurveMask::EXACT, self, config.max_points, handler)?;
            }
        }
        debug!(conics = conics.len(), batches, "delivered exact curves");
        Ok(())
    }

    fn deliver_traced<F>(&self, form: &ToroidalForm, config: &TracerConfig, handler: &mut F) -> Result<()>
    where
        F: FnMut(&[Point3], CurveMask, &RotatedConic) -> Result<()>,
    {
        let step = config.step();
        let theta = Axis::new(self.range.u_min, self.u_sweep(), step);
        let phi = Axis::new(self.range.v_min, self.v_sweep(), step);
        let lines = trace_form(form, &theta, &phi, self.tolerances.unit_circle);
        let mut batches = 0;
        for line in &lines {
            let kept = filter_close(line, config.filter_fraction * step);
            let world = kept
                .iter()
                .map(|(t, p)| self.evaluate(*t, *p))
                .collect::<Result<Vec<_>>>()?;
            batches += deliver(&world, CurveMask::SMOOTH, self, config.max_points, handler)?;
        }
        debug!(polylines = lines.len(), batches, "delivered traced curves");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::conic::PlacementMap;
    use approx::assert_relative_eq;

    fn torus(b: f64) -> RotatedConic {
        RotatedConic::frame_and_sweep(ConicKind::Torus { hoop_radius: b }, PlacementMap::identity(), 0.0, TAU, 0.0, TAU)
    }

    fn collect(surface: &RotatedConic, trace: impl FnOnce(&RotatedConic, &mut Vec<(Vec<Point3>, CurveMask)>) -> Result<()>) -> Vec<(Vec<Point3>, CurveMask)> {
        let mut out = Vec::new();
        trace(surface, &mut out).unwrap();
        out
    }

    #[test]
    fn mask_flags() {
        let both = CurveMask::SMOOTH | CurveMask::EXACT;
        assert!(both.contains(CurveMask::EXACT));
        assert!(!CurveMask::SMOOTH.contains(CurveMask::EXACT));
        assert!(CurveMask::SMOOTH.contains(CurveMask::NONE));
        assert_eq!(both.bits(), 3);
    }

    #[test]
    fn toroidal_forms_match_geometry() {
        let b = 0.3;
        let t = torus(b);
        let h = Vector4::new(0.2, -0.4, 1.0, 0.1);
        let plane = ToroidalForm::plane(&h, b);
        let (theta, phi) = (0.7, 2.1);
        let x = t.local_point(theta, phi);
        assert_relative_eq!(plane.value(theta, phi), h.dot(&x.to_homogeneous()), epsilon = 1e-12);

        let eye = Vector4::new(3.0, 1.0, 2.0, 1.0);
        let form = ToroidalForm::eye(&eye, b);
        let normal = Vector3::new(phi.cos() * theta.cos(), phi.cos() * theta.sin(), phi.sin());
        let expected = normal.dot(&(x.coords - eye.xyz()));
        assert_relative_eq!(form.value(theta, phi), expected, epsilon = 1e-12);
    }

    #[test]
    fn silhouette_from_above_is_two_rings() {
        let t = torus(0.25);
        let lines = collect(&t, |s, out| {
            s.trace_silhouette(&Vector4::new(0.0, 0.0, 1.0, 0.0), &TracerConfig::default(), |pts, mask, _| {
                out.push((pts.to_vec(), mask));
                Ok(())
            })
        });
        assert!(!lines.is_empty());
        for (pts, mask) in &lines {
            assert_eq!(*mask, CurveMask::SMOOTH);
            for p in pts {
                assert!(p.z.abs() < 1e-9);
                let r = p.x.hypot(p.y);
                assert!((r - 1.25).abs() < 1e-9 || (r - 0.75).abs() < 1e-9, "radius {r}");
            }
        }
    }

    #[test]
    fn traced_section_points_lie_on_plane_and_torus() {
        let t = torus(0.4);
        let h = Vector4::new(0.3, 0.0, 1.0, -0.1);
        let config = TracerConfig {
            max_points: 10,
            ..TracerConfig::default()
        };
        let lines = collect(&t, |s, out| {
            s.trace_plane_section(&h, &config, |pts, mask, _| {
                out.push((pts.to_vec(), mask));
                Ok(())
            })
        });
        assert!(lines.len() > 1);
        for (pts, _) in &lines {
            assert!(pts.len() <= 10 && pts.len() >= 2);
            for p in pts {
                assert!(h.dot(&p.to_homogeneous()).abs() < 1e-9);
                let f = t.local_implicit(&p.to_homogeneous()).unwrap();
                assert!(f.abs() < 1e-9);
            }
        }
        // Consecutive batches of one polyline share their boundary point.
        let shared = lines.windows(2).filter(|w| w[0].0.last() == w[1].0.first()).count();
        assert!(shared > 0);
    }

    #[test]
    fn exact_sections_are_stroked() {
        let cyl = RotatedConic::unit_cylinder(PlacementMap::identity(), 0.0, TAU);
        let lines = collect(&cyl, |s, out| {
            s.trace_plane_section(&Vector4::new(0.0, 0.0, 1.0, -0.5), &TracerConfig::default(), |pts, mask, _| {
                out.push((pts.to_vec(), mask));
                Ok(())
            })
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].1.contains(CurveMask::EXACT));
        let (first, last) = (lines[0].0[0], *lines[0].0.last().unwrap());
        assert_relative_eq!(first, last, epsilon = 1e-12);
    }

    #[test]
    fn handler_error_stops_tracing() {
        let t = torus(0.25);
        let mut calls = 0;
        let result = t.trace_silhouette(&Vector4::new(0.0, 0.0, 1.0, 0.0), &TracerConfig::default(), |_, _, _| {
            calls += 1;
            Err(ConicError::Handler("stop".into()).into())
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn generators_cannot_be_traced() {
        let g = RotatedConic::new(
            ConicKind::RotatedLine {
                start: Point3::new(1.0, 0.0, 0.0),
                end: Point3::new(0.0, 1.0, 1.0),
            },
            PlacementMap::identity(),
            crate::geometry::SurfaceDomain::new(0.0, TAU, 0.0, 1.0),
        );
        let result = g.trace_plane_section(&Vector4::z(), &TracerConfig::default(), |_, _, _| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn filter_keeps_endpoints() {
        let line = [(0.0, 0.0), (0.001, 0.0), (0.1, 0.0), (0.1005, 0.0)];
        let kept = filter_close(&line, 0.005);
        assert_eq!(kept.first(), Some(&(0.0, 0.0)));
        assert_eq!(kept.last(), Some(&(0.1005, 0.0)));
        assert_eq!(kept.len(), 2);
    }
}
