//! Planar conic curves in homogeneous form.
//!
//! Plane sections of the canonical surfaces are rational: a cone cut by an
//! oblique plane gives a hyperbola, which is still an [`HEllipse`] once its
//! vectors carry weights. Only the parts listed in `sectors` belong to the
//! curve.

use std::f64::consts::TAU;

use crate::math::trig::solve_unit_quadratic;
use crate::math::{Matrix4, Point3, Vector4};

use super::map::cartesian;
use super::range::Range3;

const UNIT_CIRCLE_TOL: f64 = 1e-12;
const MIN_SECTOR: f64 = 1e-14;

/// A closed parameter interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub end: f64,
}

impl Sector {
    /// Interval covering `start` to `start + sweep`, whatever the sign of `sweep`.
    #[must_use]
    pub fn swept(start: f64, sweep: f64) -> Self {
        if sweep >= 0.0 {
            Self {
                start,
                end: start + sweep,
            }
        } else {
            Self {
                start: start + sweep,
                end: start,
            }
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    #[must_use]
    pub fn mid(&self) -> f64 {
        0.5 * (self.start + self.end)
    }
}

/// `center + vector0 · cos θ + vector90 · sin θ` for `θ` in the sectors.
#[derive(Debug, Clone, PartialEq)]
pub struct HEllipse {
    pub center: Vector4,
    pub vector0: Vector4,
    pub vector90: Vector4,
    pub sectors: Vec<Sector>,
}

/// `(1 - t) · start + t · end` for `t` in the sectors.
#[derive(Debug, Clone, PartialEq)]
pub struct HSegment {
    pub start: Vector4,
    pub end: Vector4,
    pub sectors: Vec<Sector>,
}

/// A planar conic produced by a section or silhouette query.
#[derive(Debug, Clone, PartialEq)]
pub enum HConic {
    Null,
    Point(Vector4),
    Line(HSegment),
    LinePair(HSegment, HSegment),
    Ellipse(HEllipse),
}

impl HEllipse {
    #[must_use]
    pub fn new(center: Vector4, vector0: Vector4, vector90: Vector4, start: f64, sweep: f64) -> Self {
        Self {
            center,
            vector0,
            vector90,
            sectors: vec![Sector::swept(start, sweep)],
        }
    }

    /// Circular arc of `radius` around the z axis at height `z`; a point if
    /// the radius vanishes.
    #[must_use]
    pub fn z_circle(theta0: f64, sweep: f64, radius: f64, z: f64, small: f64) -> HConic {
        if radius.abs() <= small {
            return HConic::Point(Vector4::new(0.0, 0.0, z, 1.0));
        }
        HConic::Ellipse(Self::new(
            Vector4::new(0.0, 0.0, z, 1.0),
            Vector4::new(radius, 0.0, 0.0, 0.0),
            Vector4::new(0.0, radius, 0.0, 0.0),
            theta0,
            sweep,
        ))
    }

    /// Meridian circle of `radius` in the half-plane at angle `theta`, centered
    /// `offset` away from the z axis, swept from latitude `phi0`.
    #[must_use]
    pub fn meridian(phi0: f64, sweep: f64, theta: f64, radius: f64, offset: f64, small: f64) -> HConic {
        let (s, c) = theta.sin_cos();
        if sweep.abs() <= small {
            let a = offset + radius * phi0.cos();
            return HConic::Point(Vector4::new(c * a, s * a, radius * phi0.sin(), 1.0));
        }
        HConic::Ellipse(Self::new(
            Vector4::new(c * offset, s * offset, 0.0, 1.0),
            Vector4::new(c * radius, s * radius, 0.0, 0.0),
            Vector4::new(0.0, 0.0, radius, 0.0),
            phi0,
            sweep,
        ))
    }

    #[must_use]
    pub fn evaluate(&self, theta: f64) -> Vector4 {
        let (s, c) = theta.sin_cos();
        self.center + self.vector0 * c + self.vector90 * s
    }

    /// Cartesian point at `theta`, `None` where the weight vanishes.
    #[must_use]
    pub fn point_at(&self, theta: f64) -> Option<Point3> {
        cartesian(&self.evaluate(theta))
    }

    /// Negates all three vectors if needed so the center weight is not negative.
    pub fn abs_center_weight(&mut self) {
        if self.center.w < 0.0 {
            self.center = -self.center;
            self.vector0 = -self.vector0;
            self.vector90 = -self.vector90;
        }
    }

    /// Angles where `h · X(θ)` vanishes.
    fn roots_of(&self, h: &Vector4) -> Vec<f64> {
        solve_unit_quadratic(h.dot(&self.center), h.dot(&self.vector0), h.dot(&self.vector90), UNIT_CIRCLE_TOL)
            .into_iter()
            .map(|(c, s)| s.atan2(c))
            .collect()
    }

    /// Keeps the part of the curve on the non-positive side of `plane`.
    pub fn clip_to_plane(&mut self, plane: &Vector4) {
        let weight = Vector4::w();
        let mut breaks = self.roots_of(plane);
        breaks.extend(self.roots_of(&weight));
        let sectors = std::mem::take(&mut self.sectors);
        self.sectors = split_sectors(&sectors, |sector| periodic_breaks(&breaks, sector), |theta| {
            let x = self.evaluate(theta);
            plane.dot(&x) * x.w <= 0.0
        });
    }

    /// Replaces the sectors with the runs of the whole circle whose
    /// midpoints satisfy `keep`, using `breaks` as the only split angles.
    pub(crate) fn restrict(&mut self, breaks: &[f64], keep: impl Fn(f64) -> bool) {
        let full = [Sector { start: 0.0, end: TAU }];
        self.sectors = split_sectors(&full, |sector| periodic_breaks(breaks, sector), keep);
    }

    /// Angles where the plane `h` crosses the unbounded ellipse.
    pub(crate) fn plane_crossings(&self, h: &Vector4) -> Vec<f64> {
        self.roots_of(h)
    }

    fn extend_range(&self, range: &mut Range3) {
        for sector in &self.sectors {
            let mut params = vec![sector.start, sector.end];
            for axis in 0..3 {
                let a = [self.center[axis], self.vector0[axis], self.vector90[axis]];
                let b = [self.center.w, self.vector0.w, self.vector90.w];
                // Stationary points of a rational trigonometric ratio.
                let alpha = a[2] * b[1] - a[1] * b[2];
                let beta = a[2] * b[0] - a[0] * b[2];
                let gamma = a[0] * b[1] - a[1] * b[0];
                let roots: Vec<f64> = solve_unit_quadratic(alpha, beta, gamma, UNIT_CIRCLE_TOL)
                    .into_iter()
                    .map(|(c, s)| s.atan2(c))
                    .collect();
                params.extend(periodic_breaks(&roots, *sector));
            }
            for theta in params {
                if let Some(p) = self.point_at(theta) {
                    range.extend(&p);
                }
            }
        }
    }

    #[must_use]
    pub fn transformed(&self, m: &Matrix4) -> Self {
        Self {
            center: m * self.center,
            vector0: m * self.vector0,
            vector90: m * self.vector90,
            sectors: self.sectors.clone(),
        }
    }
}

impl HSegment {
    #[must_use]
    pub fn new(start: Vector4, end: Vector4) -> Self {
        Self {
            start,
            end,
            sectors: vec![Sector { start: 0.0, end: 1.0 }],
        }
    }

    #[must_use]
    pub fn evaluate(&self, t: f64) -> Vector4 {
        self.start * (1.0 - t) + self.end * t
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Option<Point3> {
        cartesian(&self.evaluate(t))
    }

    /// Keeps the part of the segment on the non-positive side of `plane`.
    pub fn clip_to_plane(&mut self, plane: &Vector4) {
        let mut breaks = Vec::with_capacity(2);
        for h in [*plane, Vector4::w()] {
            let h0 = h.dot(&self.start);
            let h1 = h.dot(&self.end);
            if h0 != h1 {
                breaks.push(h0 / (h0 - h1));
            }
        }
        let sectors = std::mem::take(&mut self.sectors);
        self.sectors = split_sectors(
            &sectors,
            |sector| {
                breaks
                    .iter()
                    .copied()
                    .filter(|t| *t > sector.start && *t < sector.end)
                    .collect()
            },
            |t| {
                let x = self.evaluate(t);
                plane.dot(&x) * x.w <= 0.0
            },
        );
    }

    fn extend_range(&self, range: &mut Range3) {
        for sector in &self.sectors {
            for t in [sector.start, sector.end] {
                if let Some(p) = self.point_at(t) {
                    range.extend(&p);
                }
            }
        }
    }

    #[must_use]
    pub fn transformed(&self, m: &Matrix4) -> Self {
        Self {
            start: m * self.start,
            end: m * self.end,
            sectors: self.sectors.clone(),
        }
    }
}

impl HConic {
    /// True for the null conic and for curves with every sector clipped away.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Point(_) => false,
            Self::Line(l) => l.sectors.is_empty(),
            Self::LinePair(a, b) => a.sectors.is_empty() && b.sectors.is_empty(),
            Self::Ellipse(e) => e.sectors.is_empty(),
        }
    }

    /// Number of disjoint pieces (a point counts as one).
    #[must_use]
    pub fn segment_count(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::Point(_) => 1,
            Self::Line(l) => l.sectors.len(),
            Self::LinePair(a, b) => a.sectors.len() + b.sectors.len(),
            Self::Ellipse(e) => e.sectors.len(),
        }
    }

    #[must_use]
    pub fn transformed(&self, m: &Matrix4) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Point(p) => Self::Point(m * p),
            Self::Line(l) => Self::Line(l.transformed(m)),
            Self::LinePair(a, b) => Self::LinePair(a.transformed(m), b.transformed(m)),
            Self::Ellipse(e) => Self::Ellipse(e.transformed(m)),
        }
    }

    /// Keeps the part on the non-positive side of `plane`.
    pub fn clip_to_plane(&mut self, plane: &Vector4) {
        match self {
            Self::Null => {}
            Self::Point(p) => {
                if plane.dot(p) * p.w > 0.0 {
                    *self = Self::Null;
                }
            }
            Self::Line(l) => l.clip_to_plane(plane),
            Self::LinePair(a, b) => {
                a.clip_to_plane(plane);
                b.clip_to_plane(plane);
            }
            Self::Ellipse(e) => e.clip_to_plane(plane),
        }
    }

    /// Bounding box of the curve's sectors.
    #[must_use]
    pub fn range(&self) -> Range3 {
        let mut range = Range3::empty();
        self.extend_range(&mut range);
        range
    }

    pub fn extend_range(&self, range: &mut Range3) {
        match self {
            Self::Null => {}
            Self::Point(p) => {
                if let Some(p) = cartesian(p) {
                    range.extend(&p);
                }
            }
            Self::Line(l) => l.extend_range(range),
            Self::LinePair(a, b) => {
                a.extend_range(range);
                b.extend_range(range);
            }
            Self::Ellipse(e) => e.extend_range(range),
        }
    }

    /// Polylines through every sector, one per sector, with elliptic sectors
    /// sampled at most `angle_step` apart. Points at infinity break a polyline.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn stroke(&self, angle_step: f64) -> Vec<Vec<Point3>> {
        let mut out = Vec::new();
        let mut push_run = |points: Vec<Option<Point3>>| {
            let mut run = Vec::new();
            for p in points {
                match p {
                    Some(p) => run.push(p),
                    None => {
                        if run.len() > 1 {
                            out.push(std::mem::take(&mut run));
                        }
                        run.clear();
                    }
                }
            }
            if !run.is_empty() {
                out.push(run);
            }
        };
        let segment_runs = |l: &HSegment| -> Vec<Vec<Option<Point3>>> {
            l.sectors
                .iter()
                .map(|s| vec![l.point_at(s.start), l.point_at(s.end)])
                .collect()
        };
        match self {
            Self::Null => {}
            Self::Point(p) => push_run(vec![cartesian(p)]),
            Self::Line(l) => segment_runs(l).into_iter().for_each(&mut push_run),
            Self::LinePair(a, b) => {
                segment_runs(a).into_iter().for_each(&mut push_run);
                segment_runs(b).into_iter().for_each(&mut push_run);
            }
            Self::Ellipse(e) => {
                let step = angle_step.max(1e-3);
                for sector in &e.sectors {
                    let n = ((sector.length() / step).ceil() as usize).max(2);
                    let points = (0..=n)
                        .map(|i| e.point_at(sector.start + sector.length() * i as f64 / n as f64))
                        .collect();
                    push_run(points);
                }
            }
        }
        out
    }
}

/// Translates of each root angle that fall strictly inside `sector`.
fn periodic_breaks(roots: &[f64], sector: Sector) -> Vec<f64> {
    let mut out = Vec::new();
    for &root in roots {
        let mut k = ((sector.start - root) / TAU).ceil();
        loop {
            let a = root + k * TAU;
            if a >= sector.end {
                break;
            }
            if a > sector.start {
                out.push(a);
            }
            k += 1.0;
        }
    }
    out
}

/// Splits each sector at its breaks and keeps the pieces whose midpoint
/// passes `keep`, merging neighbours that stay adjacent.
fn split_sectors(
    sectors: &[Sector],
    breaks: impl Fn(Sector) -> Vec<f64>,
    keep: impl Fn(f64) -> bool,
) -> Vec<Sector> {
    let mut out: Vec<Sector> = Vec::new();
    for sector in sectors {
        let mut cuts = breaks(*sector);
        cuts.push(sector.start);
        cuts.push(sector.end);
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() <= MIN_SECTOR);
        for pair in cuts.windows(2) {
            let piece = Sector {
                start: pair[0],
                end: pair[1],
            };
            if piece.length() <= MIN_SECTOR || !keep(piece.mid()) {
                continue;
            }
            match out.last_mut() {
                Some(last) if (last.end - piece.start).abs() <= MIN_SECTOR => last.end = piece.end,
                _ => out.push(piece),
            }
        }
    }
    out
}
