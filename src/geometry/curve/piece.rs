use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::Extent;
use crate::math::arc_2d::{arc_from_bulge, bulge_from_sweep, ArcGeometry, MIN_BULGE};
use crate::math::distance_2d::{closest_on_arc, closest_on_segment};
use crate::math::intersect_2d::{
    arc_arc_intersect_2d, segment_arc_intersect_2d, segment_segment_intersect_2d, Hit,
};
use crate::math::polygon_2d::subtended_angle;
use crate::math::transform_2d::{is_similarity, linear_determinant};
use crate::math::{Matrix3, Point2, Vector2};

use super::{Curve, CurveDomain};

/// One boundary piece: a straight segment or a circular arc.
///
/// Arcs are encoded by their bulge, `tan(sweep / 4)`; a positive bulge turns
/// counter-clockwise and bulges to the right of the chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    pub start: Point2,
    pub end: Point2,
    pub bulge: f64,
}

impl Piece {
    /// Straight segment from `start` to `end`.
    #[must_use]
    pub fn segment(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            bulge: 0.0,
        }
    }

    /// Circular arc from `start` to `end` with the given bulge.
    #[must_use]
    pub fn arc(start: Point2, end: Point2, bulge: f64) -> Self {
        Self { start, end, bulge }
    }

    #[must_use]
    pub fn is_arc(&self) -> bool {
        self.bulge.abs() >= MIN_BULGE
    }

    /// Center-radius form of the arc, `None` for segments.
    #[must_use]
    pub fn arc_geometry(&self) -> Option<ArcGeometry> {
        if !self.is_arc() {
            return None;
        }
        arc_from_bulge(self.start.x, self.start.y, self.end.x, self.end.y, self.bulge)
    }

    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        match self.arc_geometry() {
            Some(arc) => {
                let (x, y) = arc.point_at(t);
                Point2::new(x, y)
            }
            None => self.start + (self.end - self.start) * t,
        }
    }

    /// Unit tangent at `t`; zero for a degenerate segment.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Vector2 {
        if let Some(arc) = self.arc_geometry() {
            let (x, y) = arc.tangent_at(t);
            return Vector2::new(x, y);
        }
        let d = self.end - self.start;
        let len = d.norm();
        if len == 0.0 {
            Vector2::zeros()
        } else {
            d / len
        }
    }

    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        self.point_at(0.5)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.arc_geometry()
            .map_or_else(|| (self.end - self.start).norm(), |arc| arc.length())
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
            bulge: -self.bulge,
        }
    }

    /// The part of this piece between parameters `t0` and `t1`.
    #[must_use]
    pub fn sub_piece(&self, t0: f64, t1: f64) -> Self {
        let start = if t0 <= 0.0 { self.start } else { self.point_at(t0) };
        let end = if t1 >= 1.0 { self.end } else { self.point_at(t1) };
        let bulge = self
            .arc_geometry()
            .map_or(0.0, |arc| bulge_from_sweep(arc.sweep * (t1 - t0)));
        Self { start, end, bulge }
    }

    /// Splits at the given parameters. Parameters within `eps` of each other
    /// or of the ends are ignored.
    #[must_use]
    pub fn split_at(&self, params: &[f64], eps: f64) -> Vec<Self> {
        let mut cuts: Vec<f64> = params
            .iter()
            .copied()
            .filter(|t| *t > eps && *t < 1.0 - eps)
            .collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup_by(|a, b| (*a - *b).abs() <= eps);
        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut prev = 0.0;
        for t in cuts {
            pieces.push(self.sub_piece(prev, t));
            prev = t;
        }
        pieces.push(self.sub_piece(prev, 1.0));
        // Keep the split points shared exactly between neighbours.
        for i in 1..pieces.len() {
            pieces[i].start = pieces[i - 1].end;
        }
        pieces
    }

    /// Closest point and its parameter.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> (Point2, f64) {
        match self.arc_geometry() {
            Some(arc) => closest_on_arc(p, &arc),
            None => closest_on_segment(p, &self.start, &self.end),
        }
    }

    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        let (closest, _) = self.closest_point(p);
        (p - closest).norm()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        match self.arc_geometry() {
            Some(arc) => {
                let (x0, y0, x1, y1) = arc.bounds();
                Extent::new(x0, y0, x1, y1)
            }
            None => Extent::new(self.start.x, self.start.y, self.end.x, self.end.y),
        }
    }

    /// Contribution of this piece to the signed area of a closed loop.
    #[must_use]
    pub fn area_term(&self) -> f64 {
        let chord = 0.5 * (self.start.x * self.end.y - self.end.x * self.start.y);
        chord + self.arc_geometry().map_or(0.0, |arc| self.bulge.signum() * arc.segment_area())
    }

    /// Signed angle this piece sweeps around `p`.
    ///
    /// Summed over a closed loop this gives `2π` times the winding number.
    #[must_use]
    pub fn winding_angle(&self, p: &Point2) -> f64 {
        let Some(arc) = self.arc_geometry() else {
            return subtended_angle(p, &self.start, &self.end);
        };
        if (p.x - arc.cx).hypot(p.y - arc.cy) >= arc.radius {
            return subtended_angle(p, &self.start, &self.end);
        }
        // Seen from inside the circle the direction to the arc turns monotonically.
        let a0 = (self.start.y - p.y).atan2(self.start.x - p.x);
        let a1 = (self.end.y - p.y).atan2(self.end.x - p.x);
        if self.bulge > 0.0 {
            (a1 - a0).rem_euclid(TAU)
        } else {
            -(a0 - a1).rem_euclid(TAU)
        }
    }

    /// Intersections with another piece within `tol`, including the ends of
    /// shared (contiguous) intervals.
    #[must_use]
    pub fn intersect(&self, other: &Self, tol: f64) -> Vec<Hit> {
        match (self.arc_geometry(), other.arc_geometry()) {
            (None, None) => {
                segment_segment_intersect_2d(&self.start, &self.end, &other.start, &other.end, tol)
            }
            (None, Some(arc)) => segment_arc_intersect_2d(&self.start, &self.end, &arc, tol),
            (Some(arc), None) => segment_arc_intersect_2d(&other.start, &other.end, &arc, tol)
                .into_iter()
                .map(|h| Hit {
                    point: h.point,
                    t: h.u,
                    u: h.t,
                })
                .collect(),
            (Some(a), Some(b)) => arc_arc_intersect_2d(&a, &b, tol),
        }
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            start: self.start + d,
            end: self.end + d,
            bulge: self.bulge,
        }
    }

    /// Scales about `origin`. A negative factor is a point reflection and
    /// keeps the turning sense of arcs.
    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            start: origin + (self.start - origin) * factor,
            end: origin + (self.end - origin) * factor,
            bulge: self.bulge,
        }
    }

    /// Applies a 2D homogeneous affine map. Returns `None` when an arc is
    /// mapped by a non-similarity and can no longer be represented exactly.
    #[must_use]
    pub fn transformed(&self, m: &Matrix3) -> Option<Self> {
        let start = m.transform_point(&self.start);
        let end = m.transform_point(&self.end);
        if !self.is_arc() {
            return Some(Self::segment(start, end));
        }
        if !is_similarity(m) {
            return None;
        }
        let det = linear_determinant(m);
        Some(Self::arc(start, end, self.bulge * det.signum()))
    }
}

impl Curve for Piece {
    fn evaluate(&self, t: f64) -> Result<Point2> {
        if !self.domain().contains(t) {
            return Err(GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: 0.0,
                max: 1.0,
            }
            .into());
        }
        Ok(self.point_at(t))
    }

    fn tangent(&self, t: f64) -> Result<Vector2> {
        let tangent = self.tangent_at(t);
        if tangent.norm() == 0.0 {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(tangent)
    }

    fn domain(&self) -> CurveDomain {
        CurveDomain::new(0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        false
    }
}
