use std::f64::consts::TAU;

use crate::error::{Result, ShapeError};
use crate::math::arc_2d::arc_from_bulge;
use crate::math::intersect_2d::Hit;
use crate::math::{Matrix3, Point2, Vector2};

use super::curve::{Curve, CurveDomain, Piece};
use super::Extent;

/// Bulge-encoded polyline vertex for mixed line/arc segments.
///
/// `bulge = tan(sweep_angle / 4)`:
/// - `0` = straight line to next vertex
/// - `> 0` = counter-clockwise arc to next vertex
/// - `< 0` = clockwise arc to next vertex
/// - `|bulge| = 1` = semicircle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlineVertex {
    pub x: f64,
    pub y: f64,
    pub bulge: f64,
}

impl PlineVertex {
    /// Creates a new vertex with the given coordinates and bulge.
    #[must_use]
    pub fn new(x: f64, y: f64, bulge: f64) -> Self {
        Self { x, y, bulge }
    }

    /// Creates a line vertex (bulge = 0).
    #[must_use]
    pub fn line(x: f64, y: f64) -> Self {
        Self { x, y, bulge: 0.0 }
    }

    #[must_use]
    pub fn point(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Sense in which a closed boundary is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// Whether the end points of an open linear count as "on" it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtremityPolicy {
    #[default]
    Include,
    Exclude,
}

/// A polyline with mixed straight-line and circular-arc segments.
///
/// This is the "complex linear" every shape boundary is expressed as. For
/// closed polylines the last vertex connects back to the first; the closing
/// vertex is never stored twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Pline {
    pub vertices: Vec<PlineVertex>,
    pub closed: bool,
}

impl Pline {
    /// Creates a `Pline` from points with all-zero bulges (line segments only).
    #[must_use]
    pub fn from_points(points: &[Point2], closed: bool) -> Self {
        let vertices = points
            .iter()
            .map(|p| PlineVertex::line(p.x, p.y))
            .collect();
        Self { vertices, closed }
    }

    /// Builds a closed boundary from a point sequence whose last point
    /// repeats the first within `tol`.
    ///
    /// # Errors
    ///
    /// Returns `ShapeError::NotClosed` if the sequence does not close and
    /// `ShapeError::TooFewVertices` if fewer than 3 distinct vertices remain.
    pub fn closed_from_points(points: &[Point2], tol: f64) -> Result<Self> {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Err(ShapeError::TooFewVertices(0).into());
        };
        if (first - last).norm() > tol {
            return Err(ShapeError::NotClosed.into());
        }
        let mut distinct: Vec<Point2> = Vec::with_capacity(points.len());
        for p in &points[..points.len() - 1] {
            if distinct.last().is_none_or(|q: &Point2| (p - q).norm() > tol) {
                distinct.push(*p);
            }
        }
        if distinct.len() < 3 {
            return Err(ShapeError::TooFewVertices(distinct.len()).into());
        }
        Ok(Self::from_points(&distinct, true))
    }

    /// Builds a polyline from consecutive pieces. The end of each piece is
    /// assumed to coincide with the start of the next.
    #[must_use]
    pub fn from_pieces(pieces: &[Piece], closed: bool) -> Self {
        let mut vertices: Vec<PlineVertex> = pieces
            .iter()
            .map(|p| PlineVertex::new(p.start.x, p.start.y, p.bulge))
            .collect();
        if !closed {
            if let Some(last) = pieces.last() {
                vertices.push(PlineVertex::line(last.end.x, last.end.y));
            }
        }
        Self { vertices, closed }
    }

    /// Returns the number of segments in this polyline.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.vertices.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Segment `i` as a [`Piece`].
    #[must_use]
    pub fn piece(&self, i: usize) -> Piece {
        let n = self.vertices.len();
        let v0 = self.vertices[i];
        let v1 = self.vertices[(i + 1) % n];
        Piece::arc(v0.point(), v1.point(), v0.bulge)
    }

    /// All segments in order.
    #[must_use]
    pub fn pieces(&self) -> Vec<Piece> {
        (0..self.segment_count()).map(|i| self.piece(i)).collect()
    }

    /// Converts this polyline to points by tessellating arcs into chords.
    ///
    /// `tolerance` bounds the distance between an arc and its chords.
    #[must_use]
    pub fn to_points(&self, tolerance: f64) -> Vec<Point2> {
        let n = self.vertices.len();
        if n == 0 {
            return Vec::new();
        }

        let mut points = Vec::with_capacity(n * 2);
        points.push(self.vertices[0].point());

        for i in 0..self.segment_count() {
            let v0 = &self.vertices[i];
            let v1 = &self.vertices[(i + 1) % n];
            if let Some(arc) = arc_from_bulge(v0.x, v0.y, v1.x, v1.y, v0.bulge) {
                let n_sub = arc_subdivision_count(arc.radius, arc.sweep.abs(), tolerance);
                for j in 1..n_sub {
                    let (px, py) = arc.point_at(f64::from(j) / f64::from(n_sub));
                    points.push(Point2::new(px, py));
                }
            }
            points.push(v1.point());
        }
        if self.closed {
            // The closing vertex is implied.
            points.pop();
        }
        points
    }

    /// Returns a new polyline with vertices in reverse order and negated bulges.
    ///
    /// For a segment `v[i] → v[i+1]` with bulge `b`, the reversed segment
    /// `v[i+1] → v[i]` has bulge `-b`.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let m = self.vertices.len();
        if m == 0 {
            return self.clone();
        }
        let mut new_verts = Vec::with_capacity(m);
        for j in 0..m {
            let orig_idx = m - 1 - j;
            let bulge = if j < m - 1 {
                -self.vertices[m - 2 - j].bulge
            } else if self.closed {
                // Closing segment (v[0] → v[m-1]) reverses the old closing one.
                -self.vertices[m - 1].bulge
            } else {
                0.0
            };
            new_verts.push(PlineVertex::new(
                self.vertices[orig_idx].x,
                self.vertices[orig_idx].y,
                bulge,
            ));
        }
        Self {
            vertices: new_verts,
            closed: self.closed,
        }
    }

    /// Signed enclosed area (closed polylines only, arcs included exactly).
    /// Positive for counter-clockwise boundaries.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if !self.closed {
            return 0.0;
        }
        self.pieces().iter().map(Piece::area_term).sum()
    }

    #[must_use]
    pub fn rotation_direction(&self) -> RotationDirection {
        if self.signed_area() < 0.0 {
            RotationDirection::Clockwise
        } else {
            RotationDirection::CounterClockwise
        }
    }

    /// Copy walked in the requested direction.
    #[must_use]
    pub fn oriented(&self, direction: RotationDirection) -> Self {
        if self.rotation_direction() == direction {
            self.clone()
        } else {
            self.reversed()
        }
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.pieces().iter().map(Piece::length).sum()
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        if self.segment_count() == 0 {
            return Extent::from_points(&self.vertices.iter().map(PlineVertex::point).collect::<Vec<_>>());
        }
        self.pieces()
            .iter()
            .fold(Extent::empty(), |acc, p| acc.union(&p.extent()))
    }

    /// Winding number of a closed polyline around `p`.
    #[must_use]
    pub fn winding_number(&self, p: &Point2) -> i32 {
        if !self.closed {
            return 0;
        }
        let total: f64 = self.pieces().iter().map(|piece| piece.winding_angle(p)).sum();
        #[allow(clippy::cast_possible_truncation)]
        let winding = (total / TAU).round() as i32;
        winding
    }

    /// Closest boundary point to `p`.
    #[must_use]
    pub fn closest_point(&self, p: &Point2) -> Option<Point2> {
        self.pieces()
            .iter()
            .map(|piece| piece.closest_point(p).0)
            .min_by(|a, b| (a - p).norm().total_cmp(&(b - p).norm()))
    }

    /// Distance from `p` to the polyline.
    #[must_use]
    pub fn distance_to(&self, p: &Point2) -> f64 {
        self.closest_point(p)
            .map_or(f64::INFINITY, |closest| (p - closest).norm())
    }

    /// True if `p` lies on the polyline within `tol`.
    ///
    /// With [`ExtremityPolicy::Exclude`] the two ends of an open polyline are
    /// not considered on it; closed polylines have no extremities.
    #[must_use]
    pub fn is_point_on(&self, p: &Point2, extremity: ExtremityPolicy, tol: f64) -> bool {
        if self.distance_to(p) > tol {
            return false;
        }
        if self.closed || extremity == ExtremityPolicy::Include {
            return true;
        }
        let (Some(first), Some(last)) = (self.vertices.first(), self.vertices.last()) else {
            return false;
        };
        (p - first.point()).norm() > tol && (p - last.point()).norm() > tol
    }

    /// Points where this polyline meets `other`, sorted along `self`.
    #[must_use]
    pub fn intersection_points(&self, other: &Self, tol: f64) -> Vec<Point2> {
        let mut hits: Vec<(usize, Hit)> = Vec::new();
        let others = other.pieces();
        for (i, piece) in self.pieces().iter().enumerate() {
            for o in &others {
                hits.extend(piece.intersect(o, tol).into_iter().map(|h| (i, h)));
            }
        }
        hits.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.t.total_cmp(&b.1.t)));
        let mut points: Vec<Point2> = Vec::with_capacity(hits.len());
        for (_, hit) in hits {
            if points.iter().all(|q| (q - hit.point).norm() > tol) {
                points.push(hit.point);
            }
        }
        points
    }

    #[must_use]
    pub fn translated(&self, d: &Vector2) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| PlineVertex::new(v.x + d.x, v.y + d.y, v.bulge))
                .collect(),
            closed: self.closed,
        }
    }

    #[must_use]
    pub fn scaled(&self, factor: f64, origin: &Point2) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| {
                    PlineVertex::new(
                        origin.x + (v.x - origin.x) * factor,
                        origin.y + (v.y - origin.y) * factor,
                        v.bulge,
                    )
                })
                .collect(),
            closed: self.closed,
        }
    }

    /// Applies a 2D affine map. Arcs that the map would distort are replaced
    /// by chords within `tolerance` first.
    #[must_use]
    pub fn transformed(&self, m: &Matrix3, tolerance: f64) -> Self {
        let mut pieces = Vec::with_capacity(self.segment_count());
        for piece in self.pieces() {
            if let Some(mapped) = piece.transformed(m) {
                pieces.push(mapped);
                continue;
            }
            let chords = Self::from_pieces(&[piece], false).to_points(tolerance);
            for w in chords.windows(2) {
                pieces.push(Piece::segment(m.transform_point(&w[0]), m.transform_point(&w[1])));
            }
        }
        Self::from_pieces(&pieces, self.closed)
    }
}

impl Curve for Pline {
    /// Parameter `t` runs from `0` to `segment_count()`; the integer part
    /// selects the segment.
    fn evaluate(&self, t: f64) -> Result<Point2> {
        let (i, local) = self.locate(t)?;
        Ok(self.piece(i).point_at(local))
    }

    fn tangent(&self, t: f64) -> Result<Vector2> {
        let (i, local) = self.locate(t)?;
        self.piece(i).tangent(local)
    }

    fn domain(&self) -> CurveDomain {
        #[allow(clippy::cast_precision_loss)]
        let count = self.segment_count() as f64;
        CurveDomain::new(0.0, count)
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Pline {
    fn locate(&self, t: f64) -> Result<(usize, f64)> {
        let domain = self.domain();
        if self.segment_count() == 0 || !domain.contains(t) {
            return Err(crate::error::GeometryError::ParameterOutOfRange {
                parameter: "t",
                value: t,
                min: domain.t_min,
                max: domain.t_max,
            }
            .into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let i = (t.floor() as usize).min(self.segment_count() - 1);
        #[allow(clippy::cast_precision_loss)]
        let local = t - i as f64;
        Ok((i, local))
    }
}

/// Computes the number of line segments needed to approximate an arc
/// within the given tolerance.
fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    let max_angle = if tolerance >= radius {
        std::f64::consts::PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.clamp(1, 4096)
}
