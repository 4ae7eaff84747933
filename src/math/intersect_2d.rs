use super::arc_2d::ArcGeometry;
use super::trig::sweep_fraction;
use super::{cross_2d, Point2, Vector2, TOLERANCE};

/// One intersection between two parametric pieces.
///
/// `t` is the parameter on the first piece and `u` on the second, both in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub point: Point2,
    pub t: f64,
    pub u: f64,
}

/// Parametric 2D line-line intersection.
///
/// Given lines `p1 + t * d1` and `p2 + u * d2`, returns `(t, u)` if not parallel.
#[must_use]
pub fn line_line_intersect_2d(
    p1: &Point2,
    d1: &Vector2,
    p2: &Point2,
    d2: &Vector2,
) -> Option<(f64, f64)> {
    let cross = cross_2d(d1, d2);
    if cross.abs() < TOLERANCE {
        return None;
    }
    let d = p2 - p1;
    let t = cross_2d(&d, d2) / cross;
    let u = cross_2d(&d, d1) / cross;
    Some((t, u))
}

fn project_param(p: &Point2, origin: &Point2, dir: &Vector2) -> f64 {
    (p - origin).dot(dir) / dir.norm_squared()
}

/// Bounded segment-segment intersection in 2D.
///
/// Endpoints within `tol` of the other segment count as hits. Collinear
/// overlapping segments report the two ends of the shared interval.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
    tol: f64,
) -> Vec<Hit> {
    let da = a1 - a0;
    let db = b1 - b0;
    let len_a = da.norm();
    let len_b = db.norm();
    if len_a < tol || len_b < tol {
        return Vec::new();
    }
    let eps_t = tol / len_a;
    let eps_u = tol / len_b;

    let dist_b0 = cross_2d(&da, &(b0 - a0)).abs() / len_a;
    let dist_b1 = cross_2d(&da, &(b1 - a0)).abs() / len_a;
    if dist_b0 <= tol && dist_b1 <= tol {
        return collinear_overlap(a0, &da, b0, &db, eps_t);
    }

    let cross = cross_2d(&da, &db);
    if cross.abs() < 1e-14 * len_a * len_b {
        return Vec::new();
    }
    let d = b0 - a0;
    let t = cross_2d(&d, &db) / cross;
    let u = cross_2d(&d, &da) / cross;

    if t >= -eps_t && t <= 1.0 + eps_t && u >= -eps_u && u <= 1.0 + eps_u {
        let t = t.clamp(0.0, 1.0);
        vec![Hit {
            point: a0 + da * t,
            t,
            u: u.clamp(0.0, 1.0),
        }]
    } else {
        Vec::new()
    }
}

fn collinear_overlap(a0: &Point2, da: &Vector2, b0: &Point2, db: &Vector2, eps_t: f64) -> Vec<Hit> {
    let b1 = b0 + db;
    let tb0 = project_param(b0, a0, da);
    let tb1 = project_param(&b1, a0, da);
    let lo = tb0.min(tb1).max(0.0);
    let hi = tb0.max(tb1).min(1.0);
    if hi < lo - eps_t {
        return Vec::new();
    }
    let make = |t: f64| {
        let t = t.clamp(0.0, 1.0);
        let point = a0 + da * t;
        Hit {
            point,
            t,
            u: project_param(&point, b0, db).clamp(0.0, 1.0),
        }
    };
    if hi - lo <= eps_t {
        return vec![make(0.5 * (lo + hi))];
    }
    vec![make(lo), make(hi)]
}

/// Intersection of a line segment with a circular arc in 2D.
///
/// Returns hits with `t` on the segment and `u` the fraction of the arc sweep.
#[must_use]
pub fn segment_arc_intersect_2d(a0: &Point2, a1: &Point2, arc: &ArcGeometry, tol: f64) -> Vec<Hit> {
    let mut results = Vec::new();
    if arc.radius < tol || arc.sweep.abs() < TOLERANCE {
        return results;
    }
    let da = a1 - a0;
    let len = da.norm();
    if len < tol {
        return results;
    }
    let center = Point2::new(arc.cx, arc.cy);
    let foot_t = project_param(&center, a0, &da);
    let signed_dist = cross_2d(&da, &(center - a0)) / len;
    let dist = signed_dist.abs();
    if dist > arc.radius + tol {
        return results;
    }

    let t_roots = if (dist - arc.radius).abs() <= tol {
        vec![foot_t]
    } else {
        let half = (arc.radius * arc.radius - dist * dist).max(0.0).sqrt() / len;
        vec![foot_t - half, foot_t + half]
    };

    let eps_t = tol / len;
    let eps_angle = tol / arc.radius;
    for t in t_roots {
        if t < -eps_t || t > 1.0 + eps_t {
            continue;
        }
        let t = t.clamp(0.0, 1.0);
        let p = a0 + da * t;
        let angle = (p.y - arc.cy).atan2(p.x - arc.cx);
        if let Some(u) = sweep_fraction(angle, arc.start_angle, arc.sweep, eps_angle) {
            results.push(Hit { point: p, t, u });
        }
    }
    results
}

/// Intersection of two circular arcs in 2D.
///
/// Co-circular arcs report the ends of their shared angular intervals.
#[must_use]
pub fn arc_arc_intersect_2d(arc1: &ArcGeometry, arc2: &ArcGeometry, tol: f64) -> Vec<Hit> {
    let mut results = Vec::new();
    let (r1, r2) = (arc1.radius, arc2.radius);
    if r1 < tol || r2 < tol {
        return results;
    }

    let dx = arc2.cx - arc1.cx;
    let dy = arc2.cy - arc1.cy;
    let dist = dx.hypot(dy);
    let eps1 = tol / r1;
    let eps2 = tol / r2;

    if dist < tol {
        if (r1 - r2).abs() > tol {
            return results;
        }
        return cocircular_overlap(arc1, arc2, eps1, eps2);
    }

    if dist > r1 + r2 + tol || dist < (r1 - r2).abs() - tol {
        return results;
    }

    // Distance from c1 along the line c1→c2 to the radical line.
    let a = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();

    let mx = arc1.cx + a * dx / dist;
    let my = arc1.cy + a * dy / dist;
    let px = -dy / dist;
    let py = dx / dist;

    let candidates = if h < tol {
        vec![(mx, my)]
    } else {
        vec![(mx + h * px, my + h * py), (mx - h * px, my - h * py)]
    };

    for (ix, iy) in candidates {
        let angle1 = (iy - arc1.cy).atan2(ix - arc1.cx);
        let angle2 = (iy - arc2.cy).atan2(ix - arc2.cx);
        let t = sweep_fraction(angle1, arc1.start_angle, arc1.sweep, eps1);
        let u = sweep_fraction(angle2, arc2.start_angle, arc2.sweep, eps2);
        if let (Some(t), Some(u)) = (t, u) {
            results.push(Hit {
                point: Point2::new(ix, iy),
                t,
                u,
            });
        }
    }
    results
}

fn cocircular_overlap(arc1: &ArcGeometry, arc2: &ArcGeometry, eps1: f64, eps2: f64) -> Vec<Hit> {
    let mut results: Vec<Hit> = Vec::new();
    let mut push = |point: (f64, f64)| {
        let p = Point2::new(point.0, point.1);
        let angle1 = (p.y - arc1.cy).atan2(p.x - arc1.cx);
        let angle2 = (p.y - arc2.cy).atan2(p.x - arc2.cx);
        if let (Some(t), Some(u)) = (
            sweep_fraction(angle1, arc1.start_angle, arc1.sweep, eps1),
            sweep_fraction(angle2, arc2.start_angle, arc2.sweep, eps2),
        ) {
            if !results.iter().any(|h| (h.t - t).abs() <= eps1) {
                results.push(Hit { point: p, t, u });
            }
        }
    };
    push(arc1.point_at(0.0));
    push(arc1.point_at(1.0));
    push(arc2.point_at(0.0));
    push(arc2.point_at(1.0));
    results.sort_by(|a, b| a.t.total_cmp(&b.t));
    results
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::arc_2d::arc_from_bulge;
    use std::f64::consts::PI;

    fn arc(cx: f64, cy: f64, radius: f64, start_angle: f64, sweep: f64) -> ArcGeometry {
        ArcGeometry {
            cx,
            cy,
            radius,
            start_angle,
            sweep,
        }
    }

    #[test]
    fn line_line_perpendicular() {
        let (t, u) = line_line_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Vector2::new(1.0, 0.0),
            &Point2::new(0.5, -1.0),
            &Vector2::new(0.0, 1.0),
        )
        .unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_crossing() {
        let hits = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
            TOLERANCE,
        );
        assert_eq!(hits.len(), 1);
        assert!((hits[0].point.x - 1.0).abs() < TOLERANCE);
        assert!((hits[0].t - 0.5).abs() < TOLERANCE);
        assert!((hits[0].u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_parallel_disjoint() {
        let hits = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
            TOLERANCE,
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn segment_segment_collinear_overlap() {
        let hits = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 0.0),
            &Point2::new(3.0, 0.0),
            &Point2::new(1.0, 0.0),
            TOLERANCE,
        );
        assert_eq!(hits.len(), 2);
        assert!((hits[0].t - 0.25).abs() < TOLERANCE);
        assert!((hits[0].u - 1.0).abs() < TOLERANCE);
        assert!((hits[1].t - 0.75).abs() < TOLERANCE);
        assert!(hits[1].u.abs() < TOLERANCE);
    }

    #[test]
    fn segment_segment_touch_at_endpoint() {
        let hits = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(1.0, 1.0),
            TOLERANCE,
        );
        assert_eq!(hits.len(), 1);
        assert!((hits[0].t - 1.0).abs() < TOLERANCE);
        assert!(hits[0].u.abs() < TOLERANCE);
    }

    #[test]
    fn segment_arc_two_crossings() {
        let hits = segment_arc_intersect_2d(
            &Point2::new(-2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &arc(0.0, 0.0, 1.0, 0.0, PI),
            TOLERANCE,
        );
        assert_eq!(hits.len(), 2, "hits={hits:?}");
    }

    #[test]
    fn segment_arc_tangent() {
        let hits = segment_arc_intersect_2d(
            &Point2::new(-1.0, 1.0),
            &Point2::new(1.0, 1.0),
            &arc(0.0, 0.0, 1.0, 0.0, PI),
            1e-9,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert!(hits[0].point.x.abs() < 1e-6);
        assert!((hits[0].u - 0.5).abs() < 1e-6);
    }

    #[test]
    fn segment_arc_outside_sweep() {
        let hits = segment_arc_intersect_2d(
            &Point2::new(-2.0, 0.0),
            &Point2::new(2.0, 0.0),
            &arc(0.0, 0.0, 1.0, PI / 4.0, PI / 4.0),
            TOLERANCE,
        );
        assert!(hits.is_empty(), "hits={hits:?}");
    }

    #[test]
    fn arc_arc_two_crossings() {
        let hits = arc_arc_intersect_2d(
            &arc(0.0, 0.0, 1.0, -PI, 2.0 * PI),
            &arc(1.0, 0.0, 1.0, 0.0, 2.0 * PI),
            TOLERANCE,
        );
        assert_eq!(hits.len(), 2, "hits={hits:?}");
        let sqrt3_2 = 3.0_f64.sqrt() / 2.0;
        for hit in &hits {
            assert!((hit.point.x - 0.5).abs() < 1e-9);
            assert!((hit.point.y.abs() - sqrt3_2).abs() < 1e-9);
        }
    }

    #[test]
    fn arc_arc_tangent() {
        let hits = arc_arc_intersect_2d(
            &arc(0.0, 0.0, 1.0, -PI / 4.0, PI / 2.0),
            &arc(2.0, 0.0, 1.0, PI / 2.0, PI),
            1e-9,
        );
        assert_eq!(hits.len(), 1, "hits={hits:?}");
        assert!((hits[0].point.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn arc_arc_cocircular_overlap() {
        // Lower semicircle (0,0)->(2,0) and a quarter arc sharing its second half.
        let lower = arc_from_bulge(0.0, 0.0, 2.0, 0.0, 1.0).unwrap();
        let quarter = arc(1.0, 0.0, 1.0, -PI / 2.0, PI / 2.0);
        let hits = arc_arc_intersect_2d(&lower, &quarter, TOLERANCE);
        assert_eq!(hits.len(), 2, "hits={hits:?}");
        assert!((hits[0].t - 0.5).abs() < 1e-9);
        assert!((hits[1].t - 1.0).abs() < 1e-9);
    }
}
