use super::arc_2d::ArcGeometry;
use super::trig::sweep_fraction;
use super::Point2;

/// Closest point on the segment `a`→`b` to `p`.
///
/// Returns `(closest, t)` with `t` in `[0, 1]`.
#[must_use]
pub fn closest_on_segment(p: &Point2, a: &Point2, b: &Point2) -> (Point2, f64) {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        return (*a, 0.0);
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (a + d * t, t)
}

/// Closest point on a circular arc to `p`.
///
/// If the point's angle (relative to center) falls within the arc range the
/// closest point is the radial projection, otherwise the nearer endpoint.
/// Returns `(closest, t)` with `t` the fraction of the sweep.
#[must_use]
pub fn closest_on_arc(p: &Point2, arc: &ArcGeometry) -> (Point2, f64) {
    let dx = p.x - arc.cx;
    let dy = p.y - arc.cy;
    let dist_to_center = dx.hypot(dy);

    if dist_to_center > 1e-300 {
        let angle = dy.atan2(dx);
        if let Some(t) = sweep_fraction(angle, arc.start_angle, arc.sweep, 0.0) {
            let scale = arc.radius / dist_to_center;
            return (Point2::new(arc.cx + dx * scale, arc.cy + dy * scale), t);
        }
    }

    let (x0, y0) = arc.point_at(0.0);
    let (x1, y1) = arc.point_at(1.0);
    let p0 = Point2::new(x0, y0);
    let p1 = Point2::new(x1, y1);
    if (p - p0).norm() <= (p - p1).norm() {
        (p0, 0.0)
    } else {
        (p1, 1.0)
    }
}
