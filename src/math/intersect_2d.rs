use super::{Point2, TOLERANCE};

/// How two closed segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentContact {
    /// No common point.
    Disjoint,
    /// A single common point strictly inside both segments.
    Crossing { point: Point2, t: f64, u: f64 },
    /// A single common point at an endpoint of at least one segment.
    Touching { t: f64, u: f64 },
    /// Collinear with a common sub-segment of positive length.
    Overlapping,
}

fn cross(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel segments never intersect here; see [`classify_segments`].
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let denom = cross(da.x, da.y, db.x, db.y);
    if denom.abs() < TOLERANCE {
        return None;
    }

    let d = b0 - a0;
    let t = cross(d.x, d.y, db.x, db.y) / denom;
    let u = cross(d.x, d.y, da.x, da.y) / denom;

    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Classifies the contact between segments `a0`-`a1` and `b0`-`b1`.
#[must_use]
pub fn classify_segments(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> SegmentContact {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = cross(da.x, da.y, db.x, db.y);

    if denom.abs() < TOLERANCE {
        let d = b0 - a0;
        let len_sq = da.norm_squared();
        if len_sq < TOLERANCE || cross(da.x, da.y, d.x, d.y).abs() > TOLERANCE * len_sq.sqrt() {
            return SegmentContact::Disjoint;
        }
        // Collinear: compare parameter ranges along `a`.
        let s0 = d.dot(&da) / len_sq;
        let s1 = (b1 - a0).dot(&da) / len_sq;
        let (lo, hi) = if s0 <= s1 { (s0, s1) } else { (s1, s0) };
        let overlap = hi.min(1.0) - lo.max(0.0);
        if overlap > TOLERANCE {
            return SegmentContact::Overlapping;
        }
        if overlap >= -TOLERANCE {
            let t = lo.max(0.0).clamp(0.0, 1.0);
            let u = if (s0 - t).abs() <= (s1 - t).abs() { 0.0 } else { 1.0 };
            return SegmentContact::Touching { t, u };
        }
        return SegmentContact::Disjoint;
    }

    match segment_segment_intersect_2d(a0, a1, b0, b1) {
        None => SegmentContact::Disjoint,
        Some((point, t, u)) => {
            let inside = |s: f64| s > TOLERANCE && s < 1.0 - TOLERANCE;
            if inside(t) && inside(u) {
                SegmentContact::Crossing { point, t, u }
            } else {
                SegmentContact::Touching { t, u }
            }
        }
    }
}
