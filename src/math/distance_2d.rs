use super::Point2;

/// Returns the minimum distance from `p` to the segment `a`-`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn distance_to_interior() {
        let d = point_to_segment_dist(
            &Point2::new(1.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert_relative_eq!(d, 1.0);
    }

    #[test]
    fn distance_past_endpoint() {
        let d = point_to_segment_dist(
            &Point2::new(5.0, 4.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
        );
        assert_relative_eq!(d, 5.0);
    }

    #[test]
    fn distance_to_degenerate_segment() {
        let a = Point2::new(1.0, 1.0);
        let d = point_to_segment_dist(&Point2::new(4.0, 5.0), &a, &a);
        assert_relative_eq!(d, 5.0);
    }
}
