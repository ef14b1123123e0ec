use super::{Point2, TOLERANCE};

/// Line parameters `(t, u)` where `a0 + t (a1 - a0)` meets `b0 + u (b1 - b0)`.
///
/// Returns `None` when the directions are parallel relative to their
/// lengths, or either segment is degenerate.
#[must_use]
pub fn line_params_2d(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.perp(&db);
    let scale = da.norm() * db.norm();
    if scale <= f64::MIN_POSITIVE || denom.abs() <= TOLERANCE * scale {
        return None;
    }
    let w = b0 - a0;
    Some((w.perp(&db) / denom, w.perp(&da) / denom))
}

/// True when the two segments cross at a point interior to both.
///
/// Touching at an endpoint does not count, so segments sharing a vertex are
/// never reported.
#[must_use]
pub fn segments_cross_properly(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> bool {
    const MARGIN: f64 = 1e-9;
    let interior = |s: f64| s > MARGIN && s < 1.0 - MARGIN;
    matches!(line_params_2d(a0, a1, b0, b1), Some((t, u)) if interior(t) && interior(u))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn perpendicular_lines_meet_at_midpoints() {
        let (t, u) = line_params_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 0.0),
            &Point2::new(1.0, -1.0),
            &Point2::new(1.0, 1.0),
        )
        .unwrap();
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn segments_beyond_reach_do_not_cross() {
        assert!(!segments_cross_properly(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, -1.0),
            &Point2::new(2.0, 1.0),
        ));
    }

    #[test]
    fn parallel_lines_have_no_params() {
        assert!(line_params_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn tiny_crossing_is_still_found() {
        assert!(segments_cross_properly(
            &Point2::new(0.0, 0.0),
            &Point2::new(1e-6, 1e-6),
            &Point2::new(0.0, 1e-6),
            &Point2::new(1e-6, 0.0),
        ));
    }

    #[test]
    fn shared_endpoint_is_not_a_proper_crossing() {
        let shared = Point2::new(1.0, 1.0);
        assert!(!segments_cross_properly(
            &Point2::new(0.0, 0.0),
            &shared,
            &shared,
            &Point2::new(2.0, 0.0),
        ));
        assert!(segments_cross_properly(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        ));
    }
}
