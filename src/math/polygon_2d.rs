use std::f64::consts::TAU;

use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Total length of a polyline, including the closing segment when `closed`.
#[must_use]
pub fn polyline_length(points: &[Point2], closed: bool) -> f64 {
    let mut length: f64 = points.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if closed && points.len() > 1 {
        length += (points[0] - points[points.len() - 1]).norm();
    }
    length
}

/// Computes the normalized direction from point `a` to point `b`.
///
/// Returns `None` for a zero-length segment.
#[must_use]
pub fn segment_direction(a: &Point2, b: &Point2) -> Option<Vector2> {
    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return None;
    }
    Some(d / len)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// Counter-clockwise angle swept from `from` to `to`, in `[0, 2π)`.
#[must_use]
pub fn ccw_angle(from: &Vector2, to: &Vector2) -> f64 {
    let cross = from.x * to.y - from.y * to.x;
    let dot = from.dot(to);
    let angle = cross.atan2(dot);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}
