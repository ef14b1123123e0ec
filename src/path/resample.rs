use crate::error::FormatError;
use crate::math::polygon_2d::polyline_length;
use crate::math::Point2;

/// Upper bound on the number of points a resampled loop may have.
pub const MAX_RESAMPLED_POINTS: usize = 1 << 24;

/// Resamples a closed polyline to points `spacing` apart along its length.
///
/// The first point is kept. The step is adjusted so the perimeter divides
/// evenly; at least three points are produced for a non-degenerate loop.
/// Degenerate loops are returned unchanged.
///
/// # Errors
///
/// Returns [`FormatError::InvalidResampleSpacing`] unless `spacing` is finite
/// and positive, and [`FormatError::ResampleTooFine`] when the loop would
/// need more than [`MAX_RESAMPLED_POINTS`] points.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn resample_closed(points: &[Point2], spacing: f64) -> Result<Vec<Point2>, FormatError> {
    if !spacing.is_finite() || spacing <= 0.0 {
        return Err(FormatError::InvalidResampleSpacing(spacing));
    }
    let perimeter = polyline_length(points, true);
    if points.len() < 2 || perimeter <= 0.0 {
        return Ok(points.to_vec());
    }
    let ratio = (perimeter / spacing).round();
    if !ratio.is_finite() || ratio > MAX_RESAMPLED_POINTS as f64 {
        return Err(FormatError::ResampleTooFine {
            spacing,
            length: perimeter,
            limit: MAX_RESAMPLED_POINTS,
        });
    }
    let count = (ratio as usize).max(3);
    let step = perimeter / count as f64;

    let n = points.len();
    let mut out = Vec::with_capacity(count);
    let mut segment = 0;
    let mut walked = 0.0;
    for k in 0..count {
        let target = step * k as f64;
        loop {
            let a = points[segment];
            let b = points[(segment + 1) % n];
            let len = (b - a).norm();
            if target <= walked + len || segment + 1 == n {
                let t = if len > 0.0 {
                    ((target - walked) / len).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                out.push(a + (b - a) * t);
                break;
            }
            walked += len;
            segment += 1;
        }
    }
    Ok(out)
}
