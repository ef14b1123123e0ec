use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::field::ScalarField;
use crate::math::polygon_2d::{left_normal, segment_direction};
use crate::math::Point2;
use crate::params::ExtractParams;

use super::cell::{row_segments, CellSegment};
use super::trace::{link_segments, merge_close_points, RawTrace};
use super::{Contour, ContourSet};

/// Extracts the isocontours of a field at its isovalue.
pub struct ExtractContours {
    params: ExtractParams,
}

impl ExtractContours {
    /// Creates a new `ExtractContours` operation.
    #[must_use]
    pub fn new(params: ExtractParams) -> Self {
        Self { params }
    }

    /// Executes the extraction.
    ///
    /// Every returned contour keeps higher field values on its left. A field
    /// without any crossing yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if gradient sampling leaves the grid, which indicates
    /// a contour point outside the field.
    pub fn execute(&self, field: &ScalarField) -> Result<ContourSet> {
        let segments = self.classify_cells(field);
        let traces = link_segments(&segments);
        let tolerance = self.params.tolerance_fraction * field.spacing();

        let mut contours = Vec::with_capacity(traces.len());
        let mut dropped = 0usize;
        for RawTrace { mut points, closed } in traces {
            merge_close_points(&mut points, closed, tolerance);
            let min_points = if closed {
                self.params.min_closed_points.max(3)
            } else {
                2
            };
            if points.len() < min_points {
                dropped += 1;
                continue;
            }
            orient_high_on_left(field, &mut points, closed)?;
            contours.push(Contour::new(points, closed, field.isovalue()));
        }

        if dropped > 0 {
            debug!(dropped, "dropped degenerate contours");
        }
        let open = contours.iter().filter(|c| !c.is_closed()).count();
        info!(
            segments = segments.len(),
            contours = contours.len(),
            open,
            isovalue = field.isovalue(),
            "extracted isocontours"
        );
        Ok(ContourSet::new(contours))
    }

    /// Classifies every cell, one row per task. Rows are concatenated in order.
    fn classify_cells(&self, field: &ScalarField) -> Vec<CellSegment> {
        let rows = field.height() - 1;
        let per_row = |row: usize| {
            let mut out = Vec::new();
            row_segments(field, row, &mut out);
            out
        };
        let buffers: Vec<Vec<CellSegment>> = if self.params.parallel {
            (0..rows).into_par_iter().map(per_row).collect()
        } else {
            (0..rows).map(per_row).collect()
        };
        buffers.into_iter().flatten().collect()
    }
}

/// Offset, in grid units, of the two gradient samples on either side of a segment.
const SIDE_OFFSET: f64 = 1e-6;

/// Reverses `points` when the field gradient near the start points to the
/// right of the walking direction.
///
/// The gradient is taken just left and just right of each segment midpoint.
/// A segment on a grid line between two cells that disagree (a ridge of
/// samples at the isovalue) says nothing about its contour and is skipped,
/// as are segments where the gradient is numerically parallel to the walk.
fn orient_high_on_left(field: &ScalarField, points: &mut [Point2], closed: bool) -> Result<()> {
    let n = points.len();
    let segment_count = if closed { n } else { n - 1 };
    for i in 0..segment_count {
        let a = points[i];
        let b = points[(i + 1) % n];
        let Some(dir) = segment_direction(&a, &b) else {
            continue;
        };
        let normal = left_normal(dir);
        let mid = Point2::from((a.coords + b.coords) * 0.5);
        let at_mid = field.gradient_at(&mid)?;
        let offset = normal * (SIDE_OFFSET * field.spacing());

        let (mut left, mut right) = (false, false);
        for point in [mid + offset, mid - offset] {
            let gradient = field.gradient_at(&point).unwrap_or(at_mid);
            let side = gradient.dot(&normal);
            if side.abs() <= 1e-12 * gradient.norm().max(f64::MIN_POSITIVE) {
                continue;
            }
            if side > 0.0 {
                left = true;
            } else {
                right = true;
            }
        }
        match (left, right) {
            (true, false) => return Ok(()),
            (false, true) => {
                points.reverse();
                return Ok(());
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::contour::Orientation;

    fn bump(width: usize, cx: f64, cy: f64, r: f64) -> ScalarField {
        ScalarField::from_fn(width, width, 1.0, 0.0, |x, y| {
            r * r - ((x - cx).powi(2) + (y - cy).powi(2))
        })
        .unwrap()
    }

    #[test]
    fn constant_field_has_no_contours() {
        let field = ScalarField::from_fn(8, 8, 1.0, 1.0, |_, _| 0.0).unwrap();
        let set = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn single_bump_gives_one_positive_loop() {
        let field = bump(16, 7.3, 7.6, 4.2);
        let set = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        assert_eq!(set.len(), 1);
        let c = &set.contours()[0];
        assert!(c.is_closed());
        assert_eq!(c.orientation(), Orientation::Positive);
        for p in c.points() {
            assert!(field.sample_at(p).unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn pit_gives_negative_loop() {
        let field = ScalarField::from_fn(16, 16, 1.0, 0.0, |x, y| {
            (x - 7.4).powi(2) + (y - 7.7).powi(2) - 16.0
        })
        .unwrap();
        let set = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.contours()[0].orientation(), Orientation::Negative);
    }

    #[test]
    fn ramp_gives_one_open_contour() {
        let field = ScalarField::from_fn(6, 5, 1.0, 2.5, |x, _| x).unwrap();
        let set = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        assert_eq!(set.len(), 1);
        let c = &set.contours()[0];
        assert!(!c.is_closed());
        assert_eq!(c.points().len(), 5);
        // Higher values (larger x) on the left means walking towards -y.
        assert!(c.points()[0].y > c.points()[c.points().len() - 1].y);
    }

    #[test]
    fn serial_and_parallel_agree() {
        let field = ScalarField::from_fn(24, 20, 0.5, 0.0, |x, y| {
            (x * 1.3).sin() * (y * 0.9).cos() - 0.1
        })
        .unwrap();
        let parallel = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        let serial = ExtractContours::new(ExtractParams {
            parallel: false,
            ..ExtractParams::default()
        })
        .execute(&field)
        .unwrap();
        assert_eq!(parallel, serial);
        assert!(!parallel.is_empty());
    }

    fn saddle(high: f64, low: f64, main_diagonal: bool) -> ScalarField {
        let (up, down) = if main_diagonal {
            ([(1, 1), (2, 2)], [(2, 1), (1, 2)])
        } else {
            ([(2, 1), (1, 2)], [(1, 1), (2, 2)])
        };
        let mut samples = vec![0.0; 16];
        for (col, row) in up {
            samples[row * 4 + col] = high;
        }
        for (col, row) in down {
            samples[row * 4 + col] = low;
        }
        ScalarField::new(4, 4, 1.0, 0.5, samples).unwrap()
    }

    #[test]
    fn saddle_centre_decides_connectivity() {
        let extract = ExtractContours::new(ExtractParams::default());
        for main_diagonal in [true, false] {
            // Centre mean 0.45: the two peaks stay apart.
            let apart = extract.execute(&saddle(0.9, 0.0, main_diagonal)).unwrap();
            assert_eq!(apart.len(), 2);
            for c in &apart {
                assert!(c.is_closed());
                assert_eq!(c.points().len(), 4);
                assert_eq!(c.orientation(), Orientation::Positive);
            }

            // Centre mean 0.6: one loop around both peaks.
            let joined = extract.execute(&saddle(0.9, 0.3, main_diagonal)).unwrap();
            assert_eq!(joined.len(), 1);
            let c = &joined.contours()[0];
            assert!(c.is_closed());
            assert_eq!(c.points().len(), 8);
            assert_eq!(c.orientation(), Orientation::Positive);
        }
    }

    #[test]
    fn ridge_at_the_isovalue_does_not_flip_a_contour() {
        // Two high regions meet along x = 1, where every sample equals the
        // isovalue. The left contour starts on that shared line.
        let field = ScalarField::new(
            4,
            3,
            1.0,
            1.0,
            vec![
                2.0, 1.0, 2.0, 0.0, //
                2.0, 1.0, 2.0, 0.0, //
                0.0, 0.0, 0.0, 0.0,
            ],
        )
        .unwrap();
        let set = ExtractContours::new(ExtractParams::default())
            .execute(&field)
            .unwrap();
        assert_eq!(set.len(), 2);

        let ends = |c: &Contour| (c.points()[0], c.points()[c.points().len() - 1]);
        let left = set
            .iter()
            .find(|c| c.points().iter().any(|p| p.x < 0.5))
            .unwrap();
        let (entry, exit) = ends(left);
        assert!((entry - Point2::new(1.0, 0.0)).norm() < 1e-12);
        assert!((exit - Point2::new(0.0, 1.5)).norm() < 1e-12);

        let right = set
            .iter()
            .find(|c| c.points().iter().any(|p| p.x > 2.0))
            .unwrap();
        let (entry, exit) = ends(right);
        assert!((entry - Point2::new(2.5, 0.0)).norm() < 1e-12);
        assert!((exit - Point2::new(1.0, 0.0)).norm() < 1e-12);
    }
}
