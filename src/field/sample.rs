use crate::error::OutOfRangeError;
use crate::math::{Point2, Vector2};

use super::ScalarField;

/// Slack allowed past the last grid node before a query counts as out of range.
const EDGE_SLACK: f64 = 1e-9;

impl ScalarField {
    /// Bilinearly interpolated value at fractional grid coordinates `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] when `(x, y)` lies outside
    /// `[0, width - 1] x [0, height - 1]` or is not finite.
    pub fn sample(&self, x: f64, y: f64) -> Result<f64, OutOfRangeError> {
        let cell = self.locate(x, y)?;
        let [v00, v10, v01, v11] = cell.corners;
        let (fx, fy) = (cell.fx, cell.fy);
        Ok((1.0 - fx) * (1.0 - fy) * v00
            + fx * (1.0 - fy) * v10
            + (1.0 - fx) * fy * v01
            + fx * fy * v11)
    }

    /// Gradient of the bilinear interpolant at fractional grid coordinates,
    /// expressed per world unit.
    ///
    /// On a shared cell edge the cell with the lower index is used, except at
    /// the last row/column where the final cell is used.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ScalarField::sample`].
    pub fn gradient(&self, x: f64, y: f64) -> Result<Vector2, OutOfRangeError> {
        let cell = self.locate(x, y)?;
        let [v00, v10, v01, v11] = cell.corners;
        let (fx, fy) = (cell.fx, cell.fy);
        let dx = (1.0 - fy) * (v10 - v00) + fy * (v11 - v01);
        let dy = (1.0 - fx) * (v01 - v00) + fx * (v11 - v10);
        Ok(Vector2::new(dx, dy) / self.spacing)
    }

    /// Value at a world-space point.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ScalarField::sample`].
    pub fn sample_at(&self, point: &Point2) -> Result<f64, OutOfRangeError> {
        let (x, y) = self.to_grid(point);
        self.sample(x, y)
    }

    /// Gradient at a world-space point.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ScalarField::sample`].
    pub fn gradient_at(&self, point: &Point2) -> Result<Vector2, OutOfRangeError> {
        let (x, y) = self.to_grid(point);
        self.gradient(x, y)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn locate(&self, x: f64, y: f64) -> Result<CellQuery, OutOfRangeError> {
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let inside = x.is_finite()
            && y.is_finite()
            && x >= -EDGE_SLACK
            && y >= -EDGE_SLACK
            && x <= max_x + EDGE_SLACK
            && y <= max_y + EDGE_SLACK;
        if !inside {
            return Err(OutOfRangeError {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }

        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let col = (x.floor() as usize).min(self.width - 2);
        let row = (y.floor() as usize).min(self.height - 2);

        Ok(CellQuery {
            corners: [
                self.value(col, row),
                self.value(col + 1, row),
                self.value(col, row + 1),
                self.value(col + 1, row + 1),
            ],
            fx: x - col as f64,
            fy: y - row as f64,
        })
    }
}

/// Corner values `[v00, v10, v01, v11]` and local offsets of one query.
struct CellQuery {
    corners: [f64; 4],
    fx: f64,
    fy: f64,
}
