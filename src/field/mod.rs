mod sample;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;
use crate::math::Point2;

/// Immutable grid of scalar samples with uniform spacing and an isovalue.
///
/// Samples are stored row-major: `samples[row * width + col]`. Grid
/// coordinate `(x, y)` maps to world coordinate `(x * spacing, y * spacing)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldDocument", into = "FieldDocument")]
pub struct ScalarField {
    width: usize,
    height: usize,
    spacing: f64,
    isovalue: f64,
    samples: Vec<f64>,
}

impl ScalarField {
    /// Creates a field after validating its shape and values.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if the grid is smaller than 2x2 or its node
    /// count overflows, the sample count does not match, the spacing is not
    /// positive, or any value is not finite.
    pub fn new(
        width: usize,
        height: usize,
        spacing: f64,
        isovalue: f64,
        samples: Vec<f64>,
    ) -> Result<Self, FormatError> {
        let expected = node_count(width, height)?;
        if samples.len() != expected {
            return Err(FormatError::SampleCountMismatch {
                expected,
                found: samples.len(),
            });
        }
        if !spacing.is_finite() || spacing <= 0.0 {
            return Err(FormatError::InvalidSpacing(spacing));
        }
        if !isovalue.is_finite() {
            return Err(FormatError::NonFiniteIsovalue);
        }
        if let Some(index) = samples.iter().position(|v| !v.is_finite()) {
            return Err(FormatError::NonFiniteSample { index });
        }
        Ok(Self {
            width,
            height,
            spacing,
            isovalue,
            samples,
        })
    }

    /// Builds a field by evaluating `f(x, y)` at every world-space sample position.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ScalarField::new`].
    #[allow(clippy::cast_precision_loss)]
    pub fn from_fn(
        width: usize,
        height: usize,
        spacing: f64,
        isovalue: f64,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Self, FormatError> {
        let mut samples = Vec::with_capacity(node_count(width, height)?);
        for row in 0..height {
            for col in 0..width {
                samples.push(f(col as f64 * spacing, row as f64 * spacing));
            }
        }
        Self::new(width, height, spacing, isovalue, samples)
    }

    /// Number of sample columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of sample rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance between neighbouring samples in world units.
    #[must_use]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// The level whose crossings are extracted.
    #[must_use]
    pub fn isovalue(&self) -> f64 {
        self.isovalue
    }

    /// Row-major sample values.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Sample at an integer grid node. Callers guarantee the indices are in range.
    #[must_use]
    pub fn value(&self, col: usize, row: usize) -> f64 {
        self.samples[row * self.width + col]
    }

    /// Returns a copy of this field with a different isovalue.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::NonFiniteIsovalue`] for a NaN or infinite level.
    pub fn with_isovalue(&self, isovalue: f64) -> Result<Self, FormatError> {
        if !isovalue.is_finite() {
            return Err(FormatError::NonFiniteIsovalue);
        }
        Ok(Self {
            isovalue,
            ..self.clone()
        })
    }

    /// World-space extent of the grid: `((width - 1) * spacing, (height - 1) * spacing)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn extent(&self) -> (f64, f64) {
        (
            (self.width - 1) as f64 * self.spacing,
            (self.height - 1) as f64 * self.spacing,
        )
    }

    /// Converts a world-space point to fractional grid coordinates.
    #[must_use]
    pub fn to_grid(&self, point: &Point2) -> (f64, f64) {
        (point.x / self.spacing, point.y / self.spacing)
    }

    /// Converts fractional grid coordinates to a world-space point.
    #[must_use]
    pub fn to_world(&self, x: f64, y: f64) -> Point2 {
        Point2::new(x * self.spacing, y * self.spacing)
    }
}

/// Number of grid nodes, checked for the minimum size and for overflow.
fn node_count(width: usize, height: usize) -> Result<usize, FormatError> {
    if width < 2 || height < 2 {
        return Err(FormatError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(FormatError::InvalidDimensions { width, height })
}

/// Serialized shape of a [`ScalarField`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FieldDocument {
    width: usize,
    height: usize,
    spacing: f64,
    isovalue: f64,
    samples: Vec<f64>,
}

impl TryFrom<FieldDocument> for ScalarField {
    type Error = FormatError;

    fn try_from(doc: FieldDocument) -> Result<Self, Self::Error> {
        Self::new(doc.width, doc.height, doc.spacing, doc.isovalue, doc.samples)
    }
}

impl From<ScalarField> for FieldDocument {
    fn from(field: ScalarField) -> Self {
        Self {
            width: field.width,
            height: field.height,
            spacing: field.spacing,
            isovalue: field.isovalue,
            samples: field.samples,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_too_small_grid() {
        let err = ScalarField::new(1, 3, 1.0, 0.0, vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidDimensions {
                width: 1,
                height: 3
            }
        ));
    }

    #[test]
    fn rejects_overflowing_dimensions() {
        let width = usize::MAX / 2 + 1;
        assert!(matches!(
            ScalarField::new(width, 3, 1.0, 0.0, vec![0.0; 4]),
            Err(FormatError::InvalidDimensions { height: 3, .. })
        ));
        assert!(matches!(
            ScalarField::from_fn(width, 3, 1.0, 0.0, |_, _| 0.0),
            Err(FormatError::InvalidDimensions { height: 3, .. })
        ));
        let doc = r#"{"width":4294967296,"height":4294967297,"spacing":1.0,"isovalue":0.0,"samples":[0,0,0,0]}"#;
        assert!(serde_json::from_str::<ScalarField>(doc).is_err());
    }

    #[test]
    fn rejects_sample_count_mismatch() {
        let err = ScalarField::new(2, 2, 1.0, 0.0, vec![0.0; 3]).unwrap_err();
        assert!(matches!(
            err,
            FormatError::SampleCountMismatch {
                expected: 4,
                found: 3
            }
        ));
    }

    #[test]
    fn rejects_bad_spacing_and_values() {
        assert!(matches!(
            ScalarField::new(2, 2, 0.0, 0.0, vec![0.0; 4]),
            Err(FormatError::InvalidSpacing(_))
        ));
        assert!(matches!(
            ScalarField::new(2, 2, 1.0, f64::NAN, vec![0.0; 4]),
            Err(FormatError::NonFiniteIsovalue)
        ));
        assert!(matches!(
            ScalarField::new(2, 2, 1.0, 0.0, vec![0.0, 0.0, f64::INFINITY, 0.0]),
            Err(FormatError::NonFiniteSample { index: 2 })
        ));
    }

    #[test]
    fn from_fn_is_row_major() {
        let field = ScalarField::from_fn(3, 2, 0.5, 0.0, |x, y| x + 10.0 * y).unwrap();
        assert!((field.value(2, 0) - 1.0).abs() < 1e-12);
        assert!((field.value(0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(field.samples().len(), 6);
        let (w, h) = field.extent();
        assert!((w - 1.0).abs() < 1e-12);
        assert!((h - 0.5).abs() < 1e-12);
    }

    #[test]
    fn grid_world_conversion() {
        let field = ScalarField::from_fn(4, 4, 0.25, 0.0, |_, _| 0.0).unwrap();
        let p = field.to_world(2.0, 3.0);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert!((p.y - 0.75).abs() < 1e-12);
        let (x, y) = field.to_grid(&p);
        assert!((x - 2.0).abs() < 1e-12);
        assert!((y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn deserialization_validates() {
        let bad = r#"{"width":2,"height":2,"spacing":1.0,"isovalue":0.0,"samples":[1.0]}"#;
        assert!(serde_json::from_str::<ScalarField>(bad).is_err());
        let good = r#"{"width":2,"height":2,"spacing":1.0,"isovalue":0.5,"samples":[0,1,1,0]}"#;
        let field: ScalarField = serde_json::from_str(good).unwrap();
        assert!((field.isovalue() - 0.5).abs() < 1e-12);
    }
}
