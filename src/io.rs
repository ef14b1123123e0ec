//! JSON documents for the field input and the contour and cycle artifacts.
//!
//! The field document is `{ width, height, spacing, isovalue, samples }` with
//! samples in row-major order. The contour artifact is an array of
//! `{ points, closed, orientation, isovalue }` records, the cycle artifact
//! `{ points, closed }`. Points are `[x, y]` pairs.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::contour::ContourSet;
use crate::error::FormatError;
use crate::field::ScalarField;
use crate::params::PipelineParams;
use crate::path::Cycle;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, FormatError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), FormatError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reads and validates a field document.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be read, is not valid JSON,
/// or describes an invalid grid.
pub fn read_field(path: impl AsRef<Path>) -> Result<ScalarField, FormatError> {
    read_json(path.as_ref())
}

/// Writes a field document.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be written.
pub fn write_field(path: impl AsRef<Path>, field: &ScalarField) -> Result<(), FormatError> {
    write_json(path.as_ref(), field)
}

/// Reads run parameters. Missing keys keep their defaults.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be read or parsed.
pub fn read_params(path: impl AsRef<Path>) -> Result<PipelineParams, FormatError> {
    read_json(path.as_ref())
}

/// Writes the contour artifact.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be written.
pub fn write_contours(path: impl AsRef<Path>, contours: &ContourSet) -> Result<(), FormatError> {
    write_json(path.as_ref(), contours)
}

/// Reads a contour artifact.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be read or parsed, or a
/// record's orientation contradicts its points.
pub fn read_contours(path: impl AsRef<Path>) -> Result<ContourSet, FormatError> {
    read_json(path.as_ref())
}

/// Writes the cycle artifact.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be written.
pub fn write_cycle(path: impl AsRef<Path>, cycle: &Cycle) -> Result<(), FormatError> {
    write_json(path.as_ref(), cycle)
}

/// Reads a cycle artifact.
///
/// # Errors
///
/// Returns a [`FormatError`] if the file cannot be read or parsed.
pub fn read_cycle(path: impl AsRef<Path>) -> Result<Cycle, FormatError> {
    read_json(path.as_ref())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::params::StitchStrategy;

    #[test]
    fn field_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.json");
        let field = ScalarField::from_fn(4, 3, 0.5, 1.0, |x, y| x * y).unwrap();
        write_field(&path, &field).unwrap();
        assert_eq!(read_field(&path).unwrap(), field);
    }

    #[test]
    fn malformed_field_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("field.json");
        std::fs::write(
            &path,
            r#"{"width":3,"height":2,"spacing":1.0,"isovalue":0.0,"samples":[1,2,3]}"#,
        )
        .unwrap();
        assert!(matches!(
            read_field(&path),
            Err(FormatError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_field(dir.path().join("absent.json")),
            Err(FormatError::Io(_))
        ));
    }

    #[test]
    fn params_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"stitch":{"strategy":"edge_swap"},"finalize":{"resample_spacing":0.5}}"#)
            .unwrap();
        let params = read_params(&path).unwrap();
        assert_eq!(params.stitch.strategy, StitchStrategy::EdgeSwap);
        assert_eq!(params.finalize.resample_spacing, Some(0.5));
    }
}
