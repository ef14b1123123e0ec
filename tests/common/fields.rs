//! Synthetic scalar fields. All use isovalue 0 with higher values inside the
//! shapes they describe.

use isoloop::ScalarField;

/// Paraboloid cap `r^2 - d^2` centred at `(cx, cy)`.
pub fn bump_value(x: f64, y: f64, cx: f64, cy: f64, r: f64) -> f64 {
    r * r - ((x - cx).powi(2) + (y - cy).powi(2))
}

/// Square grid of `n x n` samples with a single bump.
pub fn single_bump(n: usize, spacing: f64, cx: f64, cy: f64, r: f64) -> ScalarField {
    ScalarField::from_fn(n, n, spacing, 0.0, |x, y| bump_value(x, y, cx, cy, r)).unwrap()
}

/// Several disjoint bumps, combined by their maximum.
pub fn bumps(width: usize, height: usize, spacing: f64, centres: &[(f64, f64, f64)]) -> ScalarField {
    ScalarField::from_fn(width, height, spacing, 0.0, |x, y| {
        centres
            .iter()
            .map(|&(cx, cy, r)| bump_value(x, y, cx, cy, r))
            .fold(f64::NEG_INFINITY, f64::max)
    })
    .unwrap()
}

/// Annulus between radii `inner` and `outer`: one outer loop around one hole.
pub fn ring(n: usize, spacing: f64, cx: f64, cy: f64, inner: f64, outer: f64) -> ScalarField {
    ScalarField::from_fn(n, n, spacing, 0.0, |x, y| {
        let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
        (d - inner).min(outer - d)
    })
    .unwrap()
}

/// Linear ramp along `x`, crossing zero at `x = at`.
pub fn ramp(width: usize, height: usize, spacing: f64, at: f64) -> ScalarField {
    ScalarField::from_fn(width, height, spacing, 0.0, |x, _| x - at).unwrap()
}

/// Constant field below the isovalue.
pub fn flat(n: usize) -> ScalarField {
    ScalarField::from_fn(n, n, 1.0, 1.0, |_, _| 0.0).unwrap()
}
