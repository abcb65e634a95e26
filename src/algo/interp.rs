//! Linear interpolation over tabulated data.
//!
//! Two flavors are provided: [`interp`] validates its inputs and treats
//! queries outside the table as errors, while [`interp_or_zero`] returns 0
//! outside the table domain, matching the convention used for tabulated
//! star-formation histories (no extrapolation, just silence).

use thiserror::Error;

/// Errors that can occur during interpolation queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpError {
    #[error("value {0} is outside the interpolation range [{1}, {2}]")]
    OutOfBounds(f64, f64, f64),
    #[error("interpolation needs at least 2 points, got {0}")]
    InsufficientData(usize),
    #[error("x and y tables differ in length: {0} vs {1}")]
    MismatchedLengths(usize, usize),
    #[error("x values must be strictly ascending")]
    UnsortedData,
}

/// Linear interpolation with binary search over a strictly ascending table.
///
/// # Arguments
///
/// * `x` - The coordinate at which to interpolate
/// * `xs` - Table x-coordinates, strictly ascending
/// * `ys` - Table y-values, same length as `xs`
///
/// # Returns
///
/// * `Ok(f64)` - The interpolated value at `x`
/// * `Err(InterpError)` - If the tables are malformed or `x` lies outside them
pub fn interp(x: f64, xs: &[f64], ys: &[f64]) -> Result<f64, InterpError> {
    if xs.len() != ys.len() {
        return Err(InterpError::MismatchedLengths(xs.len(), ys.len()));
    }

    if xs.len() < 2 {
        return Err(InterpError::InsufficientData(xs.len()));
    }

    // Negated form so a NaN node also counts as unsorted.
    if xs.windows(2).any(|pair| !(pair[0] < pair[1])) {
        return Err(InterpError::UnsortedData);
    }

    let min_x = xs[0];
    let max_x = xs[xs.len() - 1];

    // NaN would sail through both comparisons and panic in the search.
    if x.is_nan() || x < min_x || x > max_x {
        return Err(InterpError::OutOfBounds(x, min_x, max_x));
    }

    Ok(segment_value(x, xs, ys))
}

/// Linear interpolation that evaluates to 0 outside the table domain.
///
/// The table must already be strictly ascending; the tables this is used
/// with are validated where they are built, so only a debug assertion
/// guards it here. A single-point table evaluates to its y-value at its
/// one x and 0 everywhere else.
pub fn interp_or_zero(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(xs.windows(2).all(|pair| pair[0] < pair[1]));

    if xs.is_empty() || x.is_nan() || x < xs[0] || x > xs[xs.len() - 1] {
        return 0.0;
    }
    if xs.len() == 1 {
        return ys[0];
    }
    segment_value(x, xs, ys)
}

/// Interpolate within a table already known to be ascending and to bracket `x`.
fn segment_value(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    let idx = match xs.binary_search_by(|probe| probe.partial_cmp(&x).unwrap()) {
        Ok(exact_idx) => return ys[exact_idx],
        Err(insert_idx) => insert_idx,
    };

    let x1 = xs[idx - 1];
    let x2 = xs[idx];
    let y1 = ys[idx - 1];
    let y2 = ys[idx];

    let t = (x - x1) / (x2 - x1);
    y1 + t * (y2 - y1)
}
