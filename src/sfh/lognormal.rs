//! Lognormal parameter inversion.
//!
//! The lognormal shape is naturally parameterized by a scale τ and a
//! location t0, but configurations usually give the peak time and full
//! width at half maximum of the SFR curve instead. Recovering (τ, t0)
//! takes a 2x2 Newton-Raphson solve: the mode constraint is
//! exp(t0 - τ²) = tmax, and the half-maximum crossings sit at
//! exp(t0 - τ² ± kτ) with k = √(2 ln 2), fixing the width.

use crate::algo::root::{self, SolveError};
use nalgebra::{Matrix2, Vector2};

const INVERSION_TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 50;

/// Solve for the (τ, t0) pair whose lognormal SFR curve peaks at `tmax`
/// with full width at half maximum `fwhm`, both in years. The returned t0
/// is the natural log of the peak epoch in years.
pub(crate) fn invert_peak_fwhm(tmax: f64, fwhm: f64) -> Result<(f64, f64), SolveError> {
    let k = (2.0 * std::f64::consts::LN_2).sqrt();

    // With the mode pinned at tmax, the width equation alone reduces to
    // 2 sinh(kτ) = fwhm / tmax, closed form in τ. Newton then only has to
    // polish both equations to tolerance together, however wide the ratio
    // fwhm / tmax.
    let tau_seed = (fwhm / (2.0 * tmax)).asinh() / k;
    let seed = Vector2::new(tau_seed, tmax.ln() + tau_seed * tau_seed);

    let system = |p: &Vector2<f64>| {
        let (tau, t0) = (p.x, p.y);
        let mode = (t0 - tau * tau).exp();
        let width = tmax * ((k * tau).exp() - (-k * tau).exp());
        // Residuals divided by the targets make the tolerance a relative
        // error. Row scaling leaves the Newton iterates unchanged.
        let residual = Vector2::new((mode - tmax) / tmax, (width - fwhm) / fwhm);
        let jacobian = Matrix2::new(
            -2.0 * tau * mode / tmax,
            mode / tmax,
            tmax * k * ((k * tau).exp() + (-k * tau).exp()) / fwhm,
            0.0,
        );
        (residual, jacobian)
    };

    let solution = root::newton_raphson_2d(system, seed, INVERSION_TOLERANCE, MAX_ITERATIONS)?;
    Ok((solution.x, solution.y))
}
