//! Redshift to age-of-universe lookup for flat ΛCDM cosmologies.
//!
//! The age of the universe at redshift z, ignoring the radiation era, has
//! the closed form
//!
//! ```text
//! t(z) = 2 / (3 H0 sqrt(ΩΛ)) · asinh( sqrt(ΩΛ/Ωm) · (1+z)^(-3/2) )
//! ```
//!
//! which is accurate to well under a percent below z ≈ 100. The table is
//! precomputed once on a uniform redshift grid and linearly interpolated
//! thereafter, so per-model queries stay cheap inside fitting loops.

use crate::algo::interp::interp;
use thiserror::Error;

/// Kilometres per megaparsec (IAU 2015 definition of the parsec).
pub const KM_PER_MPC: f64 = 3.085_677_581_491_367e19;
/// Seconds per Julian gigayear.
pub const SECONDS_PER_GYR: f64 = 3.155_76e16;
/// Years per gigayear.
pub const YR_PER_GYR: f64 = 1e9;

/// Redshift step of the precomputed table.
const REDSHIFT_STEP: f64 = 0.01;
/// Upper redshift bound (exclusive) of the precomputed table.
const REDSHIFT_MAX: f64 = 100.0;

/// Errors from building or querying a cosmology table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CosmologyError {
    #[error("redshift {0} is outside the tabulated range [0, {1}]")]
    RedshiftOutOfRange(f64, f64),
    #[error("cosmology table needs at least 2 samples, got {0}")]
    TooFewSamples(usize),
    #[error("cosmology table redshifts must be strictly ascending")]
    UnsortedRedshifts,
    #[error("cosmology table must start at redshift zero, got {0}")]
    MissingRedshiftZero(f64),
    #[error("cosmology table ages must be positive and finite, got {0}")]
    NonPositiveAge(f64),
    #[error("cosmology table lengths differ: {0} redshifts vs {1} ages")]
    MismatchedLengths(usize, usize),
}

/// Precomputed redshift → age-of-universe table.
#[derive(Debug, Clone)]
pub struct CosmologyTable {
    redshifts: Vec<f64>,
    ages_gyr: Vec<f64>,
}

impl CosmologyTable {
    /// Tabulate a flat ΛCDM cosmology over z in [0, 100) at Δz = 0.01.
    ///
    /// # Arguments
    /// * `hubble_constant` - H0 in km/s/Mpc
    /// * `omega_m` - Matter density parameter; ΩΛ is taken as 1 - Ωm
    ///
    /// # Panics
    /// If `hubble_constant` is not positive or `omega_m` is outside (0, 1).
    pub fn flat_lambda_cdm(hubble_constant: f64, omega_m: f64) -> Self {
        assert!(
            hubble_constant > 0.0,
            "Hubble constant must be positive, got {hubble_constant}"
        );
        assert!(
            omega_m > 0.0 && omega_m < 1.0,
            "matter density must lie in (0, 1), got {omega_m}"
        );

        let count = (REDSHIFT_MAX / REDSHIFT_STEP) as usize;
        let mut redshifts = Vec::with_capacity(count);
        let mut ages_gyr = Vec::with_capacity(count);
        for i in 0..count {
            let z = i as f64 * REDSHIFT_STEP;
            redshifts.push(z);
            ages_gyr.push(flat_lambda_cdm_age_gyr(hubble_constant, omega_m, z));
        }

        Self {
            redshifts,
            ages_gyr,
        }
    }

    /// Planck Collaboration XVI (2013) best-fit flat ΛCDM:
    /// H0 = 67.77 km/s/Mpc, Ωm = 0.30712.
    pub fn planck13() -> Self {
        Self::flat_lambda_cdm(67.77, 0.30712)
    }

    /// Build a table from caller-supplied (redshift, age) samples.
    ///
    /// Redshifts must be strictly ascending and start at zero so the Hubble
    /// time is defined; ages are in Gyr and must be positive and finite.
    pub fn from_samples(redshifts: Vec<f64>, ages_gyr: Vec<f64>) -> Result<Self, CosmologyError> {
        if redshifts.len() != ages_gyr.len() {
            return Err(CosmologyError::MismatchedLengths(
                redshifts.len(),
                ages_gyr.len(),
            ));
        }
        if redshifts.len() < 2 {
            return Err(CosmologyError::TooFewSamples(redshifts.len()));
        }
        if redshifts.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(CosmologyError::UnsortedRedshifts);
        }
        if redshifts[0] != 0.0 {
            return Err(CosmologyError::MissingRedshiftZero(redshifts[0]));
        }
        for &age in &ages_gyr {
            if !age.is_finite() || age <= 0.0 {
                return Err(CosmologyError::NonPositiveAge(age));
            }
        }

        Ok(Self {
            redshifts,
            ages_gyr,
        })
    }

    /// Age of the universe at `redshift`, in Gyr.
    pub fn age_at(&self, redshift: f64) -> Result<f64, CosmologyError> {
        // The table is validated at construction, so the only reachable
        // interpolation failure is an out-of-range query.
        let max = self.redshifts[self.redshifts.len() - 1];
        interp(redshift, &self.redshifts, &self.ages_gyr)
            .map_err(|_| CosmologyError::RedshiftOutOfRange(redshift, max))
    }

    /// Age of the universe at redshift zero, in Gyr.
    pub fn hubble_time(&self) -> f64 {
        self.ages_gyr[0]
    }

    /// Highest tabulated redshift.
    pub fn max_redshift(&self) -> f64 {
        self.redshifts[self.redshifts.len() - 1]
    }
}

/// Closed-form flat ΛCDM age at redshift z, in Gyr.
fn flat_lambda_cdm_age_gyr(hubble_constant: f64, omega_m: f64, redshift: f64) -> f64 {
    let omega_l = 1.0 - omega_m;
    // H0 converted from km/s/Mpc to 1/Gyr
    let hubble_per_gyr = hubble_constant * SECONDS_PER_GYR / KM_PER_MPC;
    let argument = (omega_l / omega_m).sqrt() * (1.0 + redshift).powf(-1.5);
    2.0 / (3.0 * hubble_per_gyr * omega_l.sqrt()) * argument.asinh()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_planck13_present_day_age() {
        let cosmology = CosmologyTable::planck13();
        assert_relative_eq!(cosmology.hubble_time(), 13.82, max_relative = 1e-3);
        assert_relative_eq!(
            cosmology.age_at(0.0).unwrap(),
            cosmology.hubble_time(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_age_at_unity_redshift() {
        let cosmology = CosmologyTable::planck13();
        // Planck 2013 parameters give t(z=1) = 5.88 Gyr
        assert_relative_eq!(cosmology.age_at(1.0).unwrap(), 5.88, max_relative = 1e-3);
    }

    #[test]
    fn test_age_decreases_with_redshift() {
        let cosmology = CosmologyTable::planck13();
        let mut previous = f64::INFINITY;
        for z in [0.0, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 99.0] {
            let age = cosmology.age_at(z).unwrap();
            assert!(age < previous, "age must fall with redshift (z={z})");
            previous = age;
        }
    }

    #[test]
    fn test_interpolated_between_table_rows() {
        let cosmology = CosmologyTable::planck13();
        let below = cosmology.age_at(0.42).unwrap();
        let above = cosmology.age_at(0.43).unwrap();
        let between = cosmology.age_at(0.425).unwrap();
        assert!(above < between && between < below);
        assert_relative_eq!(between, 0.5 * (below + above), max_relative = 1e-6);
    }

    #[test]
    fn test_out_of_range_redshift() {
        let cosmology = CosmologyTable::planck13();
        assert!(matches!(
            cosmology.age_at(150.0),
            Err(CosmologyError::RedshiftOutOfRange(_, _))
        ));
        assert!(matches!(
            cosmology.age_at(-0.1),
            Err(CosmologyError::RedshiftOutOfRange(_, _))
        ));
    }

    #[test]
    fn test_from_samples_validation() {
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.0, 1.0], vec![13.8]),
            Err(CosmologyError::MismatchedLengths(2, 1))
        ));
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.0], vec![13.8]),
            Err(CosmologyError::TooFewSamples(1))
        ));
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.0, 2.0, 1.0], vec![13.8, 6.0, 3.0]),
            Err(CosmologyError::UnsortedRedshifts)
        ));
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.5, 1.0], vec![9.0, 6.0]),
            Err(CosmologyError::MissingRedshiftZero(_))
        ));
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.0, 1.0], vec![f64::NAN, 5.9]),
            Err(CosmologyError::NonPositiveAge(_))
        ));
        assert!(matches!(
            CosmologyTable::from_samples(vec![0.0, 1.0], vec![13.8, 0.0]),
            Err(CosmologyError::NonPositiveAge(_))
        ));

        let table = CosmologyTable::from_samples(vec![0.0, 1.0], vec![13.8, 5.9]).unwrap();
        assert_relative_eq!(table.age_at(0.5).unwrap(), 9.85, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "matter density")]
    fn test_invalid_omega_panics() {
        CosmologyTable::flat_lambda_cdm(70.0, 1.5);
    }
}
