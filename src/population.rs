//! Stellar population grid axes and survival tables.
//!
//! The SFH engine rebins its fine-grained star formation onto the coarser
//! age axis of a stellar population model, and weights each (metallicity,
//! age) cell by the fraction of formed mass still locked in living stars.
//! This module holds those axes and the survival table, validated once at
//! construction so the hot path can index without checking.

use crate::grids::make_bins;
use ndarray::Array2;
use once_cell::sync::Lazy;
use thiserror::Error;

/// Errors raised while validating population grid tables.
#[derive(Error, Debug)]
pub enum GridError {
    #[error("{axis} axis must be strictly ascending")]
    NotAscending { axis: &'static str },
    #[error("{axis} axis needs at least {min} entries, got {got}")]
    TooFew {
        axis: &'static str,
        min: usize,
        got: usize,
    },
    #[error(
        "live fraction table is {rows}x{cols} but axes imply \
         {metallicities}x{ages}"
    )]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        metallicities: usize,
        ages: usize,
    },
    #[error("live fraction at ({row}, {col}) is {value}, outside [0, 1]")]
    LiveFracOutOfRange { row: usize, col: usize, value: f64 },
    #[error("{axis} axis entries must be positive and finite, got {value}")]
    NonPositive { axis: &'static str, value: f64 },
}

/// Age and metallicity axes of a stellar population model, plus the
/// fraction of formed mass surviving as living stars in each cell.
#[derive(Debug, Clone)]
pub struct PopulationGrids {
    ages: Vec<f64>,
    age_edges: Vec<f64>,
    metallicities: Vec<f64>,
    live_frac: Array2<f64>,
}

impl PopulationGrids {
    /// Build grids from model tables.
    ///
    /// # Arguments
    ///
    /// * `ages` - Population age axis in years, strictly ascending.
    /// * `metallicities` - Metallicity axis in Z☉, strictly ascending.
    /// * `live_frac` - Surviving mass fraction per (metallicity, age) cell,
    ///   each entry in `[0, 1]`.
    pub fn from_tables(
        ages: Vec<f64>,
        metallicities: Vec<f64>,
        live_frac: Array2<f64>,
    ) -> Result<Self, GridError> {
        if ages.len() < 2 {
            return Err(GridError::TooFew {
                axis: "age",
                min: 2,
                got: ages.len(),
            });
        }
        if metallicities.is_empty() {
            return Err(GridError::TooFew {
                axis: "metallicity",
                min: 1,
                got: 0,
            });
        }
        validate_axis("age", &ages)?;
        validate_axis("metallicity", &metallicities)?;

        let (rows, cols) = live_frac.dim();
        if rows != metallicities.len() || cols != ages.len() {
            return Err(GridError::DimensionMismatch {
                rows,
                cols,
                metallicities: metallicities.len(),
                ages: ages.len(),
            });
        }
        for ((row, col), &value) in live_frac.indexed_iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(GridError::LiveFracOutOfRange { row, col, value });
            }
        }

        // Bin edges sit at logarithmic midpoints between the age samples,
        // with the low edge pulled down to zero so formation at the present
        // instant still lands in the first bin.
        let log_ages: Vec<f64> = ages.iter().map(|age| age.log10()).collect();
        let mut age_edges: Vec<f64> = make_bins(&log_ages)
            .into_iter()
            .map(|edge| 10f64.powf(edge))
            .collect();
        age_edges[0] = 0.0;

        Ok(PopulationGrids {
            ages,
            age_edges,
            metallicities,
            live_frac,
        })
    }

    /// Population age axis in years.
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Age bin edges in years, one more than `ages`. Mass formed outside
    /// the outermost edges is dropped during rebinning.
    pub fn age_edges(&self) -> &[f64] {
        &self.age_edges
    }

    /// Metallicity axis in Z☉.
    pub fn metallicities(&self) -> &[f64] {
        &self.metallicities
    }

    /// Surviving mass fraction, indexed `(metallicity, age)`.
    pub fn live_frac(&self) -> &Array2<f64> {
        &self.live_frac
    }

    pub fn n_ages(&self) -> usize {
        self.ages.len()
    }

    pub fn n_metallicities(&self) -> usize {
        self.metallicities.len()
    }
}

fn validate_axis(axis: &'static str, values: &[f64]) -> Result<(), GridError> {
    for &value in values {
        if !value.is_finite() || value <= 0.0 {
            return Err(GridError::NonPositive { axis, value });
        }
    }
    if values.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(GridError::NotAscending { axis });
    }
    Ok(())
}

/// Demonstration grids spanning 1 Myr to ~17.8 Gyr in 0.1 dex steps, with
/// six metallicity points and a survival table from the fitting formula of
/// Behroozi, Wechsler & Conroy (2013), eq. 13.
pub static DEMO_GRIDS: Lazy<PopulationGrids> = Lazy::new(|| {
    let ages: Vec<f64> = (0..=42).map(|i| 10f64.powf(6.0 + 0.1 * i as f64)).collect();
    let metallicities = vec![0.005, 0.02, 0.2, 0.4, 1.0, 2.5];
    let live_frac = Array2::from_shape_fn((metallicities.len(), ages.len()), |(_, col)| {
        behroozi_live_frac(ages[col])
    });
    PopulationGrids::from_tables(ages, metallicities, live_frac)
        .expect("demonstration grids are statically valid")
});

/// Fraction of formed mass still in living stars after `age_yr` years,
/// independent of metallicity.
fn behroozi_live_frac(age_yr: f64) -> f64 {
    (1.0 - 0.05 * (1.0 + age_yr / 1.4e6).ln()).clamp(0.0, 1.0)
}
