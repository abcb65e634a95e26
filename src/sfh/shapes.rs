//! Per-shape SFR evaluation on the fine age grid.
//!
//! Each shape produces a raw, unnormalized SFR curve; normalization to the
//! requested formed mass happens in the engine. Shapes parameterized by
//! stellar age (burst, constant, exponential, delayed, const_exp) are
//! evaluated directly against the grid ages; shapes parameterized over
//! cosmic time (lognormal, dblplaw) are evaluated in time since the big
//! bang, `t = age_of_universe - age`, and vanish for ages older than the
//! universe.

use crate::algo::interp::interp_or_zero;
use crate::algo::root::SolveError;
use crate::config::{LognormalParams, Shape, TableSource};
use crate::cosmology::YR_PER_GYR;
use crate::grids::AgeGrid;
use crate::table::TableError;
use thiserror::Error;

use super::lognormal;

#[derive(Error, Debug)]
pub(crate) enum ShapeError {
    #[error("{0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Inversion(#[from] SolveError),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Raw SFR of one shape on the fine age grid, plus whether the shape
/// itself places star formation before the big bang.
pub(crate) struct ShapeEval {
    pub sfr: Vec<f64>,
    pub unphysical: bool,
}

impl ShapeEval {
    fn physical(sfr: Vec<f64>) -> Self {
        ShapeEval {
            sfr,
            unphysical: false,
        }
    }
}

/// Evaluate `shape` on `grid`. Ages and timescales in the shape are Gyr;
/// `age_of_universe` and the grid are in years.
pub(crate) fn evaluate(
    shape: &Shape,
    grid: &AgeGrid,
    age_of_universe: f64,
) -> Result<ShapeEval, ShapeError> {
    validate(shape)?;
    match *shape {
        Shape::Burst { age } => Ok(burst(grid, age_of_universe, age)),
        Shape::Constant { age_min, age_max } => Ok(constant(grid, age_min, age_max)),
        Shape::Exponential { age, tau } => Ok(exponential(grid, age, tau)),
        Shape::Delayed { age, tau } => Ok(delayed(grid, age, tau)),
        Shape::ConstExp { age, tau } => Ok(const_exp(grid, age_of_universe, age, tau)),
        Shape::Lognormal { params } => lognormal_shape(grid, age_of_universe, params),
        Shape::DblPlaw { tau, alpha, beta } => {
            Ok(dblplaw(grid, age_of_universe, tau, alpha, beta))
        }
        Shape::Custom { ref source } => custom(grid, age_of_universe, source),
    }
}

fn validate(shape: &Shape) -> Result<(), ShapeError> {
    let fail = |message: String| Err(ShapeError::InvalidParameter(message));
    match *shape {
        Shape::Burst { age } => {
            if !age.is_finite() || age < 0.0 {
                return fail(format!("age must be non-negative, got {age}"));
            }
        }
        Shape::Constant { age_min, age_max } => {
            if !age_min.is_finite() || age_min < 0.0 {
                return fail(format!("age_min must be non-negative, got {age_min}"));
            }
            if !age_max.is_finite() || age_max <= age_min {
                return fail(format!(
                    "age_max must exceed age_min, got {age_min}..{age_max}"
                ));
            }
        }
        Shape::Exponential { age, tau }
        | Shape::Delayed { age, tau }
        | Shape::ConstExp { age, tau } => {
            if !age.is_finite() || age <= 0.0 {
                return fail(format!("age must be positive, got {age}"));
            }
            if !tau.is_finite() || tau <= 0.0 {
                return fail(format!("tau must be positive, got {tau}"));
            }
        }
        Shape::Lognormal { params } => match params {
            LognormalParams::PeakFwhm { tmax, fwhm } => {
                if !tmax.is_finite() || tmax <= 0.0 {
                    return fail(format!("tmax must be positive, got {tmax}"));
                }
                if !fwhm.is_finite() || fwhm <= 0.0 {
                    return fail(format!("fwhm must be positive, got {fwhm}"));
                }
            }
            LognormalParams::Direct { tau, t0 } => {
                if !tau.is_finite() || tau <= 0.0 {
                    return fail(format!("tau must be positive, got {tau}"));
                }
                if !t0.is_finite() {
                    return fail(format!("t0 must be finite, got {t0}"));
                }
            }
        },
        Shape::DblPlaw { tau, alpha, beta } => {
            if !tau.is_finite() || tau <= 0.0 {
                return fail(format!("tau must be positive, got {tau}"));
            }
            if !alpha.is_finite() || !beta.is_finite() {
                return fail(format!(
                    "alpha and beta must be finite, got {alpha}, {beta}"
                ));
            }
        }
        Shape::Custom { .. } => {}
    }
    Ok(())
}

/// All mass in the single grid cell nearest the burst age.
fn burst(grid: &AgeGrid, age_of_universe: f64, age_gyr: f64) -> ShapeEval {
    let age = age_gyr * YR_PER_GYR;
    let mut sfr = vec![0.0; grid.len()];
    sfr[grid.nearest_index(age)] += 1.0;
    ShapeEval {
        sfr,
        unphysical: age > age_of_universe,
    }
}

/// Unit SFR strictly between the two ages.
fn constant(grid: &AgeGrid, age_min_gyr: f64, age_max_gyr: f64) -> ShapeEval {
    let age_min = age_min_gyr * YR_PER_GYR;
    let age_max = age_max_gyr * YR_PER_GYR;
    let sfr = grid
        .ages()
        .iter()
        .map(|&age| {
            if age > age_min && age < age_max {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    ShapeEval::physical(sfr)
}

/// Exponential decline switched on at `age`, so SFR rises toward the
/// present with e-folding time `tau`.
fn exponential(grid: &AgeGrid, age_gyr: f64, tau_gyr: f64) -> ShapeEval {
    let age = age_gyr * YR_PER_GYR;
    let tau = tau_gyr * YR_PER_GYR;
    let sfr = grid
        .ages()
        .iter()
        .map(|&grid_age| {
            if grid_age < age {
                ((grid_age - age) / tau).exp()
            } else {
                0.0
            }
        })
        .collect();
    ShapeEval::physical(sfr)
}

/// Delayed decline t e^(-t/tau) in time since onset, peaking one tau
/// after `age`.
fn delayed(grid: &AgeGrid, age_gyr: f64, tau_gyr: f64) -> ShapeEval {
    let age = age_gyr * YR_PER_GYR;
    let tau = tau_gyr * YR_PER_GYR;
    let sfr = grid
        .ages()
        .iter()
        .map(|&grid_age| {
            if grid_age < age {
                let t = age - grid_age;
                t * (-t / tau).exp()
            } else {
                0.0
            }
        })
        .collect();
    ShapeEval::physical(sfr)
}

/// Unit SFR from the big bang until `age`, exponential decline after.
fn const_exp(grid: &AgeGrid, age_of_universe: f64, age_gyr: f64, tau_gyr: f64) -> ShapeEval {
    let age = age_gyr * YR_PER_GYR;
    let tau = tau_gyr * YR_PER_GYR;
    let sfr = grid
        .ages()
        .iter()
        .map(|&grid_age| {
            if grid_age < age {
                ((grid_age - age) / tau).exp()
            } else if grid_age > age && grid_age < age_of_universe {
                1.0
            } else {
                0.0
            }
        })
        .collect();
    ShapeEval::physical(sfr)
}

/// Lognormal SFR in time since the big bang.
fn lognormal_shape(
    grid: &AgeGrid,
    age_of_universe: f64,
    params: LognormalParams,
) -> Result<ShapeEval, ShapeError> {
    let (tau, t0) = match params {
        LognormalParams::PeakFwhm { tmax, fwhm } => {
            lognormal::invert_peak_fwhm(tmax * YR_PER_GYR, fwhm * YR_PER_GYR)?
        }
        LognormalParams::Direct { tau, t0 } => (tau, t0),
    };

    let norm = 1.0 / (2.0 * std::f64::consts::PI * tau * tau).sqrt();
    let sfr = grid
        .ages()
        .iter()
        .map(|&age| {
            if age < age_of_universe {
                let t = age_of_universe - age;
                let offset = t.ln() - t0;
                (norm / t) * (-offset * offset / (2.0 * tau * tau)).exp()
            } else {
                0.0
            }
        })
        .collect();
    Ok(ShapeEval::physical(sfr))
}

/// Double power law in time since the big bang, rising as (t/tau)^beta
/// and falling as (t/tau)^-alpha around the turnover.
fn dblplaw(
    grid: &AgeGrid,
    age_of_universe: f64,
    tau_gyr: f64,
    alpha: f64,
    beta: f64,
) -> ShapeEval {
    let tau = tau_gyr * YR_PER_GYR;
    let sfr = grid
        .ages()
        .iter()
        .map(|&age| {
            if age < age_of_universe {
                let t = age_of_universe - age;
                1.0 / ((t / tau).powf(alpha) + (t / tau).powf(-beta))
            } else {
                0.0
            }
        })
        .collect();
    ShapeEval {
        sfr,
        // A turnover later than the age of the universe puts the SFR peak
        // before the big bang.
        unphysical: tau > age_of_universe,
    }
}

/// SFR interpolated from a tabulated history, zero outside the table's
/// age range and zero for ages older than the universe.
fn custom(
    grid: &AgeGrid,
    age_of_universe: f64,
    source: &TableSource,
) -> Result<ShapeEval, ShapeError> {
    let table = source.resolve()?;
    let sfr = grid
        .ages()
        .iter()
        .map(|&age| {
            if age > age_of_universe {
                0.0
            } else {
                interp_or_zero(age, table.ages(), table.sfrs())
            }
        })
        .collect();
    Ok(ShapeEval::physical(sfr))
}
