//! Age sampling for star-formation histories.
//!
//! Every SFH shape is evaluated on one shared grid of stellar ages, spaced
//! uniformly in log10(age) from 1 Myr to slightly past the Hubble time. The
//! grid deliberately overshoots the Hubble time by two log-steps so the
//! neighbourhood of the age of the universe stays representable at any
//! modelled redshift. Bin edges sit at the log-space midpoints between
//! samples, with the first edge dropped to age zero (the bin of the
//! youngest sample absorbs all of recent time) and the last edge pinned to
//! the padded ceiling above the Hubble time, so the bins tile [0, Hubble
//! time] and beyond without gaps.

/// Default log10 spacing of the fine age grid, in dex.
pub const DEFAULT_LOG_SAMPLING: f64 = 0.0025;

/// log10 of the youngest tabulated age in years.
const LOG_AGE_MIN: f64 = 6.0;

/// Years per gigayear.
const YR_PER_GYR: f64 = 1e9;

/// Bin edges for a sequence of sample positions.
///
/// Edges sit halfway between consecutive samples, with the two outer edges
/// extrapolated at the same half-step. Samples spaced uniformly in log-space
/// should be passed as log values so the midpoints land geometrically
/// between the ages. Output length is `samples.len() + 1`.
///
/// # Panics
///
/// If fewer than two samples are given.
pub fn make_bins(samples: &[f64]) -> Vec<f64> {
    assert!(samples.len() >= 2, "bin edges need at least two samples");

    let mut edges = Vec::with_capacity(samples.len() + 1);
    edges.push(samples[0] - 0.5 * (samples[1] - samples[0]));
    for pair in samples.windows(2) {
        edges.push(0.5 * (pair[0] + pair[1]));
    }
    let last = samples.len() - 1;
    edges.push(samples[last] + 0.5 * (samples[last] - samples[last - 1]));
    edges
}

/// Fine logarithmic age grid shared by every SFH shape.
#[derive(Debug, Clone)]
pub struct AgeGrid {
    ages: Vec<f64>,
    edges: Vec<f64>,
    widths: Vec<f64>,
    hubble_time: f64,
    log_sampling: f64,
}

impl AgeGrid {
    /// Build the grid for a given Hubble time.
    ///
    /// # Arguments
    /// * `hubble_time_gyr` - Age of the universe at redshift zero, in Gyr
    /// * `log_sampling` - Grid spacing in dex (0.0025 by default elsewhere)
    ///
    /// # Panics
    /// If either argument is not positive and finite.
    pub fn new(hubble_time_gyr: f64, log_sampling: f64) -> Self {
        assert!(
            hubble_time_gyr.is_finite() && hubble_time_gyr > 0.0,
            "Hubble time must be positive, got {hubble_time_gyr}"
        );
        assert!(
            log_sampling.is_finite() && log_sampling > 0.0,
            "log sampling must be positive, got {log_sampling}"
        );

        let hubble_yr = hubble_time_gyr * YR_PER_GYR;
        let log_ceiling = hubble_yr.log10() + 2.0 * log_sampling;

        let mut log_ages = Vec::new();
        let mut step = 0usize;
        loop {
            let log_age = LOG_AGE_MIN + step as f64 * log_sampling;
            if log_age >= log_ceiling {
                break;
            }
            log_ages.push(log_age);
            step += 1;
        }

        let ages: Vec<f64> = log_ages.iter().map(|&l| 10f64.powf(l)).collect();
        let mut edges: Vec<f64> = make_bins(&log_ages)
            .iter()
            .map(|&l| 10f64.powf(l))
            .collect();
        edges[0] = 0.0;
        let last = edges.len() - 1;
        edges[last] = hubble_yr * 10f64.powf(2.0 * log_sampling);

        let widths = edges.windows(2).map(|pair| pair[1] - pair[0]).collect();

        Self {
            ages,
            edges,
            widths,
            hubble_time: hubble_yr,
            log_sampling,
        }
    }

    /// Number of age samples.
    pub fn len(&self) -> usize {
        self.ages.len()
    }

    /// True when the grid holds no samples (never the case for valid inputs).
    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    /// Age samples in years, ascending.
    pub fn ages(&self) -> &[f64] {
        &self.ages
    }

    /// Bin edges in years; `len() + 1` entries starting at 0.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Bin widths in years, aligned with `ages`.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Hubble time in years.
    pub fn hubble_time(&self) -> f64 {
        self.hubble_time
    }

    /// Grid spacing in dex.
    pub fn log_sampling(&self) -> f64 {
        self.log_sampling
    }

    /// Index of the grid age closest to `age_yr`; ties go to the younger age.
    pub fn nearest_index(&self, age_yr: f64) -> usize {
        let idx = self.ages.partition_point(|&age| age < age_yr);
        if idx == 0 {
            return 0;
        }
        if idx == self.ages.len() {
            return self.ages.len() - 1;
        }
        if age_yr - self.ages[idx - 1] <= self.ages[idx] - age_yr {
            idx - 1
        } else {
            idx
        }
    }
}
