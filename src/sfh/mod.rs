//! Star formation history engine.
//!
//! [`StarFormationHistory`] evaluates each configured component on a fine
//! logarithmic age grid, scales it to the requested formed mass, sums the
//! components, and rebins formed mass onto the population age axis with
//! enrichment and survival weights applied. Derived quantities (living
//! mass, recent SFR, mass-weighted age) come out of the same pass.

mod lognormal;
mod shapes;

use crate::algo::histogram::weighted_histogram;
use crate::algo::root::SolveError;
use crate::config::{ComponentId, ModelConfig};
use crate::cosmology::{CosmologyError, YR_PER_GYR};
use crate::enrichment::{DeltaEnrichment, EnrichmentError, EnrichmentProvider};
use crate::grids::{AgeGrid, DEFAULT_LOG_SAMPLING};
use crate::table::TableError;
use crate::ModelEnvironment;
use ndarray::Array2;
use std::sync::Arc;
use thiserror::Error;

/// Averaging window for the recent star formation rate, in years.
const RECENT_SFR_WINDOW: f64 = 1e8;

/// Errors raised while evaluating a model configuration.
#[derive(Error, Debug)]
pub enum SfhError {
    #[error("component {component}: {reason}")]
    InvalidComponent {
        component: ComponentId,
        reason: String,
    },
    #[error("component {component}: lognormal inversion failed: {source}")]
    Inversion {
        component: ComponentId,
        #[source]
        source: SolveError,
    },
    #[error("component {component}: custom table: {source}")]
    Table {
        component: ComponentId,
        #[source]
        source: TableError,
    },
    #[error("component {component} has no star formation inside the age grid")]
    EmptySupport { component: ComponentId },
    #[error(transparent)]
    Cosmology(#[from] CosmologyError),
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
}

impl SfhError {
    fn from_shape(component: ComponentId, error: shapes::ShapeError) -> Self {
        match error {
            shapes::ShapeError::InvalidParameter(reason) => {
                SfhError::InvalidComponent { component, reason }
            }
            shapes::ShapeError::Inversion(source) => SfhError::Inversion { component, source },
            shapes::ShapeError::Table(source) => SfhError::Table { component, source },
        }
    }
}

/// Formed and living stellar mass, in solar masses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassRecord {
    /// Total mass formed over the history.
    pub formed: f64,
    /// Mass still in living stars at the epoch of observation.
    pub living: f64,
}

/// Evaluated state of one component after an update.
#[derive(Debug, Clone)]
pub struct ComponentState {
    id: ComponentId,
    sfr: Vec<f64>,
    weights: Vec<f64>,
    mass: MassRecord,
}

impl ComponentState {
    pub fn id(&self) -> ComponentId {
        self.id
    }

    /// Normalized SFR on the fine age grid, in M☉/yr.
    pub fn sfr(&self) -> &[f64] {
        &self.sfr
    }

    /// Formed mass per coarse population age bin, in M☉.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn mass(&self) -> MassRecord {
        self.mass
    }
}

/// Star formation history of a model galaxy.
///
/// Construction evaluates the configuration once; [`update`] re-evaluates
/// new parameters against the same grids, the hot path when a sampler
/// walks parameter space. A failed update leaves the previously computed
/// state in place.
///
/// [`update`]: StarFormationHistory::update
pub struct StarFormationHistory {
    env: Arc<ModelEnvironment>,
    provider: Box<dyn EnrichmentProvider + Send + Sync>,
    grid: AgeGrid,
    age_of_universe: f64,
    components: Vec<ComponentState>,
    sfr_total: Vec<f64>,
    weights_total: Vec<f64>,
    mass_total: MassRecord,
    unphysical: bool,
    sfr_100myr: f64,
    mass_weighted_age: f64,
}

impl StarFormationHistory {
    /// Build with the default enrichment provider and fine-grid sampling.
    pub fn new(env: Arc<ModelEnvironment>, config: &ModelConfig) -> Result<Self, SfhError> {
        StarFormationHistory::with_options(
            env,
            Box::new(DeltaEnrichment),
            DEFAULT_LOG_SAMPLING,
            config,
        )
    }

    /// Build with an explicit enrichment provider and fine-grid log
    /// sampling interval in dex.
    pub fn with_options(
        env: Arc<ModelEnvironment>,
        provider: Box<dyn EnrichmentProvider + Send + Sync>,
        log_sampling: f64,
        config: &ModelConfig,
    ) -> Result<Self, SfhError> {
        let grid = AgeGrid::new(env.cosmology().hubble_time(), log_sampling);
        let mut sfh = StarFormationHistory {
            env,
            provider,
            grid,
            age_of_universe: 0.0,
            components: Vec::new(),
            sfr_total: Vec::new(),
            weights_total: Vec::new(),
            mass_total: MassRecord::default(),
            unphysical: false,
            sfr_100myr: 0.0,
            mass_weighted_age: 0.0,
        };
        sfh.update(config)?;
        Ok(sfh)
    }

    /// Re-evaluate against a new configuration.
    pub fn update(&mut self, config: &ModelConfig) -> Result<(), SfhError> {
        let age_of_universe = self.env.cosmology().age_at(config.redshift)? * YR_PER_GYR;
        let enrichment = self.provider.component_weights(self.env.grids(), config)?;
        let ids = config.component_ids();

        log::debug!(
            "updating SFH at z={} (age of universe {:.4} Gyr), {} component(s)",
            config.redshift,
            age_of_universe / YR_PER_GYR,
            config.components.len()
        );

        let ages = self.grid.ages();
        let widths = self.grid.widths();
        let coarse_edges = self.env.grids().age_edges();
        let live_frac = self.env.grids().live_frac();

        let mut components = Vec::with_capacity(config.components.len());
        let mut sfr_total = vec![0.0; self.grid.len()];
        let mut weights_total = vec![0.0; self.env.grids().n_ages()];
        let mut mass_total = MassRecord::default();
        let mut unphysical = false;

        for ((component, &id), zmet_weights) in
            config.components.iter().zip(&ids).zip(&enrichment)
        {
            if !component.massformed.is_finite() {
                return Err(SfhError::InvalidComponent {
                    component: id,
                    reason: format!("massformed must be finite, got {}", component.massformed),
                });
            }

            let eval = shapes::evaluate(&component.shape, &self.grid, age_of_universe)
                .map_err(|error| SfhError::from_shape(id, error))?;
            unphysical |= eval.unphysical;

            let mut sfr = eval.sfr;
            let integral: f64 = sfr.iter().zip(widths).map(|(s, w)| s * w).sum();
            if !integral.is_finite() || integral <= 0.0 {
                return Err(SfhError::EmptySupport { component: id });
            }

            let scale = 10f64.powf(component.massformed) / integral;
            for value in &mut sfr {
                *value *= scale;
            }
            for (total, value) in sfr_total.iter_mut().zip(&sfr) {
                *total += value;
            }

            let fine_mass: Vec<f64> = sfr.iter().zip(widths).map(|(s, w)| s * w).collect();
            let weights = weighted_histogram(ages, &fine_mass, coarse_edges);
            for (total, value) in weights_total.iter_mut().zip(&weights) {
                *total += value;
            }

            let mass = MassRecord {
                formed: 10f64.powf(component.massformed),
                living: living_mass(&weights, zmet_weights, live_frac),
            };
            mass_total.formed += mass.formed;
            mass_total.living += mass.living;

            log::debug!(
                "  {id}: formed {:.4e} M_sun, living {:.4e} M_sun",
                mass.formed,
                mass.living
            );

            components.push(ComponentState {
                id,
                sfr,
                weights,
                mass,
            });
        }

        if !unphysical {
            unphysical = ages
                .iter()
                .zip(&sfr_total)
                .any(|(&age, &sfr)| age > age_of_universe && sfr > 0.0);
        }
        if unphysical {
            log::warn!("model forms stars before the big bang");
        }

        let sfr_100myr = recent_sfr(&sfr_total, ages, widths);
        let mass_weighted_age = mass_weighted_age(&sfr_total, ages, widths);

        self.age_of_universe = age_of_universe;
        self.components = components;
        self.sfr_total = sfr_total;
        self.weights_total = weights_total;
        self.mass_total = mass_total;
        self.unphysical = unphysical;
        self.sfr_100myr = sfr_100myr;
        self.mass_weighted_age = mass_weighted_age;
        Ok(())
    }

    /// Fine age grid the components are evaluated on.
    pub fn age_grid(&self) -> &AgeGrid {
        &self.grid
    }

    pub fn environment(&self) -> &ModelEnvironment {
        &self.env
    }

    /// Age of the universe at the model redshift, in years.
    pub fn age_of_universe(&self) -> f64 {
        self.age_of_universe
    }

    /// True when any star formation happens before the big bang.
    pub fn unphysical(&self) -> bool {
        self.unphysical
    }

    pub fn components(&self) -> &[ComponentState] {
        &self.components
    }

    pub fn component(&self, id: ComponentId) -> Option<&ComponentState> {
        self.components.iter().find(|component| component.id == id)
    }

    /// Total SFR on the fine age grid, in M☉/yr.
    pub fn sfr_total(&self) -> &[f64] {
        &self.sfr_total
    }

    /// Total formed mass per coarse population age bin, in M☉.
    pub fn weights_total(&self) -> &[f64] {
        &self.weights_total
    }

    pub fn mass_total(&self) -> MassRecord {
        self.mass_total
    }

    /// Mean SFR over the last 100 Myr, in M☉/yr.
    pub fn sfr_100myr(&self) -> f64 {
        self.sfr_100myr
    }

    /// Mass-weighted mean stellar age, in years.
    pub fn mass_weighted_age(&self) -> f64 {
        self.mass_weighted_age
    }
}

/// Living mass is each age bin's formed mass times the metallicity-summed
/// product of enrichment weight and survival fraction for that bin.
fn living_mass(weights: &[f64], enrichment: &Array2<f64>, live_frac: &Array2<f64>) -> f64 {
    weights
        .iter()
        .enumerate()
        .map(|(age_bin, &formed)| {
            formed * enrichment.column(age_bin).dot(&live_frac.column(age_bin))
        })
        .sum()
}

/// Width-weighted mean SFR over the most recent window.
fn recent_sfr(sfr: &[f64], ages: &[f64], widths: &[f64]) -> f64 {
    let mut mass = 0.0;
    let mut time = 0.0;
    for ((&rate, &age), &width) in sfr.iter().zip(ages).zip(widths) {
        if age < RECENT_SFR_WINDOW {
            mass += rate * width;
            time += width;
        }
    }
    if time > 0.0 {
        mass / time
    } else {
        0.0
    }
}

/// First moment of formed mass in age.
fn mass_weighted_age(sfr: &[f64], ages: &[f64], widths: &[f64]) -> f64 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for ((&rate, &age), &width) in sfr.iter().zip(ages).zip(widths) {
        let mass = rate * width;
        weighted += mass * age;
        total += mass;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}
