//! Chemical enrichment providers.
//!
//! An enrichment provider distributes each component's formed mass across
//! the metallicity axis of the population grids, one weight table per
//! component with one column per coarse age bin. Columns always sum to
//! one; the provider decides how that unit mass splits across metallicity,
//! possibly differently at different ages.

use crate::config::{ComponentId, ModelConfig};
use crate::population::PopulationGrids;
use ndarray::Array2;
use thiserror::Error;

/// Errors raised while computing enrichment weights.
#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("component {component}: metallicity {value} is not a positive finite number")]
    InvalidMetallicity { component: ComponentId, value: f64 },
}

/// Maps model metallicities onto the population metallicity axis.
pub trait EnrichmentProvider {
    /// Weight tables aligned with `config.components`, each of shape
    /// `(n_metallicities, n_ages)` with columns summing to one.
    fn component_weights(
        &self,
        grids: &PopulationGrids,
        config: &ModelConfig,
    ) -> Result<Vec<Array2<f64>>, EnrichmentError>;
}

/// Age-independent enrichment: all mass forms at the component's single
/// metallicity, split between the two bracketing grid points.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaEnrichment;

impl EnrichmentProvider for DeltaEnrichment {
    fn component_weights(
        &self,
        grids: &PopulationGrids,
        config: &ModelConfig,
    ) -> Result<Vec<Array2<f64>>, EnrichmentError> {
        let ids = config.component_ids();
        config
            .components
            .iter()
            .zip(&ids)
            .map(|(component, &id)| {
                let zmet = component.metallicity;
                if !zmet.is_finite() || zmet <= 0.0 {
                    return Err(EnrichmentError::InvalidMetallicity {
                        component: id,
                        value: zmet,
                    });
                }
                let weights = delta_weights(grids.metallicities(), zmet);
                Ok(Array2::from_shape_fn(
                    (grids.n_metallicities(), grids.n_ages()),
                    |(row, _)| weights[row],
                ))
            })
            .collect()
    }
}

/// Split unit mass between the two grid points bracketing `zmet`, clamping
/// to the nearest end outside the grid range.
fn delta_weights(grid: &[f64], zmet: f64) -> Vec<f64> {
    let mut weights = vec![0.0; grid.len()];
    if zmet <= grid[0] {
        weights[0] = 1.0;
    } else if zmet >= grid[grid.len() - 1] {
        weights[grid.len() - 1] = 1.0;
    } else {
        let hi = grid.partition_point(|&z| z < zmet);
        let lo = hi - 1;
        let frac = (zmet - grid[lo]) / (grid[hi] - grid[lo]);
        weights[hi] = frac;
        weights[lo] = 1.0 - frac;
    }
    weights
}
