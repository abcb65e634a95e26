//! Star formation history modeling for galaxy SED fitting.
//!
//! The centerpiece is [`StarFormationHistory`]: given a cosmology, stellar
//! population grids, and a model configuration (redshift plus one or more
//! parametric SFH components), it evaluates star formation rate on a fine
//! logarithmic age grid, normalizes each component to its requested formed
//! mass, rebins onto the population age axis, and derives summary
//! quantities such as living stellar mass and mass-weighted age.
//!
//! ```
//! use std::sync::Arc;
//! use starform::{ComponentConfig, ModelConfig, ModelEnvironment, Shape, StarFormationHistory};
//!
//! let env = Arc::new(ModelEnvironment::demo());
//! let config = ModelConfig {
//!     redshift: 0.0,
//!     components: vec![ComponentConfig {
//!         shape: Shape::Constant { age_min: 0.0, age_max: 5.0 },
//!         massformed: 10.0,
//!         metallicity: 1.0,
//!     }],
//! };
//!
//! let sfh = StarFormationHistory::new(env, &config)?;
//! assert!(!sfh.unphysical());
//! assert!(sfh.mass_total().living < sfh.mass_total().formed);
//! # Ok::<(), starform::SfhError>(())
//! ```

pub mod algo;
pub mod config;
pub mod cosmology;
pub mod enrichment;
pub mod grids;
pub mod population;
pub mod sfh;
pub mod table;

pub use config::{ComponentConfig, ComponentId, ModelConfig, Shape, ShapeKind};
pub use cosmology::CosmologyTable;
pub use grids::AgeGrid;
pub use population::PopulationGrids;
pub use sfh::{ComponentState, MassRecord, SfhError, StarFormationHistory};

/// Shared, immutable inputs an SFH model evaluates against: the cosmology
/// fixing age of universe as a function of redshift, and the population
/// grids fixing the coarse age and metallicity axes.
#[derive(Debug, Clone)]
pub struct ModelEnvironment {
    cosmology: CosmologyTable,
    grids: PopulationGrids,
}

impl ModelEnvironment {
    pub fn new(cosmology: CosmologyTable, grids: PopulationGrids) -> Self {
        ModelEnvironment { cosmology, grids }
    }

    /// Planck 2013 cosmology with the demonstration population grids.
    pub fn demo() -> Self {
        ModelEnvironment::new(CosmologyTable::planck13(), population::DEMO_GRIDS.clone())
    }

    pub fn cosmology(&self) -> &CosmologyTable {
        &self.cosmology
    }

    pub fn grids(&self) -> &PopulationGrids {
        &self.grids
    }
}
