use starform::{ComponentConfig, ModelConfig, ModelEnvironment, Shape};
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn demo_env() -> Arc<ModelEnvironment> {
    Arc::new(ModelEnvironment::demo())
}

/// Single-component model at solar metallicity.
pub fn single(redshift: f64, shape: Shape, massformed: f64) -> ModelConfig {
    ModelConfig {
        redshift,
        components: vec![ComponentConfig {
            shape,
            massformed,
            metallicity: 1.0,
        }],
    }
}
