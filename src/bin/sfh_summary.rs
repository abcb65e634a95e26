//! Evaluate a star formation history configuration and print a summary.

use anyhow::Context;
use clap::Parser;
use starform::cosmology::YR_PER_GYR;
use starform::enrichment::DeltaEnrichment;
use starform::{ModelConfig, ModelEnvironment, StarFormationHistory};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

/// Summarize a star formation history model.
///
/// Reads a JSON model configuration, evaluates it against the built-in
/// demonstration cosmology and population grids, and prints the derived
/// masses and rates.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Path to a JSON model configuration.
    config: PathBuf,

    /// Fine age grid sampling interval in dex.
    #[arg(long, default_value_t = starform::grids::DEFAULT_LOG_SAMPLING)]
    log_sampling: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let file = File::open(&args.config)
        .with_context(|| format!("opening {}", args.config.display()))?;
    let config: ModelConfig = serde_json::from_reader(file)
        .with_context(|| format!("parsing {}", args.config.display()))?;

    let env = Arc::new(ModelEnvironment::demo());
    let sfh = StarFormationHistory::with_options(
        env,
        Box::new(DeltaEnrichment),
        args.log_sampling,
        &config,
    )?;

    println!("redshift:          {}", config.redshift);
    println!(
        "age of universe:   {:.4} Gyr",
        sfh.age_of_universe() / YR_PER_GYR
    );
    println!("unphysical:        {}", sfh.unphysical());
    println!();
    println!(
        "{:<14} {:>14} {:>14}",
        "component", "formed [M_sun]", "living [M_sun]"
    );
    for component in sfh.components() {
        let mass = component.mass();
        println!(
            "{:<14} {:>14.4e} {:>14.4e}",
            component.id().to_string(),
            mass.formed,
            mass.living
        );
    }
    let total = sfh.mass_total();
    println!(
        "{:<14} {:>14.4e} {:>14.4e}",
        "total", total.formed, total.living
    );
    println!();
    println!("sfr (100 Myr):     {:.4e} M_sun/yr", sfh.sfr_100myr());
    println!(
        "mass-weighted age: {:.4} Gyr",
        sfh.mass_weighted_age() / YR_PER_GYR
    );

    Ok(())
}
