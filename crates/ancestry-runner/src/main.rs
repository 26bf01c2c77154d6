//! Command-line runner for the ancestry simulation.
//!
//! Loads configuration, runs the incrementally simplifying simulation,
//! optionally re-runs the scenario through the classic sort-at-the-end
//! pipeline to verify both produce identical tables, and prints a JSON
//! summary line.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `ancestry-config.yaml` (or the file named
//!    by `ANCESTRY_CONFIG`)
//! 3. Run the simulation
//! 4. Verify against the classic pipeline when configured
//! 5. Print the summary

mod error;

use std::path::Path;

use ancestry_sim::{Simulation, SimulationConfig, run_classic};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::RunnerError;

/// Environment variable overriding the config file path.
const CONFIG_ENV: &str = "ANCESTRY_CONFIG";

/// Default config file path, relative to the working directory.
const CONFIG_PATH: &str = "ancestry-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading, the simulation, or
/// verification fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("ancestry-runner starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        population_size = config.population_size,
        survival_probability = config.survival_probability,
        burnin = config.burnin,
        generations = config.generations,
        simplification_period = config.simplification_period,
        seed = config.seed,
        "Configuration loaded"
    );

    // 3. Run the simulation.
    let mut simulation = Simulation::new(config.clone())?;
    let summary = simulation.run()?;
    info!(
        nodes = simulation.nodes().len(),
        edges = simulation.edges().len(),
        alive_genomes = simulation.population().alive_nodes()?.len(),
        "Simulation complete"
    );

    // 4. Verify against the classic pipeline when configured.
    if config.verify_against_classic {
        verify_against_classic(&config, &simulation)?;
        info!("Classic pipeline verification passed");
    }

    // 5. Print the summary.
    println!("{}", serde_json::to_string(&summary).map_err(RunnerError::from)?);

    info!(
        generations = summary.generations,
        total_deaths = summary.total_deaths,
        simplifications = summary.simplifications,
        "ancestry-runner shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// Reads the file named by `ANCESTRY_CONFIG` if set, otherwise
/// `ancestry-config.yaml` relative to the working directory. A missing
/// default file falls back to built-in defaults.
fn load_config() -> Result<SimulationConfig, RunnerError> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return Ok(SimulationConfig::load(path)?);
    }
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::load(config_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(SimulationConfig::default())
    }
}

/// Re-run the scenario through the classic pipeline and check that every
/// final table matches the incremental run.
fn verify_against_classic(
    config: &SimulationConfig,
    simulation: &Simulation,
) -> Result<(), RunnerError> {
    let classic = run_classic(config)?;
    if simulation.nodes() != &classic.nodes {
        return Err(RunnerError::Verification {
            message: "node tables differ".to_owned(),
        });
    }
    if simulation.edges() != &classic.edges {
        return Err(RunnerError::Verification {
            message: "edge tables differ".to_owned(),
        });
    }
    let alive = simulation.population().alive_nodes().map_err(RunnerError::from)?;
    if alive != classic.alive_nodes {
        return Err(RunnerError::Verification {
            message: "alive genome ids differ".to_owned(),
        });
    }
    Ok(())
}
