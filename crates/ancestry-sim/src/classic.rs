//! The classic recording pipeline: append every edge directly to the table,
//! sort once at the end, simplify once.
//!
//! This shares the generation driver (and therefore the random stream) with
//! the incremental [`Simulation`](crate::Simulation), so for a given
//! configuration the two pipelines must produce identical final tables.
//! That makes this module the ground truth the incremental path is checked
//! against.

use ancestry_simplify::simplify;
use ancestry_tables::{EdgeTable, NodeId, NodeTable, generation_time, validate_edge_table};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::generation::advance_generation;
use crate::individual::PopulationState;

/// Final tables of a classic-pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassicOutput {
    /// Simplified node table.
    pub nodes: NodeTable,
    /// Simplified, canonically ordered edge table.
    pub edges: EdgeTable,
    /// Alive genome nodes in slot order, renumbered into the final tables.
    pub alive_nodes: Vec<NodeId>,
}

/// Runs the whole scenario with direct edge-table recording and a single
/// terminal sort-and-simplify.
pub fn run_classic(config: &SimulationConfig) -> Result<ClassicOutput, SimulationError> {
    config.validate()?;
    let total = config
        .burnin
        .checked_add(config.generations)
        .ok_or_else(|| SimulationError::InvalidParameter {
            reason: "burnin + generations overflows".to_owned(),
        })?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut nodes = NodeTable::new();
    let mut population = PopulationState::founders(config.population_size, &mut nodes);
    let mut edges = EdgeTable::new();

    for generation in 1..=total {
        advance_generation(
            &mut rng,
            config.survival_probability,
            generation_time(generation),
            &mut population,
            &mut nodes,
            &mut edges,
        )?;
    }

    edges.sort_canonical(&nodes)?;
    let samples = population.alive_nodes()?;
    let reduced = simplify(&nodes, &edges, &samples)?;
    population.remap(&reduced.idmap)?;
    validate_edge_table(&reduced.nodes, &reduced.edges)?;

    info!(
        generations = total,
        nodes = reduced.nodes.len(),
        edges = reduced.edges.len(),
        "classic pipeline finished"
    );
    Ok(ClassicOutput {
        nodes: reduced.nodes,
        edges: reduced.edges,
        alive_nodes: population.alive_nodes()?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn classic_run_produces_valid_simplified_tables() {
        let config = SimulationConfig {
            population_size: 12,
            generations: 40,
            seed: 17,
            ..SimulationConfig::default()
        };
        let output = run_classic(&config).unwrap();

        assert_eq!(output.alive_nodes.len(), 24);
        validate_edge_table(&output.nodes, &output.edges).unwrap();
        // Alive genomes are samples, so all of them survive simplification.
        for node in &output.alive_nodes {
            assert!(output.nodes.contains(*node));
        }
    }
}
