//! The two-phase generation driver.
//!
//! Each generation is decided entirely against the previous generation's
//! population before any slot is touched: survival rolls and parent choices
//! all read the pre-generation state, then deaths are applied and newborns
//! installed. A newborn can therefore never be chosen as a parent in the
//! generation of its own birth.

use ancestry_ledger::RecordBirth;
use ancestry_tables::{NodeId, NodeTable, SEQUENCE_LENGTH, SEQUENCE_START};
use rand::Rng;
use tracing::trace;

use crate::error::SimulationError;
use crate::individual::PopulationState;

/// A death decided for this generation, with the transmitting genome node
/// chosen from each of the two parents.
struct PlannedBirth {
    slot: usize,
    parent_node0: NodeId,
    parent_node1: NodeId,
}

/// Picks the genome node one parent transmits: each of the parent's two
/// nodes with probability one half.
fn transmitted_node<R: Rng>(
    rng: &mut R,
    population: &PopulationState,
    parent_slot: usize,
) -> Result<NodeId, SimulationError> {
    let (node0, node1) = population.alive_nodes_of(parent_slot)?;
    if rng.random::<f64>() < 0.5 {
        Ok(node1)
    } else {
        Ok(node0)
    }
}

/// Advances the population by one generation, recording every birth through
/// `recorder`.
///
/// `birth_time` is the forward time assigned to nodes born this generation.
/// Returns the number of deaths (equal to the number of births).
pub fn advance_generation<R: Rng>(
    rng: &mut R,
    survival_probability: f64,
    birth_time: f64,
    population: &mut PopulationState,
    nodes: &mut NodeTable,
    recorder: &mut dyn RecordBirth,
) -> Result<usize, SimulationError> {
    if !survival_probability.is_finite()
        || survival_probability < 0.0
        || survival_probability >= 1.0
    {
        return Err(SimulationError::InvalidParameter {
            reason: format!(
                "survival_probability must lie in [0, 1), got {survival_probability}"
            ),
        });
    }

    // Decide phase: read-only against the pre-generation population.
    let mut births = Vec::new();
    for slot in 0..population.len() {
        population.alive_nodes_of(slot)?;
        if rng.random::<f64>() >= survival_probability {
            let parent0 = rng.random_range(0..population.len());
            let parent1 = rng.random_range(0..population.len());
            let parent_node0 = transmitted_node(rng, population, parent0)?;
            let parent_node1 = transmitted_node(rng, population, parent1)?;
            births.push(PlannedBirth {
                slot,
                parent_node0,
                parent_node1,
            });
        }
    }

    // Apply phase: retire every dying slot before installing any newborn.
    for birth in &births {
        population.mark_pending(birth.slot)?;
    }
    let deaths = births.len();
    for birth in births {
        let node0 = nodes.add_row(birth_time);
        let node1 = nodes.add_row(birth_time);
        recorder.record_birth(birth.parent_node0, SEQUENCE_START, SEQUENCE_LENGTH, node0)?;
        recorder.record_birth(birth.parent_node1, SEQUENCE_START, SEQUENCE_LENGTH, node1)?;
        population.replace(birth.slot, node0, node1)?;
    }

    trace!(birth_time, deaths, "generation advanced");
    Ok(deaths)
}
