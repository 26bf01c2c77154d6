//! The incremental simulation: birth buffering, periodic stitching, and
//! simplification.

use ancestry_ledger::{EdgeBuffer, stitch};
use ancestry_simplify::simplify;
use ancestry_tables::{EdgeTable, NodeId, NodeTable, generation_time, to_time_ago};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::generation::advance_generation;
use crate::individual::PopulationState;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RunSummary {
    /// Total generations advanced, burn-in included.
    pub generations: u64,
    /// Total deaths (equal to total births) across the run.
    pub total_deaths: usize,
    /// Number of simplification passes performed.
    pub simplifications: usize,
}

/// A forward-time simulation recording ancestry through the edge buffer.
///
/// Births accumulate in the buffer between simplifications; each pass
/// stitches them into the persisted edge table, reduces the tables against
/// the alive genomes, and renumbers everything the population points at.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    rng: StdRng,
    nodes: NodeTable,
    edges: EdgeTable,
    buffer: EdgeBuffer,
    population: PopulationState,
    alive_at_last_simplification: Vec<NodeId>,
    generation: u64,
}

impl Simulation {
    /// Builds a simulation from a validated configuration.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut nodes = NodeTable::new();
        let population = PopulationState::founders(config.population_size, &mut nodes);
        let buffer = EdgeBuffer::new(nodes.len());
        let alive_at_last_simplification = population.alive_nodes()?;
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            config,
            rng,
            nodes,
            edges: EdgeTable::new(),
            buffer,
            population,
            alive_at_last_simplification,
            generation: 0,
        })
    }

    /// Runs burn-in plus the measured generations, simplifying every
    /// configured period and once more at the end if the final generation
    /// count is not a multiple of the period.
    // Period is validated nonzero in `new`, so the modulo cannot trap.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        let total = self
            .config
            .burnin
            .checked_add(self.config.generations)
            .ok_or_else(|| SimulationError::InvalidParameter {
                reason: "burnin + generations overflows".to_owned(),
            })?;
        let mut total_deaths = 0usize;
        let mut simplifications = 0usize;

        for generation in 1..=total {
            let deaths = advance_generation(
                &mut self.rng,
                self.config.survival_probability,
                generation_time(generation),
                &mut self.population,
                &mut self.nodes,
                &mut self.buffer,
            )?;
            total_deaths = total_deaths.saturating_add(deaths);
            self.generation = generation;

            if generation % self.config.simplification_period == 0 {
                self.simplify_tables()?;
                simplifications = simplifications.saturating_add(1);
            }
        }

        if total % self.config.simplification_period != 0 {
            self.simplify_tables()?;
            simplifications = simplifications.saturating_add(1);
        }

        info!(
            generations = total,
            total_deaths,
            simplifications,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "simulation finished"
        );
        Ok(RunSummary {
            generations: total,
            total_deaths,
            simplifications,
        })
    }

    /// Stitch buffered births into the edge store, simplify against the
    /// alive genomes, and renumber the population.
    fn simplify_tables(&mut self) -> Result<(), SimulationError> {
        let stitched = stitch(
            &self.nodes,
            &self.edges,
            &self.buffer,
            &self.alive_at_last_simplification,
        )?;
        let samples = self.population.alive_nodes()?;
        let reduced = simplify(&self.nodes, &stitched, &samples)?;
        self.population.remap(&reduced.idmap)?;
        self.nodes = reduced.nodes;
        self.edges = reduced.edges;
        self.buffer.clear_and_resize(self.nodes.len());
        self.alive_at_last_simplification = self.population.alive_nodes()?;
        debug!(
            generation = self.generation,
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "simplified tables"
        );
        Ok(())
    }

    /// The node table after the most recent simplification.
    pub const fn nodes(&self) -> &NodeTable {
        &self.nodes
    }

    /// The persisted, canonically ordered edge table.
    pub const fn edges(&self) -> &EdgeTable {
        &self.edges
    }

    /// The edge buffer holding births since the last simplification.
    pub const fn buffer(&self) -> &EdgeBuffer {
        &self.buffer
    }

    /// The current population.
    pub const fn population(&self) -> &PopulationState {
        &self.population
    }

    /// The number of generations advanced so far.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The configuration this simulation was built from.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Node ages as time-before-present, in node-table order.
    pub fn node_times_ago(&self) -> Vec<f64> {
        let now = generation_time(self.generation);
        self.nodes
            .birth_times()
            .iter()
            .map(|birth_time| to_time_ago(now, *birth_time))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ancestry_tables::validate_edge_table;

    use super::*;

    fn config(population_size: usize, generations: u64, period: u64, seed: u64) -> SimulationConfig {
        SimulationConfig {
            population_size,
            survival_probability: 0.9,
            burnin: 0,
            generations,
            simplification_period: period,
            seed,
            verify_against_classic: false,
        }
    }

    #[test]
    fn rejects_invalid_configuration() {
        let bad = SimulationConfig {
            survival_probability: 1.5,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            Simulation::new(bad),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn run_leaves_tables_simplified_and_valid() {
        let mut sim = Simulation::new(config(20, 57, 10, 91)).unwrap();
        let summary = sim.run().unwrap();

        assert_eq!(summary.generations, 57);
        // 57 is not a multiple of 10, so a final partial pass happens.
        assert_eq!(summary.simplifications, 6);
        assert!(sim.buffer().is_fully_flushed());
        assert_eq!(sim.buffer().num_nodes(), sim.nodes().len());
        assert_eq!(sim.population().alive_nodes().unwrap().len(), 40);
        validate_edge_table(sim.nodes(), sim.edges()).unwrap();
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let mut a = Simulation::new(config(15, 80, 7, 4242)).unwrap();
        let mut b = Simulation::new(config(15, 80, 7, 4242)).unwrap();
        let summary_a = a.run().unwrap();
        let summary_b = b.run().unwrap();

        assert_eq!(summary_a, summary_b);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.edges(), b.edges());
        assert_eq!(a.population(), b.population());
    }

    #[test]
    fn burnin_counts_toward_total_generations() {
        let cfg = SimulationConfig {
            burnin: 13,
            generations: 7,
            ..config(10, 0, 5, 1)
        };
        let mut sim = Simulation::new(cfg).unwrap();
        let summary = sim.run().unwrap();
        assert_eq!(summary.generations, 20);
        assert_eq!(sim.generation(), 20);
    }

    #[test]
    fn node_times_ago_are_nonnegative_and_zero_for_alive_newborns() {
        let mut sim = Simulation::new(config(10, 30, 10, 5)).unwrap();
        sim.run().unwrap();
        let ages = sim.node_times_ago();
        assert_eq!(ages.len(), sim.nodes().len());
        assert!(ages.iter().all(|age| *age >= 0.0));
    }
}
