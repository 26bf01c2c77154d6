//! Forward-time Wright-Fisher simulation over the ancestry tables.
//!
//! The crate wires the lower layers into a running simulation: a fixed-size
//! diploid population advances one generation at a time, every birth is
//! recorded through [`ancestry_ledger::RecordBirth`], and the tables are
//! periodically stitched and simplified against the alive genomes.
//!
//! Two recording pipelines share one generation driver and one random
//! stream:
//!
//! - [`Simulation`] buffers births and stitches them incrementally;
//! - [`classic::run_classic`] appends to the edge table directly and sorts
//!   once at the end.
//!
//! For a given configuration both produce identical final tables, which is
//! the crate's central correctness check.

pub mod classic;
pub mod config;
pub mod error;
pub mod generation;
pub mod individual;
pub mod simulation;

pub use classic::{ClassicOutput, run_classic};
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use generation::advance_generation;
pub use individual::{Individual, PopulationState};
pub use simulation::{RunSummary, Simulation};
