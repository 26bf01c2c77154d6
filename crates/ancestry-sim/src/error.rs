//! Error taxonomy for the simulation layer.

use ancestry_ledger::{BufferError, StitchError};
use ancestry_simplify::SimplifyError;
use ancestry_tables::{InvariantError, NodeId, TableError};
use thiserror::Error;

/// Errors raised while building or running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A configuration value is outside its legal range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Human-readable description of the offending value.
        reason: String,
    },

    /// A population slot index does not exist.
    #[error("population slot {slot} is out of range")]
    SlotOutOfRange {
        /// The offending slot index.
        slot: usize,
    },

    /// A slot already marked for replacement was read as a parent.
    #[error("population slot {slot} was read while pending replacement")]
    StaleReference {
        /// The offending slot index.
        slot: usize,
    },

    /// A replacement was applied to a slot that was never marked pending.
    #[error("population slot {slot} was replaced without being marked pending")]
    SlotNotPending {
        /// The offending slot index.
        slot: usize,
    },

    /// Remapping dropped a node that an alive individual still points at.
    #[error("alive node {node} in slot {slot} was pruned by simplification")]
    DanglingAliveNode {
        /// The slot holding the dangling reference.
        slot: usize,
        /// The pre-remap node id that no longer exists.
        node: NodeId,
    },

    /// A birth could not be recorded.
    #[error("recording birth: {source}")]
    Record {
        /// The underlying ledger error.
        #[from]
        source: BufferError,
    },

    /// Stitching buffered births into the edge store failed.
    #[error("stitching edge store: {source}")]
    Stitch {
        /// The underlying stitch error.
        #[from]
        source: StitchError,
    },

    /// The simplification pass rejected its input or produced bad output.
    #[error("simplifying tables: {source}")]
    Simplify {
        /// The underlying simplify error.
        #[from]
        source: SimplifyError,
    },

    /// A table operation failed.
    #[error("table operation: {source}")]
    Table {
        /// The underlying table error.
        #[from]
        source: TableError,
    },

    /// A final table failed invariant validation.
    #[error("table validation: {source}")]
    Invariant {
        /// The underlying invariant violation.
        #[from]
        source: InvariantError,
    },
}
