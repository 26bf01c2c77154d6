//! Shared table types for the ancestry simulation.
//!
//! This crate is the single source of truth for the genealogical data model
//! used across the workspace: node and edge records, the append-only tables
//! that own them, the canonical edge ordering, and the invariant validator
//! that every table handed to the simplification engine must pass.
//!
//! # Modules
//!
//! - [`ids`] -- The [`NodeId`] index type.
//! - [`nodes`] -- [`Node`] records and the append-only [`NodeTable`].
//! - [`edges`] -- [`Edge`] records and the [`EdgeTable`], including the
//!   canonical sort used by the classic reference pipeline.
//! - [`validate`] -- The edge-table invariant validator.
//! - [`time`] -- Conversion between the internal forward time convention
//!   and the "time since present" convention used by downstream consumers.
//!
//! # Time convention
//!
//! Birth times are measured **forward**: founders are born at time `0.0` and
//! a node born in generation `g` has `birth_time == g`. Edge tables are kept
//! in *descending* parent birth time order (most recent parents first), with
//! ties broken by ascending parent id, so the most ancient surviving
//! ancestors sit at the end of the table.

pub mod edges;
pub mod ids;
pub mod nodes;
pub mod time;
pub mod validate;

pub use edges::{Edge, EdgeTable, TableError};
pub use ids::NodeId;
pub use nodes::{Node, NodeTable};
pub use time::{generation_time, to_time_ago};
pub use validate::{InvariantError, validate_edge_table};

/// Left end of the single genomic interval covered by this model.
pub const SEQUENCE_START: f64 = 0.0;

/// Length (and right end) of the single genomic interval.
pub const SEQUENCE_LENGTH: f64 = 1.0;
