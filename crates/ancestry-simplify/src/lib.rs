//! Genealogy simplification for the ancestry simulation.
//!
//! Given a node table, a canonically ordered edge table, and a sample set
//! of currently-alive node ids, [`simplify`] reduces the tables to the
//! minimal structure needed to represent the ancestry of the samples and
//! returns an [`IdMap`] from old to new node ids (`None` for pruned
//! nodes).
//!
//! The implementation is the single-interval specialization of the
//! standard reduction: with every edge spanning the whole genome and
//! every node inheriting from exactly one parent node, the genealogy is a
//! forest, each node carries at most one surviving lineage, and one pass
//! over the parent blocks (newest first, which is exactly the canonical
//! table order) decides for each parent whether it coalesces, passes
//! through, or is pruned.
//!
//! # Guarantees
//!
//! - Every sample node survives with a non-`None` mapping.
//! - Renumbering is **monotone**: surviving nodes keep their relative id
//!   order, so relative time order is preserved and the canonical edge
//!   order commutes with the remap. This is what makes periodic
//!   simplification produce tables identical to a single final
//!   simplification, not merely isomorphic ones.
//! - The returned edge table satisfies the same invariants as the input;
//!   it is validated before being returned and needs no re-stitching.
//! - Inputs are borrowed and never mutated.

pub mod engine;
pub mod idmap;

pub use engine::{SimplifyError, SimplifyOutput, simplify};
pub use idmap::IdMap;
