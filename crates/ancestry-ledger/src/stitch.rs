//! Stitching: merging buffered births with the persisted edge table.
//!
//! The persisted table is canonically ordered (descending parent birth
//! time, ascending parent id on ties, ascending child ids within a block).
//! Buffered births arrive in forward chronological order. Concatenating
//! and re-sorting would cost a global sort per cycle and defeat the
//! incremental design; instead the stitcher rebuilds the canonical order
//! in one pass whose cost is proportional to the new edges plus the
//! persisted blocks walked.
//!
//! # The two cases
//!
//! **First simplification** (empty persisted table): every edge is in the
//! buffer. Walking the arena from the newest node backward -- emitting
//! each maximal run of equal birth times in ascending id order -- yields
//! the canonical order directly.
//!
//! **Subsequent simplifications**: a parent that was alive at the last
//! simplification may own persisted edges *and* have buffered births; its
//! block must be extended in place, not appended at one end. Three
//! sections are emitted, newest first:
//!
//! 1. Births of parents created since the last simplification. These are
//!    strictly newer than everything persisted.
//! 2. A linear merge over the persisted table: for each surviving parent
//!    with buffered births (in canonical block order), persisted blocks
//!    with strictly newer keys are copied through, the parent's own block
//!    is copied verbatim, and its buffered births are appended to it.
//!    Buffered children always have larger ids than persisted ones, so
//!    the extended block keeps ascending child order. A surviving parent
//!    with no persisted block is inserted at its key position, never
//!    inside another parent's block.
//! 3. The untouched ancient tail of the persisted table.
//!
//! The result is verified -- edge count conservation plus the full table
//! validator -- before being returned. A failure there is a stitcher bug
//! and is fatal, never silently corrected.

use core::cmp::Ordering;

use tracing::debug;

use ancestry_tables::edges::cmp_parent_blocks;
use ancestry_tables::{
    Edge, EdgeTable, InvariantError, NodeId, NodeTable, TableError, validate_edge_table,
};

use crate::buffer::EdgeBuffer;

/// Errors produced while stitching.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    /// The buffer arena spans more nodes than the node table.
    #[error("edge buffer spans {buffer_nodes} nodes but the node table has {table_nodes}")]
    NodeCountMismatch {
        /// Arena size.
        buffer_nodes: usize,
        /// Node table size.
        table_nodes: usize,
    },

    /// An alive-at-last-simplification id has no node row.
    #[error("alive node {node} from the last simplification is out of range")]
    UnknownAliveNode {
        /// The out-of-range id.
        node: NodeId,
    },

    /// The merged table lost or duplicated edges.
    #[error("stitched table has {actual} edges where {expected} were expected")]
    EdgeCountMismatch {
        /// Persisted plus buffered edge count.
        expected: usize,
        /// Edges actually emitted.
        actual: usize,
    },

    /// The merged table failed the canonical-order validator.
    #[error("stitched table violates edge-table invariants: {source}")]
    Invariant {
        /// The underlying violation.
        #[from]
        source: InvariantError,
    },

    /// An edge row was rejected while copying.
    #[error("edge rejected during stitching: {source}")]
    Table {
        /// The underlying table error.
        #[from]
        source: TableError,
    },
}

/// Merge the buffer and the persisted table into one canonical table.
///
/// `alive_at_last_simplification` is the post-remap alive node set recorded
/// at the previous simplification; it partitions buffered parents into
/// "may own persisted edges" and "created since". It is ignored when the
/// persisted table is empty (first simplification).
///
/// # Errors
///
/// Any error from this function is fatal to the run: either the inputs
/// disagree structurally or the merge itself broke an invariant.
pub fn stitch(
    nodes: &NodeTable,
    edge_store: &EdgeTable,
    buffer: &EdgeBuffer,
    alive_at_last_simplification: &[NodeId],
) -> Result<EdgeTable, StitchError> {
    if buffer.num_nodes() > nodes.len() {
        return Err(StitchError::NodeCountMismatch {
            buffer_nodes: buffer.num_nodes(),
            table_nodes: nodes.len(),
        });
    }
    let expected = edge_store.len().saturating_add(buffer.total_births());
    let mut merged = EdgeTable::new();

    if edge_store.is_empty() {
        flush_newest_first(nodes, buffer, |_| true, &mut merged)?;
    } else {
        let mut alive = vec![false; nodes.len()];
        for a in alive_at_last_simplification {
            let slot = alive
                .get_mut(a.index())
                .ok_or(StitchError::UnknownAliveNode { node: *a })?;
            *slot = true;
        }
        flush_newest_first(
            nodes,
            buffer,
            |index| !alive.get(index).copied().unwrap_or(false),
            &mut merged,
        )?;
        merge_persisted(nodes, edge_store, buffer, &alive, &mut merged)?;
    }

    if merged.len() != expected {
        return Err(StitchError::EdgeCountMismatch {
            expected,
            actual: merged.len(),
        });
    }
    validate_edge_table(nodes, &merged)?;
    debug!(
        buffered = buffer.total_births(),
        persisted = edge_store.len(),
        merged = merged.len(),
        "stitched edge tables"
    );
    Ok(merged)
}

/// Emit buffered births of the parents selected by `include`, newest
/// birth-time run first, ascending ids within a run.
///
/// Node ids are monotone in birth time, so walking the arena from the top
/// and reversing each maximal equal-time run produces the canonical
/// (time descending, id ascending) block order without sorting.
// Index arithmetic here is bounded by the run-walk loop conditions.
#[allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]
fn flush_newest_first(
    nodes: &NodeTable,
    buffer: &EdgeBuffer,
    include: impl Fn(usize) -> bool,
    out: &mut EdgeTable,
) -> Result<(), StitchError> {
    let times = nodes.as_slice();
    let mut hi = buffer.num_nodes().min(times.len());
    while hi > 0 {
        let run_time = times[hi - 1].birth_time;
        let mut lo = hi - 1;
        while lo > 0 && times[lo - 1].birth_time.total_cmp(&run_time) == Ordering::Equal {
            lo -= 1;
        }
        for index in lo..hi {
            if include(index) {
                let parent = NodeId::new(index);
                for b in buffer.births(parent) {
                    out.add_row(b.left, b.right, parent, b.child)?;
                }
            }
        }
        hi = lo;
    }
    Ok(())
}

/// Copy a persisted edge through to the output.
fn copy_edge(out: &mut EdgeTable, e: &Edge) -> Result<(), StitchError> {
    out.add_row(e.left, e.right, e.parent, e.child)?;
    Ok(())
}

/// The subsequent-simplification merge walk over the persisted table.
#[allow(clippy::arithmetic_side_effects)]
fn merge_persisted(
    nodes: &NodeTable,
    edge_store: &EdgeTable,
    buffer: &EdgeBuffer,
    alive: &[bool],
    out: &mut EdgeTable,
) -> Result<(), StitchError> {
    // Surviving parents that transmitted since the last simplification,
    // in canonical block order. This is the stitcher's only sort, over
    // touched parents rather than the full table.
    let mut targets: Vec<(f64, NodeId)> = alive
        .iter()
        .enumerate()
        .filter(|(index, is_alive)| **is_alive && buffer.has_births(NodeId::new(*index)))
        .filter_map(|(index, _)| {
            let id = NodeId::new(index);
            nodes.birth_time(id).map(|t| (t, id))
        })
        .collect();
    targets.sort_by(|a, b| cmp_parent_blocks(*a, *b));

    let store = edge_store.as_slice();
    let mut offset = 0usize;
    for (time, parent) in targets {
        // Persisted blocks strictly newer than this parent's key.
        while let Some(edge) = store.get(offset) {
            let edge_time =
                nodes
                    .birth_time(edge.parent)
                    .ok_or(InvariantError::UnknownNode {
                        edge: offset,
                        node: edge.parent,
                    })?;
            if cmp_parent_blocks((edge_time, edge.parent), (time, parent)) == Ordering::Less {
                copy_edge(out, edge)?;
                offset += 1;
            } else {
                break;
            }
        }
        // The parent's own persisted block, verbatim.
        while let Some(edge) = store.get(offset) {
            if edge.parent == parent {
                copy_edge(out, edge)?;
                offset += 1;
            } else {
                break;
            }
        }
        // Buffered births extend the block; their children are newer (and
        // larger) than every persisted child of this parent.
        for b in buffer.births(parent) {
            out.add_row(b.left, b.right, parent, b.child)?;
        }
    }
    // Ancient tail with no surviving transmitter.
    while let Some(edge) = store.get(offset) {
        copy_edge(out, edge)?;
        offset += 1;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::buffer::RecordBirth;
    use ancestry_tables::{SEQUENCE_LENGTH, SEQUENCE_START};

    fn nodes_with_times(times: &[f64]) -> NodeTable {
        let mut nodes = NodeTable::new();
        for t in times {
            nodes.add_row(*t);
        }
        nodes
    }

    fn id(index: usize) -> NodeId {
        NodeId::new(index)
    }

    fn record(buffer: &mut EdgeBuffer, parent: usize, child: usize) {
        buffer
            .record_birth(id(parent), SEQUENCE_START, SEQUENCE_LENGTH, id(child))
            .unwrap();
    }

    fn pairs(edges: &EdgeTable) -> Vec<(usize, usize)> {
        edges
            .iter()
            .map(|e| (e.parent.index(), e.child.index()))
            .collect()
    }

    #[test]
    fn first_flush_matches_the_global_sort() {
        // Founders 0..=3 at t=0; 4,5 born t=1; 6,7 born t=2.
        let nodes = nodes_with_times(&[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let mut buffer = EdgeBuffer::new(4);
        record(&mut buffer, 1, 4);
        record(&mut buffer, 2, 5);
        record(&mut buffer, 4, 6);
        record(&mut buffer, 0, 7);

        let stitched = stitch(&nodes, &EdgeTable::new(), &buffer, &[]).unwrap();

        let mut classic = EdgeTable::new();
        for (p, c) in [(1, 4), (2, 5), (4, 6), (0, 7)] {
            classic
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, id(p), id(c))
                .unwrap();
        }
        classic.sort_canonical(&nodes).unwrap();

        assert_eq!(stitched, classic);
        assert_eq!(pairs(&stitched), vec![(4, 6), (0, 7), (1, 4), (2, 5)]);
    }

    #[test]
    fn interleaves_surviving_parents_into_their_blocks() {
        // Persisted history: founders 0..=2 (t=0), 3..=4 (t=1), 5..=6
        // (t=2). Since the last simplification, 7..=8 were born at t=3 and
        // 9 at t=4.
        let nodes =
            nodes_with_times(&[0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0]);
        let mut store = EdgeTable::new();
        for (p, c) in [(3, 5), (3, 6), (0, 3), (0, 4)] {
            store
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, id(p), id(c))
                .unwrap();
        }
        validate_edge_table(&nodes, &store).unwrap();

        let alive = [id(3), id(4), id(5), id(6)];
        let mut buffer = EdgeBuffer::new(7);
        // Node 5 survived with no persisted block and now transmits.
        record(&mut buffer, 5, 7);
        // Node 3 already owns a block and transmits again.
        record(&mut buffer, 3, 8);
        // Node 7 was born after the last simplification and transmits.
        record(&mut buffer, 7, 9);

        let stitched = stitch(&nodes, &store, &buffer, &alive).unwrap();
        assert_eq!(
            pairs(&stitched),
            vec![(7, 9), (5, 7), (3, 5), (3, 6), (3, 8), (0, 3), (0, 4)]
        );
    }

    #[test]
    fn empty_buffer_passes_the_store_through_unchanged() {
        let nodes = nodes_with_times(&[0.0, 0.0, 1.0, 1.0]);
        let mut store = EdgeTable::new();
        for (p, c) in [(0, 2), (1, 3)] {
            store
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, id(p), id(c))
                .unwrap();
        }
        let buffer = EdgeBuffer::new(4);
        let stitched = stitch(&nodes, &store, &buffer, &[id(2), id(3)]).unwrap();
        assert_eq!(stitched, store);
    }

    #[test]
    fn preserves_the_ancient_tail() {
        // The oldest block's parent (0) is long dead; its edges must come
        // through untouched after every insertion.
        let nodes = nodes_with_times(&[0.0, 1.0, 1.0, 2.0, 3.0]);
        let mut store = EdgeTable::new();
        for (p, c) in [(1, 3), (0, 1), (0, 2)] {
            store
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, id(p), id(c))
                .unwrap();
        }
        let mut buffer = EdgeBuffer::new(4);
        record(&mut buffer, 3, 4);

        let stitched = stitch(&nodes, &store, &buffer, &[id(3)]).unwrap();
        assert_eq!(pairs(&stitched), vec![(3, 4), (1, 3), (0, 1), (0, 2)]);
    }

    #[test]
    fn rejects_alive_ids_outside_the_node_table() {
        let nodes = nodes_with_times(&[0.0, 1.0]);
        let mut store = EdgeTable::new();
        store
            .add_row(SEQUENCE_START, SEQUENCE_LENGTH, id(0), id(1))
            .unwrap();
        let buffer = EdgeBuffer::new(2);
        assert!(matches!(
            stitch(&nodes, &store, &buffer, &[id(9)]),
            Err(StitchError::UnknownAliveNode { .. })
        ));
    }

    #[test]
    fn rejects_buffer_wider_than_node_table() {
        let nodes = nodes_with_times(&[0.0]);
        let buffer = EdgeBuffer::new(5);
        assert!(matches!(
            stitch(&nodes, &EdgeTable::new(), &buffer, &[]),
            Err(StitchError::NodeCountMismatch { .. })
        ));
    }
}
