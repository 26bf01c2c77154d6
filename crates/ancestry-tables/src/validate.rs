//! Invariant validation for persisted edge tables.
//!
//! Any table handed to the simplification engine must satisfy:
//!
//! 1. Parent blocks ordered by descending birth time, ties by ascending
//!    parent id.
//! 2. Each parent's edges form one contiguous run with strictly ascending
//!    child ids.
//! 3. Every referenced node exists, every child is strictly younger than
//!    its parent, and every interval is non-empty.
//!
//! A violation here is never recoverable: it indicates a bug in the
//! stitcher or the simplifier, not bad caller input, and silently
//! correcting it would corrupt genealogical truth. The pipeline therefore
//! runs this validator after every stitch and every simplification.

use crate::edges::{EdgeTable, cmp_parent_blocks};
use crate::ids::NodeId;
use crate::nodes::NodeTable;

/// A structural violation found in an edge table.
#[derive(Debug, thiserror::Error)]
pub enum InvariantError {
    /// An edge references a node id with no row in the node table.
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode {
        /// Row index of the offending edge.
        edge: usize,
        /// The out-of-range node id.
        node: NodeId,
    },

    /// A child is not strictly younger than its parent.
    #[error(
        "edge {edge}: child {child} (born {child_time}) is not younger than \
         parent {parent} (born {parent_time})"
    )]
    ChildNotYounger {
        /// Row index of the offending edge.
        edge: usize,
        /// Parent node id.
        parent: NodeId,
        /// Parent birth time.
        parent_time: f64,
        /// Child node id.
        child: NodeId,
        /// Child birth time.
        child_time: f64,
    },

    /// Consecutive parent blocks are out of canonical order.
    #[error(
        "edge {edge}: parent block {parent} (born {parent_time}) follows \
         {previous} (born {previous_time}) out of order"
    )]
    BlockOrder {
        /// Row index where the order breaks.
        edge: usize,
        /// Parent of the preceding block.
        previous: NodeId,
        /// Birth time of the preceding block's parent.
        previous_time: f64,
        /// Parent of the offending block.
        parent: NodeId,
        /// Birth time of the offending block's parent.
        parent_time: f64,
    },

    /// A parent's edges appear in more than one run.
    #[error("edge {edge}: parent {parent} reopens a block that already closed")]
    NonContiguousBlock {
        /// Row index where the block reopens.
        edge: usize,
        /// The parent whose edges are split.
        parent: NodeId,
    },

    /// Child ids within one parent block are not strictly ascending.
    #[error(
        "edge {edge}: child {child} of parent {parent} does not follow \
         previous child {previous} in ascending order"
    )]
    ChildOrder {
        /// Row index of the offending edge.
        edge: usize,
        /// The parent block being scanned.
        parent: NodeId,
        /// Previous child id in the block.
        previous: NodeId,
        /// The offending child id.
        child: NodeId,
    },

    /// An empty or inverted genomic interval.
    #[error("edge {edge}: bad genomic interval [{left}, {right})")]
    BadInterval {
        /// Row index of the offending edge.
        edge: usize,
        /// Left end of the interval.
        left: f64,
        /// Right end of the interval.
        right: f64,
    },
}

/// Check that `edges` satisfies every invariant required at a
/// simplification boundary.
///
/// Runs in one pass over the table plus one `seen` bit per node.
///
/// # Errors
///
/// Returns the first [`InvariantError`] encountered, in table order.
pub fn validate_edge_table(nodes: &NodeTable, edges: &EdgeTable) -> Result<(), InvariantError> {
    let mut seen = vec![false; nodes.len()];
    let mut current: Option<(NodeId, f64, NodeId)> = None; // (parent, time, last child)

    for (i, e) in edges.iter().enumerate() {
        if e.right <= e.left {
            return Err(InvariantError::BadInterval {
                edge: i,
                left: e.left,
                right: e.right,
            });
        }
        let parent_time = nodes
            .birth_time(e.parent)
            .ok_or(InvariantError::UnknownNode {
                edge: i,
                node: e.parent,
            })?;
        let child_time = nodes
            .birth_time(e.child)
            .ok_or(InvariantError::UnknownNode {
                edge: i,
                node: e.child,
            })?;
        if child_time <= parent_time {
            return Err(InvariantError::ChildNotYounger {
                edge: i,
                parent: e.parent,
                parent_time,
                child: e.child,
                child_time,
            });
        }

        match current {
            Some((parent, _, last_child)) if parent == e.parent => {
                if e.child <= last_child {
                    return Err(InvariantError::ChildOrder {
                        edge: i,
                        parent,
                        previous: last_child,
                        child: e.child,
                    });
                }
                current = Some((parent, parent_time, e.child));
            }
            other => {
                // A reopened block shares its old block key, so it must be
                // caught before the order check sees the repeated key.
                if seen.get(e.parent.index()).copied().unwrap_or(false) {
                    return Err(InvariantError::NonContiguousBlock {
                        edge: i,
                        parent: e.parent,
                    });
                }
                if let Some((previous, previous_time, _)) = other
                    && cmp_parent_blocks((previous_time, previous), (parent_time, e.parent))
                        != core::cmp::Ordering::Less
                {
                    return Err(InvariantError::BlockOrder {
                        edge: i,
                        previous,
                        previous_time,
                        parent: e.parent,
                        parent_time,
                    });
                }
                if let Some(slot) = seen.get_mut(e.parent.index()) {
                    *slot = true;
                }
                current = Some((e.parent, parent_time, e.child));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{SEQUENCE_LENGTH, SEQUENCE_START};

    fn nodes_with_times(times: &[f64]) -> NodeTable {
        let mut nodes = NodeTable::new();
        for t in times {
            nodes.add_row(*t);
        }
        nodes
    }

    fn table(rows: &[(usize, usize)]) -> EdgeTable {
        let mut edges = EdgeTable::new();
        for (p, c) in rows {
            edges
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, NodeId::new(*p), NodeId::new(*c))
                .unwrap();
        }
        edges
    }

    #[test]
    fn accepts_canonical_table() {
        // 0,1 born t=0; 2,3 born t=1; 4,5 born t=2.
        let nodes = nodes_with_times(&[0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
        let edges = table(&[(2, 4), (2, 5), (0, 2), (1, 3)]);
        validate_edge_table(&nodes, &edges).unwrap();
    }

    #[test]
    fn rejects_increasing_time_order() {
        let nodes = nodes_with_times(&[0.0, 1.0, 2.0]);
        let edges = table(&[(0, 1), (1, 2)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::BlockOrder { .. })
        ));
    }

    #[test]
    fn rejects_equal_time_tie_in_descending_id_order() {
        let nodes = nodes_with_times(&[0.0, 0.0, 1.0, 1.0]);
        let edges = table(&[(1, 3), (0, 2)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::BlockOrder { .. })
        ));
    }

    #[test]
    fn rejects_split_parent_block() {
        let nodes = nodes_with_times(&[0.0, 0.0, 1.0, 1.0, 1.0]);
        let edges = table(&[(0, 2), (1, 3), (0, 4)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::NonContiguousBlock { .. })
        ));
    }

    #[test]
    fn rejects_descending_children_within_block() {
        let nodes = nodes_with_times(&[0.0, 1.0, 1.0]);
        let edges = table(&[(0, 2), (0, 1)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::ChildOrder { .. })
        ));
    }

    #[test]
    fn rejects_child_older_than_parent() {
        let nodes = nodes_with_times(&[1.0, 0.0]);
        let edges = table(&[(0, 1)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::ChildNotYounger { .. })
        ));
    }

    #[test]
    fn rejects_unknown_node() {
        let nodes = nodes_with_times(&[0.0]);
        let edges = table(&[(0, 7)]);
        assert!(matches!(
            validate_edge_table(&nodes, &edges),
            Err(InvariantError::UnknownNode { .. })
        ));
    }
}
