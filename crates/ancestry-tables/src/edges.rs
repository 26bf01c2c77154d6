//! Edge records, the edge table, and the canonical edge ordering.
//!
//! An [`Edge`] is a directed inheritance relationship from a parent node to
//! a child node over a genomic interval (always `[0.0, 1.0)` in this
//! single-interval core). Edges live in exactly one table at a time: they
//! are created into the edge buffer and move into the persisted
//! [`EdgeTable`] once, during stitching.
//!
//! # Canonical order
//!
//! A persisted edge table is ordered by descending parent birth time, with
//! ties broken by ascending parent id, and by ascending child id within a
//! parent's block. [`EdgeTable::sort_canonical`] establishes this order
//! from scratch; the incremental pipeline maintains it without a global
//! sort.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::nodes::NodeTable;

/// Errors produced when building or reordering edge tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The genomic interval is empty or inverted.
    #[error("bad genomic interval [{left}, {right}) on edge {parent}->{child}")]
    BadInterval {
        /// Left end of the rejected interval.
        left: f64,
        /// Right end of the rejected interval.
        right: f64,
        /// Parent node of the rejected edge.
        parent: NodeId,
        /// Child node of the rejected edge.
        child: NodeId,
    },

    /// An edge references a node id with no row in the node table.
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode {
        /// Row index of the offending edge.
        edge: usize,
        /// The out-of-range node id.
        node: NodeId,
    },
}

/// A directed inheritance relationship over a genomic interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Left end of the inherited interval (inclusive).
    pub left: f64,
    /// Right end of the inherited interval (exclusive).
    pub right: f64,
    /// The transmitting node.
    pub parent: NodeId,
    /// The inheriting node.
    pub child: NodeId,
}

/// Compare two parent blocks in canonical table order.
///
/// Blocks are ordered by descending birth time; equal times fall back to
/// ascending parent id. Both tie-break directions matter: they are what
/// lets the incremental stitcher and the classic global sort agree on one
/// unique table for the same edge set.
pub fn cmp_parent_blocks(a: (f64, NodeId), b: (f64, NodeId)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1))
}

/// The edge table: a flat list of edges, canonically ordered when persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeTable {
    /// All edges, in table order.
    edges: Vec<Edge>,
}

impl EdgeTable {
    /// Create an empty edge table.
    pub const fn new() -> Self {
        Self { edges: Vec::new() }
    }

    /// Return the number of edges.
    pub const fn len(&self) -> usize {
        self.edges.len()
    }

    /// Return whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Append one edge, rejecting empty or inverted intervals.
    pub fn add_row(
        &mut self,
        left: f64,
        right: f64,
        parent: NodeId,
        child: NodeId,
    ) -> Result<(), TableError> {
        if right <= left {
            return Err(TableError::BadInterval {
                left,
                right,
                parent,
                child,
            });
        }
        self.edges.push(Edge {
            left,
            right,
            parent,
            child,
        });
        Ok(())
    }

    /// Return the edge at `index`, if it is in range.
    pub fn get(&self, index: usize) -> Option<&Edge> {
        self.edges.get(index)
    }

    /// Iterate over all rows in table order.
    pub fn iter(&self) -> core::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    /// View the rows as a slice.
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// Remove all rows, keeping the allocation.
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Sort the whole table into canonical order.
    ///
    /// This is the classic pipeline's one global sort (descending parent
    /// birth time, then parent id, then child id). The incremental
    /// pipeline never calls this; its stitcher produces the same order at
    /// a cost proportional to the new edges only.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownNode`] if any edge references a node
    /// id outside `nodes`.
    pub fn sort_canonical(&mut self, nodes: &NodeTable) -> Result<(), TableError> {
        for (i, e) in self.edges.iter().enumerate() {
            for node in [e.parent, e.child] {
                if !nodes.contains(node) {
                    return Err(TableError::UnknownNode { edge: i, node });
                }
            }
        }
        let times = nodes.as_slice();
        self.edges.sort_by(|a, b| {
            let ta = times.get(a.parent.index()).map_or(f64::NAN, |n| n.birth_time);
            let tb = times.get(b.parent.index()).map_or(f64::NAN, |n| n.birth_time);
            cmp_parent_blocks((ta, a.parent), (tb, b.parent)).then_with(|| a.child.cmp(&b.child))
        });
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EdgeTable {
    type Item = &'a Edge;
    type IntoIter = core::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{SEQUENCE_LENGTH, SEQUENCE_START};

    #[test]
    fn rejects_empty_interval() {
        let mut edges = EdgeTable::new();
        let err = edges.add_row(0.5, 0.5, NodeId::new(0), NodeId::new(1));
        assert!(matches!(err, Err(TableError::BadInterval { .. })));
        assert!(edges.is_empty());
    }

    #[test]
    fn rejects_inverted_interval() {
        let mut edges = EdgeTable::new();
        let err = edges.add_row(1.0, 0.0, NodeId::new(0), NodeId::new(1));
        assert!(matches!(err, Err(TableError::BadInterval { .. })));
    }

    #[test]
    fn sort_orders_by_time_desc_then_parent_then_child() {
        let mut nodes = NodeTable::new();
        // ids 0..=2 born at t=0, ids 3..=4 at t=1, id 5 at t=2.
        for _ in 0..3 {
            nodes.add_row(0.0);
        }
        for _ in 0..2 {
            nodes.add_row(1.0);
        }
        nodes.add_row(2.0);

        let mut edges = EdgeTable::new();
        let rows = [
            (NodeId::new(0), NodeId::new(4)),
            (NodeId::new(4), NodeId::new(5)),
            (NodeId::new(1), NodeId::new(3)),
            (NodeId::new(0), NodeId::new(3)),
        ];
        for (parent, child) in rows {
            edges
                .add_row(SEQUENCE_START, SEQUENCE_LENGTH, parent, child)
                .unwrap();
        }
        edges.sort_canonical(&nodes).unwrap();

        let order: Vec<(usize, usize)> = edges
            .iter()
            .map(|e| (e.parent.index(), e.child.index()))
            .collect();
        // t=1 parent first, then the t=0 parents ascending, children ascending.
        assert_eq!(order, vec![(4, 5), (0, 3), (0, 4), (1, 3)]);
    }

    #[test]
    fn sort_reports_unknown_nodes() {
        let mut nodes = NodeTable::new();
        nodes.add_row(0.0);
        let mut edges = EdgeTable::new();
        edges
            .add_row(SEQUENCE_START, SEQUENCE_LENGTH, NodeId::new(0), NodeId::new(9))
            .unwrap();
        assert!(matches!(
            edges.sort_canonical(&nodes),
            Err(TableError::UnknownNode { .. })
        ));
    }
}
