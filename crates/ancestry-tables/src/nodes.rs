//! Node records and the append-only node table.
//!
//! A [`Node`] represents one genome copy with its birth time. The
//! [`NodeTable`] grows monotonically during a run; rows are never mutated
//! or removed in place. Compaction happens only through the simplification
//! engine, which builds a *new* table and an id map rather than editing
//! this one.

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

/// One genome copy: an immutable record of a birth time.
///
/// Times are forward generation counts (see the crate-level docs).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Generation in which this node was created. Founders are `0.0`.
    pub birth_time: f64,
}

/// Append-only list of [`Node`] rows, indexed by [`NodeId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTable {
    /// All nodes, in creation order.
    nodes: Vec<Node>,
}

impl NodeTable {
    /// Create an empty node table.
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Return the number of nodes.
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return whether the table has no rows.
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node born at `birth_time` and return its id.
    ///
    /// Ids are strictly increasing in creation order and never reused.
    pub fn add_row(&mut self, birth_time: f64) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node { birth_time });
        id
    }

    /// Return the node with the given id, if it is in range.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Return the birth time of `id`, if it is in range.
    pub fn birth_time(&self, id: NodeId) -> Option<f64> {
        self.get(id).map(|n| n.birth_time)
    }

    /// Return whether `id` refers to a row of this table.
    pub const fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Iterate over all rows in creation order.
    pub fn iter(&self) -> core::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    /// View the rows as a slice.
    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    /// Collect every birth time in row order.
    pub fn birth_times(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.birth_time).collect()
    }
}

impl<'a> IntoIterator for &'a NodeTable {
    type Item = &'a Node;
    type IntoIter = core::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
