//! The typed node identifier.
//!
//! Node ids are dense sequential indexes into the [`NodeTable`]: the id of a
//! node is its row number at creation time. Ids are assigned in strictly
//! increasing order and never reused; the simplification engine returns an
//! id map rather than renumbering in place, so a [`NodeId`] is only
//! meaningful relative to the table generation it was issued for.
//!
//! [`NodeTable`]: crate::nodes::NodeTable

use serde::{Deserialize, Serialize};

/// Index of a node (one genome copy) in the node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw row index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the raw row index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn id_orders_by_creation_index() {
        assert!(NodeId::new(3) < NodeId::new(7));
        assert_eq!(NodeId::new(5).index(), 5);
    }

    #[test]
    fn id_serializes_transparently() {
        let json = serde_json::to_string(&NodeId::new(12)).unwrap();
        assert_eq!(json, "12");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeId::new(12));
    }
}
