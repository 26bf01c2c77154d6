//! The old-to-new node id map returned by simplification.

use ancestry_tables::NodeId;

/// Mapping from pre-simplification node ids to post-simplification ids.
///
/// `None` marks a pruned node. Ids out of range also map to `None`; a
/// well-behaved caller never asks, but the answer is still the truthful
/// "that node does not survive".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    /// One entry per pre-simplification node, in id order.
    map: Vec<Option<NodeId>>,
}

impl IdMap {
    /// Build an id map from one entry per old node.
    pub const fn from_entries(map: Vec<Option<NodeId>>) -> Self {
        Self { map }
    }

    /// Number of pre-simplification nodes covered.
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map covers no nodes.
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The new id for `old`, or `None` if it was pruned.
    pub fn map(&self, old: NodeId) -> Option<NodeId> {
        self.map.get(old.index()).copied().flatten()
    }

    /// Whether every node survives with its own id (a no-op remap).
    pub fn is_identity(&self) -> bool {
        self.map
            .iter()
            .enumerate()
            .all(|(index, entry)| *entry == Some(NodeId::new(index)))
    }

    /// Iterate over `(old, new)` pairs in old-id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Option<NodeId>)> + '_ {
        self.map
            .iter()
            .enumerate()
            .map(|(index, entry)| (NodeId::new(index), *entry))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn maps_and_reports_pruning() {
        let map = IdMap::from_entries(vec![Some(NodeId::new(0)), None, Some(NodeId::new(1))]);
        assert_eq!(map.map(NodeId::new(0)), Some(NodeId::new(0)));
        assert_eq!(map.map(NodeId::new(1)), None);
        assert_eq!(map.map(NodeId::new(2)), Some(NodeId::new(1)));
        assert_eq!(map.map(NodeId::new(99)), None);
        assert!(!map.is_identity());
    }

    #[test]
    fn identity_detection() {
        let map = IdMap::from_entries(vec![Some(NodeId::new(0)), Some(NodeId::new(1))]);
        assert!(map.is_identity());
    }
}
