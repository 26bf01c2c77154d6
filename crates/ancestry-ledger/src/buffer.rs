//! The per-parent edge buffer arena.
//!
//! Between simplifications, every new inheritance edge lands here instead
//! of in the persisted edge table. The buffer is an arena indexed by node
//! id with one slot for **every** node ever created -- dead or alive,
//! parent or not. Nodes that never transmit simply keep an empty list;
//! the stitcher skips them. Keeping the arena dense makes the reset after
//! a remap a single unambiguous [`EdgeBuffer::clear_and_resize`] call, so
//! no stale entry can outlive the node ids it referenced.
//!
//! Within one slot, births are appended chronologically, which for node
//! ids means strictly ascending child ids. That ordering is what the
//! stitcher relies on to extend a parent's persisted block without
//! re-sorting it.

use ancestry_tables::{EdgeTable, NodeId, TableError};

/// Errors produced while recording births.
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    /// The genomic interval is empty or inverted.
    #[error("bad genomic interval [{left}, {right}) buffered for parent {parent}")]
    BadInterval {
        /// Left end of the rejected interval.
        left: f64,
        /// Right end of the rejected interval.
        right: f64,
        /// Parent the edge was buffered under.
        parent: NodeId,
    },

    /// A birth named a parent the arena has never seen.
    #[error("parent {parent} is outside the buffer arena of {num_nodes} nodes")]
    UnknownParent {
        /// The out-of-range parent id.
        parent: NodeId,
        /// Arena size at the time of the failure.
        num_nodes: usize,
    },

    /// A birth arrived out of chronological order for its parent.
    #[error(
        "child {child} buffered for parent {parent} does not follow previous \
         child {previous}; births must arrive in creation order"
    )]
    UnorderedChild {
        /// Parent the edge was buffered under.
        parent: NodeId,
        /// Most recent child already buffered for this parent.
        previous: NodeId,
        /// The offending child id.
        child: NodeId,
    },

    /// Forwarded table error from the direct-recording pipeline.
    #[error("edge table rejected a recorded birth: {source}")]
    Table {
        /// The underlying table error.
        #[from]
        source: TableError,
    },
}

/// One buffered birth. The parent is implied by the arena slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedEdge {
    /// Left end of the inherited interval (inclusive).
    pub left: f64,
    /// Right end of the inherited interval (exclusive).
    pub right: f64,
    /// The inheriting node.
    pub child: NodeId,
}

/// Sink for the generation driver's new inheritance edges.
///
/// Implemented by [`EdgeBuffer`] (incremental pipeline) and by
/// [`EdgeTable`] (classic pipeline, direct append).
pub trait RecordBirth {
    /// Record one parent-to-child transmission over `[left, right)`.
    fn record_birth(
        &mut self,
        parent: NodeId,
        left: f64,
        right: f64,
        child: NodeId,
    ) -> Result<(), BufferError>;
}

/// Arena of buffered births, indexed by parent node id.
#[derive(Debug, Clone, Default)]
pub struct EdgeBuffer {
    /// `births[p]` holds the births transmitted by node `p`, in
    /// chronological (ascending child id) order.
    births: Vec<Vec<BufferedEdge>>,
}

impl EdgeBuffer {
    /// Create a buffer spanning `num_nodes` already-existing nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            births: vec![Vec::new(); num_nodes],
        }
    }

    /// Number of node slots the arena currently spans.
    pub const fn num_nodes(&self) -> usize {
        self.births.len()
    }

    /// Total number of buffered births across all parents.
    pub fn total_births(&self) -> usize {
        self.births.iter().map(Vec::len).sum()
    }

    /// Whether every slot is empty (all births flushed or none recorded).
    pub fn is_fully_flushed(&self) -> bool {
        self.births.iter().all(Vec::is_empty)
    }

    /// The births transmitted by `parent`, oldest first.
    ///
    /// Slots outside the arena read as empty, matching the semantics of a
    /// node that never transmitted.
    pub fn births(&self, parent: NodeId) -> &[BufferedEdge] {
        self.births.get(parent.index()).map_or(&[], Vec::as_slice)
    }

    /// Whether `parent` has any buffered births.
    pub fn has_births(&self, parent: NodeId) -> bool {
        !self.births(parent).is_empty()
    }

    /// Drop every buffered birth and resize the arena to `num_nodes`
    /// empty slots.
    ///
    /// The single reset point, called once per cycle immediately after the
    /// simplification remap. `num_nodes` must be the size of the *new*
    /// node table so that no slot can reference a pruned id.
    pub fn clear_and_resize(&mut self, num_nodes: usize) {
        self.births.clear();
        self.births.resize(num_nodes, Vec::new());
    }
}

impl RecordBirth for EdgeBuffer {
    /// Buffer one birth under its parent slot.
    ///
    /// Grows the arena to cover the child, so after every recorded
    /// generation the arena spans every node created so far (each new node
    /// is the child of exactly one recorded edge).
    fn record_birth(
        &mut self,
        parent: NodeId,
        left: f64,
        right: f64,
        child: NodeId,
    ) -> Result<(), BufferError> {
        if right <= left {
            return Err(BufferError::BadInterval {
                left,
                right,
                parent,
            });
        }
        if parent.index() >= self.births.len() {
            // Parents exist before their children; an uncovered parent is
            // a caller bug, not a growth case.
            return Err(BufferError::UnknownParent {
                parent,
                num_nodes: self.births.len(),
            });
        }
        if self.births.len() <= child.index() {
            self.births
                .resize(child.index().saturating_add(1), Vec::new());
        }
        let num_nodes = self.births.len();
        let slot = self
            .births
            .get_mut(parent.index())
            .ok_or(BufferError::UnknownParent { parent, num_nodes })?;
        if let Some(last) = slot.last()
            && child <= last.child
        {
            return Err(BufferError::UnorderedChild {
                parent,
                previous: last.child,
                child,
            });
        }
        slot.push(BufferedEdge { left, right, child });
        Ok(())
    }
}

impl RecordBirth for EdgeTable {
    /// Append one birth directly to the table (classic pipeline). The
    /// table is unordered until its final global sort.
    fn record_birth(
        &mut self,
        parent: NodeId,
        left: f64,
        right: f64,
        child: NodeId,
    ) -> Result<(), BufferError> {
        self.add_row(left, right, parent, child)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn arena_grows_to_cover_every_child() {
        let mut buffer = EdgeBuffer::new(4);
        buffer
            .record_birth(NodeId::new(1), 0.0, 1.0, NodeId::new(4))
            .unwrap();
        buffer
            .record_birth(NodeId::new(3), 0.0, 1.0, NodeId::new(5))
            .unwrap();
        assert_eq!(buffer.num_nodes(), 6);
        assert_eq!(buffer.total_births(), 2);
        assert_eq!(buffer.births(NodeId::new(1)).len(), 1);
        assert!(buffer.births(NodeId::new(0)).is_empty());
        // Out-of-range parents read as "never transmitted".
        assert!(buffer.births(NodeId::new(99)).is_empty());
    }

    #[test]
    fn children_must_arrive_in_creation_order() {
        let mut buffer = EdgeBuffer::new(2);
        buffer
            .record_birth(NodeId::new(0), 0.0, 1.0, NodeId::new(5))
            .unwrap();
        let err = buffer.record_birth(NodeId::new(0), 0.0, 1.0, NodeId::new(3));
        assert!(matches!(err, Err(BufferError::UnorderedChild { .. })));
    }

    #[test]
    fn rejects_parent_outside_arena() {
        let mut buffer = EdgeBuffer::new(2);
        let err = buffer.record_birth(NodeId::new(9), 0.0, 1.0, NodeId::new(10));
        assert!(matches!(err, Err(BufferError::UnknownParent { .. })));
    }

    #[test]
    fn rejects_empty_interval() {
        let mut buffer = EdgeBuffer::new(2);
        let err = buffer.record_birth(NodeId::new(0), 0.3, 0.3, NodeId::new(1));
        assert!(matches!(err, Err(BufferError::BadInterval { .. })));
    }

    #[test]
    fn clear_and_resize_leaves_empty_slots_only() {
        let mut buffer = EdgeBuffer::new(2);
        buffer
            .record_birth(NodeId::new(0), 0.0, 1.0, NodeId::new(2))
            .unwrap();
        assert!(!buffer.is_fully_flushed());
        buffer.clear_and_resize(7);
        assert!(buffer.is_fully_flushed());
        assert_eq!(buffer.num_nodes(), 7);
        assert_eq!(buffer.total_births(), 0);
    }

    #[test]
    fn edge_table_sink_appends_directly() {
        let mut table = EdgeTable::new();
        table
            .record_birth(NodeId::new(0), 0.0, 1.0, NodeId::new(2))
            .unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(
            table.record_birth(NodeId::new(0), 1.0, 0.0, NodeId::new(3)),
            Err(BufferError::Table { .. })
        ));
    }
}
