//! The reduction pass.
//!
//! One walk over the canonically ordered edge table, newest parent blocks
//! first. Because children are strictly younger than their parents, a
//! child's own block (if any) has already been processed when its
//! parent's block is reached, so every child's lineage is final by the
//! time it is read. Each node's lineage is the kept node representing its
//! sample-restricted subtree:
//!
//! - a sample maps to itself and is always kept;
//! - a non-sample parent whose children contribute one lineage is unary
//!   and squashed (its lineage becomes that child's);
//! - a non-sample parent whose children contribute two or more lineages
//!   coalesces and is kept, with one output edge per lineage;
//! - a parent with no contributing children is pruned.

use ancestry_tables::{
    Edge, EdgeTable, InvariantError, NodeId, NodeTable, TableError, validate_edge_table,
};

use crate::idmap::IdMap;

/// Errors produced by the simplification engine.
#[derive(Debug, thiserror::Error)]
pub enum SimplifyError {
    /// The input table is not in canonical simplify-ready order.
    #[error("input edge table is not simplify-ready: {source}")]
    Input {
        /// The underlying violation.
        source: InvariantError,
    },

    /// A sample id has no row in the node table.
    #[error("sample node {node} is out of range")]
    SampleOutOfRange {
        /// The offending sample id.
        node: NodeId,
    },

    /// The same node was passed as a sample twice.
    #[error("sample node {node} appears more than once")]
    DuplicateSample {
        /// The duplicated sample id.
        node: NodeId,
    },

    /// A sample failed to survive the reduction. Never expected; a
    /// violation of the engine's own contract.
    #[error("sample node {node} was pruned by simplification")]
    SamplePruned {
        /// The sample that lost its mapping.
        node: NodeId,
    },

    /// A kept node lost its renumbering while emitting edges. Never
    /// expected; a violation of the engine's own contract.
    #[error("kept node {node} has no renumbering")]
    LostNode {
        /// The node with no new id.
        node: NodeId,
    },

    /// The reduced table failed the invariant validator.
    #[error("simplified table violates edge-table invariants: {source}")]
    Output {
        /// The underlying violation.
        source: InvariantError,
    },

    /// An edge row was rejected while emitting the reduced table.
    #[error("edge rejected during simplification: {source}")]
    Table {
        /// The underlying table error.
        #[from]
        source: TableError,
    },
}

/// The reduced tables plus the old-to-new id map.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyOutput {
    /// Reduced node table (surviving nodes, relative order preserved).
    pub nodes: NodeTable,
    /// Reduced edge table, canonically ordered.
    pub edges: EdgeTable,
    /// Old-to-new id map; `None` for pruned nodes.
    pub idmap: IdMap,
}

/// Reduce `(nodes, edges)` to the ancestry of `samples`.
///
/// Pure: the inputs are never mutated. See the crate docs for the
/// guarantees on the output.
///
/// # Errors
///
/// Caller errors: unsorted input, out-of-range or duplicate samples.
/// Everything else is an internal contract violation and fatal.
pub fn simplify(
    nodes: &NodeTable,
    edges: &EdgeTable,
    samples: &[NodeId],
) -> Result<SimplifyOutput, SimplifyError> {
    validate_edge_table(nodes, edges).map_err(|source| SimplifyError::Input { source })?;

    let num_nodes = nodes.len();
    let mut is_sample = vec![false; num_nodes];
    for s in samples {
        let slot = is_sample
            .get_mut(s.index())
            .ok_or(SimplifyError::SampleOutOfRange { node: *s })?;
        if *slot {
            return Err(SimplifyError::DuplicateSample { node: *s });
        }
        *slot = true;
    }

    // lineage[u]: the kept node representing u's sample-restricted subtree.
    let mut lineage: Vec<Option<NodeId>> = is_sample
        .iter()
        .enumerate()
        .map(|(index, sampled)| sampled.then_some(NodeId::new(index)))
        .collect();
    let mut keep = is_sample.clone();

    // Kept parent blocks in emission order, children as old-space reps.
    let mut blocks: Vec<(NodeId, Vec<Edge>)> = Vec::new();

    let rows = edges.as_slice();
    let mut offset = 0usize;
    while let Some(first) = rows.get(offset) {
        let parent = first.parent;
        let mut mapped: Vec<Edge> = Vec::new();
        while let Some(edge) = rows.get(offset) {
            if edge.parent != parent {
                break;
            }
            if let Some(rep) = lineage.get(edge.child.index()).copied().flatten() {
                mapped.push(Edge {
                    left: edge.left,
                    right: edge.right,
                    parent,
                    child: rep,
                });
            }
            offset = offset.saturating_add(1);
        }

        let sampled = is_sample.get(parent.index()).copied().unwrap_or(false);
        if sampled || mapped.len() > 1 {
            if !mapped.is_empty() {
                // Distinct children live in disjoint subtrees, so reps are
                // distinct; sorting restores ascending child order after
                // unary squashing.
                mapped.sort_by(|a, b| a.child.cmp(&b.child));
                blocks.push((parent, mapped));
            }
            if let Some(slot) = keep.get_mut(parent.index()) {
                *slot = true;
            }
            if let Some(slot) = lineage.get_mut(parent.index()) {
                *slot = Some(parent);
            }
        } else if let Some(rep) = mapped.first().map(|e| e.child)
            && let Some(slot) = lineage.get_mut(parent.index())
        {
            // Unary pass-through: the parent adds no information about
            // the samples and is squashed out.
            *slot = Some(rep);
        }
    }

    // Monotone renumbering: surviving nodes keep their relative order.
    let mut entries: Vec<Option<NodeId>> = vec![None; num_nodes];
    let mut out_nodes = NodeTable::new();
    for (index, (kept, node)) in keep.iter().zip(nodes.iter()).enumerate() {
        if *kept {
            let new_id = out_nodes.add_row(node.birth_time);
            if let Some(entry) = entries.get_mut(index) {
                *entry = Some(new_id);
            }
        }
    }

    let mut out_edges = EdgeTable::new();
    for (parent, mapped) in blocks {
        let new_parent = entries
            .get(parent.index())
            .copied()
            .flatten()
            .ok_or(SimplifyError::LostNode { node: parent })?;
        for edge in mapped {
            let new_child = entries
                .get(edge.child.index())
                .copied()
                .flatten()
                .ok_or(SimplifyError::LostNode { node: edge.child })?;
            out_edges.add_row(edge.left, edge.right, new_parent, new_child)?;
        }
    }

    let idmap = IdMap::from_entries(entries);
    for s in samples {
        if idmap.map(*s).is_none() {
            return Err(SimplifyError::SamplePruned { node: *s });
        }
    }
    validate_edge_table(&out_nodes, &out_edges)
        .map_err(|source| SimplifyError::Output { source })?;

    Ok(SimplifyOutput {
        nodes: out_nodes,
        edges: out_edges,
        idmap,
    })
}
