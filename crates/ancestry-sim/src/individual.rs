//! Diploid individuals and the fixed-size population they live in.

use ancestry_simplify::IdMap;
use ancestry_tables::{NodeId, NodeTable, generation_time};

use crate::error::SimulationError;

/// One diploid individual occupying a population slot.
///
/// A slot is either backed by two live genome nodes or is awaiting the
/// replacement decided earlier in the current generation. There is no
/// sentinel id; a pending slot simply has no nodes to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Individual {
    /// A living individual and its two genome nodes.
    Alive {
        /// First genome copy.
        node0: NodeId,
        /// Second genome copy.
        node1: NodeId,
    },
    /// The individual died this generation and its successor has not been
    /// installed yet.
    PendingReplacement,
}

/// The population: a fixed number of slots, one individual per slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationState {
    slots: Vec<Individual>,
}

impl PopulationState {
    /// Creates the founder population, registering two birth-time-zero nodes
    /// per individual in `nodes`.
    ///
    /// Slot `i` owns nodes `2 * i` and `2 * i + 1`.
    pub fn founders(population_size: usize, nodes: &mut NodeTable) -> Self {
        let mut slots = Vec::with_capacity(population_size);
        for _ in 0..population_size {
            let node0 = nodes.add_row(generation_time(0));
            let node1 = nodes.add_row(generation_time(0));
            slots.push(Individual::Alive { node0, node1 });
        }
        Self { slots }
    }

    /// Number of population slots.
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the population has no slots.
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The individual in `slot`, if the slot exists.
    pub fn get(&self, slot: usize) -> Option<&Individual> {
        self.slots.get(slot)
    }

    /// The two genome nodes of the individual in `slot`.
    ///
    /// Reading a slot that is pending replacement is a driver bug and
    /// reports [`SimulationError::StaleReference`] rather than handing out
    /// nodes that are about to be retired.
    pub fn alive_nodes_of(&self, slot: usize) -> Result<(NodeId, NodeId), SimulationError> {
        match self.slots.get(slot) {
            Some(Individual::Alive { node0, node1 }) => Ok((*node0, *node1)),
            Some(Individual::PendingReplacement) => {
                Err(SimulationError::StaleReference { slot })
            }
            None => Err(SimulationError::SlotOutOfRange { slot }),
        }
    }

    /// All currently alive genome nodes, in slot order.
    ///
    /// Errors if any slot is pending replacement; callers collect the alive
    /// set only between generations, when every slot is settled.
    pub fn alive_nodes(&self) -> Result<Vec<NodeId>, SimulationError> {
        let mut nodes = Vec::with_capacity(self.slots.len().saturating_mul(2));
        for slot in 0..self.slots.len() {
            let (node0, node1) = self.alive_nodes_of(slot)?;
            nodes.push(node0);
            nodes.push(node1);
        }
        Ok(nodes)
    }

    /// Marks `slot` as dying this generation.
    pub fn mark_pending(&mut self, slot: usize) -> Result<(), SimulationError> {
        match self.slots.get_mut(slot) {
            Some(individual @ Individual::Alive { .. }) => {
                *individual = Individual::PendingReplacement;
                Ok(())
            }
            Some(Individual::PendingReplacement) => {
                Err(SimulationError::StaleReference { slot })
            }
            None => Err(SimulationError::SlotOutOfRange { slot }),
        }
    }

    /// Installs the newborn replacing the individual in `slot`.
    ///
    /// The slot must have been marked pending first; replacing a live
    /// individual would silently drop its nodes from the alive set.
    pub fn replace(
        &mut self,
        slot: usize,
        node0: NodeId,
        node1: NodeId,
    ) -> Result<(), SimulationError> {
        match self.slots.get_mut(slot) {
            Some(individual @ Individual::PendingReplacement) => {
                *individual = Individual::Alive { node0, node1 };
                Ok(())
            }
            Some(Individual::Alive { .. }) => Err(SimulationError::SlotNotPending { slot }),
            None => Err(SimulationError::SlotOutOfRange { slot }),
        }
    }

    /// Rewrites every slot's node ids through `idmap` after a
    /// simplification pass.
    ///
    /// Every alive node is a simplification sample, so each must survive
    /// the pass; a missing mapping means the sample set handed to the
    /// simplifier was wrong.
    pub fn remap(&mut self, idmap: &IdMap) -> Result<(), SimulationError> {
        for (slot, individual) in self.slots.iter_mut().enumerate() {
            match individual {
                Individual::Alive { node0, node1 } => {
                    *node0 = idmap
                        .map(*node0)
                        .ok_or(SimulationError::DanglingAliveNode { slot, node: *node0 })?;
                    *node1 = idmap
                        .map(*node1)
                        .ok_or(SimulationError::DanglingAliveNode { slot, node: *node1 })?;
                }
                Individual::PendingReplacement => {
                    return Err(SimulationError::StaleReference { slot });
                }
            }
        }
        Ok(())
    }

    /// Iterates over the individuals in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.slots.iter()
    }
}
