//! Per-parse generator for node IDs.
//!
//! Every `parse` call owns one generator, so parsers stay free of shared
//! mutable state and node IDs are deterministic for a given source.

use super::NodeId;
use std::num::NonZeroU32;

/// Sequential node ID generator.
///
/// - IDs start at 1 (never 0)
/// - IDs are never reused within one generator
/// - Not thread-safe on purpose: one generator per parse
#[derive(Debug, Clone)]
pub struct NodeIdGenerator {
    next_id: NonZeroU32,
}

impl NodeIdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: NonZeroU32::MIN,
        }
    }

    /// Returns the next ID and advances the generator.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX - 1` nodes are allocated from one generator.
    pub fn next_id(&mut self) -> NodeId {
        let current = self.next_id;

        self.next_id = current
            .checked_add(1)
            .expect("Node id overflow - tree has more than 4 billion nodes");

        NodeId(current.get())
    }

    /// Number of IDs handed out so far.
    #[must_use]
    pub fn current_count(&self) -> u32 {
        self.next_id.get() - 1
    }
}

impl Default for NodeIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
