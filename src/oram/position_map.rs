use std::collections::HashMap;

use crate::oram::error::OramError;
use crate::oram::{BlockId, Leaf};

/// Flat mapping from block identifier to its currently assigned leaf, held
/// entirely in trusted storage (no recursion). One entry per block ever
/// accessed; entries are mutated in place on remap.
#[derive(Debug, Default)]
pub struct PositionMap {
    entries: HashMap<BlockId, Leaf>,
    num_entries: u64,
    num_remaps: u64,
}

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps the existing leaf) if the block is already mapped.
    pub fn add(&mut self, block_id: BlockId, leaf: Leaf) -> bool {
        use std::collections::hash_map::Entry;
        match self.entries.entry(block_id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(leaf);
                self.num_entries += 1;
                true
            }
        }
    }

    pub fn remove(&mut self, block_id: BlockId) -> bool {
        self.entries.remove(&block_id).is_some()
    }

    pub fn remap(&mut self, block_id: BlockId, new_leaf: Leaf) -> Result<(), OramError> {
        let entry = self
            .entries
            .get_mut(&block_id)
            .ok_or(OramError::MissingPositionEntry { block_id })?;
        *entry = new_leaf;
        self.num_remaps += 1;
        Ok(())
    }

    pub fn leaf_of(&self, block_id: BlockId) -> Option<Leaf> {
        self.entries.get(&block_id).copied()
    }

    pub fn contains(&self, block_id: BlockId) -> bool {
        self.entries.contains_key(&block_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total entries ever created.
    pub fn num_entries(&self) -> u64 {
        self.num_entries
    }

    /// Total remaps performed.
    pub fn num_remaps(&self) -> u64 {
        self.num_remaps
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Leaf)> {
        self.entries.iter()
    }

    pub fn dump(&self) {
        log::debug!("position map ({} entries):", self.entries.len());
        for (block_id, leaf) in &self.entries {
            log::debug!("  block {} -> leaf {}", block_id, leaf);
        }
    }
}
