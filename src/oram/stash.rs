use crate::oram::error::OramError;
use crate::oram::oob_tree::BlockHeader;
use crate::oram::{BlockId, Leaf};

/// Bounded trusted buffer holding blocks between the read phase and their
/// writeback. Entries are kept in insertion order in a flat table; the stash
/// stays small in a healthy configuration, so linear lookups are fine.
///
/// The writeback phase walks the stash with an internal cursor: `next`
/// yields entries one at a time, returns `None` once the current snapshot is
/// exhausted, and wraps to the first entry on the call after that. Removing
/// the entry just yielded is safe; the cursor is adjusted past the deletion.
#[derive(Debug)]
pub struct Stash {
    capacity: usize,
    entries: Vec<BlockHeader>,
    cursor: usize,
}

impl Stash {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn occupancy_percent(&self) -> f64 {
        self.entries.len() as f64 / self.capacity as f64 * 100.0
    }

    pub fn add(&mut self, header: BlockHeader) -> Result<(), OramError> {
        if self.entries.len() >= self.capacity {
            return Err(OramError::StashOverflow {
                block_id: header.block_id,
                capacity: self.capacity,
            });
        }
        self.entries.push(header);
        Ok(())
    }

    pub fn remove(&mut self, block_id: BlockId) -> bool {
        match self.position(block_id) {
            Some(pos) => {
                self.entries.remove(pos);
                if pos < self.cursor {
                    self.cursor -= 1;
                }
                true
            }
            None => false,
        }
    }

    pub fn remap(&mut self, block_id: BlockId, new_leaf: Leaf) -> Result<(), OramError> {
        let pos = self
            .position(block_id)
            .ok_or(OramError::MissingPositionEntry { block_id })?;
        self.entries[pos].leaf = new_leaf;
        Ok(())
    }

    pub fn leaf_of(&self, block_id: BlockId) -> Option<Leaf> {
        self.position(block_id).map(|pos| self.entries[pos].leaf)
    }

    pub fn contains(&self, block_id: BlockId) -> bool {
        self.position(block_id).is_some()
    }

    pub fn entries(&self) -> &[BlockHeader] {
        &self.entries
    }

    /// Rewind the traversal cursor to the first entry.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Yield the entry under the cursor and advance. `None` signals the end
    /// of the snapshot; the cursor rewinds so the following call starts over.
    pub fn next(&mut self) -> Option<BlockHeader> {
        if self.cursor >= self.entries.len() {
            self.cursor = 0;
            return None;
        }
        let entry = self.entries[self.cursor];
        self.cursor += 1;
        Some(entry)
    }

    fn position(&self, block_id: BlockId) -> Option<usize> {
        self.entries.iter().position(|e| e.block_id == block_id)
    }

    pub fn dump(&self) {
        log::debug!(
            "stash ({}/{} entries):",
            self.entries.len(),
            self.capacity
        );
        for entry in &self.entries {
            log::debug!("  block {} -> leaf {}", entry.block_id, entry.leaf);
        }
    }
}
