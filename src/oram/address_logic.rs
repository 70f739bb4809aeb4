use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::oram::error::OramError;
use crate::oram::oob_tree::{BlockHeader, OobTree};
use crate::oram::tree_info::TreeInfo;
use crate::oram::{Addr, BlockId, Leaf};

/// Turns a leaf into the concrete memory traffic of a path access: header
/// addresses and data addresses in root-to-leaf order, plus the writeback
/// slot decisions at the end of a transaction.
///
/// Levels are counted from the leaf: level 0 is the leaf bucket, level
/// `depth` is the root. The writeback phase iterates the level counter from
/// `depth` down to 0 and drains each generator to its sentinel before
/// advancing, so the internal cursors never carry state across phases.
#[derive(Debug)]
pub struct AddressLogic {
    tree: TreeInfo,
    base_address_headers: Addr,
    cursor: usize,
    dummy_slot: usize,
    rng: StdRng,
}

impl AddressLogic {
    pub fn new(tree: TreeInfo, seed: u64) -> Self {
        // Header blocks live in their own region past the data buckets,
        // Z/(Z+1) of the way into the tree extent.
        let z = tree.z_blocks() as u64;
        let base_address_headers = (tree.length() - tree.base_address()) * z / (z + 1);
        Self {
            tree,
            base_address_headers,
            cursor: 0,
            dummy_slot: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn tree(&self) -> &TreeInfo {
        &self.tree
    }

    pub fn base_address_headers(&self) -> Addr {
        self.base_address_headers
    }

    /// Bucket indexes from the root down to `leaf`, length `depth + 1`.
    pub fn path_indexes(&self, leaf: Leaf) -> Vec<u64> {
        let mut indexes = Vec::with_capacity(self.tree.levels());
        let mut node = leaf as u64 + self.tree.num_leaves();
        while node > 0 {
            indexes.push(node - 1);
            node /= self.tree.arity();
        }
        indexes.reverse();
        indexes
    }

    /// All `Z * (depth + 1)` data-block addresses along the path, root first,
    /// slot order within each bucket.
    pub fn data_addresses(&self, leaf: Leaf) -> Vec<Addr> {
        let mut addrs = Vec::with_capacity(self.tree.levels() * self.tree.z_blocks());
        for idx in self.path_indexes(leaf) {
            let bucket_base = self.tree.base_address() + idx * self.tree.bucket_size();
            for slot in 0..self.tree.z_blocks() as u64 {
                addrs.push(bucket_base + slot * self.tree.block_size());
            }
        }
        addrs
    }

    /// One header address per bucket along the path, root first.
    pub fn header_addresses(&self, leaf: Leaf) -> Vec<Addr> {
        self.path_indexes(leaf)
            .into_iter()
            .map(|idx| self.base_address_headers + idx * self.tree.block_size())
            .collect()
    }

    /// Cursor-driven variant of `header_addresses`: one address per call,
    /// `None` once the path is exhausted (the cursor then rewinds).
    pub fn generate_next_header_address(&mut self, leaf: Leaf) -> Option<Addr> {
        let addrs = self.header_addresses(leaf);
        self.advance_cursor(&addrs)
    }

    /// Cursor-driven variant of `data_addresses`.
    pub fn generate_next_data_address(&mut self, leaf: Leaf) -> Option<Addr> {
        let addrs = self.data_addresses(leaf);
        self.advance_cursor(&addrs)
    }

    fn advance_cursor(&mut self, addrs: &[Addr]) -> Option<Addr> {
        if self.cursor >= addrs.len() {
            self.cursor = 0;
            return None;
        }
        let addr = addrs[self.cursor];
        self.cursor += 1;
        Some(addr)
    }

    /// Materialise every bucket along the path. Idempotent.
    pub fn init_path(&self, leaf: Leaf, oob: &mut OobTree) {
        for idx in self.path_indexes(leaf) {
            oob.insert_bucket(idx, self.tree.z_blocks());
        }
    }

    /// Place a never-seen block somewhere on its path: pick a bucket on the
    /// path uniformly at random and take its first free slot, retrying with a
    /// fresh bucket up to 100 times.
    pub fn init_block(
        &mut self,
        block_id: BlockId,
        leaf: Leaf,
        oob: &mut OobTree,
    ) -> Result<(), OramError> {
        let indexes = self.path_indexes(leaf);
        for _ in 0..100 {
            let bucket_index = indexes[self.rng.gen_range(0..indexes.len())];
            for slot in 0..self.tree.z_blocks() {
                if oob.is_dummy(bucket_index, slot)? {
                    oob.insert_header(bucket_index, slot, BlockHeader::new(block_id, leaf))?;
                    return Ok(());
                }
            }
        }
        Err(OramError::InitBlockFailed { block_id, leaf })
    }

    /// Bucket index at `level` (counted from the leaf) on the path to `leaf`.
    fn bucket_at_level(&self, leaf: Leaf, level: usize) -> u64 {
        let indexes = self.path_indexes(leaf);
        indexes[indexes.len() - 1 - level]
    }

    /// True iff the paths to `leaf1` and `leaf2` run through the same bucket
    /// at `level`. A stash entry mapped to `leaf2` may only be written back
    /// into the current path at levels where this holds.
    pub fn common_bucket(&self, leaf1: Leaf, leaf2: Leaf, level: usize) -> bool {
        self.bucket_at_level(leaf1, level) == self.bucket_at_level(leaf2, level)
    }

    /// Claim the first free slot of the bucket at (`leaf`, `level`) for
    /// `block_id`, recording the placement out of band. Returns the physical
    /// address of the claimed slot, or `None` when the bucket is full.
    pub fn writeback_data(
        &mut self,
        leaf: Leaf,
        level: usize,
        block_id: BlockId,
        oob: &mut OobTree,
    ) -> Result<Option<Addr>, OramError> {
        let bucket_index = self.bucket_at_level(leaf, level);
        for slot in 0..self.tree.z_blocks() {
            if oob.is_dummy(bucket_index, slot)? {
                oob.insert_header(bucket_index, slot, BlockHeader::new(block_id, leaf))?;
                return Ok(Some(self.slot_address(bucket_index, slot)));
            }
        }
        Ok(None)
    }

    /// Address of the next still-free slot of the bucket at (`leaf`, `level`),
    /// without touching the out-of-band state: the write stays a dummy. The
    /// internal slot counter advances per call and rewinds when it signals
    /// `None`, so the caller must drain a level before moving to the next.
    pub fn writeback_dummy(
        &mut self,
        leaf: Leaf,
        level: usize,
        oob: &OobTree,
    ) -> Result<Option<Addr>, OramError> {
        let bucket_index = self.bucket_at_level(leaf, level);
        while self.dummy_slot < self.tree.z_blocks() {
            let slot = self.dummy_slot;
            self.dummy_slot += 1;
            if oob.is_dummy(bucket_index, slot)? {
                return Ok(Some(self.slot_address(bucket_index, slot)));
            }
        }
        self.dummy_slot = 0;
        Ok(None)
    }

    fn slot_address(&self, bucket_index: u64, slot: usize) -> Addr {
        self.tree.base_address()
            + bucket_index * self.tree.bucket_size()
            + slot as u64 * self.tree.block_size()
    }
}
