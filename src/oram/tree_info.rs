use rand::rngs::StdRng;
use rand::Rng;

use crate::oram::{Addr, Leaf};

/// Static geometry of the ORAM tree, derived once from the configured memory
/// region. A fraction `1/(Z+1)` of the region is reserved for the parallel
/// header tree; the rest holds data buckets, linearised level by level with
/// the root at index 0.
///
/// The struct is a plain value: components that need geometry keep their own
/// copy, and PRNG state lives with whichever component samples leaves so the
/// single configured seed fully determines a run.
#[derive(Debug, Clone)]
pub struct TreeInfo {
    base_address: Addr,
    length: u64,
    block_size: u64,
    bucket_size: u64,
    z_blocks: usize,
    arity: u64,
    arity_shift: u32,
    num_buckets: u64,
    depth: u32,
    levels: usize,
    num_leaves: u64,
}

impl TreeInfo {
    pub fn new(base_address: Addr, length: u64, block_size: u64, z_blocks: usize, arity: u64) -> Self {
        assert!(arity.is_power_of_two(), "tree arity must be a power of two");
        assert!(block_size > 0 && z_blocks > 0 && length > 0);

        let bucket_size = block_size * z_blocks as u64;
        let num_buckets = (z_blocks as u64 * length / (z_blocks as u64 + 1)) / bucket_size;
        let arity_shift = arity.trailing_zeros();

        // depth = floor(log_arity(num_buckets + 1)) - 1, via the shift walk.
        let mut depth = 0u32;
        let mut n = num_buckets + 1;
        while (n >> arity_shift) > 0 {
            depth += 1;
            n >>= arity_shift;
        }
        let levels = depth as usize;
        let depth = depth.saturating_sub(1);
        let num_leaves = 1u64 << (arity_shift * depth);

        Self {
            base_address,
            length,
            block_size,
            bucket_size,
            z_blocks,
            arity,
            arity_shift,
            num_buckets,
            depth,
            levels,
            num_leaves,
        }
    }

    pub fn base_address(&self) -> Addr {
        self.base_address
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn bucket_size(&self) -> u64 {
        self.bucket_size
    }

    pub fn z_blocks(&self) -> usize {
        self.z_blocks
    }

    pub fn arity(&self) -> u64 {
        self.arity
    }

    pub fn num_buckets(&self) -> u64 {
        self.num_buckets
    }

    /// Depth of the tree; a single-bucket tree has depth 0.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of bucket levels along any root-to-leaf path (`depth + 1`).
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    /// Maps a data-tree address to its bucket index.
    pub fn bucket_index_of(&self, addr: Addr) -> u64 {
        (addr - self.base_address) / self.bucket_size
    }

    /// Maps a data-tree address to its slot offset within the bucket.
    pub fn slot_of(&self, addr: Addr) -> usize {
        (((addr - self.base_address) % self.bucket_size) / self.block_size) as usize
    }

    pub fn position_of(&self, addr: Addr) -> (u64, usize) {
        (self.bucket_index_of(addr), self.slot_of(addr))
    }

    /// Level of a bucket in the linearised tree: `floor(log_arity(index + 1))`.
    /// The root is level 0, leaves are level `depth`.
    pub fn level_of_bucket(&self, bucket_index: u64) -> usize {
        let mut level = 0usize;
        let mut n = bucket_index + 1;
        while (n >> self.arity_shift) > 0 {
            level += 1;
            n >>= self.arity_shift;
        }
        level
    }

    /// Uniform sample over `[0, arity^depth)`.
    pub fn random_leaf(&self, rng: &mut StdRng) -> Leaf {
        rng.gen_range(0..self.num_leaves) as Leaf
    }
}
