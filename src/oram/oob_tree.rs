use std::collections::HashMap;

use crate::oram::error::OramError;
use crate::oram::{BlockId, Leaf, DUMMY_BLOCK_ID, DUMMY_LEAF};

/// Per-slot metadata tracked out of band: which logical block sits in the
/// slot and which leaf it is mapped to. The payload itself is not modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub block_id: BlockId,
    pub leaf: Leaf,
}

impl BlockHeader {
    pub fn new(block_id: BlockId, leaf: Leaf) -> Self {
        Self { block_id, leaf }
    }

    pub fn dummy() -> Self {
        Self {
            block_id: DUMMY_BLOCK_ID,
            leaf: DUMMY_LEAF,
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.block_id < 0
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self::dummy()
    }
}

/// A tree node: `Z` header slots, fixed for the bucket's lifetime.
#[derive(Debug, Clone)]
pub struct Bucket {
    slots: Vec<BlockHeader>,
}

impl Bucket {
    pub fn new(z_blocks: usize) -> Self {
        Self {
            slots: vec![BlockHeader::dummy(); z_blocks],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, offset: usize) -> BlockHeader {
        self.slots[offset]
    }

    pub fn slots(&self) -> &[BlockHeader] {
        &self.slots
    }

    fn is_dummy(&self, offset: usize) -> bool {
        self.slots[offset].is_dummy()
    }

    fn set(&mut self, offset: usize, header: BlockHeader) {
        self.slots[offset] = header;
    }

    fn pop(&mut self, offset: usize) -> BlockHeader {
        std::mem::replace(&mut self.slots[offset], BlockHeader::dummy())
    }
}

/// Sparse bookkeeping for the simulated DRAM tree. Buckets are materialised
/// lazily the first time a path touches them and never destroyed; querying a
/// bucket that was never initialised is an address-logic bug.
#[derive(Debug, Default)]
pub struct OobTree {
    buckets: HashMap<u64, Bucket>,
}

impl OobTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent: an existing bucket is left untouched.
    pub fn insert_bucket(&mut self, bucket_index: u64, z_blocks: usize) {
        self.buckets
            .entry(bucket_index)
            .or_insert_with(|| Bucket::new(z_blocks));
    }

    pub fn contains_bucket(&self, bucket_index: u64) -> bool {
        self.buckets.contains_key(&bucket_index)
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket(&self, bucket_index: u64) -> Option<&Bucket> {
        self.buckets.get(&bucket_index)
    }

    pub fn buckets(&self) -> impl Iterator<Item = (&u64, &Bucket)> {
        self.buckets.iter()
    }

    pub fn insert_header(
        &mut self,
        bucket_index: u64,
        slot: usize,
        header: BlockHeader,
    ) -> Result<(), OramError> {
        self.bucket_mut(bucket_index)?.set(slot, header);
        Ok(())
    }

    pub fn clear_header(&mut self, bucket_index: u64, slot: usize) -> Result<(), OramError> {
        self.bucket_mut(bucket_index)?.set(slot, BlockHeader::dummy());
        Ok(())
    }

    pub fn is_dummy(&self, bucket_index: u64, slot: usize) -> Result<bool, OramError> {
        let bucket = self
            .buckets
            .get(&bucket_index)
            .ok_or(OramError::BucketAbsent { bucket_index })?;
        Ok(bucket.is_dummy(slot))
    }

    /// Returns the slot's header and writes a dummy in its place.
    pub fn pop(&mut self, bucket_index: u64, slot: usize) -> Result<BlockHeader, OramError> {
        Ok(self.bucket_mut(bucket_index)?.pop(slot))
    }

    fn bucket_mut(&mut self, bucket_index: u64) -> Result<&mut Bucket, OramError> {
        self.buckets
            .get_mut(&bucket_index)
            .ok_or(OramError::BucketAbsent { bucket_index })
    }
}
