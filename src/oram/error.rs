use std::fmt;

use crate::oram::{BlockId, Leaf};

/// Fatal simulation errors. None of these are recoverable: they either mean
/// the configuration cannot sustain the offered load (stash overflow) or that
/// an internal invariant broke. DRAM backpressure is deliberately not here;
/// it is absorbed with a stall counter and a retry on the next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OramError {
    /// `Stash::add` was called while the stash already held `capacity` entries.
    StashOverflow { block_id: BlockId, capacity: usize },
    /// A block that must be resident (position map or stash) was not found.
    MissingPositionEntry { block_id: BlockId },
    /// A query hit a bucket index that was never materialised along any path.
    BucketAbsent { bucket_index: u64 },
    /// Initial placement could not find a free slot on the block's path.
    InitBlockFailed { block_id: BlockId, leaf: Leaf },
}

impl fmt::Display for OramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OramError::StashOverflow { block_id, capacity } => write!(
                f,
                "stash overflow: cannot hold block {} (capacity {})",
                block_id, capacity
            ),
            OramError::MissingPositionEntry { block_id } => {
                write!(f, "block {} not found in stash or position map", block_id)
            }
            OramError::BucketAbsent { bucket_index } => {
                write!(f, "bucket {} was never initialised", bucket_index)
            }
            OramError::InitBlockFailed { block_id, leaf } => write!(
                f,
                "no free slot on path to leaf {} for initial placement of block {}",
                leaf, block_id
            ),
        }
    }
}

impl std::error::Error for OramError {}
