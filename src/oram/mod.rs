pub mod address_logic;
pub mod controller;
pub mod error;
pub mod integrity;
pub mod oob_tree;
pub mod position_map;
pub mod stash;
pub mod stats;
pub mod tree_info;

#[cfg(test)]
mod unit_tests;

pub use address_logic::AddressLogic;
pub use controller::{OramController, Phase};
pub use error::OramError;
pub use integrity::IntegrityController;
pub use oob_tree::{BlockHeader, Bucket, OobTree};
pub use position_map::PositionMap;
pub use stash::Stash;
pub use stats::{IntegrityStats, OramStats, SystemStats};
pub use tree_info::TreeInfo;

/// Logical block identifier supplied by the LLC. Negative values mark dummies.
pub type BlockId = i64;

/// Leaf index in `[0, arity^depth)`. Negative values mark dummies.
pub type Leaf = i64;

/// Physical memory address.
pub type Addr = u64;

/// Global simulation cycle.
pub type Cycle = u64;

pub const DUMMY_BLOCK_ID: BlockId = -1;
pub const DUMMY_LEAF: Leaf = -1;
