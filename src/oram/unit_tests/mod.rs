mod address_logic_tests;
mod integrity_tests;
mod oob_tree_tests;
mod position_map_tests;
mod stash_tests;

use crate::oram::tree_info::TreeInfo;

/// 2304-byte region with Z=4, arity 2: 7 buckets, depth 2, 4 leaves.
pub(crate) fn small_tree() -> TreeInfo {
    TreeInfo::new(0, 2304, 64, 4, 2)
}
