use crate::oram::address_logic::AddressLogic;
use crate::oram::error::OramError;
use crate::oram::oob_tree::{BlockHeader, OobTree};
use crate::oram::unit_tests::small_tree;

fn logic() -> AddressLogic {
    AddressLogic::new(small_tree(), 0)
}

#[test]
fn path_indexes_are_root_first() {
    let logic = logic();
    assert_eq!(logic.path_indexes(0), vec![0, 1, 3]);
    assert_eq!(logic.path_indexes(1), vec![0, 1, 4]);
    assert_eq!(logic.path_indexes(2), vec![0, 2, 5]);
    assert_eq!(logic.path_indexes(3), vec![0, 2, 6]);
}

#[test]
fn data_addresses_cover_every_slot_of_the_path() {
    let logic = logic();
    let addrs = logic.data_addresses(0);
    assert_eq!(addrs.len(), 12);
    let mut expected = Vec::new();
    for idx in [0u64, 1, 3] {
        for slot in 0..4u64 {
            expected.push(idx * 256 + slot * 64);
        }
    }
    assert_eq!(addrs, expected);
}

#[test]
fn header_addresses_use_the_header_region() {
    let logic = logic();
    // Headers live past the data buckets, Z/(Z+1) into the region.
    assert_eq!(logic.base_address_headers(), 1843);
    assert_eq!(logic.header_addresses(3), vec![1843, 1843 + 2 * 64, 1843 + 6 * 64]);
}

#[test]
fn generators_drain_to_sentinel_and_rewind() {
    let mut logic = logic();
    for _ in 0..3 {
        assert!(logic.generate_next_header_address(0).is_some());
    }
    assert_eq!(logic.generate_next_header_address(0), None);

    for _ in 0..12 {
        assert!(logic.generate_next_data_address(0).is_some());
    }
    assert_eq!(logic.generate_next_data_address(0), None);
    // Sentinel rewinds: the next call starts the path over.
    assert_eq!(logic.generate_next_data_address(0), Some(0));
}

#[test]
fn init_path_is_idempotent() {
    let logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);
    assert_eq!(oob.num_buckets(), 3);
    logic.init_path(0, &mut oob);
    assert_eq!(oob.num_buckets(), 3);
    logic.init_path(3, &mut oob);
    assert_eq!(oob.num_buckets(), 5);
}

#[test]
fn init_block_places_exactly_one_header_on_the_path() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(2, &mut oob);
    logic.init_block(42, 2, &mut oob).unwrap();

    let mut placed = Vec::new();
    for &idx in &[0u64, 2, 5] {
        for slot in 0..4 {
            if !oob.is_dummy(idx, slot).unwrap() {
                placed.push((idx, oob.bucket(idx).unwrap().slot(slot)));
            }
        }
    }
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].1, BlockHeader::new(42, 2));
}

#[test]
fn init_block_fails_on_a_full_path() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);
    for &idx in &[0u64, 1, 3] {
        for slot in 0..4 {
            oob.insert_header(idx, slot, BlockHeader::new(1000 + slot as i64, 0))
                .unwrap();
        }
    }
    assert_eq!(
        logic.init_block(42, 0, &mut oob),
        Err(OramError::InitBlockFailed {
            block_id: 42,
            leaf: 0
        })
    );
}

#[test]
fn common_bucket_is_counted_from_the_leaf() {
    let logic = logic();
    // Leaves 0 and 1 share the root (level 2) and bucket 1 (level 1).
    assert!(logic.common_bucket(0, 1, 2));
    assert!(logic.common_bucket(0, 1, 1));
    assert!(!logic.common_bucket(0, 1, 0));
    // Leaves 0 and 3 only share the root.
    assert!(logic.common_bucket(0, 3, 2));
    assert!(!logic.common_bucket(0, 3, 1));
    assert!(!logic.common_bucket(0, 3, 0));
    // Every leaf shares its whole path with itself.
    for level in 0..3 {
        assert!(logic.common_bucket(3, 3, level));
    }
}

#[test]
fn writeback_data_claims_the_first_free_slot() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);

    // Level 2 (root) of leaf 0's path is bucket 0.
    let addr = logic.writeback_data(0, 2, 7, &mut oob).unwrap();
    assert_eq!(addr, Some(0));
    assert_eq!(oob.bucket(0).unwrap().slot(0), BlockHeader::new(7, 0));

    let addr = logic.writeback_data(0, 2, 8, &mut oob).unwrap();
    assert_eq!(addr, Some(64));

    // Level 0 (leaf) of leaf 0's path is bucket 3.
    let addr = logic.writeback_data(0, 0, 9, &mut oob).unwrap();
    assert_eq!(addr, Some(3 * 256));
}

#[test]
fn writeback_data_on_a_full_bucket_returns_none() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);
    for i in 0..4 {
        assert!(logic.writeback_data(0, 2, i, &mut oob).unwrap().is_some());
    }
    assert_eq!(logic.writeback_data(0, 2, 99, &mut oob).unwrap(), None);
}

#[test]
fn writeback_dummy_drains_a_level_then_signals_done() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);

    let mut addrs = Vec::new();
    while let Some(addr) = logic.writeback_dummy(0, 0, &oob).unwrap() {
        addrs.push(addr);
    }
    assert_eq!(addrs, vec![3 * 256, 3 * 256 + 64, 3 * 256 + 128, 3 * 256 + 192]);

    // The sentinel rewound the slot counter: the level drains again.
    let mut again = Vec::new();
    while let Some(addr) = logic.writeback_dummy(0, 0, &oob).unwrap() {
        again.push(addr);
    }
    assert_eq!(again.len(), 4);
}

#[test]
fn writeback_dummy_skips_occupied_slots() {
    let mut logic = logic();
    let mut oob = OobTree::new();
    logic.init_path(0, &mut oob);
    // Park a real block in slot 0 of the root.
    assert!(logic.writeback_data(0, 2, 7, &mut oob).unwrap().is_some());

    let mut addrs = Vec::new();
    while let Some(addr) = logic.writeback_dummy(0, 2, &oob).unwrap() {
        addrs.push(addr);
    }
    assert_eq!(addrs, vec![64, 128, 192]);
}
