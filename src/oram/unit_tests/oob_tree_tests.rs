use crate::oram::error::OramError;
use crate::oram::oob_tree::{BlockHeader, OobTree};

#[test]
fn insert_bucket_creates_z_dummy_slots() {
    let mut oob = OobTree::new();
    oob.insert_bucket(3, 4);
    let bucket = oob.bucket(3).unwrap();
    assert_eq!(bucket.len(), 4);
    for slot in 0..4 {
        assert!(oob.is_dummy(3, slot).unwrap());
    }
}

#[test]
fn insert_bucket_is_idempotent() {
    let mut oob = OobTree::new();
    oob.insert_bucket(0, 4);
    oob.insert_header(0, 2, BlockHeader::new(77, 1)).unwrap();
    oob.insert_bucket(0, 4);
    assert!(!oob.is_dummy(0, 2).unwrap());
    assert_eq!(oob.bucket(0).unwrap().slot(2), BlockHeader::new(77, 1));
}

#[test]
fn absent_bucket_is_an_error() {
    let oob = OobTree::new();
    assert_eq!(
        oob.is_dummy(9, 0),
        Err(OramError::BucketAbsent { bucket_index: 9 })
    );
}

#[test]
fn pop_returns_header_and_leaves_dummy() {
    let mut oob = OobTree::new();
    oob.insert_bucket(1, 4);
    oob.insert_header(1, 0, BlockHeader::new(5, 2)).unwrap();
    let header = oob.pop(1, 0).unwrap();
    assert_eq!(header, BlockHeader::new(5, 2));
    assert!(oob.is_dummy(1, 0).unwrap());
}

#[test]
fn pop_of_dummy_slot_yields_dummy() {
    let mut oob = OobTree::new();
    oob.insert_bucket(1, 4);
    assert!(oob.pop(1, 3).unwrap().is_dummy());
}

#[test]
fn clear_header_resets_slot() {
    let mut oob = OobTree::new();
    oob.insert_bucket(2, 4);
    oob.insert_header(2, 1, BlockHeader::new(8, 3)).unwrap();
    oob.clear_header(2, 1).unwrap();
    assert!(oob.is_dummy(2, 1).unwrap());
}

#[test]
fn insert_header_overwrites() {
    let mut oob = OobTree::new();
    oob.insert_bucket(0, 4);
    oob.insert_header(0, 0, BlockHeader::new(1, 1)).unwrap();
    oob.insert_header(0, 0, BlockHeader::new(2, 3)).unwrap();
    assert_eq!(oob.bucket(0).unwrap().slot(0), BlockHeader::new(2, 3));
}

#[test]
fn dummy_header_is_negative() {
    let header = BlockHeader::dummy();
    assert!(header.is_dummy());
    assert_eq!(header.block_id, -1);
    assert_eq!(header.leaf, -1);
    assert!(!BlockHeader::new(0, 0).is_dummy());
}
