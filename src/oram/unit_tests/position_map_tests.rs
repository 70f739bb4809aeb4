use crate::oram::error::OramError;
use crate::oram::position_map::PositionMap;

#[test]
fn add_and_lookup() {
    let mut map = PositionMap::new();
    assert!(map.add(10, 3));
    assert!(map.contains(10));
    assert_eq!(map.leaf_of(10), Some(3));
    assert_eq!(map.leaf_of(11), None);
}

#[test]
fn double_add_keeps_first_leaf() {
    let mut map = PositionMap::new();
    assert!(map.add(10, 3));
    assert!(!map.add(10, 7));
    assert_eq!(map.leaf_of(10), Some(3));
    assert_eq!(map.num_entries(), 1);
}

#[test]
fn remap_updates_leaf_and_counter() {
    let mut map = PositionMap::new();
    map.add(10, 3);
    map.remap(10, 5).unwrap();
    map.remap(10, 1).unwrap();
    assert_eq!(map.leaf_of(10), Some(1));
    assert_eq!(map.num_remaps(), 2);
}

#[test]
fn remap_of_missing_block_is_an_error() {
    let mut map = PositionMap::new();
    assert_eq!(
        map.remap(99, 0),
        Err(OramError::MissingPositionEntry { block_id: 99 })
    );
}

#[test]
fn remove_entry() {
    let mut map = PositionMap::new();
    map.add(10, 3);
    assert!(map.remove(10));
    assert!(!map.remove(10));
    assert!(!map.contains(10));
    // num_entries counts entries ever created.
    assert_eq!(map.num_entries(), 1);
}
