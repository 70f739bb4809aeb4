use crate::oram::error::OramError;
use crate::oram::oob_tree::BlockHeader;
use crate::oram::stash::Stash;

fn header(block_id: i64, leaf: i64) -> BlockHeader {
    BlockHeader::new(block_id, leaf)
}

#[test]
fn add_and_query() {
    let mut stash = Stash::new(8);
    stash.add(header(1, 0)).unwrap();
    stash.add(header(2, 3)).unwrap();
    assert_eq!(stash.len(), 2);
    assert!(stash.contains(1));
    assert_eq!(stash.leaf_of(2), Some(3));
    assert_eq!(stash.leaf_of(9), None);
}

#[test]
fn overflow_is_fatal() {
    let mut stash = Stash::new(2);
    stash.add(header(1, 0)).unwrap();
    stash.add(header(2, 0)).unwrap();
    assert_eq!(
        stash.add(header(3, 0)),
        Err(OramError::StashOverflow {
            block_id: 3,
            capacity: 2
        })
    );
    assert_eq!(stash.len(), 2);
}

#[test]
fn occupancy_percent() {
    let mut stash = Stash::new(4);
    assert_eq!(stash.occupancy_percent(), 0.0);
    stash.add(header(1, 0)).unwrap();
    assert_eq!(stash.occupancy_percent(), 25.0);
}

#[test]
fn remap_and_remove() {
    let mut stash = Stash::new(4);
    stash.add(header(1, 0)).unwrap();
    stash.remap(1, 7).unwrap();
    assert_eq!(stash.leaf_of(1), Some(7));
    assert!(stash.remove(1));
    assert!(!stash.remove(1));
    assert!(stash.is_empty());
}

#[test]
fn remap_of_missing_block_is_an_error() {
    let mut stash = Stash::new(4);
    assert_eq!(
        stash.remap(5, 0),
        Err(OramError::MissingPositionEntry { block_id: 5 })
    );
}

#[test]
fn traversal_yields_each_entry_then_sentinel() {
    let mut stash = Stash::new(4);
    stash.add(header(1, 0)).unwrap();
    stash.add(header(2, 1)).unwrap();
    stash.add(header(3, 2)).unwrap();
    stash.reset();
    assert_eq!(stash.next(), Some(header(1, 0)));
    assert_eq!(stash.next(), Some(header(2, 1)));
    assert_eq!(stash.next(), Some(header(3, 2)));
    assert_eq!(stash.next(), None);
    // The sentinel rewinds the cursor: the traversal restarts.
    assert_eq!(stash.next(), Some(header(1, 0)));
}

#[test]
fn traversal_of_empty_stash() {
    let mut stash = Stash::new(4);
    assert_eq!(stash.next(), None);
    assert_eq!(stash.next(), None);
}

#[test]
fn removing_the_yielded_entry_keeps_the_cursor_valid() {
    let mut stash = Stash::new(4);
    stash.add(header(1, 0)).unwrap();
    stash.add(header(2, 1)).unwrap();
    stash.add(header(3, 2)).unwrap();
    stash.reset();
    assert_eq!(stash.next(), Some(header(1, 0)));
    assert!(stash.remove(1));
    // The deletion happened behind the cursor; traversal continues at 2.
    assert_eq!(stash.next(), Some(header(2, 1)));
    assert_eq!(stash.next(), Some(header(3, 2)));
    assert_eq!(stash.next(), None);
}

#[test]
fn removing_ahead_of_the_cursor() {
    let mut stash = Stash::new(4);
    stash.add(header(1, 0)).unwrap();
    stash.add(header(2, 1)).unwrap();
    stash.add(header(3, 2)).unwrap();
    stash.reset();
    assert_eq!(stash.next(), Some(header(1, 0)));
    assert!(stash.remove(3));
    assert_eq!(stash.next(), Some(header(2, 1)));
    assert_eq!(stash.next(), None);
}
