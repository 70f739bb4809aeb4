use crate::oram::integrity::IntegrityController;
use crate::oram::unit_tests::small_tree;

fn path_data_addrs() -> Vec<u64> {
    // Every data slot along leaf 0's path: buckets 0, 1, 3.
    let mut addrs = Vec::new();
    for idx in [0u64, 1, 3] {
        for slot in 0..4u64 {
            addrs.push(idx * 256 + slot * 64);
        }
    }
    addrs
}

#[test]
fn zero_hash_delay_bypasses_the_pipeline() {
    let mut ic = IntegrityController::new(0);
    ic.attach_tree_info(small_tree());
    assert_eq!(ic.enqueue_block(64), Some(64));
    assert_eq!(ic.stats().num_reqs(), 1);
}

#[test]
fn idle_machine_counts_idle_cycles() {
    let mut ic = IntegrityController::new(5);
    ic.attach_tree_info(small_tree());
    for _ in 0..10 {
        assert_eq!(ic.tick(), None);
    }
    // First tick initialises the entry vector, the rest idle.
    assert_eq!(ic.stats().idle_cycles(), 9);
    assert_eq!(ic.stats().active_cycles(), 0);
}

#[test]
fn full_path_verifies_after_the_hash_delay() {
    let mut ic = IntegrityController::new(5);
    ic.attach_tree_info(small_tree());
    assert_eq!(ic.tick(), None); // Init -> Idle

    for addr in path_data_addrs() {
        assert_eq!(ic.enqueue_block(addr), None);
    }
    assert_eq!(ic.stats().num_reqs(), 12);

    let mut signal_at = None;
    for tick in 1..200u64 {
        if ic.tick().is_some() {
            signal_at = Some(tick);
            break;
        }
    }
    // 1 idle handoff + 12 serialize + 1 arming tick, then 3 levels of
    // (5 hash ticks + 1 erase) and the signal tick.
    assert_eq!(signal_at, Some(33));
    assert_eq!(ic.stats().latency(), 3 * (5 + 1) + 1);
    assert_eq!(ic.stats().idle_cycles(), 1);
    assert_eq!(ic.stats().active_cycles(), 13 + 18 + 1);
}

#[test]
fn partial_path_parks_in_idle() {
    let mut ic = IntegrityController::new(5);
    ic.attach_tree_info(small_tree());
    ic.tick();

    // One full bucket out of three is not enough.
    for addr in path_data_addrs().into_iter().take(4) {
        ic.enqueue_block(addr);
    }
    for _ in 0..100 {
        assert_eq!(ic.tick(), None);
    }
}

#[test]
fn machine_rearms_for_the_next_path() {
    let mut ic = IntegrityController::new(5);
    ic.attach_tree_info(small_tree());
    ic.tick();

    for round in 1..=2u64 {
        for addr in path_data_addrs() {
            ic.enqueue_block(addr);
        }
        let mut fired = false;
        for _ in 0..200 {
            if ic.tick().is_some() {
                fired = true;
                break;
            }
        }
        assert!(fired, "no signal in round {round}");
        assert_eq!(ic.stats().latency(), round * (3 * (5 + 1) + 1));
    }
}
