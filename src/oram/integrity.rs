use std::collections::VecDeque;

use crate::oram::stats::IntegrityStats;
use crate::oram::tree_info::TreeInfo;
use crate::oram::{Addr, Cycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Idle,
    Serialize,
    CheckIntegrity,
    SendSignal,
}

#[derive(Debug, Clone)]
struct IntegrityEntry {
    full: bool,
    valid: Vec<bool>,
}

impl IntegrityEntry {
    fn new(z_blocks: usize) -> Self {
        Self {
            full: false,
            valid: vec![false; z_blocks],
        }
    }
}

/// Models the latency of verifying the hash chain over the buckets of one
/// path. Blocks read back from DRAM are serialised by tree level, one per
/// cycle; once every level has all `Z` blocks accounted for, a hash timer of
/// `hash_delay` cycles runs per level. The verified-path signal is returned
/// from `tick` for the facade to deliver to the ORAM controller.
///
/// With `hash_delay == 0` the state machine is bypassed entirely and
/// `enqueue_block` returns the signal immediately.
#[derive(Debug)]
pub struct IntegrityController {
    hash_delay: Cycle,
    state: State,
    tree: Option<TreeInfo>,
    pending: VecDeque<Addr>,
    entries: Vec<IntegrityEntry>,
    remaining_hash_ticks: Cycle,
    arrival: Cycle,
    clk: Cycle,
    stats: IntegrityStats,
}

impl IntegrityController {
    pub fn new(hash_delay: Cycle) -> Self {
        Self {
            hash_delay,
            state: State::Init,
            tree: None,
            pending: VecDeque::new(),
            entries: Vec::new(),
            remaining_hash_ticks: 0,
            arrival: 0,
            clk: 0,
            stats: IntegrityStats::default(),
        }
    }

    pub fn attach_tree_info(&mut self, tree: TreeInfo) {
        self.tree = Some(tree);
    }

    pub fn stats(&self) -> &IntegrityStats {
        &self.stats
    }

    fn tree(&self) -> &TreeInfo {
        self.tree.as_ref().expect("tree info not attached, was attach_tree_info called?")
    }

    /// Hand over one data block for verification. Returns the verified-path
    /// signal directly when the hash pipeline is disabled.
    pub fn enqueue_block(&mut self, addr: Addr) -> Option<Addr> {
        self.stats.record_req();
        if self.hash_delay > 0 {
            self.pending.push_back(addr);
            None
        } else {
            Some(addr)
        }
    }

    /// Advance one cycle. `Some(addr)` reports that the current path passed
    /// verification; the address is a stub, the signal is per-path.
    pub fn tick(&mut self) -> Option<Addr> {
        self.clk += 1;
        match self.state {
            State::Init => {
                self.reset_entries();
                self.state = State::Idle;
                None
            }
            State::Idle => {
                self.stats.record_idle_cycle();
                if !self.pending.is_empty() {
                    self.state = State::Serialize;
                }
                None
            }
            State::Serialize => {
                self.stats.record_active_cycle();
                if self.num_full() == self.tree().levels() {
                    self.remaining_hash_ticks = self.hash_delay;
                    self.arrival = self.clk;
                    self.state = State::CheckIntegrity;
                } else if let Some(addr) = self.pending.pop_front() {
                    self.serialize_block(addr);
                } else {
                    self.state = State::Idle;
                }
                None
            }
            State::CheckIntegrity => {
                self.stats.record_active_cycle();
                if self.remaining_hash_ticks > 0 {
                    self.remaining_hash_ticks -= 1;
                } else {
                    self.entries.pop();
                    self.remaining_hash_ticks = self.hash_delay;
                }
                if self.entries.is_empty() {
                    self.state = State::SendSignal;
                }
                None
            }
            State::SendSignal => {
                self.stats.record_active_cycle();
                self.stats.record_latency(self.clk - self.arrival);
                self.reset_entries();
                self.state = State::Idle;
                Some(0)
            }
        }
    }

    fn reset_entries(&mut self) {
        let levels = self.tree().levels();
        let z_blocks = self.tree().z_blocks();
        self.entries = (0..levels).map(|_| IntegrityEntry::new(z_blocks)).collect();
    }

    fn serialize_block(&mut self, addr: Addr) {
        let (bucket_index, slot) = self.tree().position_of(addr);
        let level = self.tree().level_of_bucket(bucket_index);
        let entry = &mut self.entries[level];
        entry.valid[slot] = true;
        entry.full = entry.valid.iter().all(|v| *v);
    }

    fn num_full(&self) -> usize {
        self.entries.iter().filter(|e| e.full).count()
    }
}
