use std::collections::VecDeque;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::mem::addr_mapper::AddrMapper;
use crate::mem::dram::DramController;
use crate::mem::request::{MemAccessKind, MemRequest, OramRequest};
use crate::oram::address_logic::AddressLogic;
use crate::oram::error::OramError;
use crate::oram::integrity::IntegrityController;
use crate::oram::oob_tree::OobTree;
use crate::oram::position_map::PositionMap;
use crate::oram::stash::Stash;
use crate::oram::stats::OramStats;
use crate::oram::tree_info::TreeInfo;
use crate::oram::{Addr, BlockId, Cycle, DUMMY_LEAF};
use crate::sim::config::OramConfig;
use crate::sim::stash_trace::StashTrace;

/// Phase of the single active transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Pending,
    ReadingHeaders,
    ReadingData,
    WaitingReadsDone,
    Reply,
    Writing,
    WritebackDummy,
    WaitingWritesDone,
}

#[derive(Debug)]
struct Transaction {
    phase: Phase,
    req: OramRequest,
    block_id: BlockId,
    /// Path being traversed; resolved from the position map at selection.
    leaf: i64,
    /// Outstanding data-read completions.
    n_acks: u32,
    /// Serial decryption engine: the cycle after which all blocks read so
    /// far are plaintext.
    decrypt_ready: Cycle,
    integrity_checked: bool,
    arrival_cycle: Cycle,
}

#[derive(Debug)]
struct WriteRequest {
    req: MemRequest,
    /// The block may not leave for DRAM until this cycle has passed.
    encrypt_ready: Cycle,
}

/// The ORAM controller proper: accepts logical requests from the LLC,
/// expands each into a fixed-shape path traversal against the DRAM
/// subsystem, and keeps the position map, stash and out-of-band tree
/// mutually consistent across the per-access remap.
///
/// Exactly one transaction is in flight at a time; later arrivals queue in
/// FIFO order. Completions toward the LLC are queued and drained by the
/// memory-system facade in the same cycle the Reply phase runs.
#[derive(Debug)]
pub struct OramController {
    tree: TreeInfo,
    address_logic: AddressLogic,
    position_map: PositionMap,
    stash: Stash,
    oob: OobTree,
    rng: StdRng,

    transactions: VecDeque<Transaction>,
    current: Option<Transaction>,
    level: i32,
    required_acks: u32,

    pending_rd: VecDeque<MemRequest>,
    pending_wb: VecDeque<WriteRequest>,
    read_stall: bool,
    write_stall: bool,

    encrypt_delay: Cycle,
    decrypt_delay: Cycle,
    clk: Cycle,

    completions: VecDeque<OramRequest>,
    stash_trace: Option<StashTrace>,
    stats: OramStats,
}

impl OramController {
    pub fn new(config: &OramConfig, tree: TreeInfo, stash_trace: Option<StashTrace>) -> Self {
        let required_acks = (tree.z_blocks() * tree.levels()) as u32;
        let address_logic = AddressLogic::new(tree.clone(), config.seed.wrapping_add(1));
        Self {
            tree,
            address_logic,
            position_map: PositionMap::new(),
            stash: Stash::new(config.stash_size),
            oob: OobTree::new(),
            rng: StdRng::seed_from_u64(config.seed),
            transactions: VecDeque::new(),
            current: None,
            level: 0,
            required_acks,
            pending_rd: VecDeque::new(),
            pending_wb: VecDeque::new(),
            read_stall: false,
            write_stall: false,
            encrypt_delay: config.encrypt_delay,
            decrypt_delay: config.decrypt_delay,
            clk: 0,
            completions: VecDeque::new(),
            stash_trace,
            stats: OramStats::default(),
        }
    }

    /// Accept a logical request. A never-seen address is first placed out of
    /// band: a fresh leaf is sampled, its path materialised, and the block
    /// parked in a random bucket of that path.
    pub fn send(&mut self, req: OramRequest) -> Result<bool, OramError> {
        let block_id = req.addr as BlockId;
        if !self.position_map.contains(block_id) {
            let leaf = self.tree.random_leaf(&mut self.rng);
            self.position_map.add(block_id, leaf);
            self.address_logic.init_path(leaf, &mut self.oob);
            self.address_logic.init_block(block_id, leaf, &mut self.oob)?;
        }
        self.transactions.push_back(Transaction {
            phase: Phase::Pending,
            req,
            block_id,
            leaf: DUMMY_LEAF,
            n_acks: self.required_acks,
            decrypt_ready: 0,
            integrity_checked: false,
            arrival_cycle: self.clk,
        });
        Ok(true)
    }

    /// One ORAM-system cycle: pump at most one pending read and one
    /// encrypt-ready writeback into the DRAM subsystem, then advance the
    /// current transaction's phase machine.
    pub fn tick(
        &mut self,
        channels: &mut [DramController],
        mapper: &AddrMapper,
    ) -> Result<(), OramError> {
        self.clk += 1;
        self.process_pending_reads(channels, mapper);
        self.process_pending_writes(channels, mapper);

        if !self.select_next_transaction()? {
            return Ok(());
        }

        let phase = self.current.as_ref().map(|t| t.phase);
        match phase {
            Some(Phase::Pending) => self.set_phase(Phase::ReadingHeaders),
            Some(Phase::ReadingHeaders) => self.handle_reading_headers(),
            Some(Phase::ReadingData) => self.handle_reading_data(),
            Some(Phase::WaitingReadsDone) => self.handle_waiting_reads(),
            Some(Phase::Reply) => self.handle_reply()?,
            Some(Phase::Writing) => self.handle_writing()?,
            Some(Phase::WritebackDummy) => self.handle_writeback_dummy()?,
            Some(Phase::WaitingWritesDone) => self.handle_waiting_writes(),
            None => {}
        }
        Ok(())
    }

    /// Completion callback for a header-tree read.
    pub fn on_header_read(&mut self, _addr: Addr) {
        self.bump_decrypt();
    }

    /// Completion callback for a data-tree read: account the ack, feed the
    /// block to the integrity controller, pop its out-of-band slot and stash
    /// it if it is a real block.
    pub fn on_data_read(
        &mut self,
        addr: Addr,
        integrity: &mut IntegrityController,
    ) -> Result<(), OramError> {
        self.bump_decrypt();
        if let Some(t) = self.current.as_mut() {
            t.n_acks = t.n_acks.saturating_sub(1);
        }
        if let Some(signal) = integrity.enqueue_block(addr) {
            self.integrity_check(signal);
        }

        let (bucket_index, slot) = self.tree.position_of(addr);
        let header = self.oob.pop(bucket_index, slot)?;
        if !header.is_dummy() {
            self.stash.add(header)?;
            self.stats.record_stash_occupancy(self.stash.len() as u64);
        }
        Ok(())
    }

    /// Signal from the integrity controller that the current path verified.
    /// Per-path and edge-triggered; the address is unused.
    pub fn integrity_check(&mut self, _addr: Addr) {
        if let Some(t) = self.current.as_mut() {
            t.integrity_checked = true;
        }
    }

    pub fn pop_completion(&mut self) -> Option<OramRequest> {
        self.completions.pop_front()
    }

    /// True when no transaction is queued, active, or still draining writes.
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
            && self.transactions.is_empty()
            && self.pending_rd.is_empty()
            && self.pending_wb.is_empty()
    }

    pub fn stats(&self) -> &OramStats {
        &self.stats
    }

    pub fn position_map(&self) -> &PositionMap {
        &self.position_map
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn oob_tree(&self) -> &OobTree {
        &self.oob
    }

    pub fn address_logic(&self) -> &AddressLogic {
        &self.address_logic
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.current.as_ref().map(|t| t.phase)
    }

    pub fn dump(&self) {
        self.position_map.dump();
        self.stash.dump();
    }

    fn select_next_transaction(&mut self) -> Result<bool, OramError> {
        if self.current.is_none() {
            if let Some(mut t) = self.transactions.pop_front() {
                t.leaf = self
                    .position_map
                    .leaf_of(t.block_id)
                    .ok_or(OramError::MissingPositionEntry {
                        block_id: t.block_id,
                    })?;
                if let Some(trace) = &mut self.stash_trace {
                    trace.record(self.clk, self.stash.occupancy_percent());
                }
                debug!(
                    "cycle {}: transaction start, block {} on leaf {}",
                    self.clk, t.block_id, t.leaf
                );
                self.current = Some(t);
            }
        }
        Ok(self.current.is_some())
    }

    fn handle_reading_headers(&mut self) {
        let leaf = self.current_leaf();
        match self.address_logic.generate_next_header_address(leaf) {
            Some(addr) => self.enqueue_read(addr, MemAccessKind::HeaderRead),
            None => self.set_phase(Phase::ReadingData),
        }
    }

    fn handle_reading_data(&mut self) {
        let leaf = self.current_leaf();
        match self.address_logic.generate_next_data_address(leaf) {
            Some(addr) => self.enqueue_read(addr, MemAccessKind::DataRead),
            None => self.set_phase(Phase::WaitingReadsDone),
        }
    }

    fn handle_waiting_reads(&mut self) {
        let clk = self.clk;
        if let Some(t) = self.current.as_mut() {
            if t.n_acks == 0 && clk > t.decrypt_ready && t.integrity_checked {
                t.phase = Phase::Reply;
            }
        }
    }

    /// All blocks of the path are in (stash populated, decrypt elapsed, path
    /// verified): answer the LLC and remap the block to a fresh leaf. The
    /// remap must happen here, after every out-of-band slot of the old path
    /// was popped, or the position map, stash and tree would disagree on the
    /// block's leaf.
    fn handle_reply(&mut self) -> Result<(), OramError> {
        let (block_id, arrival_cycle, req) = match self.current.as_ref() {
            Some(t) => (t.block_id, t.arrival_cycle, t.req.clone()),
            None => return Ok(()),
        };
        if !self.stash.contains(block_id) {
            return Err(OramError::MissingPositionEntry { block_id });
        }

        let new_leaf = self.tree.random_leaf(&mut self.rng);
        self.position_map.remap(block_id, new_leaf)?;
        self.stash.remap(block_id, new_leaf)?;
        self.address_logic.init_path(new_leaf, &mut self.oob);

        self.completions.push_back(req);
        self.stats.record_transaction(self.clk - arrival_cycle);

        self.level = self.tree.depth() as i32;
        self.stash.reset();
        self.set_phase(Phase::Writing);
        Ok(())
    }

    /// Walk the stash once per level, writing back every entry whose path
    /// shares the current level's bucket with the transaction's path.
    fn handle_writing(&mut self) -> Result<(), OramError> {
        if self.write_stall {
            return Ok(());
        }
        if self.stash.is_empty() {
            self.set_phase(Phase::WritebackDummy);
            return Ok(());
        }
        let target_leaf = self.current_leaf();
        let level = self.level as usize;
        match self.stash.next() {
            None => self.set_phase(Phase::WritebackDummy),
            Some(entry) => {
                if self.address_logic.common_bucket(target_leaf, entry.leaf, level) {
                    if let Some(addr) = self.address_logic.writeback_data(
                        entry.leaf,
                        level,
                        entry.block_id,
                        &mut self.oob,
                    )? {
                        self.enqueue_writeback(addr, MemAccessKind::DataWrite);
                        self.stash.remove(entry.block_id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Pad the current level's bucket so every slot of the path is written
    /// exactly once, then move one level up the path (leaf-counted, so the
    /// counter runs from `depth` down to -1).
    fn handle_writeback_dummy(&mut self) -> Result<(), OramError> {
        if self.write_stall {
            return Ok(());
        }
        let target_leaf = self.current_leaf();
        let level = self.level as usize;
        match self
            .address_logic
            .writeback_dummy(target_leaf, level, &self.oob)?
        {
            Some(addr) => self.enqueue_writeback(addr, MemAccessKind::DummyWrite),
            None => {
                self.level -= 1;
                if self.level < 0 {
                    self.set_phase(Phase::WaitingWritesDone);
                } else {
                    self.set_phase(Phase::Writing);
                }
            }
        }
        Ok(())
    }

    fn handle_waiting_writes(&mut self) {
        if self.pending_wb.is_empty() {
            self.current = None;
        }
    }

    fn process_pending_reads(&mut self, channels: &mut [DramController], mapper: &AddrMapper) {
        if let Some(front) = self.pending_rd.front() {
            let mut req = front.clone();
            mapper.apply(&mut req);
            if channels[req.channel()].send(req) {
                self.pending_rd.pop_front();
                self.read_stall = false;
                self.stats.record_read_issued();
            } else {
                self.read_stall = true;
                self.stats.record_stall_tick();
            }
        }
    }

    fn process_pending_writes(&mut self, channels: &mut [DramController], mapper: &AddrMapper) {
        if let Some(front) = self.pending_wb.front() {
            if self.clk > front.encrypt_ready {
                let mut req = front.req.clone();
                mapper.apply(&mut req);
                if channels[req.channel()].send(req) {
                    self.pending_wb.pop_front();
                    self.write_stall = false;
                    self.stats.record_write_issued();
                } else {
                    self.write_stall = true;
                    self.stats.record_stall_tick();
                }
            }
        }
    }

    fn enqueue_read(&mut self, addr: Addr, kind: MemAccessKind) {
        self.pending_rd
            .push_back(MemRequest::new(addr, kind, self.tree.block_size() as u32));
    }

    fn enqueue_writeback(&mut self, addr: Addr, kind: MemAccessKind) {
        match kind {
            MemAccessKind::DataWrite => self.stats.record_data_writeback(),
            MemAccessKind::DummyWrite => self.stats.record_dummy_writeback(),
            _ => {}
        }
        self.pending_wb.push_back(WriteRequest {
            req: MemRequest::new(addr, kind, self.tree.block_size() as u32),
            encrypt_ready: self.clk + self.encrypt_delay,
        });
    }

    /// Serial decryption engine: each arriving block extends the ready cycle
    /// if the engine is already busy, else restarts it from now.
    fn bump_decrypt(&mut self) {
        let clk = self.clk;
        let decrypt_delay = self.decrypt_delay;
        if let Some(t) = self.current.as_mut() {
            if t.decrypt_ready > clk {
                t.decrypt_ready += decrypt_delay;
            } else {
                t.decrypt_ready = clk + decrypt_delay;
            }
        }
    }

    fn current_leaf(&self) -> i64 {
        self.current.as_ref().map(|t| t.leaf).unwrap_or(DUMMY_LEAF)
    }

    fn set_phase(&mut self, phase: Phase) {
        if let Some(t) = self.current.as_mut() {
            t.phase = phase;
        }
    }
}
