use serde::Serialize;

use crate::oram::Cycle;

/// Counters kept by the ORAM controller. Read/write counts are DRAM-side
/// issue counts (every path touch, dummies included), not LLC requests.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OramStats {
    read_requests: u64,
    write_requests: u64,
    other_requests: u64,
    num_stall_ticks: u64,
    cumulative_latency: u64,
    transactions_completed: u64,
    data_writebacks: u64,
    dummy_writebacks: u64,
    max_stash_occupancy: u64,
}

impl OramStats {
    pub fn read_requests(&self) -> u64 {
        self.read_requests
    }

    pub fn write_requests(&self) -> u64 {
        self.write_requests
    }

    pub fn other_requests(&self) -> u64 {
        self.other_requests
    }

    pub fn num_stall_ticks(&self) -> u64 {
        self.num_stall_ticks
    }

    pub fn cumulative_latency(&self) -> u64 {
        self.cumulative_latency
    }

    pub fn transactions_completed(&self) -> u64 {
        self.transactions_completed
    }

    pub fn data_writebacks(&self) -> u64 {
        self.data_writebacks
    }

    pub fn dummy_writebacks(&self) -> u64 {
        self.dummy_writebacks
    }

    pub fn max_stash_occupancy(&self) -> u64 {
        self.max_stash_occupancy
    }

    pub fn record_read_issued(&mut self) {
        self.read_requests = self.read_requests.saturating_add(1);
    }

    pub fn record_write_issued(&mut self) {
        self.write_requests = self.write_requests.saturating_add(1);
    }

    pub fn record_stall_tick(&mut self) {
        self.num_stall_ticks = self.num_stall_ticks.saturating_add(1);
    }

    pub fn record_transaction(&mut self, latency: Cycle) {
        self.transactions_completed = self.transactions_completed.saturating_add(1);
        self.cumulative_latency = self.cumulative_latency.saturating_add(latency);
    }

    pub fn record_data_writeback(&mut self) {
        self.data_writebacks = self.data_writebacks.saturating_add(1);
    }

    pub fn record_dummy_writeback(&mut self) {
        self.dummy_writebacks = self.dummy_writebacks.saturating_add(1);
    }

    pub fn record_stash_occupancy(&mut self, occupancy: u64) {
        self.max_stash_occupancy = self.max_stash_occupancy.max(occupancy);
    }
}

/// Counters kept by the integrity controller.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct IntegrityStats {
    idle_cycles: u64,
    active_cycles: u64,
    num_reqs: u64,
    latency: u64,
}

impl IntegrityStats {
    pub fn idle_cycles(&self) -> u64 {
        self.idle_cycles
    }

    pub fn active_cycles(&self) -> u64 {
        self.active_cycles
    }

    pub fn num_reqs(&self) -> u64 {
        self.num_reqs
    }

    pub fn latency(&self) -> u64 {
        self.latency
    }

    pub fn record_idle_cycle(&mut self) {
        self.idle_cycles = self.idle_cycles.saturating_add(1);
    }

    pub fn record_active_cycle(&mut self) {
        self.active_cycles = self.active_cycles.saturating_add(1);
    }

    pub fn record_req(&mut self) {
        self.num_reqs = self.num_reqs.saturating_add(1);
    }

    pub fn record_latency(&mut self, latency: Cycle) {
        self.latency = self.latency.saturating_add(latency);
    }
}

/// Front-end request counts kept by the memory-system facade.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SystemStats {
    num_read_requests: u64,
    num_write_requests: u64,
    num_other_requests: u64,
}

impl SystemStats {
    pub fn num_read_requests(&self) -> u64 {
        self.num_read_requests
    }

    pub fn num_write_requests(&self) -> u64 {
        self.num_write_requests
    }

    pub fn num_other_requests(&self) -> u64 {
        self.num_other_requests
    }

    pub fn record_read(&mut self) {
        self.num_read_requests = self.num_read_requests.saturating_add(1);
    }

    pub fn record_write(&mut self) {
        self.num_write_requests = self.num_write_requests.saturating_add(1);
    }

    pub fn record_other(&mut self) {
        self.num_other_requests = self.num_other_requests.saturating_add(1);
    }
}
