use std::collections::VecDeque;

use serde::Deserialize;

use crate::mem::request::MemRequest;
use crate::oram::Cycle;
use crate::sim::config::Config;

/// Timing parameters of one DRAM channel controller. The model enforces a
/// service law of a fixed latency plus a throughput component in
/// bytes-per-cycle over a bounded in-flight window.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DramConfig {
    pub num_channels: usize,
    pub queue_capacity: usize,
    pub base_latency: Cycle,
    pub bytes_per_cycle: u32,
}

impl Config for DramConfig {}

impl Default for DramConfig {
    fn default() -> Self {
        Self {
            num_channels: 1,
            queue_capacity: 32,
            base_latency: 20,
            bytes_per_cycle: 8,
        }
    }
}

#[derive(Debug)]
struct Inflight {
    ready_at: Cycle,
    request: MemRequest,
}

/// One channel's controller: a single-lane FIFO server. `send` refuses work
/// when the window is full (the caller absorbs the stall and retries);
/// accepted requests complete in order once their ready cycle passes.
#[derive(Debug)]
pub struct DramController {
    channel_id: usize,
    config: DramConfig,
    inflight: VecDeque<Inflight>,
    busy_until: Cycle,
    clk: Cycle,
}

impl DramController {
    pub fn new(channel_id: usize, config: DramConfig) -> Self {
        assert!(config.bytes_per_cycle > 0, "bytes_per_cycle must be > 0");
        assert!(config.queue_capacity > 0, "queue_capacity must be > 0");
        Self {
            channel_id,
            config,
            inflight: VecDeque::with_capacity(config.queue_capacity),
            busy_until: 0,
            clk: 0,
        }
    }

    pub fn channel_id(&self) -> usize {
        self.channel_id
    }

    pub fn inflight_len(&self) -> usize {
        self.inflight.len()
    }

    /// Accept a request at the current cycle, or return false on backpressure.
    pub fn send(&mut self, request: MemRequest) -> bool {
        if self.inflight.len() >= self.config.queue_capacity {
            return false;
        }
        let start = self.busy_until.max(self.clk);
        let service = ceil_div(request.bytes as u64, self.config.bytes_per_cycle as u64);
        let ready_at = start + self.config.base_latency + service;
        self.busy_until = start + service;
        self.inflight.push_back(Inflight { ready_at, request });
        true
    }

    /// Advance one cycle, delivering every completion whose ready cycle has
    /// passed to the callback.
    pub fn tick<F>(&mut self, mut on_complete: F)
    where
        F: FnMut(MemRequest),
    {
        self.clk += 1;
        while let Some(front) = self.inflight.front() {
            if front.ready_at > self.clk {
                break;
            }
            let inflight = self.inflight.pop_front().expect("front just checked");
            on_complete(inflight.request);
        }
        if self.inflight.is_empty() && self.clk > self.busy_until {
            self.busy_until = self.clk;
        }
    }
}

fn ceil_div(nom: u64, denom: u64) -> u64 {
    debug_assert!(denom > 0);
    (nom + denom - 1) / denom
}
