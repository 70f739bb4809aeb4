use log::{info, warn};

use crate::mem::addr_mapper::AddrMapper;
use crate::mem::dram::DramController;
use crate::mem::request::{AccessKind, MemAccessKind, MemRequest, OramRequest};
use crate::oram::controller::OramController;
use crate::oram::error::OramError;
use crate::oram::integrity::IntegrityController;
use crate::oram::stats::SystemStats;
use crate::oram::tree_info::TreeInfo;
use crate::oram::Cycle;
use crate::sim::config::SimulatorConfig;
use crate::sim::stash_trace::StashTrace;

/// Wires the ORAM controller, integrity controller, address mapper and DRAM
/// channel controllers together and fans the clock out to them in a fixed
/// order each cycle: DRAM channels first (their completions run the read
/// callbacks), then the integrity controller, then the ORAM controller.
#[derive(Debug)]
pub struct MemorySystem {
    clk: Cycle,
    tree: TreeInfo,
    controller: OramController,
    integrity: IntegrityController,
    mapper: AddrMapper,
    channels: Vec<DramController>,
    stats: SystemStats,
}

impl MemorySystem {
    pub fn new(config: &SimulatorConfig) -> Self {
        let oram = &config.oram;
        let tree = TreeInfo::new(
            oram.base_address_tree,
            oram.length_tree,
            oram.block_size,
            oram.z_blocks,
            oram.arity,
        );
        info!(
            "oram tree: {} buckets, depth {}, {} leaves, headers at {:#x}",
            tree.num_buckets(),
            tree.depth(),
            tree.num_leaves(),
            (oram.length_tree - oram.base_address_tree) * oram.z_blocks as u64
                / (oram.z_blocks as u64 + 1)
        );

        let stash_trace = if oram.trace_stash_occupancy {
            match StashTrace::create(oram, config.dram.num_channels) {
                Ok(trace) => Some(trace),
                Err(err) => {
                    warn!("cannot create stash occupancy trace: {}", err);
                    None
                }
            }
        } else {
            None
        };

        let mut integrity = IntegrityController::new(oram.hash_delay);
        integrity.attach_tree_info(tree.clone());
        let controller = OramController::new(oram, tree.clone(), stash_trace);

        let channels = (0..config.dram.num_channels.max(1))
            .map(|id| DramController::new(id, config.dram))
            .collect();

        Self {
            clk: 0,
            mapper: AddrMapper::new(config.dram.num_channels, oram.block_size),
            tree,
            controller,
            integrity,
            channels,
            stats: SystemStats::default(),
        }
    }

    /// Accept one LLC request. The reference behaviour accepts every send;
    /// back-pressure shows up as queueing delay, not rejection.
    pub fn send(&mut self, req: OramRequest) -> Result<bool, OramError> {
        let kind = req.kind;
        let accepted = self.controller.send(req)?;
        if accepted {
            match kind {
                AccessKind::Read => self.stats.record_read(),
                AccessKind::Write => self.stats.record_write(),
                AccessKind::Other => self.stats.record_other(),
            }
        }
        Ok(accepted)
    }

    pub fn tick(&mut self) -> Result<(), OramError> {
        self.clk += 1;

        let mut completions: Vec<MemRequest> = Vec::new();
        for channel in &mut self.channels {
            channel.tick(|req| completions.push(req));
        }
        for req in completions {
            match req.kind {
                MemAccessKind::HeaderRead => self.controller.on_header_read(req.addr),
                MemAccessKind::DataRead => {
                    self.controller.on_data_read(req.addr, &mut self.integrity)?
                }
                MemAccessKind::DataWrite | MemAccessKind::DummyWrite => {}
            }
        }

        if let Some(signal) = self.integrity.tick() {
            self.controller.integrity_check(signal);
        }

        self.controller.tick(&mut self.channels, &self.mapper)
    }

    pub fn pop_completion(&mut self) -> Option<OramRequest> {
        self.controller.pop_completion()
    }

    pub fn is_idle(&self) -> bool {
        self.controller.is_idle()
    }

    pub fn clk(&self) -> Cycle {
        self.clk
    }

    pub fn tree(&self) -> &TreeInfo {
        &self.tree
    }

    pub fn controller(&self) -> &OramController {
        &self.controller
    }

    pub fn dump(&self) {
        self.controller.dump();
    }

    /// The full counter set, by stable name, for end-of-run reporting.
    pub fn counters(&self) -> Vec<(&'static str, u64)> {
        let oram = self.controller.stats();
        let integrity = self.integrity.stats();
        let posmap = self.controller.position_map();
        vec![
            ("memory_system_cycles", self.clk),
            ("total_num_read_requests", self.stats.num_read_requests()),
            ("total_num_write_requests", self.stats.num_write_requests()),
            ("total_num_other_requests", self.stats.num_other_requests()),
            ("oram_controller_read_requests", oram.read_requests()),
            ("oram_controller_write_requests", oram.write_requests()),
            ("oram_controller_other_requests", oram.other_requests()),
            ("oram_controller_num_stall_tick", oram.num_stall_ticks()),
            ("oram_controller_cumulative_latency", oram.cumulative_latency()),
            ("position_map_num_entries", posmap.num_entries()),
            ("position_map_num_remaps", posmap.num_remaps()),
            ("integrity_controller_idle_cycles", integrity.idle_cycles()),
            ("integrity_controller_active_cycles", integrity.active_cycles()),
            ("integrity_controller_num_reqs", integrity.num_reqs()),
            ("integrity_controller_latency", integrity.latency()),
        ]
    }
}
