use log::warn;

use crate::oram::error::OramError;
use crate::oram::Cycle;
use crate::sim::config::SimulatorConfig;
use crate::sim::system::MemorySystem;
use crate::traffic::driver::TrafficDriver;

/// Top level of a standalone run: the synthetic front-end feeding the
/// memory system, with the configured front-end/memory clock divider.
pub struct SimTop {
    pub mem: MemorySystem,
    driver: TrafficDriver,
    timeout: u64,
    clock_ratio: u64,
}

impl SimTop {
    pub fn new(config: &SimulatorConfig) -> Self {
        Self {
            mem: MemorySystem::new(config),
            driver: TrafficDriver::new(&config.traffic, config.oram.block_size),
            timeout: config.sim.timeout,
            clock_ratio: config.sim.clock_ratio.max(1),
        }
    }

    /// Runs until the traffic drains or the timeout hits. Returns the
    /// front-end cycle at which the run went quiescent.
    pub fn run(&mut self) -> Result<Cycle, OramError> {
        for clk in 0..self.timeout {
            self.driver.tick(&mut self.mem)?;
            if clk % self.clock_ratio == 0 {
                self.mem.tick()?;
            }
            if self.driver.done() && self.mem.is_idle() {
                return Ok(clk);
            }
        }
        warn!("simulation timeout after {} cycles", self.timeout);
        Ok(self.timeout)
    }

    pub fn print_counters(&self) {
        for (name, value) in self.mem.counters() {
            println!("{}: {}", name, value);
        }
    }
}
