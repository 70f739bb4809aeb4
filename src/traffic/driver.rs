use log::info;

use crate::mem::request::{AccessKind, OramRequest};
use crate::oram::error::OramError;
use crate::sim::system::MemorySystem;
use crate::traffic::config::TrafficConfig;
use crate::traffic::patterns::{compile_pattern, CompiledPattern, PatternOp};

/// Synthetic front-end standing in for a trace-driven LLC: plays the
/// configured patterns one after another, keeping at most `max_inflight`
/// requests outstanding, and reports a checkpoint when a pattern finishes.
#[derive(Debug)]
pub struct TrafficDriver {
    reqs_per_pattern: u32,
    max_inflight: usize,
    patterns: Vec<CompiledPattern>,
    pattern_idx: usize,
    next_req: u32,
    next_id: u64,
    inflight: usize,
    done: bool,
}

impl TrafficDriver {
    pub fn new(config: &TrafficConfig, block_size: u64) -> Self {
        let patterns = config
            .patterns
            .iter()
            .enumerate()
            .map(|(idx, spec)| compile_pattern(spec, idx, block_size))
            .collect::<Vec<_>>();
        Self {
            reqs_per_pattern: config.reqs_per_pattern,
            max_inflight: config.max_inflight.max(1),
            done: !config.enabled || patterns.is_empty(),
            patterns,
            pattern_idx: 0,
            next_req: 0,
            next_id: 0,
            inflight: 0,
        }
    }

    /// All patterns issued and every outstanding request answered.
    pub fn done(&self) -> bool {
        self.done && self.inflight == 0
    }

    pub fn tick(&mut self, mem: &mut MemorySystem) -> Result<(), OramError> {
        while mem.pop_completion().is_some() {
            self.inflight = self.inflight.saturating_sub(1);
        }
        if self.done {
            return Ok(());
        }

        while self.inflight < self.max_inflight {
            if self.next_req >= self.reqs_per_pattern {
                info!(
                    "pattern {} finished issuing at cycle {}",
                    self.patterns[self.pattern_idx].name,
                    mem.clk()
                );
                self.pattern_idx += 1;
                self.next_req = 0;
                if self.pattern_idx >= self.patterns.len() {
                    self.done = true;
                    return Ok(());
                }
            }
            let pattern = &self.patterns[self.pattern_idx];
            let kind = match pattern.op {
                PatternOp::Read => AccessKind::Read,
                PatternOp::Write => AccessKind::Write,
            };
            let req = OramRequest::new(self.next_id, pattern.addr(self.next_req), kind);
            mem.send(req)?;
            self.next_id += 1;
            self.next_req += 1;
            self.inflight += 1;
        }
        Ok(())
    }
}
