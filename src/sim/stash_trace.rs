use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::oram::Cycle;
use crate::sim::config::OramConfig;

/// Appends one `(cycle, stash occupancy)` row per transaction start to a CSV
/// whose name encodes the run's parameters, so sweeps can be collated by
/// filename alone.
#[derive(Debug)]
pub struct StashTrace {
    writer: BufWriter<File>,
}

impl StashTrace {
    pub fn file_name(config: &OramConfig, num_channels: usize) -> String {
        format!(
            "stash_occupancy_{}_{}_{}_{}_{}_{}_{}_{}.csv",
            config.length_tree,
            config.block_size,
            config.z_blocks,
            config.arity,
            config.stash_size,
            config.encrypt_delay,
            config.hash_delay,
            num_channels
        )
    }

    pub fn create(config: &OramConfig, num_channels: usize) -> std::io::Result<Self> {
        let path = PathBuf::from(Self::file_name(config, num_channels));
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "cycle,stash_occupancy")?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, cycle: Cycle, occupancy_percent: f64) {
        let _ = writeln!(self.writer, "{},{:.2}", cycle, occupancy_percent);
    }
}

impl Drop for StashTrace {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
