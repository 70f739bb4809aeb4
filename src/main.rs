use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use oramulator::sim::{load_config, SimTop, SimulatorConfig};

#[derive(Parser)]
#[command(version, about)]
struct OramulatorArgs {
    /// TOML configuration file; defaults apply when omitted.
    config: Option<PathBuf>,

    #[arg(long)]
    timeout: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    channels: Option<usize>,
    #[arg(long)]
    trace_stash: bool,
}

pub fn main() -> ExitCode {
    env_logger::init();
    let argv = OramulatorArgs::parse();

    let mut config = match &argv.config {
        Some(path) => {
            let contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(err) => {
                    error!("cannot read {}: {}", path.display(), err);
                    return ExitCode::FAILURE;
                }
            };
            match load_config(&contents) {
                Ok(config) => config,
                Err(err) => {
                    error!("cannot parse {}: {}", path.display(), err);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => SimulatorConfig::default(),
    };

    config.sim.timeout = argv.timeout.unwrap_or(config.sim.timeout);
    config.oram.seed = argv.seed.unwrap_or(config.oram.seed);
    config.dram.num_channels = argv.channels.unwrap_or(config.dram.num_channels);
    config.oram.trace_stash_occupancy |= argv.trace_stash;

    let mut top = SimTop::new(&config);
    match top.run() {
        Ok(cycles) => {
            log::info!("simulation quiescent after {} front-end cycles", cycles);
            top.print_counters();
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("fatal: {}", err);
            top.mem.dump();
            top.print_counters();
            ExitCode::FAILURE
        }
    }
}
