pub mod config;
pub mod stash_trace;
pub mod system;
pub mod top;

pub use config::{load_config, OramConfig, SimConfig, SimulatorConfig};
pub use stash_trace::StashTrace;
pub use system::MemorySystem;
pub use top::SimTop;
