use log::warn;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::{Table, Value};

use crate::mem::dram::DramConfig;
use crate::traffic::config::TrafficConfig;

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> Self {
        match section {
            Some(value) => value.clone().try_into().expect("cannot deserialize config"),
            None => {
                warn!("config section not found, using defaults");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub timeout: u64,
    pub log_level: String,
    /// ORAM-system cycles per front-end cycle.
    pub clock_ratio: u64,
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            timeout: 10_000_000,
            log_level: "warn".to_string(),
            clock_ratio: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OramConfig {
    /// Physical extent of the ORAM tree region.
    pub base_address_tree: u64,
    pub length_tree: u64,
    pub block_size: u64,
    pub z_blocks: usize,
    pub arity: u64,
    pub stash_size: usize,
    pub encrypt_delay: u64,
    pub decrypt_delay: u64,
    /// Zero disables the integrity-controller pipeline.
    pub hash_delay: u64,
    pub seed: u64,
    pub trace_stash_occupancy: bool,
}

impl Config for OramConfig {}

impl Default for OramConfig {
    fn default() -> Self {
        Self {
            base_address_tree: 0,
            length_tree: 8 << 20,
            block_size: 64,
            z_blocks: 4,
            arity: 2,
            stash_size: 8192,
            encrypt_delay: 0,
            decrypt_delay: 0,
            hash_delay: 0,
            seed: 0,
            trace_stash_occupancy: false,
        }
    }
}

/// All sections of a simulator run, as parsed from one TOML file.
#[derive(Debug, Clone, Default)]
pub struct SimulatorConfig {
    pub sim: SimConfig,
    pub oram: OramConfig,
    pub dram: DramConfig,
    pub traffic: TrafficConfig,
}

pub fn load_config(contents: &str) -> Result<SimulatorConfig, toml::de::Error> {
    let table: Table = contents.parse()?;
    Ok(SimulatorConfig {
        sim: SimConfig::from_section(table.get("sim")),
        oram: OramConfig::from_section(table.get("oram")),
        dram: DramConfig::from_section(table.get("dram")),
        traffic: TrafficConfig::from_section(table.get("traffic")),
    })
}
