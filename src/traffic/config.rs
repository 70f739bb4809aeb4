use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficConfig {
    pub enabled: bool,
    pub reqs_per_pattern: u32,
    pub max_inflight: usize,
    pub patterns: Vec<TrafficPatternSpec>,
}

impl Config for TrafficConfig {}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reqs_per_pattern: 1024,
            max_inflight: 4,
            patterns: vec![TrafficPatternSpec::default()],
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficPatternSpec {
    pub name: String,
    /// sequential | strided | random
    pub kind: String,
    /// read | write
    pub op: String,
    pub base: u64,
    /// Stride between consecutive requests, in blocks.
    pub stride: u64,
    /// Size of the touched region, in blocks.
    pub span_blocks: u64,
    pub seed: u64,
}

impl Default for TrafficPatternSpec {
    fn default() -> Self {
        Self {
            name: "sequential".to_string(),
            kind: "sequential".to_string(),
            op: "read".to_string(),
            base: 0,
            stride: 1,
            span_blocks: 4096,
            seed: 0,
        }
    }
}
