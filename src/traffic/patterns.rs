use crate::traffic::config::TrafficPatternSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternOp {
    Read,
    Write,
}

impl PatternOp {
    pub fn is_store(self) -> bool {
        matches!(self, Self::Write)
    }
}

#[derive(Debug, Clone)]
enum PatternKind {
    Strided { stride: u64 },
    Random { seed: u64 },
}

/// One address stream of the synthetic front-end: a name, an op, and a
/// deterministic request-index-to-address rule over a block-granular region.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    pub op: PatternOp,
    base: u64,
    span_blocks: u64,
    block_size: u64,
    kind: PatternKind,
}

impl CompiledPattern {
    pub fn addr(&self, req_idx: u32) -> u64 {
        let span = self.span_blocks.max(1);
        let block = match self.kind {
            PatternKind::Strided { stride } => (req_idx as u64).wrapping_mul(stride) % span,
            PatternKind::Random { seed } => mix64(seed ^ req_idx as u64) % span,
        };
        self.base + block * self.block_size
    }
}

pub fn compile_pattern(
    spec: &TrafficPatternSpec,
    index: usize,
    block_size: u64,
) -> CompiledPattern {
    let op = match spec.op.as_str() {
        "write" | "store" => PatternOp::Write,
        _ => PatternOp::Read,
    };
    let kind = match spec.kind.as_str() {
        "random" | "random_access" => PatternKind::Random { seed: spec.seed },
        "strided" => PatternKind::Strided {
            stride: spec.stride.max(1),
        },
        _ => PatternKind::Strided { stride: 1 },
    };
    let name = if spec.name.is_empty() {
        format!("pattern{}", index)
    } else {
        spec.name.clone()
    };
    CompiledPattern {
        name,
        op,
        base: spec.base,
        span_blocks: spec.span_blocks,
        block_size,
        kind,
    }
}

fn mix64(mut x: u64) -> u64 {
    x ^= x >> 33;
    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
    x ^= x >> 33;
    x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    x ^= x >> 33;
    x
}
