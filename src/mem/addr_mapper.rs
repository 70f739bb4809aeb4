use crate::mem::request::MemRequest;

/// Decomposes a linear physical address into a (channel, rank, bank, row,
/// col) vector, interleaving channels at block granularity so consecutive
/// blocks of a path spread across channels.
#[derive(Debug, Clone)]
pub struct AddrMapper {
    num_channels: usize,
    block_bits: u32,
    bank_bits: u32,
    row_bits: u32,
}

impl AddrMapper {
    pub fn new(num_channels: usize, block_size: u64) -> Self {
        Self {
            num_channels: num_channels.max(1),
            block_bits: block_size.max(1).trailing_zeros(),
            bank_bits: 2,
            row_bits: 14,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn apply(&self, req: &mut MemRequest) {
        let block = req.addr >> self.block_bits;
        let channel = (block % self.num_channels as u64) as usize;
        let rest = block / self.num_channels as u64;
        let bank = (rest & ((1 << self.bank_bits) - 1)) as usize;
        let rest = rest >> self.bank_bits;
        let row = (rest & ((1 << self.row_bits) - 1)) as usize;
        let col = (req.addr & ((1 << self.block_bits) - 1)) as usize;
        req.addr_vec = vec![channel, 0, bank, row, col];
    }
}
