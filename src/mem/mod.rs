pub mod addr_mapper;
pub mod dram;
pub mod request;


pub use addr_mapper::AddrMapper;
pub use dram::{DramConfig, DramController};
pub use request::{AccessKind, MemAccessKind, MemRequest, OramRequest};
