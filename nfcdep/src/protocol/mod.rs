// nfcdep-rs/nfcdep/src/protocol/mod.rs

pub mod codec;
pub mod commands;
pub mod dep;
pub mod frame;
pub mod params;
pub mod parser;
pub mod pfb;
pub mod responses;

pub use commands::*;
pub use dep::{DepContext, DepPdu};
pub use frame::Frame;
pub use params::BitRates;
pub use pfb::{PduKind, Pfb};
pub use responses::*;
