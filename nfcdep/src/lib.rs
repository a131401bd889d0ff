// nfcdep-rs/nfcdep/src/lib.rs

//! nfcdep
//!
//! Pure Rust implementation of the NFC-DEP peer-to-peer protocol
//! (NFCIP-1 / ECMA-340): activation, bit rate selection, chained data
//! exchange with timeout extension and recovery, and deactivation, for both
//! the Initiator and the Target role.
//!
//! The protocol engine in [`session`] performs no I/O. Drivers in [`link`]
//! connect it to an [`transport::RfTransceiver`].
#![warn(missing_docs)]

pub mod constants;
pub mod error;
pub mod link;
pub mod prelude;
pub mod protocol;
pub mod session;
pub mod test_support;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export common types at crate root so `crate::Error`, `crate::Result`,
// and the newtypes in `types` are available for consumers and for
// convenient `prelude` re-exports.
pub use crate::error::*;
pub use crate::types::*;

pub use prelude::*;
