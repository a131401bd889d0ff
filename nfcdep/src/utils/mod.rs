// nfcdep-rs/nfcdep/src/utils/mod.rs

//! Utilities for nfcdep: small, reusable helpers used across the crate.
//!
//! Hex rendering is used by frame tracing; the timeout helpers convert
//! carrier cycles to wall-clock durations for transports.

pub mod hex;
pub mod timeout;

pub use hex::*;
pub use timeout::*;
