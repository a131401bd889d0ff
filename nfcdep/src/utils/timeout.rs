// nfcdep-rs/nfcdep/src/utils/timeout.rs

//! Timeout helpers used across the crate.
//!
//! Protocol deadlines are expressed in carrier cycles (1/fc, fc = 13.56 MHz)
//! while transports usually want a `Duration`; these helpers convert
//! between the two.

use std::time::Duration;

use crate::constants::CARRIER_FREQUENCY_HZ;

/// Convert milliseconds to Duration.
pub fn ms(ms: u64) -> Duration {
    Duration::from_millis(ms)
}

/// Convert a number of carrier cycles (1/fc) to a Duration, rounding up to
/// the next microsecond so a deadline is never shortened.
pub fn fc_to_duration(cycles: u32) -> Duration {
    let micros = (cycles as u64 * 1_000_000).div_ceil(CARRIER_FREQUENCY_HZ);
    Duration::from_micros(micros)
}

/// Convert a Duration to carrier cycles, saturating at `u32::MAX`.
pub fn duration_to_fc(d: Duration) -> u32 {
    let cycles = d.as_micros() * CARRIER_FREQUENCY_HZ as u128 / 1_000_000;
    u32::try_from(cycles).unwrap_or(u32::MAX)
}
