// nfcdep-rs/nfcdep/src/protocol/parser.rs

use crate::constants::NFCID3_LEN;
use crate::types::Nfcid3;
use crate::{Error, Result};

/// Ensure the slice has at least `min` bytes.
pub fn ensure_len(data: &[u8], min: usize) -> Result<()> {
    if data.len() < min {
        return Err(Error::InvalidLength {
            expected: min,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Ensure the slice length lies within `min..=max`.
pub fn ensure_len_range(data: &[u8], min: usize, max: usize) -> Result<()> {
    ensure_len(data, min)?;
    if data.len() > max {
        return Err(Error::InvalidLength {
            expected: max,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Return a subslice with bounds checking.
pub fn slice_at(data: &[u8], idx: usize, len: usize) -> Result<&[u8]> {
    ensure_len(data, idx + len)?;
    Ok(&data[idx..idx + len])
}

/// Parse an NFCID3 (10 bytes) at `start` index with bounds checking.
pub fn nfcid3_at(data: &[u8], start: usize) -> Result<Nfcid3> {
    let s = slice_at(data, start, NFCID3_LEN)?;
    Nfcid3::try_from(s)
}

/// Read a single byte at `idx` with bounds checking.
pub fn byte_at(data: &[u8], idx: usize) -> Result<u8> {
    ensure_len(data, idx + 1)?;
    Ok(data[idx])
}

/// Ensure the body starts with `[cmd_type][cmd]`. Returns
/// UnexpectedCommand on mismatch.
pub fn expect_command(data: &[u8], cmd_type: u8, cmd: u8) -> Result<()> {
    let actual_type = byte_at(data, 0)?;
    if actual_type != cmd_type {
        return Err(Error::UnexpectedCommand {
            expected: cmd_type,
            actual: actual_type,
        });
    }
    let actual = byte_at(data, 1)?;
    if actual != cmd {
        return Err(Error::UnexpectedCommand {
            expected: cmd,
            actual,
        });
    }
    Ok(())
}
