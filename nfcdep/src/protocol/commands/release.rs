// nfcdep-rs/nfcdep/src/protocol/commands/release.rs

//! DSL (deselect) and RLS (release) carry nothing but an optional DID, in
//! both directions.

use crate::protocol::parser;
use crate::{Error, Result};

pub fn encode_did_only(cmd_type: u8, cmd: u8, did: Option<u8>) -> Vec<u8> {
    let mut v = vec![cmd_type, cmd];
    if let Some(did) = did {
        v.push(did);
    }
    v
}

/// Decode a DID-only body and check the DID against the negotiated one.
pub fn decode_did_only(data: &[u8], cmd_type: u8, cmd: u8, expected: Option<u8>) -> Result<()> {
    parser::ensure_len_range(data, 2, 3)?;
    parser::expect_command(data, cmd_type, cmd)?;
    let actual = data.get(2).copied();
    if actual != expected {
        return Err(Error::MalformedFrame(format!(
            "DID {:?} does not match negotiated {:?}",
            actual, expected
        )));
    }
    Ok(())
}
