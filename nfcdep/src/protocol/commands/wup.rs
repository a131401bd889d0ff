// nfcdep-rs/nfcdep/src/protocol/commands/wup.rs

use crate::constants::{CMD_TYPE_REQ, CMD_WUP_REQ, NFCID3_POS};
use crate::protocol::parser;
use crate::types::Nfcid3;
use crate::Result;

/// WUP_REQ (active mode only): `[D4][02][NFCID3 x10][DID]`
pub fn encode_wup_req(nfcid3: &Nfcid3, did: u8) -> Vec<u8> {
    let mut v = Vec::with_capacity(13);
    v.push(CMD_TYPE_REQ);
    v.push(CMD_WUP_REQ);
    v.extend_from_slice(nfcid3.as_bytes());
    v.push(did);
    v
}

pub fn decode_wup_req(data: &[u8]) -> Result<(Nfcid3, u8)> {
    parser::ensure_len_range(data, 13, 13)?;
    parser::expect_command(data, CMD_TYPE_REQ, CMD_WUP_REQ)?;
    Ok((parser::nfcid3_at(data, NFCID3_POS)?, data[12]))
}
