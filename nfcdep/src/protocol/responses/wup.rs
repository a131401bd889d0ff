// nfcdep-rs/nfcdep/src/protocol/responses/wup.rs

use crate::constants::{CMD_TYPE_RES, CMD_WUP_RES};
use crate::protocol::parser;
use crate::Result;

/// WUP_RES: `[D5][03][DID]`
pub fn encode_wup_res(did: u8) -> Vec<u8> {
    vec![CMD_TYPE_RES, CMD_WUP_RES, did]
}

pub fn decode_wup_res(data: &[u8]) -> Result<u8> {
    parser::ensure_len_range(data, 3, 3)?;
    parser::expect_command(data, CMD_TYPE_RES, CMD_WUP_RES)?;
    Ok(data[2])
}
