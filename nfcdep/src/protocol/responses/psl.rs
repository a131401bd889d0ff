// nfcdep-rs/nfcdep/src/protocol/responses/psl.rs

use crate::constants::{CMD_PSL_RES, CMD_TYPE_RES};
use crate::protocol::parser;
use crate::Result;

/// PSL_RES: `[D5][05][DID]`
pub fn encode_psl_res(did: u8) -> Vec<u8> {
    vec![CMD_TYPE_RES, CMD_PSL_RES, did]
}

pub fn decode_psl_res(data: &[u8]) -> Result<u8> {
    parser::ensure_len_range(data, 3, 3)?;
    parser::expect_command(data, CMD_TYPE_RES, CMD_PSL_RES)?;
    Ok(data[2])
}
