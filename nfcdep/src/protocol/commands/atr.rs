// nfcdep-rs/nfcdep/src/protocol/commands/atr.rs

use crate::constants::{
    ATR_REQ_MAX_LEN, ATR_REQ_MIN_LEN, CMD_ATR_REQ, CMD_TYPE_REQ, GB_MAX_LEN, NFCID3_POS,
    PP_GB_PRESENT, PP_NAD_PRESENT,
};
use crate::protocol::{params, parser};
use crate::types::{LengthReduction, Nfcid3};
use crate::{Error, Result};

/// ATR_REQ: `[D4][00][NFCID3i x10][DIDi][BSi][BRi][PPi][Gi...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtrReq {
    pub nfcid3: Nfcid3,
    pub did: u8,
    pub bs: u8,
    pub br: u8,
    pub lr: LengthReduction,
    /// Initiator wants to use NAD
    pub nad: bool,
    pub gb: Vec<u8>,
}

impl AtrReq {
    pub fn pp(&self) -> u8 {
        let mut pp = params::lr_to_pp(self.lr.code());
        if !self.gb.is_empty() {
            pp |= PP_GB_PRESENT;
        }
        if self.nad {
            pp |= PP_NAD_PRESENT;
        }
        pp
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(ATR_REQ_MIN_LEN + self.gb.len());
        v.push(CMD_TYPE_REQ);
        v.push(CMD_ATR_REQ);
        v.extend_from_slice(self.nfcid3.as_bytes());
        v.push(self.did);
        v.push(self.bs);
        v.push(self.br);
        v.push(self.pp());
        v.extend_from_slice(&self.gb);
        v
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        parser::ensure_len_range(data, ATR_REQ_MIN_LEN, ATR_REQ_MAX_LEN)?;
        parser::expect_command(data, CMD_TYPE_REQ, CMD_ATR_REQ)?;
        let nfcid3 = parser::nfcid3_at(data, NFCID3_POS)?;
        let pp = data[15];
        let gb = data[ATR_REQ_MIN_LEN..].to_vec();
        if gb.len() > GB_MAX_LEN {
            return Err(Error::InvalidLength {
                expected: GB_MAX_LEN,
                actual: gb.len(),
            });
        }
        Ok(Self {
            nfcid3,
            did: data[12],
            bs: data[13],
            br: data[14],
            lr: LengthReduction::from_code(params::pp_to_lr(pp)),
            nad: pp & PP_NAD_PRESENT != 0,
            gb,
        })
    }
}
