// nfcdep-rs/nfcdep/src/protocol/responses/atr.rs

use crate::constants::{
    ATR_RES_MAX_LEN, ATR_RES_MIN_LEN, CMD_ATR_RES, CMD_TYPE_RES, NFCID3_POS, PP_GB_PRESENT,
    PP_NAD_PRESENT, WT_MASK,
};
use crate::protocol::{params, parser};
use crate::types::{LengthReduction, Nfcid3};
use crate::Result;

/// ATR_RES: `[D5][01][NFCID3t x10][DIDt][BSt][BRt][TO][PPt][Gt...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtrRes {
    pub nfcid3: Nfcid3,
    pub did: u8,
    pub bs: u8,
    pub br: u8,
    /// WT code carried in the TO byte
    pub wt: u8,
    pub lr: LengthReduction,
    /// Target accepted NAD
    pub nad: bool,
    pub gb: Vec<u8>,
}

impl AtrRes {
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
        let mut v = Vec::with_capacity(ATR_RES_MIN_LEN + self.gb.len());
        v.push(CMD_TYPE_RES);
        v.push(CMD_ATR_RES);
        v.extend_from_slice(self.nfcid3.as_bytes());
        v.push(self.did);
        v.push(self.bs);
        v.push(self.br);
        v.push(self.wt & WT_MASK);
        v.push(self.pp());
        v.extend_from_slice(&self.gb);
        v
    }

    /// Length is validated before any field is looked at.
    pub fn decode(data: &[u8]) -> Result<Self> {
        parser::ensure_len_range(data, ATR_RES_MIN_LEN, ATR_RES_MAX_LEN)?;
        parser::expect_command(data, CMD_TYPE_RES, CMD_ATR_RES)?;
        let nfcid3 = parser::nfcid3_at(data, NFCID3_POS)?;
        let pp = data[16];
        Ok(Self {
            nfcid3,
            did: data[12],
            bs: data[13],
            br: data[14],
            wt: data[15] & WT_MASK,
            lr: LengthReduction::from_code(params::pp_to_lr(pp)),
            nad: pp & PP_NAD_PRESENT != 0,
            gb: data[ATR_RES_MIN_LEN..].to_vec(),
        })
    }
}
