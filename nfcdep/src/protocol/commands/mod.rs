// nfcdep-rs/nfcdep/src/protocol/commands/mod.rs

pub mod atr;
pub mod psl;
pub mod release;
pub mod wup;

pub use atr::AtrReq;
pub use psl::{decode_psl_req, encode_psl_req};
pub use release::{decode_did_only, encode_did_only};
pub use wup::{decode_wup_req, encode_wup_req};

use crate::constants::*;
use crate::protocol::dep::{DepContext, DepPdu};
use crate::protocol::params::BitRates;
use crate::protocol::parser;
use crate::types::{LengthReduction, Nfcid3};
use crate::{Error, Result};

/// High-level request enum (Initiator -> Target). Per-request encoders live
/// in `protocol::commands::<name>.rs`; DEP_REQ shares `protocol::dep`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Atr(AtrReq),
    Wup {
        nfcid3: Nfcid3,
        did: u8,
    },
    Psl {
        did: u8,
        rates: BitRates,
        fsl: LengthReduction,
    },
    Dep(DepPdu),
    Dsl {
        did: Option<u8>,
    },
    Rls {
        did: Option<u8>,
    },
}

impl Command {
    /// Command byte following CMD_TYPE (ECMA-340 table 7).
    pub fn command_code(&self) -> u8 {
        match self {
            Self::Atr(_) => CMD_ATR_REQ,
            Self::Wup { .. } => CMD_WUP_REQ,
            Self::Psl { .. } => CMD_PSL_REQ,
            Self::Dep(_) => CMD_DEP_REQ,
            Self::Dsl { .. } => CMD_DSL_REQ,
            Self::Rls { .. } => CMD_RLS_REQ,
        }
    }

    /// Encode the request into its PDU body (no LEN / SB).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Atr(req) => req.encode(),
            Self::Wup { nfcid3, did } => encode_wup_req(nfcid3, *did),
            Self::Psl { did, rates, fsl } => encode_psl_req(*did, *rates, *fsl),
            Self::Dep(pdu) => pdu.encode(CMD_TYPE_REQ, CMD_DEP_REQ),
            Self::Dsl { did } => encode_did_only(CMD_TYPE_REQ, CMD_DSL_REQ, *did),
            Self::Rls { did } => encode_did_only(CMD_TYPE_REQ, CMD_RLS_REQ, *did),
        }
    }

    /// Decode a request body. `ctx` carries the negotiated DID/NAD used to
    /// validate DEP, DSL and RLS requests.
    pub fn decode(data: &[u8], ctx: &DepContext) -> Result<Self> {
        parser::ensure_len(data, 2)?;
        let cmd_type = data[0];
        if cmd_type != CMD_TYPE_REQ {
            return Err(Error::UnexpectedCommand {
                expected: CMD_TYPE_REQ,
                actual: cmd_type,
            });
        }

        match data[1] {
            CMD_ATR_REQ => Ok(Self::Atr(AtrReq::decode(data)?)),
            CMD_WUP_REQ => {
                let (nfcid3, did) = decode_wup_req(data)?;
                Ok(Self::Wup { nfcid3, did })
            }
            CMD_PSL_REQ => {
                let (did, rates, fsl) = decode_psl_req(data)?;
                Ok(Self::Psl { did, rates, fsl })
            }
            CMD_DEP_REQ => Ok(Self::Dep(DepPdu::decode(
                data,
                CMD_TYPE_REQ,
                CMD_DEP_REQ,
                ctx,
            )?)),
            CMD_DSL_REQ => {
                decode_did_only(data, CMD_TYPE_REQ, CMD_DSL_REQ, ctx.did)?;
                Ok(Self::Dsl { did: ctx.did })
            }
            CMD_RLS_REQ => {
                decode_did_only(data, CMD_TYPE_REQ, CMD_RLS_REQ, ctx.did)?;
                Ok(Self::Rls { did: ctx.did })
            }
            other => Err(Error::MalformedFrame(format!(
                "unknown request command {:#04x}",
                other
            ))),
        }
    }
}
