// nfcdep-rs/nfcdep/src/protocol/responses/mod.rs

pub mod atr;
pub mod psl;
pub mod wup;

pub use atr::AtrRes;
pub use psl::{decode_psl_res, encode_psl_res};
pub use wup::{decode_wup_res, encode_wup_res};

use crate::constants::*;
use crate::protocol::commands::{decode_did_only, encode_did_only};
use crate::protocol::dep::{DepContext, DepPdu};
use crate::protocol::parser;
use crate::{Error, Result};

/// High-level response enum (Target -> Initiator). Per-response decoders
/// live in `protocol::responses::<name>.rs` and are dispatched here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Atr(AtrRes),
    Wup { did: u8 },
    Psl { did: u8 },
    Dep(DepPdu),
    Dsl { did: Option<u8> },
    Rls { did: Option<u8> },
}

impl Response {
    /// Encode the response into its PDU body (no LEN / SB).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Atr(res) => res.encode(),
            Self::Wup { did } => encode_wup_res(*did),
            Self::Psl { did } => encode_psl_res(*did),
            Self::Dep(pdu) => pdu.encode(CMD_TYPE_RES, CMD_DEP_RES),
            Self::Dsl { did } => encode_did_only(CMD_TYPE_RES, CMD_DSL_RES, *did),
            Self::Rls { did } => encode_did_only(CMD_TYPE_RES, CMD_RLS_RES, *did),
        }
    }

    /// Decode a response body for the given request command code. The
    /// response code must be the request code + 1.
    pub fn decode(expected_cmd: u8, data: &[u8], ctx: &DepContext) -> Result<Self> {
        // Fast-fail on the two header bytes so the per-response decoders
        // never index into an empty slice.
        parser::ensure_len(data, 2)?;
        let expected_response = expected_cmd.wrapping_add(1);
        parser::expect_command(data, CMD_TYPE_RES, expected_response)?;

        match expected_response {
            CMD_ATR_RES => Ok(Self::Atr(AtrRes::decode(data)?)),
            CMD_WUP_RES => Ok(Self::Wup {
                did: decode_wup_res(data)?,
            }),
            CMD_PSL_RES => Ok(Self::Psl {
                did: decode_psl_res(data)?,
            }),
            CMD_DEP_RES => Ok(Self::Dep(DepPdu::decode(
                data,
                CMD_TYPE_RES,
                CMD_DEP_RES,
                ctx,
            )?)),
            CMD_DSL_RES => {
                decode_did_only(data, CMD_TYPE_RES, CMD_DSL_RES, ctx.did)?;
                Ok(Self::Dsl { did: ctx.did })
            }
            CMD_RLS_RES => {
                decode_did_only(data, CMD_TYPE_RES, CMD_RLS_RES, ctx.did)?;
                Ok(Self::Rls { did: ctx.did })
            }
            _ => Err(Error::UnexpectedCommand {
                expected: expected_response,
                actual: data[1],
            }),
        }
    }

    /// Return the response code byte associated with this variant.
    pub fn response_code(&self) -> u8 {
        match self {
            Response::Atr(_) => CMD_ATR_RES,
            Response::Wup { .. } => CMD_WUP_RES,
            Response::Psl { .. } => CMD_PSL_RES,
            Response::Dep(_) => CMD_DEP_RES,
            Response::Dsl { .. } => CMD_DSL_RES,
            Response::Rls { .. } => CMD_RLS_RES,
        }
    }
}
