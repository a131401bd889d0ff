// nfcdep-rs/nfcdep/src/protocol/dep.rs

//! DEP_REQ / DEP_RES body: `[CMD_TYPE][CMD][PFB][DID?][NAD?][payload]`.

use crate::protocol::parser;
use crate::protocol::pfb::{PduKind, Pfb};
use crate::types::Pni;
use crate::{Error, Result};

/// What the session negotiated; needed to validate the optional fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepContext {
    /// Negotiated DID, `None` when no DID is in use
    pub did: Option<u8>,
    /// NAD use was agreed during activation
    pub nad: bool,
    /// True when the next I-PDU opens a chain (the only place a NAD may appear)
    pub first_in_chain: bool,
}

impl DepContext {
    pub fn new(did: Option<u8>, nad: bool) -> Self {
        Self {
            did,
            nad,
            first_in_chain: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepPdu {
    pub kind: PduKind,
    pub pni: Pni,
    pub did: Option<u8>,
    pub nad: Option<u8>,
    pub payload: Vec<u8>,
}

impl DepPdu {
    pub fn information(pni: Pni, chaining: bool, payload: Vec<u8>) -> Self {
        Self {
            kind: PduKind::Information { chaining },
            pni,
            did: None,
            nad: None,
            payload,
        }
    }

    pub fn ack(pni: Pni) -> Self {
        Self::control(PduKind::Ack, pni)
    }

    pub fn nack(pni: Pni) -> Self {
        Self::control(PduKind::Nack, pni)
    }

    pub fn attention() -> Self {
        Self::control(PduKind::Attention, Pni::new(0))
    }

    pub fn timeout_extension(rtox: u8) -> Self {
        let mut pdu = Self::control(PduKind::TimeoutExtension, Pni::new(0));
        pdu.payload.push(rtox);
        pdu
    }

    fn control(kind: PduKind, pni: Pni) -> Self {
        Self {
            kind,
            pni,
            did: None,
            nad: None,
            payload: Vec::new(),
        }
    }

    pub fn with_did(mut self, did: Option<u8>) -> Self {
        self.did = did;
        self
    }

    pub fn with_nad(mut self, nad: Option<u8>) -> Self {
        self.nad = nad;
        self
    }

    /// RTOX argument of a timeout extension PDU.
    pub fn rtox(&self) -> Option<u8> {
        match self.kind {
            PduKind::TimeoutExtension => self.payload.first().map(|b| b & crate::constants::RTOX_MASK),
            _ => None,
        }
    }

    pub fn chaining(&self) -> bool {
        matches!(self.kind, PduKind::Information { chaining: true })
    }

    /// Header length on the wire for these optional fields, LEN included.
    pub fn header_len(did: Option<u8>, nad: Option<u8>) -> usize {
        crate::constants::DEP_HEADER_LEN + usize::from(did.is_some()) + usize::from(nad.is_some())
    }

    pub fn encode(&self, cmd_type: u8, cmd: u8) -> Vec<u8> {
        let pfb = Pfb::new(self.kind, self.pni)
            .with_did(self.did.is_some())
            .with_nad(self.nad.is_some());
        let mut out = Vec::with_capacity(5 + self.payload.len());
        out.push(cmd_type);
        out.push(cmd);
        out.push(pfb.encode());
        if let Some(did) = self.did {
            out.push(did);
        }
        if let Some(nad) = self.nad {
            out.push(nad);
        }
        out.extend_from_slice(&self.payload);
        out
    }

    pub fn decode(data: &[u8], cmd_type: u8, cmd: u8, ctx: &DepContext) -> Result<Self> {
        parser::ensure_len(data, 3)?;
        parser::expect_command(data, cmd_type, cmd)?;
        let pfb = Pfb::decode(data[2])?;
        let mut idx = 3usize;

        let did = match (pfb.did_present, ctx.did) {
            (true, Some(expected)) => {
                let actual = parser::byte_at(data, idx)?;
                if actual != expected {
                    return Err(Error::MalformedFrame(format!(
                        "DID {} does not match negotiated DID {}",
                        actual, expected
                    )));
                }
                idx += 1;
                Some(actual)
            }
            (false, None) => None,
            (true, None) => {
                return Err(Error::MalformedFrame("DID present but none negotiated".into()));
            }
            (false, Some(_)) => {
                return Err(Error::MalformedFrame("negotiated DID missing".into()));
            }
        };

        let nad = if pfb.nad_present {
            if !pfb.kind.is_information() || !ctx.nad || !ctx.first_in_chain {
                return Err(Error::MalformedFrame(
                    "NAD only allowed on the first I-PDU of a chain when negotiated".into(),
                ));
            }
            let v = parser::byte_at(data, idx)?;
            idx += 1;
            Some(v)
        } else {
            None
        };

        let payload = data[idx..].to_vec();
        match pfb.kind {
            PduKind::Ack | PduKind::Nack | PduKind::Attention if !payload.is_empty() => {
                return Err(Error::MalformedFrame(format!(
                    "{:?} PDU carries {} payload bytes",
                    pfb.kind,
                    payload.len()
                )));
            }
            PduKind::TimeoutExtension if payload.len() != 1 => {
                return Err(Error::InvalidLength {
                    expected: 1,
                    actual: payload.len(),
                });
            }
            _ => {}
        }

        Ok(Self {
            kind: pfb.kind,
            pni: pfb.pni,
            did,
            nad,
            payload,
        })
    }
}
