// nfcdep-rs/nfcdep/src/protocol/pfb.rs

//! Payload Flow Byte. The rest of the crate only sees the decoded
//! [`Pfb`] structure; the bit layout lives here.
//!
//! ```text
//! bit 7..5  PDU type   000 I, 010 ACK/NACK, 100 supervisory
//! bit 4     MI (I) / NACK (ACK) / RTOX (supervisory)
//! bit 3     NAD present
//! bit 2     DID present
//! bit 1..0  PNI
//! ```

use crate::types::Pni;
use crate::{Error, Result};

const TYPE_MASK: u8 = 0xE0;
const TYPE_I: u8 = 0x00;
const TYPE_ACK: u8 = 0x40;
const TYPE_SUPERVISORY: u8 = 0x80;
const FLAG_MI: u8 = 0x10;
const FLAG_NAD: u8 = 0x08;
const FLAG_DID: u8 = 0x04;
const PNI_MASK: u8 = 0x03;

/// Decoded PDU kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduKind {
    /// Information PDU; `chaining` is the MI bit.
    Information { chaining: bool },
    Ack,
    Nack,
    /// Supervisory ATTENTION
    Attention,
    /// Supervisory RTOX (timeout extension request or its echo)
    TimeoutExtension,
}

impl PduKind {
    pub fn is_information(&self) -> bool {
        matches!(self, PduKind::Information { .. })
    }

    pub fn is_supervisory(&self) -> bool {
        matches!(self, PduKind::Attention | PduKind::TimeoutExtension)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pfb {
    pub kind: PduKind,
    pub pni: Pni,
    pub did_present: bool,
    pub nad_present: bool,
}

impl Pfb {
    pub fn new(kind: PduKind, pni: Pni) -> Self {
        Self {
            kind,
            pni,
            did_present: false,
            nad_present: false,
        }
    }

    pub fn with_did(mut self, present: bool) -> Self {
        self.did_present = present;
        self
    }

    pub fn with_nad(mut self, present: bool) -> Self {
        self.nad_present = present;
        self
    }

    pub fn encode(&self) -> u8 {
        let mut b = match self.kind {
            PduKind::Information { chaining: false } => TYPE_I,
            PduKind::Information { chaining: true } => TYPE_I | FLAG_MI,
            PduKind::Ack => TYPE_ACK,
            PduKind::Nack => TYPE_ACK | FLAG_MI,
            PduKind::Attention => TYPE_SUPERVISORY,
            PduKind::TimeoutExtension => TYPE_SUPERVISORY | FLAG_MI,
        };
        if self.did_present {
            b |= FLAG_DID;
        }
        if self.nad_present {
            b |= FLAG_NAD;
        }
        b | (self.pni.value() & PNI_MASK)
    }

    pub fn decode(b: u8) -> Result<Self> {
        let mi = b & FLAG_MI != 0;
        let kind = match b & TYPE_MASK {
            TYPE_I => PduKind::Information { chaining: mi },
            TYPE_ACK if mi => PduKind::Nack,
            TYPE_ACK => PduKind::Ack,
            TYPE_SUPERVISORY if mi => PduKind::TimeoutExtension,
            TYPE_SUPERVISORY => PduKind::Attention,
            other => {
                return Err(Error::MalformedFrame(format!(
                    "reserved PFB type {:#04x}",
                    other
                )));
            }
        };
        #[cfg(feature = "diagnostics")]
        log::trace!("pfb {:#04x} -> {:?}", b, kind);
        Ok(Self {
            kind,
            pni: Pni::new(b & PNI_MASK),
            did_present: b & FLAG_DID != 0,
            nad_present: b & FLAG_NAD != 0,
        })
    }
}
