// nfcdep-rs/nfcdep/src/types.rs

use crate::Error;
use crate::constants::{DID_KEEP, DID_MAX, DID_NO, NFCID3_LEN};
use derive_more::Display;
use std::convert::TryFrom;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// NFCID3 - Newtype Pattern (10 バイト)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Nfcid3([u8; NFCID3_LEN]);

impl Nfcid3 {
    pub fn from_bytes(bytes: [u8; NFCID3_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an NFCID3 from a shorter identifier (e.g. an 8 byte NFCID2),
    /// zero filling the remaining bytes. Some peers only accept zero padding.
    pub fn from_partial(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.len() > NFCID3_LEN {
            return Err(Error::InvalidLength {
                expected: NFCID3_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; NFCID3_LEN];
        arr[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; NFCID3_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        crate::utils::bytes_to_hex(self.as_bytes())
    }
}

impl TryFrom<&[u8]> for Nfcid3 {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != NFCID3_LEN {
            return Err(Error::InvalidLength {
                expected: NFCID3_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; NFCID3_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }
}

/// Device identifier. 0 means "no DID", 1..=14 an active DID and 0xFF asks
/// to keep the DID negotiated previously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[display(fmt = "DID {}", _0)]
pub struct Did(u8);

impl Did {
    pub const NONE: Self = Self(DID_NO);
    pub const KEEP: Self = Self(DID_KEEP);

    pub fn new(value: u8) -> crate::Result<Self> {
        if value <= DID_MAX || value == DID_KEEP {
            Ok(Self(value))
        } else {
            Err(Error::InvalidParameter(format!(
                "DID {} outside 0..={} and not the keep sentinel",
                value, DID_MAX
            )))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == DID_NO
    }

    pub fn is_keep(&self) -> bool {
        self.0 == DID_KEEP
    }

    /// The DID as it appears on the wire, `None` when no DID is used.
    pub fn active(&self) -> Option<u8> {
        if self.0 != DID_NO && self.0 <= DID_MAX {
            Some(self.0)
        } else {
            None
        }
    }
}

/// Packet Number Information: 2-bit sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[display(fmt = "{}", _0)]
pub struct Pni(u8);

impl Pni {
    pub const fn new(value: u8) -> Self {
        Self(value & 0x03)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self::new(self.0.wrapping_add(1))
    }

    pub fn prev(&self) -> Self {
        Self::new(self.0.wrapping_add(3))
    }
}

/// Bit rate divisor codes (Dx) used by PSL and the RF layer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitRate {
    #[default]
    #[display(fmt = "106 kbps")]
    Br106 = 0,
    #[display(fmt = "212 kbps")]
    Br212 = 1,
    #[display(fmt = "424 kbps")]
    Br424 = 2,
    #[display(fmt = "848 kbps")]
    Br848 = 3,
    #[display(fmt = "1695 kbps")]
    Br1695 = 4,
    #[display(fmt = "3390 kbps")]
    Br3390 = 5,
    #[display(fmt = "6780 kbps")]
    Br6780 = 6,
}

impl BitRate {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Br106),
            1 => Some(Self::Br212),
            2 => Some(Self::Br424),
            3 => Some(Self::Br848),
            4 => Some(Self::Br1695),
            5 => Some(Self::Br3390),
            6 => Some(Self::Br6780),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Length Reduction: negotiated maximum frame size.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthReduction {
    #[display(fmt = "LR 64")]
    Lr64 = 0,
    #[display(fmt = "LR 128")]
    Lr128 = 1,
    #[display(fmt = "LR 192")]
    Lr192 = 2,
    #[default]
    #[display(fmt = "LR 254")]
    Lr254 = 3,
}

impl LengthReduction {
    /// Only the two low bits are significant so every byte maps to a value.
    pub fn from_code(code: u8) -> Self {
        match code & crate::constants::LR_MASK {
            0 => Self::Lr64,
            1 => Self::Lr128,
            2 => Self::Lr192,
            _ => Self::Lr254,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn frame_size(&self) -> usize {
        crate::protocol::params::lr_to_fs(self.code())
    }
}

/// Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    Initiator,
    Target,
}

/// Communication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommMode {
    #[default]
    Passive,
    Active,
}
