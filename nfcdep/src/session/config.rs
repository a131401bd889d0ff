// nfcdep-rs/nfcdep/src/session/config.rs

//! Session configuration. Every type has a `Default` and `with_*` setters;
//! `validate()` is called by the state machines before anything is sent.

use crate::constants::{GB_MAX_LEN, RTOX_MAX, RTOX_MIN, WT_MAX};
use crate::protocol::params::BitRates;
use crate::types::{BitRate, CommMode, Did, LengthReduction, Nfcid3};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default receive capacity for a reassembled payload.
pub const DEFAULT_MAX_RX_LEN: usize = 4096;

/// Operation flags shared by both roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OperConfig {
    /// Initiator: honour RTOX requests. Target: send RTOX requests.
    pub rtox_enabled: bool,
    /// Use ATN for recovery and presence probing
    pub atn_enabled: bool,
    /// Allow I-PDUs without payload
    pub empty_pdu_allowed: bool,
    /// Chained I-PDUs are always full sized
    pub full_chaining: bool,
}

impl Default for OperConfig {
    fn default() -> Self {
        Self {
            rtox_enabled: true,
            atn_enabled: true,
            empty_pdu_allowed: true,
            full_chaining: false,
        }
    }
}

impl OperConfig {
    pub const RTOX_DISABLED: u8 = 0x01;
    pub const ATN_ENABLED: u8 = 0x02;
    pub const EMPTY_PDU_DISABLED: u8 = 0x04;
    pub const FULL_CHAINING: u8 = 0x08;

    /// Build from the compact operation parameter byte.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            rtox_enabled: bits & Self::RTOX_DISABLED == 0,
            atn_enabled: bits & Self::ATN_ENABLED != 0,
            empty_pdu_allowed: bits & Self::EMPTY_PDU_DISABLED == 0,
            full_chaining: bits & Self::FULL_CHAINING != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut b = 0;
        if !self.rtox_enabled {
            b |= Self::RTOX_DISABLED;
        }
        if self.atn_enabled {
            b |= Self::ATN_ENABLED;
        }
        if !self.empty_pdu_allowed {
            b |= Self::EMPTY_PDU_DISABLED;
        }
        if self.full_chaining {
            b |= Self::FULL_CHAINING;
        }
        b
    }

    pub fn with_rtox(mut self, enabled: bool) -> Self {
        self.rtox_enabled = enabled;
        self
    }

    pub fn with_attention(mut self, enabled: bool) -> Self {
        self.atn_enabled = enabled;
        self
    }

    pub fn with_empty_pdu(mut self, allowed: bool) -> Self {
        self.empty_pdu_allowed = allowed;
        self
    }

    pub fn with_full_chaining(mut self, enabled: bool) -> Self {
        self.full_chaining = enabled;
        self
    }
}

/// Upper bound of each retry counter. A bound of N means the N-th
/// consecutive event is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetryLimits {
    pub retransmit: u8,
    pub timeout: u8,
    pub nack: u8,
    pub rtox: u8,
    pub attention: u8,
}

impl Default for RetryLimits {
    fn default() -> Self {
        Self {
            retransmit: 3,
            timeout: 3,
            nack: 3,
            rtox: 10,
            attention: 3,
        }
    }
}

impl RetryLimits {
    /// Same bound for every counter.
    pub fn uniform(limit: u8) -> Self {
        Self {
            retransmit: limit,
            timeout: limit,
            nack: limit,
            rtox: limit,
            attention: limit,
        }
    }

    pub fn with_nack(mut self, limit: u8) -> Self {
        self.nack = limit;
        self
    }

    pub fn with_timeout(mut self, limit: u8) -> Self {
        self.timeout = limit;
        self
    }

    pub fn with_retransmit(mut self, limit: u8) -> Self {
        self.retransmit = limit;
        self
    }

    pub fn with_rtox(mut self, limit: u8) -> Self {
        self.rtox = limit;
        self
    }

    pub fn with_attention(mut self, limit: u8) -> Self {
        self.attention = limit;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            self.retransmit,
            self.timeout,
            self.nack,
            self.rtox,
            self.attention,
        ];
        if all.contains(&0) {
            return Err(Error::InvalidParameter(
                "retry limits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Bit rate the Initiator asks for once activation is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitRateRequest {
    /// Keep the activation bit rate, PSL is skipped
    #[default]
    Maintain,
    Select(BitRates),
}

impl BitRateRequest {
    pub fn rates(&self) -> Option<BitRates> {
        match self {
            Self::Maintain => None,
            Self::Select(r) => Some(*r),
        }
    }
}

fn validate_gb(gb: &[u8]) -> Result<()> {
    if gb.len() > GB_MAX_LEN {
        return Err(Error::InvalidParameter(format!(
            "{} general bytes, at most {} allowed",
            gb.len(),
            GB_MAX_LEN
        )));
    }
    Ok(())
}

/// Initiator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitiatorConfig {
    pub comm_mode: CommMode,
    /// Bit rate the RF link runs at during activation
    pub bit_rate: BitRate,
    pub oper: OperConfig,
    pub limits: RetryLimits,
    pub nfcid3: Nfcid3,
    /// Proposed DID: none, 1..=14, or keep the previous one
    pub did: Did,
    /// Node address to use when the Target accepts NAD
    pub nad: Option<u8>,
    pub bs: u8,
    pub br: u8,
    pub lr: LengthReduction,
    pub gb: Vec<u8>,
    pub psl: BitRateRequest,
    /// Reject a Target that answers with another NFCID3
    pub expected_nfcid3: Option<Nfcid3>,
    pub max_rx_len: usize,
}

impl Default for InitiatorConfig {
    fn default() -> Self {
        Self {
            comm_mode: CommMode::Passive,
            bit_rate: BitRate::Br106,
            oper: OperConfig::default(),
            limits: RetryLimits::default(),
            nfcid3: Nfcid3::default(),
            did: Did::NONE,
            nad: None,
            bs: 0,
            br: 0,
            lr: LengthReduction::Lr254,
            gb: Vec::new(),
            psl: BitRateRequest::Maintain,
            expected_nfcid3: None,
            max_rx_len: DEFAULT_MAX_RX_LEN,
        }
    }
}

impl InitiatorConfig {
    pub fn new(nfcid3: Nfcid3) -> Self {
        Self {
            nfcid3,
            ..Self::default()
        }
    }

    pub fn with_comm_mode(mut self, mode: CommMode) -> Self {
        self.comm_mode = mode;
        self
    }

    pub fn with_bit_rate(mut self, br: BitRate) -> Self {
        self.bit_rate = br;
        self
    }

    pub fn with_oper(mut self, oper: OperConfig) -> Self {
        self.oper = oper;
        self
    }

    pub fn with_limits(mut self, limits: RetryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_did(mut self, did: Did) -> Self {
        self.did = did;
        self
    }

    pub fn with_nad(mut self, nad: Option<u8>) -> Self {
        self.nad = nad;
        self
    }

    pub fn with_lr(mut self, lr: LengthReduction) -> Self {
        self.lr = lr;
        self
    }

    pub fn with_general_bytes(mut self, gb: impl Into<Vec<u8>>) -> Self {
        self.gb = gb.into();
        self
    }

    pub fn with_psl(mut self, psl: BitRateRequest) -> Self {
        self.psl = psl;
        self
    }

    pub fn with_expected_nfcid3(mut self, nfcid3: Nfcid3) -> Self {
        self.expected_nfcid3 = Some(nfcid3);
        self
    }

    pub fn with_max_rx_len(mut self, len: usize) -> Self {
        self.max_rx_len = len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        Did::new(self.did.value())?;
        validate_gb(&self.gb)?;
        self.limits.validate()?;
        if self.max_rx_len == 0 {
            return Err(Error::InvalidParameter("receive capacity is zero".into()));
        }
        if matches!(self.nad, Some(0)) {
            return Err(Error::InvalidParameter("NAD 0 is reserved".into()));
        }
        Ok(())
    }
}

/// Target configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TargetConfig {
    pub comm_mode: CommMode,
    pub bit_rate: BitRate,
    pub oper: OperConfig,
    pub limits: RetryLimits,
    pub nfcid3: Nfcid3,
    pub bs: u8,
    pub br: u8,
    /// WT code announced in ATR_RES
    pub wt: u8,
    pub lr: LengthReduction,
    pub gb: Vec<u8>,
    /// Agree to NAD when the Initiator asks for it
    pub accept_nad: bool,
    /// Factor carried by RTOX requests
    pub rtox: u8,
    pub max_rx_len: usize,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            comm_mode: CommMode::Passive,
            bit_rate: BitRate::Br106,
            oper: OperConfig::default(),
            limits: RetryLimits::default(),
            nfcid3: Nfcid3::default(),
            bs: 0,
            br: 0,
            wt: 8,
            lr: LengthReduction::Lr254,
            gb: Vec::new(),
            accept_nad: false,
            rtox: 10,
            max_rx_len: DEFAULT_MAX_RX_LEN,
        }
    }
}

impl TargetConfig {
    pub fn new(nfcid3: Nfcid3) -> Self {
        Self {
            nfcid3,
            ..Self::default()
        }
    }

    pub fn with_comm_mode(mut self, mode: CommMode) -> Self {
        self.comm_mode = mode;
        self
    }

    pub fn with_bit_rate(mut self, br: BitRate) -> Self {
        self.bit_rate = br;
        self
    }

    pub fn with_oper(mut self, oper: OperConfig) -> Self {
        self.oper = oper;
        self
    }

    pub fn with_limits(mut self, limits: RetryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_wt(mut self, wt: u8) -> Self {
        self.wt = wt;
        self
    }

    pub fn with_lr(mut self, lr: LengthReduction) -> Self {
        self.lr = lr;
        self
    }

    pub fn with_general_bytes(mut self, gb: impl Into<Vec<u8>>) -> Self {
        self.gb = gb.into();
        self
    }

    pub fn with_accept_nad(mut self, accept: bool) -> Self {
        self.accept_nad = accept;
        self
    }

    pub fn with_rtox(mut self, rtox: u8) -> Self {
        self.rtox = rtox;
        self
    }

    pub fn with_max_rx_len(mut self, len: usize) -> Self {
        self.max_rx_len = len;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.wt > WT_MAX {
            return Err(Error::InvalidParameter(format!(
                "WT {} above {}",
                self.wt, WT_MAX
            )));
        }
        if !(RTOX_MIN..=RTOX_MAX).contains(&self.rtox) {
            return Err(Error::InvalidParameter(format!(
                "RTOX {} outside {}..={}",
                self.rtox, RTOX_MIN, RTOX_MAX
            )));
        }
        // ATR_RES carries one byte more than ATR_REQ before the general bytes
        if self.gb.len() > GB_MAX_LEN - 1 {
            return Err(Error::InvalidParameter(format!(
                "{} general bytes, at most {} allowed",
                self.gb.len(),
                GB_MAX_LEN - 1
            )));
        }
        self.limits.validate()?;
        if self.max_rx_len == 0 {
            return Err(Error::InvalidParameter("receive capacity is zero".into()));
        }
        Ok(())
    }
}
