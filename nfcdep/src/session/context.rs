// nfcdep-rs/nfcdep/src/session/context.rs

//! Per-session protocol context, owned by one role machine.

use log::trace;

use crate::protocol::commands::AtrReq;
use crate::protocol::dep::{DepContext, DepPdu};
use crate::protocol::params::{self, BitRates};
use crate::protocol::responses::AtrRes;
use crate::protocol::Frame;
use crate::session::config::{OperConfig, RetryLimits};
use crate::session::exchange::{Fragmenter, Reassembler};
use crate::session::supervisor::Supervisor;
use crate::types::{BitRate, CommMode, Did, LengthReduction, Pni};
use crate::utils::HexDump;
use crate::Result;

/// Parameters agreed during activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Length of the peer's general bytes
    pub gb_len: usize,
    pub lr: LengthReduction,
    pub fs: usize,
    pub wt: u8,
    /// Response waiting time, 1/fc
    pub rwt: u32,
    /// Margin added to every deadline, 1/fc
    pub d_rwt: u32,
    pub rates: BitRates,
    pub did: Did,
    /// NAD value to send (Initiator) or echo (Target), present when agreed
    pub nad: Option<u8>,
    pub nad_agreed: bool,
}

impl DeviceInfo {
    pub fn new(lr: LengthReduction, wt: u8, did: Did, rate: BitRate) -> Self {
        let wt = params::clamp_wt(wt);
        Self {
            gb_len: 0,
            lr,
            fs: lr.frame_size(),
            wt,
            rwt: params::wt_to_rwt(wt),
            d_rwt: params::rwt_delta(),
            rates: BitRates::symmetric(rate),
            did,
            nad: None,
            nad_agreed: false,
        }
    }

    /// Largest payload of one I-PDU with the given optional fields.
    pub fn max_inf(&self, with_nad: bool) -> usize {
        let nad = if with_nad && self.nad_agreed {
            Some(0)
        } else {
            None
        };
        self.fs - DepPdu::header_len(self.did.active(), nad)
    }
}

/// Role specific part of the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleData {
    /// `atr_res` is filled in once activation succeeded
    Initiator { atr_res: Option<AtrRes> },
    Target { atr_req: AtrReq, pending_tx: bool },
}

#[derive(Debug, Clone)]
pub struct Context {
    pub comm_mode: CommMode,
    pub oper: OperConfig,
    pub info: DeviceInfo,
    pub pni: Pni,
    pub supervisor: Supervisor,
    pub tx: Fragmenter,
    pub rx: Reassembler,
    /// Last frame put on the air, kept for retransmission
    pub last_frame: Option<Vec<u8>>,
    /// Rate the RF link currently runs at
    pub bit_rate: BitRate,
    pub role: RoleData,
}

impl Context {
    pub fn new(
        comm_mode: CommMode,
        oper: OperConfig,
        limits: RetryLimits,
        info: DeviceInfo,
        max_rx_len: usize,
        bit_rate: BitRate,
        role: RoleData,
    ) -> Self {
        Self {
            comm_mode,
            oper,
            supervisor: Supervisor::new(limits, info.rwt),
            info,
            pni: Pni::new(0),
            tx: Fragmenter::new(oper.full_chaining),
            rx: Reassembler::new(max_rx_len),
            last_frame: None,
            bit_rate,
            role,
        }
    }

    /// The start byte is only used by NFC-A, i.e. passive mode at 106 kbps.
    pub fn start_byte(&self) -> bool {
        uses_start_byte(self.comm_mode, self.bit_rate)
    }

    /// Validation context for the next inbound DEP PDU.
    pub fn dep_context(&self) -> DepContext {
        DepContext {
            did: self.info.did.active(),
            nad: self.info.nad_agreed,
            first_in_chain: self.rx.at_chain_start(),
        }
    }

    /// Frame a body and remember it for retransmission.
    pub fn frame(&mut self, body: &[u8]) -> Result<Vec<u8>> {
        let frame = Frame::encode(body, self.start_byte())?;
        trace!("TX {}", HexDump(&frame));
        self.last_frame = Some(frame.clone());
        Ok(frame)
    }

    /// Frame a body without replacing the retransmission copy.
    pub fn frame_once(&self, body: &[u8]) -> Result<Vec<u8>> {
        let frame = Frame::encode(body, self.start_byte())?;
        trace!("TX {}", HexDump(&frame));
        Ok(frame)
    }

    pub fn unframe(&self, frame: &[u8]) -> Result<Vec<u8>> {
        trace!("RX {}", HexDump(frame));
        Frame::decode(frame, self.start_byte())
    }

    pub fn switch_bit_rate(&mut self, rates: BitRates) {
        self.info.rates = rates;
        self.bit_rate = rates.dsi;
    }
}

pub fn uses_start_byte(mode: CommMode, rate: BitRate) -> bool {
    mode == CommMode::Passive && rate == BitRate::Br106
}
