// nfcdep-rs/nfcdep/src/session/supervisor.rs

//! Timeout and retry supervision. Owns the five retry counters, the
//! response waiting time and the outstanding RTOX factor.

use derive_more::Display;
use log::warn;

use crate::constants::{RTOX_MAX, RTOX_MIN};
use crate::protocol::params;
use crate::session::config::RetryLimits;
use crate::{Error, Result};

/// リトライ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RetryKind {
    #[display(fmt = "retransmit")]
    Retransmit,
    #[display(fmt = "timeout")]
    Timeout,
    #[display(fmt = "NACK")]
    Nack,
    #[display(fmt = "RTOX")]
    Rtox,
    #[display(fmt = "ATN")]
    Attention,
}

impl RetryKind {
    pub const ALL: [RetryKind; 5] = [
        RetryKind::Retransmit,
        RetryKind::Timeout,
        RetryKind::Nack,
        RetryKind::Rtox,
        RetryKind::Attention,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn limit(self, limits: &RetryLimits) -> u8 {
        match self {
            RetryKind::Retransmit => limits.retransmit,
            RetryKind::Timeout => limits.timeout,
            RetryKind::Nack => limits.nack,
            RetryKind::Rtox => limits.rtox,
            RetryKind::Attention => limits.attention,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Supervisor {
    limits: RetryLimits,
    counts: [u8; 5],
    rwt: u32,
    extension: Option<u8>,
}

impl Supervisor {
    pub fn new(limits: RetryLimits, rwt: u32) -> Self {
        Self {
            limits,
            counts: [0; 5],
            rwt,
            extension: None,
        }
    }

    /// Count one recovery event. Fails once the counter reaches its bound.
    pub fn record(&mut self, kind: RetryKind) -> Result<u8> {
        let slot = &mut self.counts[kind.index()];
        *slot = slot.saturating_add(1);
        let count = *slot;
        let limit = kind.limit(&self.limits);
        if count >= limit {
            warn!("{} retries exhausted ({}/{})", kind, count, limit);
            return Err(Error::RetryExhausted(kind));
        }
        warn!("{} recovery {}/{}", kind, count, limit);
        Ok(count)
    }

    pub fn count(&self, kind: RetryKind) -> u8 {
        self.counts[kind.index()]
    }

    /// Clear every counter after a successful in-sequence exchange.
    pub fn reset(&mut self) {
        self.counts = [0; 5];
    }

    pub fn rwt(&self) -> u32 {
        self.rwt
    }

    pub fn set_rwt(&mut self, rwt: u32) {
        self.rwt = rwt;
    }

    /// Deadline for the next response, in 1/fc.
    pub fn response_timeout(&self) -> u32 {
        params::enforced_timeout(self.rwt, self.extension.unwrap_or(1))
    }

    /// Time the Target may spend before it must ask for more time, in 1/fc.
    /// An acknowledged extension stretches it by the RTOX factor. Always
    /// ends an eighth before the Initiator's own deadline runs out.
    pub fn rtox_deadline(&self) -> u32 {
        let window = self.response_timeout();
        window - window / 8
    }

    /// Accept an RTOX request from the peer and return the extended deadline.
    pub fn extend(&mut self, rtox: u8) -> Result<u32> {
        if !(RTOX_MIN..=RTOX_MAX).contains(&rtox) {
            return Err(Error::ProtocolViolation(format!(
                "RTOX {} outside {}..={}",
                rtox, RTOX_MIN, RTOX_MAX
            )));
        }
        self.record(RetryKind::Rtox)?;
        self.extension = Some(rtox);
        Ok(self.response_timeout())
    }

    /// The peer echoed our own RTOX request.
    pub fn set_extension(&mut self, rtox: u8) {
        self.extension = Some(rtox);
    }

    pub fn extension(&self) -> Option<u8> {
        self.extension
    }

    pub fn clear_extension(&mut self) {
        self.extension = None;
    }
}
