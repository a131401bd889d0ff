// nfcdep-rs/nfcdep/src/error.rs

use thiserror::Error;

use crate::session::supervisor::RetryKind;

/// 共通エラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unexpected command: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedCommand { expected: u8, actual: u8 },

    #[error("no response within the waiting time")]
    Timeout,

    #[error("transmission error reported by the transceiver")]
    TransmissionError,

    #[error("sequence mismatch: expected PNI {expected}, got {actual}")]
    SequenceMismatch { expected: u8, actual: u8 },

    #[error("negotiation mismatch: {0}")]
    NegotiationMismatch(String),

    #[error("operation cancelled by a pending deactivation")]
    Cancelled,

    #[error("retry budget exhausted: {0}")]
    RetryExhausted(RetryKind),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("operation {operation} not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: String,
    },

    #[error("receive buffer overflow: capacity {capacity}, required {required}")]
    BufferOverflow { capacity: usize, required: usize },

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// True for every error raised because a received buffer violated the
    /// wire format.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::MalformedFrame(_) | Error::InvalidLength { .. } | Error::UnexpectedCommand { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
