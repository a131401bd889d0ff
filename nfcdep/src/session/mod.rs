// nfcdep-rs/nfcdep/src/session/mod.rs

//! Sans-IO session engine. A role machine is advanced by the caller with
//! [`Event`]s and answers with a [`Step`] telling the caller what to put on
//! the air and how long to wait.

pub mod activation;
pub mod config;
pub mod context;
pub mod exchange;
pub mod initiator;
pub mod psl;
pub mod supervisor;
pub mod target;

pub use config::{BitRateRequest, InitiatorConfig, OperConfig, RetryLimits, TargetConfig};
pub use context::{Context, DeviceInfo, RoleData};
pub use initiator::{Initiator, InitiatorState};
pub use supervisor::{RetryKind, Supervisor};
pub use target::{Target, TargetState};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use derive_more::Display;

use crate::protocol::params::BitRates;

/// How a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Deactivation {
    /// DSL: the Target goes to sleep and may be woken up again
    #[display(fmt = "deselect")]
    Disconnect,
    /// RLS: the Target returns to its initial state
    #[display(fmt = "release")]
    Release,
}

/// What happens once a `SendOnly` frame is on the air.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSend {
    /// Keep listening for the next request
    Listen,
    /// Switch the RF link to these rates, then keep listening
    SwitchBitRate(BitRates),
    /// The session is over
    Deactivated(Deactivation),
}

/// Input to a role machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A frame arrived (SB and LEN included)
    Received(Vec<u8>),
    /// The deadline of the last `SendAndWait`/`Wait` elapsed
    Timeout,
    /// The transceiver reported a CRC/parity/framing error
    TransmissionError,
    /// Resume after `ChunkAvailable` or `SwitchBitRate`
    Continue,
    /// The caller wants the session to end now
    DeactivationRequested,
}

/// Instruction to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Transmit `frame` and wait for the answer; `None` means no deadline.
    SendAndWait { frame: Vec<u8>, timeout: Option<u32> },
    /// Transmit `frame` without expecting an answer.
    SendOnly { frame: Vec<u8>, then: AfterSend },
    /// Wait for a frame from the peer.
    Wait { timeout: Option<u32> },
    /// Switch the RF bit rate, then step with `Event::Continue`.
    SwitchBitRate(BitRates),
    /// Received data can be taken; more is pending in the chain.
    ChunkAvailable,
    /// All supplied data is sent and acknowledged; more was announced.
    NeedData,
    /// The operation finished.
    Complete,
    Deactivated(Deactivation),
    /// A pending deactivation was observed; the session is dropped.
    Cancelled,
}

/// Cooperative cancellation predicate, queried at every suspension point.
pub trait DeactivationCheck {
    fn is_pending(&self) -> bool;
}

impl<F> DeactivationCheck for F
where
    F: Fn() -> bool,
{
    fn is_pending(&self) -> bool {
        self()
    }
}

/// Never pending
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeactivation;

impl DeactivationCheck for NoDeactivation {
    fn is_pending(&self) -> bool {
        false
    }
}

/// Shared flag another thread can raise.
#[derive(Debug, Clone, Default)]
pub struct DeactivationFlag(Arc<AtomicBool>);

impl DeactivationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shared(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl DeactivationCheck for DeactivationFlag {
    fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
