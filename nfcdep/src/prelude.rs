// nfcdep-rs/nfcdep/src/prelude.rs

pub use crate::link::{Incoming, InitiatorLink, LinkBuilder, TargetLink};
pub use crate::protocol::{BitRates, Command, DepPdu, Frame, Response};
pub use crate::session::{
    BitRateRequest, Deactivation, DeactivationCheck, DeactivationFlag, Event, Initiator,
    InitiatorConfig, InitiatorState, OperConfig, RetryKind, RetryLimits, Step, Target,
    TargetConfig, TargetState,
};
pub use crate::transport::{MockTransceiver, RfTransceiver};
pub use crate::{BitRate, CommMode, Did, Error, LengthReduction, Nfcid3, Pni, Result, Role};

// Re-export small utilities for convenience
pub use crate::utils::{bytes_to_hex, bytes_to_hex_spaced, fc_to_duration, ms};
