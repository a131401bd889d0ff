// nfcdep-rs/nfcdep/src/link/mod.rs

//! Blocking drivers connecting a role machine to an [`RfTransceiver`].
//!
//! The machines in [`crate::session`] never touch the radio; these pumps
//! execute the returned [`Step`](crate::session::Step)s until something the
//! application has to see comes out.
//!
//! [`RfTransceiver`]: crate::transport::RfTransceiver

#[cfg(feature = "async")]
pub mod async_initiator;
pub mod builder;
pub mod initiator;
pub mod target;

#[cfg(feature = "async")]
pub use async_initiator::AsyncInitiatorLink;
pub use builder::LinkBuilder;
pub use initiator::InitiatorLink;
pub use target::{Incoming, TargetLink};

use crate::session::Event;
use crate::{Error, Result};

/// Turn a receive outcome into the event the machine expects. Only timeouts
/// and transmission errors are protocol events; anything else is a
/// transceiver failure and ends the pump.
pub(crate) fn event_from(outcome: Result<Vec<u8>>) -> Result<Event> {
    match outcome {
        Ok(frame) => Ok(Event::Received(frame)),
        Err(Error::Timeout) => Ok(Event::Timeout),
        Err(Error::TransmissionError) => Ok(Event::TransmissionError),
        Err(e) => Err(e),
    }
}
