// nfcdep-rs/nfcdep/src/test_support.rs

//! Test support helpers intended for use by unit and integration tests.
//!
//! These helpers centralize common MockTransceiver setup and a loopback
//! harness that connects an Initiator and a Target machine directly, so
//! tests across the crate and tests/ directory can reuse the same logic.
#![allow(dead_code)]

use log::trace;

use crate::session::{Event, Initiator, InitiatorConfig, Step, Target, TargetConfig};
use crate::transport::{MockTransceiver, RfTransceiver};
use crate::utils::HexDump;
use crate::{Error, Result};

/// Build a MockTransceiver pre-seeded with the given frames.
#[doc(hidden)]
pub fn mock_with_frames(frames: Vec<Vec<u8>>) -> MockTransceiver {
    let mut mock = MockTransceiver::new();
    for frame in frames {
        mock.push_frame(frame);
    }
    mock
}

/// Same as [`mock_with_frames`], boxed as a trait object.
#[doc(hidden)]
pub fn boxed_mock_with_frames(frames: Vec<Vec<u8>>) -> Box<dyn RfTransceiver> {
    Box::new(mock_with_frames(frames))
}

/// Which direction a frame travelled in the loopback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ToTarget,
    ToInitiator,
}

type Responder = Box<dyn FnMut(&[u8]) -> Vec<u8> + Send>;

/// Initiator and Target wired back to back without a radio.
///
/// Every complete request reaching the Target is answered by `responder`.
/// Faults can be injected once: a lost request, a lost answer, a corrupted
/// answer, or an answer delayed through RTOX.
#[doc(hidden)]
pub struct Loopback {
    pub initiator: Initiator,
    pub target: Target,
    /// Every frame put on the air, in order
    pub log: Vec<(Direction, Vec<u8>)>,
    /// Requests the Target handed to the application
    pub delivered: Vec<Vec<u8>>,
    responder: Responder,
    drop_request: bool,
    drop_answer: bool,
    corrupt_answer: bool,
    delay_answer: bool,
    held_answer: Option<Vec<u8>>,
}

impl Loopback {
    /// Echo every request back.
    pub fn new(initiator: InitiatorConfig, target: TargetConfig) -> Self {
        Self::with_responder(initiator, target, |req| req.to_vec())
    }

    pub fn with_responder<F>(initiator: InitiatorConfig, target: TargetConfig, responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<u8> + Send + 'static,
    {
        Self {
            initiator: Initiator::new(initiator),
            target: Target::new(target),
            log: Vec::new(),
            delivered: Vec::new(),
            responder: Box::new(responder),
            drop_request: false,
            drop_answer: false,
            corrupt_answer: false,
            delay_answer: false,
            held_answer: None,
        }
    }

    pub fn drop_next_request(&mut self) {
        self.drop_request = true;
    }

    pub fn drop_next_answer(&mut self) {
        self.drop_answer = true;
    }

    pub fn corrupt_next_answer(&mut self) {
        self.corrupt_answer = true;
    }

    /// The Target asks for RTOX before answering the next request.
    pub fn delay_next_answer(&mut self) {
        self.delay_answer = true;
    }

    /// Run ATR (and PSL when configured).
    pub fn activate(&mut self) -> Result<Step> {
        self.target.listen()?;
        let step = self.initiator.start()?;
        self.run(step)
    }

    /// Send one message and return what the Initiator received.
    pub fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let step = self.initiator.send(payload, false)?;
        match self.run(step)? {
            Step::Complete => Ok(self.initiator.take_received()),
            other => Err(Error::ProtocolViolation(format!(
                "exchange ended with {:?}",
                other
            ))),
        }
    }

    /// Drive the Initiator until it needs the application again.
    pub fn run(&mut self, mut step: Step) -> Result<Step> {
        loop {
            let event = match step {
                Step::SendAndWait { frame, .. } => match self.to_target(frame)? {
                    Some(answer) => Event::Received(answer),
                    None => Event::Timeout,
                },
                Step::SendOnly { frame, .. } => {
                    self.to_target(frame)?;
                    Event::Timeout
                }
                Step::Wait { .. } => Event::Timeout,
                Step::SwitchBitRate(_) | Step::ChunkAvailable => Event::Continue,
                Step::Cancelled => return Err(Error::Cancelled),
                done @ (Step::Complete | Step::NeedData | Step::Deactivated(_)) => {
                    return Ok(done);
                }
            };
            step = self.initiator.step(event)?;
        }
    }

    /// Hand a frame to the Target and return what it puts on the air.
    fn to_target(&mut self, frame: Vec<u8>) -> Result<Option<Vec<u8>>> {
        trace!("loopback I->T {}", HexDump(&frame));
        self.log.push((Direction::ToTarget, frame.clone()));
        if std::mem::take(&mut self.drop_request) {
            return Ok(None);
        }

        let mut step = self.target.step(Event::Received(frame))?;
        loop {
            step = match step {
                Step::SendOnly { frame, .. } | Step::SendAndWait { frame, .. } => {
                    return Ok(self.to_initiator(frame));
                }
                Step::ChunkAvailable => self.target.step(Event::Continue)?,
                Step::Complete => {
                    let request = self.target.take_received();
                    let answer = (self.responder)(&request);
                    self.delivered.push(request);
                    if std::mem::take(&mut self.delay_answer) {
                        self.held_answer = Some(answer);
                        self.target.step(Event::Timeout)?
                    } else {
                        self.target.respond(&answer, false)?
                    }
                }
                Step::NeedData => match self.held_answer.take() {
                    Some(answer) => self.target.respond(&answer, false)?,
                    None => return Ok(None),
                },
                Step::Wait { .. }
                | Step::SwitchBitRate(_)
                | Step::Deactivated(_)
                | Step::Cancelled => return Ok(None),
            };
        }
    }

    fn to_initiator(&mut self, mut frame: Vec<u8>) -> Option<Vec<u8>> {
        trace!("loopback T->I {}", HexDump(&frame));
        if std::mem::take(&mut self.corrupt_answer) {
            // LEN no longer matches
            frame.push(0x00);
        }
        self.log.push((Direction::ToInitiator, frame.clone()));
        if std::mem::take(&mut self.drop_answer) {
            return None;
        }
        Some(frame)
    }
}
