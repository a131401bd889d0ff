// nfcdep-rs/nfcdep/src/link/target.rs

use log::debug;

use crate::link::event_from;
use crate::session::{
    AfterSend, Deactivation, DeactivationCheck, Event, Step, Target, TargetConfig, TargetState,
};
use crate::transport::RfTransceiver;
use crate::{Error, Result};

/// What [`TargetLink::receive`] hands to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A complete request; answer it with [`TargetLink::respond`]
    Data(Vec<u8>),
    /// The Initiator ended the session
    Deactivated(Deactivation),
}

/// Where a pump run stopped.
#[derive(Debug, PartialEq, Eq)]
enum Halt {
    /// The stop condition of the caller was reached
    Done,
    Request(Vec<u8>),
    NeedData,
    Deactivated(Deactivation),
}

/// Target session bound to a transceiver.
pub struct TargetLink<T: RfTransceiver> {
    transceiver: T,
    machine: Target,
}

impl<T: RfTransceiver> TargetLink<T> {
    /// Wait for an ATR_REQ and return once ATR_RES is on the air.
    pub fn listen<C>(transceiver: T, config: TargetConfig, cancel: C) -> Result<Self>
    where
        C: DeactivationCheck + Send + 'static,
    {
        let machine = Target::new(config).with_deactivation_check(cancel);
        let mut link = Self {
            transceiver,
            machine,
        };
        let step = link.machine.listen()?;
        match link.pump(step, |t| t.state() == TargetState::AwaitingConfirmation)? {
            Halt::Done => {
                debug!("link: target activated");
                Ok(link)
            }
            other => Err(unexpected(&other, "activation")),
        }
    }

    /// Wait for the next complete request. After a release the Target
    /// listens for a new activation first.
    pub fn receive(&mut self) -> Result<Incoming> {
        let step = if self.machine.state() == TargetState::Idle {
            self.machine.listen()?
        } else {
            Step::Wait { timeout: None }
        };
        match self.pump(step, |_| false)? {
            Halt::Request(data) => Ok(Incoming::Data(data)),
            Halt::Deactivated(kind) => Ok(Incoming::Deactivated(kind)),
            other => Err(unexpected(&other, "receive")),
        }
    }

    /// Answer the request returned by the last [`receive`](Self::receive).
    pub fn respond(&mut self, payload: &[u8]) -> Result<()> {
        let step = self.machine.respond(payload, false)?;
        match self.pump(step, |t| t.state() == TargetState::ExchangeIdle)? {
            Halt::Done => Ok(()),
            other => Err(unexpected(&other, "respond")),
        }
    }

    /// Ask the Initiator for more time before answering. Returns once the
    /// RTOX request was echoed; call [`respond`](Self::respond) afterwards.
    pub fn request_more_time(&mut self) -> Result<()> {
        if !self.machine.config().oper.rtox_enabled {
            return Err(Error::InvalidParameter("RTOX is disabled".into()));
        }
        if self.machine.rtox_deadline().is_none() {
            return Err(Error::InvalidState {
                operation: "request_more_time",
                state: self.machine.state().to_string(),
            });
        }
        let step = self.machine.step(Event::Timeout)?;
        match self.pump(step, |_| false)? {
            Halt::NeedData => Ok(()),
            other => Err(unexpected(&other, "RTOX")),
        }
    }

    /// Time left for the current answer, in 1/fc.
    pub fn rtox_deadline(&self) -> Option<u32> {
        self.machine.rtox_deadline()
    }

    pub fn machine(&self) -> &Target {
        &self.machine
    }

    pub fn state(&self) -> TargetState {
        self.machine.state()
    }

    pub fn transceiver_mut(&mut self) -> &mut T {
        &mut self.transceiver
    }

    pub fn into_inner(self) -> T {
        self.transceiver
    }

    fn pump(&mut self, mut step: Step, done: impl Fn(&Target) -> bool) -> Result<Halt> {
        loop {
            let event = match step {
                Step::Wait { timeout } => event_from(self.transceiver.receive(timeout))?,
                Step::SendAndWait { frame, timeout } => {
                    self.transceiver.transmit(&frame)?;
                    event_from(self.transceiver.receive(timeout))?
                }
                Step::SendOnly { frame, then } => {
                    self.transceiver.transmit(&frame)?;
                    match then {
                        AfterSend::Listen => {
                            if done(&self.machine) {
                                return Ok(Halt::Done);
                            }
                            event_from(self.transceiver.receive(None))?
                        }
                        AfterSend::SwitchBitRate(rates) => {
                            self.transceiver.switch_bit_rate(rates)?;
                            event_from(self.transceiver.receive(None))?
                        }
                        AfterSend::Deactivated(kind) => return Ok(Halt::Deactivated(kind)),
                    }
                }
                Step::SwitchBitRate(rates) => {
                    self.transceiver.switch_bit_rate(rates)?;
                    Event::Continue
                }
                Step::ChunkAvailable => Event::Continue,
                Step::Complete => return Ok(Halt::Request(self.machine.take_received())),
                Step::NeedData => return Ok(Halt::NeedData),
                Step::Deactivated(kind) => return Ok(Halt::Deactivated(kind)),
                Step::Cancelled => return Err(Error::Cancelled),
            };
            step = self.machine.step(event)?;
        }
    }
}

fn unexpected(halt: &Halt, what: &str) -> Error {
    Error::ProtocolViolation(format!("{} ended with {:?}", what, halt))
}
