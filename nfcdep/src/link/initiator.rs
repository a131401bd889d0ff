// nfcdep-rs/nfcdep/src/link/initiator.rs

use log::debug;

use crate::link::event_from;
use crate::session::{
    AfterSend, Deactivation, DeactivationCheck, Event, Initiator, InitiatorConfig, InitiatorState,
    Step,
};
use crate::transport::RfTransceiver;
use crate::{Error, Result};

/// Activated Initiator session bound to a transceiver.
pub struct InitiatorLink<T: RfTransceiver> {
    transceiver: T,
    machine: Initiator,
}

impl<T: RfTransceiver> InitiatorLink<T> {
    /// Run ATR (and PSL when configured) and return the activated link.
    pub fn activate<C>(transceiver: T, config: InitiatorConfig, cancel: C) -> Result<Self>
    where
        C: DeactivationCheck + Send + 'static,
    {
        let machine = Initiator::new(config).with_deactivation_check(cancel);
        let mut link = Self {
            transceiver,
            machine,
        };
        let step = link.machine.start()?;
        link.expect_complete(step, "activation")?;
        debug!("link: initiator activated");
        Ok(link)
    }

    /// Send `payload` as one message and return the Target's complete answer.
    pub fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let step = self.machine.send(payload, false)?;
        self.expect_complete(step, "exchange")?;
        Ok(self.machine.take_received())
    }

    /// ATN round trip; `Ok` means the Target answered.
    pub fn probe_presence(&mut self) -> Result<()> {
        let step = self.machine.probe_presence()?;
        self.expect_complete(step, "presence check")
    }

    /// DSL or RLS. The link stays usable for [`wake_up`](Self::wake_up)
    /// after a deselect in active mode.
    pub fn deactivate(&mut self, kind: Deactivation) -> Result<()> {
        let step = self.machine.deactivate(kind)?;
        match self.pump(step)? {
            Step::Deactivated(done) if done == kind => Ok(()),
            other => Err(unexpected(other, "deactivation")),
        }
    }

    /// WUP a Target deselected earlier in active mode.
    pub fn wake_up(&mut self) -> Result<()> {
        let step = self.machine.wake_up()?;
        self.expect_complete(step, "wake up")
    }

    pub fn machine(&self) -> &Initiator {
        &self.machine
    }

    pub fn state(&self) -> InitiatorState {
        self.machine.state()
    }

    pub fn transceiver_mut(&mut self) -> &mut T {
        &mut self.transceiver
    }

    pub fn into_inner(self) -> T {
        self.transceiver
    }

    fn expect_complete(&mut self, step: Step, what: &str) -> Result<()> {
        match self.pump(step)? {
            Step::Complete => Ok(()),
            other => Err(unexpected(other, what)),
        }
    }

    /// Execute steps until one needs the application.
    fn pump(&mut self, mut step: Step) -> Result<Step> {
        loop {
            let event = match step {
                Step::SendAndWait { frame, timeout } => {
                    self.transceiver.transmit(&frame)?;
                    event_from(self.transceiver.receive(timeout))?
                }
                Step::Wait { timeout } => event_from(self.transceiver.receive(timeout))?,
                Step::SendOnly { frame, then } => {
                    self.transceiver.transmit(&frame)?;
                    match then {
                        AfterSend::Listen => event_from(self.transceiver.receive(None))?,
                        AfterSend::SwitchBitRate(rates) => {
                            self.transceiver.switch_bit_rate(rates)?;
                            Event::Continue
                        }
                        AfterSend::Deactivated(kind) => return Ok(Step::Deactivated(kind)),
                    }
                }
                Step::SwitchBitRate(rates) => {
                    self.transceiver.switch_bit_rate(rates)?;
                    Event::Continue
                }
                // chunks stay buffered in the machine until the chain ends
                Step::ChunkAvailable => Event::Continue,
                Step::Cancelled => return Err(Error::Cancelled),
                done @ (Step::Complete | Step::NeedData | Step::Deactivated(_)) => {
                    return Ok(done);
                }
            };
            step = self.machine.step(event)?;
        }
    }
}

fn unexpected(step: Step, what: &str) -> Error {
    Error::ProtocolViolation(format!("{} ended with {:?}", what, step))
}
