// nfcdep-rs/nfcdep/src/link/async_initiator.rs

//! Initiator driver for async transceivers. Deadlines from the machine are
//! enforced with `tokio::time::timeout`.

use log::debug;

use crate::link::event_from;
use crate::session::{
    AfterSend, Deactivation, DeactivationCheck, Event, Initiator, InitiatorConfig, InitiatorState,
    Step,
};
use crate::transport::AsyncRfTransceiver;
use crate::utils::fc_to_duration;
use crate::{Error, Result};

pub struct AsyncInitiatorLink<T: AsyncRfTransceiver> {
    transceiver: T,
    machine: Initiator,
}

impl<T: AsyncRfTransceiver> AsyncInitiatorLink<T> {
    pub async fn activate<C>(transceiver: T, config: InitiatorConfig, cancel: C) -> Result<Self>
    where
        C: DeactivationCheck + Send + 'static,
    {
        let machine = Initiator::new(config).with_deactivation_check(cancel);
        let mut link = Self {
            transceiver,
            machine,
        };
        let step = link.machine.start()?;
        link.expect_complete(step).await?;
        debug!("link: async initiator activated");
        Ok(link)
    }

    pub async fn exchange(&mut self, payload: &[u8]) -> Result<Vec<u8>> {
        let step = self.machine.send(payload, false)?;
        self.expect_complete(step).await?;
        Ok(self.machine.take_received())
    }

    pub async fn probe_presence(&mut self) -> Result<()> {
        let step = self.machine.probe_presence()?;
        self.expect_complete(step).await
    }

    pub async fn deactivate(&mut self, kind: Deactivation) -> Result<()> {
        let step = self.machine.deactivate(kind)?;
        match self.pump(step).await? {
            Step::Deactivated(done) if done == kind => Ok(()),
            other => Err(Error::ProtocolViolation(format!(
                "deactivation ended with {:?}",
                other
            ))),
        }
    }

    pub fn state(&self) -> InitiatorState {
        self.machine.state()
    }

    pub fn into_inner(self) -> T {
        self.transceiver
    }

    async fn expect_complete(&mut self, step: Step) -> Result<()> {
        match self.pump(step).await? {
            Step::Complete => Ok(()),
            other => Err(Error::ProtocolViolation(format!(
                "operation ended with {:?}",
                other
            ))),
        }
    }

    async fn receive(&mut self, timeout: Option<u32>) -> Result<Event> {
        match timeout {
            Some(fc) => {
                match tokio::time::timeout(fc_to_duration(fc), self.transceiver.receive()).await {
                    Ok(outcome) => event_from(outcome),
                    Err(_elapsed) => Ok(Event::Timeout),
                }
            }
            None => event_from(self.transceiver.receive().await),
        }
    }

    async fn pump(&mut self, mut step: Step) -> Result<Step> {
        loop {
            let event = match step {
                Step::SendAndWait { frame, timeout } => {
                    self.transceiver.transmit(&frame).await?;
                    self.receive(timeout).await?
                }
                Step::Wait { timeout } => self.receive(timeout).await?,
                Step::SendOnly { frame, then } => {
                    self.transceiver.transmit(&frame).await?;
                    match then {
                        AfterSend::Listen => self.receive(None).await?,
                        AfterSend::SwitchBitRate(rates) => {
                            self.transceiver.switch_bit_rate(rates).await?;
                            Event::Continue
                        }
                        AfterSend::Deactivated(kind) => return Ok(Step::Deactivated(kind)),
                    }
                }
                Step::SwitchBitRate(rates) => {
                    self.transceiver.switch_bit_rate(rates).await?;
                    Event::Continue
                }
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
