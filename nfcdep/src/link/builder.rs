// nfcdep-rs/nfcdep/src/link/builder.rs

use crate::link::{InitiatorLink, TargetLink};
use crate::session::{DeactivationCheck, InitiatorConfig, NoDeactivation, TargetConfig};
use crate::transport::RfTransceiver;
use crate::{Error, Result};

/// Helper to construct a link with optional configuration.
pub struct LinkBuilder<T, C = NoDeactivation> {
    transceiver: Option<T>,
    cancel: C,
}

impl<T: RfTransceiver> LinkBuilder<T> {
    pub fn new() -> Self {
        Self {
            transceiver: None,
            cancel: NoDeactivation,
        }
    }
}

impl<T: RfTransceiver> Default for LinkBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> LinkBuilder<T, C>
where
    T: RfTransceiver,
    C: DeactivationCheck + Send + 'static,
{
    /// Provide an already-created transceiver instance (e.g. MockTransceiver)
    pub fn with_transceiver(mut self, transceiver: T) -> Self {
        self.transceiver = Some(transceiver);
        self
    }

    /// Predicate polled at every suspension point of the session.
    pub fn with_deactivation_check<D>(self, cancel: D) -> LinkBuilder<T, D>
    where
        D: DeactivationCheck + Send + 'static,
    {
        LinkBuilder {
            transceiver: self.transceiver,
            cancel,
        }
    }

    /// Consume the builder and activate a Target as Initiator.
    pub fn activate(self, config: InitiatorConfig) -> Result<InitiatorLink<T>> {
        let transceiver = self.transceiver.ok_or_else(missing_transceiver)?;
        InitiatorLink::activate(transceiver, config, self.cancel)
    }

    /// Consume the builder and wait for activation as Target.
    pub fn listen(self, config: TargetConfig) -> Result<TargetLink<T>> {
        let transceiver = self.transceiver.ok_or_else(missing_transceiver)?;
        TargetLink::listen(transceiver, config, self.cancel)
    }
}

fn missing_transceiver() -> Error {
    Error::InvalidParameter("no transceiver provided".into())
}
