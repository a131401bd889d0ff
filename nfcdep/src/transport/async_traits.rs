// nfcdep-rs/nfcdep/src/transport/async_traits.rs

use async_trait::async_trait;

use crate::protocol::params::BitRates;
use crate::Result;

/// Async counterpart of [`RfTransceiver`](crate::transport::RfTransceiver).
///
/// `receive` has no deadline of its own; the async driver wraps it in
/// `tokio::time::timeout`.
#[async_trait]
pub trait AsyncRfTransceiver: Send {
    async fn transmit(&mut self, frame: &[u8]) -> Result<()>;

    async fn receive(&mut self) -> Result<Vec<u8>>;

    async fn switch_bit_rate(&mut self, rates: BitRates) -> Result<()>;
}

/// Adapter running a blocking mock behind the async trait, for tests.
#[async_trait]
impl AsyncRfTransceiver for crate::transport::mock::MockTransceiver {
    async fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        crate::transport::RfTransceiver::transmit(self, frame)
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        // an exhausted queue reads as a timeout
        crate::transport::RfTransceiver::receive(self, Some(u32::MAX))
    }

    async fn switch_bit_rate(&mut self, rates: BitRates) -> Result<()> {
        crate::transport::RfTransceiver::switch_bit_rate(self, rates)
    }
}
