// nfcdep-rs/nfcdep/src/transport/traits.rs

use crate::protocol::params::BitRates;
use crate::Result;

/// RF transceiver trait abstracts the radio away from the protocol engine.
///
/// Frames handed over are complete NFC-DEP frames (start byte and LEN
/// included); CRC and parity are the transceiver's business.
pub trait RfTransceiver {
    /// Put one frame on the air
    fn transmit(&mut self, frame: &[u8]) -> Result<()>;

    /// Wait for the next frame. `timeout` is in 1/fc; `None` waits forever.
    /// Fails with `Error::Timeout` when nothing arrived in time and with
    /// `Error::TransmissionError` when a corrupted frame was received.
    fn receive(&mut self, timeout: Option<u32>) -> Result<Vec<u8>>;

    /// Reconfigure the RF link after PSL
    fn switch_bit_rate(&mut self, rates: BitRates) -> Result<()>;

    /// Transmit and wait for the answer. Default implementation chains
    /// `transmit` and `receive`.
    fn transceive(&mut self, frame: &[u8], timeout: Option<u32>) -> Result<Vec<u8>> {
        self.transmit(frame)?;
        self.receive(timeout)
    }
}

impl<T: RfTransceiver + ?Sized> RfTransceiver for Box<T> {
    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        (**self).transmit(frame)
    }

    fn receive(&mut self, timeout: Option<u32>) -> Result<Vec<u8>> {
        (**self).receive(timeout)
    }

    fn switch_bit_rate(&mut self, rates: BitRates) -> Result<()> {
        (**self).switch_bit_rate(rates)
    }

    fn transceive(&mut self, frame: &[u8], timeout: Option<u32>) -> Result<Vec<u8>> {
        (**self).transceive(frame, timeout)
    }
}
