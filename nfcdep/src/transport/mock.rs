// nfcdep-rs/nfcdep/src/transport/mock.rs

use std::collections::VecDeque;

use crate::protocol::params::BitRates;
use crate::transport::traits::RfTransceiver;
use crate::{Error, Result};

/// Mock transceiver for unit tests. It records transmitted frames and
/// returns queued receive outcomes. An empty queue reads as a timeout when
/// a deadline was given; an unbounded wait on an empty queue would never
/// end and fails with `Error::Transport` instead.
#[derive(Debug, Default)]
pub struct MockTransceiver {
    pub sent: Vec<Vec<u8>>,
    pub responses: VecDeque<Result<Vec<u8>>>,
    /// Every `timeout` argument passed to `receive`
    pub timeouts: Vec<Option<u32>>,
    pub rate_switches: Vec<BitRates>,
    /// Testing hook: number of subsequent transmits that should fail
    pub transmit_failures: usize,
}

impl MockTransceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_frame(&mut self, frame: Vec<u8>) {
        self.responses.push_back(Ok(frame));
    }

    /// Queue a receive failure (`Error::Timeout`, `Error::TransmissionError`, ...).
    pub fn push_error(&mut self, err: Error) {
        self.responses.push_back(Err(err));
    }

    pub fn set_transmit_failures(&mut self, n: usize) {
        self.transmit_failures = n;
    }

    pub fn pop_sent(&mut self) -> Option<Vec<u8>> {
        self.sent.pop()
    }

    pub fn last_sent(&self) -> Option<&[u8]> {
        self.sent.last().map(Vec::as_slice)
    }
}

impl RfTransceiver for MockTransceiver {
    fn transmit(&mut self, frame: &[u8]) -> Result<()> {
        if self.transmit_failures > 0 {
            self.transmit_failures -= 1;
            return Err(Error::Transport("RF field lost".into()));
        }
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn receive(&mut self, timeout: Option<u32>) -> Result<Vec<u8>> {
        self.timeouts.push(timeout);
        match (self.responses.pop_front(), timeout) {
            (Some(outcome), _) => outcome,
            (None, Some(_)) => Err(Error::Timeout),
            (None, None) => Err(Error::Transport("mock queue exhausted".into())),
        }
    }

    fn switch_bit_rate(&mut self, rates: BitRates) -> Result<()> {
        self.rate_switches.push(rates);
        Ok(())
    }
}
