// nfcdep-rs/nfcdep/src/session/exchange.rs

//! Chunking of outbound payloads and reassembly of inbound ones.

use crate::{Error, Result};

/// One I-PDU worth of payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub payload: Vec<u8>,
    pub chaining: bool,
}

/// Outbound buffer. Data is only dropped once the peer acknowledged it.
#[derive(Debug, Clone, Default)]
pub struct Fragmenter {
    data: Vec<u8>,
    acked: usize,
    in_flight: usize,
    more: bool,
    final_sent: bool,
    full_chaining: bool,
}

impl Fragmenter {
    pub fn new(full_chaining: bool) -> Self {
        Self {
            full_chaining,
            final_sent: true,
            ..Self::default()
        }
    }

    /// Append caller data. `more` announces that further data follows in a
    /// later call, so the last chunk of this call stays chained.
    pub fn push(&mut self, payload: &[u8], more: bool) {
        if self.acked > 0 {
            self.data.drain(..self.acked);
            self.acked = 0;
        }
        self.data.extend_from_slice(payload);
        self.more = more;
        self.final_sent = false;
    }

    /// Bytes not yet acknowledged, the chunk in flight included.
    pub fn pending(&self) -> usize {
        self.data.len() - self.acked
    }

    /// True once the unchained last chunk has been handed out.
    pub fn is_finished(&self) -> bool {
        self.final_sent
    }

    /// Next chunk of at most `max_inf` bytes, or `None` when the caller must
    /// supply more data first.
    pub fn next_chunk(&mut self, max_inf: usize) -> Option<Chunk> {
        let remaining = self.pending();
        if remaining == 0 {
            if self.more || self.final_sent {
                return None;
            }
            // closes an empty message, or a chain whose data is all acked
            self.in_flight = 0;
            self.final_sent = true;
            return Some(Chunk {
                payload: Vec::new(),
                chaining: false,
            });
        }

        let take = remaining.min(max_inf);
        let chaining = take < remaining || self.more;
        if chaining && self.full_chaining && take < max_inf {
            return None;
        }
        self.in_flight = take;
        if !chaining {
            self.final_sent = true;
        }
        Some(Chunk {
            payload: self.data[self.acked..self.acked + take].to_vec(),
            chaining,
        })
    }

    /// The chunk in flight was acknowledged by the peer.
    pub fn acknowledge(&mut self) {
        self.acked += self.in_flight;
        self.in_flight = 0;
        if self.acked == self.data.len() {
            self.data.clear();
            self.acked = 0;
        }
    }

    pub fn clear(&mut self) {
        let full_chaining = self.full_chaining;
        *self = Self::new(full_chaining);
    }
}

/// Result of feeding one inbound chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxProgress {
    MorePending,
    Complete,
}

/// Inbound buffer bounded by the receive capacity.
#[derive(Debug, Clone)]
pub struct Reassembler {
    data: Vec<u8>,
    capacity: usize,
    chaining: bool,
    complete: bool,
}

impl Reassembler {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
            chaining: false,
            complete: false,
        }
    }

    pub fn push(&mut self, chunk: &[u8], chaining: bool) -> Result<RxProgress> {
        if self.complete {
            self.data.clear();
            self.complete = false;
        }
        let required = self.data.len() + chunk.len();
        if required > self.capacity {
            return Err(Error::BufferOverflow {
                capacity: self.capacity,
                required,
            });
        }
        self.data.extend_from_slice(chunk);
        self.chaining = chaining;
        if chaining {
            Ok(RxProgress::MorePending)
        } else {
            self.complete = true;
            Ok(RxProgress::Complete)
        }
    }

    /// True while no chain is open, i.e. the next I-PDU starts a message.
    pub fn at_chain_start(&self) -> bool {
        !self.chaining
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Hand everything received so far to the caller.
    pub fn take(&mut self) -> Vec<u8> {
        self.complete = false;
        std::mem::take(&mut self.data)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.chaining = false;
        self.complete = false;
    }
}
