// nfcdep-rs/nfcdep/src/protocol/frame.rs

use crate::constants::{LEN_LEN, LEN_MAX, LEN_MIN, START_BYTE};
use crate::{Error, Result};

/// NFC-DEP transport frame helper. Provides encode/decode of the frame
/// around a PDU body. CRC and parity are handled by the transceiver.
/// Format: [SB(0|1)] [LEN(1)] [Body(n)]
/// SB: 0xF0, only in passive mode at 106 kbps
/// LEN: body length + 1, between 3 and 255
#[derive(Debug, Clone, Copy, Default)]
pub struct Frame;

impl Frame {
    /// Encode a PDU body into a full frame
    pub fn encode(body: &[u8], start_byte: bool) -> Result<Vec<u8>> {
        let len = body.len() + LEN_LEN;
        if !(LEN_MIN..=LEN_MAX).contains(&len) {
            return Err(Error::InvalidLength {
                expected: LEN_MAX,
                actual: len,
            });
        }

        let mut out = Vec::with_capacity(usize::from(start_byte) + len);
        if start_byte {
            out.push(START_BYTE);
        }
        out.push(len as u8);
        out.extend_from_slice(body);
        Ok(out)
    }

    /// Decode a full frame and return the PDU body
    pub fn decode(frame: &[u8], start_byte: bool) -> Result<Vec<u8>> {
        let sb_len = usize::from(start_byte);
        // Minimal frame: SB? + LEN + CMD_TYPE + CMD
        let min = sb_len + LEN_MIN;
        if frame.len() < min {
            return Err(Error::InvalidLength {
                expected: min,
                actual: frame.len(),
            });
        }

        if start_byte && frame[0] != START_BYTE {
            return Err(Error::MalformedFrame(format!(
                "invalid start byte {:#04x}",
                frame[0]
            )));
        }

        let len = frame[sb_len] as usize;
        if len < LEN_MIN {
            return Err(Error::MalformedFrame(format!("LEN {} below minimum", len)));
        }

        let required_len = sb_len + len;
        if frame.len() != required_len {
            return Err(Error::InvalidLength {
                expected: required_len,
                actual: frame.len(),
            });
        }

        Ok(frame[sb_len + LEN_LEN..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_decode_roundtrip() {
        let body = vec![0xD4, 0x06, 0x00, 0x12, 0x34];
        let frame = Frame::encode(&body, false).unwrap();
        assert_eq!(frame[0], 6);
        let out = Frame::decode(&frame, false).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn frame_is_a_stateless_codec() {
        assert_eq!(std::mem::size_of::<Frame>(), 0);
        let body = [0xD4, 0x0A];
        assert_eq!(Frame::encode(&body, true).unwrap(), vec![0xF0, 0x03, 0xD4, 0x0A]);
    }

    #[test]
    fn start_byte_prepended() {
        let body = vec![0xD4, 0x08];
        let frame = Frame::encode(&body, true).unwrap();
        assert_eq!(frame, vec![0xF0, 0x03, 0xD4, 0x08]);
        assert_eq!(Frame::decode(&frame, true).unwrap(), body);
    }

    proptest! {
        #[test]
        fn frame_decode_never_panics(frame in prop::collection::vec(any::<u8>(), 0..300), sb in any::<bool>()) {
            let _ = Frame::decode(&frame, sb);
        }
    }

    #[test]
    fn body_too_short_or_long() {
        assert!(Frame::encode(&[0xD4], false).is_err());
        assert!(Frame::encode(&[0u8; 255], false).is_err());
        assert!(Frame::encode(&[0u8; 254], false).is_ok());
    }

    #[test]
    fn len_mismatch() {
        let mut frame = Frame::encode(&[0xD4, 0x08], false).unwrap();
        frame[0] = 5;
        match Frame::decode(&frame, false) {
            Err(Error::InvalidLength {
                expected: 5,
                actual: 3,
            }) => {}
            other => panic!("expected length mismatch, got: {:?}", other),
        }
    }

    #[test]
    fn invalid_start_byte() {
        let mut frame = Frame::encode(&[0xD4, 0x08], true).unwrap();
        frame[0] = 0xff;
        match Frame::decode(&frame, true) {
            Err(Error::MalformedFrame(_)) => {}
            other => panic!("expected frame format error, got: {:?}", other),
        }
    }
}
