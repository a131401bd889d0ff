// nfcdep-rs/nfcdep/src/protocol/codec.rs

use crate::Result;

use super::Frame;
use super::commands::Command;
use super::dep::DepContext;
use super::responses::Response;

/// Encode a Command into a full frame (with SB when required and LEN).
pub fn encode_command_frame(cmd: &Command, start_byte: bool) -> Result<Vec<u8>> {
    Frame::encode(&cmd.encode(), start_byte)
}

/// Decode a full frame carrying a request.
pub fn decode_command_frame(frame: &[u8], start_byte: bool, ctx: &DepContext) -> Result<Command> {
    let body = Frame::decode(frame, start_byte)?;
    Command::decode(&body, ctx)
}

/// Encode a Response into a full frame.
pub fn encode_response_frame(res: &Response, start_byte: bool) -> Result<Vec<u8>> {
    Frame::encode(&res.encode(), start_byte)
}

/// Decode a full frame and parse the contained response for the
/// expected command code.
pub fn decode_response_frame(
    expected_cmd: u8,
    frame: &[u8],
    start_byte: bool,
    ctx: &DepContext,
) -> Result<Response> {
    let body = Frame::decode(frame, start_byte)?;
    Response::decode(expected_cmd, &body, ctx)
}
