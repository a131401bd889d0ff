#[path = "../common/mod.rs"]
mod common;

use nfcdep::protocol::codec;
use nfcdep::protocol::{Command, DepContext, DepPdu, Frame, Response};
use nfcdep::types::Pni;
use nfcdep::Error;

#[test]
fn start_byte_only_when_requested() {
    let body = [0xD4, 0x08];
    assert_eq!(Frame::encode(&body, true).unwrap(), vec![0xF0, 0x03, 0xD4, 0x08]);
    assert_eq!(Frame::encode(&body, false).unwrap(), vec![0x03, 0xD4, 0x08]);

    assert_eq!(Frame::decode(&[0xF0, 0x03, 0xD4, 0x08], true).unwrap(), body);
    assert!(Frame::decode(&[0x03, 0xD4, 0x08], true).is_err());
}

#[test]
fn len_must_match_frame() {
    let err = Frame::decode(&[0x05, 0xD4, 0x06, 0x00], false).unwrap_err();
    assert!(err.is_malformed());
    assert!(matches!(
        Frame::decode(&[0x02, 0xD4], false),
        Err(Error::MalformedFrame(_)) | Err(Error::InvalidLength { .. })
    ));
}

#[test]
fn oversized_body_is_rejected() {
    let body = vec![0u8; 255];
    assert!(matches!(
        Frame::encode(&body, false),
        Err(Error::InvalidLength { .. })
    ));
}

#[test]
fn dsl_and_rls_frames() {
    let dsl = codec::encode_command_frame(&Command::Dsl { did: None }, false).unwrap();
    assert_eq!(dsl.len(), 3);
    let rls = codec::encode_command_frame(&Command::Rls { did: Some(4) }, false).unwrap();
    assert_eq!(rls, vec![0x04, 0xD4, 0x0A, 0x04]);

    let ctx = DepContext::new(Some(4), false);
    let back = codec::decode_command_frame(&rls, false, &ctx).unwrap();
    assert_eq!(back, Command::Rls { did: Some(4) });
}

#[test]
fn dep_frame_through_codec() {
    common::init_logging();
    let pdu = DepPdu::information(Pni::new(2), true, vec![0xCA, 0xFE]).with_did(Some(1));
    let res = Response::Dep(pdu.clone());
    let frame = codec::encode_response_frame(&res, true).unwrap();
    assert_eq!(hex::encode(&frame), "f007d5071601cafe");
    assert_eq!(common::dep_pfb(&frame), Some(0x16));

    let ctx = DepContext::new(Some(1), false);
    let decoded = codec::decode_response_frame(0x06, &frame, true, &ctx).unwrap();
    assert_eq!(decoded, Response::Dep(pdu));
}
