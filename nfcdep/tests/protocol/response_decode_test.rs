#[path = "../common/mod.rs"]
mod common;

use nfcdep::constants::{CMD_ATR_REQ, CMD_DEP_REQ, CMD_DSL_REQ, CMD_PSL_REQ, CMD_WUP_REQ};
use nfcdep::protocol::{DepContext, PduKind, Response};
use nfcdep::types::Pni;
use nfcdep::Error;

#[test]
fn atr_res_decodes() {
    let res = common::fixtures::sample_atr_res(0, 8);
    let body = res.encode();
    assert_eq!(body.len(), 17);
    assert_eq!(
        Response::decode(CMD_ATR_REQ, &body, &DepContext::default()).unwrap(),
        Response::Atr(res)
    );
}

#[test]
fn short_atr_res_is_malformed() {
    let body = common::fixtures::sample_atr_res(0, 8).encode();
    for len in [2, 10, 16] {
        let err = Response::decode(CMD_ATR_REQ, &body[..len], &DepContext::default()).unwrap_err();
        assert!(err.is_malformed(), "len {} gave {:?}", len, err);
    }
}

#[test]
fn response_code_must_follow_request() {
    let err = Response::decode(CMD_PSL_REQ, &[0xD5, 0x03, 0x00], &DepContext::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedCommand { .. }));
}

#[test]
fn wup_and_dsl_responses() {
    assert_eq!(
        Response::decode(CMD_WUP_REQ, &[0xD5, 0x03, 0x05], &DepContext::default()).unwrap(),
        Response::Wup { did: 5 }
    );
    let ctx = DepContext::new(Some(5), false);
    assert_eq!(
        Response::decode(CMD_DSL_REQ, &[0xD5, 0x09, 0x05], &ctx).unwrap(),
        Response::Dsl { did: Some(5) }
    );
    assert!(Response::decode(CMD_DSL_REQ, &[0xD5, 0x09], &ctx).is_err());
}

#[test]
fn dep_res_supervisory() {
    let ctx = DepContext::default();
    match Response::decode(CMD_DEP_REQ, &[0xD5, 0x07, 0x90, 0x3B], &ctx).unwrap() {
        Response::Dep(pdu) => {
            assert_eq!(pdu.kind, PduKind::TimeoutExtension);
            assert_eq!(pdu.rtox(), Some(59));
        }
        other => panic!("unexpected {:?}", other),
    }
    match Response::decode(CMD_DEP_REQ, &[0xD5, 0x07, 0x43], &ctx).unwrap() {
        Response::Dep(pdu) => {
            assert_eq!(pdu.kind, PduKind::Ack);
            assert_eq!(pdu.pni, Pni::new(3));
        }
        other => panic!("unexpected {:?}", other),
    }
    // reserved PFB type
    assert!(Response::decode(CMD_DEP_REQ, &[0xD5, 0x07, 0x20], &ctx)
        .unwrap_err()
        .is_malformed());
}
