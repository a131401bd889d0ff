// Shared test identifiers and frames

use nfcdep::protocol::commands::AtrReq;
use nfcdep::protocol::responses::AtrRes;
use nfcdep::protocol::Frame;
use nfcdep::session::{InitiatorConfig, TargetConfig};
use nfcdep::types::{CommMode, LengthReduction, Nfcid3};

pub fn initiator_nfcid3() -> Nfcid3 {
    Nfcid3::from_bytes(hex_array("01fe0304050607080910"))
}

pub fn target_nfcid3() -> Nfcid3 {
    Nfcid3::from_bytes(hex_array("02fe1112131415161718"))
}

fn hex_array(s: &str) -> [u8; 10] {
    let bytes = hex::decode(s).unwrap();
    let mut out = [0u8; 10];
    out.copy_from_slice(&bytes);
    out
}

pub fn initiator_config() -> InitiatorConfig {
    InitiatorConfig::new(initiator_nfcid3())
}

pub fn target_config() -> TargetConfig {
    TargetConfig::new(target_nfcid3())
}

pub fn active_pair() -> (InitiatorConfig, TargetConfig) {
    (
        initiator_config().with_comm_mode(CommMode::Active),
        target_config().with_comm_mode(CommMode::Active),
    )
}

pub fn sample_atr_req(did: u8) -> AtrReq {
    AtrReq {
        nfcid3: initiator_nfcid3(),
        did,
        bs: 0,
        br: 0,
        lr: LengthReduction::Lr254,
        nad: false,
        gb: hex::decode("46666d010111").unwrap(),
    }
}

pub fn sample_atr_res(did: u8, wt: u8) -> AtrRes {
    AtrRes {
        nfcid3: target_nfcid3(),
        did,
        bs: 0,
        br: 0,
        wt,
        lr: LengthReduction::Lr254,
        nad: false,
        gb: vec![],
    }
}

/// ATR_RES framed for passive mode at 106 kbps.
pub fn atr_res_frame(did: u8, wt: u8) -> Vec<u8> {
    Frame::encode(&sample_atr_res(did, wt).encode(), true).unwrap()
}

/// DEP_RES without DID, framed for passive mode at 106 kbps.
pub fn dep_res_frame(pfb: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0xD5, 0x07, pfb];
    body.extend_from_slice(payload);
    Frame::encode(&body, true).unwrap()
}

/// DEP_REQ without DID, framed for passive mode at 106 kbps.
pub fn dep_req_frame(pfb: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0xD4, 0x06, pfb];
    body.extend_from_slice(payload);
    Frame::encode(&body, true).unwrap()
}

/// Payload bytes 0, 1, 2, ... wrapping at 256.
pub fn counting_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}
