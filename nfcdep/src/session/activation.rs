// nfcdep-rs/nfcdep/src/session/activation.rs

//! ATR negotiation for both roles.

use log::debug;

use crate::protocol::commands::AtrReq;
use crate::protocol::responses::AtrRes;
use crate::session::config::{InitiatorConfig, TargetConfig};
use crate::session::context::DeviceInfo;
use crate::types::Did;
use crate::{Error, Result};

/// ATR_REQ proposing `did`.
pub fn build_atr_req(config: &InitiatorConfig, did: Did) -> AtrReq {
    AtrReq {
        nfcid3: config.nfcid3,
        did: did.active().unwrap_or(0),
        bs: config.bs,
        br: config.br,
        lr: config.lr,
        nad: config.nad.is_some(),
        gb: config.gb.clone(),
    }
}

/// Check an ATR_RES body against what the Initiator proposed and derive the
/// session parameters. A malformed body is rejected before any field is
/// looked at.
pub fn handle_atr_res(
    config: &InitiatorConfig,
    proposed: Did,
    body: &[u8],
) -> Result<(AtrRes, DeviceInfo)> {
    let res = AtrRes::decode(body)?;

    if let Some(expected) = config.expected_nfcid3 {
        if res.nfcid3 != expected {
            return Err(Error::NegotiationMismatch(format!(
                "NFCID3 {} answered, {} expected",
                res.nfcid3.to_hex(),
                expected.to_hex()
            )));
        }
    }

    let did_i = proposed.active().unwrap_or(0);
    if res.did != did_i {
        return Err(Error::NegotiationMismatch(format!(
            "DID {} echoed for proposed DID {}",
            res.did, did_i
        )));
    }

    let lr = std::cmp::min(config.lr, res.lr);
    let did = proposed.active().map_or(Did::NONE, |_| proposed);
    let mut info = DeviceInfo::new(lr, res.wt, did, config.bit_rate);
    info.gb_len = res.gb.len();
    if res.nad && config.nad.is_some() {
        info.nad = config.nad;
        info.nad_agreed = true;
    }

    debug!(
        "ATR_RES accepted: FS {} WT {} {} NAD {}",
        info.fs, info.wt, info.did, info.nad_agreed
    );
    Ok((res, info))
}

/// Validate an ATR_REQ and build the answer. Any error means the request is
/// ignored and the Target keeps listening.
pub fn handle_atr_req(
    config: &TargetConfig,
    body: &[u8],
) -> Result<(AtrReq, AtrRes, DeviceInfo)> {
    let req = AtrReq::decode(body)?;
    let did = Did::new(req.did)?;
    if did.is_keep() {
        return Err(Error::MalformedFrame(format!(
            "DID {:#04x} not usable in ATR_REQ",
            req.did
        )));
    }

    let nad = req.nad && config.accept_nad;
    let res = AtrRes {
        nfcid3: config.nfcid3,
        did: req.did,
        bs: config.bs,
        br: config.br,
        wt: config.wt,
        lr: config.lr,
        nad,
        gb: config.gb.clone(),
    };

    let lr = std::cmp::min(req.lr, config.lr);
    let mut info = DeviceInfo::new(lr, config.wt, did, config.bit_rate);
    info.gb_len = req.gb.len();
    info.nad_agreed = nad;

    debug!(
        "ATR_REQ from {}: FS {} {} NAD {}",
        req.nfcid3.to_hex(),
        info.fs,
        info.did,
        nad
    );
    Ok((req, res, info))
}
