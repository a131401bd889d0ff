// nfcdep-rs/nfcdep/src/session/psl.rs

//! Bit rate selection after activation.

use log::debug;

use crate::constants::BRS_MAINTAIN;
use crate::protocol::commands::{decode_psl_req, encode_psl_req};
use crate::protocol::params::BitRates;
use crate::protocol::responses::{decode_psl_res, encode_psl_res};
use crate::types::{Did, LengthReduction};
use crate::{Error, Result};

/// PSL_REQ body selecting `brs`. The maintain sentinel never goes on air.
pub fn build_psl_req(did: Did, brs: u8, lr: LengthReduction) -> Result<(Vec<u8>, BitRates)> {
    if brs == BRS_MAINTAIN {
        return Err(Error::InvalidParameter(
            "PSL requested with the maintain sentinel".into(),
        ));
    }
    let rates = BitRates::from_brs(brs)
        .ok_or_else(|| Error::InvalidParameter(format!("unsupported BRS {:#04x}", brs)))?;
    Ok((encode_psl_req(did.active().unwrap_or(0), rates, lr), rates))
}

/// Initiator side: PSL_RES must echo the session DID.
pub fn handle_psl_res(did: Did, body: &[u8]) -> Result<()> {
    let echoed = decode_psl_res(body)?;
    let expected = did.active().unwrap_or(0);
    if echoed != expected {
        return Err(Error::MalformedFrame(format!(
            "PSL_RES DID {} for session DID {}",
            echoed, expected
        )));
    }
    Ok(())
}

/// Target side: accept a PSL_REQ and build the PSL_RES body.
pub fn handle_psl_req(did: Did, body: &[u8]) -> Result<(BitRates, LengthReduction, Vec<u8>)> {
    let (req_did, rates, fsl) = decode_psl_req(body)?;
    let expected = did.active().unwrap_or(0);
    if req_did != expected {
        return Err(Error::MalformedFrame(format!(
            "PSL_REQ DID {} for session DID {}",
            req_did, expected
        )));
    }
    debug!("PSL accepted: DSI {} DRI {} {}", rates.dsi, rates.dri, fsl);
    Ok((rates, fsl, encode_psl_res(req_did)))
}
