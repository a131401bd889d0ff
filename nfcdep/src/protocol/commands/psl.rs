// nfcdep-rs/nfcdep/src/protocol/commands/psl.rs

use crate::constants::{CMD_PSL_REQ, CMD_TYPE_REQ, LR_MASK};
use crate::protocol::params::BitRates;
use crate::protocol::parser;
use crate::types::LengthReduction;
use crate::{Error, Result};

/// PSL_REQ: `[D4][04][DID][BRS][FSL]`
pub fn encode_psl_req(did: u8, rates: BitRates, fsl: LengthReduction) -> Vec<u8> {
    vec![CMD_TYPE_REQ, CMD_PSL_REQ, did, rates.to_brs(), fsl.code()]
}

pub fn decode_psl_req(data: &[u8]) -> Result<(u8, BitRates, LengthReduction)> {
    parser::ensure_len_range(data, 5, 5)?;
    parser::expect_command(data, CMD_TYPE_REQ, CMD_PSL_REQ)?;
    let rates = BitRates::from_brs(data[3])
        .ok_or_else(|| Error::MalformedFrame(format!("unusable BRS {:#04x}", data[3])))?;
    Ok((data[2], rates, LengthReduction::from_code(data[4] & LR_MASK)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BitRate;

    #[test]
    fn psl_req_layout() {
        let rates = BitRates::new(BitRate::Br424, BitRate::Br424);
        let body = encode_psl_req(1, rates, LengthReduction::Lr128);
        assert_eq!(body, vec![0xD4, 0x04, 0x01, 0x12, 0x01]);
        assert_eq!(
            decode_psl_req(&body).unwrap(),
            (1, rates, LengthReduction::Lr128)
        );
    }

    #[test]
    fn maintain_sentinel_is_not_a_selection() {
        let body = vec![0xD4, 0x04, 0x00, 0xC0, 0x03];
        assert!(decode_psl_req(&body).unwrap_err().is_malformed());
    }
}
