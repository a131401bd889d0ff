// nfcdep-rs/nfcdep/src/protocol/params.rs

//! Parameter derivations used during negotiation. Every function here is
//! total: any input byte maps to a defined output.

use crate::constants::{
    BRS_DSI_POS, BRS_DX_MASK, BRS_MAINTAIN, DRWT_ACTIVATION, FS_MAX, FS_MIN, LR_MASK, MAX_FWT,
    PP_LR_MASK, PP_LR_SHIFT, RWT_ACTIVATION, WT_DELTA, WT_MASK, WT_MAX,
};
use crate::types::BitRate;
use crate::{Error, Result};

/// Frame size for a length reduction code: min(64 * (LR + 1), 254).
pub fn lr_to_fs(lr: u8) -> usize {
    std::cmp::min(FS_MIN * (((lr & LR_MASK) as usize) + 1), FS_MAX)
}

/// Largest length reduction code whose frame size does not exceed `fs`.
pub fn fs_to_lr(fs: usize) -> u8 {
    (0..=LR_MASK).rev().find(|&lr| lr_to_fs(lr) <= fs).unwrap_or(0)
}

/// Check that a frame size lies in [64, 254].
pub fn validate_fs(fs: usize) -> Result<usize> {
    if (FS_MIN..=FS_MAX).contains(&fs) {
        Ok(fs)
    } else {
        Err(Error::InvalidParameter(format!(
            "frame size {} outside {}..={}",
            fs, FS_MIN, FS_MAX
        )))
    }
}

/// Extract the LR code from a PP byte.
pub fn pp_to_lr(pp: u8) -> u8 {
    (pp & PP_LR_MASK) >> PP_LR_SHIFT
}

/// Place an LR code into the PP byte position.
pub fn lr_to_pp(lr: u8) -> u8 {
    (lr << PP_LR_SHIFT) & PP_LR_MASK
}

/// Response waiting time for a WT code, in 1/fc: 2^(WT + 12).
pub fn wt_to_rwt(wt: u8) -> u32 {
    1u32 << (((wt & WT_MASK) as u32) + 12)
}

/// Clamp a received WT code to the largest value an Initiator accepts.
pub fn clamp_wt(wt: u8) -> u8 {
    std::cmp::min(wt & WT_MASK, WT_MAX)
}

/// dRWT margin added to every waiting time, in 1/fc.
pub fn rwt_delta() -> u32 {
    1u32 << (WT_DELTA as u32 + 4)
}

/// Deadline enforced while waiting for a response: RWT multiplied by the
/// outstanding RTOX factor plus dRWT, never above the protocol maximum.
pub fn enforced_timeout(rwt: u32, rtox: u8) -> u32 {
    let factor = std::cmp::max(rtox, 1) as u64;
    let total = (rwt as u64) * factor + rwt_delta() as u64;
    std::cmp::min(total, MAX_FWT as u64) as u32
}

/// Waiting time for ATR_RES.
pub fn activation_timeout() -> u32 {
    RWT_ACTIVATION + DRWT_ACTIVATION
}

/// Bit rates selected through PSL. `dsi` is Initiator -> Target, `dri`
/// Target -> Initiator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BitRates {
    pub dsi: BitRate,
    pub dri: BitRate,
}

impl BitRates {
    pub fn new(dsi: BitRate, dri: BitRate) -> Self {
        Self { dsi, dri }
    }

    /// Same bit rate in both directions.
    pub fn symmetric(br: BitRate) -> Self {
        Self { dsi: br, dri: br }
    }

    /// Pack into the BRS byte: DSI in bits 5..3, DRI in bits 2..0.
    pub fn to_brs(&self) -> u8 {
        ((self.dsi.code() & BRS_DX_MASK) << BRS_DSI_POS) | (self.dri.code() & BRS_DX_MASK)
    }

    /// Unpack a BRS byte. `None` for the maintain sentinel or for reserved
    /// divisor codes.
    pub fn from_brs(brs: u8) -> Option<Self> {
        if brs == BRS_MAINTAIN {
            return None;
        }
        let dsi = BitRate::from_code((brs >> BRS_DSI_POS) & BRS_DX_MASK)?;
        let dri = BitRate::from_code(brs & BRS_DX_MASK)?;
        Some(Self { dsi, dri })
    }
}
