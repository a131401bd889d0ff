// nfcdep-rs/nfcdep/src/constants.rs
//! Common protocol constants used across the crate

/// Command type byte of every request (Initiator -> Target)
pub const CMD_TYPE_REQ: u8 = 0xD4;
/// Command type byte of every response (Target -> Initiator)
pub const CMD_TYPE_RES: u8 = 0xD5;

/// NFC-DEP command codes. Responses are request + 1.
pub const CMD_ATR_REQ: u8 = 0x00;
pub const CMD_ATR_RES: u8 = 0x01;
pub const CMD_WUP_REQ: u8 = 0x02;
pub const CMD_WUP_RES: u8 = 0x03;
pub const CMD_PSL_REQ: u8 = 0x04;
pub const CMD_PSL_RES: u8 = 0x05;
pub const CMD_DEP_REQ: u8 = 0x06;
pub const CMD_DEP_RES: u8 = 0x07;
pub const CMD_DSL_REQ: u8 = 0x08;
pub const CMD_DSL_RES: u8 = 0x09;
pub const CMD_RLS_REQ: u8 = 0x0A;
pub const CMD_RLS_RES: u8 = 0x0B;

/// Start byte prepended to every frame in passive mode at 106 kbps (NFC-A)
pub const START_BYTE: u8 = 0xF0;

/// Length of the LEN byte itself
pub const LEN_LEN: usize = 1;
/// CMD_TYPE + CMD
pub const HEADER_LEN: usize = 2;
/// LEN + CMD_TYPE + CMD + PFB
pub const DEP_HEADER_LEN: usize = 4;
/// Longest DEP header: CMD_TYPE + CMD + PFB + DID + NAD
pub const DEP_REQ_HEADER_MAX_LEN: usize = 5;

/// Bounds of the LEN byte value
pub const LEN_MIN: usize = 3;
pub const LEN_MAX: usize = 255;

/// DSL/RLS frame length (LEN included) without and with DID
pub const DSL_RLS_LEN_NO_DID: usize = 3;
pub const DSL_RLS_LEN_DID: usize = 4;

/// NFCID3 length
pub const NFCID3_LEN: usize = 10;
/// Offset of the NFCID3 inside ATR_REQ/ATR_RES/WUP_REQ
pub const NFCID3_POS: usize = 2;

/// ATR_REQ / ATR_RES body bounds (LEN excluded)
pub const ATR_REQ_MIN_LEN: usize = 16;
pub const ATR_REQ_MAX_LEN: usize = 64;
pub const ATR_RES_MIN_LEN: usize = 17;
pub const ATR_RES_MAX_LEN: usize = 64;
/// Maximum general bytes carried by an ATR
pub const GB_MAX_LEN: usize = ATR_REQ_MAX_LEN - ATR_REQ_MIN_LEN;

/// Frame size limits
pub const FS_MIN: usize = 64;
pub const FS_MAX: usize = 254;

/// Device ID limits and sentinels
pub const DID_NO: u8 = 0x00;
pub const DID_MAX: u8 = 14;
pub const DID_KEEP: u8 = 0xFF;

/// Node address sentinel
pub const NAD_NO: u8 = 0x00;

/// Optional parameters (PP) byte layout
pub const PP_LR_MASK: u8 = 0x30;
pub const PP_LR_SHIFT: u8 = 4;
pub const PP_GB_PRESENT: u8 = 0x02;
pub const PP_NAD_PRESENT: u8 = 0x01;
pub const LR_MASK: u8 = 0x03;

/// Wait time (TO byte) limits
pub const WT_MASK: u8 = 0x0F;
pub const WT_MAX: u8 = 14;
/// Adjusted dRWT exponent (Digital 2.0 B.10)
pub const WT_DELTA_ADJUST: u8 = 4;
pub const WT_DELTA: u8 = 16 - WT_DELTA_ADJUST;

/// Largest response timeout ever enforced, in 1/fc
pub const MAX_FWT: u32 = 1 << 20;

/// RWT used while waiting for ATR_RES, in 1/fc
pub const RWT_ACTIVATION: u32 = 1 << 24;
/// dRWT added to RWT_ACTIVATION, in 1/fc
pub const DRWT_ACTIVATION: u32 = 1 << 15;

/// BRS value requesting that the current bit rate is kept (no PSL)
pub const BRS_MAINTAIN: u8 = 0xC0;
pub const BRS_DX_MASK: u8 = 0x07;
pub const BRS_DSI_POS: u8 = 3;

/// RTOX factor limits
pub const RTOX_MASK: u8 = 0x3F;
pub const RTOX_MIN: u8 = 1;
pub const RTOX_MAX: u8 = 59;

/// Carrier frequency (fc) in Hz
pub const CARRIER_FREQUENCY_HZ: u64 = 13_560_000;
// nfcdep-rs/nfcdep/src/constants.rs
