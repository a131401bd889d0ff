// Shared helpers for the integration tests. Each aggregator pulls this in
// with `#[path]`, so not every helper is used by every test crate.
#![allow(dead_code)]

pub mod fixtures;

/// Route `log` output through the test harness. Safe to call repeatedly.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// PFB byte of a framed DEP PDU, `None` for anything else.
pub fn dep_pfb(frame: &[u8]) -> Option<u8> {
    let body = if frame.first() == Some(&0xF0) {
        &frame[2..]
    } else {
        &frame[1..]
    };
    match body {
        [0xD4, 0x06, pfb, ..] | [0xD5, 0x07, pfb, ..] => Some(*pfb),
        _ => None,
    }
}
