#[path = "../common/mod.rs"]
mod common;

use nfcdep::test_support;
use nfcdep::transport::{MockTransceiver, RfTransceiver};
use nfcdep::Error;

#[test]
fn queued_frames_then_timeout() {
    let mut m = test_support::mock_with_frames(vec![
        common::fixtures::atr_res_frame(0, 8),
        common::fixtures::dep_res_frame(0x00, b"ok"),
    ]);
    assert_eq!(m.transceive(&[0x03, 0xD4, 0x08], Some(100)).unwrap().len(), 19);
    assert_eq!(m.receive(Some(100)).unwrap()[5..], *b"ok");
    assert!(matches!(m.receive(Some(100)), Err(Error::Timeout)));
    assert_eq!(m.timeouts, vec![Some(100); 3]);
    assert_eq!(m.sent, vec![vec![0x03, 0xD4, 0x08]]);
}

#[test]
fn boxed_trait_object() {
    let mut boxed = test_support::boxed_mock_with_frames(vec![vec![0x03, 0xD5, 0x09]]);
    boxed.transmit(&[0x03, 0xD4, 0x08]).unwrap();
    assert_eq!(boxed.receive(None).unwrap(), vec![0x03, 0xD5, 0x09]);
}

#[test]
fn transmission_errors_are_surfaced() {
    let mut m = MockTransceiver::new();
    m.push_error(Error::TransmissionError);
    assert_eq!(m.receive(Some(1)), Err(Error::TransmissionError));
}
