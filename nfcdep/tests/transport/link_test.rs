#[path = "../common/mod.rs"]
mod common;

use nfcdep::link::{Incoming, InitiatorLink, LinkBuilder, TargetLink};
use nfcdep::protocol::Frame;
use nfcdep::session::{Deactivation, InitiatorState, NoDeactivation, TargetState};
use nfcdep::test_support;
use nfcdep::Error;

fn atr_req_frame() -> Vec<u8> {
    Frame::encode(&common::fixtures::sample_atr_req(0).encode(), true).unwrap()
}

#[test]
fn initiator_link_exchange_and_probe() {
    common::init_logging();
    let mock = test_support::mock_with_frames(vec![
        common::fixtures::atr_res_frame(0, 8),
        common::fixtures::dep_res_frame(0x00, &hex::decode("9000").unwrap()),
        common::fixtures::dep_res_frame(0x80, &[]),
    ]);
    let mut link = LinkBuilder::new()
        .with_transceiver(mock)
        .activate(common::fixtures::initiator_config())
        .unwrap();

    let answer = link.exchange(&hex::decode("00a4040007").unwrap()).unwrap();
    assert_eq!(hex::encode(answer), "9000");
    link.probe_presence().unwrap();
    assert_eq!(link.state(), InitiatorState::ExchangeIdle);

    let mock = link.into_inner();
    assert_eq!(common::dep_pfb(&mock.sent[2]), Some(0x80));
}

#[test]
fn initiator_link_surfaces_retry_exhaustion() {
    let mock = test_support::mock_with_frames(vec![common::fixtures::atr_res_frame(0, 8)]);
    let mut link =
        InitiatorLink::activate(mock, common::fixtures::initiator_config(), NoDeactivation)
            .unwrap();
    assert!(matches!(
        link.exchange(b"anyone?"),
        Err(Error::RetryExhausted(_))
    ));
    assert_eq!(link.state(), InitiatorState::Idle);
    // further use is refused, not retried
    assert!(matches!(
        link.exchange(b"x"),
        Err(Error::InvalidState { .. })
    ));
}

#[test]
fn target_link_serves_requests_until_deselect() {
    common::init_logging();
    let mock = test_support::mock_with_frames(vec![
        // garbage before activation is ignored
        vec![0xF0, 0x03, 0xD4, 0xFF],
        atr_req_frame(),
        common::fixtures::dep_req_frame(0x00, b"one"),
        common::fixtures::dep_req_frame(0x01, b"two"),
        Frame::encode(&[0xD4, 0x08], true).unwrap(),
    ]);
    let mut link = TargetLink::listen(mock, common::fixtures::target_config(), NoDeactivation)
        .unwrap();

    for expected in [&b"one"[..], &b"two"[..]] {
        match link.receive().unwrap() {
            Incoming::Data(req) => {
                assert_eq!(req, expected);
                link.respond(&req).unwrap();
            }
            other => panic!("unexpected {:?}", other),
        }
    }
    assert_eq!(
        link.receive().unwrap(),
        Incoming::Deactivated(Deactivation::Disconnect)
    );
    assert_eq!(link.state(), TargetState::Sleeping);

    let sent = link.into_inner().sent;
    // ATR_RES, two answers, DSL_RES
    assert_eq!(sent.len(), 4);
    assert_eq!(sent[3], vec![0xF0, 0x03, 0xD5, 0x09]);
}

#[test]
fn target_link_answers_duplicate_request_again() {
    let request = common::fixtures::dep_req_frame(0x00, b"dup");
    let mock = test_support::mock_with_frames(vec![
        atr_req_frame(),
        request.clone(),
        request,
        Frame::encode(&[0xD4, 0x0A], true).unwrap(),
    ]);
    let mut link = TargetLink::listen(mock, common::fixtures::target_config(), NoDeactivation)
        .unwrap();
    assert_eq!(link.receive().unwrap(), Incoming::Data(b"dup".to_vec()));
    link.respond(b"ans").unwrap();
    // the repeat is answered inside the pump and never delivered
    assert_eq!(
        link.receive().unwrap(),
        Incoming::Deactivated(Deactivation::Release)
    );
    let sent = link.into_inner().sent;
    assert_eq!(sent[1], sent[2]);
}

#[test]
fn release_then_reactivate() -> anyhow::Result<()> {
    let mock = test_support::mock_with_frames(vec![
        common::fixtures::atr_res_frame(0, 8),
        Frame::encode(&[0xD5, 0x0B], true)?,
    ]);
    let mut link = InitiatorLink::activate(mock, common::fixtures::initiator_config(), NoDeactivation)?;
    link.deactivate(Deactivation::Release)?;
    assert_eq!(link.state(), InitiatorState::Idle);

    let mut mock = link.into_inner();
    assert_eq!(mock.pop_sent(), Some(vec![0xF0, 0x03, 0xD4, 0x0A]));
    mock.push_frame(common::fixtures::atr_res_frame(0, 8));
    let link = InitiatorLink::activate(mock, common::fixtures::initiator_config(), NoDeactivation)?;
    assert_eq!(link.state(), InitiatorState::ExchangeIdle);
    Ok(())
}
