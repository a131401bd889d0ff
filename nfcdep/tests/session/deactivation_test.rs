#[path = "../common/mod.rs"]
mod common;

use nfcdep::session::{Deactivation, DeactivationFlag, InitiatorState, Step, TargetState};
use nfcdep::test_support::Loopback;
use nfcdep::types::Pni;
use nfcdep::Error;

#[test]
fn release_returns_both_to_idle() {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    lb.activate().unwrap();
    lb.exchange(b"x").unwrap();

    let step = lb.initiator.deactivate(Deactivation::Release).unwrap();
    assert_eq!(
        lb.run(step).unwrap(),
        Step::Deactivated(Deactivation::Release)
    );
    assert_eq!(lb.initiator.state(), InitiatorState::Idle);
    assert_eq!(lb.target.state(), TargetState::Idle);
    // RLS_REQ without DID is LEN + 2 bytes
    let (_, rls) = &lb.log[lb.log.len() - 2];
    assert_eq!(rls, &vec![0xF0, 0x03, 0xD4, 0x0A]);
}

#[test]
fn deselected_target_is_woken_up() {
    common::init_logging();
    let (ini, tgt) = common::fixtures::active_pair();
    let mut lb = Loopback::new(ini, tgt);
    lb.activate().unwrap();
    lb.exchange(b"one").unwrap();
    lb.exchange(b"two").unwrap();

    let step = lb.initiator.deactivate(Deactivation::Disconnect).unwrap();
    assert_eq!(
        lb.run(step).unwrap(),
        Step::Deactivated(Deactivation::Disconnect)
    );
    assert_eq!(lb.target.state(), TargetState::Sleeping);

    let step = lb.initiator.wake_up().unwrap();
    assert_eq!(lb.run(step).unwrap(), Step::Complete);
    assert_eq!(lb.initiator.context().unwrap().pni, Pni::new(0));
    assert_eq!(lb.target.state(), TargetState::AwaitingConfirmation);

    assert_eq!(lb.exchange(b"three").unwrap(), b"three".to_vec());
    assert_eq!(lb.target.state(), TargetState::ExchangeIdle);
}

#[test]
fn sleeping_target_ignores_foreign_wakeup() {
    common::init_logging();
    let (ini, tgt) = common::fixtures::active_pair();
    let mut lb = Loopback::new(ini, tgt);
    lb.activate().unwrap();
    let step = lb.initiator.deactivate(Deactivation::Disconnect).unwrap();
    lb.run(step).unwrap();

    let wup = nfcdep::protocol::Command::Wup {
        nfcid3: common::fixtures::initiator_nfcid3(),
        did: 0,
    };
    let frame = nfcdep::protocol::Frame::encode(&wup.encode(), false).unwrap();
    let step = lb
        .target
        .step(nfcdep::session::Event::Received(frame))
        .unwrap();
    assert_eq!(step, Step::Wait { timeout: None });
    assert_eq!(lb.target.state(), TargetState::Sleeping);
}

#[test]
fn wake_up_needs_active_mode() {
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    lb.activate().unwrap();
    let step = lb.initiator.deactivate(Deactivation::Disconnect).unwrap();
    lb.run(step).unwrap();
    assert!(matches!(
        lb.initiator.wake_up(),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn pending_deactivation_cancels_exchange() {
    common::init_logging();
    let flag = DeactivationFlag::new();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    lb.initiator.set_deactivation_check(flag.clone());
    lb.activate().unwrap();

    flag.request();
    assert_eq!(lb.exchange(b"late"), Err(Error::Cancelled));
    assert_eq!(lb.initiator.state(), InitiatorState::Idle);
    assert!(lb.initiator.context().is_none());
}
