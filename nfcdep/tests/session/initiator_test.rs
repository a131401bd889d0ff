#[path = "../common/mod.rs"]
mod common;

use nfcdep::session::{
    DeactivationFlag, Event, Initiator, InitiatorState, RetryKind, RetryLimits, Step,
};
use nfcdep::Error;

fn sent_frame(step: &Step) -> Vec<u8> {
    match step {
        Step::SendAndWait { frame, .. } => frame.clone(),
        other => panic!("expected SendAndWait, got {:?}", other),
    }
}

fn activated(ini: &mut Initiator) {
    ini.start().unwrap();
    let step = ini
        .step(Event::Received(common::fixtures::atr_res_frame(0, 8)))
        .unwrap();
    assert_eq!(step, Step::Complete);
}

#[test]
fn short_atr_res_is_rejected() {
    common::init_logging();
    let mut ini = Initiator::new(common::fixtures::initiator_config());
    ini.start().unwrap();

    let mut frame = common::fixtures::atr_res_frame(0, 8);
    // drop the last byte of the body and fix LEN: 16 byte body
    frame.pop();
    frame[1] -= 1;
    let err = ini.step(Event::Received(frame)).unwrap_err();
    assert!(err.is_malformed(), "{:?}", err);
    assert_eq!(ini.state(), InitiatorState::Idle);
}

#[test]
fn sequence_errors_stop_at_the_bound() {
    common::init_logging();
    let mut ini = Initiator::new(
        common::fixtures::initiator_config().with_limits(RetryLimits::default().with_nack(3)),
    );
    activated(&mut ini);

    let mut sent = vec![sent_frame(&ini.send(b"data", false).unwrap())];
    let wrong = common::fixtures::dep_res_frame(0x01, b"?");
    let mut outcome = Ok(Step::Complete);
    for _ in 0..3 {
        outcome = ini.step(Event::Received(wrong.clone()));
        match &outcome {
            Ok(step) => sent.push(sent_frame(step)),
            Err(_) => break,
        }
    }
    assert_eq!(outcome, Err(Error::RetryExhausted(RetryKind::Nack)));
    assert_eq!(ini.state(), InitiatorState::Idle);
    // first transmission plus two retries, no fourth frame
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|f| f == &sent[0]));
}

#[test]
fn deactivation_during_rtox_wait_cancels() {
    common::init_logging();
    let flag = DeactivationFlag::new();
    let mut ini = Initiator::new(common::fixtures::initiator_config())
        .with_deactivation_check(flag.clone());
    activated(&mut ini);

    ini.send(b"q", false).unwrap();
    let echo = ini
        .step(Event::Received(common::fixtures::dep_res_frame(0x90, &[0x02])))
        .unwrap();
    assert_eq!(sent_frame(&echo), vec![0xF0, 0x05, 0xD4, 0x06, 0x90, 0x02]);
    assert_eq!(ini.retry_count(RetryKind::Rtox), 1);

    flag.request();
    assert_eq!(ini.step(Event::Timeout).unwrap(), Step::Cancelled);
    assert_eq!(ini.state(), InitiatorState::Idle);
}

#[test]
fn rtox_multiplies_the_deadline() {
    let mut ini = Initiator::new(common::fixtures::initiator_config());
    ini.start().unwrap();
    // WT 4: RWT 2^16
    ini.step(Event::Received(common::fixtures::atr_res_frame(0, 4)))
        .unwrap();

    let plain = match ini.send(b"q", false).unwrap() {
        Step::SendAndWait { timeout, .. } => timeout.unwrap(),
        other => panic!("{:?}", other),
    };
    let extended = match ini
        .step(Event::Received(common::fixtures::dep_res_frame(0x90, &[0x03])))
        .unwrap()
    {
        Step::SendAndWait { timeout, .. } => timeout.unwrap(),
        other => panic!("{:?}", other),
    };
    assert_eq!(plain, (1 << 16) + (1 << 16));
    assert_eq!(extended, 3 * (1 << 16) + (1 << 16));

    // a large factor is clamped to the protocol maximum
    let mut ini = Initiator::new(common::fixtures::initiator_config());
    ini.start().unwrap();
    ini.step(Event::Received(common::fixtures::atr_res_frame(0, 8)))
        .unwrap();
    ini.send(b"q", false).unwrap();
    match ini
        .step(Event::Received(common::fixtures::dep_res_frame(0x90, &[59])))
        .unwrap()
    {
        Step::SendAndWait { timeout, .. } => assert_eq!(timeout, Some(1 << 20)),
        other => panic!("{:?}", other),
    }
}

#[test]
fn bit_rate_negotiation_timeout_is_fatal() {
    let rates = nfcdep::protocol::BitRates::symmetric(nfcdep::types::BitRate::Br212);
    let mut ini = Initiator::new(
        common::fixtures::initiator_config()
            .with_psl(nfcdep::session::BitRateRequest::Select(rates)),
    );
    ini.start().unwrap();
    let step = ini
        .step(Event::Received(common::fixtures::atr_res_frame(0, 8)))
        .unwrap();
    assert_eq!(sent_frame(&step)[2..4], [0xD4, 0x04]);
    assert_eq!(ini.step(Event::Timeout), Err(Error::Timeout));
    assert_eq!(ini.state(), InitiatorState::Idle);
}
