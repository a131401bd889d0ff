#[path = "../common/mod.rs"]
mod common;

use nfcdep::session::{BitRateRequest, InitiatorState, Step, TargetState};
use nfcdep::test_support::{Direction, Loopback};
use nfcdep::types::{BitRate, LengthReduction, Pni};
use nfcdep::protocol::BitRates;

fn activated(lb: &mut Loopback) {
    assert_eq!(lb.activate().unwrap(), Step::Complete);
    assert_eq!(lb.initiator.state(), InitiatorState::ExchangeIdle);
    assert_eq!(lb.target.state(), TargetState::AwaitingConfirmation);
}

#[test]
fn frame_size_is_negotiated_down() {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config().with_lr(LengthReduction::from_code(3)),
        common::fixtures::target_config().with_lr(LengthReduction::from_code(1)),
    );
    activated(&mut lb);
    assert_eq!(lb.initiator.device_info().unwrap().fs, 128);
    assert_eq!(lb.target.device_info().unwrap().fs, 128);
}

#[test]
fn large_payload_is_chained_both_ways() {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    activated(&mut lb);
    let fs = lb.initiator.device_info().unwrap().fs;
    let payload = common::fixtures::counting_payload(3 * fs + 5);

    let echoed = lb.exchange(&payload).unwrap();
    assert_eq!(echoed, payload);
    assert_eq!(lb.delivered, vec![payload]);

    // information PDUs sent by the Initiator: MI on all but the last
    let chaining: Vec<bool> = lb
        .log
        .iter()
        .filter(|(dir, _)| *dir == Direction::ToTarget)
        .filter_map(|(_, frame)| common::dep_pfb(frame))
        .filter(|pfb| pfb & 0xE0 == 0x00)
        .map(|pfb| pfb & 0x10 != 0)
        .collect();
    assert_eq!(chaining, vec![true, true, true, false]);
}

#[test]
fn pni_stays_in_step() {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    activated(&mut lb);
    for round in 1..=9u8 {
        let reply = lb.exchange(&[round]).unwrap();
        assert_eq!(reply, vec![round]);
        let ini = lb.initiator.context().unwrap().pni;
        let tgt = lb.target.context().unwrap().pni;
        assert_eq!(ini, tgt);
        assert_eq!(ini, Pni::new(round));
    }
}

#[test]
fn psl_switches_both_sides() {
    common::init_logging();
    let rates = BitRates::symmetric(BitRate::Br424);
    let mut lb = Loopback::new(
        common::fixtures::initiator_config().with_psl(BitRateRequest::Select(rates)),
        common::fixtures::target_config(),
    );
    assert_eq!(lb.activate().unwrap(), Step::Complete);
    assert_eq!(lb.initiator.context().unwrap().bit_rate, BitRate::Br424);
    assert_eq!(lb.target.context().unwrap().bit_rate, BitRate::Br424);

    lb.log.clear();
    assert_eq!(lb.exchange(b"fast").unwrap(), b"fast".to_vec());
    // no start byte above 106 kbps
    assert!(lb.log.iter().all(|(_, frame)| frame[0] != 0xF0));
}

#[test]
fn responder_sees_each_request_once() {
    common::init_logging();
    let mut lb = Loopback::with_responder(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
        |req| req.iter().rev().copied().collect(),
    );
    activated(&mut lb);
    assert_eq!(lb.exchange(&[1, 2, 3]).unwrap(), vec![3, 2, 1]);
    assert_eq!(lb.exchange(&[]).unwrap(), Vec::<u8>::new());
    assert_eq!(lb.delivered.len(), 2);
}

#[test]
fn presence_checks_in_a_row_keep_the_session() {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    activated(&mut lb);
    assert_eq!(lb.exchange(b"ping").unwrap(), b"ping".to_vec());

    for _ in 0..5 {
        let step = lb.initiator.probe_presence().unwrap();
        assert_eq!(lb.run(step).unwrap(), Step::Complete);
        assert_eq!(lb.target.state(), TargetState::ExchangeIdle);
    }
    assert_eq!(lb.exchange(b"still here").unwrap(), b"still here".to_vec());
}
