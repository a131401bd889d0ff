#[path = "../common/mod.rs"]
mod common;

use nfcdep::session::{RetryKind, Step};
use nfcdep::test_support::{Direction, Loopback};

fn pair() -> Loopback {
    common::init_logging();
    let mut lb = Loopback::new(
        common::fixtures::initiator_config(),
        common::fixtures::target_config(),
    );
    assert_eq!(lb.activate().unwrap(), Step::Complete);
    lb
}

fn pfbs(lb: &Loopback, dir: Direction) -> Vec<u8> {
    lb.log
        .iter()
        .filter(|(d, _)| *d == dir)
        .filter_map(|(_, frame)| common::dep_pfb(frame))
        .collect()
}

#[test]
fn lost_answer_is_repeated_not_reprocessed() {
    let mut lb = pair();
    lb.drop_next_answer();
    assert_eq!(lb.exchange(b"once").unwrap(), b"once".to_vec());
    assert_eq!(lb.delivered.len(), 1);

    // I-PDU, ATN, then the same I-PDU again
    assert_eq!(pfbs(&lb, Direction::ToTarget), vec![0x00, 0x80, 0x00]);
    // both answers to the I-PDU are the identical frame
    let answers: Vec<&Vec<u8>> = lb
        .log
        .iter()
        .filter(|(d, f)| *d == Direction::ToInitiator && common::dep_pfb(f) == Some(0x00))
        .map(|(_, f)| f)
        .collect();
    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0], answers[1]);
}

#[test]
fn lost_request_is_retransmitted() {
    let mut lb = pair();
    lb.drop_next_request();
    assert_eq!(lb.exchange(b"again").unwrap(), b"again".to_vec());
    assert_eq!(lb.delivered.len(), 1);
}

#[test]
fn corrupted_answer_is_nacked() {
    let mut lb = pair();
    lb.corrupt_next_answer();
    assert_eq!(lb.exchange(b"nack").unwrap(), b"nack".to_vec());
    assert!(pfbs(&lb, Direction::ToTarget).contains(&0x50));
    // counters are reset by the successful exchange
    assert_eq!(lb.initiator.retry_count(RetryKind::Nack), 0);
}

#[test]
fn slow_answer_uses_rtox() {
    let mut lb = pair();
    lb.delay_next_answer();
    assert_eq!(lb.exchange(b"slow").unwrap(), b"slow".to_vec());

    assert!(pfbs(&lb, Direction::ToInitiator).contains(&0x90));
    assert!(pfbs(&lb, Direction::ToTarget).contains(&0x90));
    // the extension is dropped once the answer arrived
    let ctx = lb.initiator.context().unwrap();
    assert_eq!(ctx.supervisor.extension(), None);
}

#[test]
fn chained_transfer_survives_lost_ack() {
    let mut lb = pair();
    let fs = lb.initiator.device_info().unwrap().fs;
    let payload = common::fixtures::counting_payload(2 * fs);
    lb.drop_next_answer();
    assert_eq!(lb.exchange(&payload).unwrap(), payload);
    assert_eq!(lb.delivered, vec![payload]);
}
