#[path = "../common/mod.rs"]
mod common;

use nfcdep::protocol::commands::AtrReq;
use nfcdep::protocol::{BitRates, Command, DepContext, DepPdu};
use nfcdep::types::{BitRate, LengthReduction, Pni};

#[test]
fn atr_req_layout() {
    let req = common::fixtures::sample_atr_req(0);
    let body = Command::Atr(req.clone()).encode();

    assert_eq!(&body[..2], &[0xD4, 0x00]);
    assert_eq!(&body[2..12], common::fixtures::initiator_nfcid3().as_bytes());
    // DIDi BSi BRi PPi: LR 254 with general bytes
    assert_eq!(&body[12..16], &[0x00, 0x00, 0x00, 0x32]);
    assert_eq!(hex::encode(&body[16..]), "46666d010111");
    assert_eq!(AtrReq::decode(&body).unwrap(), req);
}

#[test]
fn psl_and_wup_layout() {
    let psl = Command::Psl {
        did: 2,
        rates: BitRates::new(BitRate::Br212, BitRate::Br424),
        fsl: LengthReduction::Lr192,
    };
    assert_eq!(psl.encode(), vec![0xD4, 0x04, 0x02, 0x0A, 0x02]);

    let wup = Command::Wup {
        nfcid3: common::fixtures::target_nfcid3(),
        did: 2,
    };
    let body = wup.encode();
    assert_eq!(body.len(), 13);
    assert_eq!(body[12], 2);
    assert_eq!(
        Command::decode(&body, &DepContext::default()).unwrap(),
        wup
    );
}

#[test]
fn dep_req_pfb_bits() {
    let cases = [
        (DepPdu::information(Pni::new(1), false, vec![0x01]), 0x01),
        (DepPdu::information(Pni::new(3), true, vec![0x01]), 0x13),
        (DepPdu::ack(Pni::new(2)), 0x42),
        (DepPdu::nack(Pni::new(0)), 0x50),
        (DepPdu::attention(), 0x80),
        (DepPdu::timeout_extension(7), 0x90),
    ];
    for (pdu, pfb) in cases {
        let body = Command::Dep(pdu).encode();
        assert_eq!(body[2], pfb, "PFB of {}", hex::encode(&body));
    }
}

#[test]
fn nad_only_on_first_information_pdu() {
    let pdu = DepPdu::information(Pni::new(0), true, vec![0xAA]).with_nad(Some(0x21));
    let body = Command::Dep(pdu.clone()).encode();
    assert_eq!(body[2], 0x18);

    let agreed = DepContext::new(None, true);
    assert_eq!(
        Command::decode(&body, &agreed).unwrap(),
        Command::Dep(pdu)
    );

    let not_agreed = DepContext::new(None, false);
    assert!(Command::decode(&body, &not_agreed).unwrap_err().is_malformed());

    let mut mid_chain = agreed;
    mid_chain.first_in_chain = false;
    assert!(Command::decode(&body, &mid_chain).is_err());
}
