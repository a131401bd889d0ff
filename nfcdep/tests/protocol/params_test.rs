use nfcdep::protocol::params;
use nfcdep::types::LengthReduction;
use proptest::prelude::*;

#[test]
fn negotiated_frame_size_is_the_minimum() {
    let local = LengthReduction::from_code(3);
    let peer = LengthReduction::from_code(1);
    assert_eq!(std::cmp::min(local, peer).frame_size(), 128);
}

#[test]
fn activation_deadline() {
    assert_eq!(params::activation_timeout(), (1 << 24) + (1 << 15));
}

proptest! {
    #[test]
    fn frame_size_per_lr(code in 0u8..4) {
        let fs = params::lr_to_fs(code);
        prop_assert!([64usize, 128, 192, 254].contains(&fs));
        prop_assert_eq!(LengthReduction::from_code(code).frame_size(), fs);
    }

    #[test]
    fn waiting_time_per_wt(wt in 0u8..=14) {
        prop_assert_eq!(params::wt_to_rwt(wt), 1u32 << (wt as u32 + 12));
    }

    #[test]
    fn enforced_deadline_never_above_max(wt in 0u8..=14, rtox in 0u8..=59) {
        let t = params::enforced_timeout(params::wt_to_rwt(wt), rtox);
        prop_assert!(t <= 1 << 20);
        prop_assert!(t > 0);
    }
}
