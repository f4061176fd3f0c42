use super::*;

use proptest::prelude::*;

fn reference_digest(data: &[u8]) -> RollingDigest {
    let mut a: u64 = 0;
    let mut b: u64 = 0;
    for &byte in data {
        a += u64::from(byte);
        b += a;
    }
    RollingDigest::new((a & 0xffff) as u16, (b & 0xffff) as u16, data.len())
}

fn data_and_window() -> impl Strategy<Value = (Vec<u8>, usize)> {
    prop::collection::vec(any::<u8>(), 1..=256)
        .prop_flat_map(|data| {
            let len = data.len();
            (Just(data), 1..=len)
        })
}

#[test]
fn digest_matches_reference_for_known_input() {
    let data = b"rolling checksum over a block";
    let mut checksum = RollingChecksum::new();
    checksum.update(data);
    assert_eq!(checksum.digest(), reference_digest(data));
    assert_eq!(checksum.value(), reference_digest(data).value());
}

#[test]
fn b_weights_bytes_by_distance_from_window_end() {
    // a = 1 + 2 + 3, b = 3*1 + 2*2 + 1*3
    let digest = RollingDigest::from_bytes(&[1, 2, 3]);
    assert_eq!(digest.sum1(), 6);
    assert_eq!(digest.sum2(), 10);
    assert_eq!(digest.len(), 3);
}

#[test]
fn roll_errors_for_empty_window() {
    let mut checksum = RollingChecksum::new();
    assert_eq!(checksum.roll(0, 0), Err(RollingError::EmptyWindow));
}

#[test]
fn roll_pow2_matches_generic_roll() {
    let data: Vec<u8> = (0..200u32).map(|i| (i * 37 % 251) as u8).collect();
    let mut generic = RollingChecksum::new();
    let mut shifted = RollingChecksum::new();
    generic.update(&data[..64]);
    shifted.update(&data[..64]);

    for start in 1..=data.len() - 64 {
        let outgoing = data[start - 1];
        let incoming = data[start + 63];
        generic.roll(outgoing, incoming).expect("primed window");
        shifted.roll_pow2(outgoing, incoming, 6);
        assert_eq!(generic.digest(), shifted.digest());
    }
}

#[test]
fn packed_value_round_trips_components() {
    let digest = RollingDigest::new(0x1234, 0xabcd, 16);
    assert_eq!(digest.value(), 0xabcd_1234);
    assert_eq!(RollingDigest::from_value(digest.value(), 16), digest);
}

proptest! {
    #[test]
    fn rolling_matches_recomputed_windows((data, window) in data_and_window()) {
        let mut rolling = RollingChecksum::new();
        rolling.update(&data[..window]);
        prop_assert_eq!(rolling.digest(), reference_digest(&data[..window]));

        for start in 1..=data.len() - window {
            rolling
                .roll(data[start - 1], data[start + window - 1])
                .expect("rolling update must succeed");
            prop_assert_eq!(rolling.digest(), reference_digest(&data[start..start + window]));
        }
    }

    #[test]
    fn split_updates_match_single_pass(
        data in prop::collection::vec(any::<u8>(), 0..=300),
        split in 0usize..=300,
    ) {
        let split = split.min(data.len());
        let mut incremental = RollingChecksum::new();
        incremental.update(&data[..split]);
        incremental.update(&data[split..]);

        let mut single = RollingChecksum::new();
        single.update_from_block(&data);
        prop_assert_eq!(incremental.digest(), single.digest());
    }
}
