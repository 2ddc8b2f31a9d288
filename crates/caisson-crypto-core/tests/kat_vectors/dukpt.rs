//! ANSI X9.24-1 DUKPT Known-Answer Tests.
//!
//! The BDK/KSN pair below is the sample set used throughout the
//! industry's X9.24-1 documentation; the derived keys for the first
//! transaction counters are reproduced in every conformant
//! implementation's test suite.

use caisson_crypto_core::{derive_dukpt, SoftCipher};

const SOFT: SoftCipher = SoftCipher;
const BDK: &str = "0123456789ABCDEFFEDCBA9876543210";
const KSN_BASE: &str = "FFFF9876543210E";

struct DerivedVector {
    counter: u32,
    transaction_key: &'static str,
}

/// Transaction keys for the first counters of the sample device.
const DERIVED: [DerivedVector; 3] = [
    DerivedVector {
        counter: 1,
        transaction_key: "042666B49184CFA368DE9628D0397BC9",
    },
    DerivedVector {
        counter: 2,
        transaction_key: "C46551CEF9FD24B0AA9AD834130D3BC7",
    },
    DerivedVector {
        counter: 3,
        transaction_key: "0DF3D9422ACA56E547676D07AD6BADFA",
    },
];

fn ksn_for(counter: u32) -> String {
    format!("{KSN_BASE}{counter:05X}")
}

#[test]
fn sample_ipek() {
    let set = derive_dukpt(&SOFT, BDK, &ksn_for(1)).expect("derivation should succeed");
    assert_eq!(set.ipek, "6AC292FAA1315B4D858AB3A3D7D5933A");
}

#[test]
fn ipek_is_counter_independent() {
    let a = derive_dukpt(&SOFT, BDK, &ksn_for(1)).expect("derivation should succeed");
    let b = derive_dukpt(&SOFT, BDK, &ksn_for(0x1_F0A3)).expect("derivation should succeed");
    assert_eq!(a.ipek, b.ipek);
}

#[test]
fn sample_transaction_keys() {
    for vector in &DERIVED {
        let set = derive_dukpt(&SOFT, BDK, &ksn_for(vector.counter))
            .expect("derivation should succeed");
        assert_eq!(set.counter, vector.counter);
        assert_eq!(
            set.transaction_key, vector.transaction_key,
            "transaction key mismatch at counter {}",
            vector.counter
        );
    }
}

#[test]
fn counter_three_requires_two_walk_steps() {
    // Counter 3 sets bits 1 and 0; its key must match the published
    // vector only if the walk processes the high bit first.
    let set = derive_dukpt(&SOFT, BDK, &ksn_for(3)).expect("derivation should succeed");
    assert_eq!(set.transaction_key, "0DF3D9422ACA56E547676D07AD6BADFA");
}

#[test]
fn session_keys_are_variant_xors_of_the_transaction_key() {
    let set = derive_dukpt(&SOFT, BDK, &ksn_for(1)).expect("derivation should succeed");

    let expect_xor = |variant: &str| {
        caisson_crypto_core::xor_hex(&[set.transaction_key.as_str(), variant])
            .expect("equal lengths")
    };

    assert_eq!(set.pin_key, expect_xor("000000000000000000000000000000F0"));
    assert_eq!(
        set.mac_request_key,
        expect_xor("0000000000000000FFFFFFFF00000000")
    );
    assert_eq!(
        set.mac_response_key,
        expect_xor("000000000000000000000000FFFFFFFF")
    );
    assert_eq!(
        set.data_request_key,
        expect_xor("00000000FFFFFFFF0000000000000000")
    );
    assert_eq!(
        set.data_response_key,
        expect_xor("0000000000000000FFFFFFFFFFFFFFFF")
    );
}

#[test]
fn sample_pin_session_key() {
    let set = derive_dukpt(&SOFT, BDK, &ksn_for(1)).expect("derivation should succeed");
    assert_eq!(set.pin_key, "042666B49184CFA368DE9628D0397B39");
}

#[test]
fn counter_zero_yields_ipek_as_transaction_key() {
    let set = derive_dukpt(&SOFT, BDK, &ksn_for(0)).expect("derivation should succeed");
    assert_eq!(set.counter, 0);
    assert_eq!(set.transaction_key, set.ipek);
}
