#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

//! Cross-module flows: the sequences terminal tooling actually runs.

use caisson_crypto_core::{
    assemble, decrypt_oaep, derive_dukpt, encode_pin_block, encrypt_oaep, generate_component,
    kcv, luhn_check_digit, luhn_validate, parse_tr31, recover_pin, AlgorithmProfile,
    CipherFamily, PinBlockFormat, RsaKeyPairEncoding, RsaKeyPairResult, RsaKeySize, SoftCipher,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const SOFT: SoftCipher = SoftCipher;

/// Ceremony to PIN block: generate components, assemble the PEK, build
/// and recover a PIN block under it.
#[test]
fn key_ceremony_to_pin_block() {
    let profile = AlgorithmProfile::new(CipherFamily::Tdes, 16, 3).expect("valid profile");
    let components: Vec<String> = (0..3)
        .map(|_| {
            generate_component(&SOFT, &profile)
                .expect("generation should succeed")
                .value
        })
        .collect();

    let assembled = assemble(&SOFT, &profile, &components).expect("assembly should succeed");
    assert_eq!(
        assembled.kcv,
        kcv(&SOFT, &assembled.key, CipherFamily::Tdes).expect("KCV should succeed")
    );

    // A PAN with a valid Luhn check digit.
    let base = "432198765432109";
    let pan = format!("{base}{}", luhn_check_digit(base).expect("digits"));
    assert!(luhn_validate(&pan).expect("digits"));

    let block = encode_pin_block(&SOFT, PinBlockFormat::Iso0, "4321", &pan, Some(&assembled.key))
        .expect("encode should succeed");
    let encrypted = block.encrypted.expect("PEK was supplied");
    let pin = recover_pin(&SOFT, PinBlockFormat::Iso0, &encrypted, &pan, &assembled.key)
        .expect("recovery should succeed");
    assert_eq!(pin, "4321");
}

/// DUKPT PIN session key drives an ISO-0 PIN block end to end.
#[test]
fn dukpt_session_key_encrypts_pin_block() {
    let set = derive_dukpt(
        &SOFT,
        "0123456789ABCDEFFEDCBA9876543210",
        "FFFF9876543210E00001",
    )
    .expect("derivation should succeed");

    let pan = "4111111111111111";
    let block = encode_pin_block(&SOFT, PinBlockFormat::Iso0, "1234", pan, Some(&set.pin_key))
        .expect("encode should succeed");
    let encrypted = block.encrypted.expect("PEK was supplied");

    let pin = recover_pin(&SOFT, PinBlockFormat::Iso0, &encrypted, pan, &set.pin_key)
        .expect("recovery should succeed");
    assert_eq!(pin, "1234");
}

/// Remote key loading: wrap an assembled component under RSA-OAEP.
#[test]
fn rsa_wraps_generated_component() {
    let profile = AlgorithmProfile::new(CipherFamily::Aes, 16, 2).expect("valid profile");
    let component = generate_component(&SOFT, &profile).expect("generation should succeed");

    let mut rng = ChaCha20Rng::seed_from_u64(2024);
    let RsaKeyPairResult::Pem {
        private_key,
        public_key,
    } = caisson_crypto_core::rsa::generate_keypair_with_rng(
        RsaKeySize::Rsa1024,
        RsaKeyPairEncoding::Pem,
        &mut rng,
    )
    .expect("generation should succeed")
    else {
        panic!("requested PEM, got another variant");
    };

    let component_bytes =
        caisson_crypto_core::decode_hex(&component.value).expect("component is hex");
    let wrapped = encrypt_oaep(&public_key, &component_bytes).expect("wrap should succeed");
    let unwrapped = decrypt_oaep(&private_key, &wrapped).expect("unwrap should succeed");
    assert_eq!(unwrapped, component_bytes);
}

/// A TR-31 block carrying the device KSN in its KS optional block.
#[test]
fn tr31_block_carries_dukpt_ksn() {
    let ksn = "FFFF9876543210E00001";
    let wrapped_key = "E5".repeat(12);
    let authenticator = "A0".repeat(8);
    let tail = format!("KS10{ksn}{wrapped_key}{authenticator}");
    let block = format!("B{:04}B1TX00N0100{tail}", 16 + tail.len());

    let parsed = parse_tr31(&block).expect("parse should succeed");
    assert_eq!(parsed.optional_blocks.len(), 1);
    assert_eq!(parsed.optional_blocks[0].id, "KS");
    assert_eq!(parsed.optional_blocks[0].value, ksn);

    // The transported KSN derives keys like any other.
    let set = derive_dukpt(&SOFT, "0123456789ABCDEFFEDCBA9876543210", ksn)
        .expect("derivation should succeed");
    assert_eq!(set.transaction_key, "042666B49184CFA368DE9628D0397BC9");
}
