//! ISO 9564-1 PIN-block field construction known answers.

use caisson_crypto_core::pinblock::encode_with_rng;
use caisson_crypto_core::{
    encode_pin_block, recover_pin, BlockCipher, CipherFamily, Padding, PinBlockFormat, SoftCipher,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const SOFT: SoftCipher = SoftCipher;
const PAN: &str = "43219876543210987";
const AES_PEK: &str = "00112233445566778899AABBCCDDEEFF";

#[test]
fn iso0_field_construction() {
    // pinField = 041234FFFFFFFFFF, panField = 0000987654321098.
    let block = encode_pin_block(&SOFT, PinBlockFormat::Iso0, "1234", PAN, None)
        .expect("encode should succeed");
    assert_eq!(
        block.clear,
        caisson_crypto_core::xor_hex(&["041234FFFFFFFFFF", "0000987654321098"])
            .expect("equal lengths")
    );
}

#[test]
fn iso4_plaintext_field_prefix() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xCA15_5011);
    let block = encode_with_rng(
        &SOFT,
        PinBlockFormat::Iso4,
        "1234",
        PAN,
        Some(AES_PEK),
        &mut rng,
    )
    .expect("encode should succeed");

    // "4" control, "4" length, PIN, then 'A' filler to nibble 16; the
    // last 16 nibbles are the RNG tail.
    assert!(block.clear.starts_with("441234AAAAAAAAAA"));
    assert_eq!(block.clear.len(), 32);
}

#[test]
fn iso4_known_construction_under_seeded_rng() {
    // With a pinned RNG the whole pipeline is deterministic; rebuild the
    // Encrypt-XOR-Encrypt by hand and compare.
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let block = encode_with_rng(
        &SOFT,
        PinBlockFormat::Iso4,
        "1234",
        PAN,
        Some(AES_PEK),
        &mut rng,
    )
    .expect("encode should succeed");

    let pek = caisson_crypto_core::decode_hex(AES_PEK).expect("valid hex");
    let pin_field = caisson_crypto_core::decode_hex(&block.clear).expect("valid hex");
    // PAN field: marker 5 (17 digits - 12), PAN, zero fill.
    let pan_field = caisson_crypto_core::decode_hex("54321987654321098700000000000000")
        .expect("valid hex");

    let e1 = SOFT
        .encrypt_ecb(CipherFamily::Aes, &pek, &pin_field, Padding::None)
        .expect("encrypt should succeed");
    let x: Vec<u8> = pan_field.iter().zip(e1.iter()).map(|(a, b)| a ^ b).collect();
    let e2 = SOFT
        .encrypt_ecb(CipherFamily::Aes, &pek, &x, Padding::None)
        .expect("encrypt should succeed");

    assert_eq!(
        block.encrypted.as_deref(),
        Some(caisson_crypto_core::encode_hex(&e2).as_str())
    );
}

#[test]
fn iso4_recovery_roundtrip() {
    let block = encode_pin_block(&SOFT, PinBlockFormat::Iso4, "567890", PAN, Some(AES_PEK))
        .expect("encode should succeed");
    let pin = recover_pin(
        &SOFT,
        PinBlockFormat::Iso4,
        block.encrypted.as_deref().expect("format 4 encrypts"),
        PAN,
        AES_PEK,
    )
    .expect("recovery should succeed");
    assert_eq!(pin, "567890");
}
