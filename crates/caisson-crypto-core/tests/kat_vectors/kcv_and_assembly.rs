//! KCV and key-assembly known answers.

use caisson_crypto_core::{
    assemble, kcv, AlgorithmProfile, BlockCipher, CipherFamily, Padding, SoftCipher,
};

const SOFT: SoftCipher = SoftCipher;

#[test]
fn tdes_kcv_known_answer() {
    let check = kcv(&SOFT, "0123456789ABCDEFFEDCBA9876543210", CipherFamily::Tdes)
        .expect("KCV should succeed");
    assert_eq!(check, "08D7B4");
}

#[test]
fn aes_kcv_matches_zero_block_encryption() {
    let key_hex = "00112233445566778899AABBCCDDEEFF";
    let key = caisson_crypto_core::decode_hex(key_hex).expect("valid hex");
    let block = SOFT
        .encrypt_ecb(CipherFamily::Aes, &key, &[0u8; 16], Padding::None)
        .expect("encrypt should succeed");
    let expected = caisson_crypto_core::encode_hex(&block[..3]);

    let check = kcv(&SOFT, key_hex, CipherFamily::Aes).expect("KCV should succeed");
    assert_eq!(check, expected);
}

#[test]
fn two_part_aes_assembly_known_answer() {
    let profile = AlgorithmProfile::new(CipherFamily::Aes, 16, 2).expect("valid profile");
    let result = assemble(
        &SOFT,
        &profile,
        &[
            "11111111111111111111111111111111",
            "22222222222222222222222222222222",
        ],
    )
    .expect("assembly should succeed");

    assert_eq!(result.key, "33333333333333333333333333333333");
    let expected_kcv = kcv(&SOFT, &result.key, CipherFamily::Aes).expect("KCV should succeed");
    assert_eq!(result.kcv, expected_kcv);
}

#[test]
fn assembled_tdes_key_reports_the_reference_kcv() {
    // XOR of these components reconstructs the reference key above.
    let profile = AlgorithmProfile::new(CipherFamily::Tdes, 16, 2).expect("valid profile");
    let c1 = "0000000000000000FEDCBA9876543210";
    let c2 = "0123456789ABCDEF0000000000000000";
    let result = assemble(&SOFT, &profile, &[c1, c2]).expect("assembly should succeed");
    assert_eq!(result.key, "0123456789ABCDEFFEDCBA9876543210");
    assert_eq!(result.kcv, "08D7B4");
}
