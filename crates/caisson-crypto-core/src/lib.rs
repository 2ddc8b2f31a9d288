//! `caisson-crypto-core` — payment-industry cryptographic primitives.
//!
//! This crate is the conformance target: zero network, zero async, zero
//! UI dependencies. It implements the algorithms payment-terminal
//! tooling and HSM test harnesses need bit-exact:
//!
//! - Key Check Values and multi-component key assembly
//! - ISO 9564-1 PIN blocks (Formats 0, 3, and the AES Format 4)
//! - ANSI X9.24-1 DUKPT derivation (IPEK, transaction key, session keys)
//! - ASC X9 TR-31 key-block structural parsing
//! - Luhn check digits and DES odd-parity adjustment
//!
//! Every operation is a pure function over hex/digit strings; the block
//! cipher, RSA, and X.509 engines are injected collaborators. Attach a
//! `tracing` subscriber to observe operations — with none attached the
//! instrumentation is inert and results never depend on it.

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::arithmetic_side_effects
    )
)]

pub mod error;
pub mod memory;

pub mod cipher;
pub mod hex;

pub mod kcv;
pub mod keys;

pub mod dukpt;
pub mod pinblock;
pub mod tr31;

pub mod luhn;

pub mod rsa;
pub mod x509;

// `cipher`, `hex`, and `rsa` need `self::` to disambiguate from the
// extern crates of the same name.
pub use self::cipher::{render_plaintext, BlockCipher, CipherFamily, Padding, SoftCipher};
pub use self::hex::{
    decode as decode_hex, encode_upper as encode_hex, random_hex, xor as xor_hex,
};
pub use dukpt::{derive as derive_dukpt, DukptKeySet, COUNTER_BITS, KSN_LEN};
pub use error::CryptoError;
pub use kcv::{kcv, KCV_LEN};
pub use keys::{
    adjust_des_parity, assemble, generate_component, AlgorithmProfile, AssembledKey, KeyComponent,
};
pub use luhn::{check_digit as luhn_check_digit, validate as luhn_validate};
pub use memory::SecretBytes;
pub use pinblock::{
    encode as encode_pin_block, extract_pin, recover_pin, PinBlock, PinBlockFormat,
};
pub use tr31::{parse as parse_tr31, Tr31Header, Tr31KeyBlock, Tr31OptionalBlock};
pub use x509::{decode_pem, CertificateInfo, CsrInfo, DecodedDocument};

pub use self::rsa::{
    decrypt_oaep, encrypt_oaep, generate_keypair, RsaKeyPairEncoding, RsaKeyPairResult, RsaKeySize,
};
