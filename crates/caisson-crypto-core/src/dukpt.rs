//! ANSI X9.24-1 DUKPT key derivation.
//!
//! This module provides:
//! - [`derive`] — full derivation from (BDK, KSN) to the transaction
//!   key and the five session-key variants
//! - [`DukptKeySet`] — the derived material, hex at the boundary
//!
//! # Derivation Walk
//!
//! The 10-byte KSN carries a 21-bit transaction counter in its low
//! bits. Derivation starts from the IPEK (computed from the BDK and the
//! counter-cleared KSN) and applies one non-reversible key-generation
//! step per **set** counter bit, most-significant bit first, ORing each
//! bit into the shift register as it goes. A counter of zero therefore
//! performs no steps: the transaction key *is* the IPEK.

use crate::cipher::{BlockCipher, CipherFamily, Padding};
use crate::error::CryptoError;
use crate::hex;
use crate::memory::SecretBytes;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// KSN length in bytes.
pub const KSN_LEN: usize = 10;

/// Width of the transaction counter in bits.
pub const COUNTER_BITS: u32 = 21;

/// Key-modification mask used for the IPEK right half and the right
/// half of each non-reversible step (ANSI X9.24-1).
const KEY_MASK: [u8; 16] = [
    0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00, 0x00, 0xC0, 0xC0, 0xC0, 0xC0, 0x00, 0x00, 0x00,
    0x00,
];

/// Session-key variant constants (X9.24-1), XORed onto the transaction key.
const PIN_VARIANT: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xF0];
const MAC_REQUEST_VARIANT: [u8; 16] =
    [0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0];
const MAC_RESPONSE_VARIANT: [u8; 16] =
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
const DATA_REQUEST_VARIANT: [u8; 16] =
    [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0];
const DATA_RESPONSE_VARIANT: [u8; 16] =
    [0, 0, 0, 0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything DUKPT derives for one (BDK, KSN) pair.
///
/// All key fields are uppercase hex; `ksn` is the canonicalized input.
#[must_use = "derived session keys should be used or discarded deliberately"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DukptKeySet {
    /// The 10-byte KSN, uppercase hex.
    pub ksn: String,
    /// The 21-bit transaction counter extracted from the KSN.
    pub counter: u32,
    /// Initial PIN Encryption Key for this device.
    pub ipek: String,
    /// The per-transaction key after the counter walk.
    pub transaction_key: String,
    /// Transaction key XOR `…00F0` — PIN encryption.
    pub pin_key: String,
    /// Transaction key XOR `…FFFFFFFF00000000` (bytes 8–11) — MAC generation.
    pub mac_request_key: String,
    /// Transaction key XOR `…FFFFFFFF` (bytes 12–15) — MAC verification.
    pub mac_response_key: String,
    /// Transaction key XOR bytes 4–7 — data encryption (request).
    pub data_request_key: String,
    /// Transaction key XOR bytes 8–15 — data decryption (response).
    pub data_response_key: String,
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the full DUKPT key set for a (BDK, KSN) pair.
///
/// - `bdk_hex` — 16 or 24 bytes of hex. The 16-byte `C0C0…` mask is
///   XORed over the first 16 bytes when forming the modified BDK; a
///   24-byte BDK keeps its tail unmodified.
/// - `ksn_hex` — exactly 10 bytes of hex.
///
/// # Errors
///
/// [`CryptoError::MalformedInput`] for non-hex input,
/// [`CryptoError::InvalidLength`] for a BDK or KSN of the wrong size;
/// cipher failures propagate.
pub fn derive<C: BlockCipher>(
    cipher: &C,
    bdk_hex: &str,
    ksn_hex: &str,
) -> Result<DukptKeySet, CryptoError> {
    let bdk = hex::decode_secret(bdk_hex)?;
    if bdk.len() != 16 && bdk.len() != 24 {
        return Err(CryptoError::InvalidLength(format!(
            "BDK must be 16 or 24 bytes, got {}",
            bdk.len()
        )));
    }
    let ksn = hex::decode(ksn_hex)?;
    let ksn: [u8; KSN_LEN] = ksn.as_slice().try_into().map_err(|_| {
        CryptoError::InvalidLength(format!("KSN must be {KSN_LEN} bytes, got {}", ksn.len()))
    })?;

    let counter = extract_counter(&ksn);
    let base = clear_counter(&ksn);

    let ipek = derive_ipek(cipher, &bdk, &base)?;
    tracing::debug!(counter, "derived IPEK, starting counter walk");

    // Walk the set counter bits, most-significant first, accumulating
    // them into the shift register.
    let mut current = ipek.clone();
    let mut shift = base;
    for bit in (0..COUNTER_BITS).rev() {
        // bit < 21 < 32, so the shift cannot overflow.
        #[allow(clippy::arithmetic_side_effects)]
        let mask = 1u32 << bit;
        if counter & mask != 0 {
            set_counter_bit(&mut shift, bit);
            let mut portion = [0u8; 8];
            portion.copy_from_slice(&shift[2..KSN_LEN]);
            *current = non_reversible_step(cipher, &current, &portion)?;
        }
    }

    let transaction_key = SecretBytes::new(current.as_slice());
    Ok(DukptKeySet {
        ksn: hex::encode_upper(&ksn),
        counter,
        ipek: hex::encode_upper(ipek.as_slice()),
        transaction_key: transaction_key.to_hex_upper(),
        pin_key: apply_variant(&current, &PIN_VARIANT),
        mac_request_key: apply_variant(&current, &MAC_REQUEST_VARIANT),
        mac_response_key: apply_variant(&current, &MAC_RESPONSE_VARIANT),
        data_request_key: apply_variant(&current, &DATA_REQUEST_VARIANT),
        data_response_key: apply_variant(&current, &DATA_RESPONSE_VARIANT),
    })
}

/// The low 21 bits of the KSN.
// Shift amounts are constants below 32, so the shifts cannot overflow.
#[allow(clippy::arithmetic_side_effects)]
fn extract_counter(ksn: &[u8; KSN_LEN]) -> u32 {
    (u32::from(ksn[7] & 0x1F) << 16) | (u32::from(ksn[8]) << 8) | u32::from(ksn[9])
}

/// The KSN with the 21 counter bits cleared.
fn clear_counter(ksn: &[u8; KSN_LEN]) -> [u8; KSN_LEN] {
    let mut base = *ksn;
    base[7] &= 0xE0;
    base[8] = 0;
    base[9] = 0;
    base
}

/// OR counter bit `bit` (0 = least significant) into the register.
// bit < COUNTER_BITS = 21, so byte index and shift amount stay in range.
#[allow(clippy::arithmetic_side_effects)]
fn set_counter_bit(register: &mut [u8; KSN_LEN], bit: u32) {
    let byte = KSN_LEN - 1 - (bit / 8) as usize;
    register[byte] |= 1u8 << (bit % 8);
}

/// IPEK = TDES(BDK, KSN₆₄) || TDES(BDK ⊕ mask, KSN₆₄), where KSN₆₄ is
/// the rightmost 8 bytes of the counter-cleared KSN.
fn derive_ipek<C: BlockCipher>(
    cipher: &C,
    bdk: &SecretBytes,
    base: &[u8; KSN_LEN],
) -> Result<Zeroizing<[u8; 16]>, CryptoError> {
    let ksn8 = &base[2..KSN_LEN];

    let left = cipher.encrypt_ecb(CipherFamily::Tdes, bdk.expose(), ksn8, Padding::None)?;

    let mut bdk_mod = Zeroizing::new(bdk.expose().to_vec());
    for (byte, mask) in bdk_mod.iter_mut().zip(KEY_MASK.iter()) {
        *byte ^= mask;
    }
    let right = cipher.encrypt_ecb(CipherFamily::Tdes, &bdk_mod, ksn8, Padding::None)?;

    let mut ipek = Zeroizing::new([0u8; 16]);
    ipek[..8].copy_from_slice(&left);
    ipek[8..].copy_from_slice(&right);
    Ok(ipek)
}

/// One non-reversible key-generation step (X9.24-1).
///
/// Each half of the new key is `DES(half-key, KSN₆₄ ⊕ R) ⊕ R`, where
/// the right half works on the mask-modified current key. Single-DES
/// encryption is expressed as an 8-byte-key TDES call.
fn non_reversible_step<C: BlockCipher>(
    cipher: &C,
    key: &[u8; 16],
    ksn8: &[u8; 8],
) -> Result<[u8; 16], CryptoError> {
    let mut next = [0u8; 16];

    // Left half: plain current key.
    let r = &key[8..16];
    let m = Zeroizing::new(hex::xor_bytes(ksn8, r));
    let enc = cipher.encrypt_ecb(CipherFamily::Tdes, &key[..8], &m, Padding::None)?;
    for ((out, enc_byte), r_byte) in next[..8].iter_mut().zip(enc.iter()).zip(r.iter()) {
        *out = enc_byte ^ r_byte;
    }

    // Right half: mask-modified current key.
    let mut key_mod = Zeroizing::new(*key);
    for (byte, mask) in key_mod.iter_mut().zip(KEY_MASK.iter()) {
        *byte ^= mask;
    }
    let m2 = Zeroizing::new(hex::xor_bytes(ksn8, &key_mod[8..16]));
    let enc2 = cipher.encrypt_ecb(CipherFamily::Tdes, &key_mod[..8], &m2, Padding::None)?;
    for ((out, enc_byte), r_byte) in next[8..]
        .iter_mut()
        .zip(enc2.iter())
        .zip(key_mod[8..16].iter())
    {
        *out = enc_byte ^ r_byte;
    }

    Ok(next)
}

fn apply_variant(key: &[u8; 16], variant: &[u8; 16]) -> String {
    hex::encode_upper(&hex::xor_bytes(key, variant))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
