//! Hex boundary codec and multi-operand XOR.
//!
//! This module provides:
//! - [`decode`] / [`decode_secret`] — case-insensitive hex to bytes
//! - [`encode_upper`] — bytes to canonical uppercase hex
//! - [`xor`] — bitwise XOR across N equal-length hex operands
//! - [`random_hex`] — CSPRNG bytes rendered as uppercase hex
//!
//! Every public input and output of this crate is a hex string (or a
//! decimal-digit string); raw binary exists only inside call frames.
//! Outputs are always uppercase; inputs accept either case.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Decode a hex string into bytes.
///
/// Case-insensitive. Whitespace is **not** tolerated here — only the
/// TR-31 parser strips whitespace, and it does so before calling in.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] if the length is odd or a
/// non-hex character is present.
pub fn decode(hex_str: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(hex_str).map_err(|e| CryptoError::MalformedInput(format!("hex decode: {e}")))
}

/// Decode a hex string holding key material into a [`SecretBytes`].
///
/// # Errors
///
/// Same failure modes as [`decode`].
pub fn decode_secret(hex_str: &str) -> Result<SecretBytes, CryptoError> {
    Ok(SecretBytes::from(decode(hex_str)?))
}

/// Encode bytes as canonical uppercase hex.
#[must_use]
pub fn encode_upper(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// XOR all operands together, returning uppercase hex.
///
/// - Empty operand list returns the empty string.
/// - A single operand is returned unchanged (canonicalized uppercase).
/// - Two or more operands must all decode to the same byte length.
///
/// Mismatched lengths are rejected outright: the legacy behavior of
/// silently zero-extending short operands is a documented source bug
/// and MUST NOT be relied upon.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] for non-hex operands and
/// [`CryptoError::InvalidLength`] when operand lengths differ.
pub fn xor<S: AsRef<str>>(operands: &[S]) -> Result<String, CryptoError> {
    let Some((first, rest)) = operands.split_first() else {
        return Ok(String::new());
    };

    let mut acc = decode(first.as_ref())?;
    for (i, operand) in rest.iter().enumerate() {
        let bytes = decode(operand.as_ref())?;
        if bytes.len() != acc.len() {
            return Err(CryptoError::InvalidLength(format!(
                "XOR operand {} is {} bytes, expected {}",
                i.saturating_add(1),
                bytes.len(),
                acc.len()
            )));
        }
        xor_into(&mut acc, &bytes);
    }
    Ok(encode_upper(&acc))
}

/// XOR `rhs` into `acc` in place. Caller guarantees equal lengths.
pub(crate) fn xor_into(acc: &mut [u8], rhs: &[u8]) {
    debug_assert_eq!(acc.len(), rhs.len());
    for (a, b) in acc.iter_mut().zip(rhs.iter()) {
        *a ^= b;
    }
}

/// XOR two equal-length byte slices into a fresh buffer.
pub(crate) fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Produce `n_bytes` of CSPRNG output as uppercase hex.
///
/// # Errors
///
/// Returns [`CryptoError::Internal`] if the OS CSPRNG fails.
pub fn random_hex(n_bytes: usize) -> Result<String, CryptoError> {
    random_hex_with_rng(n_bytes, &mut OsRng)
}

/// [`random_hex`] with an injected RNG, for deterministic tests.
///
/// # Errors
///
/// Returns [`CryptoError::Internal`] if the RNG fails.
pub fn random_hex_with_rng<R: RngCore + CryptoRng>(
    n_bytes: usize,
    rng: &mut R,
) -> Result<String, CryptoError> {
    let mut bytes = vec![0u8; n_bytes];
    rng.try_fill_bytes(&mut bytes)
        .map_err(|e| CryptoError::Internal(format!("CSPRNG fill failed: {e}")))?;
    Ok(encode_upper(&bytes))
}
