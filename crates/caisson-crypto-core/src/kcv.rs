//! Key Check Value computation.
//!
//! A KCV is the first 3 bytes of the ECB-NoPadding encryption of a
//! single all-zero block under the key being checked. Two parties
//! compare KCVs to confirm they hold the same key without revealing it.

use crate::cipher::{BlockCipher, CipherFamily, Padding};
use crate::error::CryptoError;
use crate::hex;
use zeroize::Zeroizing;

/// KCV length in bytes (6 hex chars).
pub const KCV_LEN: usize = 3;

/// Compute the Key Check Value of `key_hex` under `family`.
///
/// Accepted key lengths: AES 16/24/32 bytes; TDES 8/16/24 bytes. An
/// 8-byte TDES key is a single DES component; **for KCV purposes only**
/// it is doubled into a 2-key TDES key (component || component). That
/// doubling never applies to actual encryption operations elsewhere in
/// this crate.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] for non-hex input and
/// [`CryptoError::InvalidLength`] for a key length the family does not
/// accept.
pub fn kcv<C: BlockCipher>(
    cipher: &C,
    key_hex: &str,
    family: CipherFamily,
) -> Result<String, CryptoError> {
    let decoded = Zeroizing::new(hex::decode(key_hex)?);

    let key: Zeroizing<Vec<u8>> = match (family, decoded.len()) {
        // Single DES component: check value over component || component.
        (CipherFamily::Tdes, 8) => {
            Zeroizing::new([decoded.as_slice(), decoded.as_slice()].concat())
        }
        (CipherFamily::Tdes, 16 | 24) | (CipherFamily::Aes, 16 | 24 | 32) => decoded,
        (_, n) => {
            return Err(CryptoError::InvalidLength(format!(
                "{family:?} KCV key must be one of {:?} bytes (or 8 for a TDES component), got {n}",
                family.key_lengths()
            )));
        }
    };

    let zero_block = vec![0u8; family.block_size()];
    let encrypted = cipher.encrypt_ecb(family, &key, &zero_block, Padding::None)?;
    tracing::debug!(?family, "computed KCV");
    Ok(hex::encode_upper(&encrypted[..KCV_LEN]))
}
