//! Block-cipher provider: AES and TDES in ECB/CBC with explicit padding.
//!
//! This module provides:
//! - [`BlockCipher`] — the cipher seam the core operations call
//! - [`SoftCipher`] — pure-software implementation over the RustCrypto
//!   `aes`/`des` crates
//! - [`render_plaintext`] — decrypt-to-text helper with plausibility
//!   checks
//!
//! The core never reaches a cipher through global state; callers pass a
//! provider into each operation. [`SoftCipher`] is a zero-sized default
//! for tooling; an HSM-backed provider can stand in behind the same
//! trait.

use crate::error::CryptoError;
use aes::{Aes128, Aes192, Aes256};
use cipher::block_padding::{AnsiX923, Iso10126, NoPadding, Pkcs7, ZeroPadding};
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit};
use des::{Des, TdesEde2, TdesEde3};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Symmetric cipher family. Determines block size and accepted key lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CipherFamily {
    /// AES — 16-byte blocks, 16/24/32-byte keys.
    Aes,
    /// DES / Triple-DES — 8-byte blocks, 8/16/24-byte keys.
    /// An 8-byte key is the degenerate single-DES form (K1 = K2 = K3).
    Tdes,
}

impl CipherFamily {
    /// Block size in bytes.
    #[must_use]
    pub const fn block_size(self) -> usize {
        match self {
            Self::Aes => 16,
            Self::Tdes => 8,
        }
    }

    /// Accepted raw key lengths in bytes.
    #[must_use]
    pub const fn key_lengths(self) -> &'static [usize] {
        match self {
            Self::Aes => &[16, 24, 32],
            Self::Tdes => &[8, 16, 24],
        }
    }
}

/// Padding scheme for block alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Padding {
    /// No padding — data must already be block-aligned.
    None,
    /// PKCS#7 (each pad byte holds the pad length).
    Pkcs7,
    /// ANSI X9.23 (zero fill, final byte holds the pad length).
    AnsiX923,
    /// ISO 10126 (arbitrary fill, final byte holds the pad length).
    Iso10126,
    /// Zero fill. Ambiguous for plaintext ending in `0x00`.
    Zero,
}

/// The cipher seam consumed by KCV, key assembly, PIN blocks, and DUKPT.
///
/// Implementations must be pure: same key + data + mode in, same bytes
/// out, no retained state between calls.
pub trait BlockCipher {
    /// ECB-mode encryption.
    ///
    /// # Errors
    ///
    /// `InvalidLength` for unusable key lengths or (with
    /// [`Padding::None`]) unaligned data; `Crypto` for cipher failures.
    fn encrypt_ecb(
        &self,
        family: CipherFamily,
        key: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError>;

    /// ECB-mode decryption.
    ///
    /// # Errors
    ///
    /// As [`BlockCipher::encrypt_ecb`]; unpadding failures surface as
    /// `Crypto`.
    fn decrypt_ecb(
        &self,
        family: CipherFamily,
        key: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError>;

    /// CBC-mode encryption. The IV must be one block long.
    ///
    /// # Errors
    ///
    /// As [`BlockCipher::encrypt_ecb`], plus `InvalidLength` for a
    /// wrong-size IV.
    fn encrypt_cbc(
        &self,
        family: CipherFamily,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError>;

    /// CBC-mode decryption. The IV must be one block long.
    ///
    /// # Errors
    ///
    /// As [`BlockCipher::decrypt_ecb`], plus `InvalidLength` for a
    /// wrong-size IV.
    fn decrypt_cbc(
        &self,
        family: CipherFamily,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError>;
}

/// Software block-cipher provider over the RustCrypto `aes`/`des` crates.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftCipher;

// ---------------------------------------------------------------------------
// Padding dispatch
// ---------------------------------------------------------------------------

fn encrypt_with_padding<M>(enc: M, data: &[u8], padding: Padding) -> Vec<u8>
where
    M: BlockEncryptMut,
{
    match padding {
        Padding::None => enc.encrypt_padded_vec_mut::<NoPadding>(data),
        Padding::Pkcs7 => enc.encrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::AnsiX923 => enc.encrypt_padded_vec_mut::<AnsiX923>(data),
        Padding::Iso10126 => enc.encrypt_padded_vec_mut::<Iso10126>(data),
        Padding::Zero => enc.encrypt_padded_vec_mut::<ZeroPadding>(data),
    }
}

fn decrypt_with_padding<M>(dec: M, data: &[u8], padding: Padding) -> Result<Vec<u8>, CryptoError>
where
    M: BlockDecryptMut,
{
    let result = match padding {
        Padding::None => dec.decrypt_padded_vec_mut::<NoPadding>(data),
        Padding::Pkcs7 => dec.decrypt_padded_vec_mut::<Pkcs7>(data),
        Padding::AnsiX923 => dec.decrypt_padded_vec_mut::<AnsiX923>(data),
        Padding::Iso10126 => dec.decrypt_padded_vec_mut::<Iso10126>(data),
        Padding::Zero => dec.decrypt_padded_vec_mut::<ZeroPadding>(data),
    };
    result.map_err(|_| {
        CryptoError::Crypto(
            "unpadding failed — wrong key, wrong IV, or mismatched padding scheme".to_owned(),
        )
    })
}

// ---------------------------------------------------------------------------
// Key-length dispatch
// ---------------------------------------------------------------------------

fn ecb_encrypt<C>(key: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>, CryptoError>
where
    C: cipher::BlockEncryptMut + cipher::BlockCipher + KeyInit,
{
    let enc = ecb::Encryptor::<C>::new_from_slice(key)
        .map_err(|e| CryptoError::Internal(format!("cipher key init: {e}")))?;
    Ok(encrypt_with_padding(enc, data, padding))
}

fn ecb_decrypt<C>(key: &[u8], data: &[u8], padding: Padding) -> Result<Vec<u8>, CryptoError>
where
    C: cipher::BlockDecryptMut + cipher::BlockCipher + KeyInit,
{
    let dec = ecb::Decryptor::<C>::new_from_slice(key)
        .map_err(|e| CryptoError::Internal(format!("cipher key init: {e}")))?;
    decrypt_with_padding(dec, data, padding)
}

fn cbc_encrypt<C>(
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: Padding,
) -> Result<Vec<u8>, CryptoError>
where
    C: cipher::BlockEncryptMut + cipher::BlockCipher + KeyInit,
{
    let enc = cbc::Encryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| CryptoError::Internal(format!("cipher key/iv init: {e}")))?;
    Ok(encrypt_with_padding(enc, data, padding))
}

fn cbc_decrypt<C>(
    key: &[u8],
    iv: &[u8],
    data: &[u8],
    padding: Padding,
) -> Result<Vec<u8>, CryptoError>
where
    C: cipher::BlockDecryptMut + cipher::BlockCipher + KeyInit,
{
    let dec = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|e| CryptoError::Internal(format!("cipher key/iv init: {e}")))?;
    decrypt_with_padding(dec, data, padding)
}

/// `true` if `len` is a whole number of blocks for `family`.
// block_size() is a non-zero constant, so `%` cannot panic.
#[allow(clippy::arithmetic_side_effects)]
fn is_block_aligned(family: CipherFamily, len: usize) -> bool {
    len % family.block_size() == 0
}

fn check_key(family: CipherFamily, key: &[u8]) -> Result<(), CryptoError> {
    if family.key_lengths().contains(&key.len()) {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength(format!(
            "{family:?} key must be one of {:?} bytes, got {}",
            family.key_lengths(),
            key.len()
        )))
    }
}

fn check_iv(family: CipherFamily, iv: &[u8]) -> Result<(), CryptoError> {
    if iv.len() == family.block_size() {
        Ok(())
    } else {
        Err(CryptoError::InvalidLength(format!(
            "{family:?} IV must be {} bytes, got {}",
            family.block_size(),
            iv.len()
        )))
    }
}

fn check_alignment(
    family: CipherFamily,
    data: &[u8],
    padding: Padding,
) -> Result<(), CryptoError> {
    if padding == Padding::None && !is_block_aligned(family, data.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "data length {} is not a multiple of the {}-byte block size and no padding was requested",
            data.len(),
            family.block_size()
        )));
    }
    Ok(())
}

impl BlockCipher for SoftCipher {
    fn encrypt_ecb(
        &self,
        family: CipherFamily,
        key: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError> {
        check_key(family, key)?;
        check_alignment(family, data, padding)?;
        tracing::trace!(?family, ?padding, data_len = data.len(), "ECB encrypt");
        match (family, key.len()) {
            (CipherFamily::Aes, 16) => ecb_encrypt::<Aes128>(key, data, padding),
            (CipherFamily::Aes, 24) => ecb_encrypt::<Aes192>(key, data, padding),
            (CipherFamily::Aes, 32) => ecb_encrypt::<Aes256>(key, data, padding),
            (CipherFamily::Tdes, 8) => ecb_encrypt::<Des>(key, data, padding),
            (CipherFamily::Tdes, 16) => ecb_encrypt::<TdesEde2>(key, data, padding),
            (CipherFamily::Tdes, 24) => ecb_encrypt::<TdesEde3>(key, data, padding),
            _ => Err(CryptoError::Internal("unreachable key dispatch".to_owned())),
        }
    }

    fn decrypt_ecb(
        &self,
        family: CipherFamily,
        key: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError> {
        check_key(family, key)?;
        if !is_block_aligned(family, data.len()) {
            return Err(CryptoError::InvalidLength(format!(
                "ciphertext length {} is not a multiple of the {}-byte block size",
                data.len(),
                family.block_size()
            )));
        }
        tracing::trace!(?family, ?padding, data_len = data.len(), "ECB decrypt");
        match (family, key.len()) {
            (CipherFamily::Aes, 16) => ecb_decrypt::<Aes128>(key, data, padding),
            (CipherFamily::Aes, 24) => ecb_decrypt::<Aes192>(key, data, padding),
            (CipherFamily::Aes, 32) => ecb_decrypt::<Aes256>(key, data, padding),
            (CipherFamily::Tdes, 8) => ecb_decrypt::<Des>(key, data, padding),
            (CipherFamily::Tdes, 16) => ecb_decrypt::<TdesEde2>(key, data, padding),
            (CipherFamily::Tdes, 24) => ecb_decrypt::<TdesEde3>(key, data, padding),
            _ => Err(CryptoError::Internal("unreachable key dispatch".to_owned())),
        }
    }

    fn encrypt_cbc(
        &self,
        family: CipherFamily,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError> {
        check_key(family, key)?;
        check_iv(family, iv)?;
        check_alignment(family, data, padding)?;
        tracing::trace!(?family, ?padding, data_len = data.len(), "CBC encrypt");
        match (family, key.len()) {
            (CipherFamily::Aes, 16) => cbc_encrypt::<Aes128>(key, iv, data, padding),
            (CipherFamily::Aes, 24) => cbc_encrypt::<Aes192>(key, iv, data, padding),
            (CipherFamily::Aes, 32) => cbc_encrypt::<Aes256>(key, iv, data, padding),
            (CipherFamily::Tdes, 8) => cbc_encrypt::<Des>(key, iv, data, padding),
            (CipherFamily::Tdes, 16) => cbc_encrypt::<TdesEde2>(key, iv, data, padding),
            (CipherFamily::Tdes, 24) => cbc_encrypt::<TdesEde3>(key, iv, data, padding),
            _ => Err(CryptoError::Internal("unreachable key dispatch".to_owned())),
        }
    }

    fn decrypt_cbc(
        &self,
        family: CipherFamily,
        key: &[u8],
        iv: &[u8],
        data: &[u8],
        padding: Padding,
    ) -> Result<Vec<u8>, CryptoError> {
        check_key(family, key)?;
        check_iv(family, iv)?;
        if !is_block_aligned(family, data.len()) {
            return Err(CryptoError::InvalidLength(format!(
                "ciphertext length {} is not a multiple of the {}-byte block size",
                data.len(),
                family.block_size()
            )));
        }
        tracing::trace!(?family, ?padding, data_len = data.len(), "CBC decrypt");
        match (family, key.len()) {
            (CipherFamily::Aes, 16) => cbc_decrypt::<Aes128>(key, iv, data, padding),
            (CipherFamily::Aes, 24) => cbc_decrypt::<Aes192>(key, iv, data, padding),
            (CipherFamily::Aes, 32) => cbc_decrypt::<Aes256>(key, iv, data, padding),
            (CipherFamily::Tdes, 8) => cbc_decrypt::<Des>(key, iv, data, padding),
            (CipherFamily::Tdes, 16) => cbc_decrypt::<TdesEde2>(key, iv, data, padding),
            (CipherFamily::Tdes, 24) => cbc_decrypt::<TdesEde3>(key, iv, data, padding),
            _ => Err(CryptoError::Internal("unreachable key dispatch".to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Decrypt-to-text plausibility
// ---------------------------------------------------------------------------

/// Interpret decrypted bytes as text, with plausibility checks.
///
/// For a decrypt of non-empty ciphertext:
/// - An output with no significant (non-zero) bytes almost always means
///   the key, IV, padding scheme, or input format was wrong, and
///   surfaces as [`CryptoError::Crypto`].
/// - Output containing non-printable / non-ASCII bytes surfaces as
///   [`CryptoError::NonAscii`], directing the caller to hex output.
///
/// # Errors
///
/// See above; well-formed printable ASCII is returned as a `String`.
pub fn render_plaintext(plaintext: &[u8]) -> Result<String, CryptoError> {
    if plaintext.iter().all(|b| *b == 0) {
        return Err(CryptoError::Crypto(
            "decryption produced no significant bytes — likely a wrong key, wrong IV, \
             mismatched padding scheme, or ciphertext in the wrong format"
                .to_owned(),
        ));
    }
    let printable = plaintext
        .iter()
        .all(|&b| (0x20..0x7F).contains(&b) || b == b'\r' || b == b'\n' || b == b'\t');
    if !printable {
        return Err(CryptoError::NonAscii);
    }
    String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::NonAscii)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
