//! Zeroizing containers for key material.
//!
//! This module provides:
//! - [`SecretBytes`] — variable-length key container, zeroized on drop,
//!   masked in `Debug`
//!
//! Keys cross this crate's boundary as hex strings, but while a key is
//! held as raw bytes it lives in a [`SecretBytes`] so that dropping any
//! intermediate wipes it. Page-locking (`mlock`) is deliberately left
//! to the embedding application: this is host-side tooling, not a
//! long-lived vault process.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use zeroize::Zeroize;

/// Variable-length container for sensitive bytes (keys, PIN fields).
///
/// Wraps [`SecretSlice<u8>`] from the `secrecy` crate and adds:
/// - Masked `Debug` output (`SecretBytes(***)`)
/// - Constant-time equality for check-value comparisons
/// - Uppercase hex export for the crate's string boundary
pub struct SecretBytes {
    inner: SecretSlice<u8>,
}

impl SecretBytes {
    /// Create a new `SecretBytes` by copying `data`.
    ///
    /// The caller should zeroize the source after calling this.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self {
            inner: data.to_vec().into(),
        }
    }

    /// Create a `SecretBytes` filled with `len` CSPRNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Internal`] if the OS CSPRNG fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Internal(format!("CSPRNG fill failed: {e}")))?;
        let result = Self::new(&bytes);
        bytes.zeroize();
        Ok(result)
    }

    /// Borrow the protected bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Length of the protected bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// `true` if the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Render as uppercase hex.
    ///
    /// The returned `String` is an ordinary allocation; callers that
    /// treat the hex form as sensitive should wrap it in
    /// [`zeroize::Zeroizing`].
    #[must_use]
    pub fn to_hex_upper(&self) -> String {
        hex::encode_upper(self.expose())
    }

    /// Constant-time equality against `other`.
    ///
    /// The length comparison short-circuits; lengths of check values
    /// and keys are public information — only the contents are secret.
    #[must_use]
    pub fn ct_eq(&self, other: &[u8]) -> bool {
        let a = self.expose();
        if a.len() != other.len() {
            return false;
        }
        let mut diff = 0u8;
        for (x, y) in a.iter().zip(other.iter()) {
            diff |= x ^ y;
        }
        diff == 0
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBytes(***)")
    }
}

impl From<Vec<u8>> for SecretBytes {
    /// Take ownership of `bytes`; the vector is moved into the secret
    /// container and zeroized when the container drops.
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            inner: bytes.into(),
        }
    }
}
