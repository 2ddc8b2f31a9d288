//! Error types for `caisson-crypto-core`.

use thiserror::Error;

/// Errors produced by the payment-cryptography operations.
///
/// Every failure surfaces to the caller; nothing is retried inside the
/// crate. Message payloads carry the offending value or length so that
/// terminal tooling can show an actionable diagnostic without matching
/// on message text.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Input that is not valid hexadecimal / decimal where required.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A key, PIN, PAN, KSN, BDK, PEK, component, or field length that
    /// violates the declared profile.
    #[error("invalid length: {0}")]
    InvalidLength(String),

    /// A required input is absent (e.g. ISO-4 without a PEK).
    #[error("missing required input: {0}")]
    MissingRequired(String),

    /// TR-31 structural mismatch — declared length vs. actual, optional
    /// block overrun, odd encrypted-key length.
    #[error("key block structure error: {0}")]
    Structure(String),

    /// Failure propagated from a cipher operation (unusable key, bad
    /// padding on decrypt, implausible plaintext).
    #[error("cipher operation failed: {0}")]
    Crypto(String),

    /// Decryption produced bytes that are not printable ASCII; the
    /// caller should request hex output instead of text.
    #[error("decrypted output is not printable ASCII; use hex output instead")]
    NonAscii,

    /// RSA key generation, import, or OAEP operation failure.
    #[error("RSA operation failed: {0}")]
    Rsa(String),

    /// PEM armor or DER document parsing failure.
    #[error("PEM parsing failed: {0}")]
    Pem(String),

    /// Unexpected provider failure. Should be rare.
    #[error("internal error: {0}")]
    Internal(String),
}
