//! Key assembly from components, component generation, DES parity.
//!
//! This module provides:
//! - [`AlgorithmProfile`] — validated (family, key length, component
//!   count) triple
//! - [`assemble`] — XOR N components into a final key and report its KCV
//! - [`generate_component`] — CSPRNG key component with its own KCV
//! - [`adjust_des_parity`] — byte-wise odd-parity correction
//!
//! # Split Knowledge
//!
//! Key ceremonies split a working key across 2–3 custodians, each
//! holding one full-length component. No custodian learns anything
//! about the final key from their component alone; the key exists only
//! at the moment of XOR assembly inside the secure device.

use crate::cipher::{BlockCipher, CipherFamily};
use crate::error::CryptoError;
use crate::hex;
use crate::kcv::kcv;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Key lengths accepted per family, in bytes.
const AES_KEY_LENGTHS: &[usize] = &[16, 24, 32];
/// TDES double (2-key) and triple (3-key) lengths, in bytes.
const TDES_KEY_LENGTHS: &[usize] = &[16, 24];

/// A validated key-assembly profile.
///
/// Invariants (enforced by [`AlgorithmProfile::new`]):
/// - component length = key length (components are full-length)
/// - AES keys are 16, 24, or 32 bytes
/// - TDES keys are 16 (double length) or 24 (triple length) bytes
/// - component count is 1, 2, or 3
// No Deserialize: profiles only come out of the validating constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AlgorithmProfile {
    family: CipherFamily,
    key_len: usize,
    component_count: usize,
}

impl AlgorithmProfile {
    /// Build a profile, validating the family/length/count invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidLength`] for a key length the
    /// family does not accept or a component count outside 1–3.
    pub fn new(
        family: CipherFamily,
        key_len: usize,
        component_count: usize,
    ) -> Result<Self, CryptoError> {
        let accepted = match family {
            CipherFamily::Aes => AES_KEY_LENGTHS,
            CipherFamily::Tdes => TDES_KEY_LENGTHS,
        };
        if !accepted.contains(&key_len) {
            return Err(CryptoError::InvalidLength(format!(
                "{family:?} working keys must be one of {accepted:?} bytes, got {key_len}"
            )));
        }
        if !(1..=3).contains(&component_count) {
            return Err(CryptoError::InvalidLength(format!(
                "component count must be 1, 2, or 3, got {component_count}"
            )));
        }
        Ok(Self {
            family,
            key_len,
            component_count,
        })
    }

    /// Cipher family of the assembled key (also its KCV family).
    #[must_use]
    pub const fn family(&self) -> CipherFamily {
        self.family
    }

    /// Final key length in bytes. Components are the same length.
    #[must_use]
    pub const fn key_len(&self) -> usize {
        self.key_len
    }

    /// Number of components the ceremony expects.
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.component_count
    }

    /// Component length in hex characters.
    #[must_use]
    pub const fn component_hex_len(&self) -> usize {
        // key_len is at most 32; doubling cannot overflow.
        self.key_len.saturating_mul(2)
    }
}

/// A generated key component: uppercase hex value plus its KCV.
#[must_use = "a generated component must be delivered to its custodian"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyComponent {
    /// Component value, uppercase hex, full key length.
    pub value: String,
    /// KCV of this component alone (6 uppercase hex chars).
    pub kcv: String,
}

/// The result of XOR-assembling components: final key plus its KCV.
#[must_use = "the assembled key must be loaded or discarded deliberately"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssembledKey {
    /// Final working key, uppercase hex.
    pub key: String,
    /// KCV of the final key (6 uppercase hex chars).
    pub kcv: String,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Assemble a working key from its components.
///
/// Validates the component count and per-component hex length against
/// the profile, XORs the components together (a single component passes
/// through unchanged), and computes the KCV of the final key under the
/// profile family.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidLength`] when the count or any
/// component length is wrong (the message names the failing component),
/// [`CryptoError::MalformedInput`] for non-hex components.
pub fn assemble<C: BlockCipher, S: AsRef<str>>(
    cipher: &C,
    profile: &AlgorithmProfile,
    components: &[S],
) -> Result<AssembledKey, CryptoError> {
    if components.len() != profile.component_count() {
        return Err(CryptoError::InvalidLength(format!(
            "expected {} component(s), got {}",
            profile.component_count(),
            components.len()
        )));
    }
    for (i, component) in components.iter().enumerate() {
        if component.as_ref().len() != profile.component_hex_len() {
            return Err(CryptoError::InvalidLength(format!(
                "component {} must be {} hex chars, got {}",
                i.saturating_add(1),
                profile.component_hex_len(),
                component.as_ref().len()
            )));
        }
    }

    let key = hex::xor(components)?;
    let check = kcv(cipher, &key, profile.family())?;
    tracing::debug!(
        family = ?profile.family(),
        components = components.len(),
        "assembled working key"
    );
    Ok(AssembledKey { key, kcv: check })
}

// ---------------------------------------------------------------------------
// Component generation
// ---------------------------------------------------------------------------

/// Generate one CSPRNG key component for the profile.
///
/// TDES components are odd-parity adjusted (every standards-conformant
/// DES key byte carries odd parity); AES components are raw random.
/// The component's own KCV is computed so each custodian can verify
/// entry at the receiving device.
///
/// # Errors
///
/// Returns [`CryptoError::Internal`] if the CSPRNG fails; KCV failures
/// propagate.
pub fn generate_component<C: BlockCipher>(
    cipher: &C,
    profile: &AlgorithmProfile,
) -> Result<KeyComponent, CryptoError> {
    generate_component_with_rng(cipher, profile, &mut OsRng)
}

/// [`generate_component`] with an injected RNG, for deterministic tests.
///
/// # Errors
///
/// As [`generate_component`].
pub fn generate_component_with_rng<C: BlockCipher, R: RngCore + CryptoRng>(
    cipher: &C,
    profile: &AlgorithmProfile,
    rng: &mut R,
) -> Result<KeyComponent, CryptoError> {
    let raw = hex::random_hex_with_rng(profile.key_len(), rng)?;
    let value = match profile.family() {
        CipherFamily::Tdes => adjust_des_parity(&raw)?,
        CipherFamily::Aes => raw,
    };
    let check = kcv(cipher, &value, profile.family())?;
    Ok(KeyComponent { value, kcv: check })
}

// ---------------------------------------------------------------------------
// DES parity
// ---------------------------------------------------------------------------

/// Force odd parity on every byte of a 16- or 24-byte DES key.
///
/// A byte with an even number of set bits has its least-significant
/// (parity) bit flipped. Hex strings of any other (valid, even) length
/// are returned unchanged, canonicalized to uppercase — parity is a DES
/// concept and does not apply to AES material.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] for non-hex input.
pub fn adjust_des_parity(key_hex: &str) -> Result<String, CryptoError> {
    let mut bytes = Zeroizing::new(hex::decode(key_hex)?);
    if bytes.len() == 16 || bytes.len() == 24 {
        for byte in bytes.iter_mut() {
            if byte.count_ones() % 2 == 0 {
                *byte ^= 1;
            }
        }
    }
    Ok(hex::encode_upper(&bytes))
}
