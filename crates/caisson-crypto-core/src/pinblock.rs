//! ISO 9564-1 PIN block construction and recovery.
//!
//! This module provides:
//! - [`encode`] — build the clear PIN block for Format 0, 3, or 4 and
//!   encrypt it when a PEK is supplied
//! - [`recover_pin`] — decrypt an encrypted block and extract the PIN
//! - [`extract_pin`] — read the PIN back out of a clear Format 0/3 block
//!
//! Formats 0 and 3 are 8-byte blocks built by XORing a PIN field with a
//! PAN field and encrypted under TDES. Format 4 is a 16-byte AES block
//! using the Encrypt-XOR-Encrypt construction: the PAN is bound by
//! XORing its field into the *encrypted* PIN field before the second
//! encryption pass.

use crate::cipher::{BlockCipher, CipherFamily, Padding};
use crate::error::CryptoError;
use crate::hex;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// ISO 9564-1 PIN block format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinBlockFormat {
    /// Format 0 — TDES, `F` filler, PAN-bound by XOR.
    Iso0,
    /// Format 3 — TDES, random filler, PAN-bound by XOR.
    Iso3,
    /// Format 4 — AES Encrypt-XOR-Encrypt, `A` filler + random tail.
    Iso4,
}

/// A constructed PIN block: the clear artifact and, when a PEK was
/// available, the encrypted block.
///
/// For Formats 0/3 `clear` is the 16-nibble XOR result; for Format 4 it
/// is the 32-nibble plaintext PIN field (the PAN binding happens inside
/// the encryption passes, so there is no meaningful clear XOR result).
#[must_use = "a PIN block is built to be transported"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PinBlock {
    /// The format this block was built for.
    pub format: PinBlockFormat,
    /// Clear artifact, uppercase hex.
    pub clear: String,
    /// Encrypted block, uppercase hex. `None` when no PEK was supplied
    /// (Formats 0/3 only — Format 4 always encrypts).
    pub encrypted: Option<String>,
}

/// PIN length bounds (digits).
const PIN_MIN: usize = 4;
const PIN_MAX: usize = 12;

/// PAN length bounds for Formats 0/3. The lower bound is 13, not 12:
/// the PAN field takes the 12 digits immediately preceding the check
/// digit, which does not exist for a 12-digit PAN.
const PAN_MIN_XOR: usize = 13;
/// PAN length bounds for Format 4, which left-pads short PANs.
const PAN_MIN_AES: usize = 1;
const PAN_MAX: usize = 19;

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build a PIN block, encrypting it when a PEK is supplied.
///
/// - `pin` — 4–12 decimal digits.
/// - `pan` — 13–19 digits for Formats 0/3; 1–19 digits for Format 4.
/// - `pek` — hex key. Optional for Formats 0/3 (TDES, 16/24 bytes);
///   required for Format 4 (AES, 16/24/32 bytes).
///
/// Randomness (Format 3 filler, Format 4 tail nibbles) comes from the
/// OS CSPRNG.
///
/// # Errors
///
/// `MalformedInput` for non-digit PIN/PAN or non-hex PEK;
/// `InvalidLength` for out-of-range PIN, PAN, or PEK lengths;
/// `MissingRequired` for Format 4 without a PEK.
pub fn encode<C: BlockCipher>(
    cipher: &C,
    format: PinBlockFormat,
    pin: &str,
    pan: &str,
    pek: Option<&str>,
) -> Result<PinBlock, CryptoError> {
    encode_with_rng(cipher, format, pin, pan, pek, &mut OsRng)
}

/// [`encode`] with an injected RNG, for deterministic tests.
///
/// # Errors
///
/// As [`encode`].
pub fn encode_with_rng<C: BlockCipher, R: RngCore + CryptoRng>(
    cipher: &C,
    format: PinBlockFormat,
    pin: &str,
    pan: &str,
    pek: Option<&str>,
    rng: &mut R,
) -> Result<PinBlock, CryptoError> {
    check_digits(pin, "PIN")?;
    if !(PIN_MIN..=PIN_MAX).contains(&pin.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "PIN must be {PIN_MIN}-{PIN_MAX} digits, got {}",
            pin.len()
        )));
    }
    check_digits(pan, "PAN")?;

    tracing::debug!(?format, pin_len = pin.len(), pan_len = pan.len(), "building PIN block");

    match format {
        PinBlockFormat::Iso0 | PinBlockFormat::Iso3 => {
            encode_xor_format(cipher, format, pin, pan, pek, rng)
        }
        PinBlockFormat::Iso4 => encode_aes_format(cipher, pin, pan, pek, rng),
    }
}

/// Formats 0 and 3: 16-nibble PIN field XOR 16-nibble PAN field.
fn encode_xor_format<C: BlockCipher, R: RngCore + CryptoRng>(
    cipher: &C,
    format: PinBlockFormat,
    pin: &str,
    pan: &str,
    pek: Option<&str>,
    rng: &mut R,
) -> Result<PinBlock, CryptoError> {
    if !(PAN_MIN_XOR..=PAN_MAX).contains(&pan.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "PAN must be {PAN_MIN_XOR}-{PAN_MAX} digits for this format, got {}",
            pan.len()
        )));
    }

    let filler_len = 14usize.saturating_sub(pin.len());
    let (control, filler) = match format {
        PinBlockFormat::Iso0 => ('0', "F".repeat(filler_len)),
        PinBlockFormat::Iso3 => ('3', random_nibbles(filler_len, rng)?),
        PinBlockFormat::Iso4 => unreachable!("dispatched in encode_with_rng"),
    };

    let pin_field = format!("{control}{:X}{pin}{filler}", pin.len());
    let pan_field = pan_field_xor(pan);
    let clear = hex::xor(&[pin_field.as_str(), pan_field.as_str()])?;

    let encrypted = match pek {
        Some(pek_hex) => {
            let pek_bytes = decode_pek(pek_hex, CipherFamily::Tdes, &[16, 24])?;
            let block = hex::decode(&clear)?;
            let ct = cipher.encrypt_ecb(CipherFamily::Tdes, pek_bytes.expose(), &block, Padding::None)?;
            Some(hex::encode_upper(&ct))
        }
        None => None,
    };

    Ok(PinBlock {
        format,
        clear,
        encrypted,
    })
}

/// Format 4: AES Encrypt-XOR-Encrypt over 16-byte fields.
fn encode_aes_format<C: BlockCipher, R: RngCore + CryptoRng>(
    cipher: &C,
    pin: &str,
    pan: &str,
    pek: Option<&str>,
    rng: &mut R,
) -> Result<PinBlock, CryptoError> {
    if !(PAN_MIN_AES..=PAN_MAX).contains(&pan.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "PAN must be {PAN_MIN_AES}-{PAN_MAX} digits for format 4, got {}",
            pan.len()
        )));
    }
    let pek_hex = pek.ok_or_else(|| {
        CryptoError::MissingRequired("format 4 always encrypts; supply an AES PEK".to_owned())
    })?;
    let pek_bytes = decode_pek(pek_hex, CipherFamily::Aes, &[16, 24, 32])?;

    // Block A: control + length + PIN + 'A' filler to 16 nibbles + 16
    // random nibbles.
    let filler_len = 14usize.saturating_sub(pin.len());
    let pin_field = format!(
        "4{:X}{pin}{}{}",
        pin.len(),
        "A".repeat(filler_len),
        random_nibbles(16, rng)?
    );

    let pan_field = pan_field_aes(pan);

    let a = hex::decode(&pin_field)?;
    let b = hex::decode(&pan_field)?;
    let e1 = cipher.encrypt_ecb(CipherFamily::Aes, pek_bytes.expose(), &a, Padding::None)?;
    let x = Zeroizing::new(hex::xor_bytes(&b, &e1));
    let e2 = cipher.encrypt_ecb(CipherFamily::Aes, pek_bytes.expose(), &x, Padding::None)?;

    Ok(PinBlock {
        format: PinBlockFormat::Iso4,
        clear: pin_field,
        encrypted: Some(hex::encode_upper(&e2)),
    })
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Decrypt an encrypted PIN block and extract the PIN.
///
/// The inverse of [`encode`] for all three formats. For Formats 0/3 the
/// block is TDES-decrypted and handed to [`extract_pin`]; for Format 4
/// both AES passes are undone (Decrypt-XOR-Decrypt) before reading the
/// PIN field.
///
/// # Errors
///
/// Propagates cipher failures; returns [`CryptoError::Structure`] when
/// the decrypted block's control nibble or PIN length nibble does not
/// match the format — the usual sign of a wrong key or wrong PAN.
pub fn recover_pin<C: BlockCipher>(
    cipher: &C,
    format: PinBlockFormat,
    encrypted_hex: &str,
    pan: &str,
    pek: &str,
) -> Result<String, CryptoError> {
    check_digits(pan, "PAN")?;
    let block = hex::decode(encrypted_hex)?;

    match format {
        PinBlockFormat::Iso0 | PinBlockFormat::Iso3 => {
            let pek_bytes = decode_pek(pek, CipherFamily::Tdes, &[16, 24])?;
            let clear = Zeroizing::new(cipher.decrypt_ecb(
                CipherFamily::Tdes,
                pek_bytes.expose(),
                &block,
                Padding::None,
            )?);
            extract_pin(format, &hex::encode_upper(&clear), pan)
        }
        PinBlockFormat::Iso4 => {
            let pek_bytes = decode_pek(pek, CipherFamily::Aes, &[16, 24, 32])?;
            let x = Zeroizing::new(cipher.decrypt_ecb(
                CipherFamily::Aes,
                pek_bytes.expose(),
                &block,
                Padding::None,
            )?);
            let pan_field = hex::decode(&pan_field_aes(pan))?;
            if x.len() != pan_field.len() {
                return Err(CryptoError::InvalidLength(format!(
                    "format 4 block must be 16 bytes, got {}",
                    x.len()
                )));
            }
            let e1 = Zeroizing::new(hex::xor_bytes(&x, &pan_field));
            let pin_field = Zeroizing::new(cipher.decrypt_ecb(
                CipherFamily::Aes,
                pek_bytes.expose(),
                &e1,
                Padding::None,
            )?);
            read_pin_field(&hex::encode_upper(&pin_field), '4')
        }
    }
}

/// Extract the PIN from a **clear** Format 0/3 block.
///
/// XORs the PAN field back out and reads the control nibble, length
/// nibble, and PIN digits.
///
/// # Errors
///
/// [`CryptoError::Structure`] for a control nibble that does not match
/// the format or an implausible PIN length; `MalformedInput`/
/// `InvalidLength` for bad hex or PAN.
pub fn extract_pin(
    format: PinBlockFormat,
    clear_hex: &str,
    pan: &str,
) -> Result<String, CryptoError> {
    let control = match format {
        PinBlockFormat::Iso0 => '0',
        PinBlockFormat::Iso3 => '3',
        PinBlockFormat::Iso4 => {
            return Err(CryptoError::Structure(
                "format 4 has no clear XOR block; use recover_pin".to_owned(),
            ));
        }
    };
    check_digits(pan, "PAN")?;
    if !(PAN_MIN_XOR..=PAN_MAX).contains(&pan.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "PAN must be {PAN_MIN_XOR}-{PAN_MAX} digits, got {}",
            pan.len()
        )));
    }
    let pin_field = hex::xor(&[clear_hex, pan_field_xor(pan).as_str()])?;
    read_pin_field(&pin_field, control)
}

/// Read control nibble, length nibble, and digits out of a PIN field.
fn read_pin_field(pin_field: &str, control: char) -> Result<String, CryptoError> {
    let mut nibbles = pin_field.chars();
    let got_control = nibbles.next().ok_or_else(|| {
        CryptoError::Structure("PIN field is empty".to_owned())
    })?;
    if got_control != control {
        return Err(CryptoError::Structure(format!(
            "control nibble {got_control:?} does not match expected {control:?} — wrong key, PAN, or format"
        )));
    }
    let len_nibble = nibbles.next().ok_or_else(|| {
        CryptoError::Structure("PIN field has no length nibble".to_owned())
    })?;
    let pin_len = len_nibble
        .to_digit(16)
        .ok_or_else(|| CryptoError::Structure("PIN length nibble is not hex".to_owned()))?
        as usize;
    if !(PIN_MIN..=PIN_MAX).contains(&pin_len) {
        return Err(CryptoError::Structure(format!(
            "recovered PIN length {pin_len} is outside {PIN_MIN}-{PIN_MAX} — wrong key, PAN, or format"
        )));
    }
    let pin: String = nibbles.take(pin_len).collect();
    if pin.len() != pin_len || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(CryptoError::Structure(
            "recovered PIN digits are not decimal — wrong key, PAN, or format".to_owned(),
        ));
    }
    Ok(pin)
}

// ---------------------------------------------------------------------------
// Field builders
// ---------------------------------------------------------------------------

/// PAN field for Formats 0/3: `0000` + the 12 digits immediately
/// preceding the check digit. For a 13-digit PAN this is its first 12
/// digits. Caller has validated `pan.len() >= 13`.
fn pan_field_xor(pan: &str) -> String {
    let end = pan.len().saturating_sub(1);
    let start = end.saturating_sub(12);
    format!("0000{}", &pan[start..end])
}

/// PAN field for Format 4: length marker + zero-padded PAN + `0` fill
/// to 32 nibbles. The marker nibble is `len(PAN) - 12` after padding
/// the PAN to at least 12 digits.
fn pan_field_aes(pan: &str) -> String {
    let padded = if pan.len() < 12 {
        format!("{:0>12}", pan)
    } else {
        pan.to_owned()
    };
    let m = padded.len().saturating_sub(12);
    let fill = 31usize.saturating_sub(padded.len());
    format!("{m:X}{padded}{}", "0".repeat(fill))
}

/// `count` CSPRNG nibbles as uppercase hex characters.
fn random_nibbles<R: RngCore + CryptoRng>(
    count: usize,
    rng: &mut R,
) -> Result<String, CryptoError> {
    // One byte yields two nibbles; round up and truncate.
    let bytes = count.saturating_add(1).saturating_div(2);
    let mut hex_str = hex::random_hex_with_rng(bytes, rng)?;
    hex_str.truncate(count);
    Ok(hex_str)
}

fn check_digits(value: &str, what: &str) -> Result<(), CryptoError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(CryptoError::MalformedInput(format!(
            "{what} must be decimal digits"
        )));
    }
    Ok(())
}

fn decode_pek(
    pek_hex: &str,
    family: CipherFamily,
    accepted: &[usize],
) -> Result<crate::memory::SecretBytes, CryptoError> {
    let pek = hex::decode_secret(pek_hex)?;
    if !accepted.contains(&pek.len()) {
        return Err(CryptoError::InvalidLength(format!(
            "{family:?} PEK must be one of {accepted:?} bytes, got {}",
            pek.len()
        )));
    }
    Ok(pek)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
