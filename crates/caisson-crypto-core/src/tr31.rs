//! ASC X9 TR-31 key-block structural parsing.
//!
//! This module provides:
//! - [`parse`] — split a TR-31 ASCII key block into header, optional
//!   blocks, encrypted key, and authenticator
//! - [`Tr31KeyBlock`] / [`Tr31Header`] / [`Tr31OptionalBlock`]
//!
//! # Layout
//!
//! ```text
//! [R] Header (16) | Optional blocks | Encrypted key | Authenticator
//! ```
//!
//! Parsing is **structural only**: the MAC is never recomputed and the
//! encrypted key is never unwrapped — that is the receiving SCD's job.
//! An optional leading `R` is a transport marker some hosts prepend;
//! it is stripped and reported.
//!
//! # Robustness
//!
//! Headers in the wild sometimes declare more optional blocks than they
//! carry. When the next 4 chars do not look like a block header
//! (`[A-Z0-9]{2}` id + 2 decimal digits), the optional-block loop stops
//! early and the remainder is treated as key + authenticator.

use crate::error::CryptoError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed header length in ASCII characters.
pub const HEADER_LEN: usize = 16;

/// Offsets into the fixed header.
const OFFSET_LENGTH: std::ops::Range<usize> = 1..5;
const OFFSET_USAGE: std::ops::Range<usize> = 5..7;
const OFFSET_ALGORITHM: usize = 7;
const OFFSET_MODE: usize = 8;
const OFFSET_KEY_VERSION: std::ops::Range<usize> = 9..11;
const OFFSET_EXPORTABILITY: usize = 11;
const OFFSET_BLOCK_COUNT: std::ops::Range<usize> = 12..14;
const OFFSET_RESERVED: std::ops::Range<usize> = 14..16;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The fixed 16-character TR-31 header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tr31Header {
    /// Key-block version ID (offset 0): `A`, `B`, `C`, `D`, …
    pub version_id: char,
    /// Declared total block length (offsets 1–4, decimal). Always equals
    /// the actual length after whitespace/marker stripping.
    pub declared_length: usize,
    /// Key usage (offsets 5–6), e.g. `B1`, `P0`, `K0`.
    pub key_usage: String,
    /// Algorithm (offset 7), e.g. `T` (TDEA), `A` (AES).
    pub algorithm: char,
    /// Mode of use (offset 8), e.g. `X`, `E`, `B`.
    pub mode_of_use: char,
    /// Key version number (offsets 9–10).
    pub key_version: String,
    /// Exportability (offset 11).
    pub exportability: char,
    /// Declared number of optional blocks (offsets 12–13, decimal).
    pub optional_block_count: usize,
    /// Reserved (offsets 14–15).
    pub reserved: String,
}

/// One optional block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tr31OptionalBlock {
    /// Two-character block ID, `[A-Z0-9]{2}`.
    pub id: String,
    /// Declared payload length in **bytes**, from a 2-digit decimal
    /// field. The payload is hex, so it occupies `2 × length_bytes`
    /// ASCII characters.
    pub length_bytes: usize,
    /// Raw payload characters, exactly as they appeared.
    pub value: String,
}

/// A structurally parsed TR-31 key block.
#[must_use = "a parsed key block should be inspected or forwarded"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tr31KeyBlock {
    /// The fixed header.
    pub header: Tr31Header,
    /// Optional blocks, in order of appearance. May be shorter than the
    /// header-declared count (see module robustness note).
    pub optional_blocks: Vec<Tr31OptionalBlock>,
    /// The wrapped key material. Even-length; may be empty for
    /// metadata-only blocks.
    pub encrypted_key: String,
    /// The trailing MAC. 64 chars for version `D`, 32 for version `C`
    /// over AES, 16 otherwise.
    pub authenticator: String,
    /// `true` if a leading `R`/`r` transport marker was stripped.
    pub transport_marker: bool,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a TR-31 key block.
///
/// ASCII whitespace anywhere in the input is stripped before parsing —
/// hosts habitually wrap key blocks across lines.
///
/// # Errors
///
/// - [`CryptoError::MalformedInput`] — non-ASCII input, non-decimal
///   length or count fields
/// - [`CryptoError::Structure`] — truncated header, declared length ≠
///   actual, optional block running past the end, remainder shorter
///   than the authenticator, odd encrypted-key length
pub fn parse(input: &str) -> Result<Tr31KeyBlock, CryptoError> {
    let cleaned: String = input.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if !cleaned.is_ascii() {
        return Err(CryptoError::MalformedInput(
            "key block must be ASCII".to_owned(),
        ));
    }

    let (body, transport_marker) = match cleaned.strip_prefix(['R', 'r']) {
        Some(rest) => (rest, true),
        None => (cleaned.as_str(), false),
    };

    let header = parse_header(body)?;
    if header.declared_length != body.len() {
        return Err(CryptoError::Structure(format!(
            "declared length {} does not match actual length {}",
            header.declared_length,
            body.len()
        )));
    }

    let (optional_blocks, cursor) = parse_optional_blocks(body, header.optional_block_count)?;

    let authenticator_len = authenticator_chars(header.version_id, header.algorithm);
    let remainder = &body[cursor..];
    if remainder.len() < authenticator_len {
        return Err(CryptoError::Structure(format!(
            "remainder of {} chars cannot hold a {}-char authenticator",
            remainder.len(),
            authenticator_len
        )));
    }
    let key_end = remainder.len().saturating_sub(authenticator_len);
    let encrypted_key = &remainder[..key_end];
    let authenticator = &remainder[key_end..];

    if encrypted_key.len() % 2 != 0 {
        return Err(CryptoError::Structure(format!(
            "encrypted key length {} is odd — not whole hex bytes",
            encrypted_key.len()
        )));
    }

    tracing::debug!(
        version = %header.version_id,
        optional_blocks = optional_blocks.len(),
        key_chars = encrypted_key.len(),
        "parsed TR-31 key block"
    );

    Ok(Tr31KeyBlock {
        header,
        optional_blocks,
        encrypted_key: encrypted_key.to_owned(),
        authenticator: authenticator.to_owned(),
        transport_marker,
    })
}

fn parse_header(body: &str) -> Result<Tr31Header, CryptoError> {
    if body.len() < HEADER_LEN {
        return Err(CryptoError::Structure(format!(
            "header truncated: {} chars, need {HEADER_LEN}",
            body.len()
        )));
    }

    let declared_length = parse_decimal(&body[OFFSET_LENGTH], "declared block length")?;
    let optional_block_count = parse_decimal(&body[OFFSET_BLOCK_COUNT], "optional block count")?;

    Ok(Tr31Header {
        version_id: char_at(body, 0),
        declared_length,
        key_usage: body[OFFSET_USAGE].to_owned(),
        algorithm: char_at(body, OFFSET_ALGORITHM),
        mode_of_use: char_at(body, OFFSET_MODE),
        key_version: body[OFFSET_KEY_VERSION].to_owned(),
        exportability: char_at(body, OFFSET_EXPORTABILITY),
        optional_block_count,
        reserved: body[OFFSET_RESERVED].to_owned(),
    })
}

/// Walk up to `declared` optional blocks starting after the header.
/// Returns the blocks and the cursor position where the key begins.
fn parse_optional_blocks(
    body: &str,
    declared: usize,
) -> Result<(Vec<Tr31OptionalBlock>, usize), CryptoError> {
    let mut blocks = Vec::with_capacity(declared);
    let mut cursor = HEADER_LEN;

    for _ in 0..declared {
        let Some(block_header) = body.get(cursor..cursor.saturating_add(4)) else {
            // Fewer blocks than declared; the rest is key + authenticator.
            break;
        };
        let id = &block_header[..2];
        let len_field = &block_header[2..4];
        if !id.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
            break;
        }
        if !len_field.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        let length_bytes = parse_decimal(len_field, "optional block length")?;

        let value_start = cursor.saturating_add(4);
        let value_end = value_start.saturating_add(length_bytes.saturating_mul(2));
        let Some(value) = body.get(value_start..value_end) else {
            return Err(CryptoError::Structure(format!(
                "optional block {id} declares {length_bytes} bytes but runs past the end of the block"
            )));
        };

        blocks.push(Tr31OptionalBlock {
            id: id.to_owned(),
            length_bytes,
            value: value.to_owned(),
        });
        cursor = value_end;
    }

    Ok((blocks, cursor))
}

/// Authenticator length in ASCII characters, by version and algorithm.
///
/// - `D` — HMAC-SHA-256, 32 bytes → 64 chars
/// - `C` — CMAC: 16 bytes for AES (`A`), 8 for TDEA → 32 / 16 chars
/// - anything else (including `A`, `B`) — TDEA MAC, 8 bytes → 16 chars
const fn authenticator_chars(version: char, algorithm: char) -> usize {
    match version {
        'D' => 64,
        'C' => {
            if algorithm == 'A' {
                32
            } else {
                16
            }
        }
        _ => 16,
    }
}

fn parse_decimal(field: &str, what: &str) -> Result<usize, CryptoError> {
    if !field.chars().all(|c| c.is_ascii_digit()) {
        return Err(CryptoError::MalformedInput(format!(
            "{what} field {field:?} is not decimal"
        )));
    }
    field
        .parse()
        .map_err(|e| CryptoError::MalformedInput(format!("{what} field {field:?}: {e}")))
}

/// Byte-indexed char access; caller has verified the string is ASCII
/// and long enough.
fn char_at(s: &str, index: usize) -> char {
    s.as_bytes()[index] as char
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
