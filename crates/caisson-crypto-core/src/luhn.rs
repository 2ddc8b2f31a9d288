//! Luhn (mod-10) check-digit arithmetic.
//!
//! PANs carry a trailing Luhn check digit. [`check_digit`] computes the
//! digit to append to a base number; [`validate`] verifies a complete
//! number. Both walk the digits from the right, doubling every other
//! digit and subtracting 9 when a doubled digit exceeds 9 — the only
//! difference is which position the doubling starts at.

use crate::error::CryptoError;

/// Compute the Luhn check digit for `base`.
///
/// The digit returned is the one to **append**: doubling starts at the
/// rightmost digit of `base` (the position adjacent to the future check
/// digit). An empty base is accepted and yields `0`.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] if `base` contains anything
/// but decimal digits.
pub fn check_digit(base: &str) -> Result<u8, CryptoError> {
    let sum = luhn_sum(base, true)?;
    // Remainders are < 10, so the subtraction cannot underflow.
    #[allow(clippy::arithmetic_side_effects)]
    let digit = ((10 - sum % 10) % 10) as u8;
    Ok(digit)
}

/// Validate a complete Luhn number (base + check digit).
///
/// Doubling starts `false` at the rightmost digit — the check digit
/// itself is never doubled.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedInput`] for non-digit input.
pub fn validate(number: &str) -> Result<bool, CryptoError> {
    let sum = luhn_sum(number, false)?;
    // Divisor is a non-zero literal.
    #[allow(clippy::arithmetic_side_effects)]
    let valid = sum % 10 == 0;
    Ok(valid)
}

/// Sum digits right-to-left with alternating doubling.
fn luhn_sum(digits: &str, mut double: bool) -> Result<u32, CryptoError> {
    let mut sum: u32 = 0;
    for c in digits.chars().rev() {
        let d = c.to_digit(10).ok_or_else(|| {
            CryptoError::MalformedInput(format!("non-digit {c:?} in Luhn input"))
        })?;
        // d <= 9, so the doubled value is at most 18 and the fold stays
        // far below u32::MAX for any practical input length.
        #[allow(clippy::arithmetic_side_effects)]
        let contribution = if double {
            let doubled = d * 2;
            if doubled > 9 {
                doubled - 9
            } else {
                doubled
            }
        } else {
            d
        };
        sum = sum.saturating_add(contribution);
        double = !double;
    }
    Ok(sum)
}
