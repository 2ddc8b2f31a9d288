//! Luhn check-digit known answers.

use caisson_crypto_core::{luhn_check_digit, luhn_validate};

struct LuhnVector {
    base: &'static str,
    digit: u8,
}

const VECTORS: [LuhnVector; 4] = [
    LuhnVector {
        base: "7992739871",
        digit: 3,
    },
    LuhnVector {
        base: "411111111111111",
        digit: 1,
    },
    LuhnVector {
        base: "401288888888188",
        digit: 1,
    },
    LuhnVector {
        base: "510510510510510",
        digit: 0,
    },
];

#[test]
fn published_check_digits() {
    for vector in &VECTORS {
        let digit = luhn_check_digit(vector.base).expect("digits");
        assert_eq!(
            digit, vector.digit,
            "check digit mismatch for base {}",
            vector.base
        );
    }
}

#[test]
fn completed_numbers_validate() {
    for vector in &VECTORS {
        let full = format!("{}{}", vector.base, vector.digit);
        assert!(luhn_validate(&full).expect("digits"), "{full} should validate");
    }
}

#[test]
fn off_by_one_check_digits_fail() {
    for vector in &VECTORS {
        let wrong = (vector.digit + 1) % 10;
        let full = format!("{}{}", vector.base, wrong);
        assert!(!luhn_validate(&full).expect("digits"), "{full} should not validate");
    }
}
