#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

//! Known-answer tests against the published standards vectors.

mod dukpt;
mod kcv_and_assembly;
mod luhn;
mod pin_block;
mod tr31;
