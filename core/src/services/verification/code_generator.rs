//! One-time code generation.

use rand::{rngs::OsRng, Rng};

use crate::domain::entities::verification_code::CODE_LENGTH;

const CODE_SPACE: u32 = 1_000_000;

/// Generate a 6-digit, zero-padded verification code
///
/// Draws from the operating system CSPRNG with range sampling, so every value
/// in 000000..=999999 is equally likely.
pub fn generate_verification_code() -> String {
    let value = OsRng.gen_range(0..CODE_SPACE);
    format!("{:0width$}", value, width = CODE_LENGTH)
}
