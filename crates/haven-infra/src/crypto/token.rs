//! Bearer token generation.

use rand::RngCore;
use rand::rngs::OsRng;

use haven_core::auth::hash::TokenGenerator;

/// Prefix that makes Haven tokens recognizable in logs and secret scanners.
pub const TOKEN_PREFIX: &str = "hvn_";

/// Number of random bytes in a token.
const TOKEN_BYTES: usize = 32;

/// `hvn_` followed by 32 bytes from the OS RNG in hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRngTokenGenerator;

impl TokenGenerator for OsRngTokenGenerator {
    fn generate_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        format!("{TOKEN_PREFIX}{}", hex::encode(bytes))
    }
}
