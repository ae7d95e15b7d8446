//! PBKDF2-HMAC-SHA256 password hashing.
//!
//! Stored format: `{iterations}${salt_hex}${hash_hex}`.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{AuthErrorKind, DispatchError};

const ITERATIONS: u32 = 60_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, DispatchError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt).map_err(|_| DispatchError::Auth {
        kind: AuthErrorKind::PasswordHash {
            message: "Failed to generate salt".to_string(),
        },
    })?;

    let iterations = NonZeroU32::new(ITERATIONS).ok_or_else(|| DispatchError::Auth {
        kind: AuthErrorKind::PasswordHash {
            message: "Iteration count must be non-zero".to_string(),
        },
    })?;

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &mut hash,
    );

    Ok(format!(
        "{}${}${}",
        ITERATIONS,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(iterations), Some(salt), Some(hash)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (hex::decode(salt), hex::decode(hash)) else {
        return false;
    };

    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let stored = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &stored));
        assert!(!verify_password("wrong-pass", &stored));
    }

    #[test]
    fn test_salts_differ() {
        let first = hash_password("same").unwrap();
        let second = hash_password("same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_rejected() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "abc"));
        assert!(!verify_password("x", "0$00$00"));
        assert!(!verify_password("x", "100$zz$zz"));
    }
}
