//! Credential hashing and verification.
//!
//! The current scheme is salted SHA-256: a random 16-byte salt (stored
//! base64) appended to the password before digesting, hex-encoded. Two
//! legacy schemes survive in old rows and are still verifiable:
//!
//! * plaintext (no salt stored) -- the stored value IS the password
//! * unsalted MD5 (no salt stored, 32 hex chars) -- `md5(password)`
//!
//! A successful login against a legacy row reports `needs_rehash` so the
//! caller can transparently migrate it to the current scheme. All
//! comparisons are constant-time.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use md5::Md5;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Salt length in bytes before base64 encoding.
const SALT_LEN: usize = 16;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;
/// Maximum accepted password length.
const MAX_PASSWORD_LEN: usize = 64;

/// Outcome of checking a supplied password against a stored credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Password matches; `needs_rehash` is true when the stored row uses
    /// a legacy scheme and should be upgraded.
    Valid { needs_rehash: bool },
    /// Password does not match.
    Invalid,
}

/// Generate a fresh random salt, base64-encoded for storage.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut bytes);
    BASE64.encode(bytes)
}

/// Hash a password with the current scheme: `hex(sha256(password || salt))`.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn md5_hex(password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn ct_eq(a: &str, b: &str) -> bool {
    // ct_eq on slices of unequal length short-circuits, but length is not
    // secret here; only the content comparison needs to be constant-time.
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verify a supplied password against a stored credential.
///
/// The scheme is detected from the stored row: a present salt means the
/// current salted SHA-256 scheme; absent salt with a 32-hex-char stored
/// value means legacy MD5; absent salt otherwise means legacy plaintext.
pub fn verify_password(password: &str, stored_hash: &str, salt: Option<&str>) -> VerifyOutcome {
    // An empty password must never authenticate, even against a legacy
    // plaintext row whose stored value is itself empty.
    if password.is_empty() || stored_hash.is_empty() {
        return VerifyOutcome::Invalid;
    }

    let (candidate, needs_rehash) = match salt {
        Some(salt) => (hash_password(password, salt), false),
        None if stored_hash.len() == 32 && stored_hash.bytes().all(|b| b.is_ascii_hexdigit()) => {
            (md5_hex(password), true)
        }
        None => (password.to_string(), true),
    };

    if ct_eq(&candidate, stored_hash) {
        VerifyOutcome::Valid { needs_rehash }
    } else {
        VerifyOutcome::Invalid
    }
}

/// Check password strength, returning a human-readable reason on failure.
///
/// Requires an upper-case letter, a lower-case letter, a digit, and a
/// character that is none of those.
pub fn check_strength(password: &str) -> Result<(), &'static str> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err("password must be at least 8 characters");
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err("password must be at most 64 characters");
    }
    let has_upper = password.chars().any(|c| c.is_uppercase());
    let has_lower = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());
    if !(has_upper && has_lower && has_digit && has_special) {
        return Err("password must mix upper and lower case, digits and a special character");
    }
    Ok(())
}
