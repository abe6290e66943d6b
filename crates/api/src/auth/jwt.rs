//! JWT access/refresh token generation and validation.
//!
//! Both token kinds are HS256-signed compact JWTs carrying a [`Claims`]
//! payload; a `typ` claim keeps them single-purpose (a refresh token is
//! never accepted as a bearer credential and vice versa). Minting a
//! valid signature and holding an honored session are separate concerns:
//! issuance never touches the session store.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stride_core::error::CoreError;
use stride_core::types::{DbId, SubjectKind};
use uuid::Uuid;

/// Signing-key material length in bytes (HS256 wants >= 256 bits).
const KEY_LEN: usize = 32;

/// Default access token expiry in seconds (24 hours).
const DEFAULT_ACCESS_TTL_SECS: i64 = 24 * 60 * 60;
/// Default refresh token expiry in seconds (30 days).
const DEFAULT_REFRESH_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// What a token is allowed to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user's internal database id.
    pub sub: DbId,
    /// Subject kind (`user` / `admin`); must match the session record.
    pub kind: SubjectKind,
    /// Token purpose (`access` / `refresh`).
    pub typ: TokenUse,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4), for audit trails.
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Normalized 32-byte HMAC-SHA256 key. See [`normalize_secret`].
    secret: Vec<u8>,
    /// Access token lifetime in seconds (default: 24h).
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds (default: 30 days).
    pub refresh_ttl_secs: i64,
}

/// Normalize arbitrary secret material to exactly 32 bytes.
///
/// Shorter secrets are right-padded with ASCII `'0'`, longer ones are
/// truncated. This matches the key schedule of prior deployments, so the
/// exact rule is load-bearing for interoperability: two processes given
/// the same configured secret string must derive the same key.
fn normalize_secret(secret: &str) -> Vec<u8> {
    let mut key = secret.as_bytes().to_vec();
    key.resize(KEY_LEN, b'0');
    key
}

impl JwtConfig {
    /// Build a config from raw parts (used by tests and `from_env`).
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            secret: normalize_secret(secret),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default   |
    /// |--------------------------|----------|-----------|
    /// | `JWT_SECRET`             | **yes**  | --        |
    /// | `ACCESS_TOKEN_TTL_SECS`  | no       | `86400`   |
    /// | `REFRESH_TOKEN_TTL_SECS` | no       | `2592000` |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_ttl_secs: i64 = std::env::var("ACCESS_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_TTL_SECS.to_string())
            .parse()
            .expect("ACCESS_TOKEN_TTL_SECS must be a valid i64");

        let refresh_ttl_secs: i64 = std::env::var("REFRESH_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_TTL_SECS.to_string())
            .parse()
            .expect("REFRESH_TOKEN_TTL_SECS must be a valid i64");

        Self::new(&secret, access_ttl_secs, refresh_ttl_secs)
    }

    fn ttl_for(&self, usage: TokenUse) -> i64 {
        match usage {
            TokenUse::Access => self.access_ttl_secs,
            TokenUse::Refresh => self.refresh_ttl_secs,
        }
    }
}

/// Generate a signed token for the given subject.
pub fn generate_token(
    user_id: DbId,
    kind: SubjectKind,
    usage: TokenUse,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        kind,
        typ: usage,
        exp: now + config.ttl_for(usage),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(&config.secret),
    )
}

/// Validate signature + expiry and check the token's purpose.
///
/// Distinguishes expired from malformed so the gate can report the right
/// category; a purpose mismatch (refresh presented as bearer) is
/// malformed, not expired.
pub fn validate_token(
    token: &str,
    expected_use: TokenUse,
    config: &JwtConfig,
) -> Result<Claims, CoreError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(&config.secret),
        &Validation::default(), // HS256, validates exp
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => CoreError::TokenExpired,
        _ => CoreError::TokenMalformed,
    })?;

    if token_data.claims.typ != expected_use {
        return Err(CoreError::TokenMalformed);
    }
    Ok(token_data.claims)
}

/// Seconds until the claim set expires (negative if already past).
pub fn remaining_lifetime_secs(claims: &Claims) -> i64 {
    claims.exp - chrono::Utc::now().timestamp()
}

/// Compute the SHA-256 hex digest of a raw token.
///
/// Only the digest is ever stored in the session store, so a database
/// leak does not expose live bearer credentials.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    /// Helper to build a test config with a known secret.
    fn test_config() -> JwtConfig {
        JwtConfig::new("test-secret-for-token-units", 3600, 86400)
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let config = test_config();
        let token = generate_token(42, SubjectKind::Admin, TokenUse::Access, &config)
            .expect("token generation should succeed");

        let claims = validate_token(&token, TokenUse::Access, &config)
            .expect("token validation should succeed");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.kind, SubjectKind::Admin);
        assert!(claims.exp > claims.iat);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_refresh_token_rejected_as_bearer() {
        let config = test_config();
        let refresh = generate_token(1, SubjectKind::User, TokenUse::Refresh, &config)
            .expect("token generation should succeed");

        let result = validate_token(&refresh, TokenUse::Access, &config);
        assert_matches!(result, Err(CoreError::TokenMalformed));
        // But it validates under its own purpose.
        assert!(validate_token(&refresh, TokenUse::Refresh, &config).is_ok());
    }

    #[test]
    fn test_expired_token_reports_expired() {
        let config = test_config();

        // Manually create an already-expired token.
        // Use a margin well beyond the default 60-second leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            kind: SubjectKind::User,
            typ: TokenUse::Access,
            exp: now - 300,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&config.secret),
        )
        .expect("encoding should succeed");

        let result = validate_token(&token, TokenUse::Access, &config);
        assert_matches!(result, Err(CoreError::TokenExpired));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let config = test_config();
        let result = validate_token("not.a.jwt", TokenUse::Access, &config);
        assert_matches!(result, Err(CoreError::TokenMalformed));
    }

    #[test]
    fn test_secret_normalization_pads_and_truncates() {
        // A short secret is padded with '0'; spelling the padded form out
        // explicitly must yield an interoperable key.
        let short = JwtConfig::new("shortsecret", 3600, 86400);
        let padded = JwtConfig::new("shortsecret000000000000000000000", 3600, 86400);
        let token = generate_token(5, SubjectKind::User, TokenUse::Access, &short).unwrap();
        assert!(validate_token(&token, TokenUse::Access, &padded).is_ok());

        // Anything past 32 bytes is ignored.
        let base = "exactly-thirty-two-bytes-of-key!";
        assert_eq!(base.len(), 32);
        let a = JwtConfig::new(base, 3600, 86400);
        let b = JwtConfig::new(&format!("{base}-with-extra-tail"), 3600, 86400);
        let token = generate_token(5, SubjectKind::User, TokenUse::Access, &a).unwrap();
        assert!(validate_token(&token, TokenUse::Access, &b).is_ok());
    }

    #[test]
    fn test_different_secrets_fail() {
        let config_a = JwtConfig::new("secret-alpha", 3600, 86400);
        let config_b = JwtConfig::new("secret-bravo", 3600, 86400);

        let token = generate_token(1, SubjectKind::User, TokenUse::Access, &config_a)
            .expect("token generation should succeed");

        let result = validate_token(&token, TokenUse::Access, &config_b);
        assert!(
            result.is_err(),
            "token signed with a different secret must fail"
        );
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("some-raw-token");
        assert_eq!(hash, hash_token("some-raw-token"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token("some-raw-token2"));
    }
}
