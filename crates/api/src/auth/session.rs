//! Token-pair issuance and session registration.
//!
//! Login and refresh share this path: mint an access/refresh JWT pair,
//! then register the pair in the session store so the auth gate will
//! honor it. Registration captures the subject's current revocation
//! generation, which is what makes a later revoke-all stick.

use chrono::{Duration, Utc};
use serde::Serialize;
use stride_db::models::session::CreateSession;
use stride_db::repositories::SessionRepo;
use stride_db::DbPool;

use crate::auth::jwt::{self, JwtConfig, TokenUse};
use crate::error::AppResult;
use stride_core::types::{DbId, SubjectKind};

/// A freshly issued token pair, as returned to clients.
#[derive(Debug, Serialize)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Mint a token pair for the subject and register it as a session.
pub async fn issue_session(
    pool: &DbPool,
    config: &JwtConfig,
    user_id: DbId,
    kind: SubjectKind,
    username: &str,
) -> AppResult<IssuedTokens> {
    let access_token = jwt::generate_token(user_id, kind, TokenUse::Access, config)
        .map_err(|e| crate::error::AppError::InternalError(format!("token generation failed: {e}")))?;
    let refresh_token = jwt::generate_token(user_id, kind, TokenUse::Refresh, config)
        .map_err(|e| crate::error::AppError::InternalError(format!("token generation failed: {e}")))?;

    let now = Utc::now();
    let session = CreateSession {
        access_token_hash: jwt::hash_token(&access_token),
        user_id,
        kind,
        username: username.to_string(),
        refresh_token_hash: jwt::hash_token(&refresh_token),
        expires_at: now + Duration::seconds(config.access_ttl_secs),
        refresh_expires_at: now + Duration::seconds(config.refresh_ttl_secs),
    };
    SessionRepo::put(pool, &session).await?;

    Ok(IssuedTokens {
        access_token,
        refresh_token,
        expires_in: config.access_ttl_secs,
    })
}
