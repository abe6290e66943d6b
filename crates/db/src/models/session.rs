//! Session store row and DTOs.

use sqlx::FromRow;
use stride_core::types::{DbId, SubjectKind, Timestamp};

/// A session row from the `sessions` table.
///
/// A row exists iff its access token is currently honored by the auth
/// gate; the signed token alone cannot be revoked early.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub access_token_hash: String,
    pub user_id: DbId,
    pub kind: String,
    pub username: String,
    /// Live account flag, joined from `users` at lookup time.
    pub is_active: bool,
    pub generation: i64,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
    pub created_at: Timestamp,
}

impl Session {
    pub fn subject_kind(&self) -> SubjectKind {
        SubjectKind::parse(&self.kind).unwrap_or(SubjectKind::User)
    }
}

/// DTO for registering a session after token issuance.
pub struct CreateSession {
    pub access_token_hash: String,
    pub user_id: DbId,
    pub kind: SubjectKind,
    pub username: String,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub refresh_expires_at: Timestamp,
}
