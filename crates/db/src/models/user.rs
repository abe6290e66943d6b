//! User entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use stride_core::types::{DbId, SubjectKind, Timestamp};

/// Full user row from the `users` table.
///
/// Contains the password hash and salt -- NEVER serialize this to API
/// responses directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub password_hash: String,
    /// `None` for legacy plaintext rows; such accounts are rehashed on
    /// their next successful login.
    pub salt: Option<String>,
    /// `"user"` or `"admin"`.
    pub kind: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub reward_points: i64,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Parse the stored kind column.
    ///
    /// Rows only ever hold values accepted by the `ck_users_kind` check
    /// constraint; anything else means the row predates it and is treated
    /// as a plain user.
    pub fn subject_kind(&self) -> SubjectKind {
        SubjectKind::parse(&self.kind).unwrap_or(SubjectKind::User)
    }
}

/// Safe user representation for API responses (no credential material).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub kind: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub reward_points: i64,
    pub last_login_at: Option<Timestamp>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            kind: user.kind,
            nickname: user.nickname,
            email: user.email,
            reward_points: user.reward_points,
            last_login_at: user.last_login_at,
        }
    }
}

/// DTO for creating a new user.
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub salt: Option<String>,
    pub kind: SubjectKind,
    pub nickname: Option<String>,
    pub email: Option<String>,
}
