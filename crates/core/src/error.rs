//! Domain error taxonomy.
//!
//! Authentication failures deliberately collapse to [`CoreError::InvalidCredential`]
//! at the credential boundary so callers cannot distinguish an unknown
//! username from a wrong password. Token-state categories (malformed,
//! expired, revoked) are only surfaced past that boundary, where they are
//! no longer a guessing surface.

use crate::types::DbId;

/// Domain-level errors shared across the workspace.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Username/password pair did not authenticate. Intentionally vague.
    #[error("Invalid username or password")]
    InvalidCredential,

    /// The bearer token could not be parsed or its signature is wrong.
    #[error("Token is malformed or has an invalid signature")]
    TokenMalformed,

    /// The bearer token's embedded expiry has passed.
    #[error("Token has expired")]
    TokenExpired,

    /// The token is cryptographically valid but its session is gone
    /// (logged out, rotated, or revoked behind the generation fence).
    #[error("Session is invalid or has been revoked")]
    SessionRevoked,

    /// The subject's account is disabled; rejected even with a live session.
    #[error("Account is disabled")]
    AccountDisabled,

    /// The subject is authenticated but lacks the privilege required.
    #[error("{0}")]
    Forbidden(String),

    /// The session store could not be reached. Always fail closed.
    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    /// Referenced badge does not exist or is inactive.
    #[error("Badge {0} not found")]
    BadgeNotFound(DbId),

    /// A progress compare-and-set lost its race and the internal retry
    /// also failed. The event is considered not yet applied.
    #[error("Achievement progress write conflict for user {user_id}, badge {badge_id}")]
    ProgressWriteConflict { user_id: DbId, badge_id: DbId },

    /// An entity lookup by id found nothing.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// Request payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// The operation conflicts with existing state (e.g. duplicate name).
    #[error("{0}")]
    Conflict(String),

    /// Anything unexpected. Message is logged, not shown to clients.
    #[error("{0}")]
    Internal(String),
}
