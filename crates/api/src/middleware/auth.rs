//! Authentication gate: the extractor every protected handler goes
//! through.
//!
//! The checks run in a strict order, each mapping to its own error
//! category so clients can tell the failure modes apart:
//!
//! 1. missing/malformed `Authorization` header -> `MISSING_CREDENTIAL`
//! 2. JWT signature/expiry -> `TOKEN_MALFORMED` / `TOKEN_EXPIRED`
//! 3. session-store lookup: absent row -> `SESSION_REVOKED`; a store
//!    error fails closed as `STORE_UNAVAILABLE` (a valid signature is
//!    never honored when revocation state cannot be consulted)
//! 4. disabled account -> `ACCOUNT_DISABLED`
//!
//! On success the session's expiry is extended in the background when it
//! is close to running out, so an actively used session does not lapse
//! mid-use.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stride_core::error::CoreError;
use stride_core::types::{DbId, SubjectKind};
use stride_db::repositories::SessionRepo;

use crate::auth::jwt::{self, TokenUse};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated subject extracted from a Bearer token.
///
/// ```ignore
/// async fn my_handler(subject: AuthSubject) -> AppResult<Json<()>> {
///     tracing::info!(user_id = subject.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSubject {
    /// The subject's internal database id.
    pub user_id: DbId,
    /// Subject kind from the session record (`user` / `admin`).
    pub kind: SubjectKind,
    /// Username snapshot from the session record.
    pub username: String,
    /// SHA-256 hex of the presented access token (for scoped logout).
    pub token_hash: String,
}

impl AuthSubject {
    /// Reject non-admin subjects. Used by the admin route handlers.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.kind != SubjectKind::Admin {
            return Err(AppError::Core(CoreError::Forbidden(
                "admin privileges required".into(),
            )));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthSubject {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingBearer)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::MissingBearer)?;

        let claims = jwt::validate_token(token, TokenUse::Access, &state.config.jwt)?;

        // Revocation is authoritative over the signature: a store error
        // fails closed rather than falling back to trusting the JWT.
        let token_hash = jwt::hash_token(token);
        let session = SessionRepo::get(&state.pool, &token_hash)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "session store lookup failed");
                AppError::Core(CoreError::StoreUnavailable(e.to_string()))
            })?
            .ok_or(AppError::Core(CoreError::SessionRevoked))?;

        // The stored record and the token must agree on the subject kind;
        // a mismatch means the row no longer belongs to this token.
        if session.subject_kind() != claims.kind {
            return Err(AppError::Core(CoreError::SessionRevoked));
        }

        if !session.is_active {
            return Err(AppError::Core(CoreError::AccountDisabled));
        }

        // Sliding extension: if the session is within the touch threshold
        // of expiring, push its expiry forward off the request path. Best
        // effort; a failure here never fails the request.
        let remaining = jwt::remaining_lifetime_secs(&claims);
        if remaining < state.config.session_touch_threshold_secs {
            let pool = state.pool.clone();
            let hash = token_hash.clone();
            let ttl = state.config.jwt.access_ttl_secs;
            tokio::spawn(async move {
                if let Err(e) = SessionRepo::touch(&pool, &hash, ttl).await {
                    tracing::warn!(error = %e, "session touch failed");
                }
            });
        }

        Ok(AuthSubject {
            user_id: claims.sub,
            kind: session.subject_kind(),
            username: session.username.clone(),
            token_hash,
        })
    }
}
