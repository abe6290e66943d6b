//! Handlers for the `/auth` resource (login, refresh, logout).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{self, TokenUse};
use crate::auth::password::{self, VerifyOutcome};
use crate::auth::session::{issue_session, IssuedTokens};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSubject;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SubjectInfo,
}

/// Public subject info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct SubjectInfo {
    pub id: DbId,
    pub username: String,
    pub kind: String,
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns access and refresh
/// tokens. Unknown username and wrong password are indistinguishable to
/// the caller.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. Reject empty credentials before touching the store. Same error
    //    as a failed verification, so nothing is leaked.
    if input.username.trim().is_empty() || input.password.is_empty() {
        return Err(AppError::Core(CoreError::InvalidCredential));
    }

    // 2. Find user by username.
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or(AppError::Core(CoreError::InvalidCredential))?;

    // 3. Verify the password against whichever scheme the row uses.
    let outcome = password::verify_password(&input.password, &user.password_hash, user.salt.as_deref());
    let needs_rehash = match outcome {
        VerifyOutcome::Valid { needs_rehash } => needs_rehash,
        VerifyOutcome::Invalid => return Err(AppError::Core(CoreError::InvalidCredential)),
    };

    // 4. Reject disabled accounts only after the credential check, so the
    //    response does not reveal whether a disabled account's password
    //    was guessed.
    if !user.is_active {
        return Err(AppError::Core(CoreError::AccountDisabled));
    }

    // 5. Transparently migrate legacy rows to the current scheme.
    if needs_rehash {
        let salt = password::generate_salt();
        let hash = password::hash_password(&input.password, &salt);
        UserRepo::rotate_credential(&state.pool, user.id, &hash, &salt).await?;
        tracing::info!(user_id = user.id, "Migrated legacy credential on login");
    }

    // 6. Record the login and issue the token pair.
    UserRepo::record_login(&state.pool, user.id).await?;

    let tokens = issue_session(
        &state.pool,
        &state.config.jwt,
        user.id,
        user.subject_kind(),
        &user.username,
    )
    .await?;

    Ok(Json(auth_response(tokens, user.id, user.username, user.kind, user.nickname)))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for a new token pair. The old session
/// is deleted first (rotation), so a replayed refresh token fails.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    // 1. The refresh token must be a valid JWT of refresh purpose.
    jwt::validate_token(&input.refresh_token, TokenUse::Refresh, &state.config.jwt)?;

    // 2. Find the live session it belongs to (generation fence applies).
    let refresh_hash = jwt::hash_token(&input.refresh_token);
    let session = SessionRepo::get_by_refresh(&state.pool, &refresh_hash)
        .await?
        .ok_or(AppError::Core(CoreError::SessionRevoked))?;

    if !session.is_active {
        return Err(AppError::Core(CoreError::AccountDisabled));
    }

    // 3. Rotate: remove the old session before issuing the new pair.
    SessionRepo::delete(&state.pool, &session.access_token_hash).await?;

    // 4. Re-read the user for the response payload.
    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::SessionRevoked))?;

    let tokens = issue_session(
        &state.pool,
        &state.config.jwt,
        user.id,
        user.subject_kind(),
        &user.username,
    )
    .await?;

    Ok(Json(auth_response(tokens, user.id, user.username, user.kind, user.nickname)))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presenting session only; other devices stay signed in.
/// Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, subject: AuthSubject) -> AppResult<StatusCode> {
    SessionRepo::delete(&state.pool, &subject.token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/logout-all
///
/// Revoke every session for the authenticated subject, including the
/// presenting one. Returns 204 No Content.
pub async fn logout_all(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> AppResult<StatusCode> {
    let generation = SessionRepo::revoke_all_for_subject(&state.pool, subject.user_id).await?;
    tracing::info!(user_id = subject.user_id, generation, "All sessions revoked");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn auth_response(
    tokens: IssuedTokens,
    id: DbId,
    username: String,
    kind: String,
    nickname: Option<String>,
) -> AuthResponse {
    AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user: SubjectInfo {
            id,
            username,
            kind,
            nickname,
        },
    }
}
