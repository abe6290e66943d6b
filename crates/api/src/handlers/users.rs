//! Handlers for the authenticated subject's own resources
//! (`/users/me/...`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stride_core::error::CoreError;
use stride_db::models::achievement::AchievementView;
use stride_db::models::user::UserResponse;
use stride_db::repositories::{AchievementRepo, SessionRepo, UserRepo};

use crate::auth::password::{self, VerifyOutcome};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSubject;
use crate::state::AppState;

/// Request body for `PUT /users/me/password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Response body for `GET /users/me/points`.
#[derive(Debug, Serialize)]
pub struct PointsResponse {
    pub reward_points: i64,
}

/// GET /api/v1/users/me
pub async fn me(State(state): State<AppState>, subject: AuthSubject) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, subject.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: subject.user_id,
        }))?;
    Ok(Json(user.into()))
}

/// PUT /api/v1/users/me/password
///
/// Change the password. Requires the current password, enforces the
/// strength policy, and revokes every session afterwards -- the caller
/// must log in again with the new credential. Returns 204 No Content.
pub async fn change_password(
    State(state): State<AppState>,
    subject: AuthSubject,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let user = UserRepo::find_by_id(&state.pool, subject.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: subject.user_id,
        }))?;

    let outcome =
        password::verify_password(&input.current_password, &user.password_hash, user.salt.as_deref());
    if outcome == VerifyOutcome::Invalid {
        return Err(AppError::Core(CoreError::InvalidCredential));
    }

    password::check_strength(&input.new_password)
        .map_err(|reason| AppError::Core(CoreError::Validation(reason.into())))?;

    let salt = password::generate_salt();
    let hash = password::hash_password(&input.new_password, &salt);
    UserRepo::rotate_credential(&state.pool, user.id, &hash, &salt).await?;

    // A credential change invalidates everything issued under the old one.
    SessionRepo::revoke_all_for_subject(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Password changed, all sessions revoked");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/me/achievements
pub async fn my_achievements(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> AppResult<Json<Vec<AchievementView>>> {
    let achievements = AchievementRepo::list_for_user(&state.pool, subject.user_id).await?;
    Ok(Json(achievements))
}

/// GET /api/v1/users/me/achievements/recent
///
/// Most recently achieved badges, for profile widgets.
pub async fn recent_achievements(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> AppResult<Json<Vec<AchievementView>>> {
    let achievements = AchievementRepo::recently_achieved(&state.pool, subject.user_id, 5).await?;
    Ok(Json(achievements))
}

/// GET /api/v1/users/me/points
pub async fn my_points(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> AppResult<Json<PointsResponse>> {
    let reward_points = UserRepo::points(&state.pool, subject.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: subject.user_id,
        }))?;
    Ok(Json(PointsResponse { reward_points }))
}
