//! Admin-only handlers: badge management, forced logout, re-evaluation.
//!
//! Every handler here calls [`AuthSubject::require_admin`] first; the
//! routes are also mounted under `/admin` so the privilege boundary is
//! visible in the URL space.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::models::badge::{Badge, CreateBadge, UpdateBadge};
use stride_db::repositories::{BadgeRepo, SessionRepo, UserRepo};
use stride_events::BehaviorEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSubject;
use crate::state::AppState;

/// POST /api/v1/admin/badges
pub async fn create_badge(
    State(state): State<AppState>,
    subject: AuthSubject,
    Json(input): Json<CreateBadge>,
) -> AppResult<(StatusCode, Json<Badge>)> {
    subject.require_admin()?;

    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "badge name must not be empty".into(),
        )));
    }
    if input.threshold <= 0 {
        return Err(AppError::Core(CoreError::Validation(
            "threshold must be positive".into(),
        )));
    }
    if input.reward_points < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "reward_points must be non-negative".into(),
        )));
    }

    // uq_badges_name maps a duplicate to 409 via error classification.
    let badge = BadgeRepo::create(&state.pool, &input).await?;
    tracing::info!(badge_id = badge.id, name = %badge.name, "Badge created");
    Ok((StatusCode::CREATED, Json(badge)))
}

/// GET /api/v1/admin/badges
///
/// All badges including inactive ones, unlike the public listing.
pub async fn list_badges(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> AppResult<Json<Vec<Badge>>> {
    subject.require_admin()?;
    let badges = BadgeRepo::list(&state.pool).await?;
    Ok(Json(badges))
}

/// PUT /api/v1/admin/badges/{id}
///
/// The condition kind is immutable after creation; changing what a badge
/// measures under existing progress rows would make them meaningless.
pub async fn update_badge(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBadge>,
) -> AppResult<Json<Badge>> {
    subject.require_admin()?;

    if input.threshold.is_some_and(|t| t <= 0) {
        return Err(AppError::Core(CoreError::Validation(
            "threshold must be positive".into(),
        )));
    }

    let badge = BadgeRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::BadgeNotFound(id)))?;
    Ok(Json(badge))
}

/// DELETE /api/v1/admin/badges/{id}
///
/// Refused once anyone holds progress against the badge; deactivate it
/// instead so granted achievements keep their referent.
pub async fn delete_badge(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    subject.require_admin()?;

    if BadgeRepo::is_held(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "badge has achievement progress; deactivate it instead".into(),
        )));
    }

    if !BadgeRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::BadgeNotFound(id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/force-logout
///
/// Revoke every session for the target subject. Returns 204 No Content.
pub async fn force_logout(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    subject.require_admin()?;

    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user_id,
        }))?;

    let generation = SessionRepo::revoke_all_for_subject(&state.pool, user_id).await?;
    tracing::info!(
        admin_id = subject.user_id,
        target_id = user_id,
        generation,
        "Forced logout"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/users/{id}/reevaluate
///
/// Queue a full re-evaluation for the target subject (e.g. after badge
/// definitions changed). Returns 202 Accepted; evaluation runs async.
pub async fn reevaluate(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(user_id): Path<DbId>,
) -> AppResult<StatusCode> {
    subject.require_admin()?;

    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "user",
            id: user_id,
        }))?;

    // Recorded (not Reevaluate) so every condition kind is re-checked,
    // not just the time-dependent ones.
    state.event_bus.publish(BehaviorEvent::Recorded {
        user_id,
        duration_minutes: 0,
        timestamp: chrono::Utc::now(),
    });
    Ok(StatusCode::ACCEPTED)
}
