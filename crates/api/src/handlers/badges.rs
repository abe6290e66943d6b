//! Handlers for the public `/badges` resource.

use axum::extract::{Path, State};
use axum::Json;
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::models::badge::Badge;
use stride_db::repositories::BadgeRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSubject;
use crate::state::AppState;

/// GET /api/v1/badges
///
/// Active badge definitions, visible to any authenticated subject.
pub async fn list(
    State(state): State<AppState>,
    _subject: AuthSubject,
) -> AppResult<Json<Vec<Badge>>> {
    let badges = BadgeRepo::list_active(&state.pool).await?;
    Ok(Json(badges))
}

/// GET /api/v1/badges/{id}
pub async fn get(
    State(state): State<AppState>,
    _subject: AuthSubject,
    Path(id): Path<DbId>,
) -> AppResult<Json<Badge>> {
    let badge = BadgeRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|b| b.is_active)
        .ok_or(AppError::Core(CoreError::BadgeNotFound(id)))?;
    Ok(Json(badge))
}
