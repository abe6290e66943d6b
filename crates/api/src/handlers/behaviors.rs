//! Handlers for the `/behaviors` resource.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stride_core::error::CoreError;
use stride_db::models::behavior::{BehaviorRecord, CreateBehaviorRecord};
use stride_db::repositories::BehaviorRepo;
use stride_events::BehaviorEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthSubject;
use crate::state::AppState;

/// Query parameters for `GET /behaviors`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum rows to return (default 50, capped at 200).
    pub limit: Option<i64>,
}

/// POST /api/v1/behaviors
///
/// Record a behavior for the authenticated subject and notify the
/// achievement engine. The write is acknowledged even if evaluation has
/// not yet run; progress catches up asynchronously.
pub async fn create(
    State(state): State<AppState>,
    subject: AuthSubject,
    Json(input): Json<CreateBehaviorRecord>,
) -> AppResult<(StatusCode, Json<BehaviorRecord>)> {
    if input.activity.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "activity must not be empty".into(),
        )));
    }
    if input.duration_minutes < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "duration_minutes must be non-negative".into(),
        )));
    }

    let record = BehaviorRepo::create(&state.pool, subject.user_id, &input).await?;

    state.event_bus.publish(BehaviorEvent::Recorded {
        user_id: subject.user_id,
        duration_minutes: record.duration_minutes,
        timestamp: chrono::Utc::now(),
    });

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/behaviors
///
/// The authenticated subject's own records, newest first.
pub async fn list(
    State(state): State<AppState>,
    subject: AuthSubject,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<BehaviorRecord>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let records = BehaviorRepo::list_for_user(&state.pool, subject.user_id, limit).await?;
    Ok(Json(records))
}
