//! Behavior record model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A behavior record row -- one logged activity session.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BehaviorRecord {
    pub id: DbId,
    pub user_id: DbId,
    pub activity: String,
    pub duration_minutes: i64,
    pub record_date: NaiveDate,
    pub created_at: Timestamp,
}

/// DTO for recording a behavior event.
#[derive(Debug, Deserialize)]
pub struct CreateBehaviorRecord {
    pub activity: String,
    pub duration_minutes: i64,
    /// Defaults to today when omitted.
    pub record_date: Option<NaiveDate>,
}
