//! Per-(user, badge) achievement progress model.

use serde::Serialize;
use sqlx::FromRow;
use stride_core::types::{DbId, Timestamp};

/// A row from the `user_achievements` table.
///
/// `progress` is monotone non-decreasing; `achieved_at` is set exactly
/// once, after which the row is terminal (progress clamped at 100).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAchievement {
    pub user_id: DbId,
    pub badge_id: DbId,
    pub progress: i32,
    pub achieved_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

/// Achievement joined with its badge definition, for listing endpoints.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AchievementView {
    pub badge_id: DbId,
    pub badge_name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub reward_points: i64,
    pub progress: i32,
    pub achieved_at: Option<Timestamp>,
}
