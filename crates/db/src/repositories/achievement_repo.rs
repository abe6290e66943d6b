//! Repository for the `user_achievements` table.
//!
//! Writes preserve two invariants at the SQL level so they hold across
//! concurrent workers and process instances:
//!
//! - progress is monotone non-decreasing (`GREATEST` on upsert);
//! - `achieved_at` transitions unset -> set at most once (conditional
//!   `UPDATE ... WHERE achieved_at IS NULL`), and reward points are
//!   credited in the same transaction as that transition.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::achievement::{AchievementView, UserAchievement};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, badge_id, progress, achieved_at, updated_at";

/// Provides progress and grant operations for user achievements.
pub struct AchievementRepo;

impl AchievementRepo {
    /// Fetch one (user, badge) progress row.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        badge_id: DbId,
    ) -> Result<Option<UserAchievement>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM user_achievements WHERE user_id = $1 AND badge_id = $2");
        sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(badge_id)
            .fetch_optional(pool)
            .await
    }

    /// Record progress below the threshold.
    ///
    /// Lazily creates the row; never lowers progress; never touches a row
    /// that has already been granted.
    pub async fn upsert_progress(
        pool: &PgPool,
        user_id: DbId,
        badge_id: DbId,
        progress: i32,
    ) -> Result<UserAchievement, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_achievements (user_id, badge_id, progress)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, badge_id) DO UPDATE SET
                progress = GREATEST(user_achievements.progress, EXCLUDED.progress),
                updated_at = NOW()
             WHERE user_achievements.achieved_at IS NULL
             RETURNING {COLUMNS}"
        );
        match sqlx::query_as::<_, UserAchievement>(&query)
            .bind(user_id)
            .bind(badge_id)
            .bind(progress)
            .fetch_optional(pool)
            .await?
        {
            Some(row) => Ok(row),
            // The conditional upsert returns nothing when the row is
            // already granted; re-read the terminal row instead.
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM user_achievements WHERE user_id = $1 AND badge_id = $2"
                );
                sqlx::query_as::<_, UserAchievement>(&query)
                    .bind(user_id)
                    .bind(badge_id)
                    .fetch_one(pool)
                    .await
            }
        }
    }

    /// Attempt the at-most-once grant transition for a completed badge.
    ///
    /// In one transaction: set `progress = 100` and `achieved_at = NOW()`
    /// iff `achieved_at` is still unset, and credit `reward_points` to
    /// the user's additive total. Returns `true` when this call performed
    /// the grant, `false` when another evaluation already had.
    pub async fn try_grant(
        pool: &PgPool,
        user_id: DbId,
        badge_id: DbId,
        reward_points: i64,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Ensure the row exists (first qualifying event may jump straight
        // to 100); the insert is a no-op if it is already there.
        sqlx::query(
            "INSERT INTO user_achievements (user_id, badge_id, progress)
             VALUES ($1, $2, 0)
             ON CONFLICT (user_id, badge_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "UPDATE user_achievements
             SET progress = 100, achieved_at = NOW(), updated_at = NOW()
             WHERE user_id = $1 AND badge_id = $2 AND achieved_at IS NULL",
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&mut *tx)
        .await?;

        let granted = result.rows_affected() > 0;
        if granted {
            sqlx::query(
                "UPDATE users SET reward_points = reward_points + $2, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(reward_points)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(granted)
    }

    /// List a user's achievements joined with badge definitions,
    /// achieved first, then by progress.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AchievementView>, sqlx::Error> {
        sqlx::query_as::<_, AchievementView>(
            "SELECT b.id AS badge_id, b.name AS badge_name, b.description, b.icon_url,
                    b.reward_points, a.progress, a.achieved_at
             FROM user_achievements a
             JOIN badges b ON b.id = a.badge_id
             WHERE a.user_id = $1
             ORDER BY a.achieved_at DESC NULLS LAST, a.progress DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Most recently achieved badges, for profile widgets.
    pub async fn recently_achieved(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<AchievementView>, sqlx::Error> {
        sqlx::query_as::<_, AchievementView>(
            "SELECT b.id AS badge_id, b.name AS badge_name, b.description, b.icon_url,
                    b.reward_points, a.progress, a.achieved_at
             FROM user_achievements a
             JOIN badges b ON b.id = a.badge_id
             WHERE a.user_id = $1 AND a.achieved_at IS NOT NULL
             ORDER BY a.achieved_at DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
