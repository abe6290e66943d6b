//! Repository for the `badges` table.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::badge::{Badge, CreateBadge, UpdateBadge};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, icon_url, condition_kind, threshold, \
                        reward_points, is_active, created_at, updated_at";

/// Provides CRUD operations for badge definitions.
pub struct BadgeRepo;

impl BadgeRepo {
    /// Insert a new badge definition, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBadge) -> Result<Badge, sqlx::Error> {
        let query = format!(
            "INSERT INTO badges (name, description, icon_url, condition_kind, threshold, reward_points)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Badge>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.icon_url)
            .bind(input.condition_kind.as_str())
            .bind(input.threshold)
            .bind(input.reward_points)
            .fetch_one(pool)
            .await
    }

    /// Find a badge by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Badge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM badges WHERE id = $1");
        sqlx::query_as::<_, Badge>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all badge definitions, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Badge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM badges ORDER BY created_at DESC");
        sqlx::query_as::<_, Badge>(&query).fetch_all(pool).await
    }

    /// List active badges the achievement engine should evaluate.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Badge>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM badges WHERE is_active = true");
        sqlx::query_as::<_, Badge>(&query).fetch_all(pool).await
    }

    /// Update a badge. Only non-`None` fields in `input` are applied.
    ///
    /// The condition kind is immutable after creation -- changing it would
    /// silently reinterpret every holder's existing progress.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBadge,
    ) -> Result<Option<Badge>, sqlx::Error> {
        let query = format!(
            "UPDATE badges SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                icon_url = COALESCE($4, icon_url),
                threshold = COALESCE($5, threshold),
                reward_points = COALESCE($6, reward_points),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Badge>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.icon_url)
            .bind(input.threshold)
            .bind(input.reward_points)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Whether any user holds (has any progress row for) this badge.
    ///
    /// Referential guard: a held badge must never be deleted.
    pub async fn is_held(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM user_achievements WHERE badge_id = $1 LIMIT 1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.is_some())
    }

    /// Delete an unheld badge. Returns `true` if a row was removed.
    ///
    /// Callers must check [`is_held`](Self::is_held) first; the FK from
    /// `user_achievements` backstops a racing grant.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM badges WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
