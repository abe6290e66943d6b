//! Repository for the `behavior_records` table.
//!
//! The aggregate queries here are the engine's source of truth; progress
//! is always recomputed from them rather than from event deltas, which
//! keeps duplicate or reordered event delivery harmless.

use chrono::NaiveDate;
use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::behavior::{BehaviorRecord, CreateBehaviorRecord};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, activity, duration_minutes, record_date, created_at";

/// Provides writes and aggregate reads for behavior records.
pub struct BehaviorRepo;

impl BehaviorRepo {
    /// Insert a behavior record, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateBehaviorRecord,
    ) -> Result<BehaviorRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO behavior_records (user_id, activity, duration_minutes, record_date)
             VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BehaviorRecord>(&query)
            .bind(user_id)
            .bind(&input.activity)
            .bind(input.duration_minutes)
            .bind(input.record_date)
            .fetch_one(pool)
            .await
    }

    /// Total recorded minutes for a user.
    pub async fn total_duration_minutes(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(duration_minutes), 0)::BIGINT
             FROM behavior_records WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(total)
    }

    /// Number of behavior records for a user.
    pub async fn record_count(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM behavior_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Distinct dates with at least one record, most recent first.
    ///
    /// Bounded to the last `limit` days; streak computation never needs
    /// more history than the longest streak badge threshold.
    pub async fn active_days(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT DISTINCT record_date FROM behavior_records
             WHERE user_id = $1
             ORDER BY record_date DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(date,)| date).collect())
    }

    /// A user's records, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<BehaviorRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM behavior_records
             WHERE user_id = $1
             ORDER BY record_date DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, BehaviorRecord>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
