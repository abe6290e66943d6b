//! Repository for the session store (`sessions` + `session_generations`).
//!
//! Revocation is authoritative over signature expiry: the auth gate only
//! honors a token whose row is present, unexpired, and whose captured
//! generation matches the subject's current generation. `revoke_all`
//! bumps the generation first (the logical fence) and deletes rows as
//! best-effort cleanup, so a `put` that was in flight during the revoke
//! lands with a stale generation and is never honored.

use sqlx::PgPool;
use stride_core::types::DbId;

use crate::models::session::{CreateSession, Session};

/// Column list shared by the lookup queries; `is_active` is the live
/// flag joined from `users`, not a snapshot.
const COLUMNS: &str = "s.access_token_hash, s.user_id, s.kind, s.username, u.is_active, \
                        s.generation, s.refresh_token_hash, s.expires_at, s.refresh_expires_at, \
                        s.created_at";

/// Provides the session-store operations.
pub struct SessionRepo;

impl SessionRepo {
    /// Register a session for a freshly issued token pair.
    ///
    /// Captures the subject's current generation in the same statement.
    /// Token values are unique by construction; a colliding hash is
    /// treated as a replace.
    pub async fn put(pool: &PgPool, input: &CreateSession) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO sessions
                (access_token_hash, user_id, kind, username,
                 generation, refresh_token_hash, expires_at, refresh_expires_at)
             VALUES ($1, $2, $3, $4,
                     COALESCE((SELECT generation FROM session_generations WHERE user_id = $2), 0),
                     $5, $6, $7)
             ON CONFLICT (access_token_hash) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                kind = EXCLUDED.kind,
                username = EXCLUDED.username,
                generation = EXCLUDED.generation,
                refresh_token_hash = EXCLUDED.refresh_token_hash,
                expires_at = EXCLUDED.expires_at,
                refresh_expires_at = EXCLUDED.refresh_expires_at",
        )
        .bind(&input.access_token_hash)
        .bind(input.user_id)
        .bind(input.kind.as_str())
        .bind(&input.username)
        .bind(&input.refresh_token_hash)
        .bind(input.expires_at)
        .bind(input.refresh_expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Look up a live session by access-token hash.
    ///
    /// Absent when the row is missing, expired, or fenced off by a newer
    /// generation -- all three are indistinguishable to the caller.
    pub async fn get(pool: &PgPool, token_hash: &str) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.access_token_hash = $1
               AND s.expires_at > NOW()
               AND s.generation = COALESCE(
                   (SELECT generation FROM session_generations g WHERE g.user_id = s.user_id), 0)"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Look up a live session by refresh-token hash (subject to the same
    /// generation fence, but against the refresh expiry window).
    pub async fn get_by_refresh(
        pool: &PgPool,
        refresh_hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.refresh_token_hash = $1
               AND s.refresh_expires_at > NOW()
               AND s.generation = COALESCE(
                   (SELECT generation FROM session_generations g WHERE g.user_id = s.user_id), 0)"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(refresh_hash)
            .fetch_optional(pool)
            .await
    }

    /// Extend a session nearing expiry without reissuing tokens.
    ///
    /// Returns `true` if a row was extended. Only ever moves the expiry
    /// forward.
    pub async fn touch(
        pool: &PgPool,
        token_hash: &str,
        ttl_seconds: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions
             SET expires_at = GREATEST(expires_at, NOW() + ($2 * INTERVAL '1 second'))
             WHERE access_token_hash = $1 AND expires_at > NOW()",
        )
        .bind(token_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a single session (scoped logout). Idempotent.
    pub async fn delete(pool: &PgPool, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE access_token_hash = $1")
            .bind(token_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every session for a subject.
    ///
    /// The upsert-increment is the authoritative fence; the delete that
    /// follows is cleanup and may miss rows without weakening the guard.
    /// Returns the new generation.
    pub async fn revoke_all_for_subject(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let (generation,): (i64,) = sqlx::query_as(
            "INSERT INTO session_generations (user_id, generation)
             VALUES ($1, 1)
             ON CONFLICT (user_id)
             DO UPDATE SET generation = session_generations.generation + 1, updated_at = NOW()
             RETURNING generation",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(generation)
    }

    /// Delete rows no longer reachable (expired past their refresh window
    /// or fenced off). Intended for a periodic sweeper.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sessions s
             WHERE s.refresh_expires_at < NOW()
                OR s.generation < COALESCE(
                    (SELECT generation FROM session_generations g WHERE g.user_id = s.user_id), 0)",
        )
        .execute(pool)
        .await?;
        if result.rows_affected() > 0 {
            tracing::debug!(rows = result.rows_affected(), "Swept dead session rows");
        }
        Ok(result.rows_affected())
    }
}
