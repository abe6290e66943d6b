//! Per-subject badge evaluation.

use chrono::Utc;
use stride_core::badge::{compute_progress, current_streak, ConditionKind};
use stride_core::error::CoreError;
use stride_core::types::DbId;
use stride_db::models::badge::Badge;
use stride_db::repositories::{AchievementRepo, BadgeRepo, BehaviorRepo};
use stride_db::DbPool;

/// How far back to fetch distinct active days for streak computation.
/// Anything past this bound cannot change a streak ending today.
const STREAK_LOOKBACK_DAYS: i64 = 400;

/// Outcome of evaluating one badge for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Already granted; nothing to do.
    AlreadyAchieved,
    /// This evaluation performed the grant (points credited once, here).
    Granted,
    /// Progress recorded below the threshold.
    Progressed(i32),
    /// The badge has an unknown condition kind and was skipped.
    Skipped,
}

/// Evaluates badges against a subject's recomputed metrics.
pub struct Evaluator {
    pool: DbPool,
}

impl Evaluator {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// React to a behavior write: evaluate every active badge.
    ///
    /// Badge failures are isolated; one bad badge never blocks the rest.
    pub async fn on_behavior_recorded(&self, user_id: DbId) -> Result<(), CoreError> {
        self.evaluate_matching(user_id, |_| true).await
    }

    /// Scheduled pass: only time-dependent conditions can change without
    /// a new behavior write, so only those are re-checked.
    pub async fn on_scheduled_reevaluation(&self, user_id: DbId) -> Result<(), CoreError> {
        self.evaluate_matching(user_id, ConditionKind::is_time_dependent)
            .await
    }

    async fn evaluate_matching(
        &self,
        user_id: DbId,
        filter: impl Fn(ConditionKind) -> bool,
    ) -> Result<(), CoreError> {
        let badges = BadgeRepo::list_active(&self.pool)
            .await
            .map_err(|e| CoreError::Internal(format!("badge list failed: {e}")))?;

        for badge in &badges {
            let Some(kind) = badge.condition() else {
                tracing::warn!(badge_id = badge.id, kind = %badge.condition_kind,
                    "Skipping badge with unknown condition kind");
                continue;
            };
            if !filter(kind) {
                continue;
            }
            match self.evaluate_badge(user_id, badge, kind).await {
                Ok(Evaluation::Granted) => {
                    tracing::info!(user_id, badge_id = badge.id, badge = %badge.name,
                        points = badge.reward_points, "Badge granted");
                }
                Ok(_) => {}
                Err(e) => {
                    // Isolation: log and move on to the next badge.
                    tracing::error!(user_id, badge_id = badge.id, error = %e,
                        "Badge evaluation failed");
                }
            }
        }
        Ok(())
    }

    /// Evaluate a single badge for a subject.
    pub async fn evaluate_badge(
        &self,
        user_id: DbId,
        badge: &Badge,
        kind: ConditionKind,
    ) -> Result<Evaluation, CoreError> {
        // Short-circuit: a granted achievement is terminal.
        let existing = AchievementRepo::find(&self.pool, user_id, badge.id)
            .await
            .map_err(store_err)?;
        if existing.is_some_and(|a| a.achieved_at.is_some()) {
            return Ok(Evaluation::AlreadyAchieved);
        }

        let metric = self.compute_metric(user_id, kind).await.map_err(store_err)?;
        let progress = compute_progress(metric, badge.threshold);

        if progress >= 100 {
            let granted = self.grant_with_retry(user_id, badge).await?;
            return Ok(if granted {
                Evaluation::Granted
            } else {
                Evaluation::AlreadyAchieved
            });
        }

        AchievementRepo::upsert_progress(&self.pool, user_id, badge.id, progress)
            .await
            .map_err(store_err)?;
        Ok(Evaluation::Progressed(progress))
    }

    /// Recompute the metric a condition kind measures, from aggregates.
    async fn compute_metric(&self, user_id: DbId, kind: ConditionKind) -> Result<i64, sqlx::Error> {
        match kind {
            ConditionKind::CumulativeDuration => {
                BehaviorRepo::total_duration_minutes(&self.pool, user_id).await
            }
            ConditionKind::RecordCount => BehaviorRepo::record_count(&self.pool, user_id).await,
            ConditionKind::StreakDays => {
                let days =
                    BehaviorRepo::active_days(&self.pool, user_id, STREAK_LOOKBACK_DAYS).await?;
                Ok(current_streak(&days, Utc::now().date_naive()))
            }
        }
    }

    /// Attempt the grant, retrying once on a transient store error. If the
    /// retry also fails the event counts as not yet applied; a later
    /// evaluation will recompute and land the same grant.
    async fn grant_with_retry(&self, user_id: DbId, badge: &Badge) -> Result<bool, CoreError> {
        match AchievementRepo::try_grant(&self.pool, user_id, badge.id, badge.reward_points).await {
            Ok(granted) => Ok(granted),
            Err(first) => {
                tracing::warn!(user_id, badge_id = badge.id, error = %first,
                    "Grant attempt failed, retrying once");
                AchievementRepo::try_grant(&self.pool, user_id, badge.id, badge.reward_points)
                    .await
                    .map_err(|_| CoreError::ProgressWriteConflict {
                        user_id,
                        badge_id: badge.id,
                    })
            }
        }
    }
}

fn store_err(e: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("achievement store error: {e}"))
}
