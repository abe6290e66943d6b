//! Badge condition kinds and progress math.
//!
//! All functions here are pure; the achievement engine recomputes metrics
//! from behavior aggregates and feeds them through [`compute_progress`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a badge's threshold is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// Total minutes of recorded activity.
    CumulativeDuration,
    /// Number of behavior records.
    RecordCount,
    /// Consecutive days with at least one record, ending today.
    StreakDays,
}

impl ConditionKind {
    /// Database/text representation.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionKind::CumulativeDuration => "cumulative_duration",
            ConditionKind::RecordCount => "record_count",
            ConditionKind::StreakDays => "streak_days",
        }
    }

    /// Parse the database/text representation. Unknown values are `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cumulative_duration" => Some(ConditionKind::CumulativeDuration),
            "record_count" => Some(ConditionKind::RecordCount),
            "streak_days" => Some(ConditionKind::StreakDays),
            _ => None,
        }
    }

    /// Whether this kind depends on elapsed time and therefore needs
    /// scheduled re-evaluation, not just behavior-write events.
    pub fn is_time_dependent(self) -> bool {
        matches!(self, ConditionKind::StreakDays)
    }
}

/// Compute completion percentage: `clamp(0, 100, floor(100 * metric / threshold))`.
///
/// A non-positive threshold yields 100 for any positive metric (a badge
/// anyone qualifies for) and 0 otherwise, so a misconfigured definition
/// never divides by zero.
pub fn compute_progress(metric: i64, threshold: i64) -> i32 {
    if threshold <= 0 {
        return if metric > 0 { 100 } else { 0 };
    }
    let metric = metric.max(0);
    let pct = metric.saturating_mul(100) / threshold;
    pct.min(100) as i32
}

/// Length of the consecutive-day run ending at `today`.
///
/// `active_days` is the set of distinct dates with at least one behavior
/// record, in any order. A run that ended yesterday still counts (the
/// subject has until midnight to extend it); a gap before yesterday ends
/// the streak.
pub fn current_streak(active_days: &[NaiveDate], today: NaiveDate) -> i64 {
    let mut days: Vec<NaiveDate> = active_days.to_vec();
    days.sort_unstable();
    days.dedup();

    let mut cursor = if days.last() == Some(&today) {
        today
    } else if days.last() == Some(&(today - chrono::Days::new(1))) {
        today - chrono::Days::new(1)
    } else {
        return 0;
    };

    let mut streak = 0i64;
    for day in days.iter().rev() {
        if *day == cursor {
            streak += 1;
            cursor = cursor - chrono::Days::new(1);
        } else {
            break;
        }
    }
    streak
}
