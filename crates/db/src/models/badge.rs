//! Badge definition model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stride_core::badge::ConditionKind;
use stride_core::types::{DbId, Timestamp};

/// A badge definition row from the `badges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Badge {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub condition_kind: String,
    pub threshold: i64,
    pub reward_points: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Badge {
    /// Parse the stored condition kind.
    ///
    /// The check constraint keeps the column to known values; `None`
    /// would mean a schema drift and the engine skips such badges.
    pub fn condition(&self) -> Option<ConditionKind> {
        ConditionKind::parse(&self.condition_kind)
    }
}

/// DTO for creating a new badge definition.
#[derive(Debug, Deserialize)]
pub struct CreateBadge {
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub condition_kind: ConditionKind,
    pub threshold: i64,
    pub reward_points: i64,
}

/// DTO for updating an existing badge. All fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateBadge {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub threshold: Option<i64>,
    pub reward_points: Option<i64>,
    pub is_active: Option<bool>,
}
