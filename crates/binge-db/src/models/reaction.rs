//! Reaction and target database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub target_key: String,
    pub user_id: i64,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for reaction_targets table
#[derive(Debug, Clone, FromRow)]
pub struct TargetModel {
    pub target_key: String,
    pub owner_id: i64,
    pub reaction_count: i64,
}
