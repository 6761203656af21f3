//! Reaction entities - membership facts and the reactable targets they count against

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{Snowflake, TargetKey};

/// Reaction kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
}

impl ReactionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Self::Like),
            other => Err(DomainError::InvalidTarget(format!(
                "unknown reaction type '{other}'"
            ))),
        }
    }
}

/// Reaction entity: user `user_id` reacted `kind` on `target_key`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub target_key: TargetKey,
    pub user_id: Snowflake,
    pub kind: ReactionKind,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(target_key: TargetKey, user_id: Snowflake, kind: ReactionKind) -> Self {
        Self {
            target_key,
            user_id,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// A registered reactable entity with its denormalized counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub key: TargetKey,
    pub owner_id: Snowflake,
    pub reaction_count: i64,
}

impl Target {
    pub fn new(key: TargetKey, owner_id: Snowflake) -> Self {
        Self {
            key,
            owner_id,
            reaction_count: 0,
        }
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }
}

/// What a toggle request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleMode {
    /// Flip the current state
    #[default]
    Toggle,
    /// Ensure the reaction exists
    Activate,
    /// Ensure the reaction does not exist
    Deactivate,
}

impl ToggleMode {
    /// Desired membership given the current one
    #[inline]
    pub fn resolve(self, currently_active: bool) -> bool {
        match self {
            Self::Toggle => !currently_active,
            Self::Activate => true,
            Self::Deactivate => false,
        }
    }
}

/// Input to the atomic toggle unit
#[derive(Debug, Clone)]
pub struct ToggleRequest {
    pub target_key: TargetKey,
    pub user_id: Snowflake,
    pub kind: ReactionKind,
    pub mode: ToggleMode,
    /// Id reserved for the outbox row should the toggle activate
    pub intent_id: Snowflake,
    pub requested_at: DateTime<Utc>,
}

/// Result of a committed toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub active: bool,
    pub count: i64,
    /// Whether membership actually changed
    pub changed: bool,
    /// Notification intent recorded in the same commit
    pub intent: Option<super::NotificationIntent>,
}

/// Reaction state of a target as seen by one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionState {
    pub active: bool,
    pub count: i64,
}
