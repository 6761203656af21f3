//! Target key - identifies anything that can be reacted to or commented on
//!
//! Canonical text form is `{type}:{id}` or `{type}:{id}/{parent}`, e.g.
//! `review:1234` or `review:1234/season-2`. The text form is what gets stored
//! as a notification's `related_entity_key`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Maximum length of a parent key segment
pub const MAX_PARENT_KEY_LEN: usize = 64;

/// Kind of reactable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetType {
    Review,
    List,
    Comment,
}

impl TargetType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
            Self::List => "list",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "review" => Ok(Self::Review),
            "list" => Ok(Self::List),
            "comment" => Ok(Self::Comment),
            other => Err(DomainError::InvalidTarget(format!(
                "unknown target type '{other}'"
            ))),
        }
    }
}

/// `(type, id, parent?)` triple identifying a reactable entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey {
    target_type: TargetType,
    target_id: Snowflake,
    parent_key: Option<String>,
}

impl TargetKey {
    pub fn new(target_type: TargetType, target_id: Snowflake) -> Self {
        Self {
            target_type,
            target_id,
            parent_key: None,
        }
    }

    /// Attach a parent key (e.g. a season within a review)
    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Result<Self, DomainError> {
        let parent_key = parent_key.into();
        validate_parent_key(&parent_key)?;
        self.parent_key = Some(parent_key);
        Ok(self)
    }

    /// Build from loose parts, applying the same validation as [`TargetKey::parse`]
    pub fn from_parts(
        target_type: &str,
        target_id: &str,
        parent_key: Option<&str>,
    ) -> Result<Self, DomainError> {
        let target_type = target_type.parse::<TargetType>()?;
        let target_id = Snowflake::parse(target_id).map_err(|_| {
            DomainError::InvalidTarget(format!("invalid target id '{target_id}'"))
        })?;
        let key = Self::new(target_type, target_id);
        match parent_key {
            Some(parent) => key.with_parent(parent),
            None => Ok(key),
        }
    }

    /// Parse the canonical text form
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let (type_part, rest) = s
            .split_once(':')
            .ok_or_else(|| DomainError::InvalidTarget(format!("missing ':' in '{s}'")))?;
        let (id_part, parent) = match rest.split_once('/') {
            Some((id, parent)) => (id, Some(parent)),
            None => (rest, None),
        };
        Self::from_parts(type_part, id_part, parent)
    }

    #[inline]
    pub fn target_type(&self) -> TargetType {
        self.target_type
    }

    #[inline]
    pub fn target_id(&self) -> Snowflake {
        self.target_id
    }

    pub fn parent_key(&self) -> Option<&str> {
        self.parent_key.as_deref()
    }

    /// The owning entity, with any parent segment stripped
    pub fn root(&self) -> Self {
        Self::new(self.target_type, self.target_id)
    }
}

fn validate_parent_key(parent: &str) -> Result<(), DomainError> {
    if parent.is_empty() {
        return Err(DomainError::InvalidTarget("empty parent key".to_string()));
    }
    if parent.len() > MAX_PARENT_KEY_LEN {
        return Err(DomainError::InvalidTarget(format!(
            "parent key longer than {MAX_PARENT_KEY_LEN} characters"
        )));
    }
    if !parent
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(DomainError::InvalidTarget(format!(
            "parent key '{parent}' contains invalid characters"
        )));
    }
    Ok(())
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.target_id)?;
        if let Some(parent) = &self.parent_key {
            write!(f, "/{parent}")?;
        }
        Ok(())
    }
}

impl FromStr for TargetKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TargetKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TargetKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
