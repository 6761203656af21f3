//! Value objects - immutable types that represent domain concepts

mod group_key;
mod snowflake;
mod target_key;

pub use group_key::{CooldownKey, GroupKey};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
pub use target_key::{TargetKey, TargetType, MAX_PARENT_KEY_LEN};
