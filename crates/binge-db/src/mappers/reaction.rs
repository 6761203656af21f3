//! Reaction/target entity <-> model mappers

use binge_core::entities::{Reaction, Target};
use binge_core::error::DomainError;
use binge_core::value_objects::{Snowflake, TargetKey};

use crate::models::{ReactionModel, TargetModel};
use crate::repositories::error::corrupt_row;

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        Ok(Reaction {
            target_key: TargetKey::parse(&model.target_key)
                .map_err(|e| corrupt_row("reaction", e))?,
            user_id: Snowflake::new(model.user_id),
            kind: model.kind.parse().map_err(|e| corrupt_row("reaction", e))?,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<TargetModel> for Target {
    type Error = DomainError;

    fn try_from(model: TargetModel) -> Result<Self, Self::Error> {
        Ok(Target {
            key: TargetKey::parse(&model.target_key).map_err(|e| corrupt_row("target", e))?,
            owner_id: Snowflake::new(model.owner_id),
            reaction_count: model.reaction_count,
        })
    }
}
