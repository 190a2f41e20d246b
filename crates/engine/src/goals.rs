//! Savings goal primitives.
//!
//! A `Goal` accumulates money towards a target. Its `current_amount_minor`
//! is denormalized state mutated solely by the contribution rule, which also
//! owns the `completed` status transition. `paused` is a manual user choice.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Paused,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }
}

impl TryFrom<&str> for GoalStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "paused" => Ok(Self::Paused),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid goal status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: String,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<Date>,
    pub status: GoalStatus,
    /// Always equal to `status == GoalStatus::Completed`.
    pub is_completed: bool,
}

impl Goal {
    pub fn new(
        user_id: String,
        name: String,
        target_amount_minor: i64,
        current_amount_minor: i64,
    ) -> ResultEngine<Self> {
        if target_amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "target_amount_minor must be > 0".to_string(),
            ));
        }
        if current_amount_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "current_amount_minor must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            category_id: None,
            name,
            description: None,
            target_amount_minor,
            current_amount_minor,
            deadline: None,
            status: GoalStatus::Active,
            is_completed: false,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub deadline: Option<Date>,
    pub status: String,
    pub is_completed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::contributions::Entity")]
    Contributions,
}

impl Related<super::contributions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Goal> for ActiveModel {
    fn from(goal: &Goal) -> Self {
        Self {
            id: ActiveValue::Set(goal.id.to_string()),
            user_id: ActiveValue::Set(goal.user_id.clone()),
            category_id: ActiveValue::Set(goal.category_id.map(|id| id.to_string())),
            name: ActiveValue::Set(goal.name.clone()),
            description: ActiveValue::Set(goal.description.clone()),
            target_amount_minor: ActiveValue::Set(goal.target_amount_minor),
            current_amount_minor: ActiveValue::Set(goal.current_amount_minor),
            deadline: ActiveValue::Set(goal.deadline),
            status: ActiveValue::Set(goal.status.as_str().to_string()),
            is_completed: ActiveValue::Set(goal.is_completed),
        }
    }
}

impl TryFrom<Model> for Goal {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "goal")?,
            user_id: model.user_id,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            name: model.name,
            description: model.description,
            target_amount_minor: model.target_amount_minor,
            current_amount_minor: model.current_amount_minor,
            deadline: model.deadline,
            status: GoalStatus::try_from(model.status.as_str())?,
            is_completed: model.is_completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_goal_starts_active() {
        let goal = Goal::new("alice".to_string(), "Holiday".to_string(), 100_000, 0).unwrap();
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(!goal.is_completed);
    }

    #[test]
    fn new_rejects_invalid_amounts() {
        assert!(Goal::new("alice".to_string(), "Holiday".to_string(), 0, 0).is_err());
        assert!(Goal::new("alice".to_string(), "Holiday".to_string(), 1000, -1).is_err());
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [GoalStatus::Active, GoalStatus::Completed, GoalStatus::Paused] {
            assert_eq!(GoalStatus::try_from(status.as_str()).unwrap(), status);
        }
    }
}
