//! Goal contribution primitives.
//!
//! A `GoalContribution` is a funding event moving money from an account into
//! a goal's accumulated amount. The source account is optional; when present
//! the contribution debits it, and removing the contribution credits it
//! back.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalContribution {
    pub id: Uuid,
    pub user_id: String,
    pub goal_id: Uuid,
    pub account_id: Option<Uuid>,
    /// Optional link to a transaction that recorded this contribution
    /// elsewhere. Informational only.
    pub transaction_id: Option<Uuid>,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl GoalContribution {
    pub fn new(
        user_id: String,
        goal_id: Uuid,
        account_id: Option<Uuid>,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            goal_id,
            account_id,
            transaction_id: None,
            amount_minor,
            occurred_at,
            description: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "goal_contributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub goal_id: String,
    pub account_id: Option<String>,
    pub transaction_id: Option<String>,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::goals::Entity",
        from = "Column::GoalId",
        to = "super::goals::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Goals,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Accounts,
}

impl Related<super::goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Goals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&GoalContribution> for ActiveModel {
    fn from(contribution: &GoalContribution) -> Self {
        Self {
            id: ActiveValue::Set(contribution.id.to_string()),
            user_id: ActiveValue::Set(contribution.user_id.clone()),
            goal_id: ActiveValue::Set(contribution.goal_id.to_string()),
            account_id: ActiveValue::Set(contribution.account_id.map(|id| id.to_string())),
            transaction_id: ActiveValue::Set(contribution.transaction_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(contribution.amount_minor),
            occurred_at: ActiveValue::Set(contribution.occurred_at),
            description: ActiveValue::Set(contribution.description.clone()),
        }
    }
}

impl TryFrom<Model> for GoalContribution {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "contribution")?,
            user_id: model.user_id,
            goal_id: parse_uuid(&model.goal_id, "goal")?,
            account_id: model
                .account_id
                .as_deref()
                .map(|id| parse_uuid(id, "account"))
                .transpose()?,
            transaction_id: model
                .transaction_id
                .as_deref()
                .map(|id| parse_uuid(id, "transaction"))
                .transpose()?,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            description: model.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn new_rejects_non_positive_amounts() {
        let err = GoalContribution::new(
            "alice".to_string(),
            Uuid::new_v4(),
            None,
            0,
            Utc.timestamp_opt(0, 0).unwrap(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount_minor must be > 0".to_string())
        );
    }
}
