//! Transfer primitives.
//!
//! A `Transfer` moves funds between two accounts of the same owner. Its
//! effect is always debit-source/credit-destination with equal magnitude, so
//! the sum of transfer effects over all accounts is zero.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub currency: Currency,
}

impl Transfer {
    pub fn new(
        user_id: String,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        currency: Currency,
    ) -> ResultEngine<Self> {
        if from_account_id == to_account_id {
            return Err(EngineError::InvalidTransfer(
                "from_account_id and to_account_id must differ".to_string(),
            ));
        }
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            from_account_id,
            to_account_id,
            amount_minor,
            occurred_at,
            description: None,
            currency,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::FromAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FromAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ToAccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    ToAccount,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(transfer: &Transfer) -> Self {
        Self {
            id: ActiveValue::Set(transfer.id.to_string()),
            user_id: ActiveValue::Set(transfer.user_id.clone()),
            from_account_id: ActiveValue::Set(transfer.from_account_id.to_string()),
            to_account_id: ActiveValue::Set(transfer.to_account_id.to_string()),
            amount_minor: ActiveValue::Set(transfer.amount_minor),
            occurred_at: ActiveValue::Set(transfer.occurred_at),
            description: ActiveValue::Set(transfer.description.clone()),
            currency: ActiveValue::Set(transfer.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            user_id: model.user_id,
            from_account_id: parse_uuid(&model.from_account_id, "account")?,
            to_account_id: parse_uuid(&model.to_account_id, "account")?,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            description: model.description,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn new_rejects_self_transfer() {
        let account = Uuid::new_v4();
        let err = Transfer::new(
            "alice".to_string(),
            account,
            account,
            100,
            Utc.timestamp_opt(0, 0).unwrap(),
            Currency::Eur,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransfer(
                "from_account_id and to_account_id must differ".to_string()
            )
        );
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        let err = Transfer::new(
            "alice".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            0,
            Utc.timestamp_opt(0, 0).unwrap(),
            Currency::Eur,
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount_minor must be > 0".to_string())
        );
    }
}
