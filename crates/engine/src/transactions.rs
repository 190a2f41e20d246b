//! Transaction primitives.
//!
//! A `Transaction` is a single income or expense event tied to one account.
//! Its balance effect is signed by kind: income increases the account,
//! expense decreases it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Signed balance effect of an amount under this kind.
    #[must_use]
    pub fn signed_amount(self, amount_minor: i64) -> i64 {
        match self {
            Self::Income => amount_minor,
            Self::Expense => -amount_minor,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Recurrence tag on a transaction.
///
/// Informational only: the engine never expands a recurring tag into future
/// transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl TryFrom<&str> for Recurrence {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid recurrence: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub account_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub recurrence: Recurrence,
    pub note: Option<String>,
    pub currency: Currency,
}

impl Transaction {
    pub fn new(
        user_id: String,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        currency: Currency,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            account_id,
            category_id: None,
            kind,
            amount_minor,
            occurred_at,
            description: None,
            payment_method: None,
            recurrence: Recurrence::None,
            note: None,
            currency,
        })
    }

    /// Signed effect this transaction has on its account's balance.
    #[must_use]
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed_amount(self.amount_minor)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub kind: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub recurrence: String,
    pub note: Option<String>,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            payment_method: ActiveValue::Set(tx.payment_method.clone()),
            recurrence: ActiveValue::Set(tx.recurrence.as_str().to_string()),
            note: ActiveValue::Set(tx.note.clone()),
            currency: ActiveValue::Set(tx.currency.code().to_string()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            user_id: model.user_id,
            account_id: parse_uuid(&model.account_id, "account")?,
            category_id: model
                .category_id
                .as_deref()
                .map(|id| parse_uuid(id, "category"))
                .transpose()?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            description: model.description,
            payment_method: model.payment_method,
            recurrence: Recurrence::try_from(model.recurrence.as_str())?,
            note: model.note,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn signed_amount_follows_kind() {
        assert_eq!(TransactionKind::Income.signed_amount(250), 250);
        assert_eq!(TransactionKind::Expense.signed_amount(250), -250);
    }

    #[test]
    fn new_rejects_non_positive_amounts() {
        for amount in [0, -10] {
            let err = Transaction::new(
                "alice".to_string(),
                Uuid::new_v4(),
                TransactionKind::Income,
                amount,
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

    #[test]
    fn recurrence_round_trips_through_storage_form() {
        for recurrence in [
            Recurrence::None,
            Recurrence::Daily,
            Recurrence::Weekly,
            Recurrence::Monthly,
            Recurrence::Yearly,
        ] {
            assert_eq!(
                Recurrence::try_from(recurrence.as_str()).unwrap(),
                recurrence
            );
        }
    }
}
