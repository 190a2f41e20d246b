//! The module contains the `Account` struct and its entity.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError, util::parse_uuid};

/// Kind of ledger bucket an account represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Wallet,
    CreditCard,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Wallet => "wallet",
            Self::CreditCard => "credit_card",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "wallet" => Ok(Self::Wallet),
            "credit_card" => Ok(Self::CreditCard),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid account kind: {other}"
            ))),
        }
    }
}

/// An account.
///
/// An account is a ledger bucket holding a running balance: a bank account,
/// a physical wallet or a credit card.
///
/// `current_balance` is denormalized state owned by the engine: it is only
/// ever mutated by the transaction, transfer and contribution rules.
/// `initial_balance` is fixed at creation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Stable identifier, generated once and persisted so the account can be
    /// renamed without breaking references.
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub institution: Option<String>,
    pub initial_balance: i64,
    pub current_balance: i64,
    pub currency: Currency,
    pub color: Option<String>,
    pub active: bool,
}

impl Account {
    pub fn new(
        user_id: String,
        name: String,
        kind: AccountKind,
        initial_balance: i64,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            institution: None,
            initial_balance,
            current_balance: initial_balance,
            currency,
            color: None,
            active: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub institution: Option<String>,
    pub initial_balance: i64,
    pub current_balance: i64,
    pub currency: String,
    pub color: Option<String>,
    pub active: bool,
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
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            institution: ActiveValue::Set(value.institution.clone()),
            initial_balance: ActiveValue::Set(value.initial_balance),
            current_balance: ActiveValue::Set(value.current_balance),
            currency: ActiveValue::Set(value.currency.code().to_string()),
            color: ActiveValue::Set(value.color.clone()),
            active: ActiveValue::Set(value.active),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            user_id: model.user_id,
            name: model.name,
            kind: AccountKind::try_from(model.kind.as_str())?,
            institution: model.institution,
            initial_balance: model.initial_balance,
            current_balance: model.current_balance,
            currency: Currency::try_from(model.currency.as_str()).unwrap_or_default(),
            color: model.color,
            active: model.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_at_initial_balance() {
        let account = Account::new(
            "alice".to_string(),
            "Checking".to_string(),
            AccountKind::Checking,
            10_000,
            Currency::Eur,
        );
        assert_eq!(account.current_balance, account.initial_balance);
        assert!(account.active);
    }

    #[test]
    fn kind_round_trips_through_storage_form() {
        for kind in [
            AccountKind::Checking,
            AccountKind::Savings,
            AccountKind::Wallet,
            AccountKind::CreditCard,
        ] {
            assert_eq!(AccountKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(AccountKind::try_from("stocks").is_err());
    }
}
