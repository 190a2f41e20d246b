use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Checking,
        Savings,
        Wallet,
        CreditCard,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
        pub initial_balance_minor: i64,
        pub currency: Option<Currency>,
        pub institution: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub kind: Option<AccountKind>,
        pub institution: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountActive {
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
        pub institution: Option<String>,
        pub initial_balance_minor: i64,
        pub current_balance_minor: i64,
        pub currency: Currency,
        pub color: Option<String>,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountCreated {
        pub id: Uuid,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryArchive {
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub archived: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreated {
        pub id: Uuid,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
    }

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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub account_id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub category_id: Option<Uuid>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub recurrence: Option<Recurrence>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub account_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub category_id: Option<Uuid>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub recurrence: Option<Recurrence>,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionList {
        pub limit: Option<u64>,
        pub cursor: Option<String>,
        pub account_id: Option<Uuid>,
        pub category_id: Option<Uuid>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
        pub kinds: Option<Vec<TransactionKind>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub account_id: Uuid,
        pub category_id: Option<Uuid>,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub recurrence: Recurrence,
        pub note: Option<String>,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub next_cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub id: Uuid,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferNew {
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferUpdate {
        pub from_account_id: Option<Uuid>,
        pub to_account_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferView {
        pub id: Uuid,
        pub from_account_id: Uuid,
        pub to_account_id: Uuid,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub description: Option<String>,
        pub currency: Currency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferCreated {
        pub id: Uuid,
    }
}

pub mod goal {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum GoalStatus {
        #[default]
        Active,
        Completed,
        Paused,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalNew {
        pub name: String,
        pub target_amount_minor: i64,
        pub current_amount_minor: Option<i64>,
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub deadline: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub target_amount_minor: Option<i64>,
        pub deadline: Option<NaiveDate>,
        pub category_id: Option<Uuid>,
        pub status: Option<GoalStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalView {
        pub id: Uuid,
        pub category_id: Option<Uuid>,
        pub name: String,
        pub description: Option<String>,
        pub target_amount_minor: i64,
        pub current_amount_minor: i64,
        pub deadline: Option<NaiveDate>,
        pub status: GoalStatus,
        pub is_completed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GoalCreated {
        pub id: Uuid,
    }
}

pub mod contribution {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionNew {
        pub goal_id: Uuid,
        pub account_id: Option<Uuid>,
        pub transaction_id: Option<Uuid>,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionView {
        pub id: Uuid,
        pub goal_id: Uuid,
        pub account_id: Option<Uuid>,
        pub transaction_id: Option<Uuid>,
        pub amount_minor: i64,
        pub occurred_at: DateTime<FixedOffset>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ContributionCreated {
        pub id: Uuid,
    }
}

pub mod stats {
    use super::*;

    /// Aggregate totals for the authenticated user, in minor units.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Statistic {
        pub balance_minor: i64,
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
    }
}
