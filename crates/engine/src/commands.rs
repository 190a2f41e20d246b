//! Command structs for engine operations.
//!
//! These types group parameters for write operations (account/transaction/
//! transfer/goal/contribution writes), keeping call sites readable and
//! avoiding long argument lists.
//!
//! Update commands use patch semantics: a `None` field keeps the stored
//! value; for optional text fields an explicit empty string clears it.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{AccountKind, Currency, GoalStatus, Recurrence, TransactionKind};

/// Create an account.
#[derive(Clone, Debug)]
pub struct NewAccountCmd {
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance_minor: i64,
    pub currency: Currency,
    pub institution: Option<String>,
    pub color: Option<String>,
}

impl NewAccountCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        kind: AccountKind,
        initial_balance_minor: i64,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            kind,
            initial_balance_minor,
            currency: Currency::default(),
            institution: None,
            color: None,
        }
    }

    #[must_use]
    pub fn currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    #[must_use]
    pub fn institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Update account metadata (never balances).
#[derive(Clone, Debug)]
pub struct UpdateAccountCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub name: Option<String>,
    pub kind: Option<AccountKind>,
    pub institution: Option<String>,
    pub color: Option<String>,
}

impl UpdateAccountCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, account_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            name: None,
            kind: None,
            institution: None,
            color: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: AccountKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// Create an income or expense transaction.
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub user_id: String,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub recurrence: Recurrence,
    pub note: Option<String>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        account_id: Uuid,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id,
            kind,
            amount_minor,
            occurred_at,
            category_id: None,
            description: None,
            payment_method: None,
            recurrence: Recurrence::None,
            note: None,
        }
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Update an existing transaction.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,

    pub account_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub recurrence: Option<Recurrence>,
    pub note: Option<String>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            account_id: None,
            kind: None,
            amount_minor: None,
            occurred_at: None,
            category_id: None,
            description: None,
            payment_method: None,
            recurrence: None,
            note: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = Some(payment_method.into());
        self
    }

    #[must_use]
    pub fn recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create a transfer between two accounts.
#[derive(Clone, Debug)]
pub struct NewTransferCmd {
    pub user_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewTransferCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        from_account_id: Uuid,
        to_account_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            from_account_id,
            to_account_id,
            amount_minor,
            occurred_at,
            description: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Update an existing transfer.
#[derive(Clone, Debug)]
pub struct UpdateTransferCmd {
    pub user_id: String,
    pub transfer_id: Uuid,

    pub from_account_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl UpdateTransferCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transfer_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transfer_id,
            from_account_id: None,
            to_account_id: None,
            amount_minor: None,
            occurred_at: None,
            description: None,
        }
    }

    #[must_use]
    pub fn from_account_id(mut self, account_id: Uuid) -> Self {
        self.from_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn to_account_id(mut self, account_id: Uuid) -> Self {
        self.to_account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Create a savings goal.
#[derive(Clone, Debug)]
pub struct NewGoalCmd {
    pub user_id: String,
    pub name: String,
    pub target_amount_minor: i64,
    pub current_amount_minor: i64,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub deadline: Option<NaiveDate>,
}

impl NewGoalCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, target_amount_minor: i64) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            target_amount_minor,
            current_amount_minor: 0,
            description: None,
            category_id: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn current_amount_minor(mut self, current_amount_minor: i64) -> Self {
        self.current_amount_minor = current_amount_minor;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Update goal metadata.
///
/// `status` accepts only `active`/`paused`; `completed` is owned by the
/// contribution rule.
#[derive(Clone, Debug)]
pub struct UpdateGoalCmd {
    pub user_id: String,
    pub goal_id: Uuid,

    pub name: Option<String>,
    pub description: Option<String>,
    pub target_amount_minor: Option<i64>,
    pub deadline: Option<NaiveDate>,
    pub category_id: Option<Uuid>,
    pub status: Option<GoalStatus>,
}

impl UpdateGoalCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, goal_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id,
            name: None,
            description: None,
            target_amount_minor: None,
            deadline: None,
            category_id: None,
            status: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn target_amount_minor(mut self, target_amount_minor: i64) -> Self {
        self.target_amount_minor = Some(target_amount_minor);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: GoalStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Add a contribution to a goal.
#[derive(Clone, Debug)]
pub struct NewContributionCmd {
    pub user_id: String,
    pub goal_id: Uuid,
    pub account_id: Option<Uuid>,
    pub transaction_id: Option<Uuid>,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl NewContributionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        goal_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id,
            account_id: None,
            transaction_id: None,
            amount_minor,
            occurred_at,
            description: None,
        }
    }

    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    #[must_use]
    pub fn transaction_id(mut self, transaction_id: Uuid) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
