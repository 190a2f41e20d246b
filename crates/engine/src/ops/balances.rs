use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, GoalContribution, ResultEngine, Transaction, TransactionKind, Transfer, accounts,
    contributions, goals, transactions, transfers, util::parse_uuid,
};

use super::{Engine, with_tx};

/// Aggregate totals for one user, in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UserStatistics {
    /// Sum of current balances over active accounts.
    pub balance_minor: i64,
    pub total_income_minor: i64,
    pub total_expense_minor: i64,
}

impl Engine {
    /// Recomputes denormalized balances from the ledger.
    ///
    /// Every account's `current_balance` is rebuilt as its initial balance
    /// plus the replayed effects of the user's live transactions, transfers
    /// and contributions; every goal's `current_amount_minor` is rebuilt
    /// from its live contributions. Goal statuses are left untouched (the
    /// force-active reset on removal makes status non-derivable from
    /// amounts).
    pub async fn recompute_balances(&self, user_id: &str) -> ResultEngine<()> {
        let user_id = user_id.to_string();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &user_id).await?;

            let account_models: Vec<accounts::Model> = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.clone()))
                .all(&db_tx)
                .await?;

            let mut balances: HashMap<Uuid, i64> = HashMap::new();
            for model in &account_models {
                balances.insert(parse_uuid(&model.id, "account")?, model.initial_balance);
            }

            // Replay live transactions in chronological order.
            let tx_models: Vec<transactions::Model> = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.clone()))
                .order_by_asc(transactions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            for model in tx_models {
                let tx = Transaction::try_from(model)?;
                let balance = balances.get_mut(&tx.account_id).ok_or_else(|| {
                    EngineError::KeyNotFound("account not exists".to_string())
                })?;
                *balance += tx.signed_amount();
            }

            let transfer_models: Vec<transfers::Model> = transfers::Entity::find()
                .filter(transfers::Column::UserId.eq(user_id.clone()))
                .order_by_asc(transfers::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            for model in transfer_models {
                let transfer = Transfer::try_from(model)?;
                let from = balances.get_mut(&transfer.from_account_id).ok_or_else(|| {
                    EngineError::KeyNotFound("account not exists".to_string())
                })?;
                *from -= transfer.amount_minor;
                let to = balances.get_mut(&transfer.to_account_id).ok_or_else(|| {
                    EngineError::KeyNotFound("account not exists".to_string())
                })?;
                *to += transfer.amount_minor;
            }

            let goal_models: Vec<goals::Model> = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id.clone()))
                .all(&db_tx)
                .await?;
            let mut goal_amounts: HashMap<Uuid, i64> = HashMap::new();
            for model in &goal_models {
                goal_amounts.insert(parse_uuid(&model.id, "goal")?, 0);
            }

            let contribution_models: Vec<contributions::Model> = contributions::Entity::find()
                .filter(contributions::Column::UserId.eq(user_id.clone()))
                .order_by_asc(contributions::Column::OccurredAt)
                .all(&db_tx)
                .await?;
            for model in contribution_models {
                let contribution = GoalContribution::try_from(model)?;
                if let Some(account_id) = contribution.account_id {
                    let balance = balances.get_mut(&account_id).ok_or_else(|| {
                        EngineError::KeyNotFound("account not exists".to_string())
                    })?;
                    *balance -= contribution.amount_minor;
                }
                let amount = goal_amounts.get_mut(&contribution.goal_id).ok_or_else(|| {
                    EngineError::KeyNotFound("goal not exists".to_string())
                })?;
                *amount += contribution.amount_minor;
            }

            // Persist denormalized state.
            for (account_id, balance) in balances {
                let account_model = accounts::ActiveModel {
                    id: ActiveValue::Set(account_id.to_string()),
                    current_balance: ActiveValue::Set(balance),
                    ..Default::default()
                };
                account_model.update(&db_tx).await?;
            }

            for (goal_id, amount) in goal_amounts {
                let goal_model = goals::ActiveModel {
                    id: ActiveValue::Set(goal_id.to_string()),
                    current_amount_minor: ActiveValue::Set(amount),
                    ..Default::default()
                };
                goal_model.update(&db_tx).await?;
            }

            Ok(())
        })
    }

    /// Returns user totals: active-account balance plus income/expense sums.
    pub async fn user_statistics(&self, user_id: &str) -> ResultEngine<UserStatistics> {
        let account_models: Vec<accounts::Model> = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(user_id.to_string()))
            .filter(accounts::Column::Active.eq(true))
            .all(&self.database)
            .await?;
        let balance_minor: i64 = account_models
            .iter()
            .map(|model| model.current_balance)
            .sum();

        let backend = self.database.get_database_backend();
        let sum_for_kind = |kind: TransactionKind| {
            Statement::from_sql_and_values(
                backend,
                "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                 FROM transactions \
                 WHERE user_id = ? AND kind = ?",
                vec![user_id.into(), kind.as_str().into()],
            )
        };

        let total_income_minor: i64 = {
            let row = self
                .database
                .query_one(sum_for_kind(TransactionKind::Income))
                .await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        let total_expense_minor: i64 = {
            let row = self
                .database
                .query_one(sum_for_kind(TransactionKind::Expense))
                .await?;
            row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0)
        };

        Ok(UserStatistics {
            balance_minor,
            total_income_minor,
            total_expense_minor,
        })
    }
}
