use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, MoneyCents, NewTransactionCmd, ResultEngine, Transaction, TransactionKind,
    UpdateTransactionCmd, accounts, transactions,
    util::{ensure_same_currency, model_currency},
};

use super::{Engine, apply_optional_text_patch, normalize_optional_text, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
    /// If present, restricts to transactions of one account.
    pub account_id: Option<Uuid>,
    /// If present, restricts to transactions of one category.
    pub category_id: Option<Uuid>,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::InvalidAmount(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::InvalidAmount(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lt(to));
        }
        if let Some(account_id) = filter.account_id {
            self = self.filter(transactions::Column::AccountId.eq(account_id.to_string()));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kinds) = &filter.kinds {
            let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
            self = self.filter(transactions::Column::Kind.is_in(kinds));
        }
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct TransactionsCursor {
    occurred_at: DateTime<Utc>,
    transaction_id: String,
}

impl TransactionsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidAmount("invalid transactions cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidAmount("invalid transactions cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidAmount("invalid transactions cursor".to_string()))
    }
}

impl Engine {
    /// Accumulates a signed balance change against an owned account.
    ///
    /// Deltas are staged in `new_balances` (account id → resulting balance)
    /// so one write unit can touch the same account several times and
    /// persist the final value once. Arithmetic is checked: overflow aborts
    /// the unit before anything is written.
    pub(super) async fn apply_account_delta(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        new_balances: &mut HashMap<Uuid, i64>,
        account_id: Uuid,
        delta_minor: i64,
    ) -> ResultEngine<()> {
        let account_model = self.require_account(db_tx, user_id, account_id).await?;

        let entry = new_balances
            .entry(account_id)
            .or_insert(account_model.current_balance);
        let next = MoneyCents::new(*entry)
            .checked_add(MoneyCents::new(delta_minor))
            .ok_or_else(|| EngineError::InvalidAmount("balance overflow".to_string()))?;
        *entry = next.cents();
        Ok(())
    }

    /// Persist the staged denormalized balances.
    pub(super) async fn persist_account_balances(
        &self,
        db_tx: &DatabaseTransaction,
        new_balances: HashMap<Uuid, i64>,
    ) -> ResultEngine<()> {
        for (account_id, new_balance) in new_balances {
            let account_model = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                current_balance: ActiveValue::Set(new_balance),
                ..Default::default()
            };
            account_model.update(db_tx).await?;
        }
        Ok(())
    }

    /// Create an income or expense transaction and apply its balance effect.
    pub async fn create_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Uuid> {
        let NewTransactionCmd {
            user_id,
            account_id,
            kind,
            amount_minor,
            occurred_at,
            category_id,
            description,
            payment_method,
            recurrence,
            note,
        } = cmd;
        let description = normalize_optional_text(description.as_deref());
        let payment_method = normalize_optional_text(payment_method.as_deref());
        let note = normalize_optional_text(note.as_deref());
        with_tx!(self, |db_tx| {
            let account_model = self.require_account(&db_tx, &user_id, account_id).await?;
            let currency = model_currency(account_model.currency.as_str())?;
            self.require_category_opt(&db_tx, &user_id, category_id)
                .await?;

            let mut tx = Transaction::new(
                user_id.clone(),
                account_id,
                kind,
                amount_minor,
                occurred_at,
                currency,
            )?;
            tx.category_id = category_id;
            tx.description = description;
            tx.payment_method = payment_method;
            tx.recurrence = recurrence;
            tx.note = note;

            let mut new_balances = HashMap::new();
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                account_id,
                tx.signed_amount(),
            )
            .await?;

            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(tx.id)
        })
    }

    /// Updates an existing transaction.
    ///
    /// The balance change is always computed as "reverse the old effect,
    /// apply the new effect", which also covers the case where the account
    /// reference itself changed.
    pub async fn update_transaction(&self, cmd: UpdateTransactionCmd) -> ResultEngine<()> {
        let UpdateTransactionCmd {
            user_id,
            transaction_id,
            account_id,
            kind,
            amount_minor,
            occurred_at,
            category_id,
            description,
            payment_method,
            recurrence,
            note,
        } = cmd;
        with_tx!(self, |db_tx| {
            let tx_model = self
                .require_transaction(&db_tx, &user_id, transaction_id)
                .await?;
            let old = Transaction::try_from(tx_model)?;

            let new_account_id = account_id.unwrap_or(old.account_id);
            let new_kind = kind.unwrap_or(old.kind);
            let new_amount_minor = amount_minor.unwrap_or(old.amount_minor);
            if new_amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "amount_minor must be > 0".to_string(),
                ));
            }
            let new_occurred_at = occurred_at.unwrap_or(old.occurred_at);
            let new_description =
                apply_optional_text_patch(old.description.clone(), description.as_deref());
            let new_payment_method =
                apply_optional_text_patch(old.payment_method.clone(), payment_method.as_deref());
            let new_note = apply_optional_text_patch(old.note.clone(), note.as_deref());
            let new_recurrence = recurrence.unwrap_or(old.recurrence);
            let new_category_id = category_id.or(old.category_id);
            self.require_category_opt(&db_tx, &user_id, category_id)
                .await?;

            if new_account_id != old.account_id {
                let new_account_model = self
                    .require_account(&db_tx, &user_id, new_account_id)
                    .await?;
                ensure_same_currency(
                    model_currency(new_account_model.currency.as_str())?,
                    old.currency,
                )?;
            }

            let mut new_balances = HashMap::new();
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                old.account_id,
                -old.signed_amount(),
            )
            .await?;
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                new_account_id,
                new_kind.signed_amount(new_amount_minor),
            )
            .await?;

            let tx_active = transactions::ActiveModel {
                id: ActiveValue::Set(transaction_id.to_string()),
                account_id: ActiveValue::Set(new_account_id.to_string()),
                category_id: ActiveValue::Set(new_category_id.map(|id| id.to_string())),
                kind: ActiveValue::Set(new_kind.as_str().to_string()),
                amount_minor: ActiveValue::Set(new_amount_minor),
                occurred_at: ActiveValue::Set(new_occurred_at),
                description: ActiveValue::Set(new_description),
                payment_method: ActiveValue::Set(new_payment_method),
                recurrence: ActiveValue::Set(new_recurrence.as_str().to_string()),
                note: ActiveValue::Set(new_note),
                ..Default::default()
            };
            tx_active.update(&db_tx).await?;

            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }

    /// Deletes a transaction, reversing its balance effect.
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let tx_model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            let tx = Transaction::try_from(tx_model.clone())?;

            let mut new_balances = HashMap::new();
            self.apply_account_delta(
                &db_tx,
                user_id,
                &mut new_balances,
                tx.account_id,
                -tx.signed_amount(),
            )
            .await?;

            tx_model.delete(&db_tx).await?;
            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }

    /// Return a transaction snapshot from DB.
    pub async fn transaction(
        &self,
        transaction_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;
            Transaction::try_from(model)
        })
    }

    /// Lists recent transactions for a user.
    pub async fn list_transactions(
        &self,
        user_id: &str,
        limit: u64,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let (items, _next) = self
            .list_transactions_page(user_id, limit, None, filter)
            .await?;
        Ok(items)
    }

    /// Lists recent transactions with cursor-based pagination.
    ///
    /// Pagination is newest → older by `(occurred_at DESC, id DESC)`.
    pub async fn list_transactions_page(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&str>,
        filter: &TransactionListFilter,
    ) -> ResultEngine<(Vec<Transaction>, Option<String>)> {
        with_tx!(self, |db_tx| {
            validate_list_filter(filter)?;
            if let Some(account_id) = filter.account_id {
                self.require_account(&db_tx, user_id, account_id).await?;
            }

            let limit_plus_one = limit.saturating_add(1);
            let mut query = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id.to_string()))
                .apply_tx_filters(filter)
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = TransactionsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::OccurredAt.lt(cursor.occurred_at))
                        .add(
                            Condition::all()
                                .add(transactions::Column::OccurredAt.eq(cursor.occurred_at))
                                .add(transactions::Column::Id.lt(cursor.transaction_id)),
                        ),
                );
            }

            let models = query.all(&db_tx).await?;
            let has_more = models.len() as u64 > limit;

            let mut items = Vec::with_capacity(models.len().min(limit as usize));
            for model in models.into_iter().take(limit as usize) {
                items.push(Transaction::try_from(model)?);
            }

            let next_cursor = if has_more {
                items
                    .last()
                    .map(|tx| {
                        TransactionsCursor {
                            occurred_at: tx.occurred_at,
                            transaction_id: tx.id.to_string(),
                        }
                        .encode()
                    })
                    .transpose()?
            } else {
                None
            };

            Ok((items, next_cursor))
        })
    }
}
