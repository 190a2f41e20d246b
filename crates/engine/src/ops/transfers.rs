use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, NewTransferCmd, ResultEngine, Transfer, UpdateTransferCmd, transfers,
    util::{ensure_same_currency, model_currency},
};

use super::{Engine, apply_optional_text_patch, normalize_optional_text, with_tx};

impl Engine {
    /// Create a transfer: debit the source account, credit the destination.
    ///
    /// Both mutations and the record insert form one atomic unit. A transfer
    /// where source and destination coincide is rejected before any
    /// mutation.
    pub async fn create_transfer(&self, cmd: NewTransferCmd) -> ResultEngine<Uuid> {
        let NewTransferCmd {
            user_id,
            from_account_id,
            to_account_id,
            amount_minor,
            occurred_at,
            description,
        } = cmd;
        let description = normalize_optional_text(description.as_deref());
        with_tx!(self, |db_tx| {
            let from_model = self
                .require_account(&db_tx, &user_id, from_account_id)
                .await?;
            let to_model = self.require_account(&db_tx, &user_id, to_account_id).await?;
            let currency = model_currency(from_model.currency.as_str())?;
            ensure_same_currency(currency, model_currency(to_model.currency.as_str())?)?;

            let mut transfer = Transfer::new(
                user_id.clone(),
                from_account_id,
                to_account_id,
                amount_minor,
                occurred_at,
                currency,
            )?;
            transfer.description = description;

            let mut new_balances = HashMap::new();
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                from_account_id,
                -amount_minor,
            )
            .await?;
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                to_account_id,
                amount_minor,
            )
            .await?;

            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;
            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(transfer.id)
        })
    }

    /// Updates an existing transfer.
    ///
    /// Reverses the old debit/credit pair (credit old source, debit old
    /// destination), then applies the new pair. Either endpoint and the
    /// amount may have changed.
    pub async fn update_transfer(&self, cmd: UpdateTransferCmd) -> ResultEngine<()> {
        let UpdateTransferCmd {
            user_id,
            transfer_id,
            from_account_id,
            to_account_id,
            amount_minor,
            occurred_at,
            description,
        } = cmd;
        with_tx!(self, |db_tx| {
            let transfer_model = self.require_transfer(&db_tx, &user_id, transfer_id).await?;
            let old = Transfer::try_from(transfer_model)?;

            let new_from = from_account_id.unwrap_or(old.from_account_id);
            let new_to = to_account_id.unwrap_or(old.to_account_id);
            let new_amount_minor = amount_minor.unwrap_or(old.amount_minor);
            if new_from == new_to {
                return Err(EngineError::InvalidTransfer(
                    "from_account_id and to_account_id must differ".to_string(),
                ));
            }
            if new_amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "amount_minor must be > 0".to_string(),
                ));
            }
            let new_occurred_at = occurred_at.unwrap_or(old.occurred_at);
            let new_description =
                apply_optional_text_patch(old.description.clone(), description.as_deref());

            for account_id in [new_from, new_to] {
                if account_id != old.from_account_id && account_id != old.to_account_id {
                    let model = self.require_account(&db_tx, &user_id, account_id).await?;
                    ensure_same_currency(
                        old.currency,
                        model_currency(model.currency.as_str())?,
                    )?;
                }
            }

            let mut new_balances = HashMap::new();
            // Reverse the old pair.
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                old.from_account_id,
                old.amount_minor,
            )
            .await?;
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                old.to_account_id,
                -old.amount_minor,
            )
            .await?;
            // Apply the new pair.
            self.apply_account_delta(
                &db_tx,
                &user_id,
                &mut new_balances,
                new_from,
                -new_amount_minor,
            )
            .await?;
            self.apply_account_delta(&db_tx, &user_id, &mut new_balances, new_to, new_amount_minor)
                .await?;

            let transfer_active = transfers::ActiveModel {
                id: ActiveValue::Set(transfer_id.to_string()),
                from_account_id: ActiveValue::Set(new_from.to_string()),
                to_account_id: ActiveValue::Set(new_to.to_string()),
                amount_minor: ActiveValue::Set(new_amount_minor),
                occurred_at: ActiveValue::Set(new_occurred_at),
                description: ActiveValue::Set(new_description),
                ..Default::default()
            };
            transfer_active.update(&db_tx).await?;

            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }

    /// Deletes a transfer: credit the source back, debit the destination.
    pub async fn delete_transfer(&self, transfer_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let transfer_model = self.require_transfer(&db_tx, user_id, transfer_id).await?;
            let transfer = Transfer::try_from(transfer_model.clone())?;

            let mut new_balances = HashMap::new();
            self.apply_account_delta(
                &db_tx,
                user_id,
                &mut new_balances,
                transfer.from_account_id,
                transfer.amount_minor,
            )
            .await?;
            self.apply_account_delta(
                &db_tx,
                user_id,
                &mut new_balances,
                transfer.to_account_id,
                -transfer.amount_minor,
            )
            .await?;

            transfer_model.delete(&db_tx).await?;
            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }

    /// Return a transfer snapshot from DB.
    pub async fn transfer(&self, transfer_id: Uuid, user_id: &str) -> ResultEngine<Transfer> {
        with_tx!(self, |db_tx| {
            let model = self.require_transfer(&db_tx, user_id, transfer_id).await?;
            Transfer::try_from(model)
        })
    }

    /// Lists recent transfers for a user, newest first.
    pub async fn list_transfers(&self, user_id: &str, limit: u64) -> ResultEngine<Vec<Transfer>> {
        with_tx!(self, |db_tx| {
            let models = transfers::Entity::find()
                .filter(transfers::Column::UserId.eq(user_id.to_string()))
                .order_by_desc(transfers::Column::OccurredAt)
                .order_by_desc(transfers::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Transfer::try_from(model)?);
            }
            Ok(out)
        })
    }
}
