use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
    sea_query::Expr,
};

use crate::{
    Account, EngineError, NewAccountCmd, ResultEngine, Transfer, UpdateAccountCmd, accounts,
    transfers,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Add a new account.
    ///
    /// `initial_balance_minor` seeds both the initial and the current
    /// balance; after creation the current balance is only ever moved by the
    /// transaction, transfer and contribution rules.
    pub async fn create_account(&self, cmd: NewAccountCmd) -> ResultEngine<Uuid> {
        let NewAccountCmd {
            user_id,
            name,
            kind,
            initial_balance_minor,
            currency,
            institution,
            color,
        } = cmd;
        let name = normalize_required_name(&name, "account")?;
        let institution = normalize_optional_text(institution.as_deref());
        let color = normalize_optional_text(color.as_deref());
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &user_id).await?;

            // Enforce unique account names per owner (case-insensitive).
            let exists = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.clone()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let mut account = Account::new(
                user_id.clone(),
                name.clone(),
                kind,
                initial_balance_minor,
                currency,
            );
            account.institution = institution;
            account.color = color;

            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(account.id)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, user_id, account_id).await?;
            Account::try_from(model)
        })
    }

    /// Lists a user's accounts, ordered by name.
    pub async fn list_accounts(
        &self,
        user_id: &str,
        include_inactive: bool,
    ) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let mut query = accounts::Entity::find()
                .filter(accounts::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(accounts::Column::Name);
            if !include_inactive {
                query = query.filter(accounts::Column::Active.eq(true));
            }
            let models = query.all(&db_tx).await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Account::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Updates account metadata (name, kind, institution, color).
    ///
    /// Balances are deliberately not editable here.
    pub async fn update_account(&self, cmd: UpdateAccountCmd) -> ResultEngine<()> {
        let UpdateAccountCmd {
            user_id,
            account_id,
            name,
            kind,
            institution,
            color,
        } = cmd;
        let name = name
            .as_deref()
            .map(|value| normalize_required_name(value, "account"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, &user_id, account_id).await?;

            if let Some(new_name) = &name
                && new_name.to_lowercase() != model.name.to_lowercase()
            {
                let exists = accounts::Entity::find()
                    .filter(accounts::Column::UserId.eq(user_id.clone()))
                    .filter(Expr::cust("LOWER(name)").eq(new_name.to_lowercase()))
                    .filter(accounts::Column::Id.ne(account_id.to_string()))
                    .one(&db_tx)
                    .await?
                    .is_some();
                if exists {
                    return Err(EngineError::ExistingKey(new_name.clone()));
                }
            }

            let active = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                name: name
                    .map(ActiveValue::Set)
                    .unwrap_or(ActiveValue::NotSet),
                kind: kind
                    .map(|k| ActiveValue::Set(k.as_str().to_string()))
                    .unwrap_or(ActiveValue::NotSet),
                institution: institution
                    .as_deref()
                    .map(|value| ActiveValue::Set(normalize_optional_text(Some(value))))
                    .unwrap_or(ActiveValue::NotSet),
                color: color
                    .as_deref()
                    .map(|value| ActiveValue::Set(normalize_optional_text(Some(value))))
                    .unwrap_or(ActiveValue::NotSet),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Activates/deactivates an existing account.
    pub async fn set_account_active(
        &self,
        account_id: Uuid,
        active: bool,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, user_id, account_id).await?;

            let account = accounts::ActiveModel {
                id: ActiveValue::Set(account_id.to_string()),
                active: ActiveValue::Set(active),
                ..Default::default()
            };
            account.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes an account and everything recorded against it.
    ///
    /// Before the rows go away, the effect of every transfer touching this
    /// account is reversed on the *surviving* counterparty account, so each
    /// remaining account keeps its balance invariant. Contributions keep
    /// their goal effect; only the account link is cleared.
    pub async fn delete_account(&self, account_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let account_model = self.require_account(&db_tx, user_id, account_id).await?;

            let touching: Vec<transfers::Model> = transfers::Entity::find()
                .filter(
                    Condition::any()
                        .add(transfers::Column::FromAccountId.eq(account_id.to_string()))
                        .add(transfers::Column::ToAccountId.eq(account_id.to_string())),
                )
                .all(&db_tx)
                .await?;

            let mut new_balances = HashMap::new();
            for model in touching {
                let transfer = Transfer::try_from(model)?;
                if transfer.from_account_id == account_id {
                    // Outbound: the counterparty received the credit; take it back.
                    self.apply_account_delta(
                        &db_tx,
                        user_id,
                        &mut new_balances,
                        transfer.to_account_id,
                        -transfer.amount_minor,
                    )
                    .await?;
                } else {
                    // Inbound: the counterparty was debited; restore it.
                    self.apply_account_delta(
                        &db_tx,
                        user_id,
                        &mut new_balances,
                        transfer.from_account_id,
                        transfer.amount_minor,
                    )
                    .await?;
                }
            }

            // Explicit cascade within one DB transaction so the order is
            // deterministic.
            let backend = self.database.get_database_backend();
            let id = account_model.id;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "UPDATE goal_contributions SET account_id = NULL WHERE account_id = ?;",
                    vec![id.clone().into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM transactions WHERE account_id = ?;",
                    vec![id.clone().into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM transfers WHERE from_account_id = ? OR to_account_id = ?;",
                    vec![id.clone().into(), id.clone().into()],
                ))
                .await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM accounts WHERE id = ?;",
                    vec![id.into()],
                ))
                .await?;

            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }
}
