use std::collections::HashMap;

use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, GoalContribution, GoalStatus, MoneyCents, NewContributionCmd, ResultEngine,
    contributions, goals,
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Adds a contribution in one atomic unit: check the source account's
    /// balance, record the contribution, debit the account, credit the goal
    /// and re-evaluate goal completion.
    ///
    /// The balance check compares stored integer minor units, so the
    /// insufficient-funds decision cannot be skewed by rounding. A linked
    /// account whose balance is below the contributed amount rejects the
    /// whole unit with no mutation.
    pub async fn add_contribution(&self, cmd: NewContributionCmd) -> ResultEngine<Uuid> {
        let NewContributionCmd {
            user_id,
            goal_id,
            account_id,
            transaction_id,
            amount_minor,
            occurred_at,
            description,
        } = cmd;
        let description = normalize_optional_text(description.as_deref());
        with_tx!(self, |db_tx| {
            let goal_model = self.require_goal(&db_tx, &user_id, goal_id).await?;

            let mut contribution = GoalContribution::new(
                user_id.clone(),
                goal_id,
                account_id,
                amount_minor,
                occurred_at,
            )?;
            contribution.transaction_id = transaction_id;
            contribution.description = description;

            let mut new_balances = HashMap::new();
            if let Some(account_id) = account_id {
                let account_model = self.require_account(&db_tx, &user_id, account_id).await?;
                if MoneyCents::new(amount_minor) > MoneyCents::new(account_model.current_balance)
                {
                    return Err(EngineError::InsufficientFunds(format!(
                        "insufficient balance in account '{}'",
                        account_model.name
                    )));
                }
                self.apply_account_delta(
                    &db_tx,
                    &user_id,
                    &mut new_balances,
                    account_id,
                    -amount_minor,
                )
                .await?;
            }

            contributions::ActiveModel::from(&contribution)
                .insert(&db_tx)
                .await?;

            let new_amount = MoneyCents::new(goal_model.current_amount_minor)
                .checked_add(MoneyCents::new(amount_minor))
                .ok_or_else(|| EngineError::InvalidAmount("goal amount overflow".to_string()))?;
            let completed = new_amount.cents() >= goal_model.target_amount_minor;
            let status = if completed {
                GoalStatus::Completed
            } else {
                GoalStatus::Active
            };

            let goal_active = goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                current_amount_minor: ActiveValue::Set(new_amount.cents()),
                status: ActiveValue::Set(status.as_str().to_string()),
                is_completed: ActiveValue::Set(completed),
                ..Default::default()
            };
            goal_active.update(&db_tx).await?;

            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(contribution.id)
        })
    }

    /// Removes a contribution: credit the linked account back (if any),
    /// delete the record, and debit the goal's accumulated amount (floored
    /// at 0).
    ///
    /// Removing a contribution always resets the goal to `active`, even if
    /// the remaining amount still meets the target. This mirrors the
    /// original application's behavior.
    pub async fn remove_contribution(
        &self,
        contribution_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let contribution_model = self
                .require_contribution(&db_tx, user_id, contribution_id)
                .await?;
            let contribution = GoalContribution::try_from(contribution_model.clone())?;
            let goal_model = self
                .require_goal(&db_tx, user_id, contribution.goal_id)
                .await?;

            let mut new_balances = HashMap::new();
            if let Some(account_id) = contribution.account_id {
                self.apply_account_delta(
                    &db_tx,
                    user_id,
                    &mut new_balances,
                    account_id,
                    contribution.amount_minor,
                )
                .await?;
            }

            contribution_model.delete(&db_tx).await?;

            let new_amount = MoneyCents::new(goal_model.current_amount_minor)
                .checked_sub(MoneyCents::new(contribution.amount_minor))
                .ok_or_else(|| EngineError::InvalidAmount("goal amount overflow".to_string()))?
                .floor_at_zero();

            let goal_active = goals::ActiveModel {
                id: ActiveValue::Set(contribution.goal_id.to_string()),
                current_amount_minor: ActiveValue::Set(new_amount.cents()),
                status: ActiveValue::Set(GoalStatus::Active.as_str().to_string()),
                is_completed: ActiveValue::Set(false),
                ..Default::default()
            };
            goal_active.update(&db_tx).await?;

            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }

    /// Return a contribution snapshot from DB.
    pub async fn contribution(
        &self,
        contribution_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<GoalContribution> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_contribution(&db_tx, user_id, contribution_id)
                .await?;
            GoalContribution::try_from(model)
        })
    }

    /// Lists a goal's contributions, newest first.
    pub async fn list_contributions_for_goal(
        &self,
        goal_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<Vec<GoalContribution>> {
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, user_id, goal_id).await?;

            let models = contributions::Entity::find()
                .filter(contributions::Column::GoalId.eq(goal_id.to_string()))
                .order_by_desc(contributions::Column::OccurredAt)
                .order_by_desc(contributions::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(GoalContribution::try_from(model)?);
            }
            Ok(out)
        })
    }
}
