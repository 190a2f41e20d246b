use uuid::Uuid;

use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};

use std::collections::HashMap;

use crate::{
    EngineError, Goal, GoalContribution, GoalStatus, NewGoalCmd, ResultEngine, UpdateGoalCmd,
    contributions, goals,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

impl Engine {
    /// Add a new savings goal.
    ///
    /// Goals start `active`; completion only flips as a result of a
    /// contribution, even when the caller seeds `current_amount_minor` at or
    /// above the target.
    pub async fn create_goal(&self, cmd: NewGoalCmd) -> ResultEngine<Uuid> {
        let NewGoalCmd {
            user_id,
            name,
            target_amount_minor,
            current_amount_minor,
            description,
            category_id,
            deadline,
        } = cmd;
        let name = normalize_required_name(&name, "goal")?;
        let description = normalize_optional_text(description.as_deref());
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, &user_id).await?;
            self.require_category_opt(&db_tx, &user_id, category_id)
                .await?;

            let mut goal = Goal::new(
                user_id.clone(),
                name.clone(),
                target_amount_minor,
                current_amount_minor,
            )?;
            goal.description = description;
            goal.category_id = category_id;
            goal.deadline = deadline;

            goals::ActiveModel::from(&goal).insert(&db_tx).await?;
            Ok(goal.id)
        })
    }

    /// Return a goal snapshot from DB.
    pub async fn goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<Goal> {
        with_tx!(self, |db_tx| {
            let model = self.require_goal(&db_tx, user_id, goal_id).await?;
            Goal::try_from(model)
        })
    }

    /// Lists a user's goals, ordered by name.
    pub async fn list_goals(&self, user_id: &str) -> ResultEngine<Vec<Goal>> {
        with_tx!(self, |db_tx| {
            let models = goals::Entity::find()
                .filter(goals::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(goals::Column::Name)
                .all(&db_tx)
                .await?;

            let mut out = Vec::with_capacity(models.len());
            for model in models {
                out.push(Goal::try_from(model)?);
            }
            Ok(out)
        })
    }

    /// Updates goal metadata.
    ///
    /// Accepts `active`/`paused` as manual status choices; `completed` is
    /// owned by the contribution rule and rejected here. Editing the target
    /// does not re-evaluate completion.
    pub async fn update_goal(&self, cmd: UpdateGoalCmd) -> ResultEngine<()> {
        let UpdateGoalCmd {
            user_id,
            goal_id,
            name,
            description,
            target_amount_minor,
            deadline,
            category_id,
            status,
        } = cmd;
        let name = name
            .as_deref()
            .map(|value| normalize_required_name(value, "goal"))
            .transpose()?;
        if let Some(target) = target_amount_minor
            && target <= 0
        {
            return Err(EngineError::InvalidAmount(
                "target_amount_minor must be > 0".to_string(),
            ));
        }
        if status == Some(GoalStatus::Completed) {
            return Err(EngineError::InvalidAmount(
                "status completed is set by contributions".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_goal(&db_tx, &user_id, goal_id).await?;
            self.require_category_opt(&db_tx, &user_id, category_id)
                .await?;

            let active = goals::ActiveModel {
                id: ActiveValue::Set(goal_id.to_string()),
                name: name.map(ActiveValue::Set).unwrap_or(ActiveValue::NotSet),
                description: description
                    .as_deref()
                    .map(|value| ActiveValue::Set(normalize_optional_text(Some(value))))
                    .unwrap_or(ActiveValue::NotSet),
                target_amount_minor: target_amount_minor
                    .map(ActiveValue::Set)
                    .unwrap_or(ActiveValue::NotSet),
                deadline: deadline
                    .map(|d| ActiveValue::Set(Some(d)))
                    .unwrap_or(ActiveValue::NotSet),
                category_id: category_id
                    .map(|id| ActiveValue::Set(Some(id.to_string())))
                    .unwrap_or(ActiveValue::NotSet),
                status: status
                    .map(|s| ActiveValue::Set(s.as_str().to_string()))
                    .unwrap_or(ActiveValue::NotSet),
                is_completed: status
                    .map(|_| ActiveValue::Set(false))
                    .unwrap_or(ActiveValue::NotSet),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }

    /// Deletes a goal and its contributions.
    ///
    /// Each contribution with a linked account is refunded to that account
    /// first, inside the same unit, so account balances stay consistent with
    /// the surviving ledger.
    pub async fn delete_goal(&self, goal_id: Uuid, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let goal_model = self.require_goal(&db_tx, user_id, goal_id).await?;

            let contribution_models = contributions::Entity::find()
                .filter(contributions::Column::GoalId.eq(goal_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut new_balances = HashMap::new();
            for model in contribution_models {
                let contribution = GoalContribution::try_from(model)?;
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
            }

            let backend = self.database.get_database_backend();
            db_tx
                .execute(Statement::from_sql_and_values(
                    backend,
                    "DELETE FROM goal_contributions WHERE goal_id = ?;",
                    vec![goal_model.id.clone().into()],
                ))
                .await?;

            goal_model.delete(&db_tx).await?;
            self.persist_account_balances(&db_tx, new_balances).await?;
            Ok(())
        })
    }
}
