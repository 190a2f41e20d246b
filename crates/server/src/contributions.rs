//! Goal contributions API endpoints

use api_types::contribution::{ContributionCreated, ContributionNew, ContributionView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::NewContributionCmd;

fn view(contribution: engine::GoalContribution, utc: FixedOffset) -> ContributionView {
    ContributionView {
        id: contribution.id,
        goal_id: contribution.goal_id,
        account_id: contribution.account_id,
        transaction_id: contribution.transaction_id,
        amount_minor: contribution.amount_minor,
        occurred_at: contribution.occurred_at.with_timezone(&utc),
        description: contribution.description,
    }
}

fn utc_offset() -> Result<FixedOffset, ServerError> {
    FixedOffset::east_opt(0).ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ContributionNew>,
) -> Result<(StatusCode, Json<ContributionCreated>), ServerError> {
    let mut cmd = NewContributionCmd::new(
        &user.username,
        payload.goal_id,
        payload.amount_minor,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(transaction_id) = payload.transaction_id {
        cmd = cmd.transaction_id(transaction_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let id = state.engine.add_contribution(cmd).await?;
    Ok((StatusCode::CREATED, Json(ContributionCreated { id })))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContributionView>, ServerError> {
    let contribution = state.engine.contribution(id, &user.username).await?;
    let utc = utc_offset()?;
    Ok(Json(view(contribution, utc)))
}

pub async fn list_for_goal(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<Vec<ContributionView>>, ServerError> {
    let contributions = state
        .engine
        .list_contributions_for_goal(goal_id, &user.username)
        .await?;
    let utc = utc_offset()?;
    Ok(Json(
        contributions
            .into_iter()
            .map(|contribution| view(contribution, utc))
            .collect(),
    ))
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_contribution(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
