//! Goals API endpoints

use api_types::goal::{GoalCreated, GoalNew, GoalStatus as ApiStatus, GoalUpdate, GoalView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};
use engine::{NewGoalCmd, UpdateGoalCmd};

fn map_status(status: engine::GoalStatus) -> ApiStatus {
    match status {
        engine::GoalStatus::Active => ApiStatus::Active,
        engine::GoalStatus::Completed => ApiStatus::Completed,
        engine::GoalStatus::Paused => ApiStatus::Paused,
    }
}

fn status_from_api(status: ApiStatus) -> engine::GoalStatus {
    match status {
        ApiStatus::Active => engine::GoalStatus::Active,
        ApiStatus::Completed => engine::GoalStatus::Completed,
        ApiStatus::Paused => engine::GoalStatus::Paused,
    }
}

fn view(goal: engine::Goal) -> GoalView {
    GoalView {
        id: goal.id,
        category_id: goal.category_id,
        name: goal.name,
        description: goal.description,
        target_amount_minor: goal.target_amount_minor,
        current_amount_minor: goal.current_amount_minor,
        deadline: goal.deadline,
        status: map_status(goal.status),
        is_completed: goal.is_completed,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<GoalNew>,
) -> Result<(StatusCode, Json<GoalCreated>), ServerError> {
    let mut cmd = NewGoalCmd::new(&user.username, payload.name, payload.target_amount_minor);
    if let Some(current_amount_minor) = payload.current_amount_minor {
        cmd = cmd.current_amount_minor(current_amount_minor);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(deadline) = payload.deadline {
        cmd = cmd.deadline(deadline);
    }

    let id = state.engine.create_goal(cmd).await?;
    Ok((StatusCode::CREATED, Json(GoalCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GoalView>>, ServerError> {
    let goals = state.engine.list_goals(&user.username).await?;
    Ok(Json(goals.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GoalView>, ServerError> {
    let goal = state.engine.goal(id, &user.username).await?;
    Ok(Json(view(goal)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GoalUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = UpdateGoalCmd::new(&user.username, id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(target_amount_minor) = payload.target_amount_minor {
        cmd = cmd.target_amount_minor(target_amount_minor);
    }
    if let Some(deadline) = payload.deadline {
        cmd = cmd.deadline(deadline);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(status) = payload.status {
        cmd = cmd.status(status_from_api(status));
    }

    state.engine.update_goal(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_goal(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
