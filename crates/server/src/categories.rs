//! Categories API endpoints

use api_types::category::{CategoryArchive, CategoryCreated, CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn view(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        archived: category.archived,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let id = state
        .engine
        .create_category(&user.username, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryCreated { id })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub include_archived: Option<bool>,
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories(&user.username, query.include_archived.unwrap_or(false))
        .await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn set_archived(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryArchive>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_category_archived(id, payload.archived, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
