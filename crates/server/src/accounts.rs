//! Accounts API endpoints

use api_types::account::{
    AccountActive, AccountCreated, AccountKind as ApiKind, AccountNew, AccountUpdate, AccountView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, currency_from_api, map_currency, server::ServerState, user};
use engine::{NewAccountCmd, UpdateAccountCmd};

fn map_kind(kind: engine::AccountKind) -> ApiKind {
    match kind {
        engine::AccountKind::Checking => ApiKind::Checking,
        engine::AccountKind::Savings => ApiKind::Savings,
        engine::AccountKind::Wallet => ApiKind::Wallet,
        engine::AccountKind::CreditCard => ApiKind::CreditCard,
    }
}

fn kind_from_api(kind: ApiKind) -> engine::AccountKind {
    match kind {
        ApiKind::Checking => engine::AccountKind::Checking,
        ApiKind::Savings => engine::AccountKind::Savings,
        ApiKind::Wallet => engine::AccountKind::Wallet,
        ApiKind::CreditCard => engine::AccountKind::CreditCard,
    }
}

fn view(account: engine::Account) -> AccountView {
    AccountView {
        id: account.id,
        name: account.name,
        kind: map_kind(account.kind),
        institution: account.institution,
        initial_balance_minor: account.initial_balance,
        current_balance_minor: account.current_balance,
        currency: map_currency(account.currency),
        color: account.color,
        active: account.active,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountNew>,
) -> Result<(StatusCode, Json<AccountCreated>), ServerError> {
    let mut cmd = NewAccountCmd::new(
        &user.username,
        payload.name,
        kind_from_api(payload.kind),
        payload.initial_balance_minor,
    );
    if let Some(currency) = payload.currency {
        cmd = cmd.currency(currency_from_api(currency));
    }
    if let Some(institution) = payload.institution {
        cmd = cmd.institution(institution);
    }
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }

    let id = state.engine.create_account(cmd).await?;
    Ok((StatusCode::CREATED, Json(AccountCreated { id })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub include_inactive: Option<bool>,
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AccountView>>, ServerError> {
    let accounts = state
        .engine
        .list_accounts(&user.username, query.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(accounts.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountView>, ServerError> {
    let account = state.engine.account(id, &user.username).await?;
    Ok(Json(view(account)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = UpdateAccountCmd::new(&user.username, id);
    if let Some(name) = payload.name {
        cmd = cmd.name(name);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(kind_from_api(kind));
    }
    if let Some(institution) = payload.institution {
        cmd = cmd.institution(institution);
    }
    if let Some(color) = payload.color {
        cmd = cmd.color(color);
    }

    state.engine.update_account(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn set_active(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountActive>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .set_account_active(id, payload.active, &user.username)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_account(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
