//! Transfers API endpoints

use api_types::transfer::{TransferCreated, TransferNew, TransferUpdate, TransferView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};
use engine::{NewTransferCmd, UpdateTransferCmd};

fn view(transfer: engine::Transfer, utc: FixedOffset) -> TransferView {
    TransferView {
        id: transfer.id,
        from_account_id: transfer.from_account_id,
        to_account_id: transfer.to_account_id,
        amount_minor: transfer.amount_minor,
        occurred_at: transfer.occurred_at.with_timezone(&utc),
        description: transfer.description,
        currency: map_currency(transfer.currency),
    }
}

fn utc_offset() -> Result<FixedOffset, ServerError> {
    FixedOffset::east_opt(0).ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let mut cmd = NewTransferCmd::new(
        &user.username,
        payload.from_account_id,
        payload.to_account_id,
        payload.amount_minor,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    let id = state.engine.create_transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransferCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TransferView>>, ServerError> {
    let transfers = state.engine.list_transfers(&user.username, 50).await?;
    let utc = utc_offset()?;
    Ok(Json(
        transfers
            .into_iter()
            .map(|transfer| view(transfer, utc))
            .collect(),
    ))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransferView>, ServerError> {
    let transfer = state.engine.transfer(id, &user.username).await?;
    let utc = utc_offset()?;
    Ok(Json(view(transfer, utc)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransferUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = UpdateTransferCmd::new(&user.username, id);
    if let Some(from_account_id) = payload.from_account_id {
        cmd = cmd.from_account_id(from_account_id);
    }
    if let Some(to_account_id) = payload.to_account_id {
        cmd = cmd.to_account_id(to_account_id);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at.with_timezone(&Utc));
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }

    state.engine.update_transfer(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transfer(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
