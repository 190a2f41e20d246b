//! Transactions API endpoints

use api_types::transaction::{
    Recurrence as ApiRecurrence, TransactionCreated, TransactionKind as ApiKind, TransactionList,
    TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{FixedOffset, Utc};
use uuid::Uuid;

use crate::{ServerError, map_currency, server::ServerState, user};
use engine::{NewTransactionCmd, TransactionListFilter, UpdateTransactionCmd};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Income => ApiKind::Income,
        engine::TransactionKind::Expense => ApiKind::Expense,
    }
}

fn kind_from_api(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Income => engine::TransactionKind::Income,
        ApiKind::Expense => engine::TransactionKind::Expense,
    }
}

fn map_recurrence(recurrence: engine::Recurrence) -> ApiRecurrence {
    match recurrence {
        engine::Recurrence::None => ApiRecurrence::None,
        engine::Recurrence::Daily => ApiRecurrence::Daily,
        engine::Recurrence::Weekly => ApiRecurrence::Weekly,
        engine::Recurrence::Monthly => ApiRecurrence::Monthly,
        engine::Recurrence::Yearly => ApiRecurrence::Yearly,
    }
}

fn recurrence_from_api(recurrence: ApiRecurrence) -> engine::Recurrence {
    match recurrence {
        ApiRecurrence::None => engine::Recurrence::None,
        ApiRecurrence::Daily => engine::Recurrence::Daily,
        ApiRecurrence::Weekly => engine::Recurrence::Weekly,
        ApiRecurrence::Monthly => engine::Recurrence::Monthly,
        ApiRecurrence::Yearly => engine::Recurrence::Yearly,
    }
}

fn view(tx: engine::Transaction, utc: FixedOffset) -> TransactionView {
    TransactionView {
        id: tx.id,
        account_id: tx.account_id,
        category_id: tx.category_id,
        kind: map_kind(tx.kind),
        amount_minor: tx.amount_minor,
        occurred_at: tx.occurred_at.with_timezone(&utc),
        description: tx.description,
        payment_method: tx.payment_method,
        recurrence: map_recurrence(tx.recurrence),
        note: tx.note,
        currency: map_currency(tx.currency),
    }
}

fn utc_offset() -> Result<FixedOffset, ServerError> {
    FixedOffset::east_opt(0).ok_or_else(|| ServerError::Generic("invalid UTC offset".to_string()))
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionCreated>), ServerError> {
    let mut cmd = NewTransactionCmd::new(
        &user.username,
        payload.account_id,
        kind_from_api(payload.kind),
        payload.amount_minor,
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(payment_method) = payload.payment_method {
        cmd = cmd.payment_method(payment_method);
    }
    if let Some(recurrence) = payload.recurrence {
        cmd = cmd.recurrence(recurrence_from_api(recurrence));
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let id = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(TransactionCreated { id })))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);
    let filter = TransactionListFilter {
        from: payload.from.map(|dt| dt.with_timezone(&Utc)),
        to: payload.to.map(|dt| dt.with_timezone(&Utc)),
        kinds: payload
            .kinds
            .map(|kinds| kinds.into_iter().map(kind_from_api).collect()),
        account_id: payload.account_id,
        category_id: payload.category_id,
    };

    let (txs, next_cursor) = state
        .engine
        .list_transactions_page(&user.username, limit, payload.cursor.as_deref(), &filter)
        .await?;

    let utc = utc_offset()?;
    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(|tx| view(tx, utc)).collect(),
        next_cursor,
    }))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.username).await?;
    let utc = utc_offset()?;
    Ok(Json(view(tx, utc)))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<StatusCode, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(&user.username, id);
    if let Some(account_id) = payload.account_id {
        cmd = cmd.account_id(account_id);
    }
    if let Some(kind) = payload.kind {
        cmd = cmd.kind(kind_from_api(kind));
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(occurred_at) = payload.occurred_at {
        cmd = cmd.occurred_at(occurred_at.with_timezone(&Utc));
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(payment_method) = payload.payment_method {
        cmd = cmd.payment_method(payment_method);
    }
    if let Some(recurrence) = payload.recurrence {
        cmd = cmd.recurrence(recurrence_from_api(recurrence));
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    state.engine.update_transaction(cmd).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
