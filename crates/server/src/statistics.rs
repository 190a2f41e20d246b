//! Statistics API endpoints

use api_types::stats::Statistic;
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user};

/// Handle requests for user statistics
pub async fn get_stats(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Statistic>, ServerError> {
    let stats = state.engine.user_statistics(&user.username).await?;

    Ok(Json(Statistic {
        balance_minor: stats.balance_minor,
        total_income_minor: stats.total_income_minor,
        total_expense_minor: stats.total_expense_minor,
    }))
}

/// Rebuilds denormalized balances from the ledger.
pub async fn recompute(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.recompute_balances(&user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
