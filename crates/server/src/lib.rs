use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod accounts;
mod categories;
mod contributions;
mod goals;
mod server;
mod statistics;
mod transactions;
mod transfers;
mod user;

pub mod types {
    pub mod account {
        pub use api_types::account::{
            AccountActive, AccountCreated, AccountKind, AccountNew, AccountUpdate, AccountView,
        };
    }

    pub mod category {
        pub use api_types::category::{CategoryArchive, CategoryCreated, CategoryNew, CategoryView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            Recurrence, TransactionCreated, TransactionKind, TransactionList,
            TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView,
        };
    }

    pub mod transfer {
        pub use api_types::transfer::{TransferCreated, TransferNew, TransferUpdate, TransferView};
    }

    pub mod goal {
        pub use api_types::goal::{GoalCreated, GoalNew, GoalStatus, GoalUpdate, GoalView};
    }

    pub mod contribution {
        pub use api_types::contribution::{ContributionCreated, ContributionNew, ContributionView};
    }

    pub mod stats {
        pub use api_types::stats::Statistic;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientFunds(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidTransfer(_)
        | EngineError::InvalidId(_)
        | EngineError::CurrencyMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

pub(crate) fn map_currency(currency: engine::Currency) -> api_types::Currency {
    match currency {
        engine::Currency::Eur => api_types::Currency::Eur,
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Gbp => api_types::Currency::Gbp,
    }
}

pub(crate) fn currency_from_api(currency: api_types::Currency) -> engine::Currency {
    match currency {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Gbp => engine::Currency::Gbp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let err = EngineError::KeyNotFound("account not exists".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_existing_key_maps_to_409() {
        let err = EngineError::ExistingKey("Checking".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_insufficient_funds_maps_to_422() {
        let err = EngineError::InsufficientFunds("insufficient balance".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_invalid_transfer_maps_to_422() {
        let err = EngineError::InvalidTransfer("from and to must differ".to_string());
        assert_eq!(status_for_engine_error(&err), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_error_message_is_masked() {
        let err = EngineError::Database(sea_orm::DbErr::Custom("boom".to_string()));
        assert_eq!(message_for_engine_error(err), "internal server error");
    }
}
