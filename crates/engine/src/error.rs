//! The module contains the errors the engine can throw.
//!
//! Validation failures ([`InvalidAmount`], [`InvalidTransfer`]) and lookup
//! failures ([`KeyNotFound`]) are detected before any mutation. A failure in
//! the middle of a write unit surfaces as [`Database`] after the enclosing
//! transaction has rolled back, so no partial effect is ever observable.
//!
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidTransfer`]: EngineError::InvalidTransfer
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid transfer: {0}")]
    InvalidTransfer(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidTransfer(a), Self::InvalidTransfer(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
