//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{Currency, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a currency code stored in the DB into a strongly typed `Currency`.
pub(crate) fn model_currency(value: &str) -> ResultEngine<Currency> {
    Currency::try_from(value)
        .map_err(|_| EngineError::InvalidAmount(format!("invalid currency: {value}")))
}

/// Ensure a stored currency matches the account currency.
pub(crate) fn ensure_same_currency(expected: Currency, actual: Currency) -> ResultEngine<()> {
    if expected != actual {
        return Err(EngineError::CurrencyMismatch(format!(
            "account currency is {}, got {}",
            expected.code(),
            actual.code()
        )));
    }
    Ok(())
}

/// Normalized dedup key for user-facing names (categories).
///
/// NFKC-normalizes, lowercases and collapses inner whitespace so "Café " and
/// "cafe\u{0301}" map to the same key.
pub(crate) fn normalize_name_key(value: &str) -> String {
    let normalized: String = value.trim().nfkc().collect();
    normalized
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_key_folds_case_and_whitespace() {
        assert_eq!(normalize_name_key("  Groceries  "), "groceries");
        assert_eq!(normalize_name_key("Eating   Out"), "eating out");
    }

    #[test]
    fn normalize_name_key_applies_nfkc() {
        // Combining acute accent vs precomposed e-acute.
        assert_eq!(normalize_name_key("Cafe\u{0301}"), "café");
    }
}
