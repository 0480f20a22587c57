//! Domain error model.

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Persistence failures belong to the infra layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more fields failed validation. Messages are accumulated so the
    /// caller sees every problem at once.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An exit asked for more units than are on hand.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: Decimal,
        requested: Decimal,
    },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    pub fn validation_many(errors: Vec<String>) -> Self {
        Self::Validation(errors)
    }

    pub fn insufficient_stock(
        product_id: impl Into<String>,
        available: Decimal,
        requested: Decimal,
    ) -> Self {
        Self::InsufficientStock {
            product_id: product_id.into(),
            available,
            requested,
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Accumulated validation messages, if this is a validation error.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display_joins_all_messages() {
        let err = DomainError::validation_many(vec![
            "Item 1: product_id is required".to_string(),
            "Item 2: cantidad must be >= 0.01".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: Item 1: product_id is required; Item 2: cantidad must be >= 0.01"
        );
        assert_eq!(err.validation_errors().map(|e| e.len()), Some(2));
    }

    #[test]
    fn insufficient_stock_reports_amounts() {
        let err = DomainError::insufficient_stock("P1", Decimal::from(10), Decimal::from(50));
        assert_eq!(
            err.to_string(),
            "insufficient stock for product P1: available 10, requested 50"
        );
        assert!(err.validation_errors().is_none());
    }
}
