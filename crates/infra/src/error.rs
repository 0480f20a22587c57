use rust_decimal::Decimal;
use thiserror::Error;

use stockledger_core::{DomainError, ProductId};

use crate::repository::RepositoryError;

/// Caller-facing failure of a ledger operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed input, rejected before any read or write.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: ProductId,
        available: Decimal,
        requested: Decimal,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Domain(DomainError),
}

impl LedgerError {
    pub fn insufficient_stock(
        product_id: ProductId,
        available: Decimal,
        requested: Decimal,
    ) -> Self {
        Self::InsufficientStock {
            product_id,
            available,
            requested,
        }
    }
}

impl From<DomainError> for LedgerError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(errors) => Self::Validation(errors),
            DomainError::InsufficientStock {
                product_id,
                available,
                requested,
            } => Self::InsufficientStock {
                product_id: ProductId::new(product_id),
                available,
                requested,
            },
            other => Self::Domain(other),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn domain_validation_maps_to_ledger_validation() {
        let err = LedgerError::from(DomainError::validation_many(vec![
            "Item 1: product_id is required".to_string(),
            "Item 2: cantidad must be >= 0.01".to_string(),
        ]));
        assert_eq!(
            err.to_string(),
            "validation failed: Item 1: product_id is required; Item 2: cantidad must be >= 0.01"
        );
    }

    #[test]
    fn insufficient_stock_keeps_amounts() {
        let err = LedgerError::from(DomainError::insufficient_stock("P1", dec!(10), dec!(50)));
        assert_eq!(err, LedgerError::insufficient_stock(ProductId::new("P1"), dec!(10), dec!(50)));
    }
}
