//! Value object trait: equality by value, not identity.
//!
//! Alerts, batch debits and threshold sets are value objects: two instances with
//! the same fields are interchangeable, and none of them is ever mutated in place.

/// Marker trait for value objects.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq)]
/// struct BatchExit { batch_id: BatchId, cantidad: Decimal }
///
/// impl ValueObject for BatchExit {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
