//! FIFO batch allocation.
//!
//! Exits consume the earliest-expiring lots first. Allocation is pure: it only
//! computes the per-lot breakdown. Applying the debits (and persisting them) is
//! the caller's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use stockledger_core::{DomainError, DomainResult};

use crate::batch::Batch;
use crate::movement::BatchExit;

/// Result of a FIFO allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Per-lot debits in consumption order.
    pub debits: Vec<BatchExit>,
    /// Quantity the lots could not cover (zero when fully covered).
    pub remaining: Decimal,
}

impl Allocation {
    pub fn allocated(&self) -> Decimal {
        self.debits.iter().map(|d| d.cantidad).sum()
    }

    pub fn is_fully_covered(&self) -> bool {
        self.remaining.is_zero()
    }
}

/// Select lots by ascending expiry (lots without expiry last) and take
/// `min(remaining, available)` from each until `required` is met.
///
/// Lots with nothing available are never selected. Ties keep the older lot first.
pub fn allocate_fifo(batches: &[Batch], required: Decimal) -> Allocation {
    let mut candidates: Vec<&Batch> = batches
        .iter()
        .filter(|b| b.available() > Decimal::ZERO)
        .collect();

    candidates.sort_by_key(|b| {
        (
            b.fecha_vencimiento.is_none(),
            b.fecha_vencimiento,
            b.fecha_creacion,
        )
    });

    let mut remaining = required.max(Decimal::ZERO);
    let mut debits = Vec::new();

    for batch in candidates {
        if remaining.is_zero() {
            break;
        }

        let take = remaining.min(batch.available());
        debits.push(BatchExit {
            batch_id: batch.id,
            lote_numero: batch.lote_numero.clone(),
            cantidad: take,
        });
        remaining -= take;
    }

    Allocation { debits, remaining }
}

/// Apply debits to the lots they reference, returning the modified lots in debit order.
///
/// Fails without partial effects on the returned set if a debit references an unknown
/// lot or exceeds what the lot has available.
pub fn apply_debits(
    batches: &[Batch],
    debits: &[BatchExit],
    now: DateTime<Utc>,
) -> DomainResult<Vec<Batch>> {
    let mut touched: Vec<Batch> = Vec::with_capacity(debits.len());

    for debit in debits {
        let mut batch = batches
            .iter()
            .find(|b| b.id == debit.batch_id)
            .cloned()
            .ok_or_else(|| {
                DomainError::invariant(format!("debit references unknown batch {}", debit.batch_id))
            })?;
        batch.debit(debit.cantidad, now)?;
        touched.push(batch);
    }

    Ok(touched)
}
