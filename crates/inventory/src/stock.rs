use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::{
    AggregateRoot, AreaId, CategoryId, DomainError, DomainResult, InventoryId, ProductId, UserId,
};

/// Identity of a stock snapshot: one record per (product, area) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockKey {
    pub product_id: ProductId,
    pub area_id: AreaId,
}

impl StockKey {
    pub fn new(product_id: ProductId, area_id: AreaId) -> Self {
        Self { product_id, area_id }
    }
}

impl core::fmt::Display for StockKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.product_id, self.area_id)
    }
}

/// Requested change to a snapshot. Unset bounds keep the previous record's values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountUpdate {
    pub cantidad: Decimal,
    pub cantidad_minima: Option<Decimal>,
    pub cantidad_maxima: Option<Decimal>,
    pub categoria_id: Option<CategoryId>,
}

impl CountUpdate {
    pub fn quantity(cantidad: Decimal) -> Self {
        Self {
            cantidad,
            cantidad_minima: None,
            cantidad_maxima: None,
            categoria_id: None,
        }
    }
}

/// Current-quantity snapshot for one product in one storage area.
///
/// Records are created on the first count/entry for a pair and never deleted;
/// only their quantity can reach zero. `cantidad_maxima` is tracked but not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub inventory_id: InventoryId,
    #[serde(flatten)]
    pub key: StockKey,
    pub categoria_id: Option<CategoryId>,
    pub cantidad_actual: Decimal,
    pub cantidad_minima: Decimal,
    pub cantidad_maxima: Decimal,
    pub fecha_actualizacion: DateTime<Utc>,
    pub usuario_id: Option<UserId>,
    /// Persisted write count (0 = never written). Used for optimistic checks.
    pub version: u64,
}

impl StockRecord {
    /// A not-yet-persisted record with zero stock.
    pub fn empty(key: StockKey, categoria_id: Option<CategoryId>, now: DateTime<Utc>) -> Self {
        Self {
            inventory_id: InventoryId::new(),
            key,
            categoria_id,
            cantidad_actual: Decimal::ZERO,
            cantidad_minima: Decimal::ZERO,
            cantidad_maxima: Decimal::ZERO,
            fecha_actualizacion: now,
            usuario_id: None,
            version: 0,
        }
    }

    pub fn product_id(&self) -> &ProductId {
        &self.key.product_id
    }

    pub fn area_id(&self) -> &AreaId {
        &self.key.area_id
    }

    /// Produce the next snapshot for a count update.
    ///
    /// The version is left untouched; the repository bumps it on write.
    pub fn apply_count(
        &self,
        update: &CountUpdate,
        now: DateTime<Utc>,
        user: Option<UserId>,
    ) -> DomainResult<StockRecord> {
        if update.cantidad < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "stock for {} cannot go negative (requested {})",
                self.key, update.cantidad
            )));
        }

        let mut next = self.clone();
        next.cantidad_actual = update.cantidad;
        if let Some(min) = update.cantidad_minima {
            next.cantidad_minima = min;
        }
        if let Some(max) = update.cantidad_maxima {
            next.cantidad_maxima = max;
        }
        if update.categoria_id.is_some() {
            next.categoria_id = update.categoria_id.clone();
        }
        next.fecha_actualizacion = now;
        next.usuario_id = user;
        next.ensure_invariants()?;
        Ok(next)
    }

    /// Check the invariants every persisted record must satisfy.
    pub fn ensure_invariants(&self) -> DomainResult<()> {
        if self.cantidad_actual < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "cantidad_actual for {} is negative",
                self.key
            )));
        }
        if self.cantidad_minima < Decimal::ZERO || self.cantidad_maxima < Decimal::ZERO {
            return Err(DomainError::invariant(format!(
                "bounds for {} must be non-negative",
                self.key
            )));
        }
        Ok(())
    }
}

impl AggregateRoot for StockRecord {
    type Id = StockKey;

    fn id(&self) -> &Self::Id {
        &self.key
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Stock totals for a product across the records that matched a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub product_id: ProductId,
    pub cantidad_actual: Decimal,
    pub cantidad_minima: Decimal,
    pub cantidad_maxima: Decimal,
    pub items_count: usize,
    pub ultima_actualizacion: Option<DateTime<Utc>>,
}

impl StockSummary {
    /// Sum quantities; bounds take the maximum across records.
    pub fn from_records<'a>(
        product_id: ProductId,
        records: impl IntoIterator<Item = &'a StockRecord>,
    ) -> Self {
        let mut summary = Self {
            product_id,
            cantidad_actual: Decimal::ZERO,
            cantidad_minima: Decimal::ZERO,
            cantidad_maxima: Decimal::ZERO,
            items_count: 0,
            ultima_actualizacion: None,
        };

        for record in records {
            summary.cantidad_actual += record.cantidad_actual;
            summary.cantidad_minima = summary.cantidad_minima.max(record.cantidad_minima);
            summary.cantidad_maxima = summary.cantidad_maxima.max(record.cantidad_maxima);
            summary.items_count += 1;
            if summary
                .ultima_actualizacion
                .is_none_or(|last| record.fecha_actualizacion > last)
            {
                summary.ultima_actualizacion = Some(record.fecha_actualizacion);
            }
        }

        summary
    }
}
