//! Persistence ports for stock records and lots.
//!
//! The ledger depends only on these contracts. Backends (IndexedDB bridges, SQL,
//! remote sync) live outside this workspace; the in-memory adapters here serve
//! tests and single-process embedding.

pub mod in_memory;

use chrono::NaiveDate;
use thiserror::Error;

use stockledger_core::{AreaId, CategoryId, ExpectedVersion, InventoryId, ProductId};
use stockledger_inventory::{Batch, BatchStatus, StockKey, StockRecord};

pub use in_memory::{InMemoryBatchRepository, InMemoryInventoryRepository};

/// Repository operation error. Propagated to callers unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// Optimistic version check failed; someone else wrote the record first.
    #[error("optimistic concurrency check failed: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    /// The record violates an invariant the store enforces.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Opaque backend failure.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Stock record query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockFilter {
    pub product_id: Option<ProductId>,
    pub area_id: Option<AreaId>,
    pub categoria_id: Option<CategoryId>,
}

impl StockFilter {
    pub fn for_key(key: &StockKey) -> Self {
        Self {
            product_id: Some(key.product_id.clone()),
            area_id: Some(key.area_id.clone()),
            categoria_id: None,
        }
    }

    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        self.product_id.as_ref().is_none_or(|p| &record.key.product_id == p)
            && self.area_id.as_ref().is_none_or(|a| &record.key.area_id == a)
            && self
                .categoria_id
                .as_ref()
                .is_none_or(|c| record.categoria_id.as_ref() == Some(c))
    }
}

/// Lot query. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    pub product_id: Option<ProductId>,
    pub inventory_id: Option<InventoryId>,
    pub area_id: Option<AreaId>,
    pub estado: Option<BatchStatus>,
    /// Only lots with an expiry date on or before this day.
    pub expires_on_or_before: Option<NaiveDate>,
}

impl BatchFilter {
    pub fn for_product(product_id: ProductId) -> Self {
        Self {
            product_id: Some(product_id),
            ..Self::default()
        }
    }

    pub fn active_for_inventory(inventory_id: InventoryId) -> Self {
        Self {
            inventory_id: Some(inventory_id),
            estado: Some(BatchStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, batch: &Batch) -> bool {
        self.product_id.as_ref().is_none_or(|p| &batch.product_id == p)
            && self.inventory_id.is_none_or(|i| batch.inventory_id == i)
            && self.area_id.as_ref().is_none_or(|a| &batch.area_id == a)
            && self.estado.is_none_or(|s| batch.estado == s)
            && self
                .expires_on_or_before
                .is_none_or(|cutoff| batch.fecha_vencimiento.is_some_and(|d| d <= cutoff))
    }
}

/// Persistence for stock snapshots.
#[async_trait::async_trait]
pub trait InventoryRepository: Send + Sync {
    async fn find_all(&self, filter: &StockFilter) -> Result<Vec<StockRecord>, RepositoryError>;

    /// Insert or replace the record for its (product, area) key.
    ///
    /// The stored version must match `expected`; the returned record carries the
    /// bumped version.
    async fn create_or_update(
        &self,
        record: StockRecord,
        expected: ExpectedVersion,
    ) -> Result<StockRecord, RepositoryError>;

    async fn delete(&self, key: &StockKey) -> Result<(), RepositoryError>;

    /// The record for one (product, area) pair, if it exists.
    async fn find(&self, key: &StockKey) -> Result<Option<StockRecord>, RepositoryError> {
        let mut found = self.find_all(&StockFilter::for_key(key)).await?;
        Ok(found.pop())
    }
}

/// Persistence for lots.
#[async_trait::async_trait]
pub trait BatchRepository: Send + Sync {
    async fn find_all(&self, filter: &BatchFilter) -> Result<Vec<Batch>, RepositoryError>;

    /// Insert or replace a lot by id.
    async fn save(&self, batch: Batch) -> Result<Batch, RepositoryError>;

    async fn delete(&self, id: &stockledger_core::BatchId) -> Result<(), RepositoryError>;
}
