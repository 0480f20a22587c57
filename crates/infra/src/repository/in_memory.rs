use std::collections::HashMap;
use std::sync::RwLock;

use stockledger_core::{AggregateRoot, BatchId, Entity, ExpectedVersion};
use stockledger_inventory::{Batch, StockKey, StockRecord};

use super::{BatchFilter, BatchRepository, InventoryRepository, RepositoryError, StockFilter};

fn poisoned() -> RepositoryError {
    RepositoryError::Storage("lock poisoned".to_string())
}

/// In-memory stock record store with optimistic version checks.
#[derive(Debug, Default)]
pub struct InMemoryInventoryRepository {
    records: RwLock<HashMap<StockKey, StockRecord>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn find_all(&self, filter: &StockFilter) -> Result<Vec<StockRecord>, RepositoryError> {
        let records = self.records.read().map_err(|_| poisoned())?;

        let mut found: Vec<StockRecord> = records
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        // Deterministic listing order.
        found.sort_by(|a, b| {
            (&a.key.product_id, &a.key.area_id).cmp(&(&b.key.product_id, &b.key.area_id))
        });
        Ok(found)
    }

    async fn create_or_update(
        &self,
        mut record: StockRecord,
        expected: ExpectedVersion,
    ) -> Result<StockRecord, RepositoryError> {
        record
            .ensure_invariants()
            .map_err(|e| RepositoryError::InvalidRecord(e.to_string()))?;

        let mut records = self.records.write().map_err(|_| poisoned())?;

        let current = records.get(record.id()).map(|r| r.version()).unwrap_or(0);
        if !expected.matches(current) {
            return Err(RepositoryError::Conflict(format!(
                "{}: expected {expected:?}, found {current}",
                record.key
            )));
        }

        record.version = current + 1;
        records.insert(record.key.clone(), record.clone());
        Ok(record)
    }

    async fn delete(&self, key: &StockKey) -> Result<(), RepositoryError> {
        let mut records = self.records.write().map_err(|_| poisoned())?;
        records
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(key.to_string()))
    }
}

/// In-memory lot store.
#[derive(Debug, Default)]
pub struct InMemoryBatchRepository {
    batches: RwLock<HashMap<BatchId, Batch>>,
}

impl InMemoryBatchRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BatchRepository for InMemoryBatchRepository {
    async fn find_all(&self, filter: &BatchFilter) -> Result<Vec<Batch>, RepositoryError> {
        let batches = self.batches.read().map_err(|_| poisoned())?;

        let mut found: Vec<Batch> = batches
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        found.sort_by_key(|b| b.fecha_creacion);
        Ok(found)
    }

    async fn save(&self, batch: Batch) -> Result<Batch, RepositoryError> {
        if batch.cantidad_lote < rust_decimal::Decimal::ZERO {
            return Err(RepositoryError::InvalidRecord(format!(
                "batch {} has negative quantity",
                batch.lote_numero
            )));
        }

        let mut batches = self.batches.write().map_err(|_| poisoned())?;
        batches.insert(*batch.id(), batch.clone());
        Ok(batch)
    }

    async fn delete(&self, id: &BatchId) -> Result<(), RepositoryError> {
        let mut batches = self.batches.write().map_err(|_| poisoned())?;
        batches
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}
