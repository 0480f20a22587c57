//! Movement journal: the bounded, best-effort audit trail.
//!
//! Every quantity change is appended to a log mirrored under [`MOVEMENTS_KEY`] in the
//! local key-value store. The log keeps the newest `capacity` entries. A failed write
//! is logged and swallowed; the stock snapshot stays the source of truth.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use stockledger_core::{MovementId, ProductId};
use stockledger_events::EventBus;
use stockledger_inventory::{InventoryEvent, Movement, MovementDraft};

use crate::context::OperatorContext;
use crate::store::{KeyValueStore, KvStoreError, load_json, store_json};

pub const MOVEMENTS_KEY: &str = "count_movements";

pub struct MovementJournal<B> {
    store: Arc<dyn KeyValueStore>,
    bus: B,
    capacity: usize,
    // Serializes the read-modify-write of the mirrored log.
    write_lock: Mutex<()>,
}

impl<B> MovementJournal<B>
where
    B: EventBus<InventoryEvent>,
{
    pub fn new(store: Arc<dyn KeyValueStore>, bus: B, capacity: usize) -> Self {
        Self {
            store,
            bus,
            capacity: capacity.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Journal a movement, stamped with a fresh id, the current time and the operator.
    ///
    /// Returns the stored movement, or `None` when persistence failed. The
    /// `MovementRecorded` event is only published for stored movements.
    pub fn append(&self, draft: MovementDraft, context: &OperatorContext) -> Option<Movement> {
        self.append_at(draft, context, Utc::now())
    }

    pub fn append_at(
        &self,
        draft: MovementDraft,
        context: &OperatorContext,
        now: DateTime<Utc>,
    ) -> Option<Movement> {
        let movement = draft.record(
            MovementId::new(),
            now,
            context.user_id,
            context.area_id.clone(),
        );

        if let Err(e) = self.persist(&movement) {
            tracing::error!(
                movement_id = %movement.id,
                product_id = %movement.product_id,
                kind = movement.kind.as_str(),
                error = %e,
                "failed to record movement"
            );
            return None;
        }

        tracing::debug!(
            movement_id = %movement.id,
            product_id = %movement.product_id,
            kind = movement.kind.as_str(),
            "movement recorded"
        );

        if let Err(e) = self.bus.publish(InventoryEvent::MovementRecorded(movement.clone())) {
            tracing::warn!(
                movement_id = %movement.id,
                error = ?e,
                "failed to publish movement event"
            );
        }

        Some(movement)
    }

    fn persist(&self, movement: &Movement) -> Result<(), KvStoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| KvStoreError::Storage("journal lock poisoned".to_string()))?;

        let mut log: Vec<Movement> =
            load_json(self.store.as_ref(), MOVEMENTS_KEY)?.unwrap_or_default();
        log.push(movement.clone());

        if log.len() > self.capacity {
            let overflow = log.len() - self.capacity;
            log.drain(..overflow);
        }

        store_json(self.store.as_ref(), MOVEMENTS_KEY, &log)
    }

    /// The mirrored log, oldest first. Unreadable logs read as empty.
    pub fn recent(&self) -> Vec<Movement> {
        match load_json::<Vec<Movement>>(self.store.as_ref(), MOVEMENTS_KEY) {
            Ok(log) => log.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = MOVEMENTS_KEY, error = %e, "failed to read movement log");
                Vec::new()
            }
        }
    }

    pub fn for_product(&self, product_id: &ProductId) -> Vec<Movement> {
        self.recent()
            .into_iter()
            .filter(|m| &m.product_id == product_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKeyValueStore;
    use rust_decimal::Decimal;
    use stockledger_core::AreaId;
    use stockledger_events::InMemoryEventBus;

    /// A store whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get_raw(&self, _key: &str) -> Result<Option<String>, KvStoreError> {
            Ok(None)
        }

        fn put_raw(&self, _key: &str, _value: String) -> Result<(), KvStoreError> {
            Err(KvStoreError::Storage("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), KvStoreError> {
            Ok(())
        }
    }

    fn draft(product: &str, nueva: i64) -> MovementDraft {
        MovementDraft::count_adjustment(
            ProductId::new(product),
            Decimal::ZERO,
            Decimal::from(nueva),
            None,
        )
    }

    fn context() -> OperatorContext {
        OperatorContext::new(AreaId::new("A1"))
    }

    fn bus() -> Arc<InMemoryEventBus<InventoryEvent>> {
        Arc::new(InMemoryEventBus::new())
    }

    #[test]
    fn append_stamps_context_and_publishes() {
        let bus = bus();
        let sub = bus.subscribe();
        let journal =
            MovementJournal::new(Arc::new(InMemoryKeyValueStore::new()), bus.clone(), 1000);

        let movement = journal.append(draft("P1", 3), &context()).unwrap();

        assert_eq!(movement.area_id, AreaId::new("A1"));
        assert_eq!(journal.recent(), vec![movement.clone()]);
        assert_eq!(sub.drain(), vec![InventoryEvent::MovementRecorded(movement)]);
    }

    #[test]
    fn log_keeps_only_the_newest_entries() {
        let journal = MovementJournal::new(
            Arc::new(InMemoryKeyValueStore::new()),
            bus(),
            1000,
        );

        for n in 0..1001 {
            journal.append(draft("P1", n), &context()).unwrap();
        }

        let log = journal.recent();
        assert_eq!(log.len(), 1000);
        assert_eq!(log[0].cantidad_nueva, Decimal::from(1));
        assert_eq!(log[999].cantidad_nueva, Decimal::from(1000));
    }

    #[test]
    fn persistence_failure_is_swallowed_and_not_published() {
        let bus = bus();
        let sub = bus.subscribe();
        let journal = MovementJournal::new(Arc::new(ReadOnlyStore), bus.clone(), 1000);

        assert!(journal.append(draft("P1", 1), &context()).is_none());
        assert!(sub.drain().is_empty());
    }

    #[test]
    fn for_product_filters_the_log() {
        let journal = MovementJournal::new(
            Arc::new(InMemoryKeyValueStore::new()),
            bus(),
            10,
        );
        journal.append(draft("P1", 1), &context());
        journal.append(draft("P2", 2), &context());
        journal.append(draft("P1", 3), &context());

        let p1 = journal.for_product(&ProductId::new("P1"));
        assert_eq!(p1.len(), 2);
        assert!(p1.iter().all(|m| m.product_id == ProductId::new("P1")));
    }
}
