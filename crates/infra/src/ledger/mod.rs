//! Stock ledger service: counts, entries and exits.
//!
//! Every mutation follows the same path:
//! validate -> lock (product, area) -> read snapshot -> resolve and persist lot
//! changes -> write snapshot with an exact-version check -> journal -> alerts.
//!
//! Lot writes go first. If the snapshot write then fails, they are put back, so a
//! rejected operation leaves lots and snapshot as they were.
//!
//! Items of one entry/exit call run strictly in order. The first failure aborts the
//! call; items already applied stay applied.

mod query;

pub use query::{InventoryLine, ProductStock};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use stockledger_core::{AggregateRoot, BatchId, ExpectedVersion, ProductId};
use stockledger_events::EventBus;
use stockledger_inventory::{
    Batch, BatchExit, BatchInfo, CountOutcome, CountRequest, CountUpdate, EntryRequest,
    ExitRequest, InventoryCommand, InventoryEvent, ItemOutcome, MovementDraft, StockKey,
    StockOperationRegistered, StockRecord, allocate_fifo, apply_debits, next_lot_number,
    validate_count, validate_entry, validate_exit,
};

use crate::alerts::{AlertEngine, MessageDisplay, TracingDisplay};
use crate::config::InventorySettings;
use crate::context::OperatorContext;
use crate::error::{LedgerError, LedgerResult};
use crate::journal::MovementJournal;
use crate::locks::KeyedLocks;
use crate::repository::{
    BatchFilter, BatchRepository, InMemoryBatchRepository, InMemoryInventoryRepository,
    InventoryRepository,
};
use crate::store::{InMemoryKeyValueStore, KeyValueStore};

/// External collaborators the ledger is built from.
#[derive(Clone)]
pub struct LedgerPorts {
    pub inventory: Arc<dyn InventoryRepository>,
    pub batches: Arc<dyn BatchRepository>,
    pub store: Arc<dyn KeyValueStore>,
    pub display: Arc<dyn MessageDisplay>,
}

impl LedgerPorts {
    /// In-memory repositories and store, alerts written to the log.
    pub fn in_memory() -> Self {
        Self {
            inventory: Arc::new(InMemoryInventoryRepository::new()),
            batches: Arc::new(InMemoryBatchRepository::new()),
            store: Arc::new(InMemoryKeyValueStore::new()),
            display: Arc::new(TracingDisplay),
        }
    }
}

/// Result of [`StockLedger::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    Count(CountOutcome),
    Entry(Vec<ItemOutcome>),
    Exit(Vec<ItemOutcome>),
}

/// How lot info meets an existing lot with the same number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LotMode {
    /// Received goods add to the lot.
    TopUp,
    /// A count sets the lot to the counted quantity.
    Recount,
}

/// A lot write made ahead of the snapshot write.
#[derive(Debug)]
enum LotUndo {
    Restore(Batch),
    Remove(BatchId),
}

pub struct StockLedger<B> {
    inventory: Arc<dyn InventoryRepository>,
    batches: Arc<dyn BatchRepository>,
    journal: MovementJournal<B>,
    alerts: AlertEngine<B>,
    bus: B,
    locks: KeyedLocks<StockKey>,
    context: OperatorContext,
    settings: InventorySettings,
}

impl<B> StockLedger<B>
where
    B: EventBus<InventoryEvent> + Clone,
{
    /// Build a ledger, reading threshold overrides from `ports.store`.
    pub fn new(ports: LedgerPorts, bus: B, context: OperatorContext) -> Self {
        let settings = InventorySettings::load(ports.store.as_ref());
        Self::with_settings(ports, bus, context, settings)
    }

    pub fn with_settings(
        ports: LedgerPorts,
        bus: B,
        context: OperatorContext,
        settings: InventorySettings,
    ) -> Self {
        tracing::info!(
            area_id = %context.area_id,
            critical = %settings.thresholds.critical,
            journal_capacity = settings.journal_capacity,
            "stock ledger initialised"
        );

        Self {
            inventory: ports.inventory,
            batches: ports.batches,
            journal: MovementJournal::new(ports.store, bus.clone(), settings.journal_capacity),
            alerts: AlertEngine::new(&settings, ports.display, bus.clone()),
            bus,
            locks: KeyedLocks::new(),
            context,
            settings,
        }
    }

    pub fn context(&self) -> &OperatorContext {
        &self.context
    }

    pub fn settings(&self) -> &InventorySettings {
        &self.settings
    }

    pub fn journal(&self) -> &MovementJournal<B> {
        &self.journal
    }

    pub fn alerts(&self) -> &AlertEngine<B> {
        &self.alerts
    }

    /// Dispatch a tagged command to its operation.
    pub async fn execute(&self, command: InventoryCommand) -> LedgerResult<CommandOutcome> {
        tracing::debug!(command = command.name(), "executing inventory command");
        command.validate()?;

        match command {
            InventoryCommand::UpdateCount {
                product_id,
                request,
            } => self
                .count_validated(&product_id, request)
                .await
                .map(CommandOutcome::Count),
            InventoryCommand::RegisterEntry(request) => self
                .entry_validated(request)
                .await
                .map(CommandOutcome::Entry),
            InventoryCommand::RegisterExit(request) => {
                self.exit_validated(request).await.map(CommandOutcome::Exit)
            }
        }
    }

    /// Set the quantity of one product outright.
    ///
    /// Unset bounds keep the previous record's values. A `batch_info` creates a lot
    /// linked to the written record, or sets the lot with the same number to the
    /// counted quantity.
    pub async fn update_count(
        &self,
        product_id: &ProductId,
        request: CountRequest,
    ) -> LedgerResult<CountOutcome> {
        validate_count(product_id, &request)?;
        self.count_validated(product_id, request).await
    }

    /// Receive goods. Each item adds to its product's stock in the request's area.
    pub async fn register_entry(&self, request: EntryRequest) -> LedgerResult<Vec<ItemOutcome>> {
        validate_entry(&request)?;
        self.entry_validated(request).await
    }

    /// Dispatch goods. Each item is checked against the snapshot, then consumed from
    /// its lots earliest-expiry first.
    pub async fn register_exit(&self, request: ExitRequest) -> LedgerResult<Vec<ItemOutcome>> {
        validate_exit(&request)?;
        self.exit_validated(request).await
    }

    async fn count_validated(
        &self,
        product_id: &ProductId,
        request: CountRequest,
    ) -> LedgerResult<CountOutcome> {
        let key = StockKey::new(
            product_id.clone(),
            self.context.area_or_default(request.area_id.as_ref()),
        );
        let _guard = self.locks.lock(&key).await;

        let current = self.inventory.find(&key).await?;
        let update = CountUpdate {
            cantidad: request.cantidad,
            cantidad_minima: request.cantidad_minima,
            cantidad_maxima: request.cantidad_maxima,
            categoria_id: self.context.category_or_default(request.categoria_id.as_ref()),
        };
        let lot = request
            .batch_info
            .map(|info| (info.with_default_quantity(request.cantidad), LotMode::Recount));

        self.apply_count(&key, current, update, lot, Vec::new(), request.motivo.as_deref())
            .await
    }

    async fn entry_validated(&self, request: EntryRequest) -> LedgerResult<Vec<ItemOutcome>> {
        let area_id = self.context.area_or_default(request.area_id.as_ref());
        let categoria_id = self.context.category_or_default(request.categoria_id.as_ref());
        let mut outcomes = Vec::with_capacity(request.items.len());

        for item in &request.items {
            let key = StockKey::new(item.product_id.clone(), area_id.clone());
            let _guard = self.locks.lock(&key).await;

            let current = self.inventory.find(&key).await?;
            let anterior = current.as_ref().map_or(Decimal::ZERO, |r| r.cantidad_actual);
            let nueva = anterior + item.cantidad;

            let update = CountUpdate {
                cantidad: nueva,
                categoria_id: categoria_id.clone(),
                ..CountUpdate::quantity(nueva)
            };
            let lot = item
                .batch_info
                .clone()
                .map(|info| (info.with_default_quantity(item.cantidad), LotMode::TopUp));

            let result = self
                .apply_count(&key, current, update, lot, Vec::new(), None)
                .await?;

            self.journal.append(
                MovementDraft::entry(
                    item.product_id.clone(),
                    anterior,
                    item.cantidad,
                    request.motivo.as_deref(),
                    request.documento_referencia.clone(),
                )
                .in_area(key.area_id.clone()),
                &self.context,
            );

            tracing::info!(
                product_id = %item.product_id,
                area_id = %key.area_id,
                cantidad = %item.cantidad,
                cantidad_nueva = %nueva,
                "entry applied"
            );

            outcomes.push(ItemOutcome {
                product_id: item.product_id.clone(),
                cantidad_anterior: anterior,
                cantidad_nueva: nueva,
                batch_exits: Vec::new(),
                result,
            });
        }

        self.publish(InventoryEvent::EntryRegistered(StockOperationRegistered {
            motivo: request.motivo,
            documento_referencia: request.documento_referencia,
            items: outcomes.clone(),
            occurred_at: Utc::now(),
        }));

        Ok(outcomes)
    }

    async fn exit_validated(&self, request: ExitRequest) -> LedgerResult<Vec<ItemOutcome>> {
        let area_id = self.context.area_or_default(request.area_id.as_ref());
        let categoria_id = self.context.category_or_default(request.categoria_id.as_ref());
        let mut outcomes = Vec::with_capacity(request.items.len());

        for item in &request.items {
            let key = StockKey::new(item.product_id.clone(), area_id.clone());
            let _guard = self.locks.lock(&key).await;

            let current = self.inventory.find(&key).await?;
            let anterior = current.as_ref().map_or(Decimal::ZERO, |r| r.cantidad_actual);
            if anterior < item.cantidad {
                tracing::warn!(
                    product_id = %item.product_id,
                    area_id = %key.area_id,
                    available = %anterior,
                    requested = %item.cantidad,
                    "exit rejected: insufficient stock"
                );
                return Err(LedgerError::insufficient_stock(
                    item.product_id.clone(),
                    anterior,
                    item.cantidad,
                ));
            }
            let nueva = anterior - item.cantidad;

            let (batch_exits, debited) = match &current {
                Some(record) => self.consume_batches(record, item.cantidad).await?,
                None => (Vec::new(), Vec::new()),
            };

            let update = CountUpdate {
                cantidad: nueva,
                categoria_id: categoria_id.clone(),
                ..CountUpdate::quantity(nueva)
            };
            let result = self
                .apply_count(&key, current, update, None, debited, None)
                .await?;

            self.journal.append(
                MovementDraft::exit(
                    item.product_id.clone(),
                    anterior,
                    item.cantidad,
                    request.motivo.as_deref(),
                    request.documento_referencia.clone(),
                    batch_exits.clone(),
                )
                .in_area(key.area_id.clone()),
                &self.context,
            );

            tracing::info!(
                product_id = %item.product_id,
                area_id = %key.area_id,
                cantidad = %item.cantidad,
                cantidad_nueva = %nueva,
                lots = batch_exits.len(),
                "exit applied"
            );

            outcomes.push(ItemOutcome {
                product_id: item.product_id.clone(),
                cantidad_anterior: anterior,
                cantidad_nueva: nueva,
                batch_exits,
                result,
            });
        }

        self.publish(InventoryEvent::ExitRegistered(StockOperationRegistered {
            motivo: request.motivo,
            documento_referencia: request.documento_referencia,
            items: outcomes.clone(),
            occurred_at: Utc::now(),
        }));

        Ok(outcomes)
    }

    /// Allocate `cantidad` over the record's active lots and persist the debits.
    ///
    /// Returns the breakdown and the undo entries for the saved lots. A failed save
    /// puts back the lots saved before it.
    async fn consume_batches(
        &self,
        record: &StockRecord,
        cantidad: Decimal,
    ) -> LedgerResult<(Vec<BatchExit>, Vec<LotUndo>)> {
        let active = self
            .batches
            .find_all(&BatchFilter::active_for_inventory(record.inventory_id))
            .await?;

        let allocation = allocate_fifo(&active, cantidad);
        if !allocation.is_fully_covered() {
            tracing::warn!(
                product_id = %record.product_id(),
                area_id = %record.area_id(),
                uncovered = %allocation.remaining,
                "lots do not cover the exit; snapshot quantity prevails"
            );
        }

        let debited = apply_debits(&active, &allocation.debits, Utc::now())?;
        let mut written = Vec::with_capacity(debited.len());
        for batch in debited {
            let original = active.iter().find(|b| b.id == batch.id).cloned();
            if let Err(e) = self.batches.save(batch).await {
                self.undo_lot_writes(written).await;
                return Err(e.into());
            }
            written.extend(original.map(LotUndo::Restore));
        }

        Ok((allocation.debits, written))
    }

    /// Write the next snapshot and run the post-write steps. Caller holds the key lock.
    ///
    /// `written` holds lot writes already made for this mutation. They are undone,
    /// together with any lot written here, when the snapshot is not written.
    async fn apply_count(
        &self,
        key: &StockKey,
        current: Option<StockRecord>,
        update: CountUpdate,
        lot: Option<(BatchInfo, LotMode)>,
        mut written: Vec<LotUndo>,
        motivo: Option<&str>,
    ) -> LedgerResult<CountOutcome> {
        let now = Utc::now();
        let previous = current
            .unwrap_or_else(|| StockRecord::empty(key.clone(), update.categoria_id.clone(), now));

        let (record, batch) = match self
            .write_snapshot(&previous, &update, lot, &mut written, now)
            .await
        {
            Ok(written_snapshot) => written_snapshot,
            Err(e) => {
                self.undo_lot_writes(written).await;
                return Err(e);
            }
        };

        self.journal.append(
            MovementDraft::count_adjustment(
                key.product_id.clone(),
                previous.cantidad_actual,
                record.cantidad_actual,
                motivo,
            )
            .in_area(key.area_id.clone()),
            &self.context,
        );

        self.alerts.evaluate(&record);

        Ok(CountOutcome { record, batch })
    }

    async fn write_snapshot(
        &self,
        previous: &StockRecord,
        update: &CountUpdate,
        lot: Option<(BatchInfo, LotMode)>,
        written: &mut Vec<LotUndo>,
        now: DateTime<Utc>,
    ) -> LedgerResult<(StockRecord, Option<Batch>)> {
        let next = previous.apply_count(update, now, self.context.user_id)?;

        let batch = match lot {
            Some((info, mode)) => {
                Some(self.create_or_update_batch(&next, info, mode, written, now).await?)
            }
            None => None,
        };

        let record = self
            .inventory
            .create_or_update(next, ExpectedVersion::Exact(previous.version()))
            .await?;

        Ok((record, batch))
    }

    /// Create a lot for `record`, or update the lot with the same number per `mode`.
    ///
    /// Lots without a number get one past the product's highest numeric lot.
    async fn create_or_update_batch(
        &self,
        record: &StockRecord,
        info: BatchInfo,
        mode: LotMode,
        written: &mut Vec<LotUndo>,
        now: DateTime<Utc>,
    ) -> LedgerResult<Batch> {
        let cantidad = info.cantidad.unwrap_or(Decimal::ZERO);

        let lote_numero = match info.lot_number() {
            Some(number) => number.to_string(),
            None => self.next_lot_number(record.product_id()).await,
        };

        let existing = self
            .batches
            .find_all(&BatchFilter {
                inventory_id: Some(record.inventory_id),
                ..BatchFilter::default()
            })
            .await?
            .into_iter()
            .find(|b| b.lote_numero == lote_numero);

        let (batch, undo) = match existing {
            Some(original) => {
                let mut batch = original.clone();
                match mode {
                    LotMode::TopUp => batch.restock(cantidad, info.fecha_vencimiento, now)?,
                    LotMode::Recount => batch.recount(cantidad, info.fecha_vencimiento, now)?,
                }
                (batch, LotUndo::Restore(original))
            }
            None => {
                let batch = Batch::new(
                    record.inventory_id,
                    record.product_id().clone(),
                    record.area_id().clone(),
                    lote_numero,
                    info.fecha_vencimiento,
                    cantidad,
                    now,
                )?;
                let id = batch.id;
                (batch, LotUndo::Remove(id))
            }
        };

        let saved = self.batches.save(batch).await?;
        written.push(undo);
        tracing::debug!(
            product_id = %saved.product_id,
            lote_numero = %saved.lote_numero,
            cantidad_lote = %saved.cantidad_lote,
            "lot saved"
        );
        Ok(saved)
    }

    /// Put back lot writes in reverse order. Failures are logged and skipped.
    async fn undo_lot_writes(&self, written: Vec<LotUndo>) {
        for undo in written.into_iter().rev() {
            let result = match &undo {
                LotUndo::Restore(batch) => self.batches.save(batch.clone()).await.map(drop),
                LotUndo::Remove(id) => self.batches.delete(id).await,
            };
            match result {
                Ok(()) => tracing::debug!(undo = ?undo, "lot write undone"),
                Err(e) => tracing::error!(
                    undo = ?undo,
                    error = %e,
                    "failed to undo lot write; lots and snapshot may disagree"
                ),
            }
        }
    }

    async fn next_lot_number(&self, product_id: &ProductId) -> String {
        let lookup = self
            .batches
            .find_all(&BatchFilter::for_product(product_id.clone()))
            .await;

        match lookup {
            Ok(batches) => next_lot_number(batches.iter().map(|b| b.lote_numero.as_str())),
            Err(e) => {
                tracing::warn!(
                    product_id = %product_id,
                    error = %e,
                    "lot lookup failed; numbering from 1"
                );
                "1".to_string()
            }
        }
    }

    fn publish(&self, event: InventoryEvent) {
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!(error = ?e, "failed to publish inventory event");
        }
    }
}
