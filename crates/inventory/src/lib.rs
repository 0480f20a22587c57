//! Stock-tracking domain.
//!
//! This crate contains the business rules for stock snapshots, lots, FIFO
//! consumption, alert classification and audit movements, implemented purely as
//! deterministic domain logic (no IO, no async, no storage).

pub mod alert;
pub mod allocation;
pub mod batch;
pub mod event;
pub mod expiry;
pub mod movement;
pub mod request;
pub mod stock;
pub mod validation;

pub use alert::{
    Alert, AlertKind, AlertLevel, CountStatus, StockThresholds, classify_stock, count_status,
};
pub use allocation::{Allocation, allocate_fifo, apply_debits};
pub use batch::{Batch, BatchInfo, BatchStatus, BatchView, next_lot_number};
pub use event::{
    CountOutcome, InventoryEvent, ItemOutcome, StockAlertRaised, StockOperationRegistered,
};
pub use expiry::{ExpiryStatus, ExpiryWindows, classify_expiry, days_until_expiry};
pub use movement::{BatchExit, Movement, MovementDraft, MovementKind};
pub use request::{CountRequest, EntryRequest, ExitRequest, InventoryCommand, StockItem};
pub use stock::{CountUpdate, StockKey, StockRecord, StockSummary};
pub use validation::{MIN_ITEM_QUANTITY, validate_count, validate_entry, validate_exit};
