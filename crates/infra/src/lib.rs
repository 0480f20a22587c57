//! Infrastructure layer: persistence ports, local storage, configuration, and the
//! stock ledger service that orchestrates the pure inventory domain.

pub mod alerts;
pub mod config;
pub mod context;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod locks;
pub mod repository;
pub mod store;

pub use alerts::{
    AlertEngine, CooldownCache, DisplayError, MessageDisplay, Severity, TracingDisplay,
};
pub use config::{InventorySettings, THRESHOLDS_KEY, load_thresholds};
pub use context::OperatorContext;
pub use error::{LedgerError, LedgerResult};
pub use journal::{MOVEMENTS_KEY, MovementJournal};
pub use ledger::{CommandOutcome, InventoryLine, LedgerPorts, ProductStock, StockLedger};
pub use locks::KeyedLocks;
pub use repository::{
    BatchFilter, BatchRepository, InMemoryBatchRepository, InMemoryInventoryRepository,
    InventoryRepository, RepositoryError, StockFilter,
};
pub use store::{InMemoryKeyValueStore, KeyValueStore, KvStoreError, load_json, store_json};
