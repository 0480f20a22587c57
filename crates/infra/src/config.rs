//! Inventory configuration.
//!
//! Threshold overrides are read once, when the ledger is built. Everything else is
//! compiled-in defaults that embedders may override field by field.

use std::time::Duration;

use stockledger_inventory::{ExpiryWindows, StockThresholds};

use crate::store::{KeyValueStore, load_json};

/// Key holding the persisted `{critical, warning, good}` overrides.
pub const THRESHOLDS_KEY: &str = "stock_thresholds";

#[derive(Debug, Clone, PartialEq)]
pub struct InventorySettings {
    pub thresholds: StockThresholds,
    pub expiry: ExpiryWindows,
    /// Minimum time between two notifications for the same (product, alert type).
    pub alert_cooldown: Duration,
    /// Upper bound on remembered (product, alert type) pairs.
    pub alert_cache_capacity: usize,
    /// Movements kept in the mirrored audit log.
    pub journal_capacity: usize,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            thresholds: StockThresholds::default(),
            expiry: ExpiryWindows::default(),
            alert_cooldown: Duration::from_secs(60),
            alert_cache_capacity: 1024,
            journal_capacity: 1000,
        }
    }
}

impl InventorySettings {
    /// Defaults with thresholds taken from `store`.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            thresholds: load_thresholds(store),
            ..Self::default()
        }
    }
}

/// Persisted threshold overrides merged over the defaults.
///
/// Unreadable or malformed documents fall back to the defaults.
pub fn load_thresholds(store: &dyn KeyValueStore) -> StockThresholds {
    match load_json::<StockThresholds>(store, THRESHOLDS_KEY) {
        Ok(Some(thresholds)) => thresholds,
        Ok(None) => StockThresholds::default(),
        Err(e) => {
            tracing::warn!(
                key = THRESHOLDS_KEY,
                error = %e,
                "failed to load stock thresholds; using defaults"
            );
            StockThresholds::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryKeyValueStore;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_document_yields_defaults() {
        let settings = InventorySettings::load(&InMemoryKeyValueStore::new());
        assert_eq!(settings, InventorySettings::default());
        assert_eq!(settings.alert_cooldown, Duration::from_secs(60));
        assert_eq!(settings.journal_capacity, 1000);
    }

    #[test]
    fn stored_keys_override_defaults() {
        let store = InMemoryKeyValueStore::new()
            .with_entry(THRESHOLDS_KEY, r#"{"critical": 2, "good": 80}"#);
        let thresholds = load_thresholds(&store);

        assert_eq!(thresholds.critical, dec!(2));
        assert_eq!(thresholds.warning, dec!(10));
        assert_eq!(thresholds.good, dec!(80));
    }

    #[test]
    fn malformed_document_falls_back_to_defaults() {
        let store = InMemoryKeyValueStore::new().with_entry(THRESHOLDS_KEY, "critical=2");
        assert_eq!(load_thresholds(&store), StockThresholds::default());
    }
}
