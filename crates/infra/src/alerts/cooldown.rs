use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lru::LruCache;

use stockledger_core::ProductId;
use stockledger_inventory::AlertKind;

/// Last-notified timestamps per (product, alert type).
///
/// Bounded: once `capacity` pairs are tracked, the least recently notified pair is
/// evicted. An evicted pair simply notifies again on its next occurrence.
#[derive(Debug)]
pub struct CooldownCache {
    entries: Mutex<LruCache<(ProductId, AlertKind), DateTime<Utc>>>,
    cooldown: chrono::Duration,
}

impl CooldownCache {
    pub fn new(cooldown: Duration, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);

        Self {
            entries: Mutex::new(LruCache::new(cap)),
            cooldown: chrono::Duration::from_std(cooldown).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// Claim the right to notify at `now`.
    ///
    /// Returns `false` if the pair was notified less than one cooldown ago. On `true`
    /// the timestamp is recorded.
    pub fn try_claim(&self, product_id: &ProductId, kind: AlertKind, now: DateTime<Utc>) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            // Poisoned cache: fail open so alerts are not lost.
            return true;
        };

        let key = (product_id.clone(), kind);
        if let Some(last) = entries.get(&key) {
            if now.signed_duration_since(*last) < self.cooldown {
                return false;
            }
        }

        entries.put(key, now);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
