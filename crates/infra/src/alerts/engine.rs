use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockledger_core::ProductId;
use stockledger_events::EventBus;
use stockledger_inventory::{Alert, InventoryEvent, StockAlertRaised, StockRecord, StockThresholds};

use super::cooldown::CooldownCache;
use super::display::{MessageDisplay, Severity};
use crate::config::InventorySettings;

/// Classifies snapshots and notifies, at most once per (product, alert type) per cooldown.
///
/// Display and publication failures are logged here and never reach the caller.
pub struct AlertEngine<B> {
    thresholds: StockThresholds,
    cooldown: CooldownCache,
    display: Arc<dyn MessageDisplay>,
    bus: B,
}

impl<B> AlertEngine<B>
where
    B: EventBus<InventoryEvent>,
{
    pub fn new(settings: &InventorySettings, display: Arc<dyn MessageDisplay>, bus: B) -> Self {
        Self {
            thresholds: settings.thresholds.clone(),
            cooldown: CooldownCache::new(settings.alert_cooldown, settings.alert_cache_capacity),
            display,
            bus,
        }
    }

    pub fn thresholds(&self) -> &StockThresholds {
        &self.thresholds
    }

    /// Classify a freshly written snapshot and notify every resulting alert.
    pub fn evaluate(&self, record: &StockRecord) -> Vec<Alert> {
        let alerts = record.alerts(&self.thresholds);
        for alert in &alerts {
            self.notify(record.product_id(), alert);
        }
        alerts
    }

    /// Returns `true` if the alert was shown, `false` if it was suppressed.
    pub fn notify(&self, product_id: &ProductId, alert: &Alert) -> bool {
        self.notify_at(product_id, alert, Utc::now())
    }

    pub fn notify_at(&self, product_id: &ProductId, alert: &Alert, now: DateTime<Utc>) -> bool {
        if !self.cooldown.try_claim(product_id, alert.kind, now) {
            tracing::debug!(
                product_id = %product_id,
                alert = alert.kind.as_str(),
                "alert suppressed by cooldown"
            );
            return false;
        }

        if let Err(e) = self.display.display(&alert.message, Severity::from(alert.level)) {
            tracing::warn!(
                product_id = %product_id,
                alert = alert.kind.as_str(),
                error = %e,
                "failed to display stock alert"
            );
        }

        let event = InventoryEvent::StockAlertRaised(StockAlertRaised {
            product_id: product_id.clone(),
            alert: alert.clone(),
            occurred_at: now,
        });
        if let Err(e) = self.bus.publish(event) {
            tracing::warn!(product_id = %product_id, error = ?e, "failed to publish stock alert");
        }

        true
    }

    /// Forget every cooldown, so the next occurrence of any alert notifies again.
    pub fn reset(&self) {
        self.cooldown.clear();
    }

    pub fn tracked_pairs(&self) -> usize {
        self.cooldown.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::display::RecordingDisplay;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use stockledger_core::AreaId;
    use stockledger_events::InMemoryEventBus;
    use stockledger_inventory::{AlertKind, StockKey};

    type Bus = Arc<InMemoryEventBus<InventoryEvent>>;

    fn engine(display: Arc<RecordingDisplay>) -> (AlertEngine<Bus>, Bus) {
        let bus = Arc::new(InMemoryEventBus::new());
        let engine = AlertEngine::new(&InventorySettings::default(), display, bus.clone());
        (engine, bus)
    }

    fn record(cantidad: rust_decimal::Decimal) -> StockRecord {
        let key = StockKey::new(ProductId::new("P1"), AreaId::new("A1"));
        let mut r = StockRecord::empty(key, None, Utc::now());
        r.cantidad_actual = cantidad;
        r.cantidad_minima = dec!(10);
        r
    }

    #[test]
    fn repeated_notify_within_cooldown_displays_once() {
        let display = Arc::new(RecordingDisplay::default());
        let (engine, bus) = engine(display.clone());
        let sub = bus.subscribe();
        let alert = record(dec!(0)).alerts(engine.thresholds()).remove(0);
        let t0 = Utc::now();

        assert!(engine.notify_at(&ProductId::new("P1"), &alert, t0));
        assert!(!engine.notify_at(&ProductId::new("P1"), &alert, t0 + Duration::seconds(30)));

        assert_eq!(display.calls(), vec![("Product is out of stock".to_string(), Severity::Error)]);
        assert_eq!(sub.drain().len(), 1);
    }

    #[test]
    fn evaluate_maps_warning_level_to_warning_severity() {
        let display = Arc::new(RecordingDisplay::default());
        let (engine, _bus) = engine(display.clone());

        let alerts = engine.evaluate(&record(dec!(8)));

        assert_eq!(alerts[0].kind, AlertKind::LowCount);
        assert_eq!(display.calls()[0].1, Severity::Warning);
    }

    #[test]
    fn healthy_record_notifies_nothing() {
        let display = Arc::new(RecordingDisplay::default());
        let (engine, _bus) = engine(display.clone());

        assert!(engine.evaluate(&record(dec!(40))).is_empty());
        assert!(display.calls().is_empty());
        assert_eq!(engine.tracked_pairs(), 0);
    }

    #[test]
    fn display_failure_is_swallowed_and_event_still_published() {
        let display = Arc::new(RecordingDisplay::failing());
        let (engine, bus) = engine(display.clone());
        let sub = bus.subscribe();

        engine.evaluate(&record(dec!(3)));

        assert_eq!(display.calls().len(), 1);
        assert!(matches!(
            sub.drain().as_slice(),
            [InventoryEvent::StockAlertRaised(raised)]
                if raised.alert.kind == AlertKind::CriticalCount
        ));
    }

    #[test]
    fn reset_reopens_the_cooldown() {
        let display = Arc::new(RecordingDisplay::default());
        let (engine, _bus) = engine(display.clone());

        engine.evaluate(&record(dec!(0)));
        engine.evaluate(&record(dec!(0)));
        engine.reset();
        engine.evaluate(&record(dec!(0)));

        assert_eq!(display.calls().len(), 2);
    }
}
