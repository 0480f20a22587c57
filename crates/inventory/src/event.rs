use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::ProductId;
use stockledger_events::Event;

use crate::alert::Alert;
use crate::batch::Batch;
use crate::movement::{BatchExit, Movement, MovementKind};
use crate::stock::StockRecord;

/// Result of a count update: the written snapshot and the lot it created or topped up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountOutcome {
    pub record: StockRecord,
    pub batch: Option<Batch>,
}

/// Per-item result of an entry or exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub product_id: ProductId,
    pub cantidad_anterior: Decimal,
    pub cantidad_nueva: Decimal,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub batch_exits: Vec<BatchExit>,
    pub result: CountOutcome,
}

/// Event: a whole entry or exit call completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockOperationRegistered {
    pub motivo: Option<String>,
    pub documento_referencia: Option<String>,
    pub items: Vec<ItemOutcome>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: a stock alert passed the cooldown and was shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlertRaised {
    pub product_id: ProductId,
    pub alert: Alert,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    MovementRecorded(Movement),
    EntryRegistered(StockOperationRegistered),
    ExitRegistered(StockOperationRegistered),
    StockAlertRaised(StockAlertRaised),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::MovementRecorded(m) => match m.kind {
                MovementKind::CountAdjustment => "inventory.movement.count_adjustment",
                MovementKind::Entry => "inventory.movement.entry",
                MovementKind::Exit => "inventory.movement.exit",
            },
            InventoryEvent::EntryRegistered(_) => "inventory.entry.registered",
            InventoryEvent::ExitRegistered(_) => "inventory.exit.registered",
            InventoryEvent::StockAlertRaised(_) => "inventory.stock.alert_raised",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::MovementRecorded(m) => m.fecha,
            InventoryEvent::EntryRegistered(e) => e.occurred_at,
            InventoryEvent::ExitRegistered(e) => e.occurred_at,
            InventoryEvent::StockAlertRaised(e) => e.occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::MovementDraft;
    use rust_decimal_macros::dec;
    use stockledger_core::{AreaId, MovementId};

    #[test]
    fn movement_event_type_follows_movement_kind() {
        let movement =
            MovementDraft::exit(ProductId::new("P1"), dec!(5), dec!(1), None, None, vec![])
                .record(MovementId::new(), Utc::now(), None, AreaId::new("A1"));
        let fecha = movement.fecha;
        let event = InventoryEvent::MovementRecorded(movement);

        assert_eq!(event.event_type(), "inventory.movement.exit");
        assert_eq!(event.occurred_at(), fecha);
        assert_eq!(event.version(), 1);
    }
}
