use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::{AreaId, BatchId, Entity, MovementId, ProductId, UserId, ValueObject};

pub const DEFAULT_COUNT_REASON: &str = "Ajuste de conteo";
pub const DEFAULT_ENTRY_REASON: &str = "Recepción de mercancía";
pub const DEFAULT_EXIT_REASON: &str = "Despacho de mercancía";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Entry,
    Exit,
    CountAdjustment,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entry",
            MovementKind::Exit => "exit",
            MovementKind::CountAdjustment => "count_adjustment",
        }
    }
}

/// Quantity taken from one lot by an exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchExit {
    pub batch_id: BatchId,
    pub lote_numero: String,
    pub cantidad: Decimal,
}

impl ValueObject for BatchExit {}

/// A movement that has not been journaled yet (no id, time or actor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementDraft {
    pub product_id: ProductId,
    pub kind: MovementKind,
    pub cantidad_anterior: Decimal,
    pub cantidad_nueva: Decimal,
    pub cantidad_movimiento: Option<Decimal>,
    pub motivo: String,
    pub documento_referencia: Option<String>,
    pub batch_exits: Vec<BatchExit>,
    /// Area the change applied to; the journal falls back to the operator's area.
    pub area_id: Option<AreaId>,
}

impl MovementDraft {
    pub fn count_adjustment(
        product_id: ProductId,
        cantidad_anterior: Decimal,
        cantidad_nueva: Decimal,
        motivo: Option<&str>,
    ) -> Self {
        Self {
            product_id,
            kind: MovementKind::CountAdjustment,
            cantidad_anterior,
            cantidad_nueva,
            cantidad_movimiento: None,
            motivo: motivo.unwrap_or(DEFAULT_COUNT_REASON).to_string(),
            documento_referencia: None,
            batch_exits: Vec::new(),
            area_id: None,
        }
    }

    pub fn entry(
        product_id: ProductId,
        cantidad_anterior: Decimal,
        cantidad: Decimal,
        motivo: Option<&str>,
        documento_referencia: Option<String>,
    ) -> Self {
        Self {
            product_id,
            kind: MovementKind::Entry,
            cantidad_anterior,
            cantidad_nueva: cantidad_anterior + cantidad,
            cantidad_movimiento: Some(cantidad),
            motivo: format!("Entrada: {}", motivo.unwrap_or(DEFAULT_ENTRY_REASON)),
            documento_referencia,
            batch_exits: Vec::new(),
            area_id: None,
        }
    }

    pub fn exit(
        product_id: ProductId,
        cantidad_anterior: Decimal,
        cantidad: Decimal,
        motivo: Option<&str>,
        documento_referencia: Option<String>,
        batch_exits: Vec<BatchExit>,
    ) -> Self {
        Self {
            product_id,
            kind: MovementKind::Exit,
            cantidad_anterior,
            cantidad_nueva: cantidad_anterior - cantidad,
            cantidad_movimiento: Some(-cantidad),
            motivo: format!("Salida: {}", motivo.unwrap_or(DEFAULT_EXIT_REASON)),
            documento_referencia,
            batch_exits,
            area_id: None,
        }
    }

    pub fn in_area(mut self, area_id: AreaId) -> Self {
        self.area_id = Some(area_id);
        self
    }

    /// Stamp the draft into an immutable journal entry.
    pub fn record(
        self,
        id: MovementId,
        fecha: DateTime<Utc>,
        usuario_id: Option<UserId>,
        default_area: AreaId,
    ) -> Movement {
        Movement {
            id,
            product_id: self.product_id,
            kind: self.kind,
            cantidad_anterior: self.cantidad_anterior,
            cantidad_nueva: self.cantidad_nueva,
            cantidad_movimiento: self.cantidad_movimiento,
            motivo: self.motivo,
            documento_referencia: self.documento_referencia,
            batch_exits: self.batch_exits,
            fecha,
            usuario_id,
            area_id: self.area_id.unwrap_or(default_area),
        }
    }
}

/// Immutable audit entry for one quantity change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub product_id: ProductId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub cantidad_anterior: Decimal,
    pub cantidad_nueva: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cantidad_movimiento: Option<Decimal>,
    pub motivo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documento_referencia: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub batch_exits: Vec<BatchExit>,
    pub fecha: DateTime<Utc>,
    pub usuario_id: Option<UserId>,
    pub area_id: AreaId,
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_and_exit_sign_the_delta_and_prefix_the_reason() {
        let entry = MovementDraft::entry(ProductId::new("P1"), dec!(10), dec!(5), None, None);
        assert_eq!(entry.cantidad_nueva, dec!(15));
        assert_eq!(entry.cantidad_movimiento, Some(dec!(5)));
        assert_eq!(entry.motivo, "Entrada: Recepción de mercancía");

        let exit = MovementDraft::exit(
            ProductId::new("P1"),
            dec!(15),
            dec!(4),
            Some("Venta mostrador"),
            Some("F-001".to_string()),
            Vec::new(),
        );
        assert_eq!(exit.cantidad_nueva, dec!(11));
        assert_eq!(exit.cantidad_movimiento, Some(dec!(-4)));
        assert_eq!(exit.motivo, "Salida: Venta mostrador");
    }

    #[test]
    fn count_adjustment_omits_delta_on_the_wire() {
        let movement = MovementDraft::count_adjustment(ProductId::new("P1"), dec!(3), dec!(8), None)
            .record(MovementId::new(), Utc::now(), None, AreaId::new("A1"));

        let json = serde_json::to_value(&movement).unwrap();
        assert_eq!(json["type"], "count_adjustment");
        assert_eq!(json["motivo"], DEFAULT_COUNT_REASON);
        assert!(json.get("cantidad_movimiento").is_none());
        assert!(json.get("batch_exits").is_none());
        assert_eq!(json["area_id"], "A1");
    }

    #[test]
    fn draft_area_overrides_operator_area() {
        let movement = MovementDraft::count_adjustment(ProductId::new("P1"), dec!(0), dec!(1), None)
            .in_area(AreaId::new("A2"))
            .record(MovementId::new(), Utc::now(), None, AreaId::new("A1"));
        assert_eq!(movement.area_id, AreaId::new("A2"));
    }
}
