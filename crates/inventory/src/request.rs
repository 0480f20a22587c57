//! Typed request payloads, one per operation kind.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::{AreaId, CategoryId, DomainResult, ProductId};

use crate::batch::BatchInfo;
use crate::validation::{validate_count, validate_entry, validate_exit};

/// Manual count of one product: sets the quantity outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRequest {
    pub cantidad: Decimal,
    #[serde(default)]
    pub cantidad_minima: Option<Decimal>,
    #[serde(default)]
    pub cantidad_maxima: Option<Decimal>,
    /// Defaults to the operator's current area.
    #[serde(default)]
    pub area_id: Option<AreaId>,
    /// Defaults to the operator's current category.
    #[serde(default)]
    pub categoria_id: Option<CategoryId>,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub batch_info: Option<BatchInfo>,
}

impl CountRequest {
    pub fn new(cantidad: Decimal) -> Self {
        Self {
            cantidad,
            cantidad_minima: None,
            cantidad_maxima: None,
            area_id: None,
            categoria_id: None,
            motivo: None,
            batch_info: None,
        }
    }

    pub fn with_bounds(mut self, minima: Decimal, maxima: Decimal) -> Self {
        self.cantidad_minima = Some(minima);
        self.cantidad_maxima = Some(maxima);
        self
    }

    pub fn in_area(mut self, area_id: AreaId) -> Self {
        self.area_id = Some(area_id);
        self
    }

    pub fn with_batch(mut self, batch_info: BatchInfo) -> Self {
        self.batch_info = Some(batch_info);
        self
    }
}

/// One product line of an entry or exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockItem {
    pub product_id: ProductId,
    pub cantidad: Decimal,
    #[serde(default)]
    pub batch_info: Option<BatchInfo>,
}

impl StockItem {
    pub fn new(product_id: impl Into<ProductId>, cantidad: Decimal) -> Self {
        Self {
            product_id: product_id.into(),
            cantidad,
            batch_info: None,
        }
    }

    pub fn with_batch(mut self, batch_info: BatchInfo) -> Self {
        self.batch_info = Some(batch_info);
        self
    }
}

/// Goods received. Items are processed in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRequest {
    pub items: Vec<StockItem>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub categoria_id: Option<CategoryId>,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub documento_referencia: Option<String>,
}

/// Goods dispatched. Items are processed in order; batch info on items is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitRequest {
    pub items: Vec<StockItem>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    #[serde(default)]
    pub categoria_id: Option<CategoryId>,
    #[serde(default)]
    pub motivo: Option<String>,
    #[serde(default)]
    pub documento_referencia: Option<String>,
}

macro_rules! impl_movement_request {
    ($t:ty) => {
        impl $t {
            pub fn new(items: Vec<StockItem>) -> Self {
                Self {
                    items,
                    area_id: None,
                    categoria_id: None,
                    motivo: None,
                    documento_referencia: None,
                }
            }

            pub fn in_area(mut self, area_id: AreaId) -> Self {
                self.area_id = Some(area_id);
                self
            }

            pub fn with_reason(mut self, motivo: impl Into<String>) -> Self {
                self.motivo = Some(motivo.into());
                self
            }

            pub fn with_reference(mut self, documento: impl Into<String>) -> Self {
                self.documento_referencia = Some(documento.into());
                self
            }
        }
    };
}

impl_movement_request!(EntryRequest);
impl_movement_request!(ExitRequest);

/// Every stock-changing operation, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InventoryCommand {
    UpdateCount {
        product_id: ProductId,
        #[serde(flatten)]
        request: CountRequest,
    },
    RegisterEntry(EntryRequest),
    RegisterExit(ExitRequest),
}

impl InventoryCommand {
    pub fn name(&self) -> &'static str {
        match self {
            InventoryCommand::UpdateCount { .. } => "update_count",
            InventoryCommand::RegisterEntry(_) => "register_entry",
            InventoryCommand::RegisterExit(_) => "register_exit",
        }
    }

    /// Boundary validation; runs before any read or write.
    pub fn validate(&self) -> DomainResult<()> {
        match self {
            InventoryCommand::UpdateCount { product_id, request } => {
                validate_count(product_id, request)
            }
            InventoryCommand::RegisterEntry(request) => validate_entry(request),
            InventoryCommand::RegisterExit(request) => validate_exit(request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let cmd: InventoryCommand = serde_json::from_str(
            r#"{"kind":"register_exit","items":[{"product_id":"P1","cantidad":"2.5"}],"motivo":"Venta"}"#,
        )
        .unwrap();

        match &cmd {
            InventoryCommand::RegisterExit(req) => {
                assert_eq!(req.items[0].cantidad, dec!(2.5));
                assert_eq!(req.motivo.as_deref(), Some("Venta"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cmd.name(), "register_exit");
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn count_command_with_blank_product_is_invalid() {
        let cmd = InventoryCommand::UpdateCount {
            product_id: ProductId::new(""),
            request: CountRequest::new(dec!(1)),
        };
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn missing_quantity_fails_at_the_boundary() {
        let parsed = serde_json::from_str::<StockItem>(r#"{"product_id":"P1"}"#);
        assert!(parsed.is_err());
    }
}
