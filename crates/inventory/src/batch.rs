use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::{
    AreaId, BatchId, DomainError, DomainResult, Entity, InventoryId, ProductId,
};

use crate::expiry::{ExpiryStatus, ExpiryWindows, days_until_expiry};

/// Lot lifecycle. `Expired` is only ever set by an external expiry sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Active,
    Expired,
    Depleted,
}

/// Lot details supplied with a count or entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInfo {
    /// Generated from the product's existing lots when absent.
    #[serde(default)]
    pub lote_numero: Option<String>,
    #[serde(default)]
    pub fecha_vencimiento: Option<NaiveDate>,
    /// Defaults to the quantity of the operation carrying this info.
    #[serde(default)]
    pub cantidad: Option<Decimal>,
}

impl BatchInfo {
    pub fn with_default_quantity(mut self, cantidad: Decimal) -> Self {
        if self.cantidad.is_none() {
            self.cantidad = Some(cantidad);
        }
        self
    }

    /// The supplied lot number, if it is not blank.
    pub fn lot_number(&self) -> Option<&str> {
        self.lote_numero
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

/// One received lot of a product.
///
/// `cantidad_inicial` is the quantity at creation (plus any restocks of the same
/// lot); `cantidad_lote` is what is still available after FIFO debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub id: BatchId,
    pub inventory_id: InventoryId,
    pub product_id: ProductId,
    pub area_id: AreaId,
    pub lote_numero: String,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub cantidad_inicial: Decimal,
    pub cantidad_lote: Decimal,
    pub estado: BatchStatus,
    pub fecha_creacion: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl Batch {
    pub fn new(
        inventory_id: InventoryId,
        product_id: ProductId,
        area_id: AreaId,
        lote_numero: impl Into<String>,
        fecha_vencimiento: Option<NaiveDate>,
        cantidad: Decimal,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if cantidad < Decimal::ZERO {
            return Err(DomainError::validation("batch cantidad must be >= 0"));
        }

        Ok(Self {
            id: BatchId::new(),
            inventory_id,
            product_id,
            area_id,
            lote_numero: lote_numero.into(),
            fecha_vencimiento,
            cantidad_inicial: cantidad,
            cantidad_lote: cantidad,
            estado: if cantidad.is_zero() {
                BatchStatus::Depleted
            } else {
                BatchStatus::Active
            },
            fecha_creacion: now,
            fecha_actualizacion: now,
        })
    }

    /// Quantity that FIFO allocation may take from this lot.
    pub fn available(&self) -> Decimal {
        match self.estado {
            BatchStatus::Active => self.cantidad_lote.max(Decimal::ZERO),
            BatchStatus::Expired | BatchStatus::Depleted => Decimal::ZERO,
        }
    }

    /// Consume `cantidad` units. The lot flips to `depleted` when it reaches zero.
    pub fn debit(&mut self, cantidad: Decimal, now: DateTime<Utc>) -> DomainResult<()> {
        if cantidad <= Decimal::ZERO {
            return Err(DomainError::validation("debit cantidad must be > 0"));
        }
        if cantidad > self.available() {
            return Err(DomainError::invariant(format!(
                "batch {} has {} available, cannot debit {}",
                self.lote_numero,
                self.available(),
                cantidad
            )));
        }

        self.cantidad_lote -= cantidad;
        if self.cantidad_lote.is_zero() {
            self.estado = BatchStatus::Depleted;
        }
        self.fecha_actualizacion = now;
        Ok(())
    }

    /// Receive more units into an existing lot, reactivating it if it was depleted.
    pub fn restock(
        &mut self,
        cantidad: Decimal,
        fecha_vencimiento: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if cantidad < Decimal::ZERO {
            return Err(DomainError::validation("batch cantidad must be >= 0"));
        }
        if self.estado == BatchStatus::Expired {
            return Err(DomainError::invariant(format!(
                "batch {} is expired and cannot be restocked",
                self.lote_numero
            )));
        }

        self.cantidad_inicial += cantidad;
        self.cantidad_lote += cantidad;
        if fecha_vencimiento.is_some() {
            self.fecha_vencimiento = fecha_vencimiento;
        }
        if self.cantidad_lote > Decimal::ZERO {
            self.estado = BatchStatus::Active;
        }
        self.fecha_actualizacion = now;
        Ok(())
    }

    /// Set the lot to a counted quantity. The received total never drops below it.
    pub fn recount(
        &mut self,
        cantidad: Decimal,
        fecha_vencimiento: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if cantidad < Decimal::ZERO {
            return Err(DomainError::validation("batch cantidad must be >= 0"));
        }
        if self.estado == BatchStatus::Expired {
            return Err(DomainError::invariant(format!(
                "batch {} is expired and cannot be recounted",
                self.lote_numero
            )));
        }

        self.cantidad_lote = cantidad;
        self.cantidad_inicial = self.cantidad_inicial.max(cantidad);
        if fecha_vencimiento.is_some() {
            self.fecha_vencimiento = fecha_vencimiento;
        }
        self.estado = if cantidad.is_zero() {
            BatchStatus::Depleted
        } else {
            BatchStatus::Active
        };
        self.fecha_actualizacion = now;
        Ok(())
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.fecha_vencimiento.map(|date| days_until_expiry(date, today))
    }

    /// Attach expiry information for display.
    pub fn view(self, windows: &ExpiryWindows, today: NaiveDate) -> BatchView {
        BatchView {
            days_until_expiry: self.days_until_expiry(today),
            expiry_status: windows.classify_date(self.fecha_vencimiento, today),
            cantidad_disponible: self.available(),
            batch: self,
        }
    }
}

impl Entity for Batch {
    type Id = BatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A batch enriched with its remaining shelf life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchView {
    #[serde(flatten)]
    pub batch: Batch,
    /// `None` means the lot never expires.
    pub days_until_expiry: Option<i64>,
    pub expiry_status: ExpiryStatus,
    pub cantidad_disponible: Decimal,
}

impl BatchView {
    /// Sort key: soonest expiry first, lots without expiry last.
    pub fn expiry_rank(&self) -> (bool, i64) {
        match self.days_until_expiry {
            Some(days) => (false, days),
            None => (true, 0),
        }
    }
}

/// Next automatic lot number: one past the highest numeric lot, or "1".
///
/// Non-numeric lot numbers are ignored.
pub fn next_lot_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let highest = existing
        .into_iter()
        .filter_map(|lot| lot.trim().parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    (highest.saturating_add(1)).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn batch(cantidad: Decimal) -> Batch {
        Batch::new(
            InventoryId::new(),
            ProductId::new("P1"),
            AreaId::new("A1"),
            "L1",
            None,
            cantidad,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn debit_to_zero_depletes_the_lot() {
        let mut b = batch(dec!(20));
        b.debit(dec!(5), Utc::now()).unwrap();
        assert_eq!(b.cantidad_lote, dec!(15));
        assert_eq!(b.estado, BatchStatus::Active);

        b.debit(dec!(15), Utc::now()).unwrap();
        assert_eq!(b.estado, BatchStatus::Depleted);
        assert_eq!(b.available(), dec!(0));
        assert_eq!(b.cantidad_inicial, dec!(20));
    }

    #[test]
    fn debit_beyond_available_is_rejected() {
        let mut b = batch(dec!(3));
        assert!(b.debit(dec!(4), Utc::now()).is_err());
        assert_eq!(b.cantidad_lote, dec!(3));
    }

    #[test]
    fn restock_reactivates_depleted_lot() {
        let mut b = batch(dec!(2));
        b.debit(dec!(2), Utc::now()).unwrap();
        b.restock(dec!(10), None, Utc::now()).unwrap();
        assert_eq!(b.estado, BatchStatus::Active);
        assert_eq!(b.cantidad_lote, dec!(10));
        assert_eq!(b.cantidad_inicial, dec!(12));
    }

    #[test]
    fn recount_replaces_the_available_quantity() {
        let mut b = batch(dec!(9));
        b.recount(dec!(9), None, Utc::now()).unwrap();
        assert_eq!(b.cantidad_lote, dec!(9));
        assert_eq!(b.cantidad_inicial, dec!(9));

        b.recount(dec!(0), None, Utc::now()).unwrap();
        assert_eq!(b.estado, BatchStatus::Depleted);

        b.recount(dec!(12), None, Utc::now()).unwrap();
        assert_eq!(b.estado, BatchStatus::Active);
        assert_eq!(b.cantidad_inicial, dec!(12));
    }

    #[test]
    fn empty_lot_starts_depleted() {
        let b = batch(dec!(0));
        assert_eq!(b.estado, BatchStatus::Depleted);
        assert_eq!(b.available(), dec!(0));
    }

    #[test]
    fn expired_lot_has_nothing_available() {
        let mut b = batch(dec!(9));
        b.estado = BatchStatus::Expired;
        assert_eq!(b.available(), dec!(0));
        assert!(b.restock(dec!(1), None, Utc::now()).is_err());
        assert!(b.recount(dec!(1), None, Utc::now()).is_err());
    }

    #[test]
    fn next_lot_number_increments_highest_numeric_lot() {
        assert_eq!(next_lot_number(["3", "12", "L-7", " 9 "]), "13");
        assert_eq!(next_lot_number(["A", "B"]), "1");
        assert_eq!(next_lot_number(std::iter::empty::<&str>()), "1");
    }

    #[test]
    fn blank_lot_number_counts_as_missing() {
        let info = BatchInfo {
            lote_numero: Some("  ".to_string()),
            ..BatchInfo::default()
        };
        assert_eq!(info.lot_number(), None);
        assert_eq!(
            info.with_default_quantity(dec!(4)).cantidad,
            Some(dec!(4))
        );
    }

    #[test]
    fn view_reports_days_and_status() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let mut b = batch(dec!(5));
        b.fecha_vencimiento = NaiveDate::from_ymd_opt(2026, 1, 15);

        let view = b.view(&ExpiryWindows::default(), today);

        assert_eq!(view.days_until_expiry, Some(5));
        assert_eq!(view.expiry_status, ExpiryStatus::Critical);
        assert_eq!(view.cantidad_disponible, dec!(5));
    }
}
