//! Read-side operations. Queries classify but never notify.

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;

use stockledger_core::{AreaId, ProductId};
use stockledger_events::EventBus;
use stockledger_inventory::{
    Alert, BatchStatus, BatchView, CountStatus, InventoryEvent, StockRecord, StockSummary,
    classify_stock,
};

use super::StockLedger;
use crate::error::LedgerResult;
use crate::repository::{BatchFilter, StockFilter};

pub const DEFAULT_EXPIRY_HORIZON_DAYS: u64 = 30;

/// Stock totals for one product, with its active lots when requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductStock {
    #[serde(flatten)]
    pub summary: StockSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub batches: Vec<BatchView>,
    pub alerts: Vec<Alert>,
}

/// One inventory row with its current classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryLine {
    #[serde(flatten)]
    pub record: StockRecord,
    pub alerts: Vec<Alert>,
    pub count_status: CountStatus,
}

impl<B> StockLedger<B>
where
    B: EventBus<InventoryEvent> + Clone,
{
    /// Totals for a product, across every area unless `area_id` narrows it.
    pub async fn product_stock(
        &self,
        product_id: &ProductId,
        area_id: Option<&AreaId>,
        include_batches: bool,
    ) -> LedgerResult<ProductStock> {
        let records = self
            .inventory
            .find_all(&StockFilter {
                product_id: Some(product_id.clone()),
                area_id: area_id.cloned(),
                categoria_id: None,
            })
            .await?;

        let summary = StockSummary::from_records(product_id.clone(), &records);
        let alerts = classify_stock(
            summary.cantidad_actual,
            summary.cantidad_minima,
            &self.settings.thresholds,
        );

        let batches = if include_batches {
            let mut views = self.product_batches(product_id, Some(BatchStatus::Active)).await?;
            if let Some(area) = area_id {
                views.retain(|v| &v.batch.area_id == area);
            }
            views
        } else {
            Vec::new()
        };

        Ok(ProductStock {
            summary,
            batches,
            alerts,
        })
    }

    /// Records matching `filter`. Area and category default to the operator's.
    pub async fn inventory(&self, filter: StockFilter) -> LedgerResult<Vec<InventoryLine>> {
        let filter = StockFilter {
            product_id: filter.product_id,
            area_id: Some(self.context.area_or_default(filter.area_id.as_ref())),
            categoria_id: self.context.category_or_default(filter.categoria_id.as_ref()),
        };

        let records = self.inventory.find_all(&filter).await?;
        let thresholds = &self.settings.thresholds;

        Ok(records
            .into_iter()
            .map(|record| InventoryLine {
                alerts: record.alerts(thresholds),
                count_status: record.count_status(thresholds),
                record,
            })
            .collect())
    }

    /// Lots of a product with their remaining shelf life. `None` lists every status.
    pub async fn product_batches(
        &self,
        product_id: &ProductId,
        status: Option<BatchStatus>,
    ) -> LedgerResult<Vec<BatchView>> {
        let batches = self
            .batches
            .find_all(&BatchFilter {
                product_id: Some(product_id.clone()),
                estado: status,
                ..BatchFilter::default()
            })
            .await?;

        let today = Utc::now().date_naive();
        Ok(batches
            .into_iter()
            .map(|b| b.view(&self.settings.expiry, today))
            .collect())
    }

    /// Active lots expiring within `days` (default 30), soonest first.
    ///
    /// Lots already past their date are included and sort first.
    pub async fn expiring_batches(&self, days: Option<u64>) -> LedgerResult<Vec<BatchView>> {
        let today = Utc::now().date_naive();
        let horizon = days.unwrap_or(DEFAULT_EXPIRY_HORIZON_DAYS);
        let cutoff = today.checked_add_days(Days::new(horizon)).unwrap_or(NaiveDate::MAX);

        let batches = self
            .batches
            .find_all(&BatchFilter {
                estado: Some(BatchStatus::Active),
                expires_on_or_before: Some(cutoff),
                ..BatchFilter::default()
            })
            .await?;

        let mut views: Vec<BatchView> = batches
            .into_iter()
            .map(|b| b.view(&self.settings.expiry, today))
            .collect();
        views.sort_by_key(BatchView::expiry_rank);
        Ok(views)
    }
}
