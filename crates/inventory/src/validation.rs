//! Boundary validation for count, entry and exit payloads.
//!
//! Errors accumulate instead of failing fast so a caller sees every problem at once.

use rust_decimal::Decimal;

use stockledger_core::{DomainError, DomainResult, ProductId};

use crate::request::{CountRequest, EntryRequest, ExitRequest, StockItem};

/// Smallest quantity an entry or exit line may move.
pub const MIN_ITEM_QUANTITY: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

fn non_negative(field: &str, value: Option<Decimal>, errors: &mut Vec<String>) {
    if let Some(v) = value {
        if v < Decimal::ZERO {
            errors.push(format!("{field} must be >= 0"));
        }
    }
}

pub fn validate_count(product_id: &ProductId, request: &CountRequest) -> DomainResult<()> {
    let mut errors = Vec::new();

    if product_id.is_blank() {
        errors.push("product_id is required".to_string());
    }
    non_negative("cantidad", Some(request.cantidad), &mut errors);
    non_negative("cantidad_minima", request.cantidad_minima, &mut errors);
    non_negative("cantidad_maxima", request.cantidad_maxima, &mut errors);
    if let Some(info) = &request.batch_info {
        non_negative("batch_info.cantidad", info.cantidad, &mut errors);
    }

    finish(errors)
}

pub fn validate_entry(request: &EntryRequest) -> DomainResult<()> {
    validate_items(&request.items, "entry")
}

pub fn validate_exit(request: &ExitRequest) -> DomainResult<()> {
    validate_items(&request.items, "exit")
}

fn validate_items(items: &[StockItem], operation: &str) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::validation(format!(
            "at least one item is required in the {operation}"
        )));
    }

    let errors = items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let mut problems = Vec::new();
            if item.product_id.is_blank() {
                problems.push("product_id is required".to_string());
            }
            if item.cantidad < MIN_ITEM_QUANTITY {
                problems.push(format!("cantidad must be >= {MIN_ITEM_QUANTITY}"));
            }
            if let Some(info) = &item.batch_info {
                non_negative("batch_info.cantidad", info.cantidad, &mut problems);
            }

            if problems.is_empty() {
                None
            } else {
                Some(format!("Item {}: {}", idx + 1, problems.join(", ")))
            }
        })
        .collect();

    finish(errors)
}

fn finish(errors: Vec<String>) -> DomainResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::validation_many(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchInfo;
    use rust_decimal_macros::dec;

    fn errors(result: DomainResult<()>) -> Vec<String> {
        match result {
            Err(DomainError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn count_accepts_zero() {
        assert!(validate_count(&ProductId::new("P1"), &CountRequest::new(dec!(0))).is_ok());
    }

    #[test]
    fn count_reports_every_negative_field() {
        let request = CountRequest::new(dec!(-1)).with_bounds(dec!(-2), dec!(5));
        assert_eq!(
            errors(validate_count(&ProductId::new(""), &request)),
            vec![
                "product_id is required",
                "cantidad must be >= 0",
                "cantidad_minima must be >= 0",
            ]
        );
    }

    #[test]
    fn entry_requires_items() {
        assert_eq!(
            errors(validate_entry(&EntryRequest::new(Vec::new()))),
            vec!["at least one item is required in the entry"]
        );
    }

    #[test]
    fn item_errors_accumulate_with_one_based_positions() {
        let request = ExitRequest::new(vec![
            StockItem::new("P1", dec!(1)),
            StockItem::new("P2", dec!(0.001)),
            StockItem::new(ProductId::new(" "), dec!(0)),
        ]);

        assert_eq!(
            errors(validate_exit(&request)),
            vec![
                "Item 2: cantidad must be >= 0.01",
                "Item 3: product_id is required, cantidad must be >= 0.01",
            ]
        );
    }

    #[test]
    fn minimum_item_quantity_is_accepted() {
        let request = EntryRequest::new(vec![StockItem::new("P1", dec!(0.01))]);
        assert!(validate_entry(&request).is_ok());
    }

    #[test]
    fn negative_batch_quantity_is_reported() {
        let request = EntryRequest::new(vec![StockItem::new("P1", dec!(3)).with_batch(BatchInfo {
            cantidad: Some(dec!(-3)),
            ..BatchInfo::default()
        })]);
        assert_eq!(
            errors(validate_entry(&request)),
            vec!["Item 1: batch_info.cantidad must be >= 0"]
        );
    }
}
