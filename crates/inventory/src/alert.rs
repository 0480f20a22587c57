//! Threshold-based stock alerts (pure classification, no notification side effects).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockledger_core::ValueObject;

use crate::stock::StockRecord;

/// Configurable stock thresholds. Only `critical` drives alerting; `warning` and
/// `good` are carried for display layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockThresholds {
    pub critical: Decimal,
    pub warning: Decimal,
    pub good: Decimal,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            critical: Decimal::from(5),
            warning: Decimal::from(10),
            good: Decimal::from(50),
        }
    }
}

impl ValueObject for StockThresholds {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    OutOfCount,
    CriticalCount,
    LowCount,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::OutOfCount => "out_of_count",
            AlertKind::CriticalCount => "critical_count",
            AlertKind::LowCount => "low_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Critical,
    Warning,
}

/// Transient notification about a stock level. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub level: AlertLevel,
    pub message: String,
}

impl ValueObject for Alert {}

/// Classify a stock level. At most one alert is returned; the first matching rule
/// wins in this order: out of stock, critical threshold, below minimum.
pub fn classify_stock(
    cantidad_actual: Decimal,
    cantidad_minima: Decimal,
    thresholds: &StockThresholds,
) -> Vec<Alert> {
    let alert = if cantidad_actual <= Decimal::ZERO {
        Alert {
            kind: AlertKind::OutOfCount,
            level: AlertLevel::Critical,
            message: "Product is out of stock".to_string(),
        }
    } else if cantidad_actual <= thresholds.critical {
        Alert {
            kind: AlertKind::CriticalCount,
            level: AlertLevel::Critical,
            message: format!("Critical stock: {cantidad_actual} units"),
        }
    } else if cantidad_actual <= cantidad_minima {
        Alert {
            kind: AlertKind::LowCount,
            level: AlertLevel::Warning,
            message: format!("Low stock: {cantidad_actual} units (minimum: {cantidad_minima})"),
        }
    } else {
        return Vec::new();
    };

    vec![alert]
}

/// Coarse stock status used by listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStatus {
    OutOfCount,
    Critical,
    Low,
    Good,
}

pub fn count_status(
    cantidad_actual: Decimal,
    cantidad_minima: Decimal,
    thresholds: &StockThresholds,
) -> CountStatus {
    if cantidad_actual <= Decimal::ZERO {
        CountStatus::OutOfCount
    } else if cantidad_actual <= thresholds.critical {
        CountStatus::Critical
    } else if cantidad_actual <= cantidad_minima {
        CountStatus::Low
    } else {
        CountStatus::Good
    }
}

impl StockRecord {
    pub fn alerts(&self, thresholds: &StockThresholds) -> Vec<Alert> {
        classify_stock(self.cantidad_actual, self.cantidad_minima, thresholds)
    }

    pub fn count_status(&self, thresholds: &StockThresholds) -> CountStatus {
        count_status(self.cantidad_actual, self.cantidad_minima, thresholds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn kinds(alerts: &[Alert]) -> Vec<AlertKind> {
        alerts.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn zero_stock_is_out_of_count_even_with_zero_minimum() {
        let alerts = classify_stock(dec!(0), dec!(0), &StockThresholds::default());
        assert_eq!(kinds(&alerts), vec![AlertKind::OutOfCount]);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
    }

    #[test]
    fn critical_threshold_wins_over_minimum() {
        let alerts = classify_stock(dec!(5), dec!(20), &StockThresholds::default());
        assert_eq!(kinds(&alerts), vec![AlertKind::CriticalCount]);
        assert_eq!(alerts[0].message, "Critical stock: 5 units");
    }

    #[test]
    fn below_minimum_is_low_count_warning() {
        let alerts = classify_stock(dec!(8), dec!(10), &StockThresholds::default());
        assert_eq!(kinds(&alerts), vec![AlertKind::LowCount]);
        assert_eq!(alerts[0].level, AlertLevel::Warning);
        assert_eq!(alerts[0].message, "Low stock: 8 units (minimum: 10)");
    }

    #[test]
    fn healthy_stock_has_no_alerts() {
        assert!(classify_stock(dec!(11), dec!(10), &StockThresholds::default()).is_empty());
    }

    #[test]
    fn custom_critical_threshold_is_respected() {
        let thresholds = StockThresholds {
            critical: dec!(2),
            ..StockThresholds::default()
        };
        assert!(classify_stock(dec!(3), dec!(0), &thresholds).is_empty());
        assert_eq!(count_status(dec!(2), dec!(0), &thresholds), CountStatus::Critical);
    }

    #[test]
    fn partial_threshold_document_keeps_defaults() {
        let thresholds: StockThresholds = serde_json::from_str(r#"{"critical": 3}"#).unwrap();
        assert_eq!(thresholds.critical, dec!(3));
        assert_eq!(thresholds.warning, dec!(10));
        assert_eq!(thresholds.good, dec!(50));
    }

    #[test]
    fn alert_serializes_kind_as_type() {
        let alerts = classify_stock(dec!(0), dec!(0), &StockThresholds::default());
        let json = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(json["type"], "out_of_count");
        assert_eq!(json["level"], "critical");
    }
}
