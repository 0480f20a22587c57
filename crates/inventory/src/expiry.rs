//! Expiry classification for batches.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Critical,
    Warning,
    Good,
}

/// Day windows used to classify remaining shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpiryWindows {
    pub critical_days: i64,
    pub warning_days: i64,
}

impl Default for ExpiryWindows {
    fn default() -> Self {
        Self {
            critical_days: 7,
            warning_days: 30,
        }
    }
}

impl ExpiryWindows {
    pub fn classify(&self, days_until_expiry: i64) -> ExpiryStatus {
        if days_until_expiry < 0 {
            ExpiryStatus::Expired
        } else if days_until_expiry <= self.critical_days {
            ExpiryStatus::Critical
        } else if days_until_expiry <= self.warning_days {
            ExpiryStatus::Warning
        } else {
            ExpiryStatus::Good
        }
    }

    /// Batches without an expiry date never expire.
    pub fn classify_date(&self, expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
        match expiry {
            Some(date) => self.classify(days_until_expiry(date, today)),
            None => ExpiryStatus::Good,
        }
    }
}

/// Classify with the default 7/30 day windows.
pub fn classify_expiry(days_until_expiry: i64) -> ExpiryStatus {
    ExpiryWindows::default().classify(days_until_expiry)
}

/// Whole days from `today` until `expiry` (negative once expired).
pub fn days_until_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}
