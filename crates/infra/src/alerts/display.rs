use stockledger_inventory::AlertLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl From<AlertLevel> for Severity {
    fn from(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Critical => Severity::Error,
            AlertLevel::Warning => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("display failed: {0}")]
pub struct DisplayError(pub String);

/// User-facing message sink (toast, status bar, terminal...).
pub trait MessageDisplay: Send + Sync {
    fn display(&self, message: &str, severity: Severity) -> Result<(), DisplayError>;
}

/// Writes messages to the log. Default sink for headless embedding.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDisplay;

impl MessageDisplay for TracingDisplay {
    fn display(&self, message: &str, severity: Severity) -> Result<(), DisplayError> {
        match severity {
            Severity::Info => tracing::info!(target: "stockledger::display", "{message}"),
            Severity::Warning => tracing::warn!(target: "stockledger::display", "{message}"),
            Severity::Error => tracing::error!(target: "stockledger::display", "{message}"),
        }
        Ok(())
    }
}

/// Captures display calls for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingDisplay {
    calls: std::sync::Mutex<Vec<(String, Severity)>>,
    fail: bool,
}

#[cfg(test)]
impl RecordingDisplay {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, Severity)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl MessageDisplay for RecordingDisplay {
    fn display(&self, message: &str, severity: Severity) -> Result<(), DisplayError> {
        self.calls.lock().unwrap().push((message.to_string(), severity));
        if self.fail {
            return Err(DisplayError("renderer gone".to_string()));
        }
        Ok(())
    }
}
