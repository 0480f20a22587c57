//! Stock alert notification: cooldown bookkeeping, display port, and the engine tying
//! them to the pure classification rules.

pub mod cooldown;
pub mod display;
pub mod engine;

pub use cooldown::CooldownCache;
pub use display::{DisplayError, MessageDisplay, Severity, TracingDisplay};
pub use engine::AlertEngine;
