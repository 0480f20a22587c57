//! Event mechanics: the `Event` contract and an in-process pub/sub bus.
//!
//! Domain crates define their own event enums; this crate only knows how to move
//! them around.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
