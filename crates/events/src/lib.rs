//! Ledger events and their distribution.
//!
//! Registries never publish anything themselves: they return the committed record, the
//! domain crates describe the fact as an [`Event`], and the service layer wraps it in an
//! [`EventEnvelope`] and hands it to an [`EventBus`] once the write is durable.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
