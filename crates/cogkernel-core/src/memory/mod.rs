//! Memory Module
//!
//! Data handed to the kernel by the event store:
//! - Records (id, importance, content)
//! - Node attributes for one ranking pass
//! - Weighted relations between memories
//! - A small in-memory bank that derives both from recorded events

mod bank;
mod node;

pub use bank::{
    DEFAULT_RECENCY_HALF_LIFE_SECS, GraphInputs, MemoryBank, MemoryBankError, MemorySource,
    StoredEvent,
};
pub use node::{Edge, MemoryNode, MemoryRecord};
