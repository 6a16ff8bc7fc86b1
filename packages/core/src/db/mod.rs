//! Storage Layer
//!
//! This module defines how content nodes are persisted:
//!
//! - `ContentStore` - async persistence trait consumed by all services
//! - `InMemoryStore` - process-local implementation broadcasting domain events
//! - `StoreError` - storage failures
//! - `DomainEvent` - notifications emitted on every write and delete
//!
//! Durable backends plug in by implementing `ContentStore`; nothing above this
//! layer depends on a concrete store.

mod error;
pub mod events;
mod memory_store;
mod node_store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use memory_store::InMemoryStore;
pub use node_store::ContentStore;
