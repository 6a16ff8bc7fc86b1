//! Domain Events for content stores
//!
//! Stores emit these events on a tokio broadcast channel whenever persisted
//! data changes, so observers (and tests) can follow writes without coupling
//! to the store implementation.

use crate::models::{ContentNode, NodeId};

/// Domain events emitted by content stores
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A node was assigned an identity and stored
    NodeCreated(ContentNode),

    /// An existing node was overwritten
    NodeUpdated(ContentNode),

    /// A node was removed
    NodeDeleted { id: NodeId },
}

impl DomainEvent {
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodeDeleted { .. } => "node:deleted",
        }
    }

    /// Identity of the node the event is about
    pub fn node_id(&self) -> NodeId {
        match self {
            DomainEvent::NodeCreated(node) | DomainEvent::NodeUpdated(node) => node.id,
            DomainEvent::NodeDeleted { id } => *id,
        }
    }

    /// Whether the event represents a persistence write (create or update)
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            DomainEvent::NodeCreated(_) | DomainEvent::NodeUpdated(_)
        )
    }
}
