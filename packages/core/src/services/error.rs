//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations: saving,
//! versioning, publishing and translation management.

use crate::db::StoreError;
use crate::models::{ContentState, NodeId, ValidationError};
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ContentServiceError {
    /// Node not found by ID
    #[error("Node not found: {id}")]
    NodeNotFound { id: NodeId },

    /// The master a version points at no longer exists
    #[error("Master node {master_id} of version {version_id} does not exist")]
    MasterNotFound { master_id: NodeId, version_id: NodeId },

    /// No type definition for a node's content type
    #[error("No content definition registered for type '{content_type}'")]
    MissingDefinition { content_type: String },

    /// The node's type forbids versions
    #[error("Node {id} of type '{content_type}' is not versionable")]
    NotVersionable { id: NodeId, content_type: String },

    /// Workflow rejected a state transition
    #[error("Node {id} cannot change state from {from} to {to}")]
    StateChangeRejected {
        id: NodeId,
        from: ContentState,
        to: ContentState,
    },

    /// Validation failed for node
    #[error("Node validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Store operation failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl ContentServiceError {
    /// Create a node not found error
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    /// Create a master not found error
    pub fn master_not_found(master_id: NodeId, version_id: NodeId) -> Self {
        Self::MasterNotFound {
            master_id,
            version_id,
        }
    }

    /// Create a missing definition error
    pub fn missing_definition(content_type: impl Into<String>) -> Self {
        Self::MissingDefinition {
            content_type: content_type.into(),
        }
    }

    /// Create a not versionable error
    pub fn not_versionable(id: NodeId, content_type: impl Into<String>) -> Self {
        Self::NotVersionable {
            id,
            content_type: content_type.into(),
        }
    }

    /// Create a rejected state change error
    pub fn state_change_rejected(id: NodeId, from: ContentState, to: ContentState) -> Self {
        Self::StateChangeRejected { id, from, to }
    }
}
