//! Store Error Types
//!
//! This module defines error types for content store operations. Higher-level
//! failures (missing masters, rejected state changes) are service-layer errors.

use crate::models::NodeId;
use thiserror::Error;

/// Content store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Update of an identity the store does not hold
    #[error("Node {id} does not exist in the store")]
    NodeNotFound { id: NodeId },

    /// Save referencing a parent the store does not hold
    #[error("Parent node {id} does not exist in the store")]
    ParentNotFound { id: NodeId },

    /// Backend specific failure
    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn node_not_found(id: NodeId) -> Self {
        Self::NodeNotFound { id }
    }

    pub fn parent_not_found(id: NodeId) -> Self {
        Self::ParentNotFound { id }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
