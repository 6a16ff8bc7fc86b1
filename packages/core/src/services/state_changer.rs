//! Lifecycle state transitions
//!
//! Versioning never assigns `ContentNode::state` directly; it asks a
//! `StateChanger`, which may enforce workflow rules on top of the assignment.

use crate::models::{ContentNode, ContentState};
use crate::services::error::ContentServiceError;

/// Applies state transitions to nodes
pub trait StateChanger: Send + Sync {
    fn change_to(
        &self,
        node: &mut ContentNode,
        state: ContentState,
    ) -> Result<(), ContentServiceError>;
}

/// Default workflow: any transition is allowed except leaving `Deleted`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowStateChanger;

impl StateChanger for WorkflowStateChanger {
    fn change_to(
        &self,
        node: &mut ContentNode,
        state: ContentState,
    ) -> Result<(), ContentServiceError> {
        let from = node.state;
        if from == state {
            return Ok(());
        }

        if from == ContentState::Deleted {
            return Err(ContentServiceError::state_change_rejected(
                node.id, from, state,
            ));
        }

        node.state = state;
        tracing::debug!(id = node.id, %from, to = %state, "Changed node state");
        Ok(())
    }
}
