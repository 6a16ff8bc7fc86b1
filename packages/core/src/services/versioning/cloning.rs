//! Version cloning
//!
//! Produces detached shadow copies of a live subtree. The copy of a page
//! carries copies of all its parts (recursively); nested pages stay behind in
//! the live tree.

use crate::behaviors::TypeDescriptor;
use crate::models::time::TimeProvider;
use crate::models::{ContentNode, ContentState, ContentTree, UNSAVED_ID};
use crate::services::error::ContentServiceError;
use crate::services::state_changer::StateChanger;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Clones live subtrees into detached version trees
#[derive(Clone)]
pub struct VersionCloner {
    descriptor: Arc<dyn TypeDescriptor>,
    clock: Arc<dyn TimeProvider>,
}

impl VersionCloner {
    pub fn new(descriptor: Arc<dyn TypeDescriptor>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { descriptor, clock }
    }

    /// Clone `item` and its part subtree as a version of `item`.
    ///
    /// State of each clone, when a `state_changer` is given:
    ///
    /// | source state | `as_previous_version` | clone state |
    /// |--------------|-----------------------|-------------|
    /// | Published    | true                  | Unpublished |
    /// | Unpublished  | true                  | unchanged   |
    /// | any other    | true                  | Draft       |
    /// | any          | false                 | Draft       |
    ///
    /// Without a state changer the copied state is left alone.
    ///
    /// Each clone is detached (`parent_id = None`, trail `/`), points at its
    /// source through `version_of`, and has `expires`/`updated` set one second
    /// before now. Nothing is persisted.
    ///
    /// # Errors
    ///
    /// - `MissingDefinition` if any node in the subtree has an unregistered type
    /// - Whatever the state changer rejects
    pub fn clone_for_versioning(
        &self,
        item: &ContentTree,
        state_changer: Option<&dyn StateChanger>,
        as_previous_version: bool,
    ) -> Result<ContentTree, ContentServiceError> {
        let source = &item.node;
        let mut clone = self.copy_node(source)?;

        if let Some(changer) = state_changer {
            if source.state == ContentState::Published && as_previous_version {
                changer.change_to(&mut clone, ContentState::Unpublished)?;
            } else if source.state != ContentState::Unpublished || !as_previous_version {
                changer.change_to(&mut clone, ContentState::Draft)?;
            }
        }

        let timestamp = self.clock.version_timestamp();
        clone.expires = Some(timestamp);
        clone.updated = timestamp;
        clone.detach();
        clone.version_of = Some(source.id);

        let mut tree = ContentTree::new(clone);
        for part in item.part_children() {
            tree.add_child(self.clone_for_versioning(part, state_changer, as_previous_version)?);
        }

        tracing::debug!(
            source = source.id,
            parts = tree.children.len(),
            "Cloned node for versioning"
        );
        Ok(tree)
    }

    /// Field-by-field copy without identity, position or version reference
    fn copy_node(&self, source: &ContentNode) -> Result<ContentNode, ContentServiceError> {
        let definition = self
            .descriptor
            .definition_for(&source.content_type)
            .ok_or_else(|| ContentServiceError::missing_definition(&source.content_type))?;

        let details: BTreeMap<_, _> = source
            .details
            .iter()
            .filter(|(key, _)| definition.is_copyable(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(ContentNode {
            id: UNSAVED_ID,
            content_type: source.content_type.clone(),
            kind: source.kind,
            name: source.name.clone(),
            title: source.title.clone(),
            state: source.state,
            published: source.published,
            expires: source.expires,
            created: source.created,
            updated: source.updated,
            sort_order: source.sort_order,
            parent_id: None,
            ancestral_trail: source.ancestral_trail.clone(),
            version_of: None,
            details,
        })
    }
}
