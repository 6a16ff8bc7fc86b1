//! Version management and publishing
//!
//! Creates versions of live pages, merges edited versions back into their
//! masters and publishes the result.
//!
//! # Merging
//!
//! Replacing a master with a version keeps the master's identity and position
//! and copies the version's content over it. Parts are merged with the
//! resolver's correspondence rules:
//!
//! - a live part with a counterpart in the version is updated in place
//! - a live part without one is deleted
//! - a version part matching no live part is added as a new part
//!
//! Child pages of the master are never touched. A persisted version tree is
//! removed once merged.

use crate::behaviors::{DefinitionRegistry, TypeDescriptor};
use crate::config::VersioningConfig;
use crate::models::time::{SystemTimeProvider, TimeProvider};
use crate::models::{ContentNode, ContentState, ContentTree, NodeId};
use crate::services::content_service::ContentService;
use crate::services::context::RequestContext;
use crate::services::error::ContentServiceError;
use crate::services::state_changer::{StateChanger, WorkflowStateChanger};
use crate::services::versioning::cloning::VersionCloner;
use crate::services::versioning::resolver::is_counterpart;
use std::sync::Arc;

/// Creates, merges and publishes versions
#[derive(Clone)]
pub struct VersionManager {
    content: ContentService,
    cloner: VersionCloner,
    descriptor: Arc<dyn TypeDescriptor>,
    state_changer: Arc<dyn StateChanger>,
    clock: Arc<dyn TimeProvider>,
    config: VersioningConfig,
}

impl VersionManager {
    pub fn new(
        content: ContentService,
        descriptor: Arc<dyn TypeDescriptor>,
        state_changer: Arc<dyn StateChanger>,
        clock: Arc<dyn TimeProvider>,
        config: VersioningConfig,
    ) -> Self {
        Self {
            cloner: VersionCloner::new(descriptor.clone(), clock.clone()),
            content,
            descriptor,
            state_changer,
            clock,
            config,
        }
    }

    /// Manager using the built-in definitions, the default workflow and the system clock
    pub fn with_defaults(content: ContentService) -> Self {
        Self::new(
            content,
            Arc::new(DefinitionRegistry::new()),
            Arc::new(WorkflowStateChanger),
            Arc::new(SystemTimeProvider),
            VersioningConfig::default(),
        )
    }

    pub fn cloner(&self) -> &VersionCloner {
        &self.cloner
    }

    pub fn content(&self) -> &ContentService {
        &self.content
    }

    pub fn is_versionable(&self, node: &ContentNode) -> bool {
        self.descriptor.is_versionable(node)
    }

    /// Archive the current state of `master_id` as a previous version
    pub async fn add_version(
        &self,
        master_id: NodeId,
        ctx: &RequestContext,
    ) -> Result<ContentTree, ContentServiceError> {
        let master = self.load_versionable(master_id).await?;
        let snapshot = self.cloner.clone_for_versioning(
            &master,
            Some(self.state_changer.as_ref()),
            true,
        )?;
        let saved = self.content.save_tree(snapshot, ctx).await?;
        self.trim_versions(master_id).await?;

        tracing::info!(master_id, version_id = saved.id(), "Added version");
        Ok(saved)
    }

    /// Create a persisted draft of `master_id` for editing
    pub async fn create_draft(
        &self,
        master_id: NodeId,
        ctx: &RequestContext,
    ) -> Result<ContentTree, ContentServiceError> {
        let master = self.load_versionable(master_id).await?;
        let draft = self.cloner.clone_for_versioning(
            &master,
            Some(self.state_changer.as_ref()),
            false,
        )?;
        let saved = self.content.save_tree(draft, ctx).await?;

        tracing::info!(master_id, draft_id = saved.id(), "Created draft");
        Ok(saved)
    }

    /// Stored versions of `master_id`, newest first
    pub async fn versions_of(
        &self,
        master_id: NodeId,
    ) -> Result<Vec<ContentNode>, ContentServiceError> {
        let mut versions = self.content.store().versions_of(master_id).await?;
        versions.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(versions)
    }

    /// Delete the oldest archived versions beyond the configured maximum.
    ///
    /// Drafts are never trimmed. Returns the number of versions deleted.
    pub async fn trim_versions(&self, master_id: NodeId) -> Result<usize, ContentServiceError> {
        let max = self.config.max_versions_per_item;
        if max == 0 {
            return Ok(0);
        }

        let surplus: Vec<ContentNode> = self
            .versions_of(master_id)
            .await?
            .into_iter()
            .filter(|version| version.state != ContentState::Draft)
            .skip(max)
            .collect();

        for version in &surplus {
            self.content.delete(version.id).await?;
        }

        if !surplus.is_empty() {
            tracing::debug!(master_id, trimmed = surplus.len(), "Trimmed versions");
        }
        Ok(surplus.len())
    }

    /// Replace the content of `master_id` with `version`.
    ///
    /// With `store_current` the master's current state is archived as a
    /// previous version first.
    ///
    /// # Errors
    ///
    /// `MasterNotFound` if the master no longer exists.
    pub async fn replace_version(
        &self,
        master_id: NodeId,
        version: &ContentTree,
        store_current: bool,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        let live = self
            .content
            .get_tree(master_id)
            .await?
            .ok_or_else(|| ContentServiceError::master_not_found(master_id, version.id()))?;

        if store_current {
            let archived = self.cloner.clone_for_versioning(
                &live,
                Some(self.state_changer.as_ref()),
                true,
            )?;
            let archived = self.content.save_tree(archived, ctx).await?;
            tracing::info!(master_id, version_id = archived.id(), "Archived master before replace");
        }

        let mut master = live.node.clone();
        master.take_content_from(&version.node);
        master.updated = self.clock.now();
        let master = self.content.save(master, ctx).await?;

        self.merge_parts(&live, version, ctx).await?;

        if !version.node.is_unsaved() && version.id() != master_id {
            self.content.delete(version.id()).await?;
        }
        if store_current {
            self.trim_versions(master_id).await?;
        }

        tracing::info!(master_id, version_id = version.id(), "Replaced master with version");
        Ok(master)
    }

    /// Make `version` the master.
    ///
    /// A node that is not a version already is the master and is returned
    /// unchanged. Otherwise its master's content is replaced, archiving the
    /// master first when it is currently published.
    pub async fn make_master_version(
        &self,
        version: &ContentTree,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        let Some(master_id) = version.node.version_of else {
            return Ok(version.node.clone());
        };

        let master = self
            .content
            .get(master_id)
            .await?
            .ok_or_else(|| ContentServiceError::master_not_found(master_id, version.id()))?;
        let store_current = master.state == ContentState::Published;

        self.replace_version(master_id, version, store_current, ctx)
            .await
    }

    /// Publish a previewed item, merging it into its master first when it is a version.
    ///
    /// The node is only persisted when its state changes, so republishing an
    /// already published master is a no-op.
    pub async fn publish(
        &self,
        previewed: &ContentTree,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        let mut item = if previewed.node.is_version() {
            self.make_master_version(previewed, ctx).await?
        } else {
            previewed.node.clone()
        };

        if item.state != ContentState::Published {
            self.state_changer
                .change_to(&mut item, ContentState::Published)?;
            if item.published.is_none() {
                item.published = Some(self.clock.now());
            }
            item = self.content.save(item, ctx).await?;
            tracing::info!(id = item.id, "Published node");
        }

        Ok(item)
    }

    async fn load_versionable(&self, id: NodeId) -> Result<ContentTree, ContentServiceError> {
        let tree = self
            .content
            .get_tree(id)
            .await?
            .ok_or_else(|| ContentServiceError::node_not_found(id))?;

        if !self.is_versionable(&tree.node) {
            return Err(ContentServiceError::not_versionable(
                id,
                tree.node.content_type.as_str(),
            ));
        }
        Ok(tree)
    }

    /// Merge the part subtrees of `edited` into the stored `live` tree
    async fn merge_parts(
        &self,
        live: &ContentTree,
        edited: &ContentTree,
        ctx: &RequestContext,
    ) -> Result<(), ContentServiceError> {
        let now = self.clock.now();
        let mut pending = vec![(live, edited)];

        while let Some((live, edited)) = pending.pop() {
            let mut matched = vec![false; edited.children.len()];

            for live_part in live.part_children() {
                let counterpart = edited.children.iter().enumerate().find(|(index, candidate)| {
                    !matched[*index]
                        && !candidate.node.is_page()
                        && is_counterpart(&candidate.node, &live_part.node)
                });

                match counterpart {
                    Some((index, edited_part)) => {
                        matched[index] = true;
                        let mut node = live_part.node.clone();
                        node.take_content_from(&edited_part.node);
                        node.updated = now;
                        self.content.save(node, ctx).await?;
                        pending.push((live_part, edited_part));
                    }
                    None => {
                        tracing::debug!(id = live_part.id(), "Removing part dropped by version");
                        self.content.delete(live_part.id()).await?;
                    }
                }
            }

            for (index, edited_part) in edited.children.iter().enumerate() {
                if matched[index] || edited_part.node.is_page() {
                    continue;
                }
                let mut addition = edited_part.to_new_subtree();
                addition.node.parent_id = Some(live.id());
                let added = self.content.save_tree(addition, ctx).await?;
                tracing::debug!(id = added.id(), parent = live.id(), "Added part from version");
            }
        }

        Ok(())
    }
}
