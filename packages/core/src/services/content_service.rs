//! Content Service - Persister Facade
//!
//! This module provides the save pipeline every write goes through:
//!
//! - Position resolution (parent lookup, ancestral trail)
//! - Validation
//! - Persistence through the configured `ContentStore`
//! - Save hooks (e.g. translation linkage) that may amend and re-save the node
//! - Trail maintenance for descendants of moved nodes
//!
//! It also loads and saves whole subtrees (`ContentTree`) for versioning.

use crate::db::{ContentStore, StoreError};
use crate::models::{ContentNode, ContentTree, NodeId};
use crate::services::context::RequestContext;
use crate::services::error::ContentServiceError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Hook invoked after each save of a node
#[async_trait]
pub trait SaveHook: Send + Sync {
    /// Inspect (and possibly amend) a node that was just persisted.
    ///
    /// Return `true` when `node` was modified and has to be stored again.
    async fn on_saved(
        &self,
        node: &mut ContentNode,
        ctx: &RequestContext,
    ) -> Result<bool, ContentServiceError>;
}

/// Persister facade over a `ContentStore`
///
/// # Examples
///
/// ```rust
/// use contentspace_core::db::InMemoryStore;
/// use contentspace_core::models::ContentNode;
/// use contentspace_core::services::{ContentService, RequestContext};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let service = ContentService::new(Arc::new(InMemoryStore::new()));
/// let ctx = RequestContext::new();
///
/// let root = service.save(ContentNode::page("root"), &ctx).await?;
/// let child = service.save(ContentNode::page("child").with_parent(root.id), &ctx).await?;
/// assert_eq!(child.ancestral_trail, format!("/{}/", root.id));
/// # Ok::<(), contentspace_core::services::ContentServiceError>(())
/// # });
/// ```
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    hooks: Vec<Arc<dyn SaveHook>>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            hooks: Vec::new(),
        }
    }

    /// Register a save hook (builder style). Hooks run in registration order.
    pub fn with_hook(mut self, hook: Arc<dyn SaveHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Get access to the underlying store
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Save a node
    ///
    /// Resolves the trail from the stored parent, validates, persists, runs the
    /// save hooks and re-persists if a hook changed the node. When an existing
    /// node moved, every descendant's trail is rewritten and its hooks rerun.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for structurally invalid nodes
    /// - `Store(ParentNotFound)` when the parent does not exist
    /// - `Store(NodeNotFound)` when updating an identity the store does not hold
    pub async fn save(
        &self,
        mut node: ContentNode,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        self.resolve_position(&mut node).await?;
        node.validate()?;

        let previous_trail = if node.is_unsaved() {
            None
        } else {
            self.store
                .get(node.id)
                .await?
                .map(|stored| stored.ancestral_trail)
        };

        let saved = self.store.save(node).await?;
        let saved = self.run_hooks(saved, ctx).await?;

        if previous_trail.is_some_and(|trail| trail != saved.ancestral_trail) {
            self.refresh_descendant_trails(&saved, ctx).await?;
        }

        tracing::debug!(id = saved.id, trail = %saved.ancestral_trail, "Saved content node");
        Ok(saved)
    }

    /// Move a node under a new parent (or detach it with `None`)
    pub async fn move_node(
        &self,
        id: NodeId,
        new_parent_id: Option<NodeId>,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        let mut node = self.require(id).await?;
        node.parent_id = new_parent_id;
        self.save(node, ctx).await
    }

    pub async fn get(&self, id: NodeId) -> Result<Option<ContentNode>, ContentServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Get a node that must exist
    pub async fn require(&self, id: NodeId) -> Result<ContentNode, ContentServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ContentServiceError::node_not_found(id))
    }

    pub async fn children(&self, id: NodeId) -> Result<Vec<ContentNode>, ContentServiceError> {
        Ok(self.store.children(id).await?)
    }

    /// Delete a node and its descendants, returning the number removed
    pub async fn delete(&self, id: NodeId) -> Result<usize, ContentServiceError> {
        let removed = self.store.delete(id).await?;
        tracing::debug!(id, removed, "Deleted content subtree");
        Ok(removed)
    }

    /// Stored ancestors of `node`, nearest first
    pub async fn ancestors(
        &self,
        node: &ContentNode,
    ) -> Result<Vec<ContentNode>, ContentServiceError> {
        let mut ancestors = Vec::new();
        for id in node.ancestor_ids().into_iter().rev() {
            if let Some(ancestor) = self.store.get(id).await? {
                ancestors.push(ancestor);
            }
        }
        Ok(ancestors)
    }

    /// Load a node together with all its stored descendants
    ///
    /// Children are fetched level by level into an adjacency list, then the
    /// nested tree is assembled from it.
    pub async fn get_tree(&self, id: NodeId) -> Result<Option<ContentTree>, ContentServiceError> {
        let Some(root) = self.store.get(id).await? else {
            return Ok(None);
        };

        let mut adjacency: HashMap<NodeId, Vec<ContentNode>> = HashMap::new();
        let mut pending = VecDeque::from([root.id]);
        while let Some(parent_id) = pending.pop_front() {
            let children = self.store.children(parent_id).await?;
            pending.extend(children.iter().map(|child| child.id));
            adjacency.insert(parent_id, children);
        }

        Ok(Some(assemble_tree(root, &mut adjacency)))
    }

    /// Persist a whole tree top-down.
    ///
    /// The root keeps its own `parent_id` (a detached version root stays
    /// detached); every descendant is wired to its freshly saved parent.
    pub async fn save_tree(
        &self,
        tree: ContentTree,
        ctx: &RequestContext,
    ) -> Result<ContentTree, ContentServiceError> {
        let ContentTree { node, children } = tree;
        let root = self.save(node, ctx).await?;

        let mut adjacency: HashMap<NodeId, Vec<ContentNode>> = HashMap::new();
        let mut pending = VecDeque::from([(root.id, children)]);
        while let Some((parent_id, children)) = pending.pop_front() {
            let mut saved_children = Vec::with_capacity(children.len());
            for child in children {
                let ContentTree {
                    mut node,
                    children: grandchildren,
                } = child;
                node.parent_id = Some(parent_id);
                let stored = self.save(node, ctx).await?;
                pending.push_back((stored.id, grandchildren));
                saved_children.push(stored);
            }
            adjacency.insert(parent_id, saved_children);
        }

        Ok(assemble_tree(root, &mut adjacency))
    }

    async fn resolve_position(&self, node: &mut ContentNode) -> Result<(), ContentServiceError> {
        match node.parent_id {
            Some(parent_id) => {
                let parent = self
                    .store
                    .get(parent_id)
                    .await?
                    .ok_or_else(|| StoreError::parent_not_found(parent_id))?;
                node.attach_to(&parent);
            }
            None => node.detach(),
        }
        Ok(())
    }

    /// Run every hook on a persisted node, storing it again when one changed it
    async fn run_hooks(
        &self,
        mut node: ContentNode,
        ctx: &RequestContext,
    ) -> Result<ContentNode, ContentServiceError> {
        let mut changed = false;
        for hook in &self.hooks {
            changed |= hook.on_saved(&mut node, ctx).await?;
        }
        if changed {
            node = self.store.save(node).await?;
        }
        Ok(node)
    }

    /// Rewrite the trails below a moved node. Descendants go through the
    /// hooks too since their position changed with it.
    async fn refresh_descendant_trails(
        &self,
        moved: &ContentNode,
        ctx: &RequestContext,
    ) -> Result<(), ContentServiceError> {
        let mut pending = vec![moved.clone()];
        while let Some(parent) = pending.pop() {
            for mut child in self.store.children(parent.id).await? {
                child.attach_to(&parent);
                let stored = self.store.save(child).await?;
                pending.push(self.run_hooks(stored, ctx).await?);
            }
        }
        Ok(())
    }
}

fn assemble_tree(
    node: ContentNode,
    adjacency: &mut HashMap<NodeId, Vec<ContentNode>>,
) -> ContentTree {
    let children = adjacency.remove(&node.id).unwrap_or_default();
    ContentTree {
        children: children
            .into_iter()
            .map(|child| assemble_tree(child, adjacency))
            .collect(),
        node,
    }
}
