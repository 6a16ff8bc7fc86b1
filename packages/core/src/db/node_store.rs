//! ContentStore Trait - Storage Abstraction Layer
//!
//! This module defines the `ContentStore` trait that abstracts persistence of
//! content nodes. Versioning and translation logic only talk to this trait, so
//! any backend able to save, load and query flat node records can host the tree.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so embedded and networked backends fit
//! 2. **Ownership Semantics**: `save` takes the node by value and returns the stored copy
//! 3. **Identity Assignment**: A node with id `0` is new; the store assigns its identity
//! 4. **Visibility**: Writes are visible to every subsequent read on the same store
//!
//! # Examples
//!
//! ```rust
//! use contentspace_core::db::{ContentStore, InMemoryStore};
//! use contentspace_core::models::ContentNode;
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryStore::new();
//! let saved = store.save(ContentNode::page("home")).await?;
//! assert_ne!(saved.id, 0);
//! assert_eq!(store.get(saved.id).await?, Some(saved));
//! # Ok::<(), contentspace_core::db::StoreError>(())
//! # });
//! ```

use crate::db::StoreError;
use crate::models::{ContentNode, DetailValue, NodeId};
use async_trait::async_trait;

/// Abstraction layer for content node persistence
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so services holding an
/// `Arc<dyn ContentStore>` can be shared across tasks.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert or overwrite a node
    ///
    /// # Returns
    ///
    /// The stored node, with an identity assigned when `node.id` was `0`.
    ///
    /// # Errors
    ///
    /// - `StoreError::NodeNotFound` if `node.id` is non-zero and unknown
    /// - `StoreError::ParentNotFound` if `node.parent_id` is unknown
    async fn save(&self, node: ContentNode) -> Result<ContentNode, StoreError>;

    /// Get node by identity (`Ok(None)` when absent, not an error)
    async fn get(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError>;

    /// Delete a node and all its descendants
    ///
    /// Returns the number of nodes removed (`0` if `id` was unknown).
    async fn delete(&self, id: NodeId) -> Result<usize, StoreError>;

    /// Direct children of `parent_id`, ordered by sort order then identity
    async fn children(&self, parent_id: NodeId) -> Result<Vec<ContentNode>, StoreError>;

    /// Nodes whose detail `key` equals `value`, ordered by identity
    ///
    /// Only nodes carrying the detail themselves are returned; nothing is
    /// inherited through ancestry. Values are compared with
    /// [`DetailValue::matches`], so a reference also finds integer ids.
    async fn find_by_detail(
        &self,
        key: &str,
        value: &DetailValue,
    ) -> Result<Vec<ContentNode>, StoreError>;

    /// Root nodes of every stored version of `master_id`, ordered by identity
    async fn versions_of(&self, master_id: NodeId) -> Result<Vec<ContentNode>, StoreError>;
}
