//! In-memory ContentStore
//!
//! Holds nodes in a `BTreeMap` behind a tokio `RwLock` and allocates
//! identities from an atomic counter. Every write is broadcast as a
//! `DomainEvent`.

use crate::db::events::DomainEvent;
use crate::db::{ContentStore, StoreError};
use crate::models::{ContentNode, DetailValue, NodeId};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, RwLock};

/// Broadcast channel capacity for store events.
///
/// Large enough for a whole subtree save between two receiver polls; lagging
/// observers only lose history, never current state.
const STORE_EVENT_CHANNEL_CAPACITY: usize = 256;

/// ContentStore keeping all nodes in process memory
pub struct InMemoryStore {
    nodes: RwLock<BTreeMap<NodeId, ContentNode>>,
    next_id: AtomicU64,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(STORE_EVENT_CHANNEL_CAPACITY);

        Self {
            nodes: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            event_tx,
        }
    }

    /// Subscribe to write and delete events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Number of stored nodes
    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    fn emit_event(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn save(&self, mut node: ContentNode) -> Result<ContentNode, StoreError> {
        let mut nodes = self.nodes.write().await;

        if let Some(parent_id) = node.parent_id {
            if !nodes.contains_key(&parent_id) {
                return Err(StoreError::parent_not_found(parent_id));
            }
        }

        let created = node.is_unsaved();
        if created {
            node.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        } else if !nodes.contains_key(&node.id) {
            return Err(StoreError::node_not_found(node.id));
        }

        nodes.insert(node.id, node.clone());
        drop(nodes);

        tracing::debug!(id = node.id, created, "Stored content node");
        if created {
            self.emit_event(DomainEvent::NodeCreated(node.clone()));
        } else {
            self.emit_event(DomainEvent::NodeUpdated(node.clone()));
        }

        Ok(node)
    }

    async fn get(&self, id: NodeId) -> Result<Option<ContentNode>, StoreError> {
        Ok(self.nodes.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: NodeId) -> Result<usize, StoreError> {
        let mut nodes = self.nodes.write().await;
        if !nodes.contains_key(&id) {
            return Ok(0);
        }

        let mut doomed = vec![id];
        let mut index = 0;
        while index < doomed.len() {
            let parent = doomed[index];
            doomed.extend(
                nodes
                    .values()
                    .filter(|node| node.parent_id == Some(parent))
                    .map(|node| node.id),
            );
            index += 1;
        }

        for id in &doomed {
            nodes.remove(id);
        }
        drop(nodes);

        for id in &doomed {
            self.emit_event(DomainEvent::NodeDeleted { id: *id });
        }
        tracing::debug!(id, removed = doomed.len(), "Deleted content subtree");

        Ok(doomed.len())
    }

    async fn children(&self, parent_id: NodeId) -> Result<Vec<ContentNode>, StoreError> {
        let nodes = self.nodes.read().await;
        let mut children: Vec<ContentNode> = nodes
            .values()
            .filter(|node| node.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|node| (node.sort_order, node.id));
        Ok(children)
    }

    async fn find_by_detail(
        &self,
        key: &str,
        value: &DetailValue,
    ) -> Result<Vec<ContentNode>, StoreError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .values()
            .filter(|node| node.detail(key).is_some_and(|detail| detail.matches(value)))
            .cloned()
            .collect())
    }

    async fn versions_of(&self, master_id: NodeId) -> Result<Vec<ContentNode>, StoreError> {
        let nodes = self.nodes.read().await;
        Ok(nodes
            .values()
            .filter(|node| node.version_of == Some(master_id) && node.parent_id.is_none())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentNode, DetailValue};

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let first = store.save(ContentNode::page("a")).await.unwrap();
        let second = store.save(ContentNode::page("b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_save_unknown_id_fails() {
        let store = InMemoryStore::new();
        let mut ghost = ContentNode::page("ghost");
        ghost.id = 99;

        let result = store.save(ghost).await;
        assert!(matches!(result, Err(StoreError::NodeNotFound { id: 99 })));
    }

    #[tokio::test]
    async fn test_save_unknown_parent_fails() {
        let store = InMemoryStore::new();
        let orphan = ContentNode::page("orphan").with_parent(42);

        let result = store.save(orphan).await;
        assert!(matches!(result, Err(StoreError::ParentNotFound { id: 42 })));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_children_ordered_by_sort_order_then_id() {
        let store = InMemoryStore::new();
        let root = store.save(ContentNode::page("root")).await.unwrap();

        let mut late = ContentNode::page("late").with_parent(root.id);
        late.sort_order = 5;
        let late = store.save(late).await.unwrap();
        let first = store
            .save(ContentNode::page("first").with_parent(root.id))
            .await
            .unwrap();
        let second = store
            .save(ContentNode::page("second").with_parent(root.id))
            .await
            .unwrap();

        let ids: Vec<NodeId> = store
            .children(root.id)
            .await
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id, late.id]);
    }

    #[tokio::test]
    async fn test_delete_removes_descendants() {
        let store = InMemoryStore::new();
        let root = store.save(ContentNode::page("root")).await.unwrap();
        let child = store
            .save(ContentNode::page("child").with_parent(root.id))
            .await
            .unwrap();
        store
            .save(ContentNode::part("part").with_parent(child.id))
            .await
            .unwrap();
        let other = store.save(ContentNode::page("other")).await.unwrap();

        assert_eq!(store.delete(child.id).await.unwrap(), 2);
        assert_eq!(store.delete(child.id).await.unwrap(), 0);
        assert!(store.get(root.id).await.unwrap().is_some());
        assert!(store.get(other.id).await.unwrap().is_some());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_by_detail_matches_direct_values_only() {
        let store = InMemoryStore::new();
        let mut tagged = ContentNode::page("tagged");
        tagged.set_detail("Color", DetailValue::String("red".to_string()));
        let tagged = store.save(tagged).await.unwrap();
        store
            .save(ContentNode::part("untagged").with_parent(tagged.id))
            .await
            .unwrap();

        let found = store
            .find_by_detail("Color", &DetailValue::String("red".to_string()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tagged.id);
    }

    #[tokio::test]
    async fn test_find_by_reference_matches_integer_ids() {
        let store = InMemoryStore::new();
        let mut legacy = ContentNode::page("legacy");
        legacy.set_detail("LanguageKey", DetailValue::Integer(7));
        let legacy = store.save(legacy).await.unwrap();
        let mut current = ContentNode::page("current");
        current.set_detail("LanguageKey", DetailValue::Reference(7));
        let current = store.save(current).await.unwrap();

        let found: Vec<NodeId> = store
            .find_by_detail("LanguageKey", &DetailValue::Reference(7))
            .await
            .unwrap()
            .iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(found, vec![legacy.id, current.id]);
    }

    #[tokio::test]
    async fn test_versions_of_returns_detached_roots() {
        let store = InMemoryStore::new();
        let master = store.save(ContentNode::page("master")).await.unwrap();

        let mut version = ContentNode::page("master");
        version.version_of = Some(master.id);
        let version = store.save(version).await.unwrap();

        let mut nested = ContentNode::part("nested").with_parent(version.id);
        nested.version_of = Some(master.id);
        store.save(nested).await.unwrap();

        let versions = store.versions_of(master.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].id, version.id);
    }

    #[tokio::test]
    async fn test_writes_are_broadcast() {
        let store = InMemoryStore::new();
        let mut rx = store.subscribe_to_events();

        let node = store.save(ContentNode::page("p")).await.unwrap();
        store.save(node.clone()).await.unwrap();
        store.delete(node.id).await.unwrap();

        let types: Vec<String> = (0..3)
            .map(|_| rx.try_recv().unwrap().event_type().to_string())
            .collect();
        assert_eq!(types, vec!["node:created", "node:updated", "node:deleted"]);
        assert!(rx.try_recv().is_err());
    }
}
