//! Language Gateway - Translation Linkage
//!
//! Pages stored under different language roots are linked as translations of
//! one logical page through a shared translation key (the identity of the
//! first page of the group).
//!
//! # Save-time linkage
//!
//! Registered as a [`SaveHook`], the gateway inspects every saved node:
//!
//! - Outside every language root: the key is removed
//! - Already keyed: the key is kept (stored as a reference)
//! - Otherwise: the ambient [`LANGUAGE_KEY`] from the request context is used when
//!   present, else the node's own identity (starting a new group)
//!
//! The gateway only reads the ambient key. Callers clear it (or drop the
//! [`RequestContext::scoped`] guard) once their operation is over.
//!
//! # Queries
//!
//! - `get_languages` - language roots directly under the site root
//! - `find_translations` - nodes sharing an item's translation key
//! - `get_translation_options` - per language: existing translation or new one

use crate::config::SiteConfig;
use crate::db::ContentStore;
use crate::models::{
    ContentNode, DetailValue, NodeId, TranslationOption, TRANSLATION_KEY, UNSAVED_ID,
};
use crate::services::content_service::SaveHook;
use crate::services::context::RequestContext;
use crate::services::error::ContentServiceError;
use async_trait::async_trait;
use std::sync::Arc;

/// Request context key carrying the translation key a save should join
pub const LANGUAGE_KEY: &str = TRANSLATION_KEY;

/// Discovers language roots and manages translation linkage
pub struct LanguageGateway {
    store: Arc<dyn ContentStore>,
    root_item_id: NodeId,
}

impl LanguageGateway {
    pub fn new(store: Arc<dyn ContentStore>, site: &SiteConfig) -> Self {
        Self {
            store,
            root_item_id: site.root_item_id,
        }
    }

    /// Language roots directly under the site root, in tree order
    pub async fn get_languages(&self) -> Result<Vec<ContentNode>, ContentServiceError> {
        Ok(self
            .store
            .children(self.root_item_id)
            .await?
            .into_iter()
            .filter(|node| node.is_language_root() && !node.is_version())
            .collect())
    }

    /// Nearest language root at or above `item`
    pub async fn get_language(
        &self,
        item: &ContentNode,
    ) -> Result<Option<ContentNode>, ContentServiceError> {
        if item.is_language_root() {
            return Ok(Some(item.clone()));
        }

        for id in item.ancestor_ids().into_iter().rev() {
            if let Some(ancestor) = self.store.get(id).await? {
                if ancestor.is_language_root() {
                    return Ok(Some(ancestor));
                }
            }
        }
        Ok(None)
    }

    /// Translations of `item`, `item` itself included.
    ///
    /// For a language root these are the site's language roots. Otherwise only
    /// live nodes tagged with the item's key are returned; descendants of a
    /// translation are not.
    pub async fn find_translations(
        &self,
        item: &ContentNode,
    ) -> Result<Vec<ContentNode>, ContentServiceError> {
        let Some(key) = item.translation_key() else {
            return Ok(Vec::new());
        };

        if item.is_language_root() {
            return self.get_languages().await;
        }

        Ok(self
            .store
            .find_by_detail(TRANSLATION_KEY, &DetailValue::Reference(key))
            .await?
            .into_iter()
            .filter(|node| !node.is_version())
            .collect())
    }

    /// One option per language: existing translations first, then the
    /// languages still missing one. Empty for items outside every language root.
    pub async fn get_translation_options(
        &self,
        item: &ContentNode,
    ) -> Result<Vec<TranslationOption>, ContentServiceError> {
        if item.translation_key().is_none() || self.get_language(item).await?.is_none() {
            return Ok(Vec::new());
        }

        let translations = self.find_translations(item).await?;
        let mut existing = Vec::new();
        let mut missing = Vec::new();

        for language in self.get_languages().await? {
            let translation = translations.iter().find(|candidate| {
                candidate.id == language.id || candidate.is_descendant_of(language.id)
            });
            match translation {
                Some(translation) => {
                    existing.push(TranslationOption::existing(language, translation.clone()))
                }
                None => missing.push(TranslationOption::missing(language)),
            }
        }

        existing.extend(missing);
        Ok(existing)
    }

    /// Link the given nodes as translations of the first one.
    ///
    /// Every node takes the first node's key (or its identity when it has none).
    pub async fn associate(
        &self,
        ids: &[NodeId],
    ) -> Result<Vec<ContentNode>, ContentServiceError> {
        let Some((&first_id, _)) = ids.split_first() else {
            return Ok(Vec::new());
        };

        let first = self.require(first_id).await?;
        let key = first.translation_key().unwrap_or(first.id);

        let mut associated = Vec::with_capacity(ids.len());
        for &id in ids {
            let mut node = self.require(id).await?;
            if node.translation_key() != Some(key) {
                node.set_translation_key(Some(key));
                node = self.store.save(node).await?;
            }
            associated.push(node);
        }

        tracing::info!(key, count = associated.len(), "Associated translations");
        Ok(associated)
    }

    /// Detach a node from its translation group; it starts a group of its own
    pub async fn unassociate(&self, id: NodeId) -> Result<ContentNode, ContentServiceError> {
        let mut node = self.require(id).await?;
        node.set_translation_key(Some(node.id));
        let node = self.store.save(node).await?;

        tracing::info!(id, "Unassociated translation");
        Ok(node)
    }

    async fn require(&self, id: NodeId) -> Result<ContentNode, ContentServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ContentServiceError::node_not_found(id))
    }
}

/// Translation key requested by the caller for the current operation
fn ambient_linkage_key(ctx: &RequestContext) -> Option<NodeId> {
    let raw = ctx.get(LANGUAGE_KEY)?;
    match raw.trim().parse::<NodeId>() {
        Ok(key) if key != UNSAVED_ID => Some(key),
        _ => {
            tracing::warn!(value = raw, "Ignoring malformed ambient translation key");
            None
        }
    }
}

#[async_trait]
impl SaveHook for LanguageGateway {
    async fn on_saved(
        &self,
        node: &mut ContentNode,
        ctx: &RequestContext,
    ) -> Result<bool, ContentServiceError> {
        // Versions keep whatever linkage they were cloned with
        if node.is_version() {
            return Ok(false);
        }

        if self.get_language(node).await?.is_none() {
            return Ok(node.remove_detail(TRANSLATION_KEY).is_some());
        }

        if let Some(key) = node.translation_key() {
            // Legacy integer keys are rewritten as references
            if matches!(node.detail(TRANSLATION_KEY), Some(DetailValue::Reference(_))) {
                return Ok(false);
            }
            node.set_translation_key(Some(key));
            tracing::debug!(id = node.id, key, "Normalized translation key");
            return Ok(true);
        }

        let key = ambient_linkage_key(ctx).unwrap_or(node.id);
        node.set_translation_key(Some(key));
        tracing::debug!(id = node.id, key, "Assigned translation key");
        Ok(true)
    }
}
