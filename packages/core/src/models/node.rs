//! Content Node Data Structures
//!
//! This module defines the `ContentNode` record and the small closed set of
//! types hanging off it (kind tag, lifecycle state, detail values).
//!
//! # Architecture
//!
//! - **Universal Node**: One concrete record represents pages, parts and language roots,
//!   distinguished by the `kind` tag rather than by a type hierarchy
//! - **Detail Bag**: Domain fields and linkage markers live in a string-keyed map of
//!   typed `DetailValue`s
//! - **Materialized Path**: `ancestral_trail` stores the ancestor ids (`/1/4/9/`) so
//!   ancestry checks never need to walk the store
//!
//! # Examples
//!
//! ```rust
//! use contentspace_core::models::{ContentNode, DetailValue, NodeKind};
//!
//! let mut page = ContentNode::new("page", NodeKind::Page, "about-us");
//! page.set_detail("Text", DetailValue::String("Hello".to_string()));
//!
//! assert!(page.is_page());
//! assert!(page.is_unsaved());
//! assert_eq!(page.ancestral_trail, "/");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Numeric node identity. `0` means the node has not been persisted yet.
pub type NodeId = u64;

/// Identity carried by nodes that have not been assigned one by the store
pub const UNSAVED_ID: NodeId = 0;

/// Detail name of the stable structural key used to match unsaved versions
pub const VERSION_KEY: &str = "VersionKey";

/// Detail name of the translation linkage key.
///
/// The same name is used for the ambient request value that forces a save to
/// join an existing translation group.
pub const TRANSLATION_KEY: &str = "LanguageKey";

/// Detail name holding a language root's language code (e.g. "sv-SE")
pub const LANGUAGE_CODE: &str = "LanguageCode";

/// Trail of a node without a parent
pub const ROOT_TRAIL: &str = "/";

/// Validation errors for ContentNode operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Node {0} cannot be its own parent")]
    SelfParent(NodeId),

    #[error("Node {0} cannot be a version of itself")]
    SelfVersion(NodeId),

    #[error("Invalid ancestral trail '{trail}': {reason}")]
    InvalidTrail { trail: String, reason: String },
}

/// Lifecycle state of a content node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentState {
    #[default]
    Draft,
    Published,
    Unpublished,
    Deleted,
}

impl ContentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentState::Draft => "draft",
            ContentState::Published => "published",
            ContentState::Unpublished => "unpublished",
            ContentState::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ContentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural role of a node in the tree
///
/// Pages are independently addressable. Parts are structural children that
/// travel with their page when it is versioned. Language roots are pages that
/// mark the top of one language's subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    Page,
    Part,
    LanguageRoot,
}

/// A single typed value in a node's detail bag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DetailValue {
    String(String),
    Integer(i64),
    Date(DateTime<Utc>),
    Reference(NodeId),
}

impl DetailValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DetailValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DetailValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            DetailValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Interpret the value as a node reference.
    ///
    /// Non-negative integers are accepted as well since older content stored
    /// linkage ids as plain numbers.
    pub fn as_reference(&self) -> Option<NodeId> {
        match self {
            DetailValue::Reference(id) => Some(*id),
            DetailValue::Integer(i) => NodeId::try_from(*i).ok(),
            _ => None,
        }
    }

    /// Whether the two values denote the same detail.
    ///
    /// A reference matches any value resolving to the same node, so linkage
    /// stored as a plain integer is found by a reference lookup.
    pub fn matches(&self, other: &DetailValue) -> bool {
        match (self, other) {
            (DetailValue::Reference(_), _) | (_, DetailValue::Reference(_)) => {
                self.as_reference().is_some() && self.as_reference() == other.as_reference()
            }
            _ => self == other,
        }
    }
}

/// Content node stored in the repository.
///
/// # Fields
///
/// - `id`: Store-assigned identity (`0` until first save)
/// - `content_type`: Descriptor key deciding which details are copyable
/// - `kind`: Page, part or language root
/// - `state`: Lifecycle state
/// - `parent_id` / `ancestral_trail`: Position in the live tree
/// - `version_of`: Master this node is a version of (versions never chain)
/// - `details`: Named typed values, including linkage markers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    pub id: NodeId,

    pub content_type: String,

    pub kind: NodeKind,

    /// URL segment
    pub name: String,

    pub title: String,

    pub state: ContentState,

    /// First publication time, kept across republishing
    pub published: Option<DateTime<Utc>>,

    pub expires: Option<DateTime<Utc>>,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,

    /// Ordering among siblings (ties fall back to identity)
    #[serde(default)]
    pub sort_order: i32,

    pub parent_id: Option<NodeId>,

    /// Slash separated ancestor ids, `/` for detached nodes
    pub ancestral_trail: String,

    pub version_of: Option<NodeId>,

    #[serde(default)]
    pub details: BTreeMap<String, DetailValue>,
}

impl ContentNode {
    /// Create a new unsaved, detached node in draft state
    ///
    /// The title defaults to the name.
    pub fn new(content_type: impl Into<String>, kind: NodeKind, name: impl Into<String>) -> Self {
        let now = Utc::now();
        let name = name.into();

        Self {
            id: UNSAVED_ID,
            content_type: content_type.into(),
            kind,
            title: name.clone(),
            name,
            state: ContentState::Draft,
            published: None,
            expires: None,
            created: now,
            updated: now,
            sort_order: 0,
            parent_id: None,
            ancestral_trail: ROOT_TRAIL.to_string(),
            version_of: None,
            details: BTreeMap::new(),
        }
    }

    /// Create an unsaved page of the built-in `page` type
    pub fn page(name: impl Into<String>) -> Self {
        Self::new("page", NodeKind::Page, name)
    }

    /// Create an unsaved part of the built-in `part` type
    pub fn part(name: impl Into<String>) -> Self {
        Self::new("part", NodeKind::Part, name)
    }

    /// Create an unsaved language root carrying the given language code
    pub fn language_root(name: impl Into<String>, language_code: impl Into<String>) -> Self {
        let mut node = Self::new("language-root", NodeKind::LanguageRoot, name);
        node.set_detail(LANGUAGE_CODE, DetailValue::String(language_code.into()));
        node
    }

    /// Set the parent reference (builder style, trail is resolved on save)
    pub fn with_parent(mut self, parent_id: NodeId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_state(mut self, state: ContentState) -> Self {
        self.state = state;
        self
    }

    /// Pages and language roots are independently addressable
    pub fn is_page(&self) -> bool {
        matches!(self.kind, NodeKind::Page | NodeKind::LanguageRoot)
    }

    pub fn is_part(&self) -> bool {
        self.kind == NodeKind::Part
    }

    pub fn is_language_root(&self) -> bool {
        self.kind == NodeKind::LanguageRoot
    }

    /// Whether this node is a version of some master
    pub fn is_version(&self) -> bool {
        self.version_of.is_some()
    }

    pub fn is_unsaved(&self) -> bool {
        self.id == UNSAVED_ID
    }

    pub fn detail(&self, key: &str) -> Option<&DetailValue> {
        self.details.get(key)
    }

    pub fn set_detail(&mut self, key: impl Into<String>, value: DetailValue) {
        self.details.insert(key.into(), value);
    }

    pub fn remove_detail(&mut self, key: &str) -> Option<DetailValue> {
        self.details.remove(key)
    }

    pub fn version_key(&self) -> Option<&str> {
        self.detail(VERSION_KEY).and_then(DetailValue::as_str)
    }

    pub fn set_version_key(&mut self, key: impl Into<String>) {
        self.set_detail(VERSION_KEY, DetailValue::String(key.into()));
    }

    pub fn translation_key(&self) -> Option<NodeId> {
        self.detail(TRANSLATION_KEY).and_then(DetailValue::as_reference)
    }

    /// Set or clear the translation linkage key
    pub fn set_translation_key(&mut self, key: Option<NodeId>) {
        match key {
            Some(key) => self.set_detail(TRANSLATION_KEY, DetailValue::Reference(key)),
            None => {
                self.remove_detail(TRANSLATION_KEY);
            }
        }
    }

    pub fn language_code(&self) -> Option<&str> {
        self.detail(LANGUAGE_CODE).and_then(DetailValue::as_str)
    }

    /// Ancestor ids parsed from the trail, root first
    pub fn ancestor_ids(&self) -> Vec<NodeId> {
        self.ancestral_trail
            .split('/')
            .filter(|segment| !segment.is_empty())
            .filter_map(|segment| segment.parse().ok())
            .collect()
    }

    /// Whether `ancestor_id` appears in this node's trail
    pub fn is_descendant_of(&self, ancestor_id: NodeId) -> bool {
        self.ancestor_ids().contains(&ancestor_id)
    }

    /// Place this node under `parent`, rewriting parent reference and trail
    pub fn attach_to(&mut self, parent: &ContentNode) {
        self.parent_id = Some(parent.id);
        self.ancestral_trail = format!("{}{}/", parent.ancestral_trail, parent.id);
    }

    /// Remove the parent reference and reset the trail
    pub fn detach(&mut self) {
        self.parent_id = None;
        self.ancestral_trail = ROOT_TRAIL.to_string();
    }

    /// Replace this node's content with `source`'s content.
    ///
    /// Identity, position, expiry, version reference and the translation key
    /// belong to this node and are kept.
    pub fn take_content_from(&mut self, source: &ContentNode) {
        let translation_key = self.detail(TRANSLATION_KEY).cloned();

        self.content_type = source.content_type.clone();
        self.kind = source.kind;
        self.name = source.name.clone();
        self.title = source.title.clone();
        self.state = source.state;
        self.published = source.published;
        self.sort_order = source.sort_order;
        self.details = source.details.clone();

        match translation_key {
            Some(key) => self.set_detail(TRANSLATION_KEY, key),
            None => {
                self.remove_detail(TRANSLATION_KEY);
            }
        }
    }

    /// Validate node structure
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `content_type` is empty
    /// - The node references itself as parent or master
    /// - `ancestral_trail` does not start and end with `/` or holds non-numeric segments
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content_type.is_empty() {
            return Err(ValidationError::MissingField("content_type".to_string()));
        }

        if !self.is_unsaved() {
            if self.parent_id == Some(self.id) {
                return Err(ValidationError::SelfParent(self.id));
            }
            if self.version_of == Some(self.id) {
                return Err(ValidationError::SelfVersion(self.id));
            }
        }

        let trail = &self.ancestral_trail;
        if !trail.starts_with('/') || !trail.ends_with('/') {
            return Err(ValidationError::InvalidTrail {
                trail: trail.clone(),
                reason: "must start and end with '/'".to_string(),
            });
        }

        if trail
            .split('/')
            .filter(|segment| !segment.is_empty())
            .any(|segment| segment.parse::<NodeId>().is_err())
        {
            return Err(ValidationError::InvalidTrail {
                trail: trail.clone(),
                reason: "segments must be node ids".to_string(),
            });
        }

        Ok(())
    }
}
