//! Content type definitions
//!
//! Each content type is described by a `ContentDefinition`; a
//! `DefinitionRegistry` maps type names to definitions and is consulted
//! through the `TypeDescriptor` trait.

use crate::models::{ContentNode, NodeKind};
use std::collections::{BTreeSet, HashMap};

/// Which details of a type are copied onto a version clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyableDetails {
    All,
    Only(BTreeSet<String>),
}

/// Descriptor of one content type
#[derive(Debug, Clone, PartialEq)]
pub struct ContentDefinition {
    pub content_type: String,
    pub kind: NodeKind,
    /// `false` for types that must never get versions
    pub versionable: bool,
    pub copyable: CopyableDetails,
}

impl ContentDefinition {
    /// Versionable definition copying every detail
    pub fn new(content_type: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            content_type: content_type.into(),
            kind,
            versionable: true,
            copyable: CopyableDetails::All,
        }
    }

    /// Restrict copying to the named details
    pub fn with_copyable<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.copyable = CopyableDetails::Only(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_versionable(mut self) -> Self {
        self.versionable = false;
        self
    }

    pub fn is_copyable(&self, detail: &str) -> bool {
        match &self.copyable {
            CopyableDetails::All => true,
            CopyableDetails::Only(fields) => fields.contains(detail),
        }
    }
}

/// Resolves content types to their definitions
pub trait TypeDescriptor: Send + Sync {
    fn definition_for(&self, content_type: &str) -> Option<&ContentDefinition>;

    /// Whether versions may be created for `node`. Unknown types are not versionable.
    fn is_versionable(&self, node: &ContentNode) -> bool {
        self.definition_for(&node.content_type)
            .map(|definition| definition.versionable)
            .unwrap_or(false)
    }
}

/// Registry of content definitions keyed by content type
///
/// # Examples
///
/// ```rust
/// use contentspace_core::behaviors::{ContentDefinition, DefinitionRegistry, TypeDescriptor};
/// use contentspace_core::models::NodeKind;
///
/// let mut registry = DefinitionRegistry::new();
/// registry.register(ContentDefinition::new("news", NodeKind::Page).with_copyable(["Text"]));
///
/// let news = registry.definition_for("news").unwrap();
/// assert!(news.is_copyable("Text"));
/// assert!(!news.is_copyable("Secret"));
/// assert!(registry.definition_for("page").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    definitions: HashMap<String, ContentDefinition>,
}

impl DefinitionRegistry {
    /// Registry with the built-in `page`, `part` and `language-root` types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(ContentDefinition::new("page", NodeKind::Page));
        registry.register(ContentDefinition::new("part", NodeKind::Part));
        registry.register(ContentDefinition::new("language-root", NodeKind::LanguageRoot));
        registry
    }

    pub fn empty() -> Self {
        Self {
            definitions: HashMap::new(),
        }
    }

    /// Register a definition, replacing any previous one for the same type
    pub fn register(&mut self, definition: ContentDefinition) {
        self.definitions
            .insert(definition.content_type.clone(), definition);
    }

    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for DefinitionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeDescriptor for DefinitionRegistry {
    fn definition_for(&self, content_type: &str) -> Option<&ContentDefinition> {
        self.definitions.get(content_type)
    }
}
