//! Content Services
//!
//! This module contains the business logic on top of the store:
//!
//! - `ContentService` - Save pipeline, tree loading and save hooks
//! - `LanguageGateway` - Language roots and translation linkage
//! - `VersionManager` - Versions, drafts, merging and publishing
//! - `StateChanger` - Lifecycle transitions used by versioning
//! - `RequestContext` - Ambient values scoped to one operation
//!
//! Services coordinate between the store layer and callers, implementing the
//! business rules of a versioned, multilingual content tree.

pub mod content_service;
pub mod context;
pub mod error;
pub mod language_gateway;
pub mod state_changer;
pub mod versioning;


pub use content_service::{ContentService, SaveHook};
pub use context::{RequestContext, ScopedValue};
pub use error::ContentServiceError;
pub use language_gateway::{LanguageGateway, LANGUAGE_KEY};
pub use state_changer::{StateChanger, WorkflowStateChanger};
pub use versioning::{is_counterpart, stamp_version_keys, VersionCloner, VersionManager};
