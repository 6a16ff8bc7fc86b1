//! ContentSpace Core
//!
//! This crate provides the content tree of a multilingual CMS: pages with
//! structural parts, shadow versions of those pages, and translation linkage
//! between pages living under different language roots.
//!
//! # Architecture
//!
//! - **Universal Node**: Pages, parts and language roots share one `ContentNode` record
//! - **Detached Versions**: A version is a copy of a page and its parts that points at
//!   its master through `version_of` and lives outside the live tree
//! - **Save Hooks**: Translation linkage is assigned after every save through a hook
//!   on the persister facade
//! - **Explicit Context**: Ambient values travel in a `RequestContext` passed into each save
//!
//! # Modules
//!
//! - [`models`] - Data structures (ContentNode, ContentTree, TranslationOption)
//! - [`behaviors`] - Content type definitions
//! - [`db`] - Store abstraction and the in-memory store
//! - [`services`] - Content, versioning and language services
//! - [`config`] - Site configuration
//! - [`telemetry`] - Logging setup

pub mod behaviors;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use behaviors::*;
pub use config::{SiteConfig, VersioningConfig};
pub use models::*;
pub use services::*;
