//! Versioning
//!
//! - `VersionCloner` - detached structural clones of live subtrees
//! - `resolver` - correspondence between nodes of a live tree and a version tree
//! - `VersionManager` - archiving, drafts, merging versions back and publishing

mod cloning;
mod manager;
pub mod resolver;


pub use cloning::VersionCloner;
pub use manager::VersionManager;
pub use resolver::{is_counterpart, stamp_version_keys};
