//! Data Models
//!
//! This module contains the core data structures used throughout ContentSpace:
//!
//! - `ContentNode` - Universal node record for pages, parts and language roots
//! - `ContentTree` - A node with its loaded subtree
//! - `TranslationOption` - Per-language translation status
//! - `time` - Clock abstraction

mod node;
pub mod time;
mod translation;
mod tree;


pub use node::{
    ContentNode, ContentState, DetailValue, NodeId, NodeKind, ValidationError, LANGUAGE_CODE,
    ROOT_TRAIL, TRANSLATION_KEY, UNSAVED_ID, VERSION_KEY,
};
pub use translation::TranslationOption;
pub use tree::{ContentTree, TreeIter};
