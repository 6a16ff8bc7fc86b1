//! Content Type Behaviors
//!
//! This module provides the type descriptor system for content nodes:
//!
//! - `TypeDescriptor` trait - Resolves a node's content type to its definition
//! - `ContentDefinition` - Kind, versionability and copyable detail fields of a type
//! - `DefinitionRegistry` - Registration and lookup of definitions
//!
//! Cloning consults the descriptor to decide which details travel with a
//! version. A node whose type has no definition cannot be versioned.

mod definitions;

pub use definitions::{ContentDefinition, CopyableDetails, DefinitionRegistry, TypeDescriptor};
