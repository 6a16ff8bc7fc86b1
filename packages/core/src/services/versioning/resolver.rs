//! Version resolution
//!
//! Finds, inside one tree, the node corresponding to a node of another tree:
//! a live part's copy inside a version tree, or the version of a part inside
//! a shadow tree. Not finding a counterpart is a normal outcome (e.g. a part
//! added after the version was taken).

use crate::models::{ContentNode, ContentTree};
use uuid::Uuid;

/// Whether `reference` corresponds to `target`.
///
/// Checked in order:
/// 1. `reference` is a version of `target`
/// 2. both are versions of the same master
/// 3. `reference` is unsaved and both carry the same version key
pub fn is_counterpart(reference: &ContentNode, target: &ContentNode) -> bool {
    if let Some(master_id) = reference.version_of {
        if target.id == master_id || target.version_of == Some(master_id) {
            return true;
        }
    }

    if reference.is_unsaved() {
        if let Some(key) = reference.version_key() {
            return target.version_key() == Some(key);
        }
    }

    false
}

impl ContentTree {
    /// First node (pre-order, self included) corresponding to `target`
    pub fn find_part_version(&self, target: &ContentNode) -> Option<&ContentTree> {
        self.find(|reference| is_counterpart(reference, target))
    }

    /// First node (pre-order, self included) carrying version key `key`.
    /// An empty key matches nothing.
    pub fn find_descendant_by_version_key(&self, key: &str) -> Option<&ContentTree> {
        if key.is_empty() {
            return None;
        }
        self.find(|node| node.version_key() == Some(key))
    }
}

/// Give every node of `tree` lacking a version key a fresh one.
///
/// Returns the number of keys assigned.
pub fn stamp_version_keys(tree: &mut ContentTree) -> usize {
    let mut stamped = 0;
    let mut pending = vec![tree];
    while let Some(current) = pending.pop() {
        if current.node.version_key().is_none() {
            current.node.set_version_key(Uuid::new_v4().to_string());
            stamped += 1;
        }
        pending.extend(current.children.iter_mut());
    }
    stamped
}
