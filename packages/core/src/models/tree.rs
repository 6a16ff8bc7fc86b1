//! Owned content subtrees
//!
//! `ContentTree` pairs a node with its loaded children. Versioning works on
//! whole subtrees (a page travels with its parts), so cloning, resolution and
//! merging all operate on this type rather than on individual nodes.

use crate::models::{ContentNode, NodeId, UNSAVED_ID};
use serde::{Deserialize, Serialize};

/// A node together with its ordered children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTree {
    pub node: ContentNode,

    #[serde(default)]
    pub children: Vec<ContentTree>,
}

impl ContentTree {
    pub fn new(node: ContentNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Append a child (builder style)
    pub fn with_child(mut self, child: ContentTree) -> Self {
        self.add_child(child);
        self
    }

    /// Append a child.
    ///
    /// When this node already has an identity the child is attached to it
    /// directly; otherwise the link is resolved when the tree is saved.
    pub fn add_child(&mut self, mut child: ContentTree) {
        if !self.node.is_unsaved() {
            child.node.attach_to(&self.node);
        }
        self.children.push(child);
    }

    pub fn id(&self) -> NodeId {
        self.node.id
    }

    /// Children that are parts (travel with this node when versioned)
    pub fn part_children(&self) -> impl Iterator<Item = &ContentTree> {
        self.children.iter().filter(|child| !child.node.is_page())
    }

    /// Depth-first, pre-order walk over every subtree, self included
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter { stack: vec![self] }
    }

    /// Number of nodes in this subtree, self included
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// First subtree (pre-order) whose node satisfies `predicate`
    pub fn find<P>(&self, mut predicate: P) -> Option<&ContentTree>
    where
        P: FnMut(&ContentNode) -> bool,
    {
        self.iter().find(|tree| predicate(&tree.node))
    }

    /// Copy of this subtree with every identity and version reference cleared,
    /// ready to be saved as brand new nodes.
    pub fn to_new_subtree(&self) -> ContentTree {
        let mut node = self.node.clone();
        node.id = UNSAVED_ID;
        node.version_of = None;
        node.detach();

        ContentTree {
            node,
            children: self.children.iter().map(ContentTree::to_new_subtree).collect(),
        }
    }
}

/// Pre-order iterator over a `ContentTree`
pub struct TreeIter<'a> {
    stack: Vec<&'a ContentTree>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a ContentTree;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}
