use std::path::MAIN_SEPARATOR;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable key of a node inside a [`PathArena`].
    pub struct NodeId;
}

/// One path segment.
#[derive(Debug, Clone)]
struct PathNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Slot-map backed tree of path segments.
///
/// Nodes are never relocated or renamed once created. The only removal is
/// [`PathArena::clear`], which drops every node at once and invalidates every
/// key handed out before it.
#[derive(Debug, Clone, Default)]
pub struct PathArena {
    nodes: SlotMap<NodeId, PathNode>,
}

impl PathArena {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Inserts a node. A `None` parent makes it a root.
    pub fn push(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.insert(PathNode {
            name: name.into(),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.push(id);
        }
        id
    }

    /// Returns the child of `parent` named exactly `name`, if any.
    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.nodes
            .get(parent)?
            .children
            .iter()
            .copied()
            .find(|c| self.nodes.get(*c).is_some_and(|n| n.name == name))
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Joins segment names from the root down to `id`.
    ///
    /// The root contributes no leading separator.
    pub fn absolute_path(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cur = Some(id);
        while let Some(node) = cur.and_then(|c| self.nodes.get(c)) {
            segments.push(node.name.as_str());
            cur = node.parent;
        }

        let mut out = String::new();
        for (i, seg) in segments.iter().rev().enumerate() {
            if i > 0 {
                out.push(MAIN_SEPARATOR);
            }
            out.push_str(seg);
        }
        out
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
