//! Child to parent lookup, kept in step with the document by the applier

use std::collections::{HashMap, HashSet};
use vellum_model::{EditorDocument, Frame, NodeId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParentIndex {
    parents: HashMap<NodeId, NodeId>,
}

impl ParentIndex {
    /// Index every `childIds` reference. A child listed by two parents keeps
    /// the first one in id order.
    pub fn build(document: &EditorDocument) -> Self {
        let mut parents = HashMap::new();
        for node in document.nodes.values() {
            for child_id in &node.child_ids {
                parents.entry(child_id.clone()).or_insert_with(|| node.id.clone());
            }
        }
        Self { parents }
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub(crate) fn set(&mut self, child_id: &str, parent_id: &str) {
        self.parents.insert(child_id.to_string(), parent_id.to_string());
    }

    pub(crate) fn remove(&mut self, child_id: &str) {
        self.parents.remove(child_id);
    }

    /// Parent first, topmost ancestor last. Stops if it meets a cycle.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let mut ancestors: Vec<NodeId> = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if parent == id || ancestors.iter().any(|seen| seen == parent) {
                break;
            }
            ancestors.push(parent.to_string());
            current = parent;
        }
        ancestors
    }

    /// Topmost ancestor of `id`, or `id` itself when it has no parent
    pub fn top(&self, id: &str) -> NodeId {
        self.ancestors(id).pop().unwrap_or_else(|| id.to_string())
    }

    pub fn is_ancestor(&self, ancestor: &str, id: &str) -> bool {
        self.ancestors(id).iter().any(|candidate| candidate == ancestor)
    }

    /// Whether attaching `child` under `parent` would close a loop
    pub fn would_cycle(&self, parent: &str, child: &str) -> bool {
        parent == child || self.is_ancestor(child, parent)
    }

    /// True if walking up from `id` revisits a node
    pub fn has_cycle_from(&self, id: &str) -> bool {
        let mut seen = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if seen.contains(&parent) {
                return true;
            }
            seen.push(parent);
            current = parent;
        }
        false
    }

    /// Frame whose root tree contains `id`
    pub fn frame_for<'a>(&self, document: &'a EditorDocument, id: &str) -> Option<&'a Frame> {
        if !document.contains_node(id) {
            return None;
        }
        document.frame_with_root(&self.top(id))
    }
}

/// Pre-order ids of the subtree rooted at `id`, skipping dangling children
pub fn subtree_ids(document: &EditorDocument, id: &str) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        let Some(node) = document.node(current) else {
            continue;
        };
        if !visited.insert(current) {
            continue;
        }
        stack.extend(node.child_ids.iter().rev().map(String::as_str));
        ids.push(current.to_string());
    }
    ids
}
