use std::ops::Index;

use smol_str::SmolStr;

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    key: SmolStr,
    value: Option<Value>,
    comment: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(key: SmolStr, value: Option<Value>, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            comment: None,
            parent,
            children: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.value.is_some()
    }

    pub fn is_key_valid(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn is_value_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_valid(&self) -> bool {
        self.is_key_valid() && (self.is_value_valid() || self.is_container())
    }

    /// Trims the key; empty keys and unchanged keys are rejected.
    pub fn set_key(&mut self, key: &str) -> bool {
        let key = key.trim();
        if key.is_empty() || key == self.key.as_str() {
            return false;
        }
        self.key = SmolStr::new(key);
        true
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> bool {
        let value = value.into();
        if self.value.as_ref() == Some(&value) {
            return false;
        }
        self.value = Some(value);
        true
    }

    pub fn clear_value(&mut self) -> bool {
        self.value.take().is_some()
    }

    pub fn set_comment(&mut self, comment: Option<String>) -> bool {
        if self.comment == comment {
            return false;
        }
        self.comment = comment;
        true
    }

    pub fn to_int(&self) -> Option<i64> {
        self.value.as_ref()?.to_int()
    }

    pub fn to_float(&self) -> Option<f64> {
        self.value.as_ref()?.to_float()
    }

    pub fn to_color(&self) -> Option<crate::value::Color> {
        self.value.as_ref()?.to_color()
    }
}

/// Arena owning every node of one or more KeyValues trees. Slots of removed
/// subtrees are tombstoned and never reused, so a `NodeId` stays stable.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<Node>>,
    live: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Node::new(SmolStr::default(), None, None))],
            live: 1,
        }
    }

    /// Container that owns the top-level nodes of a parsed file.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Live nodes, not counting the root.
    pub fn len(&self) -> usize {
        self.live - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0)?.as_mut()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// First child of `id` with the given key.
    pub fn find_child(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|child| self.get(*child).is_some_and(|node| node.key() == key))
    }

    /// Appends a leaf below `parent`. Returns `None` when `parent` is gone
    /// or the trimmed key is empty.
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        key: &str,
        value: impl Into<Value>,
    ) -> Option<NodeId> {
        self.add_node(parent, key, Some(value.into()))
    }

    pub fn add_container(&mut self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.add_node(parent, key, None)
    }

    fn add_node(&mut self, parent: NodeId, key: &str, value: Option<Value>) -> Option<NodeId> {
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        let id = self.push_detached(SmolStr::new(key), value, parent)?;
        self.attach(parent, id);
        Some(id)
    }

    /// Detaches `id` from its parent and tombstones its whole subtree.
    /// The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root() || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id).and_then(|parent| self.get_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.slots.get_mut(next.0).and_then(Option::take) {
                self.live -= 1;
                pending.extend(node.children);
            }
        }
        true
    }

    /// Depth-first, declaration-order walk of the subtree below `id`.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    pub(crate) fn mark(&self) -> usize {
        self.slots.len()
    }

    /// Drops every slot allocated at or after `mark`.
    pub(crate) fn truncate(&mut self, mark: usize) {
        if mark == 0 || mark >= self.slots.len() {
            return;
        }
        let dropped = self.slots[mark..].iter().filter(|slot| slot.is_some()).count();
        self.slots.truncate(mark);
        self.live -= dropped;
    }

    /// Allocates a node that records `parent` but is not yet listed among
    /// its children.
    pub(crate) fn push_detached(
        &mut self,
        key: SmolStr,
        value: Option<Value>,
        parent: NodeId,
    ) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node::new(key, value, Some(parent))));
        self.live += 1;
        Some(id)
    }

    pub(crate) fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.get_mut(parent) {
            node.children.push(child);
        }
    }
}

impl Index<NodeId> for Document {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {} has been removed", id.0),
        }
    }
}

pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.document.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_build_and_walk() {
        let mut doc = Document::new();
        let root = doc.root();
        let world = doc.add_container(root, "world").unwrap();
        let id = doc.add_leaf(world, "id", "1").unwrap();
        let solid = doc.add_container(world, "solid").unwrap();
        let side = doc.add_leaf(solid, "side", "a").unwrap();

        assert_eq!(doc.add_leaf(world, "   ", "v"), None);
        assert_eq!(doc.add_container(world, ""), None);
        assert_eq!(doc.len(), 4);
        assert_eq!(doc.children(world), &[id, solid]);
        assert_eq!(doc.children(root), &[world]);
        assert_eq!(doc.parent(side), Some(solid));
        let walked: Vec<_> = doc.descendants(root).collect();
        assert_eq!(walked, vec![world, id, solid, side]);
        assert_eq!(doc.find_child(world, "solid"), Some(solid));
    }

    #[rstest::rstest]
    fn test_len_excludes_root() {
        let mut doc = Document::new();
        let root = doc.root();
        assert_eq!(doc.len(), 0);
        assert!(doc.is_empty());

        let leaf = doc.add_leaf(root, "a", "1").unwrap();
        assert_eq!(doc.len(), 1);
        assert!(!doc.is_empty());

        assert!(doc.remove(leaf));
        assert_eq!(doc.len(), 0);
        assert!(doc.is_empty());
    }

    #[rstest::rstest]
    fn test_remove_tombstones_subtree() {
        let mut doc = Document::new();
        let root = doc.root();
        let world = doc.add_container(root, "world").unwrap();
        let solid = doc.add_container(world, "solid").unwrap();
        let side = doc.add_leaf(solid, "side", "a").unwrap();
        let keep = doc.add_leaf(world, "keep", "b").unwrap();

        assert!(doc.remove(solid));
        assert!(!doc.contains(solid));
        assert!(!doc.contains(side));
        assert_eq!(doc.children(world), &[keep]);
        assert_eq!(doc.len(), 2);
        assert!(!doc.remove(solid));
        assert!(!doc.remove(root));
    }

    #[rstest::rstest]
    fn test_setters_report_changes() {
        let mut doc = Document::new();
        let root = doc.root();
        let leaf = doc.add_leaf(root, "key", "value").unwrap();
        let node = doc.get_mut(leaf).unwrap();

        assert!(!node.set_value("value"));
        assert!(node.set_value(7_i64));
        assert_eq!(node.to_int(), Some(7));
        assert!(!node.set_key("  key "));
        assert!(!node.set_key("   "));
        assert!(node.set_key(" other "));
        assert_eq!(node.key(), "other");
        assert!(node.clear_value());
        assert!(!node.clear_value());
        assert!(!node.is_valid());
    }

    #[rstest::rstest]
    fn test_truncate_restores_length() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.add_leaf(root, "a", "1").unwrap();
        let mark = doc.mark();
        let detached = doc.push_detached(SmolStr::new("b"), None, root).unwrap();
        doc.push_detached(SmolStr::new("c"), None, detached).unwrap();
        assert_eq!(doc.len(), 3);

        doc.truncate(mark);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.children(root).len(), 1);
    }
}
