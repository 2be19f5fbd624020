use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::arena::{Document, Node, NodeId};
use crate::text::string::KeyScope;

/// Object-notation view of one node's children.
///
/// Keys are tagged exactly as [`crate::key_values_to_json`] tags them, so
/// serializing the tree built from some input yields the same JSON as
/// transcoding that input directly.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    document: &'a Document,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(document: &'a Document, id: NodeId) -> Self {
        Self { document, id }
    }

    fn entries(&self) -> impl Iterator<Item = (usize, &'a Node, NodeId)> + 'a {
        let document = self.document;
        document
            .children(self.id)
            .iter()
            .filter_map(move |&child| document.get(child).map(|node| (node, child)))
            .enumerate()
            .map(|(idx, (node, child))| (idx, node, child))
    }
}

fn is_object(node: &Node) -> bool {
    node.is_container() || node.value().is_none()
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let document = self.document;
        let mut map = serializer.serialize_map(Some(document.children(self.id).len()))?;
        let mut scope = KeyScope::new();
        for (idx, node, child) in self.entries() {
            let key = scope.emitted_key(idx * 2, node.key());
            if is_object(node) {
                map.serialize_entry(&*key, &NodeRef::new(document, child))?;
            } else if let Some(value) = node.value() {
                map.serialize_entry(&*key, &*value.to_kv_string())?;
            }
        }
        map.end()
    }
}

/// Builds a `serde_json::Value` object from the children of `node`.
pub fn to_json_value(document: &Document, node: NodeId) -> JsonValue {
    JsonValue::Object(build_object(NodeRef::new(document, node)))
}

fn build_object(view: NodeRef<'_>) -> Map<String, JsonValue> {
    let mut map = Map::new();
    let mut scope = KeyScope::new();
    for (idx, node, child) in view.entries() {
        let key = scope.emitted_key(idx * 2, node.key()).into_owned();
        let value = match node.value() {
            Some(value) if !node.is_container() => JsonValue::String(value.to_kv_string().into_owned()),
            _ => JsonValue::Object(build_object(NodeRef::new(view.document, child))),
        };
        map.insert(key, value);
    }
    map
}
