//! In-memory element tree.
//!
//! Nodes live in a single arena and are addressed by [`NodeId`]. Removing
//! children only unlinks them, the arena keeps the detached nodes until the
//! document is dropped.

use crate::tree::ElementTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
    pub value: String,
}

impl Attribute {
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub prefix: Option<String>,
    pub local: String,
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn qualified_name(&self) -> String {
        qualify(self.prefix.as_deref(), &self.local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    // 親の children 内での位置
    index: usize,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) => format!("{}:{}", p, local),
        None => local.to_string(),
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, node: NodeId) {
        self.root = Some(node);
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            index: 0,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a detached element. `qname` may carry a `prefix:` part.
    pub fn create_element(&mut self, namespace: Option<&str>, qname: &str) -> NodeId {
        let (prefix, local) = match qname.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, qname.to_string()),
        };
        self.push(NodeKind::Element(Element {
            prefix,
            local,
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    /// Links `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent {
            let from = self.nodes[child.0].index;
            self.nodes[old.0].children.remove(from);
            for i in from..self.nodes[old.0].children.len() {
                let moved = self.nodes[old.0].children[i];
                self.nodes[moved.0].index = i;
            }
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].index = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(child);
    }

    /// Adds an attribute exactly as written, including `xmlns` declarations.
    pub fn push_attribute(&mut self, node: NodeId, attribute: Attribute) {
        if let Some(e) = self.element_mut(node) {
            e.attributes.push(attribute);
        }
    }

    /// First element in document order with the given namespace and local name.
    pub fn find_element(&self, namespace: Option<&str>, local: &str) -> Option<NodeId> {
        let root = self.root?;
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.local_name(n) == Some(local) && self.namespace_uri(n) == namespace)
    }
}

impl ElementTree for Document {
    type Node = NodeId;

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.local.as_str())
    }

    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|e| e.namespace.as_deref())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let Node { parent, index, .. } = &self.nodes[node.0];
        self.nodes[parent.as_ref()?.0]
            .children
            .get(index + 1)
            .copied()
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(t) => Some(t),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|a| a.local == name && a.namespace.as_deref() == namespace)
            .map(|a| a.value.as_str())
    }

    fn set_attribute(&mut self, node: NodeId, namespace: Option<&str>, name: &str, value: &str) {
        let Some(e) = self.element_mut(node) else {
            return;
        };
        match e
            .attributes
            .iter_mut()
            .find(|a| a.local == name && a.namespace.as_deref() == namespace)
        {
            Some(a) => a.value = value.to_string(),
            None => e.attributes.push(Attribute {
                prefix: None,
                local: name.to_string(),
                namespace: namespace.map(str::to_string),
                value: value.to_string(),
            }),
        }
    }

    fn remove_attribute(
        &mut self,
        node: NodeId,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<String> {
        let e = self.element_mut(node)?;
        let pos = e
            .attributes
            .iter()
            .position(|a| a.local == name && a.namespace.as_deref() == namespace)?;
        Some(e.attributes.remove(pos).value)
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn append_text(&mut self, node: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(node, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::GML_NAMESPACE;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element(Some(GML_NAMESPACE), "gml:Point");
        doc.set_root(root);
        let a = doc.create_element(Some(GML_NAMESPACE), "gml:coord");
        let comment = doc.create_comment("between");
        let b = doc.create_element(Some(GML_NAMESPACE), "gml:coord");
        doc.append_child(root, a);
        doc.append_child(root, comment);
        doc.append_child(root, b);
        (doc, root, a, b)
    }

    #[test]
    fn test_sibling_navigation_skips_comments() {
        let (doc, root, a, b) = sample();
        assert_eq!(doc.next_element_sibling(a), Some(b));
        assert_eq!(doc.next_element_sibling(b), None);
        assert_eq!(doc.child_elements(root), vec![a, b]);
        assert!(doc.is_gml_element(a, "coord"));
        assert_eq!(doc.element(a).unwrap().qualified_name(), "gml:coord");
    }

    #[test]
    fn test_attribute_set_overwrite_remove() {
        let (mut doc, _, a, _) = sample();
        assert_eq!(doc.attribute(a, None, "cs"), None);

        doc.set_attribute(a, None, "cs", ":");
        doc.set_attribute(a, None, "cs", ";");
        assert_eq!(doc.attribute(a, None, "cs"), Some(";"));
        assert_eq!(doc.element(a).unwrap().attributes.len(), 1);

        // 名前空間が違えば別の属性
        assert_eq!(doc.attribute(a, Some(GML_NAMESPACE), "cs"), None);

        assert_eq!(doc.remove_attribute(a, None, "cs"), Some(";".to_string()));
        assert_eq!(doc.remove_attribute(a, None, "cs"), None);
    }

    #[test]
    fn test_clear_children_and_text_content() {
        let (mut doc, root, a, b) = sample();
        doc.append_text(a, "1.5");
        let inner = doc.create_element(None, "wrap");
        doc.append_child(b, inner);
        doc.append_text(inner, " 2");
        assert_eq!(doc.text_content(root), "1.5 2");

        doc.clear_children(root);
        assert!(doc.children(root).is_empty());
        assert_eq!(doc.parent(a), None);
        assert_eq!(doc.text_content(root), "");
    }

    #[test]
    fn test_append_child_moves_node() {
        let (mut doc, root, a, b) = sample();
        doc.append_child(b, a);
        assert_eq!(doc.parent(a), Some(b));
        assert_eq!(doc.child_elements(root), vec![b]);
        assert_eq!(doc.find_element(Some(GML_NAMESPACE), "coord"), Some(b));
    }

    #[test]
    fn test_next_sibling_after_moves() {
        let (mut doc, root, a, b) = sample();
        let c = doc.create_element(Some(GML_NAMESPACE), "gml:coord");
        doc.append_child(root, c);
        // root: a, comment, b, c
        doc.append_child(root, a);
        // root: comment, b, c, a
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.next_sibling(c), Some(a));
        assert_eq!(doc.next_sibling(a), None);
        assert_eq!(doc.next_element_sibling(doc.children(root)[0]), Some(b));

        doc.append_child(a, b);
        assert_eq!(doc.next_sibling(c), Some(a));
        assert_eq!(doc.next_sibling(b), None);

        doc.clear_children(root);
        assert_eq!(doc.next_sibling(c), None);
    }
}
