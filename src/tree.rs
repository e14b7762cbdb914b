//! Tree-access capability consumed by the codecs.
//!
//! The codecs never build element trees themselves. They walk an existing tree,
//! read attributes and text, and mutate it only by clearing children, appending
//! a text node, and setting or removing attributes. Anything that can do that
//! implements [`ElementTree`]; [`crate::Document`] is the bundled implementation.

use std::fmt::Debug;

pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml";

pub const COORD: &str = "coord";
pub const COORDINATES: &str = "coordinates";

/// Axis element names of `gml:coord`, in their mandatory order.
pub const AXES: [&str; 3] = ["X", "Y", "Z"];

pub const ATTR_CS: &str = "cs";
pub const ATTR_TS: &str = "ts";
pub const ATTR_DECIMAL: &str = "decimal";

/// Run length meaning "read every following sibling".
pub const UNBOUNDED: usize = usize::MAX;

pub trait ElementTree {
    /// Node handle. Equality is node identity.
    type Node: Copy + Eq + Debug;

    /// Local name of an element, `None` for text and comment nodes.
    fn local_name(&self, node: Self::Node) -> Option<&str>;

    fn namespace_uri(&self, node: Self::Node) -> Option<&str>;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn children(&self, node: Self::Node) -> &[Self::Node];

    /// Content of a text node, `None` for any other node kind.
    fn text(&self, node: Self::Node) -> Option<&str>;

    fn attribute(&self, node: Self::Node, namespace: Option<&str>, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, node: Self::Node, namespace: Option<&str>, name: &str, value: &str);

    fn remove_attribute(
        &mut self,
        node: Self::Node,
        namespace: Option<&str>,
        name: &str,
    ) -> Option<String>;

    fn clear_children(&mut self, node: Self::Node);

    /// Appends a new text node as the last child of `node`.
    fn append_text(&mut self, node: Self::Node, text: &str) -> Self::Node;

    fn is_element(&self, node: Self::Node) -> bool {
        self.local_name(node).is_some()
    }

    /// True if `node` is an element named `local` in the GML namespace.
    fn is_gml_element(&self, node: Self::Node, local: &str) -> bool {
        self.local_name(node) == Some(local) && self.namespace_uri(node) == Some(GML_NAMESPACE)
    }

    /// Linear in the number of siblings unless the tree overrides it.
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }

    /// Next sibling that is an element, skipping text and comments.
    fn next_element_sibling(&self, node: Self::Node) -> Option<Self::Node> {
        let mut current = self.next_sibling(node);
        while let Some(n) = current {
            if self.is_element(n) {
                return Some(n);
            }
            current = self.next_sibling(n);
        }
        None
    }

    fn child_elements(&self, node: Self::Node) -> Vec<Self::Node> {
        self.children(node)
            .iter()
            .copied()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    /// All nodes below `node` in document order, `node` itself excluded.
    fn descendants(&self, node: Self::Node) -> Vec<Self::Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(node).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Concatenation of every descendant text node.
    fn text_content(&self, node: Self::Node) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.descendants(node)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }
}
