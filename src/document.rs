//! In-memory element tree implementing [`DrawingSurface`].
//!
//! Elements live in arena slots. Clearing a node frees the whole detached subtree and its
//! `id` registrations; freed slots are reused by later `create_element` calls, so handles to
//! cleared elements must not be kept. A freed handle reads as an empty element.

use std::fmt::Write;

use crate::surface::{DrawingSurface, NodeId};
use crate::types::HashMap;

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Element {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
            parent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Option<Element>>,
    free_slots: Vec<NodeId>,
    ids: HashMap<String, NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Element::new("body", None))],
            free_slots: Vec::new(),
            ids: HashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Registers a `div` with the given `id` under the root, for a visualization to mount
    /// into.
    pub fn add_mount_point(&mut self, id: &str) -> NodeId {
        let node = self.create_element(self.root(), "div");
        self.set_attribute(node, "id", id);
        node
    }

    /// Number of live elements, the root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of arena slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag(&self, node: NodeId) -> &str {
        self.element(node).map_or("", |element| element.tag.as_str())
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.element(node)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    /// Descendants of `root` with the given tag, in document order.
    pub fn elements_by_tag(&self, root: NodeId, tag: &str) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.visit_descendants(root, &mut |node| {
            if self.tag(node) == tag {
                result.push(node);
            }
        });
        result
    }

    pub fn to_markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.slots.get(node.index()).and_then(Option::as_ref)
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots.get_mut(node.index()).and_then(Option::as_mut)
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let element = match self.element(node) {
            Some(element) => element,
            None => return,
        };

        write!(out, "<{}", element.tag).ok();
        for (name, value) in &element.attributes {
            write!(out, " {}=\"{}\"", name, escape(value, true)).ok();
        }

        if element.children.is_empty() && element.text.is_none() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape(text, false));
        }
        for child in &element.children {
            self.write_markup(*child, out);
        }
        write!(out, "</{}>", element.tag).ok();
    }

    fn visit_descendants(&self, node: NodeId, visit: &mut impl FnMut(NodeId)) {
        for child in self.children(node) {
            visit(*child);
            self.visit_descendants(*child, visit);
        }
    }

    fn free_subtree(&mut self, node: NodeId) {
        let mut detached = vec![node];
        self.visit_descendants(node, &mut |descendant| detached.push(descendant));

        for node in detached {
            let element = match self.slots.get_mut(node.index()).and_then(Option::take) {
                Some(element) => element,
                None => continue,
            };

            let id = element
                .attributes
                .into_iter()
                .find(|(name, _)| name == "id")
                .map(|(_, value)| value);
            if let Some(id) = id {
                if self.ids.get(&id) == Some(&node) {
                    self.ids.remove(&id);
                }
            }

            self.free_slots.push(node);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface for Document {
    fn mount_point(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let attached = self.contains(parent);
        let element = Element::new(tag, attached.then_some(parent));

        let node = match self.free_slots.pop() {
            Some(node) => {
                self.slots[node.index()] = Some(element);
                node
            }
            None => {
                self.slots.push(Some(element));
                NodeId::new(self.slots.len() - 1)
            }
        };

        if let Some(parent_element) = self.element_mut(parent) {
            parent_element.children.push(node);
        }
        node
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if !self.contains(node) {
            return;
        }

        if name == "id" {
            if let Some(old_id) = self.attribute(node, "id").map(str::to_string) {
                self.ids.remove(&old_id);
            }
            self.ids.insert(value.to_string(), node);
        }

        if let Some(element) = self.element_mut(node) {
            let attributes = &mut element.attributes;
            match attributes.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, existing_value)) => *existing_value = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.element_mut(node) {
            element.text = Some(text.to_string());
        }
    }

    fn text_content(&self, node: NodeId) -> Option<&str> {
        self.element(node)?.text.as_deref()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.parent
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = match self.element_mut(node) {
            Some(element) => std::mem::take(&mut element.children),
            None => return,
        };

        for child in children {
            self.free_subtree(child);
        }
    }

    fn query_all(
        &self,
        root: NodeId,
        tag: &str,
        attr_name: &str,
        attr_value: &str,
    ) -> Vec<NodeId> {
        let mut result = Vec::new();
        self.visit_descendants(root, &mut |node| {
            if self.tag(node) == tag && self.attribute(node, attr_name) == Some(attr_value) {
                result.push(node);
            }
        });
        result
    }
}

fn escape(raw: &str, in_attribute: bool) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' if in_attribute => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
