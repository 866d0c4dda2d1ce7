//! Drawing surface capability the renderer is written against.
//!
//! A backend owns an element tree (an SVG drawing plus the HTML around it) and hands out
//! [`NodeId`] handles. The renderer never touches a concrete graphics API; it only creates
//! elements, sets attributes and text, clears layers and reads values back.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub trait DrawingSurface {
    /// Looks up an attached element by its `id` attribute.
    fn mount_point(&self, id: &str) -> Option<NodeId>;

    /// Creates an element and appends it as the last child of `parent`.
    fn create_element(&mut self, parent: NodeId, tag: &str) -> NodeId;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn set_text_content(&mut self, node: NodeId, text: &str);

    fn text_content(&self, node: NodeId) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Detaches every child of `node`.
    fn clear_children(&mut self, node: NodeId);

    /// All descendants of `root` (not `root` itself) with the given tag whose attribute
    /// `attr_name` equals `attr_value`, in document order.
    fn query_all(&self, root: NodeId, tag: &str, attr_name: &str, attr_value: &str)
        -> Vec<NodeId>;

    fn append(&mut self, parent: NodeId, tag: &str) -> ElementBuilder<'_, Self>
    where
        Self: Sized,
    {
        let node = self.create_element(parent, tag);
        ElementBuilder {
            surface: self,
            node,
        }
    }
}

pub struct ElementBuilder<'a, S: DrawingSurface> {
    surface: &'a mut S,
    node: NodeId,
}

impl<'a, S: DrawingSurface> ElementBuilder<'a, S> {
    pub fn attr(self, name: &str, value: impl Display) -> Self {
        self.surface.set_attribute(self.node, name, &value.to_string());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.surface.set_text_content(self.node, text);
        self
    }

    pub fn id(self) -> NodeId {
        self.node
    }
}
