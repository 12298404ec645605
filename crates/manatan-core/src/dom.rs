//! Typed view of the host document.
//!
//! The engine never inspects foreign elements directly. The host answers a
//! capability query per node and the result is cached for one discovery pass.

use std::collections::HashMap;

use manatan_types::{Point, Rect};

/// Opaque handle the host uses to identify an element.
pub type NodeId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Image,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
    Both,
}

impl ScrollAxis {
    pub fn scrolls_vertically(&self) -> bool {
        matches!(self, ScrollAxis::Vertical | ScrollAxis::Both)
    }
}

/// What an element can do, answered once per pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    pub node: NodeId,
    pub kind: ElementKind,
    /// Set only when overflow is `auto`/`scroll` on that axis and the
    /// content actually overflows.
    pub scroll_axis: Option<ScrollAxis>,
    pub rect: Rect,
    /// `src` for images.
    pub locator: Option<String>,
    pub natural_height: f64,
    pub connected: bool,
    /// Inside the cropper preview, never a reader page.
    pub in_cropper: bool,
}

impl ElementDescriptor {
    pub fn is_vertical_scroller(&self) -> bool {
        self.scroll_axis.is_some_and(|axis| axis.scrolls_vertically())
    }
}

pub trait Document {
    fn query_selector_all(&self, selector: &str) -> Vec<NodeId>;
    /// `img` descendants of `node`.
    fn images_within(&self, node: NodeId) -> Vec<NodeId>;
    fn describe(&self, node: NodeId) -> Option<ElementDescriptor>;
    /// `None` once the walk reaches the body.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn image_by_src(&self, src: &str) -> Option<NodeId>;
    /// Hit test that looks through the overlay layer.
    fn element_at_point(&self, point: Point) -> Option<NodeId>;
    fn scroll_by(&mut self, node: NodeId, delta_y: f64);
}

/// Descriptors memoized for one pass over the document.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: HashMap<NodeId, Option<ElementDescriptor>>,
}

impl DescriptorCache {
    pub fn describe(&mut self, doc: &dyn Document, node: NodeId) -> Option<&ElementDescriptor> {
        self.entries
            .entry(node)
            .or_insert_with(|| doc.describe(node))
            .as_ref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First vertically scrolling ancestor of `start`, excluding `start`.
pub fn scrollable_ancestor(doc: &dyn Document, start: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(start);
    while let Some(node) = current {
        if doc.describe(node).is_some_and(|d| d.is_vertical_scroller()) {
            return Some(node);
        }
        current = doc.parent(node);
    }
    None
}

/// `start` itself if it scrolls vertically, else its nearest such ancestor.
pub fn scrollable_self_or_ancestor(doc: &dyn Document, start: NodeId) -> Option<NodeId> {
    if doc.describe(start).is_some_and(|d| d.is_vertical_scroller()) {
        return Some(start);
    }
    scrollable_ancestor(doc, start)
}
