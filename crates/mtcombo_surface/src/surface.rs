//! The retained-mode tree API widgets render into

use mtcombo_core::{EventType, Point, Rect};
use slotmap::{new_key_type, Key};

use crate::error::Result;

new_key_type! {
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    ///
    /// Events carry raw node keys so the core crate stays tree-agnostic.
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation produced by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// A retained-mode node tree with styling, geometry and input subscription
///
/// Widgets only talk to the tree through this trait. Node handles stay
/// valid until the node (or an ancestor) is removed; after that every
/// call taking the handle fails with `NodeNotFound`.
pub trait Surface {
    /// The root node everything is attached under
    fn body(&self) -> NodeId;

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Insert `node` as the next sibling of `reference`
    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()>;

    /// Remove a node together with its whole subtree
    fn remove(&mut self, node: NodeId) -> Result<()>;

    fn contains(&self, node: NodeId) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>>;

    fn tag_name(&self, node: NodeId) -> Result<String>;

    /// Replace the node's children with a text run
    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// Concatenated text of the node's subtree
    fn text(&self, node: NodeId) -> Result<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()>;

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>>;

    /// Current value of a form control
    fn value(&self, node: NodeId) -> Result<String>;

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()>;

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()>;

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()>;

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool>;

    /// First node in document order under `root` (inclusive) carrying `class`
    fn find_by_class(&self, root: NodeId, class: &str) -> Result<Option<NodeId>>;

    /// First attached node whose `id` attribute equals `id`
    fn find_by_id(&self, id: &str) -> Option<NodeId>;

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()>;

    fn style(&self, node: NodeId, property: &str) -> Result<Option<String>>;

    /// Border box in document coordinates
    fn bounding_box(&self, node: NodeId) -> Result<Rect>;

    /// Move input focus to the node
    fn focus(&mut self, node: NodeId) -> Result<()>;

    fn focused(&self) -> Option<NodeId>;

    /// Scroll the node's content; offsets are clamped to the scrollable range
    fn scroll_to(&mut self, node: NodeId, x: f32, y: f32) -> Result<()>;

    fn scroll_offset(&self, node: NodeId) -> Result<Point>;

    /// Subscribe to `event_type` on the node (and events bubbling to it)
    fn listen(&mut self, node: NodeId, event_type: EventType) -> Result<()>;

    /// Drop the subscription; a no-op if there is none
    fn unlisten(&mut self, node: NodeId, event_type: EventType) -> Result<()>;

    fn is_listening(&self, node: NodeId, event_type: EventType) -> bool;

    /// Create an element with an optional class and text in one go
    fn element(&mut self, tag: &str, class: Option<&str>, text: Option<&str>) -> Result<NodeId> {
        let node = self.create_element(tag);
        if let Some(class) = class {
            self.add_class(node, class)?;
        }
        if let Some(text) = text {
            self.set_text(node, text)?;
        }
        Ok(node)
    }
}
