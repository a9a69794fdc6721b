//! In-memory document implementing [`Surface`]
//!
//! `Document` is a small retained tree in the spirit of a browser DOM:
//! elements with classes, attributes, inline styles and text, a focus
//! owner, per-node scroll offsets and a listener registry. Hosts feed it
//! user input (`click`, `press_key`, `type_text`) and forward the
//! resulting events to the widgets that subscribed.

use std::cell::RefCell;

use indexmap::IndexMap;
use mtcombo_core::{event_types, Event, EventData, EventType, KeyCode, Point, Rect};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::error::{Result, SurfaceError};
use crate::layout::LayoutTree;
use crate::listeners::ListenerRegistry;
use crate::surface::{NodeId, Surface};

/// Tags whose value can be edited by the user
const FORM_CONTROLS: &[&str] = &["input", "textarea"];

/// A single element
#[derive(Clone, Debug, Default)]
pub(crate) struct Node {
    pub(crate) tag: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) text: Option<String>,
    pub(crate) classes: SmallVec<[String; 2]>,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) styles: IndexMap<String, String>,
    pub(crate) value: String,
    /// Box assigned by the host, overriding computed layout
    pub(crate) bounds: Option<Rect>,
    pub(crate) scroll: Point,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub(crate) fn is_form_control(&self) -> bool {
        FORM_CONTROLS.contains(&self.tag.as_str())
    }
}

/// In-memory retained tree
pub struct Document {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    body: NodeId,
    focused: Option<NodeId>,
    listeners: ListenerRegistry,
    /// Computed layout, dropped whenever boxes can move
    pub(crate) layout: RefCell<Option<LayoutTree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a `body` root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let body = nodes.insert(Node::new("body"));
        Self {
            nodes,
            body,
            focused: None,
            listeners: ListenerRegistry::new(),
            layout: RefCell::new(None),
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(SurfaceError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(SurfaceError::NodeNotFound(id))
    }

    /// Number of live nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pin a node's box, e.g. to place an anchor at known coordinates
    pub fn set_bounds(&mut self, node: NodeId, bounds: Rect) -> Result<()> {
        self.node_mut(node)?.bounds = Some(bounds);
        self.invalidate_layout();
        Ok(())
    }

    /// Drop a pinned box so the node is laid out again
    pub fn clear_bounds(&mut self, node: NodeId) -> Result<()> {
        self.node_mut(node)?.bounds = None;
        self.invalidate_layout();
        Ok(())
    }

    /// Whether the node is reachable from the root
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.ancestors(node).last().copied() == Some(self.body)
    }

    /// The node itself followed by its ancestors up to the root
    pub(crate) fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = self.nodes.contains_key(node).then_some(node);
        while let Some(id) = current {
            chain.push(id);
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        chain
    }

    /// Whether the node or one of its ancestors has `display: none`
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.ancestors(node).into_iter().any(|id| {
            self.nodes
                .get(id)
                .and_then(|n| n.styles.get("display"))
                .is_some_and(|d| d == "none")
        })
    }

    /// Subtree in document order, `root` first
    pub(crate) fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|c| *c != node);
        }
        if let Some(n) = self.nodes.get_mut(node) {
            n.parent = None;
        }
    }

    fn check_insert(&self, parent: NodeId, node: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(node)?;
        if node == self.body {
            return Err(SurfaceError::Root);
        }
        if self.ancestors(parent).contains(&node) {
            return Err(SurfaceError::HierarchyCycle { parent, node });
        }
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) {
        let children = match self.nodes.get_mut(node) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn drop_subtree(&mut self, root: NodeId) {
        for id in self.descendants(root) {
            self.listeners.remove(id);
            if self.focused == Some(id) {
                self.focused = None;
            }
            self.nodes.remove(id);
        }
    }

    // =========================================================================
    // User input simulation
    // =========================================================================

    /// Find the nearest node from `target` upwards listening for `event_type`
    fn route(&self, target: NodeId, event_type: EventType) -> Option<NodeId> {
        self.ancestors(target)
            .into_iter()
            .find(|id| self.listeners.has_listener(*id, event_type))
    }

    fn dispatch(&self, target: NodeId, event_type: EventType, data: EventData) -> Option<Event> {
        let Some(listener) = self.route(target, event_type) else {
            tracing::trace!(?target, event_type, "no listener, event dropped");
            return None;
        };
        tracing::trace!(?target, ?listener, event_type, "event routed");
        Some(
            Event::new(event_type, target.to_raw())
                .with_current_target(listener.to_raw())
                .with_data(data),
        )
    }

    /// Click a node. Returns the event if somebody listens for it.
    ///
    /// Removed, detached and hidden nodes cannot be clicked.
    pub fn click(&self, node: NodeId) -> Option<Event> {
        if !self.is_connected(node) || self.is_hidden(node) {
            return None;
        }
        let center = self.bounding_box(node).ok()?.center();
        self.dispatch(
            node,
            event_types::CLICK,
            EventData::Pointer {
                x: center.x,
                y: center.y,
            },
        )
    }

    /// Press a key with `node` as the key target
    pub fn press_key(&self, node: NodeId, key: KeyCode) -> Option<Event> {
        if !self.is_connected(node) {
            return None;
        }
        self.dispatch(
            node,
            event_types::KEY_PRESS,
            EventData::Key { key, text: None },
        )
    }

    /// Press a key on whatever currently has focus
    pub fn press_key_focused(&self, key: KeyCode) -> Option<Event> {
        self.focused.and_then(|node| self.press_key(node, key))
    }

    /// Type text into a form control, one key press per character
    ///
    /// Focuses the control and appends to its value. Returns the key press
    /// events that reached a listener.
    pub fn type_text(&mut self, node: NodeId, text: &str) -> Result<Vec<Event>> {
        if !self.node(node)?.is_form_control() {
            return Err(SurfaceError::NotFormControl(node));
        }
        self.focused = Some(node);
        let mut events = Vec::new();
        for c in text.chars() {
            self.node_mut(node)?.value.push(c);
            let data = EventData::Key {
                key: KeyCode::from_char(c),
                text: Some(c.to_string()),
            };
            events.extend(self.dispatch(node, event_types::KEY_PRESS, data));
        }
        Ok(events)
    }

    /// Indented dump of a subtree, for debugging and test failure output
    pub fn render_text(&self, root: NodeId) -> String {
        let mut out = String::new();
        self.render_node(root, 0, &mut out);
        out
    }

    fn render_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        out.push_str(&"  ".repeat(depth));
        out.push('<');
        out.push_str(&node.tag);
        if !node.classes.is_empty() {
            out.push_str(&format!(" class=\"{}\"", node.classes.join(" ")));
        }
        for (name, value) in &node.attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        if let Some(text) = &node.text {
            out.push_str(text);
        }
        out.push('\n');
        for child in &node.children {
            self.render_node(*child, depth + 1, out);
        }
    }
}

impl Surface for Document {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.invalidate_layout();
        self.nodes.insert(Node::new(tag))
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_insert(parent, child)?;
        self.detach(child);
        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.invalidate_layout();
        Ok(())
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<()> {
        let parent = self
            .node(reference)?
            .parent
            .ok_or(SurfaceError::Detached(reference))?;
        if reference == node {
            return Err(SurfaceError::HierarchyCycle { parent, node });
        }
        self.check_insert(parent, node)?;
        self.detach(node);
        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|c| *c == reference)
            .ok_or(SurfaceError::Detached(reference))?;
        siblings.insert(index + 1, node);
        self.node_mut(node)?.parent = Some(parent);
        self.invalidate_layout();
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        if node == self.body {
            return Err(SurfaceError::Root);
        }
        self.detach(node);
        self.drop_subtree(node);
        self.invalidate_layout();
        Ok(())
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.node(node)?.children.clone())
    }

    fn tag_name(&self, node: NodeId) -> Result<String> {
        Ok(self.node(node)?.tag.clone())
    }

    fn set_text(&mut self, node: NodeId, text: &str) -> Result<()> {
        self.node(node)?;
        self.clear_children(node);
        self.node_mut(node)?.text = Some(text.to_string());
        self.invalidate_layout();
        Ok(())
    }

    fn text(&self, node: NodeId) -> Result<String> {
        self.node(node)?;
        Ok(self
            .descendants(node)
            .into_iter()
            .filter_map(|id| self.nodes.get(id).and_then(|n| n.text.as_deref()))
            .collect())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let n = self.node_mut(node)?;
        if name == "class" {
            n.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            n.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>> {
        let n = self.node(node)?;
        if name == "class" {
            return Ok((!n.classes.is_empty()).then(|| n.classes.join(" ")));
        }
        Ok(n.attributes.get(name).cloned())
    }

    fn value(&self, node: NodeId) -> Result<String> {
        let n = self.node(node)?;
        if !n.is_form_control() {
            return Err(SurfaceError::NotFormControl(node));
        }
        Ok(n.value.clone())
    }

    fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        let n = self.node_mut(node)?;
        if !n.is_form_control() {
            return Err(SurfaceError::NotFormControl(node));
        }
        n.value = value.to_string();
        Ok(())
    }

    fn add_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        let n = self.node_mut(node)?;
        for token in class.split_whitespace() {
            if !n.classes.iter().any(|c| c == token) {
                n.classes.push(token.to_string());
            }
        }
        Ok(())
    }

    fn remove_class(&mut self, node: NodeId, class: &str) -> Result<()> {
        self.node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> Result<bool> {
        Ok(self.node(node)?.classes.iter().any(|c| c == class))
    }

    fn find_by_class(&self, root: NodeId, class: &str) -> Result<Option<NodeId>> {
        self.node(root)?;
        Ok(self.descendants(root).into_iter().find(|id| {
            self.nodes
                .get(*id)
                .is_some_and(|n| n.classes.iter().any(|c| c == class))
        }))
    }

    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body).into_iter().find(|node| {
            self.nodes
                .get(*node)
                .and_then(|n| n.attributes.get("id"))
                .is_some_and(|v| v == id)
        })
    }

    fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<()> {
        self.node_mut(node)?
            .styles
            .insert(property.to_string(), value.to_string());
        self.invalidate_layout();
        Ok(())
    }

    fn style(&self, node: NodeId, property: &str) -> Result<Option<String>> {
        Ok(self.node(node)?.styles.get(property).cloned())
    }

    fn bounding_box(&self, node: NodeId) -> Result<Rect> {
        self.layout_box(node)
    }

    fn focus(&mut self, node: NodeId) -> Result<()> {
        self.node(node)?;
        self.focused = Some(node);
        Ok(())
    }

    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn scroll_to(&mut self, node: NodeId, x: f32, y: f32) -> Result<()> {
        let (max_x, max_y) = self.scroll_range(node)?;
        self.node_mut(node)?.scroll = Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y));
        Ok(())
    }

    fn scroll_offset(&self, node: NodeId) -> Result<Point> {
        Ok(self.node(node)?.scroll)
    }

    fn listen(&mut self, node: NodeId, event_type: EventType) -> Result<()> {
        self.node(node)?;
        self.listeners.register(node, event_type);
        Ok(())
    }

    fn unlisten(&mut self, node: NodeId, event_type: EventType) -> Result<()> {
        self.node(node)?;
        self.listeners.unregister(node, event_type);
        Ok(())
    }

    fn is_listening(&self, node: NodeId, event_type: EventType) -> bool {
        self.listeners.has_listener(node, event_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_with_items(doc: &mut Document, items: &[&str]) -> (NodeId, Vec<NodeId>) {
        let list = doc.create_element("ol");
        doc.append_child(doc.body(), list).unwrap();
        let rows = items
            .iter()
            .map(|text| {
                let row = doc.element("li", None, Some(text)).unwrap();
                doc.append_child(list, row).unwrap();
                row
            })
            .collect();
        (list, rows)
    }

    #[test]
    fn test_tree_structure() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a", "b"]);

        assert_eq!(doc.children(list).unwrap(), rows);
        assert_eq!(doc.parent(rows[0]), Some(list));
        assert_eq!(doc.text(list).unwrap(), "ab");
        assert!(doc.is_connected(rows[1]));
    }

    #[test]
    fn test_insert_after() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a", "c"]);

        let b = doc.element("li", None, Some("b")).unwrap();
        doc.insert_after(rows[0], b).unwrap();
        assert_eq!(doc.text(list).unwrap(), "abc");

        let detached = doc.create_element("li");
        assert_eq!(
            doc.insert_after(detached, b),
            Err(SurfaceError::Detached(detached))
        );
    }

    #[test]
    fn test_cycles_are_rejected() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a"]);

        assert_eq!(
            doc.append_child(rows[0], list),
            Err(SurfaceError::HierarchyCycle {
                parent: rows[0],
                node: list
            })
        );
        assert_eq!(doc.remove(doc.body()), Err(SurfaceError::Root));
    }

    #[test]
    fn test_remove_drops_subtree() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a", "b"]);
        doc.listen(rows[0], event_types::CLICK).unwrap();
        doc.focus(rows[1]).unwrap();

        doc.remove(list).unwrap();
        assert!(!doc.contains(list));
        assert!(!doc.contains(rows[0]));
        assert!(!doc.is_listening(rows[0], event_types::CLICK));
        assert_eq!(doc.focused(), None);
        assert_eq!(doc.text(rows[0]), Err(SurfaceError::NodeNotFound(rows[0])));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a", "b"]);

        doc.set_text(list, "replaced").unwrap();
        assert_eq!(doc.text(list).unwrap(), "replaced");
        assert!(doc.children(list).unwrap().is_empty());
        assert!(!doc.contains(rows[0]));
    }

    #[test]
    fn test_classes_and_queries() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a", "b"]);
        doc.add_class(rows[1], "picked extra").unwrap();
        doc.set_attribute(rows[0], "id", "first").unwrap();

        assert!(doc.has_class(rows[1], "picked").unwrap());
        assert!(doc.has_class(rows[1], "extra").unwrap());
        assert_eq!(doc.find_by_class(list, "picked").unwrap(), Some(rows[1]));
        assert_eq!(doc.find_by_class(list, "missing").unwrap(), None);
        assert_eq!(doc.find_by_id("first"), Some(rows[0]));
        assert_eq!(
            doc.attribute(rows[1], "class").unwrap().as_deref(),
            Some("picked extra")
        );

        doc.remove_class(rows[1], "picked").unwrap();
        assert!(!doc.has_class(rows[1], "picked").unwrap());
    }

    #[test]
    fn test_click_bubbles_to_listener() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a"]);
        assert!(doc.click(rows[0]).is_none());

        doc.listen(list, event_types::CLICK).unwrap();
        let event = doc.click(rows[0]).unwrap();
        assert_eq!(event.target, rows[0].to_raw());
        assert_eq!(event.current_target, list.to_raw());
        assert!(event.is_click());
    }

    #[test]
    fn test_hidden_and_detached_nodes_cannot_be_clicked() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a"]);
        doc.listen(list, event_types::CLICK).unwrap();

        doc.set_style(list, "display", "none").unwrap();
        assert!(doc.click(rows[0]).is_none());

        let loose = doc.create_element("div");
        doc.listen(loose, event_types::CLICK).unwrap();
        assert!(doc.click(loose).is_none());
    }

    #[test]
    fn test_type_text_into_input() {
        let mut doc = Document::new();
        let row = doc.create_element("li");
        let input = doc.create_element("input");
        doc.append_child(doc.body(), row).unwrap();
        doc.append_child(row, input).unwrap();
        doc.listen(row, event_types::KEY_PRESS).unwrap();

        let events = doc.type_text(input, "hi").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(doc.value(input).unwrap(), "hi");
        assert_eq!(doc.focused(), Some(input));

        let enter = doc.press_key_focused(KeyCode::ENTER).unwrap();
        assert!(enter.is_key(KeyCode::ENTER));
        assert_eq!(enter.current_target, row.to_raw());

        assert_eq!(
            doc.type_text(row, "x"),
            Err(SurfaceError::NotFormControl(row))
        );
    }

    #[test]
    fn test_render_text() {
        let mut doc = Document::new();
        let (list, rows) = list_with_items(&mut doc, &["a"]);
        doc.add_class(rows[0], "row").unwrap();

        let dump = doc.render_text(list);
        assert_eq!(dump, "<ol>\n  <li class=\"row\">a\n");
    }
}
