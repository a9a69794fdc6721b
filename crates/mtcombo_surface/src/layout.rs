//! Block layout for [`Document`], computed with taffy
//!
//! The document is mirrored into a [`TaffyTree`] with block display: boxes
//! stack vertically inside their parent and every text run or form control
//! is measured as one line of `LINE_HEIGHT`. Absolutely positioned nodes
//! take their origin from the `left`/`top` styles in document coordinates
//! and do not push later siblings down. Hosts can pin any node to fixed
//! bounds with [`Document::set_bounds`].
//!
//! The mirror is rebuilt lazily after any structural or style change and
//! cached until the next one. Scroll offsets are applied when converting
//! taffy's parent-relative locations to document coordinates, so scrolling
//! never invalidates it.

use mtcombo_core::{Point, Rect, Size};
use slotmap::SecondaryMap;
use taffy::{
    AvailableSpace, Dimension, Display, Layout, LengthPercentage, LengthPercentageAuto,
    Position, Style, TaffyError, TaffyTree,
};

use crate::document::{Document, Node};
use crate::error::{Result, SurfaceError};
use crate::surface::NodeId;

/// Height of one line of text or one form control
pub const LINE_HEIGHT: f32 = 20.0;

/// Width of the root box
pub const VIEWPORT_WIDTH: f32 = 1024.0;

/// Parse a CSS length such as `12px`, `-3.5px` or `40`
pub fn parse_px(value: &str) -> Option<f32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok().filter(|v| v.is_finite())
}

fn style_px(node: &Node, property: &str) -> Option<f32> {
    node.styles.get(property).and_then(|v| parse_px(v))
}

fn is_displayed(node: &Node) -> bool {
    node.styles.get("display").map(String::as_str) != Some("none")
}

fn is_out_of_flow(node: &Node) -> bool {
    matches!(
        node.styles.get("position").map(String::as_str),
        Some("absolute") | Some("fixed")
    )
}

/// Whether the node draws a line of its own
fn has_line(node: &Node) -> bool {
    node.is_form_control() || node.text.as_deref().is_some_and(|t| !t.is_empty())
}

fn layout_error(err: TaffyError) -> SurfaceError {
    SurfaceError::Layout(err.to_string())
}

/// Measure context for leaves that occupy one line
#[derive(Clone, Copy, Debug)]
pub(crate) struct LineContext;

fn line_measure_function(
    known_dimensions: taffy::Size<Option<f32>>,
    available_space: taffy::Size<AvailableSpace>,
    _node_id: taffy::NodeId,
    node_context: Option<&mut LineContext>,
    _style: &Style,
) -> taffy::Size<f32> {
    if let (Some(width), Some(height)) = (known_dimensions.width, known_dimensions.height) {
        return taffy::Size { width, height };
    }

    let line = if node_context.is_some() { LINE_HEIGHT } else { 0.0 };
    let available_width = match available_space.width {
        AvailableSpace::Definite(width) => width,
        AvailableSpace::MinContent | AvailableSpace::MaxContent => 0.0,
    };
    taffy::Size {
        width: known_dimensions.width.unwrap_or(available_width),
        height: known_dimensions.height.unwrap_or(line),
    }
}

/// Translate a node's inline styles into a taffy style
fn node_style(node: &Node, has_children: bool) -> Style {
    let mut style = Style {
        display: if is_displayed(node) {
            Display::Block
        } else {
            Display::None
        },
        ..Default::default()
    };

    if node.parent.is_none() {
        style.size.width = Dimension::Length(VIEWPORT_WIDTH);
    }
    if is_out_of_flow(node) {
        // Placed in document coordinates after layout; only the size matters here
        style.position = Position::Absolute;
        style.inset = taffy::Rect {
            left: LengthPercentageAuto::Length(0.0),
            right: LengthPercentageAuto::Auto,
            top: LengthPercentageAuto::Length(0.0),
            bottom: LengthPercentageAuto::Auto,
        };
        style.size.width = Dimension::Percent(1.0);
    }
    if let Some(width) = style_px(node, "width") {
        style.size.width = Dimension::Length(width.max(0.0));
    }
    if let Some(height) = style_px(node, "height") {
        style.size.height = Dimension::Length(height.max(0.0));
    }
    if let Some(bounds) = node.bounds {
        style.size = taffy::Size {
            width: Dimension::Length(bounds.width()),
            height: Dimension::Length(bounds.height()),
        };
    }
    // A text line above child boxes
    if has_children && has_line(node) {
        style.padding.top = LengthPercentage::Length(LINE_HEIGHT);
    }
    style
}

/// Taffy mirror of a [`Document`]
pub(crate) struct LayoutTree {
    taffy: TaffyTree<LineContext>,
    node_map: SecondaryMap<NodeId, taffy::NodeId>,
}

impl LayoutTree {
    /// Mirror every tree in the document, detached ones included, and lay it out
    fn build(doc: &Document) -> Result<Self> {
        let mut tree = Self {
            taffy: TaffyTree::new(),
            node_map: SecondaryMap::new(),
        };
        tree.taffy.disable_rounding();

        let roots: Vec<NodeId> = doc
            .nodes
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| id)
            .collect();
        for root in roots {
            let taffy_root = tree.insert(doc, root)?;
            tree.taffy
                .compute_layout_with_measure(
                    taffy_root,
                    taffy::Size {
                        width: AvailableSpace::Definite(VIEWPORT_WIDTH),
                        height: AvailableSpace::MaxContent,
                    },
                    line_measure_function,
                )
                .map_err(layout_error)?;
        }
        tracing::trace!(nodes = tree.node_map.len(), "computed document layout");
        Ok(tree)
    }

    fn insert(&mut self, doc: &Document, id: NodeId) -> Result<taffy::NodeId> {
        let node = doc.node(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.insert(doc, *child))
            .collect::<Result<Vec<_>>>()?;

        let style = node_style(node, !children.is_empty());
        let taffy_node = if !children.is_empty() {
            self.taffy.new_with_children(style, &children)
        } else if has_line(node) {
            self.taffy.new_leaf_with_context(style, LineContext)
        } else {
            self.taffy.new_leaf(style)
        }
        .map_err(layout_error)?;
        self.node_map.insert(id, taffy_node);
        Ok(taffy_node)
    }

    fn layout(&self, id: NodeId) -> Result<&Layout> {
        let taffy_node = self
            .node_map
            .get(id)
            .copied()
            .ok_or(SurfaceError::NodeNotFound(id))?;
        self.taffy.layout(taffy_node).map_err(layout_error)
    }

    /// Border box in document coordinates
    fn border_box(&self, doc: &Document, id: NodeId) -> Result<Rect> {
        let node = doc.node(id)?;
        if let Some(bounds) = node.bounds {
            return Ok(bounds);
        }
        let size = self.layout(id)?.size;
        Ok(Rect::from_origin_size(
            self.origin(doc, id)?,
            Size::new(size.width, size.height),
        ))
    }

    fn origin(&self, doc: &Document, id: NodeId) -> Result<Point> {
        let node = doc.node(id)?;
        if let Some(bounds) = node.bounds {
            return Ok(bounds.origin);
        }
        let Some(parent) = node.parent else {
            return Ok(Point::ZERO);
        };

        let parent_origin = self.origin(doc, parent)?;
        if is_out_of_flow(node) {
            return Ok(Point::new(
                style_px(node, "left").unwrap_or(parent_origin.x),
                style_px(node, "top").unwrap_or(parent_origin.y),
            ));
        }

        let scroll = doc.node(parent)?.scroll;
        let location = self.layout(id)?.location;
        Ok(Point::new(
            parent_origin.x - scroll.x + location.x,
            parent_origin.y - scroll.y + location.y,
        ))
    }
}

impl Document {
    /// Drop the cached layout after a change that can move boxes
    pub(crate) fn invalidate_layout(&mut self) {
        *self.layout.get_mut() = None;
    }

    fn with_layout<T>(&self, read: impl FnOnce(&LayoutTree) -> Result<T>) -> Result<T> {
        let mut cache = self.layout.borrow_mut();
        let tree = match cache.take() {
            Some(tree) => tree,
            None => LayoutTree::build(self)?,
        };
        read(cache.insert(tree))
    }

    /// Border box of a node in document coordinates
    pub(crate) fn layout_box(&self, id: NodeId) -> Result<Rect> {
        self.node(id)?;
        self.with_layout(|tree| tree.border_box(self, id))
    }

    /// Maximum scroll offsets for a node
    pub(crate) fn scroll_range(&self, id: NodeId) -> Result<(f32, f32)> {
        self.node(id)?;
        self.with_layout(|tree| {
            let layout = tree.layout(id)?;
            let overflow = layout.content_size.height - layout.size.height;
            Ok((0.0, overflow.max(0.0)))
        })
    }
}
