//! Listener registry for the document
//!
//! Listeners are plain subscriptions: a node declares interest in an event
//! type and the document turns matching user input into an [`Event`]
//! addressed to that node. What the event means is up to the widget
//! that owns the node.
//!
//! [`Event`]: mtcombo_core::Event

use mtcombo_core::EventType;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::surface::NodeId;

/// Event subscriptions keyed by node
#[derive(Default, Debug)]
pub struct ListenerRegistry {
    nodes: FxHashMap<NodeId, SmallVec<[EventType; 2]>>,
}

impl ListenerRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a node to an event type (idempotent)
    pub fn register(&mut self, node: NodeId, event_type: EventType) {
        let types = self.nodes.entry(node).or_default();
        if !types.contains(&event_type) {
            types.push(event_type);
        }
    }

    /// Drop one subscription
    pub fn unregister(&mut self, node: NodeId, event_type: EventType) {
        if let Some(types) = self.nodes.get_mut(&node) {
            types.retain(|t| *t != event_type);
            if types.is_empty() {
                self.nodes.remove(&node);
            }
        }
    }

    /// Check if a node listens for a specific event type
    pub fn has_listener(&self, node: NodeId, event_type: EventType) -> bool {
        self.nodes
            .get(&node)
            .map(|types| types.contains(&event_type))
            .unwrap_or(false)
    }

    /// Remove all subscriptions of a node
    pub fn remove(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    /// Number of nodes with at least one subscription
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
