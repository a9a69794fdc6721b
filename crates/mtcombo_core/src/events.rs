//! Input event model
//!
//! Events are produced by the rendering surface when the user interacts
//! with a node that somebody listens on. Widgets receive them through
//! their `handle_event` methods and decide what the event means.

use serde::{Deserialize, Serialize};

/// Numeric event type identifier
pub type EventType = u32;

/// Well-known event types
pub mod event_types {
    use super::EventType;

    /// Pointer pressed and released on the same node
    pub const CLICK: EventType = 1;
    /// Key pressed while a node (or one of its descendants) has focus
    pub const KEY_PRESS: EventType = 2;
}

/// Platform-independent key code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const BACKSPACE: KeyCode = KeyCode(8);
    pub const TAB: KeyCode = KeyCode(9);
    pub const ENTER: KeyCode = KeyCode(13);
    pub const ESCAPE: KeyCode = KeyCode(27);
    pub const SPACE: KeyCode = KeyCode(32);

    /// Key code for a printable character
    pub fn from_char(c: char) -> Self {
        match c {
            '\n' | '\r' => KeyCode::ENTER,
            '\t' => KeyCode::TAB,
            c => KeyCode(c.to_ascii_uppercase() as u32),
        }
    }

    /// Whether this is a confirm key
    pub fn is_confirm(self) -> bool {
        self == KeyCode::ENTER
    }
}

/// Event payload
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventData {
    #[default]
    None,
    Pointer {
        x: f32,
        y: f32,
    },
    Key {
        key: KeyCode,
        /// Text produced by the key, if any
        text: Option<String>,
    },
}

/// A dispatched input event
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub event_type: EventType,
    /// Raw key of the node the user interacted with
    pub target: u64,
    /// Raw key of the listening node the event bubbled to
    pub current_target: u64,
    pub data: EventData,
}

impl Event {
    pub fn new(event_type: EventType, target: u64) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            data: EventData::None,
        }
    }

    pub fn with_current_target(mut self, current_target: u64) -> Self {
        self.current_target = current_target;
        self
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }

    pub fn is_click(&self) -> bool {
        self.event_type == event_types::CLICK
    }

    /// Whether this is a key press of `key`
    pub fn is_key(&self, key: KeyCode) -> bool {
        self.event_type == event_types::KEY_PRESS
            && matches!(self.data, EventData::Key { key: k, .. } if k == key)
    }

    pub fn key(&self) -> Option<KeyCode> {
        match self.data {
            EventData::Key { key, .. } => Some(key),
            _ => None,
        }
    }
}
