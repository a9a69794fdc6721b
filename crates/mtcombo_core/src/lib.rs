//! mtcombo core primitives
//!
//! The building blocks shared by the rendering surface and the widgets:
//!
//! - **Geometry**: points, sizes and rectangles in document coordinates
//! - **Events**: input events (click, key press) routed from the surface
//! - **State Machines**: flat transition tables for widget interaction states

pub mod events;
pub mod fsm;
pub mod geometry;

pub use events::{event_types, Event, EventData, EventType, KeyCode};
pub use fsm::{EventId, StateId, StateMachine, StateMachineBuilder, Transition};
pub use geometry::{Point, Rect, Size};
