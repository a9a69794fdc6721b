//! mtcombo rendering surface
//!
//! Widgets render into a retained node tree through the [`Surface`] trait:
//! node creation and insertion, classes, inline styles, geometry queries,
//! focus, scrolling and event subscription. [`Document`] is the in-memory
//! implementation used by hosts and tests.
//!
//! # Example
//!
//! ```rust
//! use mtcombo_core::event_types;
//! use mtcombo_surface::{Document, Surface};
//!
//! let mut doc = Document::new();
//! let button = doc.element("a", Some("adder"), Some("+ item")).unwrap();
//! doc.append_child(doc.body(), button).unwrap();
//! doc.listen(button, event_types::CLICK).unwrap();
//!
//! let event = doc.click(button).expect("somebody listens");
//! assert!(event.is_click());
//! ```

pub mod document;
pub mod error;
pub mod layout;
pub mod listeners;
pub mod surface;

pub use document::Document;
pub use error::{Result, SurfaceError};
pub use layout::{parse_px, LINE_HEIGHT, VIEWPORT_WIDTH};
pub use listeners::ListenerRegistry;
pub use surface::{NodeId, Surface};
