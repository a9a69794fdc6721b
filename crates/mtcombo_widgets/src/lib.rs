//! mtcombo widgets
//!
//! An editable combo box: a select control whose option list lets the
//! user pick an existing option or type a new one.
//!
//! # Architecture
//!
//! 1. **Host-driven events**: widgets register listeners on the
//!    [`Surface`](mtcombo_surface::Surface) and the host feeds the
//!    resulting events back through `handle_event`. No closures live in
//!    the node tree.
//!
//! 2. **FSM-driven lifecycle**: the combo box is `COLLAPSED` or
//!    `EXPANDED`; its expansion list moves from `BROWSING` (optionally via
//!    `ENTERING`) to `FINISHED` and reports exactly one [`ListEvent`].
//!
//! 3. **External options**: options live in an [`OptionSource`] owned by
//!    the combo box. Lists work on a snapshot and never mutate it.
//!
//! # Example
//!
//! ```rust
//! use mtcombo_core::KeyCode;
//! use mtcombo_surface::{Document, Surface};
//! use mtcombo_widgets::prelude::*;
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let mut combo =
//!     ComboBox::attach(&mut doc, select, SelectOptions::new(), ComboConfig::default()).unwrap();
//!
//! let click = doc.click(combo.root()).unwrap();
//! combo.handle_event(&mut doc, &click).unwrap();
//!
//! let click = doc.click(combo.expansion().unwrap().adder()).unwrap();
//! combo.handle_event(&mut doc, &click).unwrap();
//!
//! let input = combo.expansion().unwrap().entry_input().unwrap();
//! doc.type_text(input, "foo").unwrap();
//! let enter = doc.press_key(input, KeyCode::ENTER).unwrap();
//! assert_eq!(
//!     combo.handle_event(&mut doc, &enter).unwrap(),
//!     Some(ComboEvent::Added { index: 0 })
//! );
//! assert_eq!(combo.display_text(&doc).unwrap(), "foo");
//! ```

pub mod combo_box;
pub mod config;
pub mod error;
pub mod expansion_list;
pub mod option;

pub use combo_box::{ComboBox, ComboEvent};
pub use config::{ComboConfig, Evaluator, ListConfig};
pub use error::{ComboError, Result};
pub use expansion_list::{ExpansionList, ListEvent};
pub use option::{ComboOption, OptionSource, SelectOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::combo_box::{ComboBox, ComboEvent};
    pub use crate::config::{ComboConfig, ListConfig};
    pub use crate::expansion_list::{ExpansionList, ListEvent};
    pub use crate::option::{ComboOption, OptionSource, SelectOptions};
}
