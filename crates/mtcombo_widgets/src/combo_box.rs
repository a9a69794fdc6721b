//! Editable combo box
//!
//! A [`ComboBox`] takes over a hidden `<select>`-like node: it renders a
//! collapsed control showing the selected option's text and, when
//! clicked, opens an [`ExpansionList`] next to it. The list reports one
//! outcome (a row pick or newly entered text); the combo box applies it
//! to the bound [`OptionSource`], refreshes its text and collapses.
//!
//! # Example
//!
//! ```rust
//! use mtcombo_surface::{Document, Surface};
//! use mtcombo_widgets::prelude::*;
//!
//! let mut doc = Document::new();
//! let select = doc.create_element("select");
//! doc.append_child(doc.body(), select).unwrap();
//!
//! let source: SelectOptions = [ComboOption::new("Red", "red")].into_iter().collect();
//! let mut combo = ComboBox::attach(&mut doc, select, source, ComboConfig::default()).unwrap();
//! assert_eq!(combo.display_text(&doc).unwrap(), "Select One");
//!
//! let click = doc.click(combo.root()).unwrap();
//! assert_eq!(combo.handle_event(&mut doc, &click).unwrap(), Some(ComboEvent::Opened));
//!
//! let row = combo.expansion().unwrap().rows()[0];
//! let click = doc.click(row).unwrap();
//! assert_eq!(
//!     combo.handle_event(&mut doc, &click).unwrap(),
//!     Some(ComboEvent::Selected { index: 0 })
//! );
//! assert_eq!(combo.display_text(&doc).unwrap(), "Red");
//! ```

use mtcombo_core::{event_types, Event, StateMachine};
use mtcombo_surface::{NodeId, Surface};

use crate::config::ComboConfig;
use crate::error::{ComboError, Result};
use crate::expansion_list::{ExpansionList, ListEvent};
use crate::option::{ComboOption, OptionSource, SelectOptions};

/// Combo box states
pub mod states {
    use mtcombo_core::StateId;

    pub const COLLAPSED: StateId = 0;
    /// An expansion list is open
    pub const EXPANDED: StateId = 1;
}

mod triggers {
    use mtcombo_core::EventId;

    pub const EXPAND: EventId = 1;
    pub const COLLAPSE: EventId = 2;
}

/// What a handled event did to the combo box
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComboEvent {
    /// The expansion list was opened
    Opened,
    /// The option at `index` became the selection
    Selected { index: usize },
    /// A new option was appended at `index` and selected
    Added { index: usize },
    /// The list closed without changing anything
    Dismissed,
}

type ChangeCallback = Box<dyn FnMut(&ComboOption)>;

/// Select control that lets the user add their own options
pub struct ComboBox<O: OptionSource = SelectOptions> {
    config: ComboConfig,
    source: O,
    /// The hidden data node the widget replaced
    select: NodeId,
    /// Outer wrapper, the click target
    root: NodeId,
    control: NodeId,
    expansion: Option<ExpansionList>,
    fsm: StateMachine,
    on_change: Option<ChangeCallback>,
}

impl<O: OptionSource> ComboBox<O> {
    /// Hide `select` and render the collapsed control right after it
    pub fn attach<S: Surface + ?Sized>(
        surface: &mut S,
        select: NodeId,
        source: O,
        config: ComboConfig,
    ) -> Result<Self> {
        config.validate()?;

        surface.set_style(select, "display", "none")?;

        let root = surface.element("div", Some(&config.wrapper_class), None)?;
        let control = surface.element("div", Some(&config.control_class), None)?;
        let text = surface.element("div", Some(&config.text_class), None)?;
        surface.append_child(control, text)?;
        surface.append_child(root, control)?;
        surface.insert_after(select, root)?;
        surface.listen(root, event_types::CLICK)?;

        let combo = Self {
            config,
            source,
            select,
            root,
            control,
            expansion: None,
            fsm: Self::create_fsm(),
            on_change: None,
        };
        combo.refresh(surface)?;

        tracing::debug!(options = combo.source.len(), "combo box attached");
        Ok(combo)
    }

    fn create_fsm() -> StateMachine {
        StateMachine::builder(states::COLLAPSED)
            .on(states::COLLAPSED, triggers::EXPAND, states::EXPANDED)
            .on(states::EXPANDED, triggers::COLLAPSE, states::COLLAPSED)
            .build()
    }

    /// Call `callback` with the selected option after every applied selection or addition
    pub fn on_change<F: FnMut(&ComboOption) + 'static>(mut self, callback: F) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Handle an event from the surface
    ///
    /// Clicks on the collapsed control open the list; everything else goes
    /// to the open list, whose outcome is applied here.
    pub fn handle_event<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: &Event,
    ) -> Result<Option<ComboEvent>> {
        if event.is_click() && NodeId::from_raw(event.current_target) == self.root {
            let opened = self.activate(surface)?;
            return Ok(opened.then_some(ComboEvent::Opened));
        }

        let outcome = match self.expansion.as_mut() {
            Some(list) => list.handle_event(surface, event)?,
            None => return Ok(None),
        };
        let Some(outcome) = outcome else {
            return Ok(None);
        };
        let Some(list) = self.expansion.take() else {
            return Ok(None);
        };

        list.destroy(surface)?;
        self.fsm.send(triggers::COLLAPSE);

        let event = match outcome {
            ListEvent::Selected { index } => self.apply_selection(index)?,
            ListEvent::Added(text) => self.apply_addition(&text, &list)?,
        };

        if let ComboEvent::Selected { index } | ComboEvent::Added { index } = event {
            self.refresh(surface)?;
            self.notify(index);
        }
        Ok(Some(event))
    }

    /// Open the expansion list
    ///
    /// Returns `false` without doing anything when a list is already open.
    pub fn activate<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool> {
        if !self.fsm.send(triggers::EXPAND) {
            tracing::debug!("combo box already expanded; activation ignored");
            return Ok(false);
        }

        let mut list = match ExpansionList::build(surface, None, self.config.list.clone()) {
            Ok(list) => list,
            Err(err) => {
                self.fsm.reset();
                return Err(err);
            }
        };
        if let Err(err) = self.mount(surface, &mut list) {
            self.fsm.reset();
            if let Err(cleanup) = list.destroy(surface) {
                tracing::warn!(error = %cleanup, "failed to remove partial expansion list");
            }
            return Err(err);
        }

        tracing::debug!(rows = list.snapshot().len(), "expansion list opened");
        self.expansion = Some(list);
        Ok(true)
    }

    fn mount<S: Surface + ?Sized>(&self, surface: &mut S, list: &mut ExpansionList) -> Result<()> {
        list.fill(surface, &self.source.snapshot())?;
        surface.insert_after(self.root, list.root())?;
        list.position_to(surface, self.root)?;
        Ok(())
    }

    fn apply_selection(&mut self, index: usize) -> Result<ComboEvent> {
        let len = self.source.len();
        if index >= len {
            return Err(ComboError::IndexOutOfRange { index, len });
        }
        self.clear_selection(Some(index))?;
        self.source.set_selected(index, true)?;
        tracing::debug!(index, "option selected");
        Ok(ComboEvent::Selected { index })
    }

    fn apply_addition(&mut self, text: &str, list: &ExpansionList) -> Result<ComboEvent> {
        if text.is_empty() {
            tracing::debug!("empty entry; list dismissed");
            return Ok(ComboEvent::Dismissed);
        }

        let value = self.config.evaluate(text, list);
        self.clear_selection(None)?;
        let index = self.source.len();
        self.source
            .append(ComboOption::new(text, value).with_selected(true));
        tracing::debug!(index, text = %text, "option added");
        Ok(ComboEvent::Added { index })
    }

    /// Clear every selected flag except the one at `keep`
    fn clear_selection(&mut self, keep: Option<usize>) -> Result<()> {
        for index in self.source.selected_indices() {
            if Some(index) != keep {
                self.source.set_selected(index, false)?;
            }
        }
        Ok(())
    }

    fn notify(&mut self, index: usize) {
        if let (Some(callback), Some(option)) = (self.on_change.as_mut(), self.source.get(index)) {
            callback(option);
        }
    }

    /// Write the selected option's text, or the placeholder, into the display node
    pub fn refresh<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        let text = self.selected_text();
        let node = self.text_node(surface)?;
        surface.set_text(node, &text)?;
        Ok(())
    }

    fn selected_text(&self) -> String {
        let selected = self.source.selected_indices();
        if selected.len() > 1 {
            tracing::warn!(indices = ?selected, "multiple options selected; showing the first");
        }
        selected
            .first()
            .and_then(|index| self.source.get(*index))
            .map(|option| option.text.clone())
            .unwrap_or_else(|| self.config.placeholder.clone())
    }

    fn text_node<S: Surface + ?Sized>(&self, surface: &S) -> Result<NodeId> {
        surface
            .find_by_class(self.root, &self.config.text_class)?
            .ok_or(ComboError::NotFound("display text node"))
    }

    /// Text currently shown by the collapsed control
    pub fn display_text<S: Surface + ?Sized>(&self, surface: &S) -> Result<String> {
        let node = self.text_node(surface)?;
        Ok(surface.text(node)?)
    }

    /// Outer wrapper node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The collapsed control inside the wrapper
    pub fn control(&self) -> NodeId {
        self.control
    }

    /// The hidden data node
    pub fn select(&self) -> NodeId {
        self.select
    }

    pub fn config(&self) -> &ComboConfig {
        &self.config
    }

    pub fn source(&self) -> &O {
        &self.source
    }

    /// Mutable access to the bound options
    ///
    /// Call [`refresh`](Self::refresh) afterwards to update the shown text.
    pub fn source_mut(&mut self) -> &mut O {
        &mut self.source
    }

    pub fn into_source(self) -> O {
        self.source
    }

    pub fn is_expanded(&self) -> bool {
        self.fsm.is_in(states::EXPANDED)
    }

    /// The open expansion list
    pub fn expansion(&self) -> Option<&ExpansionList> {
        self.expansion.as_ref()
    }
}
