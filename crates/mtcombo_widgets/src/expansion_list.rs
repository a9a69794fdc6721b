//! Expansion list - the overlay a combo box opens
//!
//! The list shows a snapshot of the bound options as clickable rows plus
//! an "add item" affordance that turns into a text entry row. It never
//! touches the option source: it reports exactly one outcome and its
//! owner applies it.
//!
//! ```text
//! div.mtcombo-list
//!   p.mtcombo-list-instruct     "Select One"
//!   div
//!     ol.mtcombo-list
//!       li                      one per option (li.mtcombo-selected when selected)
//!       li > input#mtcombo-input  after "+ item" was clicked
//!   a.mtcombo-list-adder        "+ item"
//! ```

use mtcombo_core::{event_types, Event, KeyCode, Rect, StateId, StateMachine};
use mtcombo_surface::{NodeId, Surface};
use slotmap::SecondaryMap;

use crate::config::ListConfig;
use crate::error::{ComboError, Result};
use crate::option::ComboOption;

/// Expansion list states
pub mod states {
    use mtcombo_core::StateId;

    /// Rows are shown, nothing happened yet
    pub const BROWSING: StateId = 0;
    /// The entry row replaced the add affordance
    pub const ENTERING: StateId = 1;
    /// An outcome was reported; the list only waits to be destroyed
    pub const FINISHED: StateId = 2;
}

/// FSM events
mod triggers {
    use mtcombo_core::EventId;

    pub const ADD: EventId = 1;
    pub const SELECT: EventId = 2;
    pub const SUBMIT: EventId = 3;
}

/// Outcome reported by an expansion list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEvent {
    /// The entry field was confirmed with this text (possibly empty)
    Added(String),
    /// The row of the option at `index` was clicked
    Selected { index: usize },
}

/// The transient option list shown while a combo box is expanded
pub struct ExpansionList {
    config: ListConfig,
    root: NodeId,
    list: NodeId,
    adder: NodeId,
    /// Entry row and its input, once the adder was used
    entry: Option<(NodeId, NodeId)>,
    /// Row node -> index into `options`
    rows: SecondaryMap<NodeId, usize>,
    options: Vec<ComboOption>,
    filled: bool,
    fsm: StateMachine,
}

impl ExpansionList {
    /// Build the list skeleton
    ///
    /// Populates `container` if given, otherwise creates a fresh
    /// `div.list_class`. The nodes stay detached until the caller inserts
    /// [`root`](Self::root) somewhere.
    pub fn build<S: Surface + ?Sized>(
        surface: &mut S,
        container: Option<NodeId>,
        config: ListConfig,
    ) -> Result<Self> {
        let root = match container {
            Some(node) => node,
            None => surface.element("div", Some(&config.list_class), None)?,
        };

        let instruct = surface.element(
            "p",
            Some(&config.instruct_class),
            Some(&config.instruct_text),
        )?;
        surface.append_child(root, instruct)?;

        let wrapper = surface.create_element("div");
        surface.append_child(root, wrapper)?;

        let list = surface.element("ol", Some(&config.list_class), None)?;
        surface.append_child(wrapper, list)?;

        let adder = surface.element("a", Some(&config.adder_class), Some(&config.adder_text))?;
        surface.set_style(adder, "display", "block")?;
        surface.listen(adder, event_types::CLICK)?;
        surface.append_child(root, adder)?;

        Ok(Self {
            config,
            root,
            list,
            adder,
            entry: None,
            rows: SecondaryMap::new(),
            options: Vec::new(),
            filled: false,
            fsm: Self::create_fsm(),
        })
    }

    fn create_fsm() -> StateMachine {
        use states::*;

        StateMachine::builder(BROWSING)
            .on(BROWSING, triggers::ADD, ENTERING)
            .on(BROWSING, triggers::SELECT, FINISHED)
            .on(ENTERING, triggers::SELECT, FINISHED)
            .on(ENTERING, triggers::SUBMIT, FINISHED)
            .build()
    }

    /// Create one row per option and return the row list
    ///
    /// Rows of selected options carry the `selected_class` marker.
    pub fn fill<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        options: &[ComboOption],
    ) -> Result<NodeId> {
        if self.filled {
            return Err(ComboError::AlreadyFilled);
        }

        for (index, option) in options.iter().enumerate() {
            let row = surface.element("li", None, Some(&option.text))?;
            if option.selected {
                surface.add_class(row, &self.config.selected_class)?;
            }
            surface.append_child(self.list, row)?;
            surface.listen(row, event_types::CLICK)?;
            self.rows.insert(row, index);
            tracing::trace!(index, text = %option.text, selected = option.selected, "row added");
        }

        self.options = options.to_vec();
        self.filled = true;
        Ok(self.list)
    }

    /// Route an event from the surface
    ///
    /// Returns the outcome when this event produced one. Once an outcome
    /// was reported every further event is ignored.
    pub fn handle_event<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        event: &Event,
    ) -> Result<Option<ListEvent>> {
        let current = NodeId::from_raw(event.current_target);

        if self.is_finished() {
            tracing::warn!(?current, "expansion list already reported an outcome; event ignored");
            return Ok(None);
        }

        match event.event_type {
            event_types::CLICK if current == self.adder => {
                self.begin_entry(surface)?;
                Ok(None)
            }
            event_types::CLICK => match self.rows.get(current).copied() {
                Some(index) => Ok(Some(self.select(index))),
                None => Ok(None),
            },
            event_types::KEY_PRESS if self.entry_row() == Some(current) => {
                if !event.key().is_some_and(KeyCode::is_confirm) {
                    return Ok(None);
                }
                let value = self.entry_value(surface)?;
                self.fsm.send(triggers::SUBMIT);
                tracing::debug!(value = %value, "entry confirmed");
                Ok(Some(ListEvent::Added(value)))
            }
            _ => Ok(None),
        }
    }

    fn select(&mut self, index: usize) -> ListEvent {
        if let Some(option) = self.options.get_mut(index) {
            option.selected = true;
        }
        self.fsm.send(triggers::SELECT);
        tracing::debug!(index, "row selected");
        ListEvent::Selected { index }
    }

    /// Swap the add affordance for a focused text entry row
    ///
    /// One-shot: the affordance stops listening on first use, so repeated
    /// clicks change nothing.
    fn begin_entry<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<()> {
        if !self.fsm.send(triggers::ADD) {
            return Ok(());
        }
        surface.unlisten(self.adder, event_types::CLICK)?;
        surface.set_style(self.adder, "display", "none")?;

        let row = surface.create_element("li");
        let input = surface.create_element("input");
        surface.set_attribute(input, "type", "text")?;
        surface.set_attribute(input, "id", &self.config.input_id)?;
        surface.append_child(row, input)?;
        surface.append_child(self.list, row)?;
        surface.listen(row, event_types::KEY_PRESS)?;
        self.entry = Some((row, input));

        surface.focus(input)?;
        self.reveal(surface, row)?;
        tracing::debug!("entry row opened");
        Ok(())
    }

    /// Scroll the row list so `row` ends at the bottom of its viewport
    fn reveal<S: Surface + ?Sized>(&self, surface: &mut S, row: NodeId) -> Result<()> {
        let viewport = surface.bounding_box(self.list)?;
        let scrolled = surface.scroll_offset(self.list)?;
        let bottom = surface.bounding_box(row)?.bottom() - viewport.top() + scrolled.y;
        surface.scroll_to(self.list, scrolled.x, bottom - viewport.height())?;
        Ok(())
    }

    /// Place the list so its vertical center sits on the anchor's top edge
    /// and its left edge on the anchor's left edge
    ///
    /// Static placement: later anchor moves are not followed. Returns the
    /// resulting box.
    pub fn position_to<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        anchor: NodeId,
    ) -> Result<Rect> {
        let coords = surface.bounding_box(anchor)?;
        let height = surface.bounding_box(self.root)?.height();
        let top = coords.top() - height / 2.0;
        let left = coords.left();

        surface.set_style(self.root, "position", "absolute")?;
        surface.set_style(self.root, "top", &format!("{top}px"))?;
        surface.set_style(self.root, "left", &format!("{left}px"))?;
        Ok(surface.bounding_box(self.root)?)
    }

    /// Remove the list from the surface
    pub fn destroy<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        if surface.contains(self.root) {
            surface.remove(self.root)?;
            tracing::debug!("expansion list destroyed");
        }
        Ok(())
    }

    /// Current text of the entry field
    pub fn entry_value<S: Surface + ?Sized>(&self, surface: &S) -> Result<String> {
        let (_, input) = self.entry.ok_or(ComboError::NotFound("entry field"))?;
        Ok(surface.value(input)?)
    }

    /// Outer node of the list
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `ol` holding the rows
    pub fn list(&self) -> NodeId {
        self.list
    }

    /// The "add item" affordance
    pub fn adder(&self) -> NodeId {
        self.adder
    }

    /// The entry row, once the adder was used
    pub fn entry_row(&self) -> Option<NodeId> {
        self.entry.map(|(row, _)| row)
    }

    /// The entry field, once the adder was used
    pub fn entry_input(&self) -> Option<NodeId> {
        self.entry.map(|(_, input)| input)
    }

    /// Row nodes in option order
    pub fn rows(&self) -> Vec<NodeId> {
        let mut rows: Vec<_> = self.rows.iter().map(|(row, index)| (*index, row)).collect();
        rows.sort_unstable_by_key(|(index, _)| *index);
        rows.into_iter().map(|(_, row)| row).collect()
    }

    /// Option bound to a row
    pub fn row_option(&self, row: NodeId) -> Option<&ComboOption> {
        self.rows.get(row).and_then(|index| self.options.get(*index))
    }

    /// The options the list was filled with, including the flag set by a row click
    pub fn snapshot(&self) -> &[ComboOption] {
        &self.options
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_entering(&self) -> bool {
        self.fsm.is_in(states::ENTERING)
    }

    pub fn is_finished(&self) -> bool {
        self.fsm.is_in(states::FINISHED)
    }
}
