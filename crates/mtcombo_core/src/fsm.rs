//! Table-driven finite state machines for widget interaction states
//!
//! ```rust
//! use mtcombo_core::fsm::StateMachine;
//!
//! const COLLAPSED: u32 = 0;
//! const EXPANDED: u32 = 1;
//! const ACTIVATE: u32 = 1;
//! const DISMISS: u32 = 2;
//!
//! let mut fsm = StateMachine::builder(COLLAPSED)
//!     .on(COLLAPSED, ACTIVATE, EXPANDED)
//!     .on(EXPANDED, DISMISS, COLLAPSED)
//!     .build();
//!
//! assert!(fsm.send(ACTIVATE));
//! assert!(!fsm.send(ACTIVATE));
//! assert_eq!(fsm.current_state(), EXPANDED);
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// State identifier
pub type StateId = u32;

/// Event identifier
pub type EventId = u32;

/// A single transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub event: EventId,
    pub to: StateId,
}

/// A flat state machine: one current state and a transition table
#[derive(Clone, Debug)]
pub struct StateMachine {
    current: StateId,
    initial: StateId,
    transitions: FxHashMap<(StateId, EventId), StateId>,
}

impl StateMachine {
    /// Start building a state machine
    pub fn builder(initial: StateId) -> StateMachineBuilder {
        StateMachineBuilder {
            initial,
            transitions: SmallVec::new(),
        }
    }

    /// Create a state machine from a list of transitions
    pub fn new(initial: StateId, transitions: impl IntoIterator<Item = Transition>) -> Self {
        Self {
            current: initial,
            initial,
            transitions: transitions
                .into_iter()
                .map(|t| ((t.from, t.event), t.to))
                .collect(),
        }
    }

    /// Current state
    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Whether the machine is in `state`
    pub fn is_in(&self, state: StateId) -> bool {
        self.current == state
    }

    /// Whether `event` triggers a transition from the current state
    pub fn can_handle(&self, event: EventId) -> bool {
        self.transitions.contains_key(&(self.current, event))
    }

    /// Feed an event. Returns true if a transition fired.
    pub fn send(&mut self, event: EventId) -> bool {
        match self.transitions.get(&(self.current, event)) {
            Some(&to) => {
                tracing::trace!(from = self.current, event, to, "fsm transition");
                self.current = to;
                true
            }
            None => false,
        }
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// Builder for [`StateMachine`]
pub struct StateMachineBuilder {
    initial: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachineBuilder {
    /// Add a transition `from --event--> to`
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition { from, event, to });
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine::new(self.initial, self.transitions)
    }
}
