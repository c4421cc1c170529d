use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::action_queue::{ActionQueue, DeferredAction};
use crate::errors::Result;
use crate::registry::ParticipantRegistry;
use crate::types::{ConferenceEvent, ParticipantInfo};

/// Operational mode of a conference
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConferenceStateId {
    /// Nobody attached
    Empty,
    /// Nobody live, wait-marked participants parked for a marked participant
    Inactive,
    /// One live participant, no marked participant
    Single,
    /// Two or more live participants, no marked participant
    Multi,
    /// One participant and it is marked
    SingleMarked,
    /// Two or more participants, at least one marked
    MultiMarked,
}

impl ConferenceStateId {
    pub const ALL: [ConferenceStateId; 6] = [
        ConferenceStateId::Empty,
        ConferenceStateId::Inactive,
        ConferenceStateId::Single,
        ConferenceStateId::Multi,
        ConferenceStateId::SingleMarked,
        ConferenceStateId::MultiMarked,
    ];

    /// The state a conference must be in for the given counts.
    ///
    /// Marked participants are always live and release the waiting set on
    /// arrival, so the marked family is decided on everyone attached.
    pub fn for_counts(marked: usize, active: usize, waiting: usize) -> Self {
        if marked > 0 {
            return if active + waiting <= 1 {
                ConferenceStateId::SingleMarked
            } else {
                ConferenceStateId::MultiMarked
            };
        }
        match (active, waiting) {
            (0, 0) => ConferenceStateId::Empty,
            (0, _) => ConferenceStateId::Inactive,
            (1, _) => ConferenceStateId::Single,
            _ => ConferenceStateId::Multi,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConferenceStateId::Empty => "EMPTY",
            ConferenceStateId::Inactive => "INACTIVE",
            ConferenceStateId::Single => "SINGLE",
            ConferenceStateId::Multi => "MULTI",
            ConferenceStateId::SingleMarked => "SINGLE_MARKED",
            ConferenceStateId::MultiMarked => "MULTI_MARKED",
        }
    }

    /// Position in [`ConferenceStateId::ALL`]
    pub fn index(&self) -> usize {
        match self {
            ConferenceStateId::Empty => 0,
            ConferenceStateId::Inactive => 1,
            ConferenceStateId::Single => 2,
            ConferenceStateId::Multi => 3,
            ConferenceStateId::SingleMarked => 4,
            ConferenceStateId::MultiMarked => 5,
        }
    }

    pub fn is_marked(&self) -> bool {
        matches!(self, ConferenceStateId::SingleMarked | ConferenceStateId::MultiMarked)
    }
}

impl fmt::Display for ConferenceStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a handler or entry/exit action may touch while the
/// conference lock is held
pub struct TransitionContext<'a> {
    conference: &'a str,
    state: ConferenceStateId,
    event: ConferenceEvent,
    participant: &'a ParticipantInfo,
    registry: &'a mut ParticipantRegistry,
    actions: &'a mut ActionQueue,
}

impl<'a> TransitionContext<'a> {
    pub fn new(
        conference: &'a str,
        state: ConferenceStateId,
        event: ConferenceEvent,
        participant: &'a ParticipantInfo,
        registry: &'a mut ParticipantRegistry,
        actions: &'a mut ActionQueue,
    ) -> Self {
        Self { conference, state, event, participant, registry, actions }
    }

    pub fn conference(&self) -> &'a str {
        self.conference
    }

    /// State the conference was in when the current step started
    pub fn state(&self) -> ConferenceStateId {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: ConferenceStateId) {
        self.state = state;
    }

    pub fn event(&self) -> ConferenceEvent {
        self.event
    }

    /// The participant whose worker raised the event
    pub fn participant(&self) -> &'a ParticipantInfo {
        self.participant
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ParticipantRegistry {
        self.registry
    }

    /// Defer an action until the lock is released
    pub fn enqueue(&mut self, action: DeferredAction) {
        self.actions.enqueue(action);
    }

    pub fn pending(&self) -> &ActionQueue {
        self.actions
    }
}

/// Entry or exit action of a state
pub type StateAction = Arc<dyn Fn(&mut TransitionContext<'_>) + Send + Sync>;

/// Event handler of a state; returns the requested target state, if any
pub type EventHandler =
    Arc<dyn Fn(&mut TransitionContext<'_>) -> Result<Option<ConferenceStateId>> + Send + Sync>;

/// Immutable descriptor of one state
#[derive(Clone)]
pub struct ConferenceState {
    pub id: ConferenceStateId,
    pub entry: Option<StateAction>,
    pub exit: Option<StateAction>,
    pub handlers: HashMap<ConferenceEvent, EventHandler>,
}

impl ConferenceState {
    pub fn new(id: ConferenceStateId) -> Self {
        Self { id, entry: None, exit: None, handlers: HashMap::new() }
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn handler(&self, event: ConferenceEvent) -> Option<&EventHandler> {
        self.handlers.get(&event)
    }

    pub fn handles(&self, event: ConferenceEvent) -> bool {
        self.handlers.contains_key(&event)
    }
}

impl fmt::Debug for ConferenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&'static str> = self.handlers.keys().map(|e| e.name()).collect();
        events.sort_unstable();
        f.debug_struct("ConferenceState")
            .field("id", &self.id)
            .field("entry", &self.entry.is_some())
            .field("exit", &self.exit.is_some())
            .field("events", &events)
            .finish()
    }
}

/// One descriptor per [`ConferenceStateId`], shared read-only by every
/// conference built on it
#[derive(Debug, Clone)]
pub struct StateTable {
    states: Vec<ConferenceState>,
}

impl StateTable {
    pub(crate) fn from_states(states: Vec<ConferenceState>) -> Self {
        Self { states }
    }

    pub fn state(&self, id: ConferenceStateId) -> &ConferenceState {
        &self.states[id.index()]
    }

    /// Handler for `event` in `state`, if the state handles it
    pub fn handler(&self, state: ConferenceStateId, event: ConferenceEvent) -> Option<&EventHandler> {
        self.states.get(state.index()).and_then(|s| s.handler(event))
    }

    pub fn states(&self) -> impl Iterator<Item = &ConferenceState> {
        self.states.iter()
    }

    /// Check the table is complete and every state can be left again
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.states.len() != ConferenceStateId::ALL.len() {
            errors.push(format!(
                "Expected {} states, found {}",
                ConferenceStateId::ALL.len(),
                self.states.len()
            ));
        }

        for (index, state) in self.states.iter().enumerate() {
            if state.id.index() != index {
                errors.push(format!("State {} stored at position {}", state.id, index));
            }
        }

        for id in ConferenceStateId::ALL {
            let Some(state) = self.states.get(id.index()) else {
                continue;
            };

            for event in [
                ConferenceEvent::Join,
                ConferenceEvent::JoinWaitMarked,
                ConferenceEvent::JoinMarked,
            ] {
                if !state.handles(event) {
                    errors.push(format!("State {} does not handle {}", id, event));
                }
            }

            if id != ConferenceStateId::Empty && !state.handlers.keys().any(|e| e.is_leave()) {
                errors.push(format!("State {} has no leave transition", id));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
