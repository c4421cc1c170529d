//! Builder for conference state tables

use std::sync::Arc;

use super::tables;
use super::types::{
    ConferenceState, ConferenceStateId, EventHandler, StateAction, StateTable, TransitionContext,
};
use crate::errors::Result;
use crate::types::ConferenceEvent;

/// Assembles a [`StateTable`], one descriptor per state
pub struct StateTableBuilder {
    states: Vec<ConferenceState>,
}

impl StateTableBuilder {
    /// Six states with no actions and no handlers
    pub fn new() -> Self {
        Self {
            states: ConferenceStateId::ALL.iter().map(|id| ConferenceState::new(*id)).collect(),
        }
    }

    /// Start from the standard conference bridge behavior
    pub fn with_defaults() -> Self {
        let mut builder = Self::new();
        tables::add_default_states(&mut builder);
        builder
    }

    /// Start from an existing table
    pub fn from_table(table: &StateTable) -> Self {
        Self { states: table.states().cloned().collect() }
    }

    fn state_mut(&mut self, state: ConferenceStateId) -> &mut ConferenceState {
        &mut self.states[state.index()]
    }

    pub fn set_entry<F>(&mut self, state: ConferenceStateId, action: F) -> &mut Self
    where
        F: Fn(&mut TransitionContext<'_>) + Send + Sync + 'static,
    {
        self.state_mut(state).entry = Some(Arc::new(action));
        self
    }

    pub fn set_exit<F>(&mut self, state: ConferenceStateId, action: F) -> &mut Self
    where
        F: Fn(&mut TransitionContext<'_>) + Send + Sync + 'static,
    {
        self.state_mut(state).exit = Some(Arc::new(action));
        self
    }

    pub fn add_handler<F>(&mut self, state: ConferenceStateId, event: ConferenceEvent, handler: F) -> &mut Self
    where
        F: Fn(&mut TransitionContext<'_>) -> Result<Option<ConferenceStateId>> + Send + Sync + 'static,
    {
        self.state_mut(state).handlers.insert(event, Arc::new(handler));
        self
    }

    /// Register an already shared handler for several states
    pub fn add_shared_handler(
        &mut self,
        states: &[ConferenceStateId],
        event: ConferenceEvent,
        handler: EventHandler,
    ) -> &mut Self {
        for state in states {
            self.state_mut(*state).handlers.insert(event, handler.clone());
        }
        self
    }

    pub fn remove_handler(&mut self, state: ConferenceStateId, event: ConferenceEvent) -> &mut Self {
        self.state_mut(state).handlers.remove(&event);
        self
    }

    /// Run `hook` after the state's current entry action (if any)
    pub fn observe_entry<F>(&mut self, state: ConferenceStateId, hook: F) -> &mut Self
    where
        F: Fn(&mut TransitionContext<'_>) + Send + Sync + 'static,
    {
        let existing = self.state_mut(state).entry.take();
        self.state_mut(state).entry = Some(chain(existing, hook));
        self
    }

    /// Run `hook` after the state's current exit action (if any)
    pub fn observe_exit<F>(&mut self, state: ConferenceStateId, hook: F) -> &mut Self
    where
        F: Fn(&mut TransitionContext<'_>) + Send + Sync + 'static,
    {
        let existing = self.state_mut(state).exit.take();
        self.state_mut(state).exit = Some(chain(existing, hook));
        self
    }

    pub fn build(self) -> StateTable {
        StateTable::from_states(self.states)
    }
}

impl Default for StateTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn chain<F>(existing: Option<StateAction>, hook: F) -> StateAction
where
    F: Fn(&mut TransitionContext<'_>) + Send + Sync + 'static,
{
    Arc::new(move |ctx: &mut TransitionContext<'_>| {
        if let Some(action) = &existing {
            action(ctx);
        }
        hook(ctx);
    })
}
