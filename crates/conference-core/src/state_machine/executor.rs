//! Transition engine core
//!
//! Runs one event against a conference's state and registry. The caller
//! holds the conference lock for the whole call; nothing here awaits.

use tracing::{debug, warn};

use crate::action_queue::{ActionQueue, ConferenceNotification, DeferredAction};
use crate::errors::{ConferenceError, Result};
use crate::registry::ParticipantRegistry;
use crate::state_table::{ConferenceStateId, StateTable, TransitionContext};
use crate::types::{ConferenceEvent, ParticipantInfo};

/// States before and after an applied event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub previous: ConferenceStateId,
    pub current: ConferenceStateId,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// Dispatch `event` through `table` and apply the resulting transition.
///
/// On error `state`, `registry` and `actions` are exactly as they were.
/// An event whose role differs from the participant's own role is treated
/// like an unhandled event.
pub fn execute_transition(
    table: &StateTable,
    conference: &str,
    state: &mut ConferenceStateId,
    registry: &mut ParticipantRegistry,
    participant: &ParticipantInfo,
    actions: &mut ActionQueue,
    event: ConferenceEvent,
) -> Result<Transition> {
    let previous = *state;

    let handler = match table.handler(previous, event) {
        Some(handler) if event.role() == participant.role() => handler,
        _ => {
            return Err(ConferenceError::InvalidEvent {
                conference: conference.to_string(),
                participant: participant.id.clone(),
                event,
                state: previous,
            });
        }
    };

    let mark = actions.len();
    let mut ctx = TransitionContext::new(conference, previous, event, participant, registry, actions);

    let target = match handler(&mut ctx) {
        Ok(target) => target,
        Err(err) => {
            actions.truncate(mark);
            return Err(err);
        }
    };

    if let Some(target) = target {
        if target != previous {
            debug!("Changing conference '{}' state from {} to {}", conference, previous, target);

            if let Some(exit) = &table.state(previous).exit {
                exit(&mut ctx);
            }
            *state = target;
            ctx.set_state(target);
            ctx.enqueue(DeferredAction::Publish(ConferenceNotification::StateChanged {
                conference: conference.to_string(),
                old_state: previous,
                new_state: target,
            }));
            if let Some(entry) = &table.state(target).entry {
                entry(&mut ctx);
            }
        }
    }

    let expected = registry.target_state();
    if *state != expected {
        warn!(
            "Conference '{}' is in state {} but its participants call for {}",
            conference, state, expected
        );
    }

    Ok(Transition { previous, current: *state })
}
