//! Deferred actions
//!
//! Work scheduled while a transition runs under the conference lock and
//! executed by the participant's own worker after the lock is released.
//! Actions are plain values; executing one never re-enters the engine.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::state_table::ConferenceStateId;
use crate::types::{ConferenceEvent, Membership, ParticipantId, ParticipantInfo, Prompt};

/// Side effect scheduled during a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredAction {
    /// Put a participant into waiting treatment (hold music, silence)
    Wait { participant: ParticipantInfo },
    /// Mix a participant into the live audio
    Admit { participant: ParticipantInfo },
    /// End the lone participant's solo treatment now that someone else is live
    SecondActive { participant: ParticipantInfo },
    /// Release the waiting set into the live audio, in FIFO order
    ReleaseAll { participants: Vec<ParticipantInfo> },
    /// Remove an end-marked participant from the bridge
    Kick { participant: ParticipantInfo },
    /// Play a prompt to one participant
    PlayPrompt { participant: ParticipantId, prompt: Prompt },
    /// Play a prompt to the whole conference
    Announce { prompt: Prompt },
    /// Hand a notification to the event sink
    Publish(ConferenceNotification),
}

/// Notifications published to the event bus collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConferenceNotification {
    StateChanged {
        conference: String,
        old_state: ConferenceStateId,
        new_state: ConferenceStateId,
    },
    ConferenceStarted {
        conference: String,
    },
    ConferenceEnded {
        conference: String,
    },
    ParticipantJoined {
        conference: String,
        participant: ParticipantId,
        membership: Membership,
    },
    ParticipantLeft {
        conference: String,
        participant: ParticipantId,
    },
    InvalidEvent {
        conference: String,
        participant: ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    },
}

/// Per-participant FIFO of deferred actions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActionQueue {
    actions: VecDeque<DeferredAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, action: DeferredAction) {
        self.actions.push_back(action);
    }

    /// Empty the queue and hand its contents back in insertion order
    pub fn drain(&mut self) -> Vec<DeferredAction> {
        std::mem::take(&mut self.actions).into()
    }

    /// Drop everything enqueued after the first `len` actions
    pub fn truncate(&mut self, len: usize) {
        self.actions.truncate(len);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeferredAction> {
        self.actions.iter()
    }
}
