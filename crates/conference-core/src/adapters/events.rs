//! Event bus collaborator interface
//!
//! Sinks are fire-and-forget: they must not block and cannot fail the
//! transition that produced the notification.

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::action_queue::ConferenceNotification;
use crate::state_table::ConferenceStateId;
use crate::types::{ConferenceEvent, Membership, ParticipantId};

pub trait ConferenceEventSink: Send + Sync {
    /// An event arrived that the current state does not handle
    fn on_invalid_event(
        &self,
        conference: &str,
        participant: &ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    );

    fn on_state_changed(&self, conference: &str, old_state: ConferenceStateId, new_state: ConferenceStateId);

    fn on_conference_started(&self, _conference: &str) {}

    fn on_conference_ended(&self, _conference: &str) {}

    fn on_participant_joined(&self, _conference: &str, _participant: &ParticipantId, _membership: Membership) {}

    fn on_participant_left(&self, _conference: &str, _participant: &ParticipantId) {}
}

/// Route a notification to the matching sink callback
pub fn dispatch(sink: &dyn ConferenceEventSink, notification: &ConferenceNotification) {
    match notification {
        ConferenceNotification::StateChanged { conference, old_state, new_state } => {
            sink.on_state_changed(conference, *old_state, *new_state)
        }
        ConferenceNotification::ConferenceStarted { conference } => sink.on_conference_started(conference),
        ConferenceNotification::ConferenceEnded { conference } => sink.on_conference_ended(conference),
        ConferenceNotification::ParticipantJoined { conference, participant, membership } => {
            sink.on_participant_joined(conference, participant, *membership)
        }
        ConferenceNotification::ParticipantLeft { conference, participant } => {
            sink.on_participant_left(conference, participant)
        }
        ConferenceNotification::InvalidEvent { conference, participant, event, state } => {
            sink.on_invalid_event(conference, participant, *event, *state)
        }
    }
}

/// Sink that writes every notification to the tracing log
#[derive(Debug, Default, Clone)]
pub struct TracingEventSink;

impl ConferenceEventSink for TracingEventSink {
    fn on_invalid_event(
        &self,
        conference: &str,
        participant: &ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    ) {
        warn!(
            "Invalid event {} from participant {} in conference '{}' (state {})",
            event, participant, conference, state
        );
    }

    fn on_state_changed(&self, conference: &str, old_state: ConferenceStateId, new_state: ConferenceStateId) {
        debug!("Conference '{}' changed state from {} to {}", conference, old_state, new_state);
    }

    fn on_conference_started(&self, conference: &str) {
        info!("Conference '{}' started", conference);
    }

    fn on_conference_ended(&self, conference: &str) {
        info!("Conference '{}' ended", conference);
    }

    fn on_participant_joined(&self, conference: &str, participant: &ParticipantId, membership: Membership) {
        info!("Participant {} joined conference '{}' ({:?})", participant, conference, membership);
    }

    fn on_participant_left(&self, conference: &str, participant: &ParticipantId) {
        info!("Participant {} left conference '{}'", participant, conference);
    }
}

/// Sink publishing [`ConferenceNotification`]s on a broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<ConferenceNotification>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConferenceNotification> {
        self.sender.subscribe()
    }

    fn send(&self, notification: ConferenceNotification) {
        // No subscribers is not an error for a best-effort bus
        let _ = self.sender.send(notification);
    }
}

impl ConferenceEventSink for BroadcastEventSink {
    fn on_invalid_event(
        &self,
        conference: &str,
        participant: &ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    ) {
        self.send(ConferenceNotification::InvalidEvent {
            conference: conference.to_string(),
            participant: participant.clone(),
            event,
            state,
        });
    }

    fn on_state_changed(&self, conference: &str, old_state: ConferenceStateId, new_state: ConferenceStateId) {
        self.send(ConferenceNotification::StateChanged {
            conference: conference.to_string(),
            old_state,
            new_state,
        });
    }

    fn on_conference_started(&self, conference: &str) {
        self.send(ConferenceNotification::ConferenceStarted { conference: conference.to_string() });
    }

    fn on_conference_ended(&self, conference: &str) {
        self.send(ConferenceNotification::ConferenceEnded { conference: conference.to_string() });
    }

    fn on_participant_joined(&self, conference: &str, participant: &ParticipantId, membership: Membership) {
        self.send(ConferenceNotification::ParticipantJoined {
            conference: conference.to_string(),
            participant: participant.clone(),
            membership,
        });
    }

    fn on_participant_left(&self, conference: &str, participant: &ParticipantId) {
        self.send(ConferenceNotification::ParticipantLeft {
            conference: conference.to_string(),
            participant: participant.clone(),
        });
    }
}
