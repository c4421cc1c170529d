//! Conference instance
//!
//! A [`Conference`] owns the state, the participant registry and the lock
//! serializing every event raised against it. Participants are owned by
//! their workers and passed in by `&mut` for each event.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::action_queue::ActionQueue;
use crate::adapters::{
    ConferenceEventSink, LoggingMediaController, MediaController, TracingEventSink,
};
use crate::config::ConferenceConfig;
use crate::errors::{ConferenceError, Result};
use crate::registry::ParticipantRegistry;
use crate::state_machine::{execute_actions, execute_transition};
use crate::state_table::{ConferenceStateId, StateTable, DEFAULT_TABLE};
use crate::types::{
    ConferenceEvent, Membership, ParticipantId, ParticipantInfo, ParticipantRole, UserProfile,
};

/// A participant as held by its own worker while attached
#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    profile: UserProfile,
    membership: Membership,
    pending: ActionQueue,
}

impl Participant {
    pub fn new(profile: UserProfile) -> Self {
        Self::with_id(ParticipantId::new(), profile)
    }

    pub fn with_id(id: impl Into<ParticipantId>, profile: UserProfile) -> Self {
        Self {
            id: id.into(),
            profile,
            membership: Membership::Attaching,
            pending: ActionQueue::new(),
        }
    }

    pub fn id(&self) -> &ParticipantId {
        &self.id
    }

    pub fn profile(&self) -> UserProfile {
        self.profile
    }

    pub fn role(&self) -> ParticipantRole {
        self.profile.role()
    }

    pub fn is_marked(&self) -> bool {
        self.profile.marked
    }

    /// Membership as of the last event this participant raised
    pub fn membership(&self) -> Membership {
        self.membership
    }

    pub fn join_event(&self) -> ConferenceEvent {
        ConferenceEvent::join(self.role())
    }

    pub fn leave_event(&self) -> ConferenceEvent {
        ConferenceEvent::leave(self.role())
    }

    /// Actions deferred but not yet drained
    pub fn pending_actions(&self) -> &ActionQueue {
        &self.pending
    }

    pub fn info(&self) -> ParticipantInfo {
        ParticipantInfo::new(self.id.clone(), self.profile)
    }
}

/// Result of an applied event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    /// Position of this event in the conference's serialized order
    pub sequence: u64,
    pub event: ConferenceEvent,
    pub previous_state: ConferenceStateId,
    pub state: ConferenceStateId,
    pub membership: Membership,
    pub actions_executed: usize,
    pub actions_failed: usize,
}

impl EventOutcome {
    pub fn transitioned(&self) -> bool {
        self.previous_state != self.state
    }
}

/// Point-in-time view of a conference, taken under its lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConferenceSnapshot {
    pub name: String,
    pub state: ConferenceStateId,
    /// In admission order
    pub active: Vec<ParticipantId>,
    /// In FIFO order
    pub waiting: Vec<ParticipantId>,
    pub marked_count: usize,
    pub sequence: u64,
}

impl ConferenceSnapshot {
    /// The state the counts in this snapshot call for
    pub fn expected_state(&self) -> ConferenceStateId {
        ConferenceStateId::for_counts(self.marked_count, self.active.len(), self.waiting.len())
    }

    pub fn participant_count(&self) -> usize {
        self.active.len() + self.waiting.len()
    }
}

struct Inner {
    state: ConferenceStateId,
    registry: ParticipantRegistry,
    sequence: u64,
}

pub struct Conference {
    name: String,
    table: Arc<StateTable>,
    config: ConferenceConfig,
    inner: Mutex<Inner>,
    /// Attached participants, readable without the lock
    occupancy: AtomicUsize,
    state_tx: watch::Sender<ConferenceStateId>,
    media: Arc<dyn MediaController>,
    events: Arc<dyn ConferenceEventSink>,
}

impl Conference {
    pub fn new(
        name: impl Into<String>,
        config: ConferenceConfig,
        table: Arc<StateTable>,
        media: Arc<dyn MediaController>,
        events: Arc<dyn ConferenceEventSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(name.into(), config, table, media, events))
    }

    /// Default table and config, logging collaborators
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::build(
            name.into(),
            ConferenceConfig::default(),
            DEFAULT_TABLE.clone(),
            Arc::new(LoggingMediaController),
            Arc::new(TracingEventSink),
        )
    }

    fn build(
        name: String,
        config: ConferenceConfig,
        table: Arc<StateTable>,
        media: Arc<dyn MediaController>,
        events: Arc<dyn ConferenceEventSink>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConferenceStateId::Empty);
        let registry = ParticipantRegistry::new(&config);
        Self {
            name,
            table,
            config,
            inner: Mutex::new(Inner { state: ConferenceStateId::Empty, registry, sequence: 0 }),
            occupancy: AtomicUsize::new(0),
            state_tx,
            media,
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ConferenceConfig {
        &self.config
    }

    /// Apply one event raised by `participant`'s worker.
    ///
    /// The transition runs under the conference lock; the deferred actions
    /// it produced run after the lock is released. Collaborator failures
    /// are counted in the outcome and never undo the transition.
    pub async fn apply_event(
        &self,
        participant: &mut Participant,
        event: ConferenceEvent,
    ) -> Result<EventOutcome> {
        let info = participant.info();
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let transition = match execute_transition(
            &self.table,
            &self.name,
            &mut inner.state,
            &mut inner.registry,
            &info,
            &mut participant.pending,
            event,
        ) {
            Ok(transition) => transition,
            Err(err) => {
                drop(guard);
                self.report_failure(&info.id, event, &err);
                return Err(err);
            }
        };

        inner.sequence += 1;
        let sequence = inner.sequence;
        if transition.changed() {
            self.state_tx.send_replace(transition.current);
        }

        participant.membership = if event.is_leave() {
            Membership::Detaching
        } else {
            inner.registry.membership_of(&info.id).unwrap_or(Membership::Attaching)
        };
        self.occupancy.store(inner.registry.len(), Ordering::SeqCst);

        let actions = participant.pending.drain();
        drop(guard);

        debug!(
            "Applied {} from {} to conference '{}' (#{}, {} -> {})",
            event, info.id, self.name, sequence, transition.previous, transition.current
        );

        let report = execute_actions(&self.name, actions, self.media.as_ref(), self.events.as_ref()).await;

        Ok(EventOutcome {
            sequence,
            event,
            previous_state: transition.previous,
            state: transition.current,
            membership: participant.membership,
            actions_executed: report.executed,
            actions_failed: report.failed,
        })
    }

    fn report_failure(&self, participant: &ParticipantId, event: ConferenceEvent, err: &ConferenceError) {
        match err {
            ConferenceError::InvalidEvent { state, .. } => {
                warn!(
                    "Invalid event {} from {} in conference '{}' (state {})",
                    event, participant, self.name, state
                );
                self.events.on_invalid_event(&self.name, participant, event, *state);
            }
            other => {
                warn!("Event {} from {} rejected by conference '{}': {}", event, participant, self.name, other);
            }
        }
    }

    /// Raise the join event matching the participant's role
    pub async fn join(&self, participant: &mut Participant) -> Result<EventOutcome> {
        let event = participant.join_event();
        self.apply_event(participant, event).await
    }

    /// Raise the leave event matching the participant's role
    pub async fn leave(&self, participant: &mut Participant) -> Result<EventOutcome> {
        let event = participant.leave_event();
        self.apply_event(participant, event).await
    }

    pub async fn snapshot(&self) -> ConferenceSnapshot {
        let inner = self.inner.lock().await;
        ConferenceSnapshot {
            name: self.name.clone(),
            state: inner.state,
            active: inner.registry.active_ids(),
            waiting: inner.registry.waiting_ids(),
            marked_count: inner.registry.marked_count(),
            sequence: inner.sequence,
        }
    }

    /// Authoritative membership of an attached participant
    pub async fn membership_of(&self, id: &ParticipantId) -> Option<Membership> {
        self.inner.lock().await.registry.membership_of(id)
    }

    /// State after the last applied event
    pub fn state(&self) -> ConferenceStateId {
        *self.state_tx.borrow()
    }

    /// Nobody attached. Lock-free.
    pub fn is_empty(&self) -> bool {
        self.occupancy.load(Ordering::SeqCst) == 0
    }

    pub fn participant_count(&self) -> usize {
        self.occupancy.load(Ordering::SeqCst)
    }

    /// Follow state changes
    pub fn subscribe(&self) -> watch::Receiver<ConferenceStateId> {
        self.state_tx.subscribe()
    }
}

impl fmt::Debug for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conference")
            .field("name", &self.name)
            .field("state", &self.state())
            .field("participants", &self.participant_count())
            .finish()
    }
}
