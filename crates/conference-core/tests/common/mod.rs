//! Shared helpers for conference-core integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rvoip_conference_core::{
    Conference, ConferenceConfig, ConferenceError, ConferenceEvent, ConferenceEventSink,
    ConferenceNotification, ConferenceStateId, MediaController, Membership, ParticipantId,
    ParticipantInfo, Prompt, Result, StateTable, DEFAULT_TABLE,
};

/// A call the conference made into the media layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    Wait(ParticipantId),
    Admit(ParticipantId),
    SecondActive(ParticipantId),
    ReleaseAll(Vec<ParticipantId>),
    Kick(ParticipantId),
    Prompt(ParticipantId, Prompt),
    Announce(Prompt),
}

#[derive(Debug, Default)]
pub struct RecordingMedia {
    calls: Mutex<Vec<MediaCall>>,
    fail_admits: AtomicBool,
}

impl RecordingMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<MediaCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn waits(&self) -> Vec<ParticipantId> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MediaCall::Wait(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn fail_admits(&self, fail: bool) {
        self.fail_admits.store(fail, Ordering::SeqCst);
    }

    fn record(&self, call: MediaCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaController for RecordingMedia {
    async fn notify_wait(&self, _conference: &str, participant: &ParticipantInfo) -> Result<()> {
        self.record(MediaCall::Wait(participant.id.clone()));
        Ok(())
    }

    async fn notify_admit(&self, _conference: &str, participant: &ParticipantInfo) -> Result<()> {
        if self.fail_admits.load(Ordering::SeqCst) {
            return Err(ConferenceError::Media("mixer unavailable".to_string()));
        }
        self.record(MediaCall::Admit(participant.id.clone()));
        Ok(())
    }

    async fn notify_second_active(&self, _conference: &str, participant: &ParticipantInfo) -> Result<()> {
        self.record(MediaCall::SecondActive(participant.id.clone()));
        Ok(())
    }

    async fn notify_release_all(&self, _conference: &str, participants: &[ParticipantInfo]) -> Result<()> {
        self.record(MediaCall::ReleaseAll(participants.iter().map(|p| p.id.clone()).collect()));
        Ok(())
    }

    async fn notify_kick(&self, _conference: &str, participant: &ParticipantInfo) -> Result<()> {
        self.record(MediaCall::Kick(participant.id.clone()));
        Ok(())
    }

    async fn play_prompt(&self, _conference: &str, participant: &ParticipantId, prompt: Prompt) -> Result<()> {
        self.record(MediaCall::Prompt(participant.clone(), prompt));
        Ok(())
    }

    async fn announce(&self, _conference: &str, prompt: Prompt) -> Result<()> {
        self.record(MediaCall::Announce(prompt));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    notifications: Mutex<Vec<ConferenceNotification>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn notifications(&self) -> Vec<ConferenceNotification> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<ConferenceNotification> {
        std::mem::take(&mut *self.notifications.lock().unwrap())
    }

    pub fn state_changes(&self) -> Vec<(ConferenceStateId, ConferenceStateId)> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                ConferenceNotification::StateChanged { old_state, new_state, .. } => Some((old_state, new_state)),
                _ => None,
            })
            .collect()
    }

    pub fn invalid_events(&self) -> usize {
        self.notifications()
            .iter()
            .filter(|n| matches!(n, ConferenceNotification::InvalidEvent { .. }))
            .count()
    }

    fn record(&self, notification: ConferenceNotification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

impl ConferenceEventSink for RecordingSink {
    fn on_invalid_event(
        &self,
        conference: &str,
        participant: &ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    ) {
        self.record(ConferenceNotification::InvalidEvent {
            conference: conference.to_string(),
            participant: participant.clone(),
            event,
            state,
        });
    }

    fn on_state_changed(&self, conference: &str, old_state: ConferenceStateId, new_state: ConferenceStateId) {
        self.record(ConferenceNotification::StateChanged {
            conference: conference.to_string(),
            old_state,
            new_state,
        });
    }

    fn on_conference_started(&self, conference: &str) {
        self.record(ConferenceNotification::ConferenceStarted { conference: conference.to_string() });
    }

    fn on_conference_ended(&self, conference: &str) {
        self.record(ConferenceNotification::ConferenceEnded { conference: conference.to_string() });
    }

    fn on_participant_joined(&self, conference: &str, participant: &ParticipantId, membership: Membership) {
        self.record(ConferenceNotification::ParticipantJoined {
            conference: conference.to_string(),
            participant: participant.clone(),
            membership,
        });
    }

    fn on_participant_left(&self, conference: &str, participant: &ParticipantId) {
        self.record(ConferenceNotification::ParticipantLeft {
            conference: conference.to_string(),
            participant: participant.clone(),
        });
    }
}

/// A conference wired to recording collaborators
pub struct Harness {
    pub conference: Arc<Conference>,
    pub media: Arc<RecordingMedia>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ConferenceConfig::default(), DEFAULT_TABLE.clone())
    }

    pub fn with_config(config: ConferenceConfig) -> Self {
        Self::with(config, DEFAULT_TABLE.clone())
    }

    pub fn with(config: ConferenceConfig, table: Arc<StateTable>) -> Self {
        let media = RecordingMedia::new();
        let sink = RecordingSink::new();
        let conference = Arc::new(
            Conference::new("test-conf", config, table, media.clone(), sink.clone()).unwrap(),
        );
        Self { conference, media, sink }
    }

    /// Forget everything recorded so far
    pub fn reset_recordings(&self) {
        self.media.take();
        self.sink.take();
    }
}

pub fn ids(names: &[&str]) -> Vec<ParticipantId> {
    names.iter().map(|name| ParticipantId::from(*name)).collect()
}
