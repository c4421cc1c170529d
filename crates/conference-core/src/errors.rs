//! Error types for conference-core
//!
//! Every error is reported to the worker that raised the event. None of them
//! leaves a conference in an inconsistent state.

use thiserror::Error;

use crate::state_table::ConferenceStateId;
use crate::types::{ConferenceEvent, ParticipantId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConferenceError {
    /// No handler for this event in the current state. Nothing changed.
    #[error("Invalid event {event} for participant {participant} in conference '{conference}' (state {state})")]
    InvalidEvent {
        conference: String,
        participant: ParticipantId,
        event: ConferenceEvent,
        state: ConferenceStateId,
    },

    #[error("Participant {participant} is not attached to conference '{conference}'")]
    NotAttached {
        conference: String,
        participant: ParticipantId,
    },

    #[error("Participant {participant} is already attached to conference '{conference}'")]
    AlreadyAttached {
        conference: String,
        participant: ParticipantId,
    },

    /// A conference or participant record could not be created
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConferenceError {
    /// Errors after which the caller can carry on as if it never raised the event
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConferenceError::InvalidEvent { .. }
                | ConferenceError::NotAttached { .. }
                | ConferenceError::AlreadyAttached { .. }
        )
    }
}

impl From<serde_yaml::Error> for ConferenceError {
    fn from(err: serde_yaml::Error) -> Self {
        ConferenceError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConferenceError>;
