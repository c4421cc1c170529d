//! Core types for conference-core
//!
//! Identifiers, participant profiles and the events participants raise
//! against a conference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conference name (unique per registry)
pub type ConferenceName = String;

/// Participant ID type, unique per attachment
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn new() -> Self {
        Self(format!("participant-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Per-attachment user options, fixed when the participant joins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    /// Marked (leader) participant; its presence makes the conference live
    pub marked: bool,
    /// Park this participant until a marked participant is present
    pub wait_marked: bool,
    /// Remove this participant once the last marked participant leaves
    pub end_marked: bool,
    /// Play music on hold while waiting
    pub music_on_hold: bool,
    /// Suppress prompts for this participant
    pub quiet: bool,
}

impl UserProfile {
    /// Plain participant, admitted straight into the live mix
    pub fn unmarked() -> Self {
        Self::default()
    }

    pub fn marked() -> Self {
        Self { marked: true, ..Default::default() }
    }

    /// Participant that waits (with music on hold) for a marked participant
    pub fn wait_marked() -> Self {
        Self { wait_marked: true, music_on_hold: true, ..Default::default() }
    }

    pub fn with_end_marked(mut self) -> Self {
        self.end_marked = true;
        self
    }

    pub fn with_quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    pub fn role(&self) -> ParticipantRole {
        if self.marked {
            ParticipantRole::Marked
        } else if self.wait_marked {
            ParticipantRole::WaitMarked
        } else {
            ParticipantRole::Unmarked
        }
    }
}

/// Admission role derived from a [`UserProfile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRole {
    Unmarked,
    WaitMarked,
    Marked,
}

/// A participant's own progress through admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Membership {
    /// Created, join not applied yet
    Attaching,
    /// Parked in the waiting set
    Waiting,
    /// Mixed into the live audio
    Active,
    /// Leave applied or in progress
    Detaching,
}

/// Identity and profile of a participant as seen by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub profile: UserProfile,
}

impl ParticipantInfo {
    pub fn new(id: ParticipantId, profile: UserProfile) -> Self {
        Self { id, profile }
    }

    pub fn role(&self) -> ParticipantRole {
        self.profile.role()
    }

    pub fn is_marked(&self) -> bool {
        self.profile.marked
    }
}

/// Events a participant worker raises against its conference
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConferenceEvent {
    Join,
    JoinWaitMarked,
    JoinMarked,
    Leave,
    LeaveWaitMarked,
    LeaveMarked,
}

impl ConferenceEvent {
    pub const ALL: [ConferenceEvent; 6] = [
        ConferenceEvent::Join,
        ConferenceEvent::JoinWaitMarked,
        ConferenceEvent::JoinMarked,
        ConferenceEvent::Leave,
        ConferenceEvent::LeaveWaitMarked,
        ConferenceEvent::LeaveMarked,
    ];

    /// The join event matching a role
    pub fn join(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Unmarked => ConferenceEvent::Join,
            ParticipantRole::WaitMarked => ConferenceEvent::JoinWaitMarked,
            ParticipantRole::Marked => ConferenceEvent::JoinMarked,
        }
    }

    /// The leave event matching a role
    pub fn leave(role: ParticipantRole) -> Self {
        match role {
            ParticipantRole::Unmarked => ConferenceEvent::Leave,
            ParticipantRole::WaitMarked => ConferenceEvent::LeaveWaitMarked,
            ParticipantRole::Marked => ConferenceEvent::LeaveMarked,
        }
    }

    pub fn role(&self) -> ParticipantRole {
        match self {
            ConferenceEvent::Join | ConferenceEvent::Leave => ParticipantRole::Unmarked,
            ConferenceEvent::JoinWaitMarked | ConferenceEvent::LeaveWaitMarked => {
                ParticipantRole::WaitMarked
            }
            ConferenceEvent::JoinMarked | ConferenceEvent::LeaveMarked => ParticipantRole::Marked,
        }
    }

    pub fn is_join(&self) -> bool {
        matches!(
            self,
            ConferenceEvent::Join | ConferenceEvent::JoinWaitMarked | ConferenceEvent::JoinMarked
        )
    }

    pub fn is_leave(&self) -> bool {
        !self.is_join()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConferenceEvent::Join => "JOIN",
            ConferenceEvent::JoinWaitMarked => "JOIN_WAITMARKED",
            ConferenceEvent::JoinMarked => "JOIN_MARKED",
            ConferenceEvent::Leave => "LEAVE",
            ConferenceEvent::LeaveWaitMarked => "LEAVE_WAITMARKED",
            ConferenceEvent::LeaveMarked => "LEAVE_MARKED",
        }
    }
}

impl fmt::Display for ConferenceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prompts played to a single participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prompt {
    /// "You are currently the only person in this conference"
    OnlyPerson,
    /// "The conference will begin when the leader arrives"
    WaitForLeader,
    /// "You will now be placed into the conference"
    PlacedIntoConference,
    /// "The leader has left the conference"
    LeaderHasLeft,
}
