//! Participant registry and admission policy
//!
//! Owns the active and waiting sets of one conference together with its
//! marked count. Every mutation happens under the conference lock, and
//! every operation either succeeds completely or leaves the registry
//! untouched.

use indexmap::IndexMap;

use crate::config::{ConferenceConfig, DemotionPolicy};
use crate::errors::{ConferenceError, Result};
use crate::state_table::ConferenceStateId;
use crate::types::{Membership, ParticipantId, ParticipantInfo, ParticipantRole};

/// Registry entry for one attached participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub info: ParticipantInfo,
    pub membership: Membership,
    /// Waiting treatment has been requested for the current wait
    pub on_hold: bool,
    /// A kick has been requested; the participant's own LEAVE is pending
    pub kicked: bool,
}

impl ParticipantRecord {
    fn new(info: ParticipantInfo, membership: Membership) -> Self {
        Self { info, membership, on_hold: false, kicked: false }
    }
}

/// Result of a successful admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub membership: Membership,
    pub target: ConferenceStateId,
}

/// Result of a successful departure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// The record as it was before removal
    pub record: ParticipantRecord,
    /// Moved from the active set to the waiting set, in active order
    pub demoted: Vec<ParticipantInfo>,
    /// End-marked participants that must now be removed
    pub kicked: Vec<ParticipantInfo>,
    pub last_marked_left: bool,
    pub target: ConferenceStateId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegistry {
    active: IndexMap<ParticipantId, ParticipantRecord>,
    waiting: IndexMap<ParticipantId, ParticipantRecord>,
    marked_count: usize,
    max_members: Option<usize>,
    policy: DemotionPolicy,
}

impl ParticipantRegistry {
    pub fn new(config: &ConferenceConfig) -> Self {
        Self {
            max_members: config.max_members,
            policy: config.demotion_policy,
            ..Default::default()
        }
    }

    /// Insert a joining participant into the active or waiting set
    pub fn admit(&mut self, conference: &str, info: ParticipantInfo) -> Result<Admission> {
        if self.contains(&info.id) {
            return Err(ConferenceError::AlreadyAttached {
                conference: conference.to_string(),
                participant: info.id,
            });
        }
        if let Some(max) = self.max_members {
            if self.len() >= max {
                return Err(ConferenceError::AllocationFailure(format!(
                    "conference '{}' is full ({} members)",
                    conference, max
                )));
            }
        }

        let membership = match info.role() {
            ParticipantRole::Marked | ParticipantRole::Unmarked => Membership::Active,
            ParticipantRole::WaitMarked if self.marked_count > 0 => Membership::Active,
            ParticipantRole::WaitMarked => Membership::Waiting,
        };

        if info.is_marked() {
            self.marked_count += 1;
        }
        let id = info.id.clone();
        let record = ParticipantRecord::new(info, membership);
        match membership {
            Membership::Waiting => self.waiting.insert(id, record),
            _ => self.active.insert(id, record),
        };

        Ok(Admission { membership, target: self.target_state() })
    }

    /// Remove a participant, applying the demotion policy when it was the
    /// last marked participant
    pub fn depart(&mut self, conference: &str, id: &ParticipantId) -> Result<Departure> {
        let record = match self.active.shift_remove(id) {
            Some(record) => record,
            None => self.waiting.shift_remove(id).ok_or_else(|| ConferenceError::NotAttached {
                conference: conference.to_string(),
                participant: id.clone(),
            })?,
        };

        let mut demoted = Vec::new();
        let mut kicked = Vec::new();
        let mut last_marked_left = false;

        if record.info.is_marked() {
            self.marked_count = self.marked_count.saturating_sub(1);
            if self.marked_count == 0 {
                last_marked_left = true;
                kicked = self.kick_end_marked();
                if self.policy == DemotionPolicy::DemoteWaitMarked {
                    demoted = self.demote_wait_marked();
                }
            }
        }

        Ok(Departure { record, demoted, kicked, last_marked_left, target: self.target_state() })
    }

    fn kick_end_marked(&mut self) -> Vec<ParticipantInfo> {
        self.active
            .values_mut()
            .filter(|record| record.info.profile.end_marked && !record.kicked)
            .map(|record| {
                record.kicked = true;
                record.info.clone()
            })
            .collect()
    }

    /// Move active wait-marked participants to the tail of the waiting set.
    /// Kicked ones are parked too but get no waiting treatment.
    fn demote_wait_marked(&mut self) -> Vec<ParticipantInfo> {
        let ids: Vec<ParticipantId> = self
            .active
            .values()
            .filter(|record| record.info.role() == ParticipantRole::WaitMarked)
            .map(|record| record.info.id.clone())
            .collect();

        let mut demoted = Vec::new();
        for id in ids {
            if let Some(mut record) = self.active.shift_remove(&id) {
                record.membership = Membership::Waiting;
                record.on_hold = false;
                if !record.kicked {
                    demoted.push(record.info.clone());
                }
                self.waiting.insert(id, record);
            }
        }
        demoted
    }

    /// Move every waiting participant, FIFO, to the tail of the active set
    pub fn release_waiting(&mut self) -> Vec<ParticipantInfo> {
        let waiting = std::mem::take(&mut self.waiting);
        let mut released = Vec::with_capacity(waiting.len());
        for (id, mut record) in waiting {
            record.membership = Membership::Active;
            record.on_hold = false;
            released.push(record.info.clone());
            self.active.insert(id, record);
        }
        released
    }

    /// Flag a waiting participant as under waiting treatment. Returns its
    /// info if treatment still has to be started.
    pub fn hold(&mut self, id: &ParticipantId) -> Option<ParticipantInfo> {
        let record = self.waiting.get_mut(id)?;
        if record.on_hold || record.kicked {
            return None;
        }
        record.on_hold = true;
        Some(record.info.clone())
    }

    /// [`hold`](Self::hold) for the whole waiting set, in FIFO order
    pub fn hold_all(&mut self) -> Vec<ParticipantInfo> {
        self.waiting
            .values_mut()
            .filter(|record| !record.on_hold && !record.kicked)
            .map(|record| {
                record.on_hold = true;
                record.info.clone()
            })
            .collect()
    }

    pub fn target_state(&self) -> ConferenceStateId {
        ConferenceStateId::for_counts(self.marked_count, self.active.len(), self.waiting.len())
    }

    pub fn marked_count(&self) -> usize {
        self.marked_count
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// Attached participants, active and waiting
    pub fn len(&self) -> usize {
        self.active.len() + self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.waiting.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.active.contains_key(id) || self.waiting.contains_key(id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&ParticipantRecord> {
        self.active.get(id).or_else(|| self.waiting.get(id))
    }

    pub fn membership_of(&self, id: &ParticipantId) -> Option<Membership> {
        self.get(id).map(|record| record.membership)
    }

    /// Active participant ids in admission order
    pub fn active_ids(&self) -> Vec<ParticipantId> {
        self.active.keys().cloned().collect()
    }

    /// The one other live participant when `id` has just made the live mix
    /// two strong
    pub fn second_active_peer(&self, id: &ParticipantId) -> Option<ParticipantInfo> {
        if self.active.len() != 2 || !self.active.contains_key(id) {
            return None;
        }
        self.active
            .values()
            .find(|record| &record.info.id != id)
            .map(|record| record.info.clone())
    }

    /// Waiting participant ids in FIFO order
    pub fn waiting_ids(&self) -> Vec<ParticipantId> {
        self.waiting.keys().cloned().collect()
    }
}
