//! Conference registry
//!
//! Owns every live [`Conference`] by name. Conferences are created on
//! first join and removed once they are empty and nobody else holds them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::adapters::{ConferenceEventSink, LoggingMediaController, MediaController, TracingEventSink};
use crate::conference::{Conference, EventOutcome, Participant};
use crate::config::RegistryConfig;
use crate::errors::{ConferenceError, Result};
use crate::state_table::{StateTable, DEFAULT_TABLE};

/// Name based lookup of conferences, injected where a conference handle is
/// needed
pub trait ConferenceLookup: Send + Sync {
    /// Existing conference or a newly registered one
    fn find_or_create(&self, name: &str) -> Result<Arc<Conference>>;

    fn find(&self, name: &str) -> Option<Arc<Conference>>;
}

pub struct ConferenceRegistry {
    conferences: DashMap<String, Arc<Conference>>,
    /// Registered conferences plus creations in flight, bounded by
    /// `max_conferences`
    slots: AtomicUsize,
    config: RegistryConfig,
    table: Arc<StateTable>,
    media: Arc<dyn MediaController>,
    events: Arc<dyn ConferenceEventSink>,
}

impl ConferenceRegistry {
    pub fn new(
        config: RegistryConfig,
        table: Arc<StateTable>,
        media: Arc<dyn MediaController>,
        events: Arc<dyn ConferenceEventSink>,
    ) -> Result<Self> {
        config.validate()?;
        table.validate().map_err(|errors| ConferenceError::Config(errors.join("; ")))?;
        Ok(Self { conferences: DashMap::new(), slots: AtomicUsize::new(0), config, table, media, events })
    }

    /// Default table, logging collaborators
    pub fn with_config(config: RegistryConfig) -> Result<Self> {
        Self::new(
            config,
            DEFAULT_TABLE.clone(),
            Arc::new(LoggingMediaController),
            Arc::new(TracingEventSink),
        )
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Join `participant` to the named conference, creating it if needed.
    /// A conference created here is unregistered again if the join fails.
    pub async fn join(&self, name: &str, participant: &mut Participant) -> Result<EventOutcome> {
        let existed = self.conferences.contains_key(name);
        let conference = self.find_or_create(name)?;

        let result = conference.join(participant).await;
        if result.is_err() && !existed {
            drop(conference);
            self.remove_if_empty(name);
        }
        result
    }

    /// Leave the named conference and reap it if that emptied it
    pub async fn leave(&self, name: &str, participant: &mut Participant) -> Result<EventOutcome> {
        let conference = self.find(name).ok_or_else(|| ConferenceError::NotAttached {
            conference: name.to_string(),
            participant: participant.id().clone(),
        })?;

        let result = conference.leave(participant).await;
        drop(conference);
        self.remove_if_empty(name);
        result
    }

    /// Remove the conference if nobody is attached and no other handle to it
    /// exists. Returns whether it was removed.
    pub fn remove_if_empty(&self, name: &str) -> bool {
        let removed = self
            .conferences
            .remove_if(name, |_, conference| conference.is_empty() && Arc::strong_count(conference) == 1)
            .is_some();
        if removed {
            self.release_slot();
            info!("Removed conference '{}'", name);
        }
        removed
    }

    /// Remove every empty, unreferenced conference. Returns how many went.
    pub fn reap_empty(&self) -> usize {
        let mut reaped = 0;
        self.conferences.retain(|_, conference| {
            let keep = !(conference.is_empty() && Arc::strong_count(conference) == 1);
            if !keep {
                reaped += 1;
            }
            keep
        });
        if reaped > 0 {
            self.slots.fetch_sub(reaped, Ordering::SeqCst);
            debug!("Reaped {} empty conferences", reaped);
        }
        reaped
    }

    /// Take a conference slot, failing once `max_conferences` are in use
    fn reserve_slot(&self, name: &str) -> Result<()> {
        let max = self.config.max_conferences;
        self.slots
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| match max {
                Some(max) if used >= max => None,
                _ => Some(used + 1),
            })
            .map(|_| ())
            .map_err(|used| {
                ConferenceError::AllocationFailure(format!(
                    "cannot create conference '{}': limit of {} reached",
                    name,
                    max.unwrap_or(used)
                ))
            })
    }

    fn release_slot(&self) {
        self.slots.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.conferences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conferences.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.conferences.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }
}

impl ConferenceLookup for ConferenceRegistry {
    fn find_or_create(&self, name: &str) -> Result<Arc<Conference>> {
        if let Some(conference) = self.conferences.get(name) {
            return Ok(conference.value().clone());
        }

        self.reserve_slot(name)?;

        let conference = match self.conferences.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                self.release_slot();
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let conference = match Conference::new(
                    name,
                    self.config.conference.clone(),
                    self.table.clone(),
                    self.media.clone(),
                    self.events.clone(),
                ) {
                    Ok(conference) => Arc::new(conference),
                    Err(err) => {
                        self.release_slot();
                        return Err(err);
                    }
                };
                entry.insert(conference.clone());
                info!("Created conference '{}'", name);
                conference
            }
        };
        Ok(conference)
    }

    fn find(&self, name: &str) -> Option<Arc<Conference>> {
        self.conferences.get(name).map(|entry| entry.value().clone())
    }
}
