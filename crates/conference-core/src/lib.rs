//! # RVoIP Conference Core
//!
//! Admission and lifecycle control for conference bridges.
//!
//! Every participant joining or leaving a conference is an event applied
//! through a state table. The table decides which mode the conference is
//! in (empty, waiting for a marked participant, single, multi, marked) and
//! which side effects the change triggers: waiting treatment, release of
//! parked participants, kicks, prompts and notifications.
//!
//! ## Architecture
//!
//! - `state_table`: immutable per-state descriptors and the default bridge table
//! - `registry`: active and waiting sets of one conference, admission policy
//! - `action_queue`: side effects deferred until the conference lock is released
//! - `state_machine`: the transition engine and the deferred action runner
//! - `conference`: a conference instance, its lock and its participants
//! - `manager`: name based conference registry
//! - `adapters`: media and event bus collaborator interfaces
//!
//! ## Example
//!
//! ```no_run
//! use rvoip_conference_core::{Conference, Participant, UserProfile};
//!
//! # async fn example() -> rvoip_conference_core::Result<()> {
//! let conference = Conference::with_defaults("sales");
//! let mut leader = Participant::new(UserProfile::marked());
//! let mut guest = Participant::new(UserProfile::wait_marked());
//!
//! conference.join(&mut guest).await?;   // parked, hears music on hold
//! conference.join(&mut leader).await?;  // guest is released into the mix
//! conference.leave(&mut leader).await?; // guest is parked again
//! # Ok(())
//! # }
//! ```

pub mod action_queue;
pub mod adapters;
pub mod conference;
pub mod config;
pub mod errors;
pub mod logging;
pub mod manager;
pub mod registry;
pub mod state_machine;
pub mod state_table;
pub mod types;

// Re-export key types
pub use action_queue::{ActionQueue, ConferenceNotification, DeferredAction};
pub use adapters::{
    BroadcastEventSink, ConferenceEventSink, LoggingMediaController, MediaController, TracingEventSink,
};
pub use conference::{Conference, ConferenceSnapshot, EventOutcome, Participant};
pub use config::{ConferenceConfig, DemotionPolicy, RegistryConfig};
pub use errors::{ConferenceError, Result};
pub use manager::{ConferenceLookup, ConferenceRegistry};
pub use registry::{Admission, Departure, ParticipantRecord, ParticipantRegistry};
pub use state_table::{ConferenceStateId, StateTable, StateTableBuilder, TransitionContext, DEFAULT_TABLE};
pub use types::*;
