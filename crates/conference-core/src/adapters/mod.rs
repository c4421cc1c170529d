//! Seams to the collaborators around the conference core
//!
//! - [`media`]: puts participants into waiting treatment or the live mix
//! - [`events`]: receives state-change and invalid-event notifications

pub mod events;
pub mod media;

pub use events::{BroadcastEventSink, ConferenceEventSink, TracingEventSink};
pub use media::{LoggingMediaController, MediaController};
