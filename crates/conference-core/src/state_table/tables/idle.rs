//! States with nobody in the live mix

use super::common::{handle_join, handle_leave, publish, wait_all};
use crate::action_queue::ConferenceNotification;
use crate::state_table::{ConferenceStateId, StateTableBuilder};
use crate::types::ConferenceEvent;

/// EMPTY: nobody attached. Leaving it starts the conference, entering it
/// ends the conference.
pub fn add_empty_state(builder: &mut StateTableBuilder) {
    let state = ConferenceStateId::Empty;

    builder
        .set_entry(state, |ctx| {
            let conference = ctx.conference().to_string();
            publish(ctx, ConferenceNotification::ConferenceEnded { conference });
        })
        .set_exit(state, |ctx| {
            let conference = ctx.conference().to_string();
            publish(ctx, ConferenceNotification::ConferenceStarted { conference });
        })
        .add_handler(state, ConferenceEvent::Join, handle_join)
        .add_handler(state, ConferenceEvent::JoinWaitMarked, handle_join)
        .add_handler(state, ConferenceEvent::JoinMarked, handle_join);
}

/// INACTIVE: only wait-marked participants, all parked
pub fn add_inactive_state(builder: &mut StateTableBuilder) {
    let state = ConferenceStateId::Inactive;

    builder
        .set_entry(state, wait_all)
        .add_handler(state, ConferenceEvent::Join, handle_join)
        .add_handler(state, ConferenceEvent::JoinWaitMarked, handle_join)
        .add_handler(state, ConferenceEvent::JoinMarked, handle_join)
        .add_handler(state, ConferenceEvent::LeaveWaitMarked, handle_leave);
}
