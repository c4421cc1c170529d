//! States with at least one marked participant

use super::common::{handle_join, handle_leave, release_waiting};
use crate::state_table::{ConferenceStateId, StateTableBuilder};
use crate::types::ConferenceEvent;

/// SINGLE_MARKED: the only participant is marked
pub fn add_single_marked_state(builder: &mut StateTableBuilder) {
    let state = ConferenceStateId::SingleMarked;

    builder
        .set_entry(state, release_waiting)
        .add_handler(state, ConferenceEvent::Join, handle_join)
        .add_handler(state, ConferenceEvent::JoinWaitMarked, handle_join)
        .add_handler(state, ConferenceEvent::JoinMarked, handle_join)
        .add_handler(state, ConferenceEvent::LeaveMarked, handle_leave);
}

/// MULTI_MARKED: every event is valid
pub fn add_multi_marked_state(builder: &mut StateTableBuilder) {
    let state = ConferenceStateId::MultiMarked;

    builder.set_entry(state, release_waiting);
    for event in ConferenceEvent::ALL {
        if event.is_join() {
            builder.add_handler(state, event, handle_join);
        } else {
            builder.add_handler(state, event, handle_leave);
        }
    }
}
