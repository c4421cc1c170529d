//! Live states without a marked participant

use super::common::{handle_join, handle_leave};
use crate::state_table::{ConferenceStateId, StateTableBuilder};
use crate::types::ConferenceEvent;

pub fn add_single_state(builder: &mut StateTableBuilder) {
    add_unmarked_handlers(builder, ConferenceStateId::Single);
}

pub fn add_multi_state(builder: &mut StateTableBuilder) {
    add_unmarked_handlers(builder, ConferenceStateId::Multi);
}

// No marked participant is attached, so LEAVE_MARKED is never valid here.
fn add_unmarked_handlers(builder: &mut StateTableBuilder, state: ConferenceStateId) {
    builder
        .add_handler(state, ConferenceEvent::Join, handle_join)
        .add_handler(state, ConferenceEvent::JoinWaitMarked, handle_join)
        .add_handler(state, ConferenceEvent::JoinMarked, handle_join)
        .add_handler(state, ConferenceEvent::Leave, handle_leave)
        .add_handler(state, ConferenceEvent::LeaveWaitMarked, handle_leave);
}
