//! Default conference bridge tables

pub mod common;
pub mod idle;
pub mod marked;
pub mod unmarked;

use crate::state_table::StateTableBuilder;

/// Register every state of the standard conference bridge
pub fn add_default_states(builder: &mut StateTableBuilder) {
    idle::add_empty_state(builder);
    idle::add_inactive_state(builder);
    unmarked::add_single_state(builder);
    unmarked::add_multi_state(builder);
    marked::add_single_marked_state(builder);
    marked::add_multi_marked_state(builder);
}
