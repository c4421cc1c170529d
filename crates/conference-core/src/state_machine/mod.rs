pub mod actions;
pub mod executor;

pub use actions::{execute_action, execute_actions, ActionReport};
pub use executor::{execute_transition, Transition};
