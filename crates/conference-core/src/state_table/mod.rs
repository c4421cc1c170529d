//! Conference state table
//!
//! One immutable descriptor per state holding its entry and exit actions
//! and the events it handles. Tables are built once and shared by every
//! conference that uses them.

pub mod builder;
pub mod tables;
pub mod types;

pub use builder::StateTableBuilder;
pub use types::*;

use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// The standard conference bridge table
    pub static ref DEFAULT_TABLE: Arc<StateTable> = Arc::new(build_default_table());
}

fn build_default_table() -> StateTable {
    let table = StateTableBuilder::with_defaults().build();
    if let Err(errors) = table.validate() {
        tracing::error!("Default conference state table is invalid: {:?}", errors);
    }
    tracing::debug!("Built default conference state table");
    table
}
