//! Reconciliation of local events with a remote calendar.

mod engine;
mod outcome;

pub use engine::{DEFAULT_CALL_TIMEOUT, SyncEngine};
pub use outcome::{DeleteOutcome, LinkResult, Reconciliation};
