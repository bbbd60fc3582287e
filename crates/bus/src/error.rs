//! Event bus errors

use thiserror::Error;

/// Errors that can occur in the event bus
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Subscriber '{name}' failed: {reason}")]
    SubscriberFailed { name: String, reason: String },

    #[error("Subscriber '{name}' lagged, {skipped} records dropped")]
    Lagged { name: String, skipped: u64 },

    #[error("Event store error: {0}")]
    EventStore(#[from] custody_events::EventError),
}
