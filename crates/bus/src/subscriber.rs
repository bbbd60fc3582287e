//! Event subscriber trait for async event handling

use crate::error::BusError;
use async_trait::async_trait;
use custody_events::JournalRecord;

/// Trait for event subscribers
///
/// Subscribers receive committed records from the bus, or from a journal
/// during replay. Each subscriber should tolerate seeing a record twice.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Get the subscriber name (for logging)
    fn name(&self) -> &str;

    /// Handle one committed record
    async fn handle(&self, record: &JournalRecord) -> Result<(), BusError>;

    /// Called when replay starts (optional)
    async fn on_replay_start(&self) -> Result<(), BusError> {
        Ok(())
    }

    /// Called when replay completes (optional)
    async fn on_replay_complete(&self, _records: usize) -> Result<(), BusError> {
        Ok(())
    }
}
