//! Broadcast channel distributing committed records

use crate::error::BusError;
use crate::subscriber::EventSubscriber;
use custody_events::{EventReader, JournalRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Default number of records a slow subscriber may fall behind
pub const DEFAULT_CAPACITY: usize = 1024;

/// Event bus for distributing committed records
pub struct EventBus {
    sender: broadcast::Sender<JournalRecord>,
    journal_path: PathBuf,
}

impl EventBus {
    /// Create a new event bus over the journal at `journal_path`
    pub fn new(journal_path: impl AsRef<Path>) -> Self {
        Self::with_capacity(journal_path, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(journal_path: impl AsRef<Path>, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            journal_path: journal_path.as_ref().to_path_buf(),
        }
    }

    /// Publish a committed record. Returns how many live receivers got it.
    ///
    /// Having no subscribers is normal; the journal already holds the record.
    pub fn publish(&self, record: JournalRecord) -> usize {
        self.sender.send(record).unwrap_or(0)
    }

    /// Raw receiver for callers that drive their own loop
    pub fn subscribe(&self) -> broadcast::Receiver<JournalRecord> {
        self.sender.subscribe()
    }

    /// Run a subscriber on its own task until the bus is dropped.
    ///
    /// The receiver is registered before this returns, so nothing published
    /// afterwards is missed.
    pub fn spawn(&self, subscriber: Arc<dyn EventSubscriber>) -> JoinHandle<Result<(), BusError>> {
        let mut receiver = self.sender.subscribe();

        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(record) => {
                        if let Err(e) = subscriber.handle(&record).await {
                            tracing::error!(
                                subscriber = subscriber.name(),
                                sequence = record.sequence,
                                error = %e,
                                "Subscriber failed"
                            );
                            return Err(e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(subscriber = subscriber.name(), skipped, "Subscriber lagged");
                        return Err(BusError::Lagged {
                            name: subscriber.name().to_string(),
                            skipped,
                        });
                    }
                    Err(RecvError::Closed) => return Ok(()),
                }
            }
        })
    }

    /// Feed the whole journal to a subscriber, in order
    pub async fn replay(&self, subscriber: &dyn EventSubscriber) -> Result<usize, BusError> {
        let records = self.reader()?.read_all()?;

        subscriber.on_replay_start().await?;
        for record in &records {
            subscriber.handle(record).await?;
        }
        subscriber.on_replay_complete(records.len()).await?;

        tracing::debug!(subscriber = subscriber.name(), records = records.len(), "Replay completed");
        Ok(records.len())
    }

    /// Get an event reader for replay
    pub fn reader(&self) -> Result<EventReader, custody_events::EventError> {
        EventReader::from_directory(&self.journal_path)
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use custody_core::{CustodyEvent, Principal};
    use custody_events::EventStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collector {
        sequences: Mutex<Vec<u64>>,
        replays: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl EventSubscriber for Collector {
        fn name(&self) -> &str {
            "collector"
        }

        async fn handle(&self, record: &JournalRecord) -> Result<(), BusError> {
            self.sequences.lock().unwrap().push(record.sequence);
            Ok(())
        }

        async fn on_replay_complete(&self, records: usize) -> Result<(), BusError> {
            self.replays.lock().unwrap().push(records);
            Ok(())
        }
    }

    fn record(sequence: u64) -> JournalRecord {
        JournalRecord {
            sequence,
            timestamp: Utc::now(),
            correlation_id: "test".to_string(),
            instance: None,
            event: CustodyEvent::Revoked {
                tx_id: 0,
                revoker: Principal::repeat(1),
            },
        }
    }

    #[tokio::test]
    async fn test_spawned_subscriber_sees_published_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let bus = EventBus::new(dir.path());
        let collector = Arc::new(Collector::default());

        let handle = bus.spawn(collector.clone());
        assert_eq!(bus.publish(record(1)), 1);
        bus.publish(record(2));
        drop(bus);

        handle.await.unwrap().unwrap();
        assert_eq!(*collector.sequences.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let dir = tempfile::TempDir::new().unwrap();
        let bus = EventBus::new(dir.path());
        assert_eq!(bus.publish(record(1)), 0);
    }

    #[tokio::test]
    async fn test_replay_from_journal() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mut store = EventStore::new(dir.path()).unwrap();
            for tx_id in 0..3 {
                store
                    .record(
                        "replay",
                        None,
                        CustodyEvent::Approved {
                            tx_id,
                            approver: Principal::repeat(2),
                        },
                    )
                    .unwrap();
            }
        }

        let bus = EventBus::new(dir.path());
        let collector = Collector::default();
        let replayed = bus.replay(&collector).await.unwrap();

        assert_eq!(replayed, 3);
        assert_eq!(*collector.sequences.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*collector.replays.lock().unwrap(), vec![3]);
    }
}
