//! JSONL event store - append-only writer

use crate::error::EventError;
use crate::reader::EventReader;
use crate::record::JournalRecord;
use chrono::Utc;
use custody_core::{CustodyEvent, InstanceId};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSONL event store, one file per day
pub struct EventStore {
    base_path: PathBuf,
    current_file: Option<BufWriter<File>>,
    current_date: Option<String>,
    last_sequence: u64,
}

impl EventStore {
    /// Open (or create) a store, continuing after the last recorded sequence
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self, EventError> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;

        let last_sequence = EventReader::from_directory(&base_path)?
            .last_sequence()?
            .unwrap_or(0);

        Ok(Self {
            base_path,
            current_file: None,
            current_date: None,
            last_sequence,
        })
    }

    /// Stamp an event with the next sequence and append it
    pub fn record(
        &mut self,
        correlation_id: &str,
        instance: Option<InstanceId>,
        event: CustodyEvent,
    ) -> Result<JournalRecord, EventError> {
        let record = JournalRecord {
            sequence: self.last_sequence + 1,
            timestamp: Utc::now(),
            correlation_id: correlation_id.to_string(),
            instance,
            event,
        };
        self.append(&record)?;
        Ok(record)
    }

    /// Append a prepared record. Its sequence must follow the last one.
    pub fn append(&mut self, record: &JournalRecord) -> Result<(), EventError> {
        let expected = self.last_sequence + 1;
        if record.sequence != expected {
            return Err(EventError::OutOfOrder {
                expected,
                actual: record.sequence,
            });
        }

        let date = record.timestamp.format("%Y-%m-%d").to_string();

        // Rotate file if date changed
        if self.current_date.as_ref() != Some(&date) {
            self.rotate_file(&date)?;
        }

        if let Some(ref mut writer) = self.current_file {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }

        self.last_sequence = record.sequence;
        tracing::trace!(sequence = record.sequence, kind = record.event.kind(), "journal append");
        Ok(())
    }

    /// Rotate to a new file for the given date
    fn rotate_file(&mut self, date: &str) -> Result<(), EventError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }

        let file_path = self.base_path.join(format!("{}.jsonl", date));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        self.current_file = Some(BufWriter::new(file));
        self.current_date = Some(date.to_string());

        Ok(())
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Flush and close the current file
    pub fn close(&mut self) -> Result<(), EventError> {
        if let Some(ref mut writer) = self.current_file {
            writer.flush()?;
        }
        self.current_file = None;
        self.current_date = None;
        Ok(())
    }
}

impl Drop for EventStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
