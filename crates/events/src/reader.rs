//! JSONL event reader - sequential reader for replay

use crate::error::EventError;
use crate::record::JournalRecord;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential event reader for replay
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Create a new reader from a directory
    pub fn from_directory(path: impl AsRef<Path>) -> Result<Self, EventError> {
        let path = path.as_ref();
        let mut files = Vec::new();

        if path.exists() {
            for entry in std::fs::read_dir(path)? {
                let file_path = entry?.path();
                if file_path.extension().is_some_and(|ext| ext == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        // Date-named files sort chronologically
        files.sort();

        Ok(Self { files })
    }

    /// Read all records from all files in order.
    ///
    /// Fails on a gap or reordering in the sequence numbers.
    pub fn read_all(&self) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::new();

        for file_path in &self.files {
            for record in Self::read_file(file_path)? {
                let expected = records.last().map_or(1, |r: &JournalRecord| r.sequence + 1);
                if record.sequence != expected {
                    return Err(EventError::OutOfOrder {
                        expected,
                        actual: record.sequence,
                    });
                }
                records.push(record);
            }
        }

        Ok(records)
    }

    /// Sequence of the last record, if any
    pub fn last_sequence(&self) -> Result<Option<u64>, EventError> {
        match self.files.last() {
            Some(last_file) => Ok(Self::read_file(last_file)?.last().map(|r| r.sequence)),
            None => Ok(None),
        }
    }

    /// Count total records across all files
    pub fn count(&self) -> Result<usize, EventError> {
        let mut count = 0;
        for file_path in &self.files {
            let reader = BufReader::new(File::open(file_path)?);
            for line in reader.lines() {
                if !line?.trim().is_empty() {
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    fn read_file(path: &Path) -> Result<Vec<JournalRecord>, EventError> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(serde_json::from_str(&line)?);
        }

        Ok(records)
    }
}
