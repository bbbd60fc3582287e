//! Custody Events - JSONL event journal
//!
//! Every event a wallet or the registry emits is appended here, in order.
//! The journal is the Source of Truth: in-memory state is rebuilt from it.

pub mod error;
pub mod reader;
pub mod record;
pub mod store;

pub use error::EventError;
pub use reader::EventReader;
pub use record::JournalRecord;
pub use store::EventStore;
