//! Custody Event Bus - In-process async event distribution
//!
//! Distributes committed journal records to subscribers (UIs, monitoring).
//!
//! - Async pub/sub with tokio broadcast channel
//! - EventSubscriber trait for custom handlers
//! - Replay from JSONL (Source of Truth)
//! - No retention in bus - events only in JSONL

pub mod channel;
pub mod error;
pub mod subscriber;

pub use channel::EventBus;
pub use error::BusError;
pub use subscriber::EventSubscriber;
