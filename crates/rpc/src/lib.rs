//! Custody RPC - API/CLI orchestrator
//!
//! This crate provides the CLI binary and command orchestration.

pub mod commands;
pub mod config;
pub mod context;

pub use config::CustodyConfig;
pub use context::{AppContext, CommandError, ReplayError};
