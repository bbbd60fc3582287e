//! Custody Registry - committee wallet deployment
//!
//! Maps each ordered committee to exactly one wallet. Once deployed, a
//! wallet is driven directly; the registry only answers lookups afterwards.

pub mod config;
pub mod error;
pub mod key;
pub mod registry;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use key::committee_key;
pub use registry::{Deployment, Registry};
