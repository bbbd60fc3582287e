//! Registry configuration

use custody_core::Principal;
use serde::{Deserialize, Serialize};

/// Configuration for the registry.
///
/// Every field has a serde default so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// When set, only this principal may deploy wallets
    #[serde(default)]
    pub operator: Option<Principal>,

    /// Largest committee a deployment may name
    #[serde(default = "default_max_committee_size")]
    pub max_committee_size: usize,
}

fn default_max_committee_size() -> usize {
    64
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            operator: None,
            max_committee_size: default_max_committee_size(),
        }
    }
}

impl RegistryConfig {
    /// Restrict deployments to a single operator
    pub fn with_operator(mut self, operator: Principal) -> Self {
        self.operator = Some(operator);
        self
    }
}
