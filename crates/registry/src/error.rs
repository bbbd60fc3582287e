//! Registry errors

use custody_core::{CommitteeKey, InstanceId, Principal};
use custody_ledger::CommitteeError;
use thiserror::Error;

/// Errors from registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid committee: {0}")]
    InvalidCommittee(#[from] CommitteeError),

    #[error("Instance already exists for committee {0}")]
    InstanceExists(CommitteeKey),

    #[error("Unknown committee: {0}")]
    UnknownCommittee(CommitteeKey),

    #[error("Unknown instance: {0}")]
    UnknownInstance(InstanceId),

    #[error("Deployer {0} is not the registry operator")]
    Unauthorized(Principal),

    #[error("Deployment of {0} was prepared against an older registry state")]
    StaleDeployment(InstanceId),
}
