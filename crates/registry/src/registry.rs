//! Registry - owned store of deployed wallets

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::key::committee_key;
use custody_core::{CommitteeKey, CustodyEvent, InstanceId, Principal};
use custody_ledger::{Committee, Wallet};
use std::collections::HashMap;
use tracing::{info, warn};

/// Store of every wallet deployed through it.
///
/// There is no global registry; callers own one and pass it by reference.
/// Entries are never removed, so instance ids stay dense.
#[derive(Debug, Default)]
pub struct Registry {
    config: RegistryConfig,
    instances: Vec<Wallet>,
    by_key: HashMap<CommitteeKey, InstanceId>,
    by_owner: HashMap<Principal, Vec<InstanceId>>,
    outbox: Vec<CustodyEvent>,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Swap the deployment policy; existing entries are untouched
    pub fn reconfigure(&mut self, config: RegistryConfig) {
        self.config = config;
    }

    /// Policy that accepts any deployer and committee size, used while
    /// rebuilding state from a journal written under older settings
    pub fn unrestricted() -> Self {
        Self::new(RegistryConfig {
            operator: None,
            max_committee_size: usize::MAX,
        })
    }

    /// Deploy a wallet for an ordered committee.
    ///
    /// Fails with `InstanceExists` when the same ordered owner list was
    /// deployed before; nothing is created and nothing is emitted.
    pub fn deploy(
        &mut self,
        owners: Vec<Principal>,
        threshold: usize,
        deployer: Principal,
    ) -> Result<(CommitteeKey, InstanceId), RegistryError> {
        let deployment = self.prepare(owners, threshold, deployer)?;
        let event = deployment.event();
        let deployed = self.install(deployment)?;
        self.outbox.push(event);
        Ok(deployed)
    }

    /// Run every deployment check without changing the registry.
    ///
    /// The result must be passed to [`Registry::install`] before any other
    /// deployment is installed.
    pub fn prepare(
        &self,
        owners: Vec<Principal>,
        threshold: usize,
        deployer: Principal,
    ) -> Result<Deployment, RegistryError> {
        let (committee, key) = self
            .validate(owners, threshold, &deployer)
            .inspect_err(|e| warn!(deployer = %deployer, error = %e, "deploy rejected"))?;

        Ok(Deployment {
            committee,
            key,
            instance: InstanceId::new(self.instances.len() as u64),
            deployer,
        })
    }

    /// Apply a prepared deployment. Emits nothing.
    pub fn install(
        &mut self,
        deployment: Deployment,
    ) -> Result<(CommitteeKey, InstanceId), RegistryError> {
        let Deployment {
            committee,
            key,
            instance,
            deployer,
        } = deployment;

        if instance.ordinal() != self.instances.len() as u64 {
            return Err(RegistryError::StaleDeployment(instance));
        }
        if self.by_key.contains_key(&key) {
            return Err(RegistryError::InstanceExists(key));
        }

        for owner in committee.owners() {
            self.by_owner.entry(*owner).or_default().push(instance);
        }
        self.by_key.insert(key, instance);
        let threshold = committee.threshold();
        self.instances.push(Wallet::new(committee));

        info!(committee_key = %key, instance = %instance, deployer = %deployer, threshold, "wallet deployed");
        Ok((key, instance))
    }

    /// Wallet registered under a committee key
    pub fn lookup(&self, key: &CommitteeKey) -> Result<InstanceId, RegistryError> {
        self.by_key
            .get(key)
            .copied()
            .ok_or(RegistryError::UnknownCommittee(*key))
    }

    /// Convenience: derive the key from an ordered owner list, then look it up
    pub fn lookup_owners(&self, owners: &[Principal]) -> Result<InstanceId, RegistryError> {
        self.lookup(&committee_key(owners))
    }

    /// Wallets a principal is an owner of, in deployment order
    pub fn instances_for(&self, principal: &Principal) -> &[InstanceId] {
        self.by_owner
            .get(principal)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of successful deployments
    pub fn count(&self) -> usize {
        self.instances.len()
    }

    pub fn instance(&self, id: InstanceId) -> Result<&Wallet, RegistryError> {
        usize::try_from(id.ordinal())
            .ok()
            .and_then(|index| self.instances.get(index))
            .ok_or(RegistryError::UnknownInstance(id))
    }

    pub fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Wallet, RegistryError> {
        usize::try_from(id.ordinal())
            .ok()
            .and_then(|index| self.instances.get_mut(index))
            .ok_or(RegistryError::UnknownInstance(id))
    }

    /// All wallets with their ids, in deployment order
    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &Wallet)> {
        self.instances
            .iter()
            .enumerate()
            .map(|(index, wallet)| (InstanceId::new(index as u64), wallet))
    }

    /// Drain registry events in emission order
    pub fn take_events(&mut self) -> Vec<CustodyEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Operator gate, committee shape and uniqueness, checked before any write
    fn validate(
        &self,
        owners: Vec<Principal>,
        threshold: usize,
        deployer: &Principal,
    ) -> Result<(Committee, CommitteeKey), RegistryError> {
        if let Some(operator) = self.config.operator {
            if operator != *deployer {
                return Err(RegistryError::Unauthorized(*deployer));
            }
        }

        let committee = Committee::with_limit(owners, threshold, self.config.max_committee_size)?;
        let key = committee_key(committee.owners());
        if self.by_key.contains_key(&key) {
            return Err(RegistryError::InstanceExists(key));
        }
        Ok((committee, key))
    }
}

/// A deployment that passed every check but is not yet in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    committee: Committee,
    key: CommitteeKey,
    instance: InstanceId,
    deployer: Principal,
}

impl Deployment {
    pub fn key(&self) -> CommitteeKey {
        self.key
    }

    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// The `Deployed` event installing this deployment produces
    pub fn event(&self) -> CustodyEvent {
        CustodyEvent::Deployed {
            committee_key: self.key,
            instance: self.instance,
            deployer: self.deployer,
            owners: self.committee.owners().to_vec(),
            threshold: self.committee.threshold(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use custody_ledger::CommitteeError;

    const A: Principal = Principal::repeat(0xa1);
    const B: Principal = Principal::repeat(0xb0);
    const C: Principal = Principal::repeat(0xc3);
    const D: Principal = Principal::repeat(0xd4);
    const DEV: Principal = Principal::repeat(0xde);

    #[test]
    fn test_deploy_registers_instance() {
        let mut registry = Registry::default();

        let (key, instance) = registry.deploy(vec![A, B, C], 2, DEV).unwrap();

        assert_eq!(key, committee_key(&[A, B, C]));
        assert_eq!(instance, InstanceId::new(0));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.lookup(&key).unwrap(), instance);
        assert_eq!(registry.lookup_owners(&[A, B, C]).unwrap(), instance);

        let wallet = registry.instance(instance).unwrap();
        assert_eq!(wallet.owners(), &[A, B, C]);
        assert_eq!(wallet.threshold(), 2);

        assert_eq!(
            registry.take_events(),
            vec![CustodyEvent::Deployed {
                committee_key: key,
                instance,
                deployer: DEV,
                owners: vec![A, B, C],
                threshold: 2,
            }]
        );
    }

    #[test]
    fn test_duplicate_committee_rejected() {
        let mut registry = Registry::default();
        let (key, first) = registry.deploy(vec![A, B, C], 2, DEV).unwrap();
        registry.take_events();

        let result = registry.deploy(vec![A, B, C], 3, DEV);

        assert_eq!(result, Err(RegistryError::InstanceExists(key)));
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.lookup(&key).unwrap(), first);
        assert_eq!(registry.instance(first).unwrap().threshold(), 2);
        assert_eq!(registry.instances_for(&A), &[first]);
        assert!(registry.take_events().is_empty());
    }

    /// Order-sensitive keys: the same members in another order are a new
    /// committee. Kept deliberately; whether membership alone should dedupe
    /// is undecided.
    #[test]
    fn order_sensitive_committee_key_is_a_distinct_entry() {
        let mut registry = Registry::default();
        let (abc_key, abc) = registry.deploy(vec![A, B, C], 2, DEV).unwrap();
        let (bac_key, bac) = registry.deploy(vec![B, A, C], 2, DEV).unwrap();

        assert_ne!(abc_key, bac_key);
        assert_ne!(abc, bac);
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.instances_for(&A), &[abc, bac]);
    }

    #[test]
    fn test_invalid_committee_rejected() {
        let mut registry = Registry::default();

        assert_eq!(
            registry.deploy(vec![A, B], 3, DEV),
            Err(RegistryError::InvalidCommittee(CommitteeError::InvalidThreshold {
                threshold: 3,
                owners: 2
            }))
        );
        assert_eq!(
            registry.deploy(vec![A, B, A], 2, DEV),
            Err(RegistryError::InvalidCommittee(CommitteeError::DuplicateOwner(A)))
        );
        assert_eq!(
            registry.deploy(Vec::new(), 1, DEV),
            Err(RegistryError::InvalidCommittee(CommitteeError::Empty))
        );
        assert_eq!(registry.count(), 0);
        assert!(registry.take_events().is_empty());
    }

    #[test]
    fn test_committee_size_limit() {
        let config = RegistryConfig {
            max_committee_size: 2,
            ..RegistryConfig::default()
        };
        let mut registry = Registry::new(config);
        assert_eq!(
            registry.deploy(vec![A, B, C], 2, DEV),
            Err(RegistryError::InvalidCommittee(CommitteeError::TooLarge { owners: 3, max: 2 }))
        );
    }

    #[test]
    fn test_operator_gate() {
        let mut registry = Registry::new(RegistryConfig::default().with_operator(DEV));

        assert_eq!(
            registry.deploy(vec![A, B], 1, D),
            Err(RegistryError::Unauthorized(D))
        );
        assert!(registry.deploy(vec![A, B], 1, DEV).is_ok());
    }

    #[test]
    fn test_reverse_index() {
        let mut registry = Registry::default();
        let (_, first) = registry.deploy(vec![A, B], 1, DEV).unwrap();
        let (_, second) = registry.deploy(vec![B, C], 1, DEV).unwrap();

        assert_eq!(registry.instances_for(&A), &[first]);
        assert_eq!(registry.instances_for(&B), &[first, second]);
        assert_eq!(registry.instances_for(&C), &[second]);
        assert!(registry.instances_for(&D).is_empty());
    }

    #[test]
    fn test_unknown_lookups() {
        let mut registry = Registry::default();
        let key = committee_key(&[A]);

        assert_eq!(registry.lookup(&key), Err(RegistryError::UnknownCommittee(key)));
        assert!(matches!(
            registry.instance_mut(InstanceId::new(4)),
            Err(RegistryError::UnknownInstance(_))
        ));
    }

    #[test]
    fn test_prepare_leaves_registry_untouched() {
        let mut registry = Registry::default();
        let deployment = registry.prepare(vec![A, B], 2, DEV).unwrap();

        assert_eq!(deployment.instance(), InstanceId::new(0));
        assert_eq!(deployment.key(), committee_key(&[A, B]));
        assert_eq!(registry.count(), 0);
        assert!(registry.instances_for(&A).is_empty());
        assert_eq!(
            registry.lookup(&deployment.key()),
            Err(RegistryError::UnknownCommittee(deployment.key()))
        );

        let event = deployment.event();
        assert_eq!(registry.install(deployment).unwrap(), (committee_key(&[A, B]), InstanceId::new(0)));
        assert_eq!(registry.count(), 1);
        assert!(registry.take_events().is_empty());
        assert!(matches!(event, CustodyEvent::Deployed { threshold: 2, .. }));
    }

    #[test]
    fn test_stale_deployment_rejected() {
        let mut registry = Registry::default();
        let first = registry.prepare(vec![A, B], 1, DEV).unwrap();
        let second = registry.prepare(vec![C, D], 1, DEV).unwrap();
        let same_key = registry.prepare(vec![A, B], 2, DEV).unwrap();

        registry.install(first).unwrap();
        assert_eq!(
            registry.install(second),
            Err(RegistryError::StaleDeployment(InstanceId::new(0)))
        );
        assert_eq!(
            registry.install(same_key),
            Err(RegistryError::StaleDeployment(InstanceId::new(0)))
        );
        assert_eq!(registry.count(), 1);
        assert!(registry.instances_for(&C).is_empty());
    }

    #[test]
    fn test_instance_driven_directly() {
        let mut registry = Registry::default();
        let (_, id) = registry.deploy(vec![A, B], 2, DEV).unwrap();

        let wallet = registry.instance_mut(id).unwrap();
        let tx_id = wallet.submit(D, custody_core::Amount::from_units(1), vec![], A).unwrap();
        wallet.approve(tx_id, B).unwrap();

        assert_eq!(registry.instance(id).unwrap().approval_count(tx_id).unwrap(), 1);
    }
}
