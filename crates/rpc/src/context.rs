//! Application context - wires everything together

use crate::config::CustodyConfig;
use custody_bus::EventBus;
use custody_core::{Amount, CommitteeKey, CustodyEvent, InstanceId, Principal, TxId};
use custody_events::{EventError, EventReader, EventStore, JournalRecord};
use custody_ledger::{AssetTransfer, LedgerError, NativeVault, Wallet};
use custody_registry::{Registry, RegistryError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application context - registry, per-instance vaults, journal and bus
pub struct AppContext {
    pub registry: Registry,
    pub bus: EventBus,
    vaults: HashMap<InstanceId, NativeVault>,
    event_store: EventStore,
    journal_path: PathBuf,
    config: CustodyConfig,
}

impl AppContext {
    /// Open the data directory, loading `custody.json` and env overrides
    pub fn open(data_path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let config = CustodyConfig::load(data_path.as_ref())?;
        Self::new(data_path, config)
    }

    /// Create a context and rebuild state from the journal
    pub fn new(data_path: impl AsRef<Path>, config: CustodyConfig) -> Result<Self, anyhow::Error> {
        let journal_path = data_path.as_ref().join("journal");
        std::fs::create_dir_all(&journal_path)?;

        let records = EventReader::from_directory(&journal_path)?.read_all()?;
        let event_store = EventStore::new(&journal_path)?;
        let bus = EventBus::with_capacity(&journal_path, config.bus_capacity);

        let mut ctx = Self {
            registry: Registry::unrestricted(),
            bus,
            vaults: HashMap::new(),
            event_store,
            journal_path,
            config,
        };

        // Journal may predate the current operator or size limit
        for record in &records {
            ctx.apply(record)?;
        }
        ctx.registry.reconfigure(ctx.config.registry.clone());

        tracing::info!(
            records = records.len(),
            instances = ctx.registry.count(),
            "State rebuilt from journal"
        );
        Ok(ctx)
    }

    // === Commands ===
    //
    // Each command runs against staged state, appends the resulting events
    // to the journal, and only then installs the staged state. A failed
    // append leaves the context exactly as it was.

    pub fn deploy(
        &mut self,
        owners: Vec<Principal>,
        threshold: usize,
        deployer: Principal,
        correlation_id: &str,
    ) -> Result<(CommitteeKey, InstanceId), CommandError> {
        let deployment = self.registry.prepare(owners, threshold, deployer)?;

        self.commit(None, vec![deployment.event()], correlation_id)?;
        let (key, instance) = self.registry.install(deployment)?;
        self.vaults.insert(instance, NativeVault::new());
        Ok((key, instance))
    }

    pub fn deposit(
        &mut self,
        instance: InstanceId,
        sender: Principal,
        amount: Amount,
        correlation_id: &str,
    ) -> Result<Amount, CommandError> {
        let mut wallet = self.stage(instance)?;
        let mut vault = self.stage_vault(instance);
        let balance = wallet.deposit(sender, amount, &mut vault)?;

        self.install(instance, wallet, Some(vault), correlation_id)?;
        Ok(balance)
    }

    pub fn submit(
        &mut self,
        instance: InstanceId,
        caller: Principal,
        recipient: Principal,
        amount: Amount,
        payload: Vec<u8>,
        correlation_id: &str,
    ) -> Result<TxId, CommandError> {
        let mut wallet = self.stage(instance)?;
        let tx_id = wallet.submit(recipient, amount, payload, caller)?;

        self.install(instance, wallet, None, correlation_id)?;
        Ok(tx_id)
    }

    pub fn approve(
        &mut self,
        instance: InstanceId,
        tx_id: TxId,
        caller: Principal,
        correlation_id: &str,
    ) -> Result<usize, CommandError> {
        let mut wallet = self.stage(instance)?;
        wallet.approve(tx_id, caller)?;
        let approvals = wallet.approval_count(tx_id)?;

        self.install(instance, wallet, None, correlation_id)?;
        Ok(approvals)
    }

    pub fn revoke(
        &mut self,
        instance: InstanceId,
        tx_id: TxId,
        caller: Principal,
        correlation_id: &str,
    ) -> Result<usize, CommandError> {
        let mut wallet = self.stage(instance)?;
        wallet.revoke(tx_id, caller)?;
        let approvals = wallet.approval_count(tx_id)?;

        self.install(instance, wallet, None, correlation_id)?;
        Ok(approvals)
    }

    pub fn execute(
        &mut self,
        instance: InstanceId,
        tx_id: TxId,
        caller: Principal,
        correlation_id: &str,
    ) -> Result<(), CommandError> {
        let mut wallet = self.stage(instance)?;
        let mut vault = self.stage_vault(instance);
        wallet.execute(tx_id, caller, &mut vault)?;

        self.install(instance, wallet, Some(vault), correlation_id)?;
        Ok(())
    }

    // === Queries ===

    pub fn wallet(&self, instance: InstanceId) -> Result<&Wallet, RegistryError> {
        self.registry.instance(instance)
    }

    pub fn vault(&self, instance: InstanceId) -> Option<&NativeVault> {
        self.vaults.get(&instance)
    }

    pub fn balance(&self, instance: InstanceId) -> Amount {
        self.vaults.get(&instance).map_or(Amount::ZERO, |v| v.balance())
    }

    pub fn journal_path(&self) -> &Path {
        &self.journal_path
    }

    pub fn config(&self) -> &CustodyConfig {
        &self.config
    }

    pub fn last_sequence(&self) -> u64 {
        self.event_store.last_sequence()
    }

    // === Internals ===

    /// Append events to the journal, then publish them on the bus
    fn commit(
        &mut self,
        instance: Option<InstanceId>,
        events: Vec<CustodyEvent>,
        correlation_id: &str,
    ) -> Result<Vec<JournalRecord>, EventError> {
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let record = self.event_store.record(correlation_id, instance, event)?;
            let receivers = self.bus.publish(record.clone());
            tracing::debug!(
                sequence = record.sequence,
                kind = record.event.kind(),
                correlation_id,
                receivers,
                "Record committed"
            );
            records.push(record);
        }
        Ok(records)
    }

    /// Working copy of a wallet; the live one is untouched until `install`
    fn stage(&self, instance: InstanceId) -> Result<Wallet, RegistryError> {
        self.registry.instance(instance).cloned()
    }

    fn stage_vault(&self, instance: InstanceId) -> NativeVault {
        self.vaults.get(&instance).cloned().unwrap_or_default()
    }

    /// Journal the staged wallet's events, then swap the staged copies in
    fn install(
        &mut self,
        instance: InstanceId,
        mut wallet: Wallet,
        vault: Option<NativeVault>,
        correlation_id: &str,
    ) -> Result<(), CommandError> {
        let events = wallet.take_events();
        self.commit(Some(instance), events, correlation_id)?;

        *self.registry.instance_mut(instance)? = wallet;
        if let Some(vault) = vault {
            self.vaults.insert(instance, vault);
        }
        Ok(())
    }

    fn instance_parts(
        &mut self,
        instance: InstanceId,
    ) -> Result<(&mut Wallet, &mut NativeVault), RegistryError> {
        let wallet = self.registry.instance_mut(instance)?;
        let vault = self.vaults.entry(instance).or_default();
        Ok((wallet, vault))
    }

    /// Re-run one journaled event through the public operations
    fn apply(&mut self, record: &JournalRecord) -> Result<(), ReplayError> {
        let sequence = record.sequence;
        let diverged = |detail: String| ReplayError::Diverged { sequence, detail };

        if let CustodyEvent::Deployed {
            committee_key,
            instance,
            deployer,
            owners,
            threshold,
        } = &record.event
        {
            let (key, id) = self
                .registry
                .deploy(owners.clone(), *threshold, *deployer)
                .map_err(|e| ReplayError::Registry { sequence, source: e })?;
            if key != *committee_key || id != *instance {
                return Err(diverged(format!("deployed {id} under {key}")));
            }
            self.registry.take_events();
            self.vaults.insert(id, NativeVault::new());
            return Ok(());
        }

        let instance = record
            .instance
            .ok_or(ReplayError::MissingInstance { sequence })?;
        let (wallet, vault) = self
            .instance_parts(instance)
            .map_err(|e| ReplayError::Registry { sequence, source: e })?;
        let ledger = |e: LedgerError| ReplayError::Ledger { sequence, source: e };

        match &record.event {
            CustodyEvent::Deposited {
                sender,
                amount,
                balance,
            } => {
                let rebuilt = wallet.deposit(*sender, *amount, vault).map_err(ledger)?;
                if rebuilt != *balance {
                    return Err(diverged(format!("balance {rebuilt}, journal says {balance}")));
                }
            }
            CustodyEvent::Submitted {
                tx_id,
                submitter,
                recipient,
                amount,
                payload,
            } => {
                let rebuilt = wallet
                    .submit(*recipient, *amount, payload.clone(), *submitter)
                    .map_err(ledger)?;
                if rebuilt != *tx_id {
                    return Err(diverged(format!("tx id {rebuilt}, journal says {tx_id}")));
                }
            }
            CustodyEvent::Approved { tx_id, approver } => {
                wallet.approve(*tx_id, *approver).map_err(ledger)?;
            }
            CustodyEvent::Revoked { tx_id, revoker } => {
                wallet.revoke(*tx_id, *revoker).map_err(ledger)?;
            }
            CustodyEvent::Executed { tx_id, executor } => {
                wallet.execute(*tx_id, *executor, vault).map_err(ledger)?;
            }
            CustodyEvent::Deployed { .. } => {
                return Err(diverged("deployment recorded twice".to_string()));
            }
        }

        wallet.take_events();
        Ok(())
    }
}

/// Errors from context commands
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Event store error: {0}")]
    Event(#[from] EventError),
}

/// Journal could not be replayed onto a fresh state
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Record {sequence}: {source}")]
    Registry {
        sequence: u64,
        source: RegistryError,
    },

    #[error("Record {sequence}: {source}")]
    Ledger { sequence: u64, source: LedgerError },

    #[error("Record {sequence} has no instance")]
    MissingInstance { sequence: u64 },

    #[error("Record {sequence} diverged: {detail}")]
    Diverged { sequence: u64, detail: String },
}
