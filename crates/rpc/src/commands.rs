//! CLI commands

use async_trait::async_trait;
use custody_bus::{BusError, EventSubscriber};
use custody_core::{Amount, CommitteeKey, InstanceId, Principal, TxId};
use custody_events::JournalRecord;
use serde_json::json;

use crate::context::AppContext;

/// Deploy a wallet for an ordered owner list
pub fn deploy(
    ctx: &mut AppContext,
    owners: Vec<Principal>,
    threshold: usize,
    deployer: Principal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let (key, instance) = ctx.deploy(owners, threshold, deployer, correlation_id)?;

    println!("✅ Deployed {} (seq: {})", instance, ctx.last_sequence());
    println!("   Committee key: {}", key);
    Ok(())
}

/// Pay value into a wallet
pub fn deposit(
    ctx: &mut AppContext,
    instance: InstanceId,
    sender: Principal,
    amount: Amount,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let balance = ctx.deposit(instance, sender, amount, correlation_id)?;

    println!(
        "✅ Deposited {} into {} from {} (balance: {})",
        amount, instance, sender, balance
    );
    Ok(())
}

/// Propose an outbound transfer
pub fn submit(
    ctx: &mut AppContext,
    instance: InstanceId,
    caller: Principal,
    recipient: Principal,
    amount: Amount,
    payload: Vec<u8>,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let tx_id = ctx.submit(instance, caller, recipient, amount, payload, correlation_id)?;

    println!(
        "✅ Submitted tx {} on {}: {} to {}",
        tx_id, instance, amount, recipient
    );
    Ok(())
}

pub fn approve(
    ctx: &mut AppContext,
    instance: InstanceId,
    tx_id: TxId,
    caller: Principal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let approvals = ctx.approve(instance, tx_id, caller, correlation_id)?;
    let threshold = ctx.wallet(instance)?.threshold();

    println!(
        "✅ {} approved tx {} ({}/{})",
        caller, tx_id, approvals, threshold
    );
    Ok(())
}

pub fn revoke(
    ctx: &mut AppContext,
    instance: InstanceId,
    tx_id: TxId,
    caller: Principal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    let approvals = ctx.revoke(instance, tx_id, caller, correlation_id)?;
    let threshold = ctx.wallet(instance)?.threshold();

    println!(
        "✅ {} revoked approval of tx {} ({}/{})",
        caller, tx_id, approvals, threshold
    );
    Ok(())
}

pub fn execute(
    ctx: &mut AppContext,
    instance: InstanceId,
    tx_id: TxId,
    caller: Principal,
    correlation_id: &str,
) -> Result<(), anyhow::Error> {
    ctx.execute(instance, tx_id, caller, correlation_id)?;
    let tx = ctx.wallet(instance)?.transaction(tx_id)?;

    println!(
        "✅ Executed tx {}: {} sent to {} (balance: {})",
        tx_id,
        tx.amount,
        tx.recipient,
        ctx.balance(instance)
    );
    Ok(())
}

/// Print a wallet and its transactions as JSON
pub fn show(ctx: &AppContext, instance: InstanceId) -> Result<(), anyhow::Error> {
    let wallet = ctx.wallet(instance)?;
    let threshold = wallet.threshold();

    let transactions: Vec<_> = wallet
        .transactions()
        .iter()
        .map(|tx| {
            json!({
                "id": tx.id,
                "recipient": tx.recipient,
                "amount": tx.amount,
                "payload": hex::encode(&tx.payload),
                "status": tx.status(threshold).to_string(),
                "approvals": tx.approval_count(),
                "approvers": tx.approvers(),
            })
        })
        .collect();

    let output = json!({
        "instance": instance,
        "owners": wallet.owners(),
        "threshold": threshold,
        "balance": ctx.balance(instance),
        "transactions": transactions,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Resolve a committee key, or an ordered owner list, to its wallet
pub fn lookup(
    ctx: &AppContext,
    key: Option<CommitteeKey>,
    owners: &[Principal],
) -> Result<(), anyhow::Error> {
    let instance = match key {
        Some(key) => ctx.registry.lookup(&key)?,
        None if !owners.is_empty() => ctx.registry.lookup_owners(owners)?,
        None => anyhow::bail!("Provide a committee key or at least one --owner"),
    };

    println!("{}", instance);
    Ok(())
}

/// List the wallets a principal sits on
pub fn instances(ctx: &AppContext, principal: Principal) -> Result<(), anyhow::Error> {
    let instances = ctx.registry.instances_for(&principal);

    if instances.is_empty() {
        println!("{} is not an owner of any wallet", principal);
        return Ok(());
    }

    println!("{} owns {} wallet(s):", principal, instances.len());
    for instance in instances {
        let wallet = ctx.wallet(*instance)?;
        println!(
            "   {} - {} of {} (balance: {})",
            instance,
            wallet.threshold(),
            wallet.owners().len(),
            ctx.balance(*instance)
        );
    }
    Ok(())
}

pub fn count(ctx: &AppContext) -> Result<(), anyhow::Error> {
    println!("{}", ctx.registry.count());
    Ok(())
}

/// Stream the journal through a subscriber that prints each record
pub async fn replay(ctx: &AppContext, instance: Option<InstanceId>) -> Result<(), anyhow::Error> {
    let printer = PrintSubscriber { instance };
    let records = ctx.bus.replay(&printer).await?;

    println!(
        "✅ Replayed {} records ({} wallets)",
        records,
        ctx.registry.count()
    );
    Ok(())
}

/// Prints journal records as single-line JSON
struct PrintSubscriber {
    instance: Option<InstanceId>,
}

#[async_trait]
impl EventSubscriber for PrintSubscriber {
    fn name(&self) -> &str {
        "print"
    }

    async fn handle(&self, record: &JournalRecord) -> Result<(), BusError> {
        if self.instance.is_some() && record.instance_id() != self.instance {
            return Ok(());
        }

        let line = serde_json::to_string(record).map_err(|e| BusError::SubscriberFailed {
            name: self.name().to_string(),
            reason: e.to_string(),
        })?;
        println!("{}", line);
        Ok(())
    }
}
