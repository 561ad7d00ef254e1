//! The inheritance vault — custody plus orchestration.
//!
//! Owns the will table, the custodial balances, and the pending-action
//! table, and exposes the only externally callable entry points. All
//! decisions are delegated: liveness to the activity ledger, allocation
//! rules to the beneficiary registry, eligibility to the trigger
//! evaluator, and authorization to the multisig gate.
//!
//! Every state-changing method takes `now` explicitly. The vault never
//! reads a clock itself — eligibility and expiry are recomputed from the
//! caller-supplied instant, so behavior is deterministic and replayable.
//!
//! Atomicity: each method performs all of its checks before its first
//! mutation. A returned error always means nothing changed.

use crate::account::AccountId;
use crate::activity::{self, ActivityLedger};
use crate::beneficiary::{Beneficiary, BeneficiaryTable};
use crate::error::VaultError;
use crate::events::{Transfer, VaultEvent};
use crate::multisig::{ActionId, ActionKind, PendingAction, SignerSet};
use crate::trigger;
use crate::will::{Will, WillId, WillStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default proposal time-box: 30 days.
pub const DEFAULT_PROPOSAL_TTL_SECS: u64 = 30 * 86_400;

/// Vault-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// The platform's signer account, the third key in every will's
    /// 2-of-3 set.
    pub platform: AccountId,
    /// Time-box applied to new proposals. `None` disables expiry.
    pub proposal_ttl_secs: Option<u64>,
}

impl VaultConfig {
    pub fn new(platform: AccountId) -> Self {
        Self {
            platform,
            proposal_ttl_secs: Some(DEFAULT_PROPOSAL_TTL_SECS),
        }
    }
}

/// Everything the vault holds for one will.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WillRecord {
    pub will: Will,
    pub signers: SignerSet,
    pub beneficiaries: BeneficiaryTable,
    /// Custodial balance in base units.
    pub balance: u64,
}

/// The top-level state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceVault {
    config: VaultConfig,
    wills: BTreeMap<WillId, WillRecord>,
    actions: BTreeMap<ActionId, PendingAction>,
    activity: ActivityLedger,
    next_will_id: u64,
    next_action_id: u64,
    #[serde(default)]
    events: Vec<VaultEvent>,
}

impl InheritanceVault {
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            wills: BTreeMap::new(),
            actions: BTreeMap::new(),
            activity: ActivityLedger::new(),
            next_will_id: 1,
            next_action_id: 1,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Will lifecycle
    // ------------------------------------------------------------------

    /// Create a will owned by `owner`, with `executor` as the second
    /// signer key and the platform account as the third. Creation counts
    /// as the first liveness signal.
    pub fn create_will(
        &mut self,
        owner: AccountId,
        executor: AccountId,
        inactivity_threshold_secs: u64,
        encrypted_payload: impl Into<String>,
        now: u64,
    ) -> Result<WillId, VaultError> {
        let signers = SignerSet::new(
            owner.clone(),
            executor,
            self.config.platform.clone(),
        )?;
        let id = WillId(self.next_will_id);
        let will = Will::new(
            id,
            owner.clone(),
            inactivity_threshold_secs,
            encrypted_payload,
            now,
        )?;

        self.next_will_id += 1;
        self.wills.insert(
            id,
            WillRecord {
                will,
                signers,
                beneficiaries: BeneficiaryTable::new(),
                balance: 0,
            },
        );
        log::info!("{} created for owner {}", id, owner);
        self.events.push(VaultEvent::WillCreated { will_id: id, owner });
        Ok(id)
    }

    /// Add custodial funds. Anyone may fund a will; rejected once the
    /// will is Triggered (post-distribution deposits would be stranded).
    pub fn deposit(&mut self, will_id: WillId, amount: u64) -> Result<u64, VaultError> {
        let record = self.record_mut(will_id)?;
        if record.will.status == WillStatus::Triggered {
            return Err(VaultError::InvalidState {
                status: record.will.status,
            });
        }
        record.balance = record.balance.saturating_add(amount);
        let balance = record.balance;
        self.events.push(VaultEvent::Deposited {
            will_id,
            amount,
            balance,
        });
        Ok(balance)
    }

    /// Owner liveness signal. Resets the deadman countdown.
    pub fn record_activity(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        now: u64,
    ) -> Result<(), VaultError> {
        let record = self
            .wills
            .get_mut(&will_id)
            .ok_or(VaultError::WillNotFound(will_id))?;
        self.activity.record(&mut record.will, caller, now)?;
        log::debug!("{}: activity recorded at {}", will_id, now);
        self.events
            .push(VaultEvent::ActivityRecorded { will_id, at: now });
        Ok(())
    }

    /// Change the inactivity threshold. Owner-only, Active-only.
    pub fn set_inactivity_threshold(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        secs: u64,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record.will.set_inactivity_threshold(caller, secs)
    }

    /// Revoke a will at the owner's discretion. Irreversible. Custody is
    /// untouched — the balance stays reclaimable via emergency withdraw,
    /// but inheritance is off the table forever.
    pub fn revoke_will(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record.will.revoke(caller)?;
        log::info!("{} revoked by owner", will_id);
        self.events.push(VaultEvent::WillRevoked { will_id });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Beneficiary registry
    // ------------------------------------------------------------------

    /// Replace the beneficiary table. Sum-to-100 is not required here;
    /// completeness is checked at trigger time.
    pub fn set_beneficiaries(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        entries: Vec<Beneficiary>,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record.beneficiaries.set(&record.will, caller, entries)?;
        self.push_beneficiaries_updated(will_id);
        Ok(())
    }

    pub fn add_beneficiary(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        beneficiary: Beneficiary,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record.beneficiaries.add(&record.will, caller, beneficiary)?;
        self.push_beneficiaries_updated(will_id);
        Ok(())
    }

    pub fn remove_beneficiary(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        address: &AccountId,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record.beneficiaries.remove(&record.will, caller, address)?;
        self.push_beneficiaries_updated(will_id);
        Ok(())
    }

    pub fn update_allocation(
        &mut self,
        will_id: WillId,
        caller: &AccountId,
        address: &AccountId,
        percentage: u8,
    ) -> Result<(), VaultError> {
        let record = self.record_mut(will_id)?;
        record
            .beneficiaries
            .update_allocation(&record.will, caller, address, percentage)?;
        self.push_beneficiaries_updated(will_id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Multisig gate
    // ------------------------------------------------------------------

    /// Propose a privileged action. The proposer must hold one of the
    /// will's three signer keys and is counted as the first approval.
    /// At most one open proposal per (will, kind) at a time.
    pub fn propose_action(
        &mut self,
        will_id: WillId,
        kind: ActionKind,
        proposer: AccountId,
        now: u64,
    ) -> Result<ActionId, VaultError> {
        let record = self.record(will_id)?;

        // A proposal against a terminal will can never execute; reject it
        // up front. Emergency withdraw stays available after revocation.
        match kind {
            ActionKind::TriggerInheritance => record.will.ensure_active()?,
            ActionKind::EmergencyWithdraw => {
                if record.will.status == WillStatus::Triggered {
                    return Err(VaultError::InvalidState {
                        status: record.will.status,
                    });
                }
            }
        }

        if self
            .actions
            .values()
            .any(|a| a.will_id == will_id && a.kind == kind && a.is_open(now))
        {
            return Err(VaultError::DuplicateProposal { kind });
        }

        let id = ActionId(self.next_action_id);
        let action = PendingAction::propose(
            id,
            will_id,
            kind,
            &record.signers,
            proposer.clone(),
            now,
            self.config.proposal_ttl_secs,
        )?;

        self.next_action_id += 1;
        self.actions.insert(id, action);
        log::info!("{} proposed for {} by {}", kind, will_id, proposer);
        self.events.push(VaultEvent::ActionProposed {
            action_id: id,
            will_id,
            kind,
            proposer,
        });
        Ok(id)
    }

    /// Approve a pending action. Reaching quorum makes the action
    /// executable but never executes it — `execute_action` is a separate
    /// explicit step with its own re-validation.
    pub fn approve_action(
        &mut self,
        action_id: ActionId,
        approver: AccountId,
        now: u64,
    ) -> Result<usize, VaultError> {
        let action = self
            .actions
            .get(&action_id)
            .ok_or(VaultError::ActionNotFound(action_id))?;
        let signers = self.record(action.will_id)?.signers.clone();

        let action = self
            .actions
            .get_mut(&action_id)
            .expect("action existence checked above");
        let approvals = action.approve(&signers, approver, now)?;
        let quorum_reached = action.has_quorum();

        log::info!(
            "{}: {} of {} approvals",
            action_id,
            approvals,
            crate::multisig::REQUIRED_QUORUM
        );
        self.events.push(VaultEvent::ActionApproved {
            action_id,
            approvals,
            quorum_reached,
        });
        Ok(approvals)
    }

    /// Execute a quorum-approved action.
    ///
    /// Preconditions are re-validated here, at the last possible moment:
    /// a trigger whose will saw owner activity after quorum formed fails
    /// with `PreconditionFailed` and moves no funds. Returns the
    /// transfers performed.
    pub fn execute_action(
        &mut self,
        action_id: ActionId,
        now: u64,
    ) -> Result<Vec<Transfer>, VaultError> {
        let (will_id, kind) = {
            let action = self
                .actions
                .get(&action_id)
                .ok_or(VaultError::ActionNotFound(action_id))?;
            action.ensure_executable(now)?;
            (action.will_id, action.kind)
        };

        let transfers = match kind {
            ActionKind::TriggerInheritance => self.execute_trigger(will_id, now)?,
            ActionKind::EmergencyWithdraw => self.execute_emergency_withdraw(will_id)?,
        };

        self.actions
            .get_mut(&action_id)
            .expect("action existence checked above")
            .mark_executed();
        Ok(transfers)
    }

    /// Trigger path: re-check eligibility and allocation completeness,
    /// then distribute the whole balance and flip the status. All checks
    /// precede the first mutation.
    fn execute_trigger(
        &mut self,
        will_id: WillId,
        now: u64,
    ) -> Result<Vec<Transfer>, VaultError> {
        let record = self.record(will_id)?;

        if record.will.status != WillStatus::Active {
            return Err(VaultError::PreconditionFailed {
                reason: format!("will is {}", record.will.status),
            });
        }
        if !trigger::is_eligible(&record.will, now)? {
            let elapsed = activity::time_since_last_activity(&record.will, now)?;
            return Err(VaultError::PreconditionFailed {
                reason: format!(
                    "owner proved activity: {}s elapsed of {}s required",
                    elapsed, record.will.inactivity_threshold_secs
                ),
            });
        }
        record.beneficiaries.validate_complete()?;

        let transfers = distribution_plan(record.balance, &record.beneficiaries);

        // Point of no return — infallible from here on.
        let record = self
            .wills
            .get_mut(&will_id)
            .expect("record existence checked above");
        record.balance = 0;
        record
            .will
            .mark_triggered()
            .expect("active status checked above");

        log::info!(
            "{} triggered: {} transfers distributed",
            will_id,
            transfers.len()
        );
        self.events.push(VaultEvent::InheritanceTriggered {
            will_id,
            transfers: transfers.clone(),
        });
        Ok(transfers)
    }

    /// Emergency path: return the whole balance to the owner. Allowed
    /// while Active or Revoked; impossible once Triggered.
    fn execute_emergency_withdraw(
        &mut self,
        will_id: WillId,
    ) -> Result<Vec<Transfer>, VaultError> {
        let record = self.record(will_id)?;
        if record.will.status == WillStatus::Triggered {
            return Err(VaultError::PreconditionFailed {
                reason: "will has already triggered".into(),
            });
        }
        let to = record.will.owner.clone();
        let amount = record.balance;

        let record = self
            .wills
            .get_mut(&will_id)
            .expect("record existence checked above");
        record.balance = 0;

        log::info!("{}: emergency withdraw of {} to owner", will_id, amount);
        self.events.push(VaultEvent::EmergencyWithdrawn {
            will_id,
            to: to.clone(),
            amount,
        });
        Ok(vec![Transfer { to, amount }])
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_will(&self, will_id: WillId) -> Option<&Will> {
        self.wills.get(&will_id).map(|r| &r.will)
    }

    pub fn get_beneficiaries(&self, will_id: WillId) -> Option<&BeneficiaryTable> {
        self.wills.get(&will_id).map(|r| &r.beneficiaries)
    }

    pub fn get_action(&self, action_id: ActionId) -> Option<&PendingAction> {
        self.actions.get(&action_id)
    }

    pub fn balance_of(&self, will_id: WillId) -> Option<u64> {
        self.wills.get(&will_id).map(|r| r.balance)
    }

    /// Advisory eligibility check — the `canTrigger` query.
    pub fn can_trigger(&self, will_id: WillId, now: u64) -> Result<bool, VaultError> {
        trigger::is_eligible(&self.record(will_id)?.will, now)
    }

    /// Open (unexecuted, unexpired) actions for a will.
    pub fn open_actions(&self, will_id: WillId, now: u64) -> Vec<&PendingAction> {
        self.actions
            .values()
            .filter(|a| a.will_id == will_id && a.is_open(now))
            .collect()
    }

    /// All will ids, for sweep-style consumers like the watch service.
    pub fn will_ids(&self) -> Vec<WillId> {
        self.wills.keys().copied().collect()
    }

    /// Liveness signal history for a will, oldest first.
    pub fn activity_history(&self, will_id: WillId) -> &[u64] {
        self.activity.history(will_id)
    }

    /// Take the accumulated audit events, leaving the log empty.
    pub fn drain_events(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn record(&self, will_id: WillId) -> Result<&WillRecord, VaultError> {
        self.wills
            .get(&will_id)
            .ok_or(VaultError::WillNotFound(will_id))
    }

    fn record_mut(&mut self, will_id: WillId) -> Result<&mut WillRecord, VaultError> {
        self.wills
            .get_mut(&will_id)
            .ok_or(VaultError::WillNotFound(will_id))
    }

    fn push_beneficiaries_updated(&mut self, will_id: WillId) {
        if let Some(record) = self.wills.get(&will_id) {
            self.events.push(VaultEvent::BeneficiariesUpdated {
                will_id,
                active_count: record.beneficiaries.active().count(),
                allocation_sum: record.beneficiaries.active_sum(),
                complete: record.beneficiaries.is_complete(),
            });
        }
    }
}

/// Compute the distribution for a complete allocation table.
///
/// Each active beneficiary gets `balance * pct / 100` (integer floor).
/// The rounding remainder — at most `len - 1` base units when the
/// percentages sum to 100 — goes to the last active beneficiary so the
/// vault empties exactly.
fn distribution_plan(balance: u64, table: &BeneficiaryTable) -> Vec<Transfer> {
    let mut transfers: Vec<Transfer> = table
        .active()
        .map(|b| Transfer {
            to: b.address.clone(),
            amount: ((balance as u128 * b.percentage as u128) / 100) as u64,
        })
        .collect();

    let distributed: u64 = transfers.iter().map(|t| t.amount).sum();
    if let Some(last) = transfers.last_mut() {
        last.amount += balance - distributed;
    }
    transfers
}
