//! Multi-signature authorization gate.
//!
//! Every privileged transition (inheritance trigger, emergency withdraw)
//! goes through a propose → approve → execute lifecycle guarded by a
//! fixed 2-of-3 signer set: the owner key, an executor key, and the
//! platform key. Reaching quorum never auto-executes; execution is a
//! separate explicit step so preconditions can be re-validated after the
//! last approval lands. That closes the race where the owner's liveness
//! signal arrives between quorum and the irreversible transfer.
//!
//! Proposals are time-boxed: past `expires_at` they can no longer be
//! approved or executed, and they stop blocking new proposals.

use crate::account::AccountId;
use crate::error::VaultError;
use crate::will::WillId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Approvals required before an action may execute (2-of-3).
pub const REQUIRED_QUORUM: usize = 2;

/// Identifier for a pending action, assigned monotonically by the vault.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "action-{}", self.0)
    }
}

/// The privileged operations the gate protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Distribute the vault balance to beneficiaries and mark the will
    /// Triggered.
    TriggerInheritance,
    /// Return the full balance to the owner (abnormal conditions, e.g.
    /// migration).
    EmergencyWithdraw,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::TriggerInheritance => f.write_str("trigger-inheritance"),
            ActionKind::EmergencyWithdraw => f.write_str("emergency-withdraw"),
        }
    }
}

/// Which of the three designated keys an account holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerRole {
    Owner,
    Executor,
    Platform,
}

/// The fixed 2-of-3 signer set bound to a will at creation.
///
/// No rotation: the set is immutable for the will's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSet {
    pub owner: AccountId,
    pub executor: AccountId,
    pub platform: AccountId,
}

impl SignerSet {
    /// Build a signer set; the three accounts must be distinct, otherwise
    /// two "independent" approvals could come from one keyholder.
    pub fn new(
        owner: AccountId,
        executor: AccountId,
        platform: AccountId,
    ) -> Result<Self, VaultError> {
        if owner == executor || owner == platform {
            return Err(VaultError::DuplicateSigner(owner));
        }
        if executor == platform {
            return Err(VaultError::DuplicateSigner(executor));
        }
        Ok(Self {
            owner,
            executor,
            platform,
        })
    }

    /// The role an account holds, if any.
    pub fn role_of(&self, account: &AccountId) -> Option<SignerRole> {
        if account == &self.owner {
            Some(SignerRole::Owner)
        } else if account == &self.executor {
            Some(SignerRole::Executor)
        } else if account == &self.platform {
            Some(SignerRole::Platform)
        } else {
            None
        }
    }

    pub fn contains(&self, account: &AccountId) -> bool {
        self.role_of(account).is_some()
    }
}

/// A proposed privileged operation collecting approvals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: ActionId,
    pub will_id: WillId,
    pub kind: ActionKind,
    pub proposer: AccountId,
    /// Distinct signers who confirmed. The proposer counts as the first.
    pub approvals: BTreeSet<AccountId>,
    pub created_at: u64,
    /// Past this instant the proposal is dead: no approvals, no
    /// execution, no longer blocks new proposals. `None` means no expiry.
    pub expires_at: Option<u64>,
    /// Set exactly once, by `execute`. Terminal.
    pub executed: bool,
}

impl PendingAction {
    /// Create a proposal. `proposer` must be one of the designated
    /// signers; their approval is counted immediately.
    pub fn propose(
        id: ActionId,
        will_id: WillId,
        kind: ActionKind,
        signers: &SignerSet,
        proposer: AccountId,
        now: u64,
        ttl_secs: Option<u64>,
    ) -> Result<Self, VaultError> {
        if !signers.contains(&proposer) {
            return Err(VaultError::Unauthorized { caller: proposer });
        }
        let mut approvals = BTreeSet::new();
        approvals.insert(proposer.clone());
        Ok(Self {
            id,
            will_id,
            kind,
            proposer,
            approvals,
            created_at: now,
            expires_at: ttl_secs.map(|ttl| now.saturating_add(ttl)),
            executed: false,
        })
    }

    /// Add one signer's approval. Fails for non-signers and for signers
    /// already counted (no double-counting one key). Returns the new
    /// approval count. Never executes anything.
    pub fn approve(
        &mut self,
        signers: &SignerSet,
        approver: AccountId,
        now: u64,
    ) -> Result<usize, VaultError> {
        if self.executed {
            return Err(VaultError::AlreadyExecuted);
        }
        self.ensure_not_expired(now)?;
        if !signers.contains(&approver) || self.approvals.contains(&approver) {
            return Err(VaultError::Unauthorized { caller: approver });
        }
        self.approvals.insert(approver);
        Ok(self.approvals.len())
    }

    /// Whether quorum has been reached (necessary but not sufficient for
    /// execution — preconditions are re-checked at execute time).
    pub fn has_quorum(&self) -> bool {
        self.approvals.len() >= REQUIRED_QUORUM
    }

    /// Open proposals block duplicates of the same kind for the same
    /// will. Executed or expired proposals do not.
    pub fn is_open(&self, now: u64) -> bool {
        !self.executed && !self.is_expired(now)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    /// Gate checks that must pass before the vault runs the operation:
    /// not executed, not expired, quorum met.
    pub fn ensure_executable(&self, now: u64) -> Result<(), VaultError> {
        if self.executed {
            return Err(VaultError::AlreadyExecuted);
        }
        self.ensure_not_expired(now)?;
        if !self.has_quorum() {
            return Err(VaultError::QuorumNotMet {
                approvals: self.approvals.len(),
                required: REQUIRED_QUORUM,
            });
        }
        Ok(())
    }

    /// Mark executed. Called by the vault only after the operation's
    /// effects have been applied.
    pub(crate) fn mark_executed(&mut self) {
        debug_assert!(!self.executed);
        self.executed = true;
    }

    fn ensure_not_expired(&self, now: u64) -> Result<(), VaultError> {
        if let Some(deadline) = self.expires_at {
            if now >= deadline {
                return Err(VaultError::ProposalExpired {
                    expires_at: deadline,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acct(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn signers() -> SignerSet {
        SignerSet::new(acct("owner"), acct("executor"), acct("platform")).unwrap()
    }

    fn propose_trigger() -> PendingAction {
        PendingAction::propose(
            ActionId(1),
            WillId(1),
            ActionKind::TriggerInheritance,
            &signers(),
            acct("executor"),
            1_000,
            Some(86_400),
        )
        .unwrap()
    }

    #[test]
    fn test_signer_set_requires_distinct_accounts() {
        assert!(SignerSet::new(acct("a"), acct("a"), acct("c")).is_err());
        assert!(SignerSet::new(acct("a"), acct("b"), acct("a")).is_err());
        assert!(SignerSet::new(acct("a"), acct("b"), acct("b")).is_err());
        assert!(SignerSet::new(acct("a"), acct("b"), acct("c")).is_ok());
    }

    #[test]
    fn test_role_lookup() {
        let set = signers();
        assert_eq!(set.role_of(&acct("owner")), Some(SignerRole::Owner));
        assert_eq!(set.role_of(&acct("executor")), Some(SignerRole::Executor));
        assert_eq!(set.role_of(&acct("platform")), Some(SignerRole::Platform));
        assert_eq!(set.role_of(&acct("stranger")), None);
    }

    #[test]
    fn test_propose_counts_proposer_approval() {
        let action = propose_trigger();
        assert_eq!(action.approvals.len(), 1);
        assert!(!action.has_quorum());
        assert!(action.approvals.contains(&acct("executor")));
    }

    #[test]
    fn test_propose_rejects_non_signer() {
        let err = PendingAction::propose(
            ActionId(1),
            WillId(1),
            ActionKind::TriggerInheritance,
            &signers(),
            acct("rando"),
            1_000,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn test_approve_reaches_quorum_without_executing() {
        let mut action = propose_trigger();
        let count = action.approve(&signers(), acct("platform"), 2_000).unwrap();
        assert_eq!(count, 2);
        assert!(action.has_quorum());
        // approval never auto-executes
        assert!(!action.executed);
    }

    #[test]
    fn test_no_double_counting_one_signer() {
        let mut action = propose_trigger();
        let err = action.approve(&signers(), acct("executor"), 2_000).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
        assert_eq!(action.approvals.len(), 1);
    }

    #[test]
    fn test_approve_rejects_non_signer() {
        let mut action = propose_trigger();
        let err = action.approve(&signers(), acct("rando"), 2_000).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn test_execute_gate_requires_quorum() {
        let action = propose_trigger();
        assert_eq!(
            action.ensure_executable(2_000).unwrap_err(),
            VaultError::QuorumNotMet {
                approvals: 1,
                required: 2
            }
        );
    }

    #[test]
    fn test_executed_action_is_terminal() {
        let mut action = propose_trigger();
        action.approve(&signers(), acct("platform"), 2_000).unwrap();
        action.ensure_executable(3_000).unwrap();
        action.mark_executed();

        assert_eq!(
            action.ensure_executable(3_000).unwrap_err(),
            VaultError::AlreadyExecuted
        );
        assert_eq!(
            action.approve(&signers(), acct("owner"), 3_000).unwrap_err(),
            VaultError::AlreadyExecuted
        );
        assert!(!action.is_open(3_000));
    }

    #[test]
    fn test_expiry_blocks_approval_and_execution() {
        let mut action = propose_trigger(); // expires at 87_400
        action.approve(&signers(), acct("platform"), 2_000).unwrap();

        assert!(action.is_open(87_399));
        assert!(!action.is_open(87_400));

        let err = action.ensure_executable(87_400).unwrap_err();
        assert_eq!(err, VaultError::ProposalExpired { expires_at: 87_400 });

        let err = action.approve(&signers(), acct("owner"), 90_000).unwrap_err();
        assert!(matches!(err, VaultError::ProposalExpired { .. }));
    }

    #[test]
    fn test_no_ttl_means_no_expiry() {
        let action = PendingAction::propose(
            ActionId(2),
            WillId(1),
            ActionKind::EmergencyWithdraw,
            &signers(),
            acct("owner"),
            1_000,
            None,
        )
        .unwrap();
        assert!(!action.is_expired(u64::MAX));
        assert!(action.is_open(u64::MAX));
    }
}
