//! Error taxonomy for the vault state machine.
//!
//! Every error is terminal for the call that raised it — no partial state
//! is ever committed, and nothing is retried by the core. Callers get the
//! specific kind so client software can explain the failure ("owner proved
//! activity, inheritance aborted") instead of a generic one.

use crate::account::AccountId;
use crate::multisig::{ActionId, ActionKind};
use crate::will::{WillId, WillStatus};
use thiserror::Error;

/// Errors raised by vault operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("caller {caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("operation not valid while will is {status}")]
    InvalidState { status: WillStatus },

    #[error("clock regression: now {now} is before last activity {last_activity}")]
    InvalidTimestamp { now: u64, last_activity: u64 },

    #[error("active beneficiary percentages sum to {sum}, expected exactly 100")]
    AllocationIncomplete { sum: u32 },

    #[error("an open {kind} proposal already exists for this will")]
    DuplicateProposal { kind: ActionKind },

    #[error("quorum not met: {approvals} of {required} approvals")]
    QuorumNotMet { approvals: usize, required: usize },

    #[error("action has already executed")]
    AlreadyExecuted,

    #[error("precondition failed at execution time: {reason}")]
    PreconditionFailed { reason: String },

    #[error("inactivity threshold must be positive")]
    InvalidThreshold,

    #[error("proposal expired at {expires_at}")]
    ProposalExpired { expires_at: u64 },

    #[error("no will with id {0}")]
    WillNotFound(WillId),

    #[error("no pending action with id {0}")]
    ActionNotFound(ActionId),

    #[error("no beneficiary with address {0}")]
    BeneficiaryNotFound(AccountId),

    #[error("invalid percentage {0}: must be at most 100")]
    InvalidPercentage(u8),

    #[error("duplicate beneficiary address {0}")]
    DuplicateBeneficiary(AccountId),

    #[error("signer set must contain three distinct accounts ({0} repeated)")]
    DuplicateSigner(AccountId),

    #[error("account identifier must not be empty")]
    InvalidAccount,
}
