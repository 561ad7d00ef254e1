//! Heirloom Vault — deadman-switch inheritance state machine.
//!
//! The core protocol behind asset inheritance: an owner configures a will
//! with an inactivity threshold and a beneficiary allocation table, then
//! keeps proving liveness. Once the owner goes silent past the threshold,
//! a 2-of-3 multisig quorum may trigger distribution.
//!
//! # Components
//!
//! - [`activity`] — Activity Ledger: liveness signals, audit history
//! - [`beneficiary`] — Beneficiary Registry: allocation table per will
//! - [`trigger`] — Trigger Evaluator: pure, recomputed-on-read eligibility
//! - [`multisig`] — Authorization Gate: propose/approve/execute, 2-of-3
//! - [`vault`] — Inheritance Vault: custody and orchestration
//!
//! # Control flow
//!
//! ```text
//! owner ──record_activity──▶ Activity Ledger   (resets countdown)
//! anyone ──can_trigger────▶ Trigger Evaluator  (advisory, pure)
//! signer ──propose────────▶ ┐
//! signer ──approve────────▶ ├ Authorization Gate (2-of-3)
//! anyone ──execute────────▶ ┘
//!                            └─▶ re-validate, then distribute per the
//!                                Beneficiary Registry, flip to Triggered
//! ```
//!
//! The core is synchronous and clock-free: every entry point takes `now`
//! explicitly, so state is deterministic and replayable.

pub mod account;
pub mod activity;
pub mod beneficiary;
pub mod error;
pub mod events;
pub mod multisig;
pub mod trigger;
pub mod vault;
pub mod will;

pub use account::AccountId;
pub use activity::{time_since_last_activity, ActivityLedger};
pub use beneficiary::{Beneficiary, BeneficiaryTable};
pub use error::VaultError;
pub use events::{Transfer, VaultEvent};
pub use multisig::{ActionId, ActionKind, PendingAction, SignerRole, SignerSet, REQUIRED_QUORUM};
pub use trigger::{evaluate, is_eligible, TriggerStatus};
pub use vault::{InheritanceVault, VaultConfig, WillRecord, DEFAULT_PROPOSAL_TTL_SECS};
pub use will::{Will, WillId, WillStatus};
