//! The will record and its status transitions.
//!
//! A will is one owner's inheritance configuration: who owns it, when the
//! owner last proved liveness, how long silence must last before the
//! switch may fire, and an opaque reference to off-chain encrypted
//! metadata the core never interprets.
//!
//! Status transitions are strictly one-way:
//!
//! ```text
//! Active ──▶ Triggered   (quorum-approved inheritance)
//! Active ──▶ Revoked     (owner's discretion)
//! ```
//!
//! Triggered and Revoked are terminal — there is no resurrection.

use crate::account::AccountId;
use crate::error::VaultError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a will, assigned monotonically by the vault.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WillId(pub u64);

impl fmt::Display for WillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "will-{}", self.0)
    }
}

/// Lifecycle status of a will.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WillStatus {
    /// Owner is alive (or at least checking in). All owner mutations allowed.
    Active,
    /// Inheritance executed. Terminal.
    Triggered,
    /// Cancelled by the owner. Terminal; no inheritance ever possible.
    Revoked,
}

impl WillStatus {
    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WillStatus::Triggered | WillStatus::Revoked)
    }
}

impl fmt::Display for WillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WillStatus::Active => f.write_str("active"),
            WillStatus::Triggered => f.write_str("triggered"),
            WillStatus::Revoked => f.write_str("revoked"),
        }
    }
}

/// One owner's inheritance record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Will {
    /// Vault-assigned identifier.
    pub id: WillId,
    /// Owner account. Immutable.
    pub owner: AccountId,
    /// Creation timestamp (unix seconds). Immutable.
    pub created_at: u64,
    /// Most recent liveness signal (unix seconds).
    /// Invariant: `last_activity >= created_at`, non-decreasing while Active.
    pub last_activity: u64,
    /// How long the owner must stay silent before the will is eligible
    /// for triggering. Always positive.
    pub inactivity_threshold_secs: u64,
    /// Current lifecycle status.
    pub status: WillStatus,
    /// Opaque reference to off-chain encrypted metadata (description,
    /// documents). The core stores it, never reads it.
    pub encrypted_payload: String,
}

impl Will {
    /// Create a new Active will. Creation counts as the first liveness
    /// signal, so `last_activity` starts at `now`.
    pub fn new(
        id: WillId,
        owner: AccountId,
        inactivity_threshold_secs: u64,
        encrypted_payload: impl Into<String>,
        now: u64,
    ) -> Result<Self, VaultError> {
        if inactivity_threshold_secs == 0 {
            return Err(VaultError::InvalidThreshold);
        }
        Ok(Self {
            id,
            owner,
            created_at: now,
            last_activity: now,
            inactivity_threshold_secs,
            status: WillStatus::Active,
            encrypted_payload: encrypted_payload.into(),
        })
    }

    /// Check that `caller` is the owner.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<(), VaultError> {
        if caller != &self.owner {
            return Err(VaultError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    /// Check that the will is still Active.
    pub fn ensure_active(&self) -> Result<(), VaultError> {
        if self.status != WillStatus::Active {
            return Err(VaultError::InvalidState {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Change the inactivity threshold. Owner-only, Active-only.
    pub fn set_inactivity_threshold(
        &mut self,
        caller: &AccountId,
        secs: u64,
    ) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        self.ensure_active()?;
        if secs == 0 {
            return Err(VaultError::InvalidThreshold);
        }
        self.inactivity_threshold_secs = secs;
        Ok(())
    }

    /// Transition Active → Triggered. The multisig execute path is the
    /// only caller; direct accounts never reach this.
    pub(crate) fn mark_triggered(&mut self) -> Result<(), VaultError> {
        self.ensure_active()?;
        self.status = WillStatus::Triggered;
        Ok(())
    }

    /// Transition Active → Revoked at the owner's discretion. Custody is
    /// untouched; the assets simply become un-inheritable.
    pub fn revoke(&mut self, caller: &AccountId) -> Result<(), VaultError> {
        self.ensure_owner(caller)?;
        self.ensure_active()?;
        self.status = WillStatus::Revoked;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::new("owner").unwrap()
    }

    fn stranger() -> AccountId {
        AccountId::new("stranger").unwrap()
    }

    fn make_will() -> Will {
        Will::new(WillId(1), owner(), 2_592_000, "ipfs://meta", 1_700_000_000).unwrap()
    }

    #[test]
    fn test_new_will_starts_active() {
        let will = make_will();
        assert_eq!(will.status, WillStatus::Active);
        assert_eq!(will.created_at, will.last_activity);
        assert_eq!(will.inactivity_threshold_secs, 2_592_000);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = Will::new(WillId(1), owner(), 0, "", 1_700_000_000);
        assert_eq!(result.unwrap_err(), VaultError::InvalidThreshold);
    }

    #[test]
    fn test_revoke_is_owner_only() {
        let mut will = make_will();
        let err = will.revoke(&stranger()).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
        assert_eq!(will.status, WillStatus::Active);

        will.revoke(&owner()).unwrap();
        assert_eq!(will.status, WillStatus::Revoked);
    }

    #[test]
    fn test_no_resurrection_from_terminal_states() {
        let mut will = make_will();
        will.mark_triggered().unwrap();
        assert!(will.mark_triggered().is_err());
        assert!(will.revoke(&owner()).is_err());

        let mut will = make_will();
        will.revoke(&owner()).unwrap();
        assert!(will.mark_triggered().is_err());
        assert!(will.revoke(&owner()).is_err());
    }

    #[test]
    fn test_threshold_update_requires_active() {
        let mut will = make_will();
        will.set_inactivity_threshold(&owner(), 86_400).unwrap();
        assert_eq!(will.inactivity_threshold_secs, 86_400);

        assert!(will.set_inactivity_threshold(&owner(), 0).is_err());

        will.revoke(&owner()).unwrap();
        let err = will.set_inactivity_threshold(&owner(), 86_400).unwrap_err();
        assert!(matches!(err, VaultError::InvalidState { .. }));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", WillStatus::Active), "active");
        assert_eq!(format!("{}", WillStatus::Triggered), "triggered");
        assert_eq!(format!("{}", WillStatus::Revoked), "revoked");
    }
}
