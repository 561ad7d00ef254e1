//! Audit events emitted by the vault on every successful state change.
//!
//! The embedding service (daemon, UI backend) drains these for logging
//! and notification. The core never pushes notifications itself.

use crate::account::AccountId;
use crate::multisig::{ActionId, ActionKind};
use crate::will::WillId;
use serde::{Deserialize, Serialize};

/// One asset movement within a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: AccountId,
    /// Amount in base units.
    pub amount: u64,
}

/// Events appended by vault operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VaultEvent {
    WillCreated {
        will_id: WillId,
        owner: AccountId,
    },
    ActivityRecorded {
        will_id: WillId,
        at: u64,
    },
    BeneficiariesUpdated {
        will_id: WillId,
        active_count: usize,
        allocation_sum: u32,
        complete: bool,
    },
    Deposited {
        will_id: WillId,
        amount: u64,
        balance: u64,
    },
    ActionProposed {
        action_id: ActionId,
        will_id: WillId,
        kind: ActionKind,
        proposer: AccountId,
    },
    ActionApproved {
        action_id: ActionId,
        approvals: usize,
        quorum_reached: bool,
    },
    InheritanceTriggered {
        will_id: WillId,
        transfers: Vec<Transfer>,
    },
    EmergencyWithdrawn {
        will_id: WillId,
        to: AccountId,
        amount: u64,
    },
    WillRevoked {
        will_id: WillId,
    },
}

impl VaultEvent {
    /// The will this event concerns, if any.
    pub fn will_id(&self) -> Option<WillId> {
        match self {
            VaultEvent::WillCreated { will_id, .. }
            | VaultEvent::ActivityRecorded { will_id, .. }
            | VaultEvent::BeneficiariesUpdated { will_id, .. }
            | VaultEvent::Deposited { will_id, .. }
            | VaultEvent::ActionProposed { will_id, .. }
            | VaultEvent::InheritanceTriggered { will_id, .. }
            | VaultEvent::EmergencyWithdrawn { will_id, .. }
            | VaultEvent::WillRevoked { will_id } => Some(*will_id),
            VaultEvent::ActionApproved { .. } => None,
        }
    }

    /// Irreversible events are the ones worth alerting on urgently.
    pub fn is_terminal_transition(&self) -> bool {
        matches!(
            self,
            VaultEvent::InheritanceTriggered { .. } | VaultEvent::WillRevoked { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_will_id() {
        let event = VaultEvent::WillRevoked {
            will_id: WillId(3),
        };
        assert_eq!(event.will_id(), Some(WillId(3)));
        assert!(event.is_terminal_transition());

        let event = VaultEvent::ActionApproved {
            action_id: ActionId(1),
            approvals: 2,
            quorum_reached: true,
        };
        assert_eq!(event.will_id(), None);
        assert!(!event.is_terminal_transition());
    }

    #[test]
    fn test_event_serde() {
        let event = VaultEvent::InheritanceTriggered {
            will_id: WillId(9),
            transfers: vec![Transfer {
                to: AccountId::new("alice").unwrap(),
                amount: 600,
            }],
        };
        let json = serde_json::to_string(&event).unwrap();
        let restored: VaultEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, restored);
    }
}
