//! Events emitted by the watch service poll loop.

use heirloom_vault::{ActionId, WillId};
use serde::{Deserialize, Serialize};

/// Events emitted by `WatchService::poll` when will state warrants
/// attention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum WatchEvent {
    /// The owner should check in — the countdown passed a warning
    /// threshold. (Delegates to the embedding service for actual
    /// alerting.)
    CheckinWarning {
        /// The will concerned.
        will_id: WillId,
        /// Seconds until trigger eligibility.
        remaining_secs: u64,
        /// Approximate days remaining.
        days_remaining: f64,
        /// Whether this passed the critical threshold.
        critical: bool,
    },

    /// The inactivity threshold fully elapsed; the will may be triggered.
    WillEligible {
        will_id: WillId,
        /// Seconds of silence so far.
        elapsed_secs: u64,
    },

    /// The watcher proposed a trigger action through the multisig gate.
    TriggerProposed {
        will_id: WillId,
        action_id: ActionId,
    },

    /// Error while evaluating one will (clock regression, missing will).
    PollError {
        /// Error message.
        message: String,
    },
}

impl WatchEvent {
    /// Get the will id if this event is associated with one.
    pub fn will_id(&self) -> Option<WillId> {
        match self {
            WatchEvent::CheckinWarning { will_id, .. }
            | WatchEvent::WillEligible { will_id, .. }
            | WatchEvent::TriggerProposed { will_id, .. } => Some(*will_id),
            WatchEvent::PollError { .. } => None,
        }
    }

    /// Check if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, WatchEvent::PollError { .. })
    }
}
