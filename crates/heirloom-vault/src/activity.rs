//! Activity ledger — the authoritative record of owner liveness.
//!
//! The owner (or automation acting with the owner's key) periodically
//! records a liveness signal. Each signal resets the deadman countdown by
//! advancing `last_activity` on the will. The ledger also keeps a bounded
//! per-will history of signal timestamps for audit.
//!
//! Clock regression (`now` before `last_activity`) is a hard error, never
//! silently clamped — clamping could be exploited to force a premature
//! trigger.

use crate::account::AccountId;
use crate::error::VaultError;
use crate::will::{Will, WillId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How many signal timestamps to retain per will.
const DEFAULT_MAX_HISTORY: usize = 256;

/// Elapsed seconds since the will's last liveness signal.
///
/// Pure query. Errors with `InvalidTimestamp` if `now` is earlier than
/// the recorded last activity.
pub fn time_since_last_activity(will: &Will, now: u64) -> Result<u64, VaultError> {
    if now < will.last_activity {
        return Err(VaultError::InvalidTimestamp {
            now,
            last_activity: will.last_activity,
        });
    }
    Ok(now - will.last_activity)
}

/// Per-will audit history of liveness signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLedger {
    /// Signal timestamps per will, oldest first.
    signals: HashMap<WillId, Vec<u64>>,
    /// History cap per will; the oldest entries are dropped past it.
    max_history: usize,
}

impl Default for ActivityLedger {
    fn default() -> Self {
        Self {
            signals: HashMap::new(),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl ActivityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a liveness signal for `will`.
    ///
    /// Callable only by the will's owner while the will is Active. Sets
    /// `last_activity = now`, which resets any in-progress trigger
    /// eligibility. Errors: `Unauthorized`, `InvalidState`,
    /// `InvalidTimestamp` on clock regression.
    pub fn record(
        &mut self,
        will: &mut Will,
        caller: &AccountId,
        now: u64,
    ) -> Result<(), VaultError> {
        will.ensure_owner(caller)?;
        will.ensure_active()?;
        if now < will.last_activity {
            return Err(VaultError::InvalidTimestamp {
                now,
                last_activity: will.last_activity,
            });
        }

        will.last_activity = now;

        let history = self.signals.entry(will.id).or_default();
        history.push(now);
        if history.len() > self.max_history {
            let excess = history.len() - self.max_history;
            history.drain(..excess);
        }
        Ok(())
    }

    /// Audit history for a will, oldest first. Empty if nothing recorded.
    pub fn history(&self, will_id: WillId) -> &[u64] {
        self.signals.get(&will_id).map(Vec::as_slice).unwrap_or(&[])
    }
}
