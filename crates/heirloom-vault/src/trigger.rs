//! Trigger evaluator — the pure deadman-switch decision function.
//!
//! No side effects, no timers. Eligibility is recomputed from `now` on
//! every read, so any caller can deterministically reproduce the answer
//! and there is no background countdown to drift.
//!
//! `is_eligible` is advisory only: acting on it requires the multisig
//! gate. That split keeps the read path testable in isolation from
//! quorum logic, and gives `execute` a final re-validation point.

use crate::activity::time_since_last_activity;
use crate::error::VaultError;
use crate::will::{Will, WillStatus};
use serde::{Deserialize, Serialize};

/// Is this will eligible for an inheritance trigger at `now`?
///
/// True iff the will is Active and the owner has been silent for at
/// least the configured inactivity threshold. Any other status returns
/// false — an already-Triggered will can never re-trigger. Errors with
/// `InvalidTimestamp` on clock regression.
pub fn is_eligible(will: &Will, now: u64) -> Result<bool, VaultError> {
    if will.status != WillStatus::Active {
        return Ok(false);
    }
    let elapsed = time_since_last_activity(will, now)?;
    Ok(elapsed >= will.inactivity_threshold_secs)
}

/// Point-in-time snapshot of where a will stands on its countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerStatus {
    /// Whether the will could be triggered right now.
    pub eligible: bool,
    /// Seconds since the last liveness signal.
    pub elapsed_secs: u64,
    /// Seconds of silence still required before eligibility (0 if
    /// already eligible or the will is terminal).
    pub remaining_secs: u64,
    /// `elapsed / threshold`; exceeds 1.0 once past the threshold.
    pub elapsed_fraction: f64,
}

/// Evaluate the full countdown status for a will.
///
/// For terminal wills the countdown is moot: eligible is false and the
/// elapsed/remaining figures are zeroed.
pub fn evaluate(will: &Will, now: u64) -> Result<TriggerStatus, VaultError> {
    if will.status != WillStatus::Active {
        return Ok(TriggerStatus {
            eligible: false,
            elapsed_secs: 0,
            remaining_secs: 0,
            elapsed_fraction: 0.0,
        });
    }

    let elapsed = time_since_last_activity(will, now)?;
    let threshold = will.inactivity_threshold_secs;
    Ok(TriggerStatus {
        eligible: elapsed >= threshold,
        elapsed_secs: elapsed,
        remaining_secs: threshold.saturating_sub(elapsed),
        elapsed_fraction: elapsed as f64 / threshold as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountId;
    use crate::activity::ActivityLedger;
    use crate::will::WillId;

    const THIRTY_DAYS: u64 = 2_592_000;

    fn owner() -> AccountId {
        AccountId::new("owner").unwrap()
    }

    fn make_will() -> Will {
        // Created at t=0, 30-day threshold
        Will::new(WillId(1), owner(), THIRTY_DAYS, "", 0).unwrap()
    }

    #[test]
    fn test_thirty_day_boundary() {
        // Scenario from the product requirements: threshold 2,592,000s,
        // activity at t=0.
        let will = make_will();
        assert!(!is_eligible(&will, 2_591_999).unwrap());
        assert!(is_eligible(&will, 2_592_000).unwrap());
        assert!(is_eligible(&will, 2_592_001).unwrap());
    }

    #[test]
    fn test_activity_resets_eligibility() {
        let mut will = make_will();
        let mut ledger = ActivityLedger::new();

        assert!(is_eligible(&will, THIRTY_DAYS + 500).is_ok());
        ledger.record(&mut will, &owner(), THIRTY_DAYS).unwrap();

        // Immediately after a signal, never eligible
        assert!(!is_eligible(&will, THIRTY_DAYS).unwrap());
        assert!(!is_eligible(&will, 2 * THIRTY_DAYS - 1).unwrap());
        assert!(is_eligible(&will, 2 * THIRTY_DAYS).unwrap());
    }

    #[test]
    fn test_terminal_wills_never_eligible() {
        let mut will = make_will();
        will.revoke(&owner()).unwrap();
        assert!(!is_eligible(&will, u64::MAX).unwrap());

        let mut will = make_will();
        will.mark_triggered().unwrap();
        assert!(!is_eligible(&will, u64::MAX).unwrap());
    }

    #[test]
    fn test_clock_regression_propagates() {
        let will = Will::new(WillId(1), owner(), THIRTY_DAYS, "", 5_000).unwrap();
        let err = is_eligible(&will, 4_000).unwrap_err();
        assert!(matches!(err, VaultError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_evaluate_status() {
        let will = make_will();

        let status = evaluate(&will, THIRTY_DAYS / 2).unwrap();
        assert!(!status.eligible);
        assert_eq!(status.elapsed_secs, THIRTY_DAYS / 2);
        assert_eq!(status.remaining_secs, THIRTY_DAYS / 2);
        assert!((status.elapsed_fraction - 0.5).abs() < 1e-9);

        let status = evaluate(&will, THIRTY_DAYS + 100).unwrap();
        assert!(status.eligible);
        assert_eq!(status.remaining_secs, 0);
        assert!(status.elapsed_fraction > 1.0);
    }

    #[test]
    fn test_evaluate_terminal_is_zeroed() {
        let mut will = make_will();
        will.revoke(&owner()).unwrap();
        let status = evaluate(&will, THIRTY_DAYS * 10).unwrap();
        assert!(!status.eligible);
        assert_eq!(status.elapsed_secs, 0);
        assert_eq!(status.elapsed_fraction, 0.0);
    }
}
