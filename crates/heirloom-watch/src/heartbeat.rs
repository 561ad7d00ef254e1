//! Deadman heartbeat evaluation for inheritance wills.
//!
//! Pure logic — no I/O, no timers, no async. Takes a will snapshot and
//! `now`, returns a recommendation. The caller (daemon, dashboard
//! backend) decides whether to act on it.
//!
//! # How It Works
//!
//! The inactivity threshold restarts at every liveness signal. The
//! heartbeat module evaluates how much of the threshold has elapsed and
//! recommends action:
//!
//! ```text
//! |--- Healthy ---|--- CheckinRecommended ---|--- CheckinRequired ---|--- Eligible
//! 0%             50%                        90%                    100%
//! ```
//!
//! Thresholds are configurable.

use heirloom_vault::{trigger, VaultError, Will, WillId};
use serde::{Deserialize, Serialize};

/// Heartbeat configuration — when to recommend check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Fraction of the inactivity threshold elapsed before recommending
    /// check-in (0.0–1.0). Default: 0.5 (halfway point).
    pub checkin_threshold: f64,

    /// Fraction elapsed before check-in is critical (0.0–1.0).
    /// Default: 0.9.
    pub critical_threshold: f64,

    /// How often the caller should poll (seconds). Advisory — the
    /// heartbeat module doesn't poll itself. Default: 3600 (1 hour).
    pub poll_interval_secs: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            checkin_threshold: 0.5,
            critical_threshold: 0.9,
            poll_interval_secs: 3600,
        }
    }
}

impl HeartbeatConfig {
    /// Validate that thresholds are sensible.
    pub fn validate(&self) -> Result<(), HeartbeatError> {
        if self.checkin_threshold <= 0.0 || self.checkin_threshold >= 1.0 {
            return Err(HeartbeatError::InvalidThreshold(
                "checkin_threshold must be between 0.0 and 1.0 exclusive".into(),
            ));
        }
        if self.critical_threshold <= self.checkin_threshold || self.critical_threshold >= 1.0 {
            return Err(HeartbeatError::InvalidThreshold(
                "critical_threshold must be between checkin_threshold and 1.0 exclusive".into(),
            ));
        }
        Ok(())
    }
}

/// What the heartbeat recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeartbeatAction {
    /// Countdown is far from expiry. No action needed.
    Healthy,
    /// Passed the check-in threshold. Should check in soon.
    CheckinRecommended,
    /// Passed the critical threshold. Must check in now.
    CheckinRequired,
    /// Threshold fully elapsed. The will is trigger-eligible. Too late
    /// for a routine check-in (though one still aborts any pending
    /// trigger).
    Eligible,
}

/// Full heartbeat status for a will.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatStatus {
    /// The will under evaluation.
    pub will_id: WillId,
    /// Seconds since the last liveness signal.
    pub elapsed_secs: u64,
    /// Seconds until trigger eligibility (0 once eligible).
    pub remaining_secs: u64,
    /// Fraction of the threshold elapsed (0.0–1.0+).
    pub elapsed_fraction: f64,
    /// Recommended action.
    pub action: HeartbeatAction,
}

/// Errors from heartbeat evaluation.
#[derive(Debug, thiserror::Error)]
pub enum HeartbeatError {
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Evaluate the heartbeat status of an active will.
///
/// Pure function: takes will state and `now`, returns a recommendation.
/// Propagates `InvalidTimestamp` on clock regression rather than
/// guessing.
pub fn evaluate_heartbeat(
    will: &Will,
    now: u64,
    config: &HeartbeatConfig,
) -> Result<HeartbeatStatus, VaultError> {
    let status = trigger::evaluate(will, now)?;

    let action = if status.eligible {
        HeartbeatAction::Eligible
    } else if status.elapsed_fraction >= config.critical_threshold {
        HeartbeatAction::CheckinRequired
    } else if status.elapsed_fraction >= config.checkin_threshold {
        HeartbeatAction::CheckinRecommended
    } else {
        HeartbeatAction::Healthy
    };

    Ok(HeartbeatStatus {
        will_id: will.id,
        elapsed_secs: status.elapsed_secs,
        remaining_secs: status.remaining_secs,
        elapsed_fraction: status.elapsed_fraction,
        action,
    })
}

/// Batch evaluate heartbeat for multiple wills.
///
/// Returns statuses sorted by urgency (most urgent first). Wills whose
/// evaluation fails (clock regression) are skipped; the caller polls
/// again next cycle.
pub fn evaluate_batch(
    wills: &[&Will],
    now: u64,
    config: &HeartbeatConfig,
) -> Vec<HeartbeatStatus> {
    let mut statuses: Vec<HeartbeatStatus> = wills
        .iter()
        .filter_map(|will| evaluate_heartbeat(will, now, config).ok())
        .collect();

    // Sort: Eligible first, then CheckinRequired, then CheckinRecommended,
    // then Healthy; higher elapsed fraction first within each band.
    statuses.sort_by(|a, b| {
        b.action.cmp(&a.action).then(
            b.elapsed_fraction
                .partial_cmp(&a.elapsed_fraction)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });

    statuses
}
