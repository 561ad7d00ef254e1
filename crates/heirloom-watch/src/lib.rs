//! Heirloom Watch Service
//!
//! Monitors inheritance wills for approaching deadman-switch expiry.
//!
//! # Features
//!
//! - Periodic sweep of all wills in a vault
//! - Escalating check-in warnings (recommended → required → eligible)
//! - Persistent dedup state across restarts
//! - Optional auto-proposal of the trigger action once a will is
//!   eligible, signed as the platform key
//!
//! # Example
//!
//! ```ignore
//! use heirloom_watch::{WatchService, WatchConfig};
//! use std::path::PathBuf;
//!
//! let config = WatchConfig {
//!     state_path: PathBuf::from("~/.heirloom/watch_state.json"),
//!     min_poll_interval_secs: 60,
//!     auto_propose: true,
//!     heartbeat: Default::default(),
//! };
//!
//! let mut service = WatchService::new(config)?;
//! let events = service.poll(&mut vault, now)?;
//! for event in events {
//!     println!("Event: {:?}", event);
//! }
//! ```

pub mod events;
pub mod heartbeat;
pub mod state;

pub use events::WatchEvent;
pub use heartbeat::{
    evaluate_batch, evaluate_heartbeat, HeartbeatAction, HeartbeatConfig, HeartbeatError,
    HeartbeatStatus,
};
pub use state::{StateError, WatchState};

use heirloom_vault::{ActionKind, InheritanceVault, VaultError, WillStatus};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from the watch service
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("State error: {0}")]
    State(#[from] state::StateError),

    #[error("Heartbeat config error: {0}")]
    Heartbeat(#[from] heartbeat::HeartbeatError),

    #[error("Poll interval too short (minimum {min} seconds)")]
    PollTooFrequent { min: u64 },
}

/// Configuration for the watch service
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Path to state file
    pub state_path: PathBuf,
    /// Minimum allowed poll interval (rate limiting)
    pub min_poll_interval_secs: u64,
    /// Propose `TriggerInheritance` as the platform signer when a will
    /// becomes eligible.
    pub auto_propose: bool,
    /// When to warn about an approaching expiry.
    pub heartbeat: HeartbeatConfig,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("watch_state.json"),
            min_poll_interval_secs: 60,
            auto_propose: false,
            heartbeat: HeartbeatConfig::default(),
        }
    }
}

/// Will monitoring service
pub struct WatchService {
    config: WatchConfig,
    state: WatchState,
}

impl WatchService {
    /// Create a new watch service, loading persisted state if present.
    pub fn new(config: WatchConfig) -> Result<Self, WatchError> {
        config.heartbeat.validate()?;
        let state = WatchState::load(&config.state_path).unwrap_or_default();
        Ok(Self { config, state })
    }

    /// Sweep all wills in the vault and return events.
    ///
    /// This is the main entry point. Warnings are deduplicated across
    /// polls: a level already reported for a will stays quiet until the
    /// urgency escalates or the owner checks in.
    pub fn poll(
        &mut self,
        vault: &mut InheritanceVault,
        now: u64,
    ) -> Result<Vec<WatchEvent>, WatchError> {
        // Rate limiting
        if let Some(last) = self.state.last_poll {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.config.min_poll_interval_secs {
                return Err(WatchError::PollTooFrequent {
                    min: self.config.min_poll_interval_secs,
                });
            }
        }

        let mut events = Vec::new();

        for will_id in vault.will_ids() {
            match self.poll_will(vault, will_id, now) {
                Ok(mut will_events) => events.append(&mut will_events),
                Err(e) => {
                    events.push(WatchEvent::PollError {
                        message: format!("Error polling {}: {}", will_id, e),
                    });
                }
            }
        }

        self.state.update_poll(now);
        self.save_state()?;

        Ok(events)
    }

    /// Evaluate a single will.
    fn poll_will(
        &mut self,
        vault: &mut InheritanceVault,
        will_id: heirloom_vault::WillId,
        now: u64,
    ) -> Result<Vec<WatchEvent>, VaultError> {
        let mut events = Vec::new();

        let will = match vault.get_will(will_id) {
            Some(will) => will,
            None => return Ok(events),
        };
        if will.status != WillStatus::Active {
            // Terminal wills need no monitoring; drop any stale dedup entry.
            self.state.mark_reported(will_id, HeartbeatAction::Healthy);
            return Ok(events);
        }

        let status = evaluate_heartbeat(will, now, &self.config.heartbeat)?;

        if self.state.should_report(will_id, status.action) {
            match status.action {
                HeartbeatAction::Healthy => {}
                HeartbeatAction::CheckinRecommended | HeartbeatAction::CheckinRequired => {
                    events.push(WatchEvent::CheckinWarning {
                        will_id,
                        remaining_secs: status.remaining_secs,
                        days_remaining: status.remaining_secs as f64 / 86_400.0,
                        critical: status.action == HeartbeatAction::CheckinRequired,
                    });
                }
                HeartbeatAction::Eligible => {
                    events.push(WatchEvent::WillEligible {
                        will_id,
                        elapsed_secs: status.elapsed_secs,
                    });
                }
            }
        }
        self.state.mark_reported(will_id, status.action);

        // Eligibility is advisory; acting on it still goes through the
        // multisig gate, proposing as the platform signer.
        if status.action == HeartbeatAction::Eligible && self.config.auto_propose {
            let platform = vault.config().platform.clone();
            match vault.propose_action(will_id, ActionKind::TriggerInheritance, platform, now) {
                Ok(action_id) => {
                    log::info!("{}: trigger proposed as {}", will_id, action_id);
                    events.push(WatchEvent::TriggerProposed { will_id, action_id });
                }
                // An open proposal already exists; nothing to do.
                Err(VaultError::DuplicateProposal { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        Ok(events)
    }

    /// Save state to disk
    fn save_state(&self) -> Result<(), WatchError> {
        self.state.save(&self.config.state_path)?;
        Ok(())
    }

    /// Get the current state (for inspection)
    pub fn state(&self) -> &WatchState {
        &self.state
    }
}
