//! Persistent state for the watch service
//!
//! Tracks the last poll time and the most urgent heartbeat level already
//! reported per will, so restarts don't re-send the same warnings.

use crate::heartbeat::HeartbeatAction;
use heirloom_vault::WillId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors from state operations
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full watch state, persisted as JSON across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatchState {
    /// Last successful poll (unix timestamp)
    pub last_poll: Option<u64>,
    /// Most urgent action already reported per will. A warning is only
    /// re-emitted when urgency increases; a Healthy reading clears it.
    pub reported: HashMap<WillId, HeartbeatAction>,
}

impl WatchState {
    /// Create empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state from file, or create empty if not exists
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let state: WatchState = serde_json::from_str(&contents)?;
            Ok(state)
        } else {
            Ok(Self::new())
        }
    }

    /// Save state to file
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Should a reading at `action` urgency be reported for this will?
    /// Only when it exceeds what was already reported.
    pub fn should_report(&self, will_id: WillId, action: HeartbeatAction) -> bool {
        match self.reported.get(&will_id) {
            Some(prev) => action > *prev,
            None => action > HeartbeatAction::Healthy,
        }
    }

    /// Record the urgency level just reported (or clear it on Healthy,
    /// which happens after a check-in resets the countdown).
    pub fn mark_reported(&mut self, will_id: WillId, action: HeartbeatAction) {
        if action == HeartbeatAction::Healthy {
            self.reported.remove(&will_id);
        } else {
            self.reported.insert(will_id, action);
        }
    }

    /// Update last poll info
    pub fn update_poll(&mut self, timestamp: u64) {
        self.last_poll = Some(timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_report_only_on_escalation() {
        let mut state = WatchState::new();
        let id = WillId(1);

        assert!(!state.should_report(id, HeartbeatAction::Healthy));
        assert!(state.should_report(id, HeartbeatAction::CheckinRecommended));

        state.mark_reported(id, HeartbeatAction::CheckinRecommended);
        // Same level again: stay quiet
        assert!(!state.should_report(id, HeartbeatAction::CheckinRecommended));
        // Escalation: report
        assert!(state.should_report(id, HeartbeatAction::CheckinRequired));

        state.mark_reported(id, HeartbeatAction::CheckinRequired);
        assert!(state.should_report(id, HeartbeatAction::Eligible));
    }

    #[test]
    fn test_healthy_reading_clears_reported_level() {
        let mut state = WatchState::new();
        let id = WillId(1);

        state.mark_reported(id, HeartbeatAction::Eligible);
        assert!(!state.should_report(id, HeartbeatAction::CheckinRequired));

        // Owner checked in; countdown reset
        state.mark_reported(id, HeartbeatAction::Healthy);
        assert!(state.should_report(id, HeartbeatAction::CheckinRecommended));
    }

    #[test]
    fn test_watch_state_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watch_state.json");

        let mut state = WatchState::new();
        state.mark_reported(WillId(2), HeartbeatAction::CheckinRequired);
        state.update_poll(1_700_000_000);
        state.save(&path).unwrap();

        let loaded = WatchState::load(&path).unwrap();
        assert_eq!(loaded.last_poll, Some(1_700_000_000));
        assert_eq!(
            loaded.reported.get(&WillId(2)),
            Some(&HeartbeatAction::CheckinRequired)
        );
    }

    #[test]
    fn test_load_missing_file_gives_empty_state() {
        let dir = tempdir().unwrap();
        let state = WatchState::load(&dir.path().join("nope.json")).unwrap();
        assert!(state.last_poll.is_none());
        assert!(state.reported.is_empty());
    }
}
