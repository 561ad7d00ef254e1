//! Server configuration — parsed from TOML file + environment variable overrides.
//!
//! Priority: environment variables > config file > defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// General server settings
    #[serde(default)]
    pub server: ServerSection,

    /// Vault settings
    pub vault: VaultSection,

    /// Check-in monitoring settings
    #[serde(default)]
    pub watch: WatchSection,
}

/// General server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Data directory (vault state, watch state)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Check interval in seconds (default: 6 hours)
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            check_interval_secs: default_check_interval(),
            log_level: default_log_level(),
        }
    }
}

/// Vault settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSection {
    /// The platform signer account — the third key in every will's
    /// 2-of-3 set.
    pub platform_account: String,

    /// Time-box for multisig proposals, in days. 0 disables expiry.
    #[serde(default = "default_proposal_ttl_days")]
    pub proposal_ttl_days: u64,
}

/// Check-in monitoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSection {
    /// Fraction of the inactivity threshold elapsed before recommending
    /// check-in (0.0–1.0)
    #[serde(default = "default_checkin_threshold")]
    pub checkin_threshold: f64,

    /// Fraction elapsed before check-in is critical (0.0–1.0)
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,

    /// Propose the inheritance trigger as the platform signer once a
    /// will becomes eligible
    #[serde(default = "default_auto_propose")]
    pub auto_propose: bool,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            checkin_threshold: default_checkin_threshold(),
            critical_threshold: default_critical_threshold(),
            auto_propose: default_auto_propose(),
        }
    }
}

// ============================================================================
// Default value functions
// ============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("/data")
}

fn default_check_interval() -> u64 {
    21600 // 6 hours
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_proposal_ttl_days() -> u64 {
    30
}

fn default_checkin_threshold() -> f64 {
    0.5
}

fn default_critical_threshold() -> f64 {
    0.9
}

fn default_auto_propose() -> bool {
    true
}

// ============================================================================
// Loading & environment override
// ============================================================================

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ServerConfig =
            toml::from_str(&contents).with_context(|| "Failed to parse TOML config")?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `HEIRLOOM_DATA_DIR`
    /// - `HEIRLOOM_CHECK_INTERVAL`
    /// - `HEIRLOOM_LOG_LEVEL`
    /// - `HEIRLOOM_PLATFORM_ACCOUNT`
    /// - `HEIRLOOM_PROPOSAL_TTL_DAYS`
    /// - `HEIRLOOM_AUTO_PROPOSE`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("HEIRLOOM_DATA_DIR") {
            self.server.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("HEIRLOOM_CHECK_INTERVAL") {
            if let Ok(secs) = v.parse::<u64>() {
                self.server.check_interval_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("HEIRLOOM_LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Ok(v) = std::env::var("HEIRLOOM_PLATFORM_ACCOUNT") {
            self.vault.platform_account = v;
        }
        if let Ok(v) = std::env::var("HEIRLOOM_PROPOSAL_TTL_DAYS") {
            if let Ok(days) = v.parse::<u64>() {
                self.vault.proposal_ttl_days = days;
            }
        }
        if let Ok(v) = std::env::var("HEIRLOOM_AUTO_PROPOSE") {
            if let Ok(flag) = v.parse::<bool>() {
                self.watch.auto_propose = flag;
            }
        }
    }

    /// Proposal TTL in seconds; `None` when expiry is disabled.
    pub fn proposal_ttl_secs(&self) -> Option<u64> {
        match self.vault.proposal_ttl_days {
            0 => None,
            days => Some(days * 86_400),
        }
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.vault.platform_account.trim().is_empty(),
            "vault.platform_account must not be empty"
        );

        anyhow::ensure!(
            self.server.check_interval_secs >= 60,
            "server.check_interval_secs must be >= 60"
        );

        anyhow::ensure!(
            self.watch.checkin_threshold > 0.0 && self.watch.checkin_threshold < 1.0,
            "watch.checkin_threshold must be between 0.0 and 1.0 exclusive"
        );
        anyhow::ensure!(
            self.watch.critical_threshold > self.watch.checkin_threshold
                && self.watch.critical_threshold < 1.0,
            "watch.critical_threshold must be between watch.checkin_threshold and 1.0 exclusive"
        );

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
