//! The daemon loop — periodically sweeps the vault and logs what needs
//! attention.

use crate::config::ServerConfig;
use crate::store;
use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use heirloom_vault::{AccountId, VaultConfig, VaultEvent};
use heirloom_watch::{HeartbeatConfig, WatchConfig, WatchEvent, WatchService};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Run the daemon loop. Blocks forever (until shutdown signal).
pub async fn run(config: ServerConfig) -> Result<()> {
    log::info!("Heirloom server starting…");
    log::info!("  Platform key:  {}", config.vault.platform_account);
    log::info!(
        "  Interval:      {} seconds ({:.1} hours)",
        config.server.check_interval_secs,
        config.server.check_interval_secs as f64 / 3600.0
    );
    log::info!("  Data dir:      {}", config.server.data_dir.display());
    log::info!("  Auto-propose:  {}", config.watch.auto_propose);

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir).with_context(|| {
        format!(
            "Failed to create data dir: {}",
            config.server.data_dir.display()
        )
    })?;

    let interval = Duration::from_secs(config.server.check_interval_secs);

    // Run first check immediately, then loop
    let mut first = true;
    loop {
        if !first {
            log::info!(
                "Sleeping {} seconds until next check…",
                config.server.check_interval_secs
            );
            tokio::time::sleep(interval).await;
        }
        first = false;

        match run_check_cycle(&config).await {
            Ok(()) => log::info!("Check cycle completed successfully."),
            Err(e) => log::error!("Check cycle failed: {:#}", e),
        }
    }
}

/// Execute a single check cycle: load the vault, sweep all wills, log
/// events, persist.
pub async fn run_check_cycle(config: &ServerConfig) -> Result<()> {
    log::info!("Starting check cycle…");

    let platform = AccountId::new(config.vault.platform_account.clone())
        .context("Invalid platform account id")?;
    let vault_config = VaultConfig {
        platform,
        proposal_ttl_secs: config.proposal_ttl_secs(),
    };

    let vault_path = config.server.data_dir.join("vault_state.json");
    let mut vault =
        store::load_vault(&vault_path, vault_config).context("Failed to load vault state")?;

    let watch_config = WatchConfig {
        state_path: config.server.data_dir.join("watch_state.json"),
        min_poll_interval_secs: 0, // Server manages its own interval via tokio::sleep
        auto_propose: config.watch.auto_propose,
        heartbeat: HeartbeatConfig {
            checkin_threshold: config.watch.checkin_threshold,
            critical_threshold: config.watch.critical_threshold,
            poll_interval_secs: config.server.check_interval_secs,
        },
    };
    let mut watch = WatchService::new(watch_config).context("Failed to create WatchService")?;

    let now = current_timestamp();
    let events = watch.poll(&mut vault, now).context("Watch poll failed")?;

    log::info!(
        "Swept {} wills at {}  |  Events: {}",
        vault.will_ids().len(),
        format_timestamp(now),
        events.len()
    );

    for event in &events {
        log_watch_event(event);
    }
    for event in vault.drain_events() {
        log_vault_event(&event);
    }

    store::save_vault(&vault, &vault_path).context("Failed to save vault state")?;
    Ok(())
}

fn log_watch_event(event: &WatchEvent) {
    match event {
        WatchEvent::CheckinWarning {
            will_id,
            days_remaining,
            critical,
            ..
        } => {
            if *critical {
                log::warn!(
                    "{}: CRITICAL — owner must check in within {:.1} days",
                    will_id,
                    days_remaining
                );
            } else {
                log::warn!(
                    "{}: owner should check in ({:.1} days remaining)",
                    will_id,
                    days_remaining
                );
            }
        }
        WatchEvent::WillEligible {
            will_id,
            elapsed_secs,
        } => {
            log::warn!(
                "{}: ELIGIBLE — {:.1} days of silence, inheritance may be triggered",
                will_id,
                *elapsed_secs as f64 / 86_400.0
            );
        }
        WatchEvent::TriggerProposed { will_id, action_id } => {
            log::info!("{}: trigger proposal {} opened", will_id, action_id);
        }
        WatchEvent::PollError { message } => {
            log::error!("Poll error: {}", message);
        }
    }
}

fn log_vault_event(event: &VaultEvent) {
    match event {
        VaultEvent::InheritanceTriggered { will_id, transfers } => {
            log::warn!("{}: inheritance TRIGGERED, {} transfers", will_id, transfers.len());
        }
        VaultEvent::ActionProposed {
            action_id,
            will_id,
            kind,
            ..
        } => {
            log::info!("{}: {} pending as {}", will_id, kind, action_id);
        }
        other => log::debug!("Vault event: {:?}", other),
    }
}

/// Get current unix timestamp
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Render a unix timestamp for log output.
fn format_timestamp(ts: u64) -> String {
    match Utc.timestamp_opt(ts as i64, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => format!("{}", ts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        let s = format_timestamp(1_700_000_000);
        assert!(s.contains("2023-11-14"));
        assert!(s.ends_with("UTC"));
    }

    #[test]
    fn test_current_timestamp_is_recent() {
        assert!(current_timestamp() > 1_700_000_000);
    }

    #[tokio::test]
    async fn test_check_cycle_bootstraps_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            server: crate::config::ServerSection {
                data_dir: dir.path().to_path_buf(),
                check_interval_secs: 3600,
                log_level: "info".into(),
            },
            vault: crate::config::VaultSection {
                platform_account: "platform".into(),
                proposal_ttl_days: 30,
            },
            watch: Default::default(),
        };

        run_check_cycle(&config).await.unwrap();

        // Both state files exist after the first cycle
        assert!(dir.path().join("vault_state.json").exists());
        assert!(dir.path().join("watch_state.json").exists());

        // A second cycle reloads them cleanly
        run_check_cycle(&config).await.unwrap();
    }
}
