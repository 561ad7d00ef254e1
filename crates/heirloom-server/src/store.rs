//! Vault state persistence.
//!
//! The whole vault state machine serializes to one JSON document under
//! the data directory. State is small (wills, allocations, pending
//! actions); a file per daemon keeps recovery trivial — copy the file,
//! restart.

use heirloom_vault::{InheritanceVault, VaultConfig};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors from store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load the vault from `path`, or initialize a fresh one with `config`
/// if no state file exists yet.
pub fn load_vault(path: &Path, config: VaultConfig) -> Result<InheritanceVault, StoreError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let vault: InheritanceVault = serde_json::from_str(&contents)?;
        Ok(vault)
    } else {
        Ok(InheritanceVault::new(config))
    }
}

/// Save the vault to `path`, creating parent directories as needed.
/// Writes to a temp file first and renames, so a crash mid-write never
/// leaves a truncated state file.
pub fn save_vault(vault: &InheritanceVault, path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(vault)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use heirloom_vault::AccountId;
    use tempfile::tempdir;

    fn platform() -> AccountId {
        AccountId::new("platform").unwrap()
    }

    #[test]
    fn test_missing_file_gives_fresh_vault() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault_state.json");
        let vault = load_vault(&path, VaultConfig::new(platform())).unwrap();
        assert!(vault.will_ids().is_empty());
    }

    #[test]
    fn test_vault_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vault_state.json");

        let mut vault = InheritanceVault::new(VaultConfig::new(platform()));
        let will_id = vault
            .create_will(
                AccountId::new("owner").unwrap(),
                AccountId::new("executor").unwrap(),
                2_592_000,
                "ipfs://meta",
                1_700_000_000,
            )
            .unwrap();
        vault.deposit(will_id, 4_200).unwrap();
        save_vault(&vault, &path).unwrap();

        let loaded = load_vault(&path, VaultConfig::new(platform())).unwrap();
        assert_eq!(loaded.balance_of(will_id), Some(4_200));
        assert_eq!(
            loaded.get_will(will_id).unwrap().owner,
            AccountId::new("owner").unwrap()
        );
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/vault_state.json");
        let vault = InheritanceVault::new(VaultConfig::new(platform()));
        save_vault(&vault, &path).unwrap();
        assert!(path.exists());
        // No stray temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }
}
