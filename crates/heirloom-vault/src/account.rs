//! Principal identifiers.
//!
//! An `AccountId` names any principal the vault deals with: will owners,
//! multisig signers, beneficiaries. The core treats it as an opaque,
//! non-empty string — address format validation belongs to the wallet
//! layer, not here.

use crate::error::VaultError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an account id. Fails on an empty string.
    pub fn new(id: impl Into<String>) -> Result<Self, VaultError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VaultError::InvalidAccount);
        }
        Ok(Self(id))
    }

    /// The raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_creation() {
        let id = AccountId::new("0xabc123").unwrap();
        assert_eq!(id.as_str(), "0xabc123");
        assert_eq!(format!("{}", id), "0xabc123");
    }

    #[test]
    fn test_empty_account_id_rejected() {
        assert!(AccountId::new("").is_err());
        assert!(AccountId::new("   ").is_err());
    }

    #[test]
    fn test_account_id_serde() {
        let id = AccountId::new("owner-1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"owner-1\"");
        let restored: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
