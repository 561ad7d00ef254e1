//! Beneficiary registry — the allocation table for a will.
//!
//! The table supports incremental editing: percentages are NOT required
//! to sum to 100 at edit time (that would make multi-step editing
//! impossible). Completeness is a precondition of execution, not of
//! configuration — `validate_complete` runs at trigger time.
//!
//! Removing a beneficiary deactivates it rather than deleting the entry;
//! inactive rows are excluded from distribution but kept for audit.

use crate::account::AccountId;
use crate::error::VaultError;
use crate::will::Will;
use serde::{Deserialize, Serialize};

/// One row of the allocation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Recipient account.
    pub address: AccountId,
    /// Share of the vault balance in whole percent, 0..=100.
    pub percentage: u8,
    /// Display label. Not security-relevant.
    pub name: String,
    /// Inactive rows are skipped at distribution but retained for audit.
    pub is_active: bool,
}

impl Beneficiary {
    pub fn new(
        address: AccountId,
        percentage: u8,
        name: impl Into<String>,
    ) -> Result<Self, VaultError> {
        if percentage > 100 {
            return Err(VaultError::InvalidPercentage(percentage));
        }
        Ok(Self {
            address,
            percentage,
            name: name.into(),
            is_active: true,
        })
    }
}

/// Allocation table for a single will.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeneficiaryTable {
    entries: Vec<Beneficiary>,
}

impl BeneficiaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole table. Owner-only, Active-only. Percentages need
    /// not sum to 100 here; duplicates and out-of-range shares are
    /// rejected outright.
    pub fn set(
        &mut self,
        will: &Will,
        caller: &AccountId,
        entries: Vec<Beneficiary>,
    ) -> Result<(), VaultError> {
        will.ensure_owner(caller)?;
        will.ensure_active()?;
        Self::check_entries(&entries)?;
        self.entries = entries;
        Ok(())
    }

    /// Append one beneficiary. Same constraints as `set`.
    pub fn add(
        &mut self,
        will: &Will,
        caller: &AccountId,
        beneficiary: Beneficiary,
    ) -> Result<(), VaultError> {
        will.ensure_owner(caller)?;
        will.ensure_active()?;
        if beneficiary.percentage > 100 {
            return Err(VaultError::InvalidPercentage(beneficiary.percentage));
        }
        if self.entries.iter().any(|b| b.address == beneficiary.address) {
            return Err(VaultError::DuplicateBeneficiary(beneficiary.address));
        }
        self.entries.push(beneficiary);
        Ok(())
    }

    /// Deactivate a beneficiary. The row stays in the table for audit but
    /// is excluded from distribution and from the completeness sum.
    pub fn remove(
        &mut self,
        will: &Will,
        caller: &AccountId,
        address: &AccountId,
    ) -> Result<(), VaultError> {
        will.ensure_owner(caller)?;
        will.ensure_active()?;
        let entry = self
            .entries
            .iter_mut()
            .find(|b| &b.address == address)
            .ok_or_else(|| VaultError::BeneficiaryNotFound(address.clone()))?;
        entry.is_active = false;
        Ok(())
    }

    /// Change one beneficiary's share, reactivating the row if needed.
    pub fn update_allocation(
        &mut self,
        will: &Will,
        caller: &AccountId,
        address: &AccountId,
        percentage: u8,
    ) -> Result<(), VaultError> {
        will.ensure_owner(caller)?;
        will.ensure_active()?;
        if percentage > 100 {
            return Err(VaultError::InvalidPercentage(percentage));
        }
        let entry = self
            .entries
            .iter_mut()
            .find(|b| &b.address == address)
            .ok_or_else(|| VaultError::BeneficiaryNotFound(address.clone()))?;
        entry.percentage = percentage;
        entry.is_active = true;
        Ok(())
    }

    /// All rows, active and inactive.
    pub fn entries(&self) -> &[Beneficiary] {
        &self.entries
    }

    /// Active rows only — the ones distribution pays.
    pub fn active(&self) -> impl Iterator<Item = &Beneficiary> {
        self.entries.iter().filter(|b| b.is_active)
    }

    /// Sum of active percentages.
    pub fn active_sum(&self) -> u32 {
        self.active().map(|b| b.percentage as u32).sum()
    }

    /// Derived flag: does the active allocation currently sum to 100?
    pub fn is_complete(&self) -> bool {
        self.active_sum() == 100
    }

    /// Execution-time check. Errors with `AllocationIncomplete` carrying
    /// the offending sum so clients can explain the failure.
    pub fn validate_complete(&self) -> Result<(), VaultError> {
        let sum = self.active_sum();
        if sum != 100 {
            return Err(VaultError::AllocationIncomplete { sum });
        }
        Ok(())
    }

    fn check_entries(entries: &[Beneficiary]) -> Result<(), VaultError> {
        for (i, b) in entries.iter().enumerate() {
            if b.percentage > 100 {
                return Err(VaultError::InvalidPercentage(b.percentage));
            }
            if entries[..i].iter().any(|prev| prev.address == b.address) {
                return Err(VaultError::DuplicateBeneficiary(b.address.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::will::WillId;

    fn owner() -> AccountId {
        AccountId::new("owner").unwrap()
    }

    fn addr(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn make_will() -> Will {
        Will::new(WillId(1), owner(), 2_592_000, "", 1_000).unwrap()
    }

    fn b(address: &str, pct: u8) -> Beneficiary {
        Beneficiary::new(addr(address), pct, address.to_uppercase()).unwrap()
    }

    #[test]
    fn test_incomplete_table_is_storable() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();

        // 90% total: fine to store, just not complete
        table
            .set(&will, &owner(), vec![b("alice", 60), b("bob", 30)])
            .unwrap();
        assert!(!table.is_complete());
        assert_eq!(table.active_sum(), 90);
        assert_eq!(
            table.validate_complete().unwrap_err(),
            VaultError::AllocationIncomplete { sum: 90 }
        );
    }

    #[test]
    fn test_complete_table_validates() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();
        table
            .set(&will, &owner(), vec![b("alice", 60), b("bob", 40)])
            .unwrap();
        assert!(table.is_complete());
        table.validate_complete().unwrap();
    }

    #[test]
    fn test_set_rejects_duplicates_and_bad_percentages() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();

        let err = table
            .set(&will, &owner(), vec![b("alice", 60), b("alice", 40)])
            .unwrap_err();
        assert!(matches!(err, VaultError::DuplicateBeneficiary(_)));

        assert!(Beneficiary::new(addr("carol"), 101, "Carol").is_err());
    }

    #[test]
    fn test_mutations_are_owner_only() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();
        let stranger = addr("stranger");

        let err = table.set(&will, &stranger, vec![b("alice", 100)]).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));

        let err = table.add(&will, &stranger, b("alice", 100)).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn test_mutations_require_active_will() {
        let mut will = make_will();
        let mut table = BeneficiaryTable::new();
        will.revoke(&owner()).unwrap();

        let err = table.set(&will, &owner(), vec![b("alice", 100)]).unwrap_err();
        assert!(matches!(err, VaultError::InvalidState { .. }));
    }

    #[test]
    fn test_remove_deactivates_but_retains_row() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();
        table
            .set(&will, &owner(), vec![b("alice", 60), b("bob", 40)])
            .unwrap();

        table.remove(&will, &owner(), &addr("bob")).unwrap();
        assert_eq!(table.entries().len(), 2); // audit row kept
        assert_eq!(table.active().count(), 1);
        assert_eq!(table.active_sum(), 60);
        assert!(!table.is_complete());
    }

    #[test]
    fn test_update_allocation_reactivates() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();
        table
            .set(&will, &owner(), vec![b("alice", 60), b("bob", 40)])
            .unwrap();
        table.remove(&will, &owner(), &addr("bob")).unwrap();

        table
            .update_allocation(&will, &owner(), &addr("bob"), 40)
            .unwrap();
        assert!(table.is_complete());

        let err = table
            .update_allocation(&will, &owner(), &addr("nobody"), 10)
            .unwrap_err();
        assert!(matches!(err, VaultError::BeneficiaryNotFound(_)));
    }

    #[test]
    fn test_incremental_add() {
        let will = make_will();
        let mut table = BeneficiaryTable::new();
        table.add(&will, &owner(), b("alice", 60)).unwrap();
        assert!(!table.is_complete());
        table.add(&will, &owner(), b("bob", 40)).unwrap();
        assert!(table.is_complete());

        let err = table.add(&will, &owner(), b("alice", 10)).unwrap_err();
        assert!(matches!(err, VaultError::DuplicateBeneficiary(_)));
    }
}
