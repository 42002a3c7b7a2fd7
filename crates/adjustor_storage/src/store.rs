#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use adjustor_kernel_contracts::adjustor::{
    AdjustorHash, AdjustorRecord, AdjustorStatus, HashMapInfo,
};
use adjustor_kernel_contracts::{ContractViolation, Validate};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("{table}: no row for key {key}")]
    NotFound { table: &'static str, key: String },
    #[error("{table}: duplicate key {key}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("{table} is append-only")]
    AppendOnlyViolation { table: &'static str },
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
}

/// Current-state table of Adjustor records plus the allocation index.
///
/// Records are never physically removed; retirement is a full-value overwrite with the archived
/// form. `hash_list` maps every allocation index ever handed out to the identifier it produced.
#[derive(Debug, Clone)]
pub struct AdjustorStore {
    records: BTreeMap<AdjustorHash, AdjustorRecord>,
    hash_list: BTreeMap<u64, AdjustorHash>,
    first_idx: u64,
    next_idx: u64,
    count: u64,
}

impl AdjustorStore {
    pub fn new_in_memory() -> Self {
        Self {
            records: BTreeMap::new(),
            hash_list: BTreeMap::new(),
            first_idx: 0,
            next_idx: 0,
            count: 0,
        }
    }

    pub fn get(&self, adjustor_hash: &AdjustorHash) -> Result<&AdjustorRecord, StorageError> {
        self.records
            .get(adjustor_hash)
            .ok_or_else(|| StorageError::NotFound {
                table: "adjustors.adjustor_hash",
                key: adjustor_hash.to_string(),
            })
    }

    /// Inserts a new record or replaces an existing one in full.
    ///
    /// A new record must claim the pending allocation slot (`idx == next_idx`); an existing
    /// record keeps its slot for life.
    pub fn put(&mut self, record: AdjustorRecord) -> Result<(), StorageError> {
        record.validate()?;

        match self.records.get(&record.adjustor_hash) {
            Some(existing) => {
                if existing.idx != record.idx {
                    return Err(StorageError::ContractViolation(
                        ContractViolation::InvalidValue {
                            field: "adjustors.idx",
                            reason: "allocation index is immutable",
                        },
                    ));
                }
                if existing.created_at != record.created_at {
                    return Err(StorageError::ContractViolation(
                        ContractViolation::InvalidValue {
                            field: "adjustors.created_at",
                            reason: "creation time is immutable",
                        },
                    ));
                }
                if existing.status == AdjustorStatus::Archived
                    && record.status == AdjustorStatus::Active
                {
                    return Err(StorageError::ContractViolation(
                        ContractViolation::InvalidValue {
                            field: "adjustors.status",
                            reason: "archived record cannot be reactivated",
                        },
                    ));
                }
            }
            None => {
                if record.idx != self.next_idx {
                    return Err(StorageError::ContractViolation(
                        ContractViolation::InvalidValue {
                            field: "adjustors.idx",
                            reason: "new record must claim next_idx",
                        },
                    ));
                }
                if self.hash_list.contains_key(&record.idx) {
                    return Err(StorageError::DuplicateKey {
                        table: "adjustors.idx",
                        key: record.idx.to_string(),
                    });
                }
                self.hash_list.insert(record.idx, record.adjustor_hash);
            }
        }

        self.records.insert(record.adjustor_hash, record);
        Ok(())
    }

    pub fn counters_view(&self) -> HashMapInfo {
        HashMapInfo {
            first_idx: self.first_idx,
            next_idx: self.next_idx,
            count: self.count,
        }
    }

    pub fn advance_index(&mut self) {
        self.next_idx = self.next_idx.saturating_add(1);
    }

    pub fn increment_active(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn decrement_active(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn is_active(&self, adjustor_hash: &AdjustorHash) -> bool {
        self.records
            .get(adjustor_hash)
            .map(|r| r.status == AdjustorStatus::Active)
            .unwrap_or(false)
    }

    pub fn is_archived(&self, adjustor_hash: &AdjustorHash) -> bool {
        self.records
            .get(adjustor_hash)
            .map(|r| r.status == AdjustorStatus::Archived)
            .unwrap_or(false)
    }

    pub fn hash_at(&self, idx: u64) -> Option<&AdjustorHash> {
        self.hash_list.get(&idx)
    }

    /// Active identifiers in allocation order.
    pub fn active_hashes(&self) -> Vec<&AdjustorHash> {
        self.hash_list
            .values()
            .filter(|h| self.is_active(h))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for AdjustorStore {
    fn default() -> Self {
        Self::new_in_memory()
    }
}
