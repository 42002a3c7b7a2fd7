#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::{AdjustorHash, AdjustorRecord, HashMapInfo};
use adjustor_kernel_contracts::audit::{AdjustorLogEvent, AdjustorLogRecord, OperationSeq};

use crate::audit_log::AdjustorAuditLog;
use crate::store::{AdjustorStore, StorageError};

/// Typed repository interface for the Adjustor current-state table and its counters.
pub trait AdjustorRecordRepo {
    fn adjustor_row(&self, adjustor_hash: &AdjustorHash) -> Result<&AdjustorRecord, StorageError>;
    fn put_adjustor_row(&mut self, record: AdjustorRecord) -> Result<(), StorageError>;
    fn adjustor_counters_row(&self) -> HashMapInfo;
    fn advance_adjustor_index(&mut self);
    fn increment_adjustor_active(&mut self);
    fn decrement_adjustor_active(&mut self);
    fn adjustor_is_active_row(&self, adjustor_hash: &AdjustorHash) -> bool;
    fn adjustor_is_archived_row(&self, adjustor_hash: &AdjustorHash) -> bool;
    fn adjustor_hash_at_row(&self, idx: u64) -> Option<&AdjustorHash>;
}

/// Typed repository interface for the Adjustor audit ledger.
pub trait AdjustorAuditRepo {
    fn append_adjustor_audit_rows(
        &mut self,
        events: &[AdjustorLogEvent],
    ) -> Result<OperationSeq, StorageError>;
    fn adjustor_audit_rows(&self) -> &[AdjustorLogRecord];
    fn adjustor_audit_rows_for_adjustor(
        &self,
        adjustor_hash: &AdjustorHash,
    ) -> Vec<&AdjustorLogRecord>;
}

impl AdjustorRecordRepo for AdjustorStore {
    fn adjustor_row(&self, adjustor_hash: &AdjustorHash) -> Result<&AdjustorRecord, StorageError> {
        self.get(adjustor_hash)
    }

    fn put_adjustor_row(&mut self, record: AdjustorRecord) -> Result<(), StorageError> {
        self.put(record)
    }

    fn adjustor_counters_row(&self) -> HashMapInfo {
        self.counters_view()
    }

    fn advance_adjustor_index(&mut self) {
        self.advance_index()
    }

    fn increment_adjustor_active(&mut self) {
        self.increment_active()
    }

    fn decrement_adjustor_active(&mut self) {
        self.decrement_active()
    }

    fn adjustor_is_active_row(&self, adjustor_hash: &AdjustorHash) -> bool {
        self.is_active(adjustor_hash)
    }

    fn adjustor_is_archived_row(&self, adjustor_hash: &AdjustorHash) -> bool {
        self.is_archived(adjustor_hash)
    }

    fn adjustor_hash_at_row(&self, idx: u64) -> Option<&AdjustorHash> {
        self.hash_at(idx)
    }
}

impl AdjustorAuditRepo for AdjustorAuditLog {
    fn append_adjustor_audit_rows(
        &mut self,
        events: &[AdjustorLogEvent],
    ) -> Result<OperationSeq, StorageError> {
        self.append_operation(events)
    }

    fn adjustor_audit_rows(&self) -> &[AdjustorLogRecord] {
        self.events()
    }

    fn adjustor_audit_rows_for_adjustor(
        &self,
        adjustor_hash: &AdjustorHash,
    ) -> Vec<&AdjustorLogRecord> {
        self.events_for_adjustor(adjustor_hash)
    }
}
