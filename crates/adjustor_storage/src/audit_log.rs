#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::AdjustorHash;
use adjustor_kernel_contracts::audit::{
    AdjustorLogEvent, AdjustorLogRecord, AuditEventId, OperationSeq,
};
use adjustor_kernel_contracts::{ContractViolation, Validate};

use crate::store::StorageError;

/// Append-only ledger of Adjustor log events.
///
/// Events are appended per committed operation; every event of one operation shares an
/// `OperationSeq` and keeps its emission order.
#[derive(Debug, Clone)]
pub struct AdjustorAuditLog {
    events: Vec<AdjustorLogRecord>,
    next_event_id: u64,
    next_operation_seq: u64,
}

impl AdjustorAuditLog {
    pub fn new_in_memory() -> Self {
        Self {
            events: Vec::new(),
            next_event_id: 1,
            next_operation_seq: 1,
        }
    }

    pub fn append_operation(
        &mut self,
        events: &[AdjustorLogEvent],
    ) -> Result<OperationSeq, StorageError> {
        if events.is_empty() {
            return Err(StorageError::ContractViolation(
                ContractViolation::InvalidValue {
                    field: "adjustor_audit_log.events",
                    reason: "an operation must emit at least one event",
                },
            ));
        }
        // Validate the whole batch before the first write.
        for ev in events {
            ev.validate()?;
        }

        let operation_seq = OperationSeq(self.next_operation_seq);
        self.next_operation_seq = self.next_operation_seq.saturating_add(1);

        for ev in events {
            let event_id = AuditEventId(self.next_event_id);
            self.next_event_id = self.next_event_id.saturating_add(1);
            self.events.push(AdjustorLogRecord::from_event_v1(
                event_id,
                operation_seq,
                ev.clone(),
            )?);
        }
        Ok(operation_seq)
    }

    pub fn events(&self) -> &[AdjustorLogRecord] {
        &self.events
    }

    pub fn events_for_adjustor(&self, adjustor_hash: &AdjustorHash) -> Vec<&AdjustorLogRecord> {
        self.events
            .iter()
            .filter(|r| &r.event.adjustor_hash == adjustor_hash)
            .collect()
    }

    pub fn events_for_operation(&self, operation_seq: OperationSeq) -> Vec<&AdjustorLogRecord> {
        self.events
            .iter()
            .filter(|r| r.operation_seq == operation_seq)
            .collect()
    }

    pub fn attempt_overwrite_event(
        &mut self,
        _event_id: AuditEventId,
    ) -> Result<(), StorageError> {
        Err(StorageError::AppendOnlyViolation {
            table: "adjustor_audit_events",
        })
    }
}

impl Default for AdjustorAuditLog {
    fn default() -> Self {
        Self::new_in_memory()
    }
}
