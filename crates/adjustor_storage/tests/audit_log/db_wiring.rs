#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::{AdjustorHash, Address, ServiceAgreementHash};
use adjustor_kernel_contracts::audit::{
    AdjustorLogEvent, AdjustorLogKind, AuditEventId, OperationSeq,
};
use adjustor_kernel_contracts::MonotonicTimeNs;
use adjustor_storage::audit_log::AdjustorAuditLog;
use adjustor_storage::repo::AdjustorAuditRepo;
use adjustor_storage::store::StorageError;

fn hash(b: u8) -> AdjustorHash {
    AdjustorHash::new([b; 32])
}

fn terms(h: AdjustorHash, t: u64) -> Vec<AdjustorLogEvent> {
    AdjustorLogEvent::terms_v1(
        h,
        Address::new([7; 20]),
        1000,
        5,
        ServiceAgreementHash::new([8; 32]),
        MonotonicTimeNs(t),
    )
    .unwrap()
}

#[test]
fn at_audit_log_db_01_operation_groups_keep_emission_order() {
    let mut log = AdjustorAuditLog::new_in_memory();

    let first = log.append_adjustor_audit_rows(&terms(hash(1), 10)).unwrap();
    let retire = AdjustorLogEvent::retired_v1(hash(1), MonotonicTimeNs(11)).unwrap();
    let second = log.append_adjustor_audit_rows(&[retire]).unwrap();

    assert_eq!(first, OperationSeq(1));
    assert_eq!(second, OperationSeq(2));

    let rows = log.adjustor_audit_rows();
    assert_eq!(rows.len(), 4);
    let ids: Vec<u64> = rows.iter().map(|r| r.event_id.0).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    let kinds: Vec<AdjustorLogKind> = log
        .events_for_operation(first)
        .iter()
        .map(|r| r.event.info.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            AdjustorLogKind::SettlementApprovalAmount,
            AdjustorLogKind::PolicyRiskPointLimit,
            AdjustorLogKind::ServiceAgreement,
        ]
    );
    assert_eq!(log.events_for_operation(second).len(), 1);
}

#[test]
fn at_audit_log_db_02_append_only_enforced() {
    let mut log = AdjustorAuditLog::new_in_memory();
    log.append_adjustor_audit_rows(&terms(hash(1), 10)).unwrap();

    assert!(matches!(
        log.attempt_overwrite_event(AuditEventId(1)),
        Err(StorageError::AppendOnlyViolation { .. })
    ));
    assert_eq!(log.adjustor_audit_rows().len(), 3);
}

#[test]
fn at_audit_log_db_03_empty_batch_rejected_without_side_effects() {
    let mut log = AdjustorAuditLog::new_in_memory();
    assert!(matches!(
        log.append_adjustor_audit_rows(&[]),
        Err(StorageError::ContractViolation(_))
    ));
    assert!(log.adjustor_audit_rows().is_empty());

    // Sequence numbering is unaffected by the rejected batch.
    let seq = log.append_adjustor_audit_rows(&terms(hash(2), 1)).unwrap();
    assert_eq!(seq, OperationSeq(1));
}

#[test]
fn at_audit_log_db_04_rows_filter_by_adjustor() {
    let mut log = AdjustorAuditLog::new_in_memory();
    log.append_adjustor_audit_rows(&terms(hash(1), 10)).unwrap();
    log.append_adjustor_audit_rows(&terms(hash(2), 11)).unwrap();

    assert_eq!(log.adjustor_audit_rows_for_adjustor(&hash(1)).len(), 3);
    assert_eq!(log.adjustor_audit_rows_for_adjustor(&hash(2)).len(), 3);
    assert!(log.adjustor_audit_rows_for_adjustor(&hash(3)).is_empty());
}
