#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::{
    AdjustorHash, AdjustorRecord, AdjustorStatus, Address, HashMapInfo, ServiceAgreementHash,
};
use adjustor_kernel_contracts::MonotonicTimeNs;
use adjustor_storage::hasher::AdjustorHasher;
use adjustor_storage::repo::AdjustorRecordRepo;
use adjustor_storage::store::{AdjustorStore, StorageError};

fn owner(b: u8) -> Address {
    Address::new([b; 20])
}

fn agreement(b: u8) -> ServiceAgreementHash {
    ServiceAgreementHash::new([b; 32])
}

fn insert_active(s: &mut AdjustorStore, o: Address, amount: u64, limit: u64) -> AdjustorHash {
    let idx = s.adjustor_counters_row().next_idx;
    let h = AdjustorHasher::derive(&o, amount, limit, &agreement(1), idx);
    s.put_adjustor_row(
        AdjustorRecord::v1(
            h,
            idx,
            o,
            amount,
            limit,
            agreement(1),
            AdjustorStatus::Active,
            MonotonicTimeNs(10),
            MonotonicTimeNs(10),
        )
        .unwrap(),
    )
    .unwrap();
    s.advance_adjustor_index();
    s.increment_adjustor_active();
    h
}

#[test]
fn at_registry_db_01_identical_terms_get_distinct_slots() {
    let mut s = AdjustorStore::new_in_memory();

    let a = insert_active(&mut s, owner(1), 1000, 5);
    let b = insert_active(&mut s, owner(1), 1000, 5);

    assert_ne!(a, b);
    assert_eq!(s.adjustor_hash_at_row(0), Some(&a));
    assert_eq!(s.adjustor_hash_at_row(1), Some(&b));
    assert_eq!(s.adjustor_hash_at_row(2), None);
    assert_eq!(s.adjustor_row(&a).unwrap().idx, 0);
    assert_eq!(s.adjustor_row(&b).unwrap().idx, 1);
    assert_eq!(
        s.adjustor_counters_row(),
        HashMapInfo {
            first_idx: 0,
            next_idx: 2,
            count: 2
        }
    );
}

#[test]
fn at_registry_db_02_archived_rows_stay_resolvable() {
    let mut s = AdjustorStore::new_in_memory();
    let a = insert_active(&mut s, owner(1), 1000, 5);

    let archived = s
        .adjustor_row(&a)
        .unwrap()
        .archived(MonotonicTimeNs(20))
        .unwrap();
    s.put_adjustor_row(archived).unwrap();
    s.decrement_adjustor_active();

    assert!(!s.adjustor_is_active_row(&a));
    assert!(s.adjustor_is_archived_row(&a));
    let row = s.adjustor_row(&a).unwrap();
    assert_eq!(row.owner, Address::ZERO);
    assert_eq!(row.settlement_approval_amount_cu, 0);
    assert_eq!(row.policy_risk_point_limit, 0);
    assert_eq!(s.adjustor_counters_row().count, 0);
    assert_eq!(s.adjustor_counters_row().next_idx, 1);
    assert_eq!(s.adjustor_hash_at_row(0), Some(&a));
}

#[test]
fn at_registry_db_03_active_listing_follows_allocation_order() {
    let mut s = AdjustorStore::new_in_memory();
    let a = insert_active(&mut s, owner(1), 1, 1);
    let b = insert_active(&mut s, owner(2), 2, 2);
    let c = insert_active(&mut s, owner(3), 3, 3);

    let archived = s
        .adjustor_row(&b)
        .unwrap()
        .archived(MonotonicTimeNs(11))
        .unwrap();
    s.put_adjustor_row(archived).unwrap();
    s.decrement_adjustor_active();

    assert_eq!(s.active_hashes(), vec![&a, &c]);
    assert_eq!(s.len(), 3);
}

#[test]
fn at_registry_db_04_unknown_rows_fail_closed() {
    let s = AdjustorStore::new_in_memory();
    let unknown = AdjustorHash::new([0x42; 32]);
    assert!(matches!(
        s.adjustor_row(&unknown),
        Err(StorageError::NotFound { .. })
    ));
    assert!(!s.adjustor_is_active_row(&unknown));
    assert!(!s.adjustor_is_archived_row(&unknown));
}
