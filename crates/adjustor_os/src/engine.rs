#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::{
    AdjustorCreateRequest, AdjustorHash, AdjustorOperation, AdjustorRecord, AdjustorRequest,
    AdjustorResponse, AdjustorRetireRequest, AdjustorStatus, AdjustorTransition,
    AdjustorUpdateRequest, Address, HashMapInfo,
};
use adjustor_kernel_contracts::audit::AdjustorLogEvent;
use adjustor_kernel_contracts::MonotonicTimeNs;
use adjustor_storage::hasher::AdjustorHasher;
use adjustor_storage::repo::AdjustorRecordRepo;
use adjustor_storage::store::StorageError;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::access::{AccessDecision, TrustAccessGate};
use crate::config::RegistryConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("caller {caller} is not the registry authority")]
    Unauthorized { caller: Address },
    #[error("adjustor {adjustor_hash} does not exist")]
    NotFound { adjustor_hash: AdjustorHash },
    #[error("adjustor {adjustor_hash} is not active")]
    NotActive { adjustor_hash: AdjustorHash },
    #[error("adjustor {adjustor_hash} is already archived")]
    AlreadyArchived { adjustor_hash: AdjustorHash },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("registry lock poisoned")]
    LockPoisoned,
}

/// Adjustor lifecycle engine: `Nonexistent -> Active -> Archived`.
///
/// Every mutation checks the gate first, then its state preconditions, and builds the full
/// replacement record and event list before the first write. A failed check leaves the store
/// untouched and emits nothing.
#[derive(Debug, Clone)]
pub struct AdjustorRuntime {
    gate: TrustAccessGate,
}

impl AdjustorRuntime {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            gate: TrustAccessGate::new(config.authority),
        }
    }

    pub fn gate(&self) -> &TrustAccessGate {
        &self.gate
    }

    pub fn run<S: AdjustorRecordRepo>(
        &self,
        store: &mut S,
        op: &AdjustorOperation,
    ) -> Result<AdjustorResponse, RegistryError> {
        match &op.request {
            AdjustorRequest::Create(r) => self
                .create(store, &op.caller, op.now, r)
                .map(AdjustorResponse::Transition),
            AdjustorRequest::Update(r) => self
                .update(store, &op.caller, op.now, r)
                .map(AdjustorResponse::Transition),
            AdjustorRequest::Retire(r) => self
                .retire(store, &op.caller, op.now, r)
                .map(AdjustorResponse::Transition),
            AdjustorRequest::IsActive { adjustor_hash } => Ok(AdjustorResponse::Flag(
                Self::is_active(store, adjustor_hash),
            )),
            AdjustorRequest::IsArchived { adjustor_hash } => Ok(AdjustorResponse::Flag(
                Self::is_archived(store, adjustor_hash),
            )),
            AdjustorRequest::DataStorage { adjustor_hash } => Ok(AdjustorResponse::Record(
                Self::data_storage(store, adjustor_hash),
            )),
            AdjustorRequest::HashMap => Ok(AdjustorResponse::HashMap(Self::hash_map(store))),
        }
    }

    pub fn create<S: AdjustorRecordRepo>(
        &self,
        store: &mut S,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorCreateRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        self.authorize(caller, "create")?;

        let idx = store.adjustor_counters_row().next_idx;
        let adjustor_hash = AdjustorHasher::derive(
            &req.owner,
            req.settlement_approval_amount_cu,
            req.policy_risk_point_limit,
            &req.service_agreement_hash,
            idx,
        );
        let record = AdjustorRecord::v1(
            adjustor_hash,
            idx,
            req.owner,
            req.settlement_approval_amount_cu,
            req.policy_risk_point_limit,
            req.service_agreement_hash,
            AdjustorStatus::Active,
            now,
            now,
        )
        .map_err(StorageError::from)?;
        let events = AdjustorLogEvent::terms_v1(
            adjustor_hash,
            req.owner,
            req.settlement_approval_amount_cu,
            req.policy_risk_point_limit,
            req.service_agreement_hash,
            now,
        )
        .map_err(StorageError::from)?;

        store.put_adjustor_row(record)?;
        store.advance_adjustor_index();
        store.increment_adjustor_active();

        let counters = store.adjustor_counters_row();
        info!(
            adjustor_hash = %adjustor_hash,
            idx,
            next_idx = counters.next_idx,
            count = counters.count,
            "adjustor created"
        );
        Ok(AdjustorTransition {
            adjustor_hash,
            events,
        })
    }

    pub fn update<S: AdjustorRecordRepo>(
        &self,
        store: &mut S,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorUpdateRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        self.authorize(caller, "update")?;

        let current = Self::existing_row(store, &req.adjustor_hash)?;
        if current.status != AdjustorStatus::Active {
            debug!(adjustor_hash = %req.adjustor_hash, "update rejected: not active");
            return Err(RegistryError::NotActive {
                adjustor_hash: req.adjustor_hash,
            });
        }
        let updated = current
            .with_terms(
                req.owner,
                req.settlement_approval_amount_cu,
                req.policy_risk_point_limit,
                req.service_agreement_hash,
                now,
            )
            .map_err(StorageError::from)?;
        let events = AdjustorLogEvent::terms_v1(
            req.adjustor_hash,
            req.owner,
            req.settlement_approval_amount_cu,
            req.policy_risk_point_limit,
            req.service_agreement_hash,
            now,
        )
        .map_err(StorageError::from)?;

        store.put_adjustor_row(updated)?;

        info!(adjustor_hash = %req.adjustor_hash, owner = %req.owner, "adjustor updated");
        Ok(AdjustorTransition {
            adjustor_hash: req.adjustor_hash,
            events,
        })
    }

    pub fn retire<S: AdjustorRecordRepo>(
        &self,
        store: &mut S,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorRetireRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        self.authorize(caller, "retire")?;

        let current = Self::existing_row(store, &req.adjustor_hash)?;
        if current.status == AdjustorStatus::Archived {
            debug!(adjustor_hash = %req.adjustor_hash, "retire rejected: already archived");
            return Err(RegistryError::AlreadyArchived {
                adjustor_hash: req.adjustor_hash,
            });
        }
        let archived = current.archived(now).map_err(StorageError::from)?;
        let event =
            AdjustorLogEvent::retired_v1(req.adjustor_hash, now).map_err(StorageError::from)?;

        store.put_adjustor_row(archived)?;
        store.decrement_adjustor_active();

        info!(
            adjustor_hash = %req.adjustor_hash,
            count = store.adjustor_counters_row().count,
            "adjustor retired"
        );
        Ok(AdjustorTransition {
            adjustor_hash: req.adjustor_hash,
            events: vec![event],
        })
    }

    pub fn is_active<S: AdjustorRecordRepo>(store: &S, adjustor_hash: &AdjustorHash) -> bool {
        store.adjustor_is_active_row(adjustor_hash)
    }

    pub fn is_archived<S: AdjustorRecordRepo>(store: &S, adjustor_hash: &AdjustorHash) -> bool {
        store.adjustor_is_archived_row(adjustor_hash)
    }

    pub fn data_storage<S: AdjustorRecordRepo>(
        store: &S,
        adjustor_hash: &AdjustorHash,
    ) -> Option<AdjustorRecord> {
        store.adjustor_row(adjustor_hash).ok().cloned()
    }

    pub fn hash_map<S: AdjustorRecordRepo>(store: &S) -> HashMapInfo {
        store.adjustor_counters_row()
    }

    fn authorize(&self, caller: &Address, operation: &'static str) -> Result<(), RegistryError> {
        match self.gate.authorize(caller) {
            AccessDecision::Allow => Ok(()),
            AccessDecision::Deny => {
                warn!(caller = %caller, operation, "adjustor mutation denied");
                Err(RegistryError::Unauthorized { caller: *caller })
            }
        }
    }

    fn existing_row<'a, S: AdjustorRecordRepo>(
        store: &'a S,
        adjustor_hash: &AdjustorHash,
    ) -> Result<&'a AdjustorRecord, RegistryError> {
        match store.adjustor_row(adjustor_hash) {
            Ok(row) => Ok(row),
            Err(StorageError::NotFound { .. }) => {
                debug!(adjustor_hash = %adjustor_hash, "adjustor not found");
                Err(RegistryError::NotFound {
                    adjustor_hash: *adjustor_hash,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
