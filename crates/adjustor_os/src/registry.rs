#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex};

use adjustor_kernel_contracts::adjustor::{
    AdjustorCreateRequest, AdjustorOperation, AdjustorResponse, AdjustorRetireRequest,
    AdjustorTransition, AdjustorUpdateRequest, Address,
};
use adjustor_kernel_contracts::MonotonicTimeNs;
use adjustor_storage::audit_log::AdjustorAuditLog;
use adjustor_storage::repo::AdjustorAuditRepo;
use adjustor_storage::store::AdjustorStore;

use crate::config::RegistryConfig;
use crate::engine::{AdjustorRuntime, RegistryError};

/// Owned registry aggregate: current-state store, audit ledger, and the engine that mutates them.
#[derive(Debug, Clone)]
pub struct AdjustorRegistry {
    runtime: AdjustorRuntime,
    store: AdjustorStore,
    audit_log: AdjustorAuditLog,
}

impl AdjustorRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            runtime: AdjustorRuntime::new(config),
            store: AdjustorStore::new_in_memory(),
            audit_log: AdjustorAuditLog::new_in_memory(),
        }
    }

    /// Runs one operation; committed transitions are appended to the audit ledger.
    pub fn apply(&mut self, op: &AdjustorOperation) -> Result<AdjustorResponse, RegistryError> {
        let out = self.runtime.run(&mut self.store, op)?;
        if let AdjustorResponse::Transition(t) = &out {
            self.audit_log.append_adjustor_audit_rows(&t.events)?;
        }
        Ok(out)
    }

    pub fn create(
        &mut self,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorCreateRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        let t = self.runtime.create(&mut self.store, caller, now, req)?;
        self.record(t)
    }

    pub fn update(
        &mut self,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorUpdateRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        let t = self.runtime.update(&mut self.store, caller, now, req)?;
        self.record(t)
    }

    pub fn retire(
        &mut self,
        caller: &Address,
        now: MonotonicTimeNs,
        req: &AdjustorRetireRequest,
    ) -> Result<AdjustorTransition, RegistryError> {
        let t = self.runtime.retire(&mut self.store, caller, now, req)?;
        self.record(t)
    }

    pub fn store(&self) -> &AdjustorStore {
        &self.store
    }

    pub fn audit_log(&self) -> &AdjustorAuditLog {
        &self.audit_log
    }

    pub fn authority(&self) -> Address {
        self.runtime.gate().authority()
    }

    fn record(&mut self, t: AdjustorTransition) -> Result<AdjustorTransition, RegistryError> {
        self.audit_log.append_adjustor_audit_rows(&t.events)?;
        Ok(t)
    }
}

/// Thread-safe handle. A single writer lock serializes every operation end to end.
#[derive(Debug, Clone)]
pub struct SharedAdjustorRegistry {
    inner: Arc<Mutex<AdjustorRegistry>>,
}

impl SharedAdjustorRegistry {
    pub fn new(registry: AdjustorRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    pub fn apply(&self, op: &AdjustorOperation) -> Result<AdjustorResponse, RegistryError> {
        let mut registry = self.inner.lock().map_err(|_| RegistryError::LockPoisoned)?;
        registry.apply(op)
    }

    pub fn read<T, F>(&self, f: F) -> Result<T, RegistryError>
    where
        F: FnOnce(&AdjustorRegistry) -> T,
    {
        let registry = self.inner.lock().map_err(|_| RegistryError::LockPoisoned)?;
        Ok(f(&registry))
    }
}
