#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::adjustor::{AdjustorHash, Address, ServiceAgreementHash};
use crate::common::u64_word;
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};

pub const ADJUSTOR_AUDIT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuditEventId(pub u64);

impl Validate for AuditEventId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "audit_event_id",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// Sequence number of the committed operation that produced a group of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationSeq(pub u64);

impl Validate for OperationSeq {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "operation_seq",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustorLogKind {
    SettlementApprovalAmount,
    PolicyRiskPointLimit,
    ServiceAgreement,
    Retired,
}

/// Info slot of an Adjustor log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AdjustorLogInfo {
    SettlementApprovalAmount(u64),
    PolicyRiskPointLimit(u64),
    ServiceAgreement(ServiceAgreementHash),
    Retired,
}

impl AdjustorLogInfo {
    pub fn kind(&self) -> AdjustorLogKind {
        match self {
            AdjustorLogInfo::SettlementApprovalAmount(_) => {
                AdjustorLogKind::SettlementApprovalAmount
            }
            AdjustorLogInfo::PolicyRiskPointLimit(_) => AdjustorLogKind::PolicyRiskPointLimit,
            AdjustorLogInfo::ServiceAgreement(_) => AdjustorLogKind::ServiceAgreement,
            AdjustorLogInfo::Retired => AdjustorLogKind::Retired,
        }
    }

    /// The 32-byte info word: integers big-endian left-padded, hashes verbatim, retire all zero.
    pub fn to_word(&self) -> [u8; 32] {
        match self {
            AdjustorLogInfo::SettlementApprovalAmount(v)
            | AdjustorLogInfo::PolicyRiskPointLimit(v) => u64_word(*v),
            AdjustorLogInfo::ServiceAgreement(h) => *h.as_bytes(),
            AdjustorLogInfo::Retired => [0u8; 32],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorLogEvent {
    pub schema_version: SchemaVersion,
    pub adjustor_hash: AdjustorHash,
    pub owner: Address,
    pub info: AdjustorLogInfo,
    pub timestamp: MonotonicTimeNs,
}

impl AdjustorLogEvent {
    pub fn v1(
        adjustor_hash: AdjustorHash,
        owner: Address,
        info: AdjustorLogInfo,
        timestamp: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let ev = Self {
            schema_version: ADJUSTOR_AUDIT_CONTRACT_VERSION,
            adjustor_hash,
            owner,
            info,
            timestamp,
        };
        ev.validate()?;
        Ok(ev)
    }

    /// The three events a create or update emits, in consumer order.
    pub fn terms_v1(
        adjustor_hash: AdjustorHash,
        owner: Address,
        settlement_approval_amount_cu: u64,
        policy_risk_point_limit: u64,
        service_agreement_hash: ServiceAgreementHash,
        timestamp: MonotonicTimeNs,
    ) -> Result<Vec<Self>, ContractViolation> {
        Ok(vec![
            Self::v1(
                adjustor_hash,
                owner,
                AdjustorLogInfo::SettlementApprovalAmount(settlement_approval_amount_cu),
                timestamp,
            )?,
            Self::v1(
                adjustor_hash,
                owner,
                AdjustorLogInfo::PolicyRiskPointLimit(policy_risk_point_limit),
                timestamp,
            )?,
            Self::v1(
                adjustor_hash,
                owner,
                AdjustorLogInfo::ServiceAgreement(service_agreement_hash),
                timestamp,
            )?,
        ])
    }

    pub fn retired_v1(
        adjustor_hash: AdjustorHash,
        timestamp: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        Self::v1(
            adjustor_hash,
            Address::ZERO,
            AdjustorLogInfo::Retired,
            timestamp,
        )
    }
}

impl Validate for AdjustorLogEvent {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ADJUSTOR_AUDIT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "adjustor_log_event.schema_version",
                reason: "must match ADJUSTOR_AUDIT_CONTRACT_VERSION",
            });
        }
        self.adjustor_hash.validate()?;
        if self.info == AdjustorLogInfo::Retired && !self.owner.is_zero() {
            return Err(ContractViolation::InvalidValue {
                field: "adjustor_log_event.owner",
                reason: "retire event must carry the empty owner",
            });
        }
        Ok(())
    }
}

/// A log event as persisted: numbered and tied to the operation that emitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorLogRecord {
    pub event_id: AuditEventId,
    pub operation_seq: OperationSeq,
    pub event: AdjustorLogEvent,
}

impl AdjustorLogRecord {
    pub fn from_event_v1(
        event_id: AuditEventId,
        operation_seq: OperationSeq,
        event: AdjustorLogEvent,
    ) -> Result<Self, ContractViolation> {
        event_id.validate()?;
        operation_seq.validate()?;
        event.validate()?;
        Ok(Self {
            event_id,
            operation_seq,
            event,
        })
    }
}
