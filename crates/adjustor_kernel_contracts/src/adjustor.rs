#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::audit::AdjustorLogEvent;
use crate::common::decode_fixed_hex;
use crate::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};

pub const ADJUSTOR_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// 20-byte caller / owner identity. The all-zero address is the archived-owner sentinel.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(value: &str) -> Result<Self, ContractViolation> {
        decode_fixed_hex("address", value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// ABI-style word: the address right-aligned in 32 bytes.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl TryFrom<String> for Address {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.to_string()
    }
}

/// Registry identifier of an Adjustor, assigned once at creation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AdjustorHash([u8; 32]);

impl AdjustorHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(value: &str) -> Result<Self, ContractViolation> {
        decode_fixed_hex("adjustor_hash", value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Validate for AdjustorHash {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == [0u8; 32] {
            return Err(ContractViolation::InvalidValue {
                field: "adjustor_hash",
                reason: "must not be the zero hash",
            });
        }
        Ok(())
    }
}

impl fmt::Display for AdjustorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AdjustorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AdjustorHash({self})")
    }
}

impl TryFrom<String> for AdjustorHash {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<AdjustorHash> for String {
    fn from(value: AdjustorHash) -> Self {
        value.to_string()
    }
}

/// Reference to the off-registry service agreement. Zero when archived.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceAgreementHash([u8; 32]);

impl ServiceAgreementHash {
    pub const ZERO: ServiceAgreementHash = ServiceAgreementHash([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(value: &str) -> Result<Self, ContractViolation> {
        decode_fixed_hex("service_agreement_hash", value).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for ServiceAgreementHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ServiceAgreementHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceAgreementHash({self})")
    }
}

impl TryFrom<String> for ServiceAgreementHash {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ServiceAgreementHash> for String {
    fn from(value: ServiceAgreementHash) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustorStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorRecord {
    pub schema_version: SchemaVersion,
    pub adjustor_hash: AdjustorHash,
    pub idx: u64,
    pub owner: Address,
    pub settlement_approval_amount_cu: u64,
    pub policy_risk_point_limit: u64,
    pub service_agreement_hash: ServiceAgreementHash,
    pub status: AdjustorStatus,
    pub created_at: MonotonicTimeNs,
    pub updated_at: MonotonicTimeNs,
}

impl AdjustorRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn v1(
        adjustor_hash: AdjustorHash,
        idx: u64,
        owner: Address,
        settlement_approval_amount_cu: u64,
        policy_risk_point_limit: u64,
        service_agreement_hash: ServiceAgreementHash,
        status: AdjustorStatus,
        created_at: MonotonicTimeNs,
        updated_at: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: ADJUSTOR_CONTRACT_VERSION,
            adjustor_hash,
            idx,
            owner,
            settlement_approval_amount_cu,
            policy_risk_point_limit,
            service_agreement_hash,
            status,
            created_at,
            updated_at,
        };
        r.validate()?;
        Ok(r)
    }

    /// Copy of this record with the mutable fields replaced. Status and identity are kept.
    pub fn with_terms(
        &self,
        owner: Address,
        settlement_approval_amount_cu: u64,
        policy_risk_point_limit: u64,
        service_agreement_hash: ServiceAgreementHash,
        now: MonotonicTimeNs,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            owner,
            settlement_approval_amount_cu,
            policy_risk_point_limit,
            service_agreement_hash,
            updated_at: now,
            ..self.clone()
        };
        r.validate()?;
        Ok(r)
    }

    /// Canonical archived form: zero owner, zero amounts, zero agreement.
    pub fn archived(&self, now: MonotonicTimeNs) -> Result<Self, ContractViolation> {
        let r = Self {
            owner: Address::ZERO,
            settlement_approval_amount_cu: 0,
            policy_risk_point_limit: 0,
            service_agreement_hash: ServiceAgreementHash::ZERO,
            status: AdjustorStatus::Archived,
            updated_at: now,
            ..self.clone()
        };
        r.validate()?;
        Ok(r)
    }

    pub fn is_active(&self) -> bool {
        self.status == AdjustorStatus::Active
    }
}

impl Validate for AdjustorRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ADJUSTOR_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "adjustor_record.schema_version",
                reason: "must match ADJUSTOR_CONTRACT_VERSION",
            });
        }
        self.adjustor_hash.validate()?;
        if self.status == AdjustorStatus::Archived
            && (!self.owner.is_zero()
                || self.settlement_approval_amount_cu != 0
                || self.policy_risk_point_limit != 0
                || !self.service_agreement_hash.is_zero())
        {
            return Err(ContractViolation::InvalidValue {
                field: "adjustor_record.status",
                reason: "archived record must carry empty sentinel values",
            });
        }
        Ok(())
    }
}

/// Aggregate counters over the registry, as returned by `hashMap()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashMapInfo {
    pub first_idx: u64,
    pub next_idx: u64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorCreateRequest {
    pub owner: Address,
    pub settlement_approval_amount_cu: u64,
    pub policy_risk_point_limit: u64,
    pub service_agreement_hash: ServiceAgreementHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorUpdateRequest {
    pub adjustor_hash: AdjustorHash,
    pub owner: Address,
    pub settlement_approval_amount_cu: u64,
    pub policy_risk_point_limit: u64,
    pub service_agreement_hash: ServiceAgreementHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorRetireRequest {
    pub adjustor_hash: AdjustorHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AdjustorRequest {
    Create(AdjustorCreateRequest),
    Update(AdjustorUpdateRequest),
    Retire(AdjustorRetireRequest),
    IsActive { adjustor_hash: AdjustorHash },
    IsArchived { adjustor_hash: AdjustorHash },
    DataStorage { adjustor_hash: AdjustorHash },
    HashMap,
}

impl AdjustorRequest {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            AdjustorRequest::Create(_) | AdjustorRequest::Update(_) | AdjustorRequest::Retire(_)
        )
    }
}

/// One invocation as delivered by the host: attested caller, host timestamp, request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorOperation {
    pub caller: Address,
    pub now: MonotonicTimeNs,
    pub request: AdjustorRequest,
}

/// Result of a committed mutation: the target identifier and the events it emitted, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustorTransition {
    pub adjustor_hash: AdjustorHash,
    pub events: Vec<AdjustorLogEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AdjustorResponse {
    Transition(AdjustorTransition),
    Flag(bool),
    Record(Option<AdjustorRecord>),
    HashMap(HashMapInfo),
}
