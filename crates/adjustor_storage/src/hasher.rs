#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::{AdjustorHash, Address, ServiceAgreementHash};
use adjustor_kernel_contracts::common::u64_word;
use sha2::{Digest, Sha256};

/// Derives Adjustor identifiers from creation inputs.
///
/// The preimage is five 32-byte words: owner, settlement approval amount, policy risk point
/// limit, service agreement hash, allocation index. The index makes two creations with identical
/// terms land on distinct identifiers.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdjustorHasher;

impl AdjustorHasher {
    pub fn derive(
        owner: &Address,
        settlement_approval_amount_cu: u64,
        policy_risk_point_limit: u64,
        service_agreement_hash: &ServiceAgreementHash,
        idx: u64,
    ) -> AdjustorHash {
        let mut hasher = Sha256::new();
        hasher.update(owner.to_word());
        hasher.update(u64_word(settlement_approval_amount_cu));
        hasher.update(u64_word(policy_risk_point_limit));
        hasher.update(service_agreement_hash.as_bytes());
        hasher.update(u64_word(idx));
        AdjustorHash::new(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive_at(idx: u64) -> AdjustorHash {
        AdjustorHasher::derive(
            &Address::new([1; 20]),
            1000,
            5,
            &ServiceAgreementHash::new([2; 32]),
            idx,
        )
    }

    #[test]
    fn at_hasher_01_deterministic() {
        assert_eq!(derive_at(0), derive_at(0));
    }

    #[test]
    fn at_hasher_02_allocation_index_separates_identical_terms() {
        assert_ne!(derive_at(0), derive_at(1));
    }

    #[test]
    fn at_hasher_03_every_input_is_bound() {
        let base = derive_at(0);
        let owner = AdjustorHasher::derive(
            &Address::new([3; 20]),
            1000,
            5,
            &ServiceAgreementHash::new([2; 32]),
            0,
        );
        let amount = AdjustorHasher::derive(
            &Address::new([1; 20]),
            1001,
            5,
            &ServiceAgreementHash::new([2; 32]),
            0,
        );
        let limit = AdjustorHasher::derive(
            &Address::new([1; 20]),
            1000,
            6,
            &ServiceAgreementHash::new([2; 32]),
            0,
        );
        let agreement = AdjustorHasher::derive(
            &Address::new([1; 20]),
            1000,
            5,
            &ServiceAgreementHash::new([4; 32]),
            0,
        );
        for other in [owner, amount, limit, agreement] {
            assert_ne!(base, other);
        }
    }
}
