#![forbid(unsafe_code)]

use adjustor_kernel_contracts::adjustor::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessDecision {
    Allow,
    Deny,
}

/// Single-authority gate in front of every registry mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrustAccessGate {
    authority: Address,
}

impl TrustAccessGate {
    pub fn new(authority: Address) -> Self {
        Self { authority }
    }

    pub fn authority(&self) -> Address {
        self.authority
    }

    pub fn authorize(&self, caller: &Address) -> AccessDecision {
        if !caller.is_zero() && *caller == self.authority {
            AccessDecision::Allow
        } else {
            AccessDecision::Deny
        }
    }
}
