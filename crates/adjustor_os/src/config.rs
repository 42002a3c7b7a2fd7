#![forbid(unsafe_code)]

use std::env;

use adjustor_kernel_contracts::adjustor::Address;
use adjustor_kernel_contracts::ContractViolation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ADJUSTOR_TRUST_AUTHORITY_ENV: &str = "ADJUSTOR_TRUST_AUTHORITY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{var}: {violation}")]
    Invalid {
        var: &'static str,
        violation: ContractViolation,
    },
}

/// Registry configuration. The authority is the only identity allowed to mutate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub authority: Address,
}

impl RegistryConfig {
    pub fn v1(authority: Address) -> Result<Self, ConfigError> {
        if authority.is_zero() {
            return Err(ConfigError::Invalid {
                var: "authority",
                violation: ContractViolation::InvalidValue {
                    field: "registry_config.authority",
                    reason: "must not be the empty address",
                },
            });
        }
        Ok(Self { authority })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_var_map(|key| env::var(key).ok())
    }

    pub fn from_env_var_map<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ADJUSTOR_TRUST_AUTHORITY_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ADJUSTOR_TRUST_AUTHORITY_ENV))?;
        let authority = Address::from_hex(&raw).map_err(|violation| ConfigError::Invalid {
            var: ADJUSTOR_TRUST_AUTHORITY_ENV,
            violation,
        })?;
        Self::v1(authority)
    }
}
