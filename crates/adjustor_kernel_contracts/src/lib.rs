#![forbid(unsafe_code)]

pub mod adjustor;
pub mod audit;
pub mod common;

pub use common::{ContractViolation, MonotonicTimeNs, SchemaVersion, Validate};
