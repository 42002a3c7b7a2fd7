#![forbid(unsafe_code)]

pub mod audit_log;
pub mod hasher;
pub mod repo;
pub mod store;
