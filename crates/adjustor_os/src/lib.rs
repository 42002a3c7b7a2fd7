#![forbid(unsafe_code)]

pub mod access;
pub mod config;
pub mod engine;
pub mod registry;
