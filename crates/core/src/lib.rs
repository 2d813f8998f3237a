//! Device power/network conditions and job trigger gating.

pub mod conditions;
pub mod config;
pub mod environment;
pub mod runtime;
