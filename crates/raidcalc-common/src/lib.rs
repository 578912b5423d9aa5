//! raidcalc Common - Shared types and utilities
//!
//! This crate provides the error type, search configuration, and small value
//! types shared by the disk model and the arrangement search.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    ArrangedDisks, Constraints, DiskSpec, MissionConfig, SearchConfig, SearchLimits,
};
pub use error::{Error, Result};
pub use types::*;
