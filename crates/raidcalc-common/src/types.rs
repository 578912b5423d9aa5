//! Core type definitions for raidcalc
//!
//! Units used across the workspace: capacities in bytes, speeds in bytes per
//! second, durations in hours, probabilities in `[0, 1]`, and costs in a
//! single unnamed currency.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Hours in a (non-leap) year, used to turn an annual rate into an hourly one
pub const HOURS_PER_YEAR: f64 = 365.0 * 24.0;

/// Seconds in an hour
pub const SECONDS_PER_HOUR: f64 = 60.0 * 60.0;

/// Kind of disk, which selects the defaults for unspecified parameters
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "lowercase")]
pub enum DiskKind {
    /// Spinning hard disk drive
    #[default]
    #[display("HDD")]
    Hdd,
    /// Solid state drive
    #[display("SSD")]
    Ssd,
}

impl DiskKind {
    /// Default sequential speed in bytes per second
    #[must_use]
    pub const fn default_speed(self) -> u64 {
        match self {
            Self::Hdd => 100_000_000,
            Self::Ssd => 300_000_000,
        }
    }

    /// Default annual failure rate
    #[must_use]
    pub const fn default_afr(self) -> f64 {
        match self {
            Self::Hdd => 0.12,
            Self::Ssd => 0.01,
        }
    }

    /// Default acquisition cost
    #[must_use]
    pub const fn default_cost(self) -> f64 {
        100.0
    }

    /// Default hours from failure until a replacement is installed
    #[must_use]
    pub const fn default_replacement_time(self) -> f64 {
        72.0
    }
}
