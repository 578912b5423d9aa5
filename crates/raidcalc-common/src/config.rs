//! Configuration types for raidcalc
//!
//! This module defines the search configuration: the disk catalog (or a fixed
//! arrangement), the constraints a configuration must satisfy, the mission
//! length, and the limits that bound the combinatorial search.

use crate::error::{Error, Result};
use crate::types::DiskKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Prefix for environment overrides, e.g. `RAIDCALC__MISSION__YEARS=5`
pub const ENV_PREFIX: &str = "RAIDCALC";

/// Root configuration for a search run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Planning horizon
    pub mission: MissionConfig,
    /// Constraints every accepted configuration must meet
    pub constraints: Constraints,
    /// Acceptable probability of losing the pool over the whole mission.
    /// When set, this replaces `constraints.max_annual_failure`.
    pub max_mission_loss: Option<f64>,
    /// Bounds on the combinatorial search
    pub limits: SearchLimits,
    /// Disks that may be acquired
    pub catalog: Vec<DiskSpec>,
    /// Fixed set of disks to arrange instead of searching the catalog
    pub arrangement: Vec<ArrangedDisks>,
}

impl SearchConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    /// `Deserialization` for malformed TOML, `Configuration` if the values
    /// fail validation.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, layered under `RAIDCALC__*` environment
    /// overrides
    ///
    /// # Errors
    /// `Configuration` if the file cannot be read or parsed, or the values
    /// fail validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path.as_ref()).format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file if it exists, falling back to defaults when
    /// it is missing or unusable
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Ignoring configuration at {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Constraints with `max_mission_loss` applied, if set
    #[must_use]
    pub fn effective_constraints(&self) -> Constraints {
        let mut constraints = self.constraints.clone();
        if let Some(loss) = self.max_mission_loss {
            constraints.max_annual_failure =
                Constraints::max_annual_failure_for_mission(loss, self.mission.years);
        }
        constraints
    }

    /// Check that the configuration describes a meaningful search
    ///
    /// # Errors
    /// `Configuration` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.mission.validate()?;
        self.constraints.validate()?;
        if let Some(loss) = self.max_mission_loss {
            if !(0.0..1.0).contains(&loss) {
                return Err(Error::configuration(format!(
                    "max_mission_loss must be in [0, 1), got {loss}"
                )));
            }
        }
        if self.limits.max_disks == 0 {
            return Err(Error::configuration("limits.max_disks must be > 0"));
        }
        if let Some(spec) = self.catalog.iter().find(|d| d.name.is_empty()) {
            return Err(Error::configuration(format!(
                "catalog entry with capacity {} has no name",
                spec.capacity
            )));
        }
        Ok(())
    }
}

/// Planning horizon configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// How long the pool is kept running, in years
    pub years: f64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self { years: 3.0 }
    }
}

impl MissionConfig {
    fn validate(&self) -> Result<()> {
        if self.years.is_finite() && self.years > 0.0 {
            Ok(())
        } else {
            Err(Error::configuration(format!(
                "mission.years must be > 0, got {}",
                self.years
            )))
        }
    }
}

/// Constraints on accepted configurations
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Minimum usable capacity in bytes
    pub min_capacity: u64,
    /// Minimum read throughput in bytes per second
    pub min_read_throughput: u64,
    /// Minimum write throughput in bytes per second
    pub min_write_throughput: u64,
    /// Maximum probability of losing the pool in a year
    pub max_annual_failure: f64,
    /// Maximum total acquisition cost of the disks
    pub max_cost: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_capacity: 1_000_000_000_000, // 1 TB
            min_read_throughput: 0,
            min_write_throughput: 0,
            max_annual_failure: 0.0001,
            max_cost: 5000.0,
        }
    }
}

impl Constraints {
    /// Annual failure rate that compounds to `max_mission_loss` over `years`
    #[must_use]
    pub fn max_annual_failure_for_mission(max_mission_loss: f64, years: f64) -> f64 {
        1.0 - (1.0 - max_mission_loss).powf(1.0 / years)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.max_annual_failure) {
            return Err(Error::configuration(format!(
                "constraints.max_annual_failure must be in [0, 1], got {}",
                self.max_annual_failure
            )));
        }
        if self.max_cost.is_nan() || self.max_cost < 0.0 {
            return Err(Error::configuration(format!(
                "constraints.max_cost must be >= 0, got {}",
                self.max_cost
            )));
        }
        Ok(())
    }
}

/// Bounds on the combinatorial search
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    /// Maximum number of disks in one selection
    pub max_disks: usize,
    /// Maximum number of selections the enumerator may emit
    pub max_selections: usize,
    /// Maximum number of groupings the assembler may evaluate
    pub max_candidates: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_disks: 32,
            max_selections: 1_000_000,
            max_candidates: 5_000_000,
        }
    }
}

impl SearchLimits {
    /// Limits with no cap on selection or candidate counts.
    ///
    /// `max_disks` keeps its default so a catalog with free disks still
    /// terminates.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_selections: usize::MAX,
            max_candidates: usize::MAX,
            ..Self::default()
        }
    }
}

/// Catalog entry for a disk model
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiskSpec {
    /// Friendly name for display purposes
    pub name: String,
    /// Disk kind, which selects defaults for absent fields
    #[serde(default)]
    pub kind: DiskKind,
    /// Size in bytes
    pub capacity: u64,
    /// Sequential speed in bytes per second
    #[serde(default)]
    pub speed: Option<u64>,
    /// Annual failure rate in `[0, 1)`
    #[serde(default)]
    pub afr: Option<f64>,
    /// Acquisition cost
    #[serde(default)]
    pub cost: Option<f64>,
    /// Hours from failure until a replacement is installed
    #[serde(default)]
    pub replacement_time: Option<f64>,
}

impl DiskSpec {
    /// Create an entry that takes every optional field from `kind`
    pub fn new(name: impl Into<String>, kind: DiskKind, capacity: u64) -> Self {
        Self {
            name: name.into(),
            kind,
            capacity,
            speed: None,
            afr: None,
            cost: None,
            replacement_time: None,
        }
    }

    /// Speed, or the kind's default
    #[must_use]
    pub fn resolved_speed(&self) -> u64 {
        self.speed.unwrap_or_else(|| self.kind.default_speed())
    }

    /// Annual failure rate, or the kind's default
    #[must_use]
    pub fn resolved_afr(&self) -> f64 {
        self.afr.unwrap_or_else(|| self.kind.default_afr())
    }

    /// Cost, or the kind's default
    #[must_use]
    pub fn resolved_cost(&self) -> f64 {
        self.cost.unwrap_or_else(|| self.kind.default_cost())
    }

    /// Replacement time, or the kind's default
    #[must_use]
    pub fn resolved_replacement_time(&self) -> f64 {
        self.replacement_time
            .unwrap_or_else(|| self.kind.default_replacement_time())
    }
}

/// A number of identical disks in a fixed arrangement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrangedDisks {
    /// The disk model
    pub disk: DiskSpec,
    /// How many of them
    pub count: usize,
}
