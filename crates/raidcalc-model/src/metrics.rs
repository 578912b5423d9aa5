//! The metric contract shared by disks and arrays

use raidcalc_common::{Error, MissionConfig, Result};
use serde::{Deserialize, Serialize};

/// Planning horizon bound once per run
///
/// Every `tco` and `mission_loss` evaluation in a run must use the same
/// `Mission`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Mission {
    years: f64,
}

impl Mission {
    /// Create a mission lasting `years`
    ///
    /// # Errors
    /// `InvalidParameter` unless `years` is finite and positive.
    pub fn new(years: f64) -> Result<Self> {
        if years.is_finite() && years > 0.0 {
            Ok(Self { years })
        } else {
            Err(Error::invalid_parameter("mission_length", years))
        }
    }

    /// Mission from the search configuration
    ///
    /// # Errors
    /// `InvalidParameter` unless `config.years` is finite and positive.
    pub fn from_config(config: &MissionConfig) -> Result<Self> {
        Self::new(config.years)
    }

    /// Length in years
    #[must_use]
    pub const fn years(&self) -> f64 {
        self.years
    }
}

impl TryFrom<f64> for Mission {
    type Error = Error;

    fn try_from(years: f64) -> Result<Self> {
        Self::new(years)
    }
}

impl From<Mission> for f64 {
    fn from(mission: Mission) -> Self {
        mission.years
    }
}

impl Default for Mission {
    fn default() -> Self {
        Self { years: 3.0 }
    }
}

/// Cost, performance, and reliability of a storage device
///
/// Times are in hours, throughputs in bytes per second, and failure values
/// are probabilities.
pub trait Metrics {
    /// Usable capacity in bytes
    fn capacity(&self) -> u64;

    /// Acquisition cost
    fn cost(&self) -> f64;

    /// Probability of failing in a one-hour interval
    fn hourly_failure(&self) -> f64;

    /// Probability of failing during one year
    fn annual_failure(&self) -> f64;

    /// Time to read the whole device
    fn read_time(&self) -> f64;

    /// Time to write the whole device
    fn write_time(&self) -> f64;

    /// Time to copy the device onto a replacement
    fn rebuild_time(&self) -> f64;

    /// Sequential read throughput
    fn read_throughput(&self) -> u64;

    /// Sequential write throughput
    fn write_throughput(&self) -> u64;

    /// Expected number of rebuilds per year
    fn rebuilds_per_year(&self) -> f64;

    /// Probability that data is lost once this device needs a rebuild
    fn rebuild_failure(&self) -> f64;

    /// Worst-case time from failure until a replacement is installed
    fn replacement_time(&self) -> f64;

    /// Expected replacement spending per year
    fn annual_cost(&self) -> f64;

    /// Acquisition plus expected replacement spending over the mission
    fn tco(&self, mission: &Mission) -> f64 {
        self.annual_cost() * mission.years() + self.cost()
    }

    /// Probability of failing at some point during the mission
    fn mission_loss(&self, mission: &Mission) -> f64 {
        1.0 - (1.0 - self.annual_failure()).powf(mission.years())
    }

    /// Snapshot of the reported metrics
    fn summary(&self, mission: &Mission) -> Summary {
        Summary {
            capacity: self.capacity(),
            cost: self.cost(),
            annual_cost: self.annual_cost(),
            tco: self.tco(mission),
            read_throughput: self.read_throughput(),
            write_throughput: self.write_throughput(),
            annual_failure: self.annual_failure(),
            mission_loss: self.mission_loss(mission),
        }
    }
}

/// Reported metrics of a device for one mission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Usable capacity in bytes
    pub capacity: u64,
    /// Acquisition cost
    pub cost: f64,
    /// Expected replacement spending per year
    pub annual_cost: f64,
    /// Total cost of ownership over the mission
    pub tco: f64,
    /// Read throughput in bytes per second
    pub read_throughput: u64,
    /// Write throughput in bytes per second
    pub write_throughput: u64,
    /// Probability of data loss per year
    pub annual_failure: f64,
    /// Probability of data loss during the mission
    pub mission_loss: f64,
}
