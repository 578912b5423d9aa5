//! Physical disk model

use crate::metrics::Metrics;
use raidcalc_common::{DiskKind, DiskSpec, Error, HOURS_PER_YEAR, Result, SECONDS_PER_HOUR};
use serde::Serialize;
use std::fmt;

/// A physical disk
///
/// Parameters are validated at construction and never change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Disk {
    name: String,
    kind: DiskKind,
    capacity: u64,
    speed: u64,
    afr: f64,
    cost: f64,
    replacement_time: f64,
}

impl Disk {
    /// Create a disk, validating every parameter
    ///
    /// # Errors
    /// `InvalidParameter` if capacity or speed is zero, `afr` is outside
    /// `[0, 1)`, or cost or replacement time is negative.
    pub fn new(
        name: impl Into<String>,
        kind: DiskKind,
        capacity: u64,
        speed: u64,
        afr: f64,
        cost: f64,
        replacement_time: f64,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_parameter("capacity", 0.0));
        }
        if speed == 0 {
            return Err(Error::invalid_parameter("speed", 0.0));
        }
        if !(0.0..1.0).contains(&afr) {
            return Err(Error::invalid_parameter("afr", afr));
        }
        if !(cost >= 0.0 && cost.is_finite()) {
            return Err(Error::invalid_parameter("cost", cost));
        }
        if !(replacement_time >= 0.0 && replacement_time.is_finite()) {
            return Err(Error::invalid_parameter("replacement_time", replacement_time));
        }

        Ok(Self {
            name: name.into(),
            kind,
            capacity,
            speed,
            afr,
            cost,
            replacement_time,
        })
    }

    /// Start building a disk of the given kind, defaulting the other fields
    pub fn builder(name: impl Into<String>, kind: DiskKind, capacity: u64) -> DiskBuilder {
        DiskBuilder {
            spec: DiskSpec::new(name, kind, capacity),
        }
    }

    /// Start building a hard disk drive
    pub fn hdd(name: impl Into<String>, capacity: u64) -> DiskBuilder {
        Self::builder(name, DiskKind::Hdd, capacity)
    }

    /// Start building a solid state drive
    pub fn ssd(name: impl Into<String>, capacity: u64) -> DiskBuilder {
        Self::builder(name, DiskKind::Ssd, capacity)
    }

    /// Create a disk from a catalog entry
    ///
    /// # Errors
    /// `InvalidParameter` if a resolved parameter is out of range, as for
    /// [`Disk::new`].
    pub fn from_spec(spec: &DiskSpec) -> Result<Self> {
        Self::new(
            spec.name.clone(),
            spec.kind,
            spec.capacity,
            spec.resolved_speed(),
            spec.resolved_afr(),
            spec.resolved_cost(),
            spec.resolved_replacement_time(),
        )
    }

    /// Friendly name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Disk kind
    #[must_use]
    pub const fn kind(&self) -> DiskKind {
        self.kind
    }

    /// Sequential speed in bytes per second
    #[must_use]
    pub const fn speed(&self) -> u64 {
        self.speed
    }

    /// Annual failure rate
    #[must_use]
    pub const fn afr(&self) -> f64 {
        self.afr
    }

    /// Whether `other` can stand in for this disk in a mirror.
    ///
    /// Names and kinds are labels only; every modelled parameter must match.
    #[must_use]
    pub fn is_interchangeable(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self.speed == other.speed
            && self.afr.to_bits() == other.afr.to_bits()
            && self.cost.to_bits() == other.cost.to_bits()
            && self.replacement_time.to_bits() == other.replacement_time.to_bits()
    }
}

impl Metrics for Disk {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn cost(&self) -> f64 {
        self.cost
    }

    // Small-interval approximation of a constant hazard rate
    fn hourly_failure(&self) -> f64 {
        self.afr / HOURS_PER_YEAR
    }

    fn annual_failure(&self) -> f64 {
        self.afr
    }

    fn read_time(&self) -> f64 {
        self.capacity as f64 / self.speed as f64 / SECONDS_PER_HOUR
    }

    fn write_time(&self) -> f64 {
        self.capacity as f64 / self.speed as f64 / SECONDS_PER_HOUR
    }

    fn rebuild_time(&self) -> f64 {
        self.read_time().max(self.write_time())
    }

    fn read_throughput(&self) -> u64 {
        self.speed
    }

    fn write_throughput(&self) -> u64 {
        self.speed
    }

    fn rebuilds_per_year(&self) -> f64 {
        self.afr
    }

    /// A lone disk that needs rebuilding has already lost its data.
    fn rebuild_failure(&self) -> f64 {
        1.0
    }

    fn replacement_time(&self) -> f64 {
        self.replacement_time
    }

    fn annual_cost(&self) -> f64 {
        self.afr * self.cost
    }
}

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builder for [`Disk`] starting from the defaults of a [`DiskKind`]
#[derive(Clone, Debug)]
pub struct DiskBuilder {
    spec: DiskSpec,
}

impl DiskBuilder {
    /// Sequential speed in bytes per second
    #[must_use]
    pub fn speed(mut self, speed: u64) -> Self {
        self.spec.speed = Some(speed);
        self
    }

    /// Annual failure rate
    #[must_use]
    pub fn afr(mut self, afr: f64) -> Self {
        self.spec.afr = Some(afr);
        self
    }

    /// Acquisition cost
    #[must_use]
    pub fn cost(mut self, cost: f64) -> Self {
        self.spec.cost = Some(cost);
        self
    }

    /// Hours from failure until a replacement is installed
    #[must_use]
    pub fn replacement_time(mut self, hours: f64) -> Self {
        self.spec.replacement_time = Some(hours);
        self
    }

    /// Validate and build the disk
    ///
    /// # Errors
    /// `InvalidParameter` if a parameter is out of range, as for
    /// [`Disk::new`].
    pub fn build(self) -> Result<Disk> {
        Disk::from_spec(&self.spec)
    }
}
