//! Mirrors, stripes, and the device tree
//!
//! A [`Stripe`] concatenates independent members: capacity and throughput
//! add up, and losing any member loses the stripe. A [`Mirror`] keeps the
//! same data on every member: capacity is that of one member, reads scale
//! with the member count, and data is lost only if every surviving member
//! also fails while a dead one is being replaced and rebuilt.
//!
//! Members are [`Device`]s, so either layout may contain disks or other
//! arrays. Metrics are recomputed from the members on every call.

use crate::disk::Disk;
use crate::metrics::Metrics;
use raidcalc_common::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// A disk or an array of devices
#[derive(Clone, Debug)]
pub enum Device {
    /// A single physical disk
    Disk(Arc<Disk>),
    /// Identical members holding the same data
    Mirror(Mirror),
    /// Members concatenated without redundancy
    Stripe(Stripe),
}

impl Device {
    /// Whether `other` has the same layout and parameters, so that the two
    /// can be members of one mirror
    #[must_use]
    pub fn is_interchangeable(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Disk(a), Self::Disk(b)) => a.is_interchangeable(b),
            (Self::Mirror(a), Self::Mirror(b)) => same_members(&a.members, &b.members),
            (Self::Stripe(a), Self::Stripe(b)) => same_members(&a.members, &b.members),
            _ => false,
        }
    }
}

fn same_members(a: &[Device], b: &[Device]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_interchangeable(y))
}

impl From<Arc<Disk>> for Device {
    fn from(disk: Arc<Disk>) -> Self {
        Self::Disk(disk)
    }
}

impl From<Disk> for Device {
    fn from(disk: Disk) -> Self {
        Self::Disk(Arc::new(disk))
    }
}

impl From<Mirror> for Device {
    fn from(mirror: Mirror) -> Self {
        Self::Mirror(mirror)
    }
}

impl From<Stripe> for Device {
    fn from(stripe: Stripe) -> Self {
        Self::Stripe(stripe)
    }
}

macro_rules! dispatch {
    ($self:ident, $d:ident => $e:expr) => {
        match $self {
            Device::Disk($d) => $e,
            Device::Mirror($d) => $e,
            Device::Stripe($d) => $e,
        }
    };
}

impl Metrics for Device {
    fn capacity(&self) -> u64 {
        dispatch!(self, d => d.capacity())
    }

    fn cost(&self) -> f64 {
        dispatch!(self, d => d.cost())
    }

    fn hourly_failure(&self) -> f64 {
        dispatch!(self, d => d.hourly_failure())
    }

    fn annual_failure(&self) -> f64 {
        dispatch!(self, d => d.annual_failure())
    }

    fn read_time(&self) -> f64 {
        dispatch!(self, d => d.read_time())
    }

    fn write_time(&self) -> f64 {
        dispatch!(self, d => d.write_time())
    }

    fn rebuild_time(&self) -> f64 {
        dispatch!(self, d => d.rebuild_time())
    }

    fn read_throughput(&self) -> u64 {
        dispatch!(self, d => d.read_throughput())
    }

    fn write_throughput(&self) -> u64 {
        dispatch!(self, d => d.write_throughput())
    }

    fn rebuilds_per_year(&self) -> f64 {
        dispatch!(self, d => d.rebuilds_per_year())
    }

    fn rebuild_failure(&self) -> f64 {
        dispatch!(self, d => d.rebuild_failure())
    }

    fn replacement_time(&self) -> f64 {
        dispatch!(self, d => d.replacement_time())
    }

    fn annual_cost(&self) -> f64 {
        dispatch!(self, d => d.annual_cost())
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, d => fmt::Display::fmt(d, f))
    }
}

// Formulas shared by both layouts.

fn total_capacity(members: &[Device]) -> u64 {
    members
        .iter()
        .map(Metrics::capacity)
        .fold(0, u64::saturating_add)
}

fn min_capacity(members: &[Device]) -> u64 {
    members.iter().map(Metrics::capacity).min().unwrap_or(0)
}

fn total_cost(members: &[Device]) -> f64 {
    members.iter().map(Metrics::cost).sum()
}

fn total_annual_cost(members: &[Device]) -> f64 {
    members.iter().map(Metrics::annual_cost).sum()
}

fn total_annual_failure(members: &[Device]) -> f64 {
    members.iter().map(Metrics::annual_failure).sum()
}

/// Probability that at least one of independent events with probabilities
/// `p` happens
fn any_of(p: impl Iterator<Item = f64>) -> f64 {
    1.0 - p.map(|p| 1.0 - p).product::<f64>()
}

fn max_of(members: &[Device], f: impl Fn(&Device) -> f64) -> f64 {
    members.iter().map(f).fold(0.0, f64::max)
}

fn min_throughput(members: &[Device], f: impl Fn(&Device) -> u64) -> u64 {
    members.iter().map(f).min().unwrap_or(0)
}

fn scale(throughput: u64, members: usize) -> u64 {
    throughput.saturating_mul(members as u64)
}

/// Worst case: a single member is the only source while the rest are idle
fn conservative_rebuild_time(members: &[Device]) -> f64 {
    let read = max_of(members, Metrics::read_time);
    let write = max_of(members, Metrics::write_time);
    read.max(write)
}

/// Mirror of identical devices
#[derive(Clone, Debug)]
pub struct Mirror {
    members: Vec<Device>,
}

impl Mirror {
    /// Create a mirror over `members`
    ///
    /// # Errors
    /// `EmptyArray` if there are no members, `HeterogeneousMirror` if any
    /// member is not interchangeable with the first.
    pub fn new(members: Vec<Device>) -> Result<Self> {
        let Some(first) = members.first() else {
            return Err(Error::EmptyArray { layout: "mirror" });
        };
        if let Some(index) = members.iter().position(|m| !m.is_interchangeable(first)) {
            return Err(Error::HeterogeneousMirror { index });
        }
        Ok(Self { members })
    }

    /// Mirror of `count` copies of `disk`
    ///
    /// A count of one gives a degenerate mirror that behaves like the disk.
    ///
    /// # Errors
    /// `EmptyArray` if `count` is zero.
    pub fn of(disk: &Arc<Disk>, count: usize) -> Result<Self> {
        Self::new(vec![Device::Disk(Arc::clone(disk)); count])
    }

    /// Member devices
    #[must_use]
    pub fn members(&self) -> &[Device] {
        &self.members
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a mirror has at least one member
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Metrics for Mirror {
    /// Bounded by the smallest member
    fn capacity(&self) -> u64 {
        min_capacity(&self.members)
    }

    fn cost(&self) -> f64 {
        total_cost(&self.members)
    }

    fn hourly_failure(&self) -> f64 {
        any_of(self.members.iter().map(Metrics::hourly_failure))
    }

    /// Approximation that holds while rebuilds are rare; clamped so that
    /// extreme inputs still yield a probability.
    fn annual_failure(&self) -> f64 {
        (self.rebuild_failure() * self.rebuilds_per_year()).min(1.0)
    }

    fn read_time(&self) -> f64 {
        max_of(&self.members, Metrics::read_time) / self.members.len() as f64
    }

    /// Every member receives the full write
    fn write_time(&self) -> f64 {
        max_of(&self.members, Metrics::write_time)
    }

    fn rebuild_time(&self) -> f64 {
        conservative_rebuild_time(&self.members)
    }

    fn read_throughput(&self) -> u64 {
        scale(min_throughput(&self.members, Metrics::read_throughput), self.members.len())
    }

    fn write_throughput(&self) -> u64 {
        min_throughput(&self.members, Metrics::write_throughput)
    }

    fn rebuilds_per_year(&self) -> f64 {
        total_annual_failure(&self.members)
    }

    /// Probability that all surviving members also fail within the window
    /// between losing one member and finishing its replacement's rebuild.
    fn rebuild_failure(&self) -> f64 {
        let window = self.rebuild_time() + self.replacement_time();
        let survives = (1.0 - self.hourly_failure()).powf(window);
        let survivors = i32::try_from(self.members.len() - 1).unwrap_or(i32::MAX);
        (1.0 - survives).powi(survivors)
    }

    fn replacement_time(&self) -> f64 {
        max_of(&self.members, Metrics::replacement_time)
    }

    fn annual_cost(&self) -> f64 {
        total_annual_cost(&self.members)
    }
}

impl fmt::Display for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mirror:")?;
        for member in &self.members {
            write!(f, " {member}")?;
        }
        Ok(())
    }
}

/// Stripe of independent devices
#[derive(Clone, Debug)]
pub struct Stripe {
    members: Vec<Device>,
}

impl Stripe {
    /// Create a stripe over `members`
    ///
    /// # Errors
    /// `EmptyArray` if there are no members.
    pub fn new(members: Vec<Device>) -> Result<Self> {
        if members.is_empty() {
            return Err(Error::EmptyArray { layout: "stripe" });
        }
        Ok(Self { members })
    }

    /// Stripe whose members are the given mirrors
    ///
    /// # Errors
    /// `EmptyArray` if there are no mirrors.
    pub fn of_mirrors(mirrors: impl IntoIterator<Item = Mirror>) -> Result<Self> {
        Self::new(mirrors.into_iter().map(Device::Mirror).collect())
    }

    /// Member devices
    #[must_use]
    pub fn members(&self) -> &[Device] {
        &self.members
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false; a stripe has at least one member
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of physical disks in the stripe
    #[must_use]
    pub fn disk_count(&self) -> usize {
        fn count(device: &Device) -> usize {
            match device {
                Device::Disk(_) => 1,
                Device::Mirror(m) => m.members.iter().map(count).sum(),
                Device::Stripe(s) => s.members.iter().map(count).sum(),
            }
        }
        self.members.iter().map(count).sum()
    }
}

impl Metrics for Stripe {
    fn capacity(&self) -> u64 {
        total_capacity(&self.members)
    }

    fn cost(&self) -> f64 {
        total_cost(&self.members)
    }

    fn hourly_failure(&self) -> f64 {
        any_of(self.members.iter().map(Metrics::hourly_failure))
    }

    fn annual_failure(&self) -> f64 {
        any_of(self.members.iter().map(Metrics::annual_failure))
    }

    fn read_time(&self) -> f64 {
        max_of(&self.members, Metrics::read_time) / self.members.len() as f64
    }

    fn write_time(&self) -> f64 {
        max_of(&self.members, Metrics::write_time) / self.members.len() as f64
    }

    fn rebuild_time(&self) -> f64 {
        conservative_rebuild_time(&self.members)
    }

    fn read_throughput(&self) -> u64 {
        scale(min_throughput(&self.members, Metrics::read_throughput), self.members.len())
    }

    fn write_throughput(&self) -> u64 {
        scale(min_throughput(&self.members, Metrics::write_throughput), self.members.len())
    }

    fn rebuilds_per_year(&self) -> f64 {
        total_annual_failure(&self.members)
    }

    fn rebuild_failure(&self) -> f64 {
        max_of(&self.members, Metrics::rebuild_failure)
    }

    fn replacement_time(&self) -> f64 {
        max_of(&self.members, Metrics::replacement_time)
    }

    fn annual_cost(&self) -> f64 {
        total_annual_cost(&self.members)
    }
}

impl fmt::Display for Stripe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Stripe:")?;
        for member in &self.members {
            for line in member.to_string().lines() {
                write!(f, "\n    {line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Mission;

    const TB: u64 = 1_000_000_000_000;

    fn hdd(name: &str, capacity: u64, cost: f64) -> Arc<Disk> {
        Arc::new(
            Disk::hdd(name, capacity)
                .afr(0.06)
                .cost(cost)
                .replacement_time(96.0)
                .build()
                .unwrap(),
        )
    }

    fn ssd() -> Arc<Disk> {
        Arc::new(Disk::ssd("SSD1TB", TB).cost(190.0).replacement_time(24.0).build().unwrap())
    }

    fn assert_close(actual: f64, expected: f64) {
        let tolerance = 1e-12 * expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_mirror_of_two_identical_disks() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let mirror = Mirror::of(&disk, 2).unwrap();

        assert_eq!(mirror.capacity(), 4 * TB);
        assert_close(mirror.cost(), 340.0);
        assert_eq!(mirror.read_throughput(), 200_000_000);
        assert_eq!(mirror.write_throughput(), 100_000_000);
        assert_close(mirror.write_time(), disk.write_time());
        assert_close(mirror.read_time(), disk.read_time() / 2.0);
        assert_close(mirror.rebuild_time(), disk.rebuild_time());
        assert_close(mirror.replacement_time(), 96.0);
        assert_close(mirror.rebuilds_per_year(), 0.12);
        assert_close(mirror.annual_cost(), 2.0 * 0.06 * 170.0);
    }

    #[test]
    fn test_mirror_rebuild_failure() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let mirror = Mirror::of(&disk, 2).unwrap();

        let hourly = 1.0 - (1.0 - disk.hourly_failure()).powi(2);
        assert_close(mirror.hourly_failure(), hourly);

        let window = disk.rebuild_time() + 96.0;
        let expected = 1.0 - (1.0 - hourly).powf(window);
        assert_close(mirror.rebuild_failure(), expected);
        assert_close(mirror.annual_failure(), expected * 0.12);

        // Redundancy must beat a bare disk by a wide margin
        assert!(mirror.annual_failure() < disk.annual_failure() / 10.0);
    }

    #[test]
    fn test_wider_mirror_is_more_reliable() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let two = Mirror::of(&disk, 2).unwrap();
        let three = Mirror::of(&disk, 3).unwrap();

        assert!(three.rebuild_failure() < two.rebuild_failure());
        assert!(three.annual_failure() < two.annual_failure());
        assert_eq!(three.capacity(), 4 * TB);
        assert_eq!(three.read_throughput(), 300_000_000);
        assert_eq!(three.write_throughput(), 100_000_000);
    }

    #[test]
    fn test_single_member_mirror_behaves_like_disk() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let mirror = Mirror::of(&disk, 1).unwrap();

        assert_close(mirror.rebuild_failure(), 1.0);
        assert_close(mirror.annual_failure(), disk.annual_failure());
        assert_eq!(mirror.capacity(), disk.capacity());
        assert_eq!(mirror.read_throughput(), disk.read_throughput());
        assert_eq!(mirror.write_throughput(), disk.write_throughput());
    }

    #[test]
    fn test_mirror_annual_failure_is_clamped() {
        // Slow, huge, failure-prone disks with a long replacement time push
        // the approximation past one.
        let disk = Arc::new(
            Disk::hdd("lemon", 1_000 * TB)
                .speed(1_000_000)
                .afr(0.99)
                .replacement_time(10_000.0)
                .build()
                .unwrap(),
        );
        let mirror = Mirror::of(&disk, 2).unwrap();
        assert!(mirror.rebuild_failure() * mirror.rebuilds_per_year() > 1.0);
        assert_close(mirror.annual_failure(), 1.0);
    }

    #[test]
    fn test_mirror_rejects_heterogeneous_members() {
        let small = hdd("WD4TB", 4 * TB, 170.0);
        let big = hdd("WD8TB", 8 * TB, 305.0);

        let err = Mirror::new(vec![
            Device::from(Arc::clone(&small)),
            Device::from(Arc::clone(&small)),
            Device::from(big),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::HeterogeneousMirror { index: 2 }));

        let err = Mirror::new(vec![
            Device::from(Arc::clone(&small)),
            Device::from(Mirror::of(&small, 1).unwrap()),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::HeterogeneousMirror { index: 1 }));
    }

    #[test]
    fn test_empty_arrays_rejected() {
        assert!(matches!(
            Mirror::new(vec![]),
            Err(Error::EmptyArray { layout: "mirror" })
        ));
        assert!(matches!(
            Stripe::new(vec![]),
            Err(Error::EmptyArray { layout: "stripe" })
        ));
    }

    #[test]
    fn test_stripe_of_one_matches_member() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let stripe = Stripe::new(vec![Device::from(Arc::clone(&disk))]).unwrap();

        assert_close(stripe.annual_failure(), disk.annual_failure());
        assert_eq!(stripe.capacity(), disk.capacity());
        assert_eq!(stripe.read_throughput(), disk.read_throughput());
    }

    #[test]
    fn test_stripe_combines_independent_members() {
        let hdd = hdd("WD8TB", 8 * TB, 305.0);
        let ssd = ssd();
        let stripe = Stripe::new(vec![
            Device::from(Arc::clone(&hdd)),
            Device::from(Arc::clone(&ssd)),
        ])
        .unwrap();

        assert_eq!(stripe.capacity(), 9 * TB);
        assert_close(stripe.cost(), 495.0);
        assert_close(stripe.annual_failure(), 1.0 - (1.0 - 0.06) * (1.0 - 0.01));
        assert_close(stripe.rebuilds_per_year(), 0.07);
        // The slowest member bounds each lane
        assert_eq!(stripe.read_throughput(), 200_000_000);
        assert_eq!(stripe.write_throughput(), 200_000_000);
        assert_close(stripe.read_time(), hdd.read_time() / 2.0);
        assert_close(stripe.write_time(), hdd.write_time() / 2.0);
        assert_close(stripe.rebuild_time(), hdd.rebuild_time());
        assert_close(stripe.rebuild_failure(), 1.0);
        assert_close(stripe.replacement_time(), 96.0);
    }

    #[test]
    fn test_stripe_of_mirrors() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let mirror = Mirror::of(&disk, 2).unwrap();
        let stripe = Stripe::of_mirrors([mirror.clone(), mirror.clone(), mirror.clone()]).unwrap();

        assert_eq!(stripe.capacity(), 12 * TB);
        assert_eq!(stripe.disk_count(), 6);
        assert_eq!(stripe.read_throughput(), 600_000_000);
        assert_eq!(stripe.write_throughput(), 300_000_000);
        assert_close(
            stripe.annual_failure(),
            1.0 - (1.0 - mirror.annual_failure()).powi(3),
        );
        assert!(stripe.rebuild_failure() < 1.0);
    }

    #[test]
    fn test_tco_and_mission_loss() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let stripe = Stripe::of_mirrors([Mirror::of(&disk, 2).unwrap()]).unwrap();
        let mission = Mission::new(3.0).unwrap();

        assert_close(stripe.tco(&mission), stripe.annual_cost() * 3.0 + 340.0);
        assert_close(
            stripe.mission_loss(&mission),
            1.0 - (1.0 - stripe.annual_failure()).powi(3),
        );

        let summary = stripe.summary(&mission);
        assert_eq!(summary.capacity, 4 * TB);
        assert_close(summary.tco, stripe.tco(&mission));
        assert_close(summary.mission_loss, stripe.mission_loss(&mission));
    }

    #[test]
    fn test_stripe_capacity_saturates() {
        let huge = Arc::new(Disk::hdd("huge", u64::MAX / 2 + 1).build().unwrap());
        let single = Mirror::of(&huge, 1).unwrap();
        let stripe = Stripe::of_mirrors([single.clone(), single]).unwrap();

        assert_eq!(stripe.capacity(), u64::MAX);
        assert_eq!(stripe.disk_count(), 2);
    }

    #[test]
    fn test_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Device>();
        assert_send_sync::<Mirror>();
        assert_send_sync::<Stripe>();
    }

    #[test]
    fn test_device_dispatch() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let mirror = Mirror::of(&disk, 2).unwrap();
        let device = Device::from(mirror.clone());

        assert_eq!(device.capacity(), mirror.capacity());
        assert_close(device.annual_failure(), mirror.annual_failure());
        assert_eq!(device.read_throughput(), mirror.read_throughput());
    }

    #[test]
    fn test_nested_mirror_of_stripes() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let pair = Stripe::new(vec![Device::from(Arc::clone(&disk)); 2]).unwrap();
        let mirror = Mirror::new(vec![Device::from(pair.clone()), Device::from(pair)]).unwrap();

        assert_eq!(mirror.capacity(), 8 * TB);
        assert!(mirror.annual_failure() < 1.0 - 0.94_f64.powi(2));
    }

    #[test]
    fn test_display_tree() {
        let wd4 = hdd("WD4TB", 4 * TB, 170.0);
        let wd8 = hdd("WD8TB", 8 * TB, 305.0);
        let stripe = Stripe::of_mirrors([
            Mirror::of(&wd4, 2).unwrap(),
            Mirror::of(&wd8, 1).unwrap(),
        ])
        .unwrap();

        assert_eq!(
            stripe.to_string(),
            "Stripe:\n    Mirror: WD4TB WD4TB\n    Mirror: WD8TB"
        );

        let nested = Stripe::new(vec![Device::from(stripe)]).unwrap();
        assert_eq!(
            nested.to_string(),
            "Stripe:\n    Stripe:\n        Mirror: WD4TB WD4TB\n        Mirror: WD8TB"
        );
    }
}
