//! Enumeration of disk selections from a catalog
//!
//! A selection is a multiset of catalog disks. Each catalog entry may be
//! picked any number of times, and picks are kept in catalog order so that
//! copies of the same disk sit next to each other.

use crate::error::SearchError;
use raidcalc_common::{Result, SearchLimits};
use raidcalc_model::{Disk, Metrics};
use std::fmt;
use std::sync::Arc;

/// Disks picked from a catalog, in catalog order
#[derive(Clone, Debug, Default)]
pub struct Selection {
    disks: Vec<Arc<Disk>>,
}

impl Selection {
    /// Create a selection from disks already in catalog order
    #[must_use]
    pub const fn new(disks: Vec<Arc<Disk>>) -> Self {
        Self { disks }
    }

    /// The picked disks
    #[must_use]
    pub fn disks(&self) -> &[Arc<Disk>] {
        &self.disks
    }

    /// Number of disks
    #[must_use]
    pub fn len(&self) -> usize {
        self.disks.len()
    }

    /// Whether nothing was picked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    /// Total acquisition cost
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.disks.iter().map(|d| d.cost()).sum()
    }

    /// Raw capacity before any mirroring
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.disks
            .iter()
            .map(|d| d.capacity())
            .fold(0, u64::saturating_add)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.disks.as_slice();
        let mut first = true;
        while let Some(disk) = rest.first() {
            let run = rest.iter().take_while(|d| Arc::ptr_eq(d, disk)).count();
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{run}x {disk}")?;
            first = false;
            rest = &rest[run..];
        }
        Ok(())
    }
}

/// Enumerate every selection from `options` whose cost stays within
/// `max_cost` and whose raw capacity exceeds `min_capacity`.
///
/// Selections are visited depth first, only ever extending with options at
/// or after the last one picked, so each multiset is produced once. Once a
/// selection qualifies, the search keeps extending it: qualifying supersets
/// are returned too. Selections never exceed `limits.max_disks` disks.
///
/// # Errors
/// `SearchLimitExceeded` if more than `limits.max_selections` selections
/// qualify.
pub fn enumerate(
    options: &[Arc<Disk>],
    min_capacity: u64,
    max_cost: f64,
    limits: &SearchLimits,
) -> Result<Vec<Selection>> {
    let mut walk = Walk {
        options,
        min_capacity,
        max_cost,
        limits,
        chosen: Vec::new(),
        results: Vec::new(),
    };
    walk.visit(0, 0.0, 0)?;
    Ok(walk.results)
}

struct Walk<'a> {
    options: &'a [Arc<Disk>],
    min_capacity: u64,
    max_cost: f64,
    limits: &'a SearchLimits,
    chosen: Vec<Arc<Disk>>,
    results: Vec<Selection>,
}

impl Walk<'_> {
    fn visit(&mut self, start: usize, cost: f64, capacity: u64) -> std::result::Result<(), SearchError> {
        // Cost only grows with depth, so nothing below this point fits.
        if cost > self.max_cost {
            return Ok(());
        }

        if capacity > self.min_capacity {
            if self.results.len() >= self.limits.max_selections {
                return Err(SearchError::TooManySelections {
                    limit: self.limits.max_selections,
                });
            }
            self.results.push(Selection::new(self.chosen.clone()));
        }

        if self.chosen.len() >= self.limits.max_disks {
            return Ok(());
        }

        let options = self.options;
        for (idx, option) in options.iter().enumerate().skip(start) {
            self.chosen.push(Arc::clone(option));
            self.visit(
                idx,
                cost + option.cost(),
                capacity.saturating_add(option.capacity()),
            )?;
            self.chosen.pop();
        }
        Ok(())
    }
}
