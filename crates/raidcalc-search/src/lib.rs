//! raidcalc Search - Find disk arrangements that meet a set of targets
//!
//! The search runs in three stages:
//!
//! 1. **Selection**: enumerate multisets of catalog disks that fit the budget
//!    and exceed the capacity target ([`selection`])
//! 2. **Assembly**: for each selection, split every run of identical disks
//!    into mirrors in every distinct way ([`partition`]), stripe the mirrors
//!    together, and keep the stripes that meet the constraints ([`assemble`])
//! 3. **Notable**: pick the best stripe under each fixed criterion
//!    ([`notable`])
//!
//! [`Planner`] drives all three from a [`raidcalc_common::SearchConfig`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use raidcalc_common::{Constraints, SearchLimits};
//! use raidcalc_model::{Disk, Mission};
//! use raidcalc_search::{Criterion, Planner};
//!
//! let catalog = vec![
//!     Arc::new(Disk::hdd("WD4TB", 4_000_000_000_000).afr(0.06).cost(170.0).build().unwrap()),
//!     Arc::new(Disk::hdd("WD8TB", 8_000_000_000_000).afr(0.06).cost(305.0).build().unwrap()),
//! ];
//! let constraints = Constraints {
//!     min_capacity: 6_000_000_000_000,
//!     max_annual_failure: 0.001,
//!     max_cost: 1000.0,
//!     ..Constraints::default()
//! };
//!
//! let planner = Planner::new(constraints, Mission::default(), SearchLimits::default());
//! let plan = planner.search(&catalog).unwrap();
//! let notable = plan.notable();
//! assert!(notable.get(Criterion::Cheapest).is_some());
//! ```

pub mod assemble;
pub mod error;
pub mod notable;
pub mod partition;
pub mod planner;
pub mod selection;

pub use assemble::{Assembler, admits, assemble};
pub use error::SearchError;
pub use notable::{Criterion, Notable, select_extremes};
pub use partition::partitions;
pub use planner::{Plan, Planner};
pub use selection::{Selection, enumerate};
