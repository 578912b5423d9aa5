//! raidcalc Model - Reliability, cost, and throughput of disk arrangements
//!
//! Every device exposes the same [`Metrics`]:
//! - **Disk**: a single drive; the leaf of every arrangement
//! - **Mirror**: identical members holding the same data; survives the loss
//!   of all but one member
//! - **Stripe**: members concatenated without redundancy; any member's loss
//!   loses the whole stripe
//!
//! Mirrors and stripes nest arbitrarily through [`Device`]. Costs and losses
//! projected over a planning horizon take a [`Mission`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use raidcalc_model::{Device, Disk, Metrics, Mirror, Mission, Stripe};
//!
//! let disk = Arc::new(Disk::hdd("WD4TB", 4_000_000_000_000).afr(0.06).cost(170.0).build().unwrap());
//! let mirror = Mirror::of(&disk, 2).unwrap();
//! let pool = Stripe::new(vec![Device::from(mirror)]).unwrap();
//!
//! assert_eq!(pool.capacity(), 4_000_000_000_000);
//! let loss = pool.mission_loss(&Mission::default());
//! assert!(loss < 0.06);
//! ```

pub mod array;
pub mod disk;
pub mod metrics;

pub use array::{Device, Mirror, Stripe};
pub use disk::{Disk, DiskBuilder};
pub use metrics::{Metrics, Mission, Summary};
