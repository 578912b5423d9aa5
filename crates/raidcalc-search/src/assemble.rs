//! Assembly of mirror groupings into candidate stripes
//!
//! Given a selection such as `[A, A, A, B, B]`, every run of identical disks
//! is split into mirrors once per partition of its length, and the choices
//! for each run are combined:
//!
//! ```text
//! A: [3] [2, 1] [1, 1, 1]     B: [2] [1, 1]     -> 3 x 2 = 6 stripes
//! ```
//!
//! A group of one disk becomes a single-member mirror. Each resulting stripe
//! is kept only if it meets the [`Constraints`].

use crate::error::SearchError;
use crate::partition::partitions;
use raidcalc_common::{Constraints, Result, SearchLimits};
use raidcalc_model::{Disk, Metrics, Mirror, Stripe};
use std::sync::Arc;

/// Whether `stripe` meets every constraint except cost, which is settled
/// when the disks are selected
#[must_use]
pub fn admits(stripe: &Stripe, constraints: &Constraints) -> bool {
    stripe.capacity() >= constraints.min_capacity
        && stripe.annual_failure() <= constraints.max_annual_failure
        && stripe.read_throughput() >= constraints.min_read_throughput
        && stripe.write_throughput() >= constraints.min_write_throughput
}

/// Every stripe of mirrors that can be built from `selection` and meets
/// `constraints`, without any candidate limit
///
/// Identical disks in `selection` must be contiguous; a disk that reappears
/// after a different one starts a separate run.
///
/// # Errors
/// `EmptyArray` or `HeterogeneousMirror` only if a grouping cannot be built,
/// which well-formed selections never trigger.
pub fn assemble(selection: &[Arc<Disk>], constraints: &Constraints) -> Result<Vec<Stripe>> {
    Assembler::new(constraints, &SearchLimits::unbounded()).assemble(selection)
}

/// Builds candidate stripes while counting them against a shared limit
pub struct Assembler<'a> {
    constraints: &'a Constraints,
    max_candidates: usize,
    evaluated: usize,
}

impl<'a> Assembler<'a> {
    /// Create an assembler; the candidate count is shared by every
    /// [`Assembler::assemble`] call
    #[must_use]
    pub const fn new(constraints: &'a Constraints, limits: &SearchLimits) -> Self {
        Self {
            constraints,
            max_candidates: limits.max_candidates,
            evaluated: 0,
        }
    }

    /// Number of candidate stripes evaluated so far
    #[must_use]
    pub const fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// Accepted stripes for one selection
    ///
    /// # Errors
    /// `SearchLimitExceeded` once more than `max_candidates` stripes have
    /// been evaluated by this assembler.
    pub fn assemble(&mut self, selection: &[Arc<Disk>]) -> Result<Vec<Stripe>> {
        let mut accepted = Vec::new();
        if selection.is_empty() {
            return Ok(accepted);
        }
        let mut groups = Vec::with_capacity(selection.len());
        self.expand(selection, &mut groups, &mut accepted)?;
        Ok(accepted)
    }

    fn expand(
        &mut self,
        remaining: &[Arc<Disk>],
        groups: &mut Vec<(Arc<Disk>, usize)>,
        accepted: &mut Vec<Stripe>,
    ) -> Result<()> {
        let Some(first) = remaining.first() else {
            return self.evaluate(groups, accepted);
        };

        let run = leading_run(remaining);
        let rest = &remaining[run..];
        for partition in partitions(run) {
            let depth = groups.len();
            groups.extend(partition.into_iter().map(|size| (Arc::clone(first), size)));
            self.expand(rest, groups, accepted)?;
            groups.truncate(depth);
        }
        Ok(())
    }

    fn evaluate(&mut self, groups: &[(Arc<Disk>, usize)], accepted: &mut Vec<Stripe>) -> Result<()> {
        if self.evaluated >= self.max_candidates {
            return Err(SearchError::TooManyCandidates {
                limit: self.max_candidates,
            }
            .into());
        }
        self.evaluated += 1;

        let mirrors = groups
            .iter()
            .map(|(disk, count)| Mirror::of(disk, *count))
            .collect::<Result<Vec<_>>>()?;
        let stripe = Stripe::of_mirrors(mirrors)?;
        if admits(&stripe, self.constraints) {
            accepted.push(stripe);
        }
        Ok(())
    }
}

/// Length of the run of disks interchangeable with the first
fn leading_run(disks: &[Arc<Disk>]) -> usize {
    disks.first().map_or(0, |first| {
        disks.iter().take_while(|d| d.is_interchangeable(first)).count()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidcalc_model::Device;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

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

    fn permissive() -> Constraints {
        Constraints {
            min_capacity: 0,
            min_read_throughput: 0,
            min_write_throughput: 0,
            max_annual_failure: 1.0,
            max_cost: f64::MAX,
        }
    }

    fn mirror_sizes(stripe: &Stripe) -> Vec<usize> {
        stripe
            .members()
            .iter()
            .map(|m| match m {
                Device::Mirror(mirror) => mirror.len(),
                other => panic!("expected a mirror, got {other}"),
            })
            .collect()
    }

    #[test]
    fn test_two_identical_disks() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let selection = vec![Arc::clone(&disk), Arc::clone(&disk)];
        let mut constraints = Constraints {
            min_capacity: 3 * TB,
            max_cost: 1000.0,
            ..permissive()
        };

        // With any failure rate allowed, the bare two-disk stripe passes too
        let stripes = assemble(&selection, &constraints).unwrap();
        assert_eq!(stripes.len(), 2);
        assert_eq!(mirror_sizes(&stripes[0]), vec![2]);
        assert_eq!(mirror_sizes(&stripes[1]), vec![1, 1]);

        // Requiring redundancy leaves only the mirror
        constraints.max_annual_failure = 0.01;
        let stripes = assemble(&selection, &constraints).unwrap();
        assert_eq!(stripes.len(), 1);
        assert_eq!(mirror_sizes(&stripes[0]), vec![2]);
        assert_eq!(stripes[0].capacity(), 4 * TB);
    }

    #[test]
    fn test_every_grouping_of_runs() {
        let a = hdd("A", 4 * TB, 170.0);
        let b = hdd("B", 8 * TB, 305.0);
        let selection = vec![
            Arc::clone(&a),
            Arc::clone(&a),
            Arc::clone(&a),
            Arc::clone(&b),
            Arc::clone(&b),
        ];

        let constraints = permissive();
        let mut assembler = Assembler::new(&constraints, &SearchLimits::default());
        let stripes = assembler.assemble(&selection).unwrap();

        assert_eq!(assembler.evaluated(), 6);
        let groupings: Vec<_> = stripes.iter().map(mirror_sizes).collect();
        assert_eq!(
            groupings,
            vec![
                vec![3, 2],
                vec![3, 1, 1],
                vec![2, 1, 2],
                vec![2, 1, 1, 1],
                vec![1, 1, 1, 2],
                vec![1, 1, 1, 1, 1],
            ]
        );
        assert!(stripes.iter().all(|s| s.disk_count() == 5));
    }

    #[test]
    fn test_interchangeable_disks_share_a_run() {
        let a = hdd("first label", 4 * TB, 170.0);
        let b = hdd("second label", 4 * TB, 170.0);
        let stripes = assemble(&[a, b], &permissive()).unwrap();
        assert_eq!(stripes.len(), 2);
    }

    #[test]
    fn test_non_contiguous_disks_form_separate_runs() {
        let a = hdd("A", 4 * TB, 170.0);
        let b = hdd("B", 8 * TB, 305.0);
        let selection = vec![Arc::clone(&a), b, a];
        let stripes = assemble(&selection, &permissive()).unwrap();

        assert_eq!(stripes.len(), 1);
        assert_eq!(mirror_sizes(&stripes[0]), vec![1, 1, 1]);
    }

    #[test]
    fn test_throughput_constraints() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let selection = vec![Arc::clone(&disk); 2];

        // Only the bare stripe writes at 200 MB/s
        let constraints = Constraints {
            min_write_throughput: 200_000_000,
            ..permissive()
        };
        let stripes = assemble(&selection, &constraints).unwrap();
        assert_eq!(stripes.len(), 1);
        assert_eq!(mirror_sizes(&stripes[0]), vec![1, 1]);

        // Both layouts read at 200 MB/s; nothing reads faster
        let constraints = Constraints {
            min_read_throughput: 200_000_000,
            ..permissive()
        };
        assert_eq!(assemble(&selection, &constraints).unwrap().len(), 2);
        let constraints = Constraints {
            min_read_throughput: 200_000_001,
            ..permissive()
        };
        assert!(assemble(&selection, &constraints).unwrap().is_empty());
    }

    #[test]
    fn test_huge_disks_saturate_capacity() {
        let huge = hdd("huge", u64::MAX / 2 + 1, 10.0);
        let stripes = assemble(&[Arc::clone(&huge), huge], &permissive()).unwrap();

        assert_eq!(stripes.len(), 2);
        assert_eq!(stripes[0].capacity(), u64::MAX / 2 + 1);
        assert_eq!(stripes[1].capacity(), u64::MAX);
    }

    #[test]
    fn test_empty_selection() {
        assert!(assemble(&[], &permissive()).unwrap().is_empty());
    }

    #[test]
    fn test_candidate_limit_spans_calls() {
        let disk = hdd("WD4TB", 4 * TB, 170.0);
        let selection = vec![Arc::clone(&disk); 3];
        let constraints = permissive();
        let limits = SearchLimits {
            max_candidates: 4,
            ..SearchLimits::default()
        };
        let mut assembler = Assembler::new(&constraints, &limits);

        assert_eq!(assembler.assemble(&selection).unwrap().len(), 3);
        let err = assembler.assemble(&selection).unwrap_err();
        assert!(err.is_search_limit());
    }

    #[test]
    fn test_accepted_stripes_satisfy_constraints() {
        let mut rng = StdRng::seed_from_u64(42);
        let models = [
            hdd("WD4TB", 4 * TB, 170.0),
            hdd("WD8TB", 8 * TB, 305.0),
            Arc::new(Disk::ssd("SSD1TB", TB).cost(190.0).build().unwrap()),
        ];

        for _ in 0..50 {
            let mut selection = Vec::new();
            let mut expected_candidates = 1;
            for model in &models {
                let count = rng.gen_range(0..=4);
                expected_candidates *= partitions(count).len();
                selection.extend(std::iter::repeat_n(Arc::clone(model), count));
            }
            let constraints = Constraints {
                min_capacity: rng.gen_range(0..=24) * TB,
                min_read_throughput: rng.gen_range(0..=8) * 100_000_000,
                min_write_throughput: rng.gen_range(0..=4) * 100_000_000,
                max_annual_failure: [1e-6, 1e-4, 1e-2, 1.0][rng.gen_range(0..4)],
                max_cost: f64::MAX,
            };

            let mut assembler = Assembler::new(&constraints, &SearchLimits::default());
            let stripes = assembler.assemble(&selection).unwrap();
            if !selection.is_empty() {
                assert_eq!(assembler.evaluated(), expected_candidates);
            }
            for stripe in &stripes {
                assert!(admits(stripe, &constraints));
                assert!(stripe.capacity() >= constraints.min_capacity);
                assert!(stripe.annual_failure() <= constraints.max_annual_failure);
                assert!(stripe.read_throughput() >= constraints.min_read_throughput);
                assert!(stripe.write_throughput() >= constraints.min_write_throughput);
                assert_eq!(stripe.disk_count(), selection.len());
            }
        }
    }
}
