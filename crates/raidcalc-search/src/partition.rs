//! Integer partitions
//!
//! Splitting `n` identical disks into mirrors is choosing a partition of `n`:
//! the group sizes matter, their order does not. Partitions are produced in
//! non-increasing order of group size so that each multiset appears once.
//!
//! ```text
//! 4 -> [4] [3, 1] [2, 2] [2, 1, 1] [1, 1, 1, 1]
//! ```

/// All partitions of `count`, largest groups first
///
/// `partitions(0)` contains a single empty partition.
#[must_use]
pub fn partitions(count: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(count);
    extend(count, count, &mut current, &mut result);
    result
}

fn extend(remaining: usize, max_group: usize, current: &mut Vec<usize>, result: &mut Vec<Vec<usize>>) {
    if remaining == 0 {
        result.push(current.clone());
        return;
    }

    for size in (1..=remaining.min(max_group)).rev() {
        current.push(size);
        extend(remaining - size, size, current, result);
        current.pop();
    }
}
