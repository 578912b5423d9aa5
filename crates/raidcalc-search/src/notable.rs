//! Best configuration under each fixed criterion

use derive_more::Display;
use raidcalc_model::{Metrics, Mission, Stripe};
use std::collections::BTreeMap;

/// Criteria a configuration can stand out under
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Criterion {
    /// Lowest acquisition cost
    #[display("Cheapest")]
    Cheapest,
    /// Lowest annual failure probability
    #[display("Most Reliable")]
    MostReliable,
    /// Highest write throughput
    #[display("Fastest Write")]
    FastestWrite,
    /// Highest read throughput
    #[display("Fastest Read")]
    FastestRead,
    /// Largest usable capacity
    #[display("Biggest")]
    Biggest,
    /// Lowest total cost of ownership over the mission
    #[display("Lowest TCO")]
    LowestTco,
}

impl Criterion {
    /// Every criterion, in report order
    pub const ALL: [Self; 6] = [
        Self::Cheapest,
        Self::MostReliable,
        Self::FastestWrite,
        Self::FastestRead,
        Self::Biggest,
        Self::LowestTco,
    ];

    /// Whether `a` is strictly better than `b`
    #[must_use]
    pub fn better(self, a: &Stripe, b: &Stripe, mission: &Mission) -> bool {
        match self {
            Self::Cheapest => a.cost() < b.cost(),
            Self::MostReliable => a.annual_failure() < b.annual_failure(),
            Self::FastestWrite => a.write_throughput() > b.write_throughput(),
            Self::FastestRead => a.read_throughput() > b.read_throughput(),
            Self::Biggest => a.capacity() > b.capacity(),
            Self::LowestTco => a.tco(mission) < b.tco(mission),
        }
    }
}

/// Outcome of [`select_extremes`]
#[derive(Clone, Debug)]
pub enum Notable<'a> {
    /// Nothing was accepted
    NoConfigurations,
    /// The winner under every criterion
    Selected(BTreeMap<Criterion, &'a Stripe>),
}

impl<'a> Notable<'a> {
    /// Winner under `criterion`, if any configuration was accepted
    #[must_use]
    pub fn get(&self, criterion: Criterion) -> Option<&'a Stripe> {
        match self {
            Self::NoConfigurations => None,
            Self::Selected(winners) => winners.get(&criterion).copied(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::NoConfigurations)
    }

    /// Winners in report order
    pub fn iter(&self) -> impl Iterator<Item = (Criterion, &'a Stripe)> + '_ {
        let winners = match self {
            Self::NoConfigurations => None,
            Self::Selected(winners) => Some(winners),
        };
        winners
            .into_iter()
            .flat_map(|w| w.iter().map(|(c, s)| (*c, *s)))
    }
}

/// Pick the best of `configs` under each [`Criterion`] in one pass
///
/// Comparisons are strict, so the first of several equal configurations
/// wins.
#[must_use]
pub fn select_extremes<'a>(configs: &'a [Stripe], mission: &Mission) -> Notable<'a> {
    let Some(first) = configs.first() else {
        return Notable::NoConfigurations;
    };

    let mut winners: BTreeMap<Criterion, &'a Stripe> =
        Criterion::ALL.iter().map(|c| (*c, first)).collect();
    for config in &configs[1..] {
        for (criterion, best) in &mut winners {
            if criterion.better(config, *best, mission) {
                *best = config;
            }
        }
    }
    Notable::Selected(winners)
}
