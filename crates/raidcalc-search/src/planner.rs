//! Search driver
//!
//! A [`Planner`] binds the constraints, mission, and limits for one run and
//! drives selection, assembly, and notable selection over a catalog or a
//! fixed set of disks.

use crate::assemble::Assembler;
use crate::notable::{Notable, select_extremes};
use crate::selection::enumerate;
use raidcalc_common::{Constraints, Result, SearchConfig, SearchLimits};
use raidcalc_model::{Disk, Mission, Stripe};
use std::sync::Arc;
use tracing::{debug, info};

/// Accepted configurations of one run
#[derive(Clone, Debug)]
pub struct Plan {
    mission: Mission,
    selections_considered: usize,
    candidates_evaluated: usize,
    configurations: Vec<Stripe>,
}

impl Plan {
    /// Mission the configurations were judged against
    #[must_use]
    pub const fn mission(&self) -> &Mission {
        &self.mission
    }

    /// Number of disk selections that were assembled
    #[must_use]
    pub const fn selections_considered(&self) -> usize {
        self.selections_considered
    }

    /// Number of groupings evaluated against the constraints
    #[must_use]
    pub const fn candidates_evaluated(&self) -> usize {
        self.candidates_evaluated
    }

    /// Configurations that met every constraint, in discovery order
    #[must_use]
    pub fn configurations(&self) -> &[Stripe] {
        &self.configurations
    }

    /// Best configuration under each criterion
    #[must_use]
    pub fn notable(&self) -> Notable<'_> {
        select_extremes(&self.configurations, &self.mission)
    }
}

/// Runs searches under fixed constraints
#[derive(Clone, Debug)]
pub struct Planner {
    constraints: Constraints,
    mission: Mission,
    limits: SearchLimits,
}

impl Planner {
    #[must_use]
    pub const fn new(constraints: Constraints, mission: Mission, limits: SearchLimits) -> Self {
        Self {
            constraints,
            mission,
            limits,
        }
    }

    /// Planner for a validated configuration, with `max_mission_loss`
    /// applied to the constraints
    ///
    /// # Errors
    /// `Configuration` if the configuration fails validation.
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            config.effective_constraints(),
            Mission::from_config(&config.mission)?,
            config.limits.clone(),
        ))
    }

    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    #[must_use]
    pub const fn mission(&self) -> &Mission {
        &self.mission
    }

    /// Search `catalog` for every configuration that meets the constraints
    ///
    /// Catalog entries with identical parameters may be mirrored together
    /// even when other models sit between them in the catalog.
    ///
    /// # Errors
    /// `SearchLimitExceeded` if either stage outgrows its limit.
    pub fn search(&self, catalog: &[Arc<Disk>]) -> Result<Plan> {
        let selections = enumerate(
            catalog,
            self.constraints.min_capacity,
            self.constraints.max_cost,
            &self.limits,
        )?;
        info!("{} combinations of disks generated", selections.len());

        let mut assembler = Assembler::new(&self.constraints, &self.limits);
        let mut configurations = Vec::new();
        for selection in &selections {
            let accepted = assembler.assemble(&group_interchangeable(selection.disks()))?;
            debug!("{}: {} viable groupings", selection, accepted.len());
            configurations.extend(accepted);
        }
        info!("{} viable configurations generated", configurations.len());

        Ok(Plan {
            mission: self.mission,
            selections_considered: selections.len(),
            candidates_evaluated: assembler.evaluated(),
            configurations,
        })
    }

    /// Every configuration of exactly `disks` that meets the constraints
    /// other than cost
    ///
    /// Identical disks need not be adjacent; they are grouped first.
    ///
    /// # Errors
    /// `SearchLimitExceeded` if more than `max_candidates` groupings are
    /// evaluated.
    pub fn arrange(&self, disks: &[Arc<Disk>]) -> Result<Plan> {
        let grouped = group_interchangeable(disks);
        let mut assembler = Assembler::new(&self.constraints, &self.limits);
        let configurations = assembler.assemble(&grouped)?;
        info!(
            "{} viable configurations of {} disks generated",
            configurations.len(),
            disks.len()
        );

        Ok(Plan {
            mission: self.mission,
            selections_considered: usize::from(!disks.is_empty()),
            candidates_evaluated: assembler.evaluated(),
            configurations,
        })
    }

    /// Run the search a configuration describes: its fixed arrangement if it
    /// has one, its catalog otherwise
    ///
    /// # Errors
    /// `Configuration` for an invalid configuration, `InvalidParameter` for
    /// a disk entry that fails validation, and `SearchLimitExceeded` if the
    /// search outgrows its limits.
    pub fn run(config: &SearchConfig) -> Result<Plan> {
        let planner = Self::from_config(config)?;
        if config.arrangement.is_empty() {
            let catalog = config
                .catalog
                .iter()
                .map(|spec| Disk::from_spec(spec).map(Arc::new))
                .collect::<Result<Vec<_>>>()?;
            planner.search(&catalog)
        } else {
            let mut disks = Vec::new();
            for entry in &config.arrangement {
                let disk = Arc::new(Disk::from_spec(&entry.disk)?);
                disks.extend(std::iter::repeat_n(disk, entry.count));
            }
            planner.arrange(&disks)
        }
    }
}

/// Reorder `disks` so interchangeable disks are adjacent, keeping the order
/// in which each kind first appears
fn group_interchangeable(disks: &[Arc<Disk>]) -> Vec<Arc<Disk>> {
    let mut groups: Vec<Vec<Arc<Disk>>> = Vec::new();
    for disk in disks {
        match groups.iter_mut().find(|g| g[0].is_interchangeable(disk)) {
            Some(group) => group.push(Arc::clone(disk)),
            None => groups.push(vec![Arc::clone(disk)]),
        }
    }
    groups.into_iter().flatten().collect()
}
