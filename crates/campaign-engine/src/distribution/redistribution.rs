//! Roster changes on an existing plan
//!
//! When agents join or leave a running campaign the existing plan is
//! superseded, not edited. The default mode keeps every contact of a
//! remaining agent where it is and feeds newcomers from the tail of the
//! index space, where contacts are least likely to be in progress:
//!
//! ```text
//!  before   A A A A A B B B B B
//!  add C    A A A A A B B C C C     (C takes the highest indices)
//!  drop A   . . . . . B B C C C  -> freed indices go to B and C, lowest first
//! ```
//!
//! [`RedistributionMode::Rebalance`] throws the old layout away and plans
//! from scratch.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::plan::{AllocationStrategy, DistributionPlan};
use super::planner::{DistributionPlanner, DistributionRequest, Targets};
use crate::config::{DistributionConfig, RemainderPolicy};
use crate::error::Result;

/// How far a redistribution may move existing assignments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionMode {
    /// Remaining agents keep their contacts, newcomers are fed from the tail
    #[default]
    PreserveAssignments,
    /// Fresh contiguous plan over the new selection
    Rebalance,
}

/// Recomputes plans after roster changes
#[derive(Debug, Clone, Default)]
pub struct RedistributionEngine {
    planner: DistributionPlanner,
}

impl RedistributionEngine {
    pub fn new(config: DistributionConfig) -> Self {
        Self {
            planner: DistributionPlanner::new(config),
        }
    }

    /// Supersede `existing` for a new selection, preserving assignments
    ///
    /// `effective_total` is capped by the campaign ceiling. Validation and
    /// errors match [`DistributionPlanner::plan`].
    pub fn redistribute(
        &self,
        existing: &DistributionPlan,
        request: &DistributionRequest,
        effective_total: usize,
    ) -> Result<DistributionPlan> {
        self.redistribute_with(
            existing,
            request,
            effective_total,
            RedistributionMode::PreserveAssignments,
        )
    }

    /// Explicit global rebalance: contiguous ranges in selection order
    pub fn rebalance(
        &self,
        request: &DistributionRequest,
        effective_total: usize,
    ) -> Result<DistributionPlan> {
        self.planner.plan(effective_total, request)
    }

    pub fn redistribute_with(
        &self,
        existing: &DistributionPlan,
        request: &DistributionRequest,
        effective_total: usize,
        mode: RedistributionMode,
    ) -> Result<DistributionPlan> {
        let plan = match mode {
            RedistributionMode::Rebalance => self.rebalance(request, effective_total)?,
            RedistributionMode::PreserveAssignments => {
                let effective_total = self.planner.config().effective_total(effective_total);
                let targets = self.planner.targets(effective_total, request)?;
                let policy = self.planner.config().remainder_policy;
                preserve(existing, request, targets, effective_total, policy)
            }
        };

        info!(
            "🔁 Redistributed {} contacts over {} agents ({:?}): {} moved, {} unassigned",
            plan.effective_total,
            plan.allocations.len(),
            mode,
            plan.moved_from(existing),
            plan.effective_total - plan.assigned_total()
        );
        Ok(plan)
    }
}

/// Tail-first reassignment over a per-index owner table
fn preserve(
    existing: &DistributionPlan,
    request: &DistributionRequest,
    targets: Targets,
    effective_total: usize,
    policy: RemainderPolicy,
) -> DistributionPlan {
    let Targets { agents, quantities } = targets;

    let mut owners: Vec<Option<usize>> = vec![None; effective_total];
    let mut retained = vec![false; agents.len()];
    for allocation in &existing.allocations {
        let Some(slot) = agents.iter().position(|id| id == &allocation.agent_id) else {
            debug!("Agent {} left; freeing {} contacts", allocation.agent_id, allocation.quantity);
            continue;
        };
        retained[slot] = true;
        for index in allocation.indices().take_while(|index| *index < effective_total) {
            owners[index] = Some(slot);
        }
    }

    let mut held = vec![0usize; agents.len()];
    for slot in owners.iter().flatten() {
        held[*slot] += 1;
    }

    for slot in (0..agents.len()).filter(|slot| !retained[*slot]) {
        let mut wanted = quantities[slot];
        // free indices first, then the tail held by remaining agents
        for index in (0..effective_total).rev() {
            if wanted == 0 {
                break;
            }
            if owners[index].is_none() {
                owners[index] = Some(slot);
                wanted -= 1;
            }
        }
        for index in (0..effective_total).rev() {
            if wanted == 0 {
                break;
            }
            if let Some(owner) = owners[index] {
                if retained[owner] {
                    owners[index] = Some(slot);
                    held[owner] -= 1;
                    wanted -= 1;
                }
            }
        }
        held[slot] = quantities[slot] - wanted;
        debug!("Agent {} joins with {} contacts from the tail", agents[slot], held[slot]);
    }

    // manual quantities and a dropped remainder are hard caps
    let capped = request.effective_strategy() == AllocationStrategy::Manual
        || policy == RemainderPolicy::Drop;
    if capped {
        for slot in (0..agents.len()).filter(|slot| retained[*slot]) {
            let mut excess = held[slot].saturating_sub(quantities[slot]);
            if excess > 0 {
                debug!("Agent {} releases {} contacts above its quantity", agents[slot], excess);
            }
            for index in (0..effective_total).rev() {
                if excess == 0 {
                    break;
                }
                if owners[index] == Some(slot) {
                    owners[index] = None;
                    excess -= 1;
                }
            }
            held[slot] = held[slot].min(quantities[slot]);
        }
    }

    let free: Vec<usize> = (0..effective_total).filter(|index| owners[*index].is_none()).collect();
    let mut free = free.into_iter();
    for slot in (0..agents.len()).filter(|slot| retained[*slot]) {
        while held[slot] < quantities[slot] {
            let Some(index) = free.next() else {
                break;
            };
            owners[index] = Some(slot);
            held[slot] += 1;
        }
    }

    DistributionPlan::from_owners(request.mode, request.effective_strategy(), &agents, &owners)
}
