//! Initial contact distribution

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::plan::{
    AgentAllocation, AllocationStrategy, DistributionMode, DistributionPlan, IndexRange,
};
use crate::config::{DistributionConfig, RemainderPolicy};
use crate::error::{CampaignError, Result};
use crate::types::{AgentId, AgentRef};

/// Agent selection submitted by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRequest {
    pub mode: DistributionMode,
    /// Selected agents in selection order
    pub agents: Vec<AgentRef>,
    /// Ignored in single mode
    pub strategy: AllocationStrategy,
    /// Per-agent quantities for the manual strategy
    #[serde(default)]
    pub manual_quantities: HashMap<AgentId, i64>,
}

impl DistributionRequest {
    /// One agent takes every contact
    pub fn single(agent: AgentRef) -> Self {
        Self {
            mode: DistributionMode::Single,
            agents: vec![agent],
            strategy: AllocationStrategy::Automatic,
            manual_quantities: HashMap::new(),
        }
    }

    /// Even split across `agents`
    pub fn automatic(agents: Vec<AgentRef>) -> Self {
        Self {
            mode: DistributionMode::Multiple,
            agents,
            strategy: AllocationStrategy::Automatic,
            manual_quantities: HashMap::new(),
        }
    }

    /// Caller-chosen quantities; agents without an entry receive nothing
    pub fn manual<I, K>(agents: Vec<AgentRef>, quantities: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<AgentId>,
    {
        Self {
            mode: DistributionMode::Multiple,
            agents,
            strategy: AllocationStrategy::Manual,
            manual_quantities: quantities.into_iter().map(|(id, q)| (id.into(), q)).collect(),
        }
    }

    /// Strategy the resulting plan records
    pub fn effective_strategy(&self) -> AllocationStrategy {
        match self.mode {
            DistributionMode::Single => AllocationStrategy::Automatic,
            DistributionMode::Multiple => self.strategy,
        }
    }
}

/// Per-agent target quantities for a validated selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Targets {
    pub agents: Vec<AgentId>,
    pub quantities: Vec<usize>,
}

/// Computes initial plans with contiguous index ranges
#[derive(Debug, Clone, Default)]
pub struct DistributionPlanner {
    config: DistributionConfig,
}

impl DistributionPlanner {
    pub fn new(config: DistributionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Plan `total_contacts` (capped by the campaign ceiling) over the selection
    ///
    /// Agents receive contiguous ranges in selection order starting at
    /// index 0.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::NoAgentsSelected`] for an empty selection
    /// - [`CampaignError::SingleModeAgentCount`] for single mode with several agents
    /// - [`CampaignError::InvalidManualQuantity`] for negative or unknown entries
    /// - [`CampaignError::QuantityExceedsTotal`] when manual quantities overflow
    ///
    /// # Examples
    ///
    /// ```
    /// use campaign_engine::distribution::{DistributionPlanner, DistributionRequest};
    /// use campaign_engine::types::AgentRef;
    ///
    /// let agents = vec![
    ///     AgentRef::new("a", "Alice", "1001"),
    ///     AgentRef::new("b", "Bruno", "1002"),
    ///     AgentRef::new("c", "Carla", "1003"),
    /// ];
    /// let plan = DistributionPlanner::default()
    ///     .plan(10, &DistributionRequest::automatic(agents))
    ///     .unwrap();
    /// assert_eq!(plan.quantities(), vec![3, 3, 4]);
    /// ```
    pub fn plan(
        &self,
        total_contacts: usize,
        request: &DistributionRequest,
    ) -> Result<DistributionPlan> {
        let effective_total = self.config.effective_total(total_contacts);
        if effective_total < total_contacts {
            debug!(
                "Capping {} contacts to the campaign ceiling of {}",
                total_contacts, effective_total
            );
        }

        let targets = self.targets(effective_total, request)?;

        let mut cursor = 0;
        let allocations: Vec<AgentAllocation> = targets
            .agents
            .into_iter()
            .zip(targets.quantities)
            .map(|(agent_id, quantity)| {
                let range = IndexRange::new(cursor, cursor + quantity);
                cursor = range.end;
                AgentAllocation::from_ranges(agent_id, [range])
            })
            .collect();

        let plan = DistributionPlan::new(
            request.mode,
            request.effective_strategy(),
            effective_total,
            allocations,
        );
        info!(
            "📊 Planned {} of {} contacts over {} agents ({} / {})",
            plan.assigned_total(),
            effective_total,
            plan.allocations.len(),
            plan.mode,
            plan.strategy
        );
        Ok(plan)
    }

    /// Validate a selection and compute each agent's quantity
    pub(crate) fn targets(
        &self,
        effective_total: usize,
        request: &DistributionRequest,
    ) -> Result<Targets> {
        let agents = dedup_agents(&request.agents);
        if agents.is_empty() {
            return Err(CampaignError::NoAgentsSelected);
        }

        let quantities = match (request.mode, request.strategy) {
            (DistributionMode::Single, _) => {
                if agents.len() != 1 {
                    return Err(CampaignError::SingleModeAgentCount {
                        selected: agents.len(),
                    });
                }
                vec![effective_total]
            }
            (DistributionMode::Multiple, AllocationStrategy::Automatic) => {
                automatic_quantities(effective_total, agents.len(), self.config.remainder_policy)
            }
            (DistributionMode::Multiple, AllocationStrategy::Manual) => {
                manual_quantities(effective_total, &agents, &request.manual_quantities)?
            }
        };

        Ok(Targets { agents, quantities })
    }
}

/// Agent ids in selection order, first occurrence wins
fn dedup_agents(agents: &[AgentRef]) -> Vec<AgentId> {
    let mut seen = HashSet::with_capacity(agents.len());
    let mut ids = Vec::with_capacity(agents.len());
    for agent in agents {
        if seen.insert(&agent.id) {
            ids.push(agent.id.clone());
        } else {
            warn!("Ignoring duplicate selection of agent {}", agent.id);
        }
    }
    ids
}

/// Even split; the remainder follows the configured policy
pub fn automatic_quantities(
    effective_total: usize,
    agent_count: usize,
    policy: RemainderPolicy,
) -> Vec<usize> {
    if agent_count == 0 {
        return Vec::new();
    }
    let base = effective_total / agent_count;
    let remainder = effective_total % agent_count;

    let mut quantities = vec![base; agent_count];
    match policy {
        RemainderPolicy::LastAgentAbsorbs => {
            if let Some(last) = quantities.last_mut() {
                *last += remainder;
            }
        }
        RemainderPolicy::Drop => {
            if remainder > 0 {
                debug!("Leaving {} contacts unassigned by remainder policy", remainder);
            }
        }
    }
    quantities
}

fn manual_quantities(
    effective_total: usize,
    agents: &[AgentId],
    requested: &HashMap<AgentId, i64>,
) -> Result<Vec<usize>> {
    // sorted so the reported error does not depend on hash order
    let mut entries: Vec<(&AgentId, i64)> = requested.iter().map(|(id, q)| (id, *q)).collect();
    entries.sort_unstable();

    let mut sum: u64 = 0;
    for (agent_id, quantity) in entries {
        if !agents.contains(agent_id) {
            return Err(CampaignError::invalid_manual_quantity(
                agent_id.as_str(),
                "agent is not part of the selection",
            ));
        }
        let quantity = u64::try_from(quantity).map_err(|_| {
            CampaignError::invalid_manual_quantity(
                agent_id.as_str(),
                format!("negative quantity {}", quantity),
            )
        })?;
        sum = sum.saturating_add(quantity);
    }

    if sum > effective_total as u64 {
        return Err(CampaignError::QuantityExceedsTotal {
            requested: sum,
            available: effective_total,
        });
    }

    // every value fits in usize once the sum is within the total
    Ok(agents
        .iter()
        .map(|agent_id| {
            requested
                .get(agent_id)
                .map_or(0, |quantity| usize::try_from(*quantity).unwrap_or(0))
        })
        .collect())
}
