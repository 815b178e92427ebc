//! Distribution plan model
//!
//! A [`DistributionPlan`] is an immutable value: contacts numbered
//! `0..effective_total` in upload order are split into half-open index
//! ranges per agent. Changing a plan means building a new one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::AgentId;

/// How many agents share the campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// One agent handles every contact
    Single,
    /// Contacts are split across several agents
    Multiple,
}

/// How quantities are decided in multiple mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationStrategy {
    /// Even split by integer division
    Automatic,
    /// Caller-supplied per-agent quantities
    Manual,
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionMode::Single => f.write_str("single"),
            DistributionMode::Multiple => f.write_str("multiple"),
        }
    }
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationStrategy::Automatic => f.write_str("automatic"),
            AllocationStrategy::Manual => f.write_str("manual"),
        }
    }
}

/// Half-open range of contact indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }

    /// Indices covered by the range
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Contacts assigned to one agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAllocation {
    pub agent_id: AgentId,
    /// Number of contacts, always the summed length of `ranges`
    pub quantity: usize,
    /// Sorted, disjoint, coalesced ranges
    pub ranges: Vec<IndexRange>,
}

impl AgentAllocation {
    /// Build an allocation from arbitrary ranges, sorting and merging them
    pub fn from_ranges(agent_id: AgentId, ranges: impl IntoIterator<Item = IndexRange>) -> Self {
        let ranges = coalesce(ranges);
        let quantity = ranges.iter().map(IndexRange::len).sum();
        Self {
            agent_id,
            quantity,
            ranges,
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(index))
    }

    /// Assigned indices in ascending order
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(IndexRange::indices)
    }
}

/// Partition of contact indices between agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub mode: DistributionMode,
    /// Always [`AllocationStrategy::Automatic`] in single mode
    pub strategy: AllocationStrategy,
    /// Contact count the plan was computed over, after the ceiling
    pub effective_total: usize,
    /// Non-empty allocations in selection order
    pub allocations: Vec<AgentAllocation>,
}

impl DistributionPlan {
    /// Assemble a plan, dropping empty allocations
    pub fn new(
        mode: DistributionMode,
        strategy: AllocationStrategy,
        effective_total: usize,
        allocations: impl IntoIterator<Item = AgentAllocation>,
    ) -> Self {
        let strategy = match mode {
            DistributionMode::Single => AllocationStrategy::Automatic,
            DistributionMode::Multiple => strategy,
        };
        Self {
            mode,
            strategy,
            effective_total,
            allocations: allocations
                .into_iter()
                .filter(|allocation| allocation.quantity > 0)
                .collect(),
        }
    }

    /// Build a plan from a per-index owner table
    ///
    /// `owners[i]` is a position in `agents`; `None` leaves index `i`
    /// unassigned. Ranges come out sorted and coalesced.
    pub(crate) fn from_owners(
        mode: DistributionMode,
        strategy: AllocationStrategy,
        agents: &[AgentId],
        owners: &[Option<usize>],
    ) -> Self {
        let mut ranges: Vec<Vec<IndexRange>> = vec![Vec::new(); agents.len()];
        let mut start = 0;
        while start < owners.len() {
            let owner = owners[start];
            let mut end = start + 1;
            while end < owners.len() && owners[end] == owner {
                end += 1;
            }
            if let Some(slot) = owner {
                ranges[slot].push(IndexRange::new(start, end));
            }
            start = end;
        }

        let allocations = agents
            .iter()
            .zip(ranges)
            .map(|(agent_id, ranges)| AgentAllocation::from_ranges(agent_id.clone(), ranges));
        Self::new(mode, strategy, owners.len(), allocations)
    }

    /// Total number of assigned contacts
    pub fn assigned_total(&self) -> usize {
        self.allocations.iter().map(|allocation| allocation.quantity).sum()
    }

    /// Indices below `effective_total` that no agent holds
    pub fn unassigned_indices(&self) -> Vec<usize> {
        self.owners()
            .into_iter()
            .enumerate()
            .filter_map(|(index, owner)| owner.is_none().then_some(index))
            .collect()
    }

    /// Owner of every index below `effective_total`
    pub fn owners(&self) -> Vec<Option<&AgentId>> {
        let mut owners = vec![None; self.effective_total];
        for allocation in &self.allocations {
            for index in allocation.indices() {
                if let Some(owner) = owners.get_mut(index) {
                    *owner = Some(&allocation.agent_id);
                }
            }
        }
        owners
    }

    /// Agent holding a contact index
    pub fn agent_for(&self, index: usize) -> Option<&AgentId> {
        self.allocations
            .iter()
            .find(|allocation| allocation.contains(index))
            .map(|allocation| &allocation.agent_id)
    }

    pub fn allocation(&self, agent_id: &AgentId) -> Option<&AgentAllocation> {
        self.allocations
            .iter()
            .find(|allocation| &allocation.agent_id == agent_id)
    }

    /// Quantity held by an agent, zero when absent
    pub fn quantity_of(&self, agent_id: &AgentId) -> usize {
        self.allocation(agent_id).map_or(0, |allocation| allocation.quantity)
    }

    /// Agents in the plan, in selection order
    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> + '_ {
        self.allocations.iter().map(|allocation| &allocation.agent_id)
    }

    /// Quantities in selection order
    pub fn quantities(&self) -> Vec<usize> {
        self.allocations.iter().map(|allocation| allocation.quantity).collect()
    }

    /// Every assigned `(index, agent)` pair, ordered by index
    pub fn assignments(&self) -> Vec<(usize, &AgentId)> {
        let mut pairs: Vec<(usize, &AgentId)> = self
            .allocations
            .iter()
            .flat_map(|allocation| {
                allocation.indices().map(move |index| (index, &allocation.agent_id))
            })
            .collect();
        pairs.sort_unstable_by_key(|(index, _)| *index);
        pairs
    }

    /// Number of indices whose owner differs between `previous` and this plan
    ///
    /// Only indices assigned in `previous` count; newly covered indices are
    /// not moves.
    pub fn moved_from(&self, previous: &DistributionPlan) -> usize {
        let current = self.owners();
        previous
            .assignments()
            .into_iter()
            .filter(|(index, agent)| current.get(*index).copied().flatten() != Some(*agent))
            .count()
    }

    /// Check the structural invariants of the plan
    pub fn validate(&self) -> Result<(), String> {
        let mut owned = vec![false; self.effective_total];
        for allocation in &self.allocations {
            if allocation.quantity == 0 {
                return Err(format!("agent {} has an empty allocation", allocation.agent_id));
            }
            let mut covered = 0;
            for (position, range) in allocation.ranges.iter().enumerate() {
                if range.is_empty() {
                    return Err(format!("agent {} has empty range {}", allocation.agent_id, range));
                }
                if position > 0 && allocation.ranges[position - 1].end >= range.start {
                    return Err(format!(
                        "agent {} ranges are not sorted and coalesced",
                        allocation.agent_id
                    ));
                }
                if range.end > self.effective_total {
                    return Err(format!(
                        "agent {} range {} exceeds effective total {}",
                        allocation.agent_id, range, self.effective_total
                    ));
                }
                for index in range.indices() {
                    if owned[index] {
                        return Err(format!("index {} is assigned twice", index));
                    }
                    owned[index] = true;
                }
                covered += range.len();
            }
            if covered != allocation.quantity {
                return Err(format!(
                    "agent {} quantity {} does not match its ranges ({})",
                    allocation.agent_id, allocation.quantity, covered
                ));
            }
        }
        Ok(())
    }
}

/// Sort ranges, merging overlapping and adjacent ones and dropping empties
pub fn coalesce(ranges: impl IntoIterator<Item = IndexRange>) -> Vec<IndexRange> {
    let mut ranges: Vec<IndexRange> =
        ranges.into_iter().filter(|range| !range.is_empty()).collect();
    ranges.sort_unstable();

    let mut merged: Vec<IndexRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}
