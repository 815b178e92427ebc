//! Campaign records and the store boundary
//!
//! Persistence is not part of this crate. [`CampaignStore`] is the seam the
//! host application implements; [`InMemoryCampaignStore`] backs tests and
//! tooling. Plans are replaced with a compare-and-swap on
//! [`Campaign::plan_revision`] so two supervisors editing the same roster
//! cannot silently overwrite each other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CampaignConfig;
use crate::distribution::{
    DistributionPlan, DistributionPlanner, DistributionRequest, RedistributionEngine,
    RedistributionMode,
};
use crate::error::{CampaignError, Result};
use crate::ingestion::RawTable;
use crate::mapping::ColumnMapping;
use crate::normalize::ContactNormalizer;
use crate::types::{AgentId, Contact};

/// A configured campaign that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    /// Upload headers, kept for export
    pub headers: Vec<String>,
    /// Contacts in upload order; plan indices point into this list
    pub contacts: Vec<Contact>,
    pub plan: DistributionPlan,
}

impl CampaignDraft {
    pub fn new(
        name: impl Into<String>,
        headers: Vec<String>,
        contacts: Vec<Contact>,
        plan: DistributionPlan,
    ) -> Self {
        Self {
            name: name.into(),
            headers,
            contacts,
            plan,
        }
    }

    /// Normalize an analyzed upload and plan it in one step
    pub fn from_upload(
        name: impl Into<String>,
        table: &RawTable,
        mapping: &ColumnMapping,
        add_country_code: bool,
        request: &DistributionRequest,
        config: &CampaignConfig,
    ) -> Result<Self> {
        let contacts = ContactNormalizer::from_config(config).apply_mapping(
            table,
            mapping,
            add_country_code,
        );
        let plan =
            DistributionPlanner::new(config.distribution.clone()).plan(contacts.len(), request)?;
        Ok(Self::new(name, table.headers().to_vec(), contacts, plan))
    }

    /// Each planned contact with the agent that will call it
    pub fn assignments(&self) -> Vec<(&Contact, &AgentId)> {
        pair_contacts(&self.contacts, &self.plan)
    }
}

/// A stored campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub headers: Vec<String>,
    pub contacts: Vec<Contact>,
    pub plan: DistributionPlan,
    /// Bumped on every plan replacement
    pub plan_revision: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    fn from_draft(draft: CampaignDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            headers: draft.headers,
            contacts: draft.contacts,
            plan: draft.plan,
            plan_revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn assignments(&self) -> Vec<(&Contact, &AgentId)> {
        pair_contacts(&self.contacts, &self.plan)
    }

    /// Contacts planned for one agent, in upload order
    pub fn contacts_for(&self, agent_id: &AgentId) -> Vec<&Contact> {
        self.plan
            .allocation(agent_id)
            .map(|allocation| {
                allocation
                    .indices()
                    .filter_map(|index| self.contacts.get(index))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn pair_contacts<'a>(
    contacts: &'a [Contact],
    plan: &'a DistributionPlan,
) -> Vec<(&'a Contact, &'a AgentId)> {
    plan.assignments()
        .into_iter()
        .filter_map(|(index, agent_id)| contacts.get(index).map(|contact| (contact, agent_id)))
        .collect()
}

/// Campaign storage trait
pub trait CampaignStore: Send + Sync {
    fn create(&self, draft: CampaignDraft) -> Result<Campaign>;
    fn get(&self, id: Uuid) -> Result<Campaign>;
    /// All campaigns, oldest first
    fn list(&self) -> Result<Vec<Campaign>>;
    /// Swap the plan if the stored revision still equals `expected_revision`
    fn replace_plan(
        &self,
        id: Uuid,
        expected_revision: u64,
        plan: DistributionPlan,
    ) -> Result<Campaign>;
    fn delete(&self, id: Uuid) -> Result<()>;
}

/// [`CampaignStore`] held in process memory
#[derive(Debug, Default)]
pub struct InMemoryCampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
}

impl InMemoryCampaignStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }
}

impl CampaignStore for InMemoryCampaignStore {
    fn create(&self, draft: CampaignDraft) -> Result<Campaign> {
        let campaign = Campaign::from_draft(draft);
        info!(
            "🗂️ Storing campaign '{}' ({}) with {} contacts",
            campaign.name,
            campaign.id,
            campaign.contact_count()
        );
        self.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    fn get(&self, id: Uuid) -> Result<Campaign> {
        self.campaigns
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(CampaignError::CampaignNotFound { id })
    }

    fn list(&self) -> Result<Vec<Campaign>> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|entry| entry.value().clone()).collect();
        campaigns.sort_by_key(|campaign| (campaign.created_at, campaign.id));
        Ok(campaigns)
    }

    fn replace_plan(
        &self,
        id: Uuid,
        expected_revision: u64,
        plan: DistributionPlan,
    ) -> Result<Campaign> {
        match self.campaigns.entry(id) {
            Entry::Vacant(_) => Err(CampaignError::CampaignNotFound { id }),
            Entry::Occupied(mut entry) => {
                let campaign = entry.get_mut();
                if campaign.plan_revision != expected_revision {
                    warn!(
                        "Rejecting plan for campaign {}: revision {} is stale (now {})",
                        id, expected_revision, campaign.plan_revision
                    );
                    return Err(CampaignError::PlanRevisionConflict {
                        id,
                        expected: expected_revision,
                        actual: campaign.plan_revision,
                    });
                }
                campaign.plan = plan;
                campaign.plan_revision += 1;
                campaign.updated_at = Utc::now();
                debug!("Campaign {} now at plan revision {}", id, campaign.plan_revision);
                Ok(campaign.clone())
            }
        }
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        self.campaigns
            .remove(&id)
            .map(|_| ())
            .ok_or(CampaignError::CampaignNotFound { id })
    }
}

/// Applies roster changes to stored campaigns
pub struct CampaignEditor {
    store: Arc<dyn CampaignStore>,
    engine: RedistributionEngine,
}

impl CampaignEditor {
    pub fn new(store: Arc<dyn CampaignStore>, engine: RedistributionEngine) -> Self {
        Self { store, engine }
    }

    pub fn from_config(store: Arc<dyn CampaignStore>, config: &CampaignConfig) -> Self {
        Self::new(store, RedistributionEngine::new(config.distribution.clone()))
    }

    /// Redistribute a campaign for a new agent selection and store the result
    ///
    /// The plan is computed against the revision read here; a concurrent
    /// edit in between surfaces as [`CampaignError::PlanRevisionConflict`].
    pub fn change_roster(
        &self,
        id: Uuid,
        request: &DistributionRequest,
        mode: RedistributionMode,
    ) -> Result<Campaign> {
        let campaign = self.store.get(id)?;
        let plan = self
            .engine
            .redistribute_with(&campaign.plan, request, campaign.contact_count(), mode)?;
        self.store.replace_plan(id, campaign.plan_revision, plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AgentRef;

    fn contacts(count: usize) -> Vec<Contact> {
        (0..count)
            .map(|row_index| Contact {
                row_index,
                name: Some(format!("Lead {}", row_index)),
                phone: Some(format!("55119999{:05}", row_index)),
                extras: Default::default(),
            })
            .collect()
    }

    fn draft(count: usize, agents: &[&str]) -> CampaignDraft {
        let selection: Vec<AgentRef> = agents.iter().map(|id| AgentRef::new(*id, "", "")).collect();
        let plan = DistributionPlanner::default()
            .plan(count, &DistributionRequest::automatic(selection))
            .unwrap();
        let headers = vec!["Nome".into(), "Fone".into()];
        CampaignDraft::new("Black Friday", headers, contacts(count), plan)
    }

    #[test]
    fn test_draft_assignments_pair_contacts_with_agents() {
        let draft = draft(5, &["a", "b"]);
        let pairs = draft.assignments();
        assert_eq!(pairs.len(), 5);
        assert_eq!(pairs[0].0.row_index, 0);
        assert_eq!(pairs[0].1.as_str(), "a");
        assert_eq!(pairs[4].1.as_str(), "b");
    }

    #[test]
    fn test_create_get_list_delete() {
        let store = InMemoryCampaignStore::new();
        let first = store.create(draft(4, &["a"])).unwrap();
        let second = store.create(draft(2, &["b"])).unwrap();

        assert_eq!(store.get(first.id).unwrap(), first);
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(first.plan_revision, 0);
        assert_eq!(second.contacts_for(&AgentId::new("b")).len(), 2);

        store.delete(first.id).unwrap();
        assert_eq!(
            store.get(first.id),
            Err(CampaignError::CampaignNotFound { id: first.id })
        );
        assert!(store.delete(first.id).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replace_plan_is_compare_and_swap() {
        let store = InMemoryCampaignStore::new();
        let campaign = store.create(draft(6, &["a"])).unwrap();
        let replacement = DistributionPlanner::default()
            .plan(6, &DistributionRequest::single(AgentRef::new("b", "", "")))
            .unwrap();

        let updated = store.replace_plan(campaign.id, 0, replacement.clone()).unwrap();
        assert_eq!(updated.plan_revision, 1);
        assert_eq!(updated.plan, replacement);

        let stale = store.replace_plan(campaign.id, 0, replacement);
        assert_eq!(
            stale,
            Err(CampaignError::PlanRevisionConflict {
                id: campaign.id,
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn test_editor_changes_roster_from_the_tail() {
        let store = Arc::new(InMemoryCampaignStore::new());
        let campaign = store.create(draft(10, &["a", "b"])).unwrap();
        let editor = CampaignEditor::new(store.clone(), RedistributionEngine::default());

        let selection = vec![
            AgentRef::new("a", "", ""),
            AgentRef::new("b", "", ""),
            AgentRef::new("c", "", ""),
        ];
        let updated = editor
            .change_roster(
                campaign.id,
                &DistributionRequest::automatic(selection),
                RedistributionMode::PreserveAssignments,
            )
            .unwrap();

        assert_eq!(updated.plan_revision, 1);
        assert_eq!(updated.plan.quantity_of(&AgentId::new("c")), 4);
        assert_eq!(updated.plan.agent_for(9).map(AgentId::as_str), Some("c"));
        assert_eq!(updated.plan.agent_for(5).map(AgentId::as_str), Some("b"));
        assert_eq!(store.get(campaign.id).unwrap().plan, updated.plan);
    }

    #[test]
    fn test_editor_reports_missing_campaign() {
        let editor = CampaignEditor::from_config(
            Arc::new(InMemoryCampaignStore::new()),
            &CampaignConfig::default(),
        );
        let id = Uuid::new_v4();
        assert_eq!(
            editor
                .change_roster(
                    id,
                    &DistributionRequest::automatic(vec![AgentRef::new("a", "", "")]),
                    RedistributionMode::Rebalance,
                )
                .map(|c| c.id),
            Err(CampaignError::CampaignNotFound { id })
        );
    }
}
