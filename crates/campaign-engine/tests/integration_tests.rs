//! Integration tests for the campaign engine
//!
//! These tests drive an upload through analysis, normalization, planning,
//! storage and roster changes the way the campaign wizard does.

use std::sync::Arc;

use anyhow::Result;
use campaign_engine::prelude::*;

fn agent(id: &str) -> AgentRef {
    AgentRef::new(id, id.to_uppercase(), format!("1{:03}", id.len()))
}

fn lead_file(rows: usize) -> String {
    let mut text = String::from("Nome;Telefone;Cidade;Observação\n");
    for n in 0..rows {
        text.push_str(&format!(
            "Lead {};(11) 9{:04}-{:04};São Paulo;\"ligar, depois\"\n",
            n,
            n % 10_000,
            n % 7_919
        ));
    }
    text
}

#[test]
fn test_upload_to_stored_campaign() -> Result<()> {
    let config = CampaignConfig::default();
    let analyzed = TableAnalyzer::from_config(&config).analyze(lead_file(30).as_bytes(), None)?;

    assert_eq!(analyzed.format, FileFormat::DelimitedText);
    assert_eq!(analyzed.delimiter, Some(b';'));
    assert_eq!(analyzed.table.total_rows(), 30);
    assert_eq!(analyzed.table.preview_rows().len(), 5);
    assert_eq!(analyzed.suggested.name, Some(0));
    assert_eq!(analyzed.suggested.phone, Some(1));

    // the user adds the city as an extra before confirming
    let mapping = analyzed.suggested.with(LogicalField::Extra1, 2);
    let draft = CampaignDraft::from_upload(
        "Recuperação",
        &analyzed.table,
        &mapping,
        true,
        &DistributionRequest::automatic(vec![
            agent("ana"),
            agent("bia"),
            agent("caio"),
            agent("duda"),
        ]),
        &config,
    )?;

    assert_eq!(draft.contacts.len(), 30);
    assert!(draft
        .contacts
        .iter()
        .all(|c| c.phone.as_deref().is_some_and(|p| p.starts_with("5511"))));
    assert_eq!(draft.contacts[3].extra(ExtraField::Extra1), Some("São Paulo"));
    assert_eq!(draft.plan.quantities(), vec![7, 7, 7, 9]);
    assert_eq!(draft.assignments().len(), 30);

    let store = InMemoryCampaignStore::new();
    let campaign = store.create(draft)?;
    assert_eq!(campaign.headers[3], "Observação");
    assert_eq!(campaign.contacts_for(&AgentId::new("duda")).len(), 9);

    let archived = rows_to_objects(analyzed.table.headers(), analyzed.table.body_rows());
    assert_eq!(archived[0]["Observação"], "ligar, depois");
    Ok(())
}

#[test]
fn test_roster_changes_through_editor() -> Result<()> {
    let config = CampaignConfig::default();
    let store = Arc::new(InMemoryCampaignStore::new());
    let editor = CampaignEditor::from_config(store.clone(), &config);

    let contacts = ContactNormalizer::from_config(&config).normalize(
        &(0..10_000)
            .map(|n| vec![format!("Lead {}", n), format!("219{:08}", n)])
            .collect::<Vec<_>>(),
        &ColumnMapping::default().with(LogicalField::Name, 0).with(LogicalField::Phone, 1),
        true,
        &["Nome".to_string(), "Fone".to_string()],
    );
    let plan = DistributionPlanner::new(config.distribution.clone())
        .plan(contacts.len(), &DistributionRequest::automatic(vec![agent("a"), agent("b")]))?;
    let campaign = store.create(CampaignDraft::new("Retenção", vec![], contacts, plan))?;

    // C joins: the tail moves, everything below the split point stays
    let with_c = editor.change_roster(
        campaign.id,
        &DistributionRequest::automatic(vec![agent("a"), agent("b"), agent("c")]),
        RedistributionMode::PreserveAssignments,
    )?;
    assert_eq!(
        with_c.plan.allocation(&AgentId::new("c")).map(|a| a.ranges.clone()),
        Some(vec![IndexRange::new(6_666, 10_000)])
    );
    for index in (0..6_666).step_by(101) {
        assert_eq!(with_c.plan.agent_for(index), campaign.plan.agent_for(index));
    }

    // A leaves: its contacts are folded back to B and C
    let without_a = editor.change_roster(
        campaign.id,
        &DistributionRequest::automatic(vec![agent("b"), agent("c")]),
        RedistributionMode::PreserveAssignments,
    )?;
    assert_eq!(without_a.plan_revision, 2);
    assert_eq!(without_a.plan.assigned_total(), 10_000);
    assert_eq!(without_a.plan.quantities(), vec![5_000, 5_000]);
    assert!(without_a.plan.validate().is_ok());
    for index in 6_666..10_000 {
        assert_eq!(without_a.plan.agent_for(index).map(AgentId::as_str), Some("c"));
    }

    // explicit rebalance lays the roster out contiguously again
    let rebalanced = editor.change_roster(
        campaign.id,
        &DistributionRequest::automatic(vec![agent("b"), agent("c")]),
        RedistributionMode::Rebalance,
    )?;
    assert_eq!(
        rebalanced.plan.allocation(&AgentId::new("b")).map(|a| a.ranges.clone()),
        Some(vec![IndexRange::new(0, 5_000)])
    );
    Ok(())
}

#[test]
fn test_stale_editor_read_conflicts() -> Result<()> {
    let store = InMemoryCampaignStore::new();
    let plan = DistributionPlanner::default().plan(10, &DistributionRequest::single(agent("a")))?;
    let campaign = store.create(CampaignDraft::new("Teste", vec![], vec![], plan))?;

    let engine = RedistributionEngine::default();
    let first = engine.redistribute(&campaign.plan, &DistributionRequest::single(agent("b")), 10)?;
    let second = engine.redistribute(&campaign.plan, &DistributionRequest::single(agent("c")), 10)?;

    store.replace_plan(campaign.id, campaign.plan_revision, first)?;
    let conflict = store.replace_plan(campaign.id, campaign.plan_revision, second);
    assert!(matches!(
        conflict,
        Err(CampaignError::PlanRevisionConflict { expected: 0, actual: 1, .. })
    ));
    Ok(())
}

#[test]
fn test_oversized_upload_is_capped() -> Result<()> {
    let config = CampaignConfig::default();
    let analyzed = TableAnalyzer::from_config(&config)
        .analyze(lead_file(25_000).as_bytes(), Some(FileFormat::DelimitedText))?;
    assert_eq!(analyzed.table.total_rows(), 25_000);

    let contacts = ContactNormalizer::from_config(&config).apply_mapping(
        &analyzed.table,
        &analyzed.suggested,
        false,
    );
    let request = DistributionRequest::automatic(vec![agent("a"), agent("b"), agent("c")]);
    let plan =
        DistributionPlanner::new(config.distribution.clone()).plan(contacts.len(), &request)?;

    assert_eq!(plan.effective_total, 10_000);
    assert_eq!(plan.quantities(), vec![3_333, 3_333, 3_334]);
    assert!(plan.assignments().iter().all(|(index, _)| *index < 10_000));
    Ok(())
}

#[test]
fn test_structural_upload_failures() {
    let analyzer = TableAnalyzer::default();

    let header_only = analyzer.analyze(b"Nome,Fone\n\n", None);
    assert_eq!(header_only.unwrap_err(), CampaignError::EmptyFile);

    let image = analyzer.analyze(b"GIF89a\x01\x00\x01\x00\x00\x00\x00", None);
    assert!(image.unwrap_err().is_ingestion_error());
}

#[test]
fn test_config_file_changes_behaviour() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("campaign.toml");
    std::fs::write(
        &path,
        r#"
[phone]
country_prefix = "351"
local_min_digits = 9
local_max_digits = 9

[distribution]
max_contacts_per_campaign = 4
remainder_policy = "drop"
"#,
    )?;
    let config = CampaignConfig::from_file(&path)?;

    let phone = normalize_phone("912 345 678", true, &config.phone);
    assert_eq!(phone.as_deref(), Some("351912345678"));

    let plan = DistributionPlanner::new(config.distribution.clone())
        .plan(100, &DistributionRequest::automatic(vec![agent("a"), agent("b"), agent("c")]))?;
    assert_eq!(plan.effective_total, 4);
    assert_eq!(plan.quantities(), vec![1, 1, 1]);
    Ok(())
}
