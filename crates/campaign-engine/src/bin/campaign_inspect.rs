//! Campaign upload inspector
//!
//! Runs a lead file through the same steps the campaign wizard uses:
//! 1. Detects the format and reads the first table
//! 2. Prints headers, preview rows and the suggested column mapping
//! 3. Normalizes contacts with the suggested mapping
//! 4. Plans a distribution over synthetic agents `agent-1..agent-N`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};

use campaign_engine::logging::parse_log_level;
use campaign_engine::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a campaign lead file", long_about = None)]
struct Args {
    /// Lead file (csv, tsv, xlsx, xls, ods)
    file: PathBuf,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Prepend the configured country code to local numbers
    #[arg(long)]
    add_country_code: bool,

    /// Number of synthetic agents to distribute over
    #[arg(short, long, default_value = "1")]
    agents: usize,

    /// Manual per-agent quantities, comma separated (e.g. 100,250,0)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    manual: Vec<i64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = parse_log_level(&args.log_level)?;
    let mut logging = LoggingConfig::new(level, "campaign-inspect");
    if args.json_logs {
        logging = logging.with_json();
    }
    setup_logging(logging)?;

    let config = match &args.config {
        Some(path) => CampaignConfig::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => CampaignConfig::default(),
    };

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let declared = args
        .file
        .extension()
        .and_then(|extension| extension.to_str())
        .and_then(FileFormat::from_extension);

    let analyzed = TableAnalyzer::from_config(&config).analyze(&bytes, declared)?;
    print_table(&analyzed);

    let contacts = ContactNormalizer::from_config(&config).apply_mapping(
        &analyzed.table,
        &analyzed.suggested,
        args.add_country_code,
    );
    let dialable = contacts.iter().filter(|contact| contact.has_phone()).count();
    println!();
    println!("Contacts: {} ({} with a phone)", contacts.len(), dialable);
    for contact in contacts.iter().take(analyzed.table.preview_rows().len()) {
        println!(
            "  #{:<4} {:<30} {}",
            contact.row_index,
            contact.name.as_deref().unwrap_or("-"),
            contact.phone.as_deref().unwrap_or("-")
        );
    }

    let request = build_request(&args)?;
    let plan =
        DistributionPlanner::new(config.distribution.clone()).plan(contacts.len(), &request)?;
    println!();
    println!(
        "Plan: {} / {} over {} of {} contacts",
        plan.mode,
        plan.strategy,
        plan.assigned_total(),
        plan.effective_total
    );
    for allocation in &plan.allocations {
        let ranges: Vec<String> = allocation.ranges.iter().map(ToString::to_string).collect();
        println!("  {:<10} {:>6}  {}", allocation.agent_id, allocation.quantity, ranges.join(" "));
    }
    if contacts.len() > plan.effective_total {
        warn!(
            "{} contacts exceed the campaign ceiling and were not planned",
            contacts.len() - plan.effective_total
        );
    }

    info!("Inspection of {} complete", args.file.display());
    Ok(())
}

fn build_request(args: &Args) -> Result<DistributionRequest> {
    if args.agents == 0 {
        bail!("--agents must be at least 1");
    }
    let agents: Vec<AgentRef> = (1..=args.agents)
        .map(|n| {
            AgentRef::new(format!("agent-{}", n), format!("Agent {}", n), format!("{}", 1000 + n))
        })
        .collect();

    if args.manual.is_empty() {
        return Ok(if agents.len() == 1 {
            DistributionRequest::single(agents[0].clone())
        } else {
            DistributionRequest::automatic(agents)
        });
    }

    if args.manual.len() != agents.len() {
        bail!(
            "--manual lists {} quantities for {} agents",
            args.manual.len(),
            agents.len()
        );
    }
    let quantities: Vec<(AgentId, i64)> = agents
        .iter()
        .zip(&args.manual)
        .map(|(agent, quantity)| (agent.id.clone(), *quantity))
        .collect();
    Ok(DistributionRequest::manual(agents, quantities))
}

fn print_table(analyzed: &AnalyzedTable) {
    let table = &analyzed.table;
    match analyzed.delimiter {
        Some(delimiter) => println!(
            "Format: {} (delimiter {:?})",
            analyzed.format, delimiter as char
        ),
        None => println!("Format: {}", analyzed.format),
    }
    println!("Rows: {}  Columns: {}", table.total_rows(), table.column_count());
    println!();
    println!("{}", table.headers().join(" | "));
    for row in table.preview_rows() {
        println!("{}", row.join(" | "));
    }

    println!();
    println!("Suggested mapping:");
    for field in LogicalField::ALL {
        if let Some(column) = analyzed.suggested.get(field) {
            println!("  {:<7} -> {} ({})", field, column, table.headers()[column]);
        }
    }
}
