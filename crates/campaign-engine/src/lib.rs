//! # Campaign Engine
//!
//! This crate provides the contact side of outbound ("mailing") campaigns for a
//! call center: it turns an uploaded lead spreadsheet into normalized contacts
//! and splits those contacts between outbound agents.
//!
//! ## Features
//!
//! - **Upload Analysis**: CSV/TSV and XLSX/XLS/ODS detection, delimiter inference, preview
//! - **Column Suggestion**: Heuristic name and phone column guessing, always overridable
//! - **Contact Normalization**: Trimmed names, digits-only phones with optional country code
//! - **Distribution Planning**: Single agent, even split or manual quantities under a ceiling
//! - **Redistribution**: Roster changes that keep in-progress contacts with their agent
//! - **Campaign Store**: Storage trait with compare-and-swap plan replacement
//!
//! ## Architecture
//!
//! ```text
//!  upload bytes ─► ingestion ─► RawTable + suggested ColumnMapping
//!                                  │ (user confirms mapping)
//!                                  ▼
//!                              normalize ─► Vec<Contact>
//!                                  │
//!                                  ▼
//!                        distribution::planner ─► DistributionPlan ─► CampaignStore
//!                                                                        │
//!                  roster change ─► distribution::redistribution ◄───────┘
//! ```
//!
//! - [`ingestion`]: Table Analyzer
//! - [`normalize`]: Contact Normalizer
//! - [`distribution`]: Distribution Planner and Redistribution Engine
//! - [`campaign`]: Campaign records, store trait and roster editor
//! - [`config`], [`logging`], [`error`]: configuration, tracing setup and errors
//!
//! ## Quick Start
//!
//! ```rust
//! use campaign_engine::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = CampaignConfig::default();
//! let upload = b"Nome,Fone,Cidade\nAna,11999998888,SP\nBia,(21) 98888-7777,RJ\n";
//!
//! let analyzed = TableAnalyzer::from_config(&config).analyze(upload, None)?;
//! let agents = vec![AgentRef::new("a-1", "Alice", "1001"), AgentRef::new("a-2", "Bruno", "1002")];
//! let draft = CampaignDraft::from_upload(
//!     "Leads",
//!     &analyzed.table,
//!     &analyzed.suggested,
//!     true,
//!     &DistributionRequest::automatic(agents),
//!     &config,
//! )?;
//!
//! assert_eq!(draft.contacts[1].phone.as_deref(), Some("5521988887777"));
//! assert_eq!(draft.plan.quantities(), vec![1, 1]);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod logging;
pub mod mapping;
pub mod types;

// Components
pub mod distribution;
pub mod ingestion;
pub mod normalize;

// Storage boundary
pub mod campaign;

// Re-exports for convenience
pub use config::CampaignConfig;
pub use error::{CampaignError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    // Core types
    pub use crate::{CampaignConfig, CampaignError, Result};

    // Configuration types
    pub use crate::config::{DistributionConfig, IngestionConfig, PhoneConfig, RemainderPolicy};
    pub use crate::logging::{setup_logging, LoggingConfig};

    // Shared values
    pub use crate::mapping::{ColumnMapping, LogicalField, RawColumnMapping};
    pub use crate::types::{AgentId, AgentRef, Contact, ExtraField};

    // Components
    pub use crate::distribution::{
        AgentAllocation, AllocationStrategy, DistributionMode, DistributionPlan,
        DistributionPlanner, DistributionRequest, IndexRange, RedistributionEngine,
        RedistributionMode,
    };
    pub use crate::ingestion::{AnalyzedTable, FileFormat, RawTable, TableAnalyzer};
    pub use crate::normalize::{normalize_phone, rows_to_objects, ContactNormalizer};

    // Campaigns
    pub use crate::campaign::{
        Campaign, CampaignDraft, CampaignEditor, CampaignStore, InMemoryCampaignStore,
    };

    // Common external types
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
