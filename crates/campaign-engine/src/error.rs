//! Error handling for campaign ingestion and distribution
//!
//! Structural problems (an unreadable upload, an invalid agent selection,
//! over-allocation) surface as [`CampaignError`]. Data-quality problems in
//! individual cells never do: they degrade to absent values instead.

use thiserror::Error;
use uuid::Uuid;

/// Result type for campaign operations
pub type Result<T> = std::result::Result<T, CampaignError>;

/// Errors produced by the campaign engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CampaignError {
    /// The upload is neither delimited text nor a readable spreadsheet
    #[error("Unsupported file format: {details}")]
    UnsupportedFormat { details: String },

    /// The upload has no data rows after the header
    #[error("File contains no data rows")]
    EmptyFile,

    /// The upload exceeds the configured size bound
    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: usize, limit: usize },

    /// No agent was selected for the distribution
    #[error("No agents selected for distribution")]
    NoAgentsSelected,

    /// Single mode needs exactly one agent
    #[error("Single distribution mode requires exactly one agent, got {selected}")]
    SingleModeAgentCount { selected: usize },

    /// A manual quantity is negative or refers to an unknown agent
    #[error("Invalid manual quantity for agent '{agent_id}': {reason}")]
    InvalidManualQuantity { agent_id: String, reason: String },

    /// Manual quantities add up to more than the effective total
    #[error("Manual quantities sum to {requested}, exceeding the effective total of {available}")]
    QuantityExceedsTotal { requested: u64, available: usize },

    /// Campaign lookup failed
    #[error("Campaign not found: {id}")]
    CampaignNotFound { id: Uuid },

    /// The stored plan changed since it was read
    #[error("Plan revision conflict for campaign {id}: expected {expected}, found {actual}")]
    PlanRevisionConflict { id: Uuid, expected: u64, actual: u64 },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CampaignError {
    /// Create a new unsupported format error
    pub fn unsupported_format(details: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            details: details.into(),
        }
    }

    /// Create a new invalid manual quantity error
    pub fn invalid_manual_quantity(agent_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidManualQuantity {
            agent_id: agent_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error comes from reading the uploaded file
    pub fn is_ingestion_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::EmptyFile | Self::FileTooLarge { .. }
        )
    }

    /// Whether the error comes from validating an agent selection
    pub fn is_distribution_error(&self) -> bool {
        matches!(
            self,
            Self::NoAgentsSelected
                | Self::SingleModeAgentCount { .. }
                | Self::InvalidManualQuantity { .. }
                | Self::QuantityExceedsTotal { .. }
        )
    }
}
