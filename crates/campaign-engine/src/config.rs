//! # Campaign Engine Configuration
//!
//! Tunable parameters for upload analysis, phone normalization and contact
//! distribution. Every section has defaults matching the platform's
//! behaviour, so an empty TOML document yields a working configuration.
//!
//! ## Examples
//!
//! ```
//! use campaign_engine::config::{CampaignConfig, RemainderPolicy};
//!
//! let config = CampaignConfig::default();
//! assert_eq!(config.distribution.max_contacts_per_campaign, 10_000);
//! assert_eq!(config.phone.country_prefix, "55");
//! assert_eq!(config.distribution.remainder_policy, RemainderPolicy::LastAgentAbsorbs);
//! assert!(config.validate().is_ok());
//! ```
//!
//! ```
//! use campaign_engine::config::CampaignConfig;
//!
//! let config = CampaignConfig::from_toml_str(r#"
//!     [phone]
//!     country_prefix = "351"
//!
//!     [distribution]
//!     remainder_policy = "drop"
//! "#).unwrap();
//! assert_eq!(config.phone.country_prefix, "351");
//! assert_eq!(config.ingestion.preview_rows, 5);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CampaignError, Result};

/// Hard platform ceiling on contacts assignable in one campaign run
pub const DEFAULT_MAX_CONTACTS_PER_CAMPAIGN: usize = 10_000;

/// Upper bound for the preview shown to the user
pub const MAX_PREVIEW_ROWS: usize = 10;

/// Campaign engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Upload analysis settings
    pub ingestion: IngestionConfig,

    /// Phone recognition and normalization settings
    pub phone: PhoneConfig,

    /// Contact distribution settings
    pub distribution: DistributionConfig,
}

/// Upload analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Number of data rows kept in the preview
    pub preview_rows: usize,

    /// Number of non-blank lines inspected when inferring the delimiter
    pub sniff_lines: usize,

    /// Columns beyond this count are truncated
    pub max_columns: usize,

    /// Uploads larger than this are rejected before parsing
    pub max_file_bytes: usize,

    /// Non-empty values sampled per column when suggesting a mapping
    pub suggestion_sample_rows: usize,

    /// Minimum share of phone-like samples for a phone column candidate
    pub phone_column_threshold: f64,
}

/// Phone recognition and normalization configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhoneConfig {
    /// Country calling code prepended to local numbers
    pub country_prefix: String,

    /// Shortest digit string treated as a local number (area code included)
    pub local_min_digits: usize,

    /// Longest digit string treated as a local number (area code included)
    pub local_max_digits: usize,

    /// Shortest digit string the suggester accepts as a phone
    pub min_phone_digits: usize,

    /// Longest digit string the suggester accepts as a phone
    pub max_phone_digits: usize,

    /// Strip leading trunk zeros ("011 ...") when adding the country code.
    /// Off by default so plain normalization keeps every digit.
    pub strip_trunk_zeros: bool,
}

/// What happens to `total mod agents` contacts in automatic mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// The last selected agent receives the leftover contacts
    LastAgentAbsorbs,
    /// Leftover contacts stay unassigned
    Drop,
}

/// Contact distribution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Ceiling applied to the uploaded contact count
    pub max_contacts_per_campaign: usize,

    /// Remainder handling shared by planning and redistribution
    pub remainder_policy: RemainderPolicy,
}

impl CampaignConfig {
    /// Parse a configuration from TOML text and validate it
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| CampaignError::config(format!("Invalid TOML: {}", e)))?;
        config.validate().map_err(CampaignError::Config)?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CampaignError::config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!("Loading campaign configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Render the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CampaignError::config(format!("Cannot serialize configuration: {}", e)))
    }

    /// Validate the configuration settings
    ///
    /// # Returns
    ///
    /// - `Ok(())` if every section is consistent
    /// - `Err(String)` with a description of the first problem found
    pub fn validate(&self) -> std::result::Result<(), String> {
        let ingestion = &self.ingestion;
        if ingestion.preview_rows == 0 || ingestion.preview_rows > MAX_PREVIEW_ROWS {
            return Err(format!(
                "preview_rows must be between 1 and {}",
                MAX_PREVIEW_ROWS
            ));
        }

        if ingestion.sniff_lines == 0 {
            return Err("sniff_lines must be greater than 0".to_string());
        }

        if ingestion.max_columns == 0 {
            return Err("max_columns must be greater than 0".to_string());
        }

        if ingestion.max_file_bytes == 0 {
            return Err("max_file_bytes must be greater than 0".to_string());
        }

        if ingestion.suggestion_sample_rows == 0 {
            return Err("suggestion_sample_rows must be greater than 0".to_string());
        }

        if !(ingestion.phone_column_threshold > 0.0 && ingestion.phone_column_threshold <= 1.0) {
            return Err("phone_column_threshold must be in (0, 1]".to_string());
        }

        let phone = &self.phone;
        if phone.country_prefix.is_empty()
            || !phone.country_prefix.chars().all(|c| c.is_ascii_digit())
        {
            return Err(format!(
                "country_prefix must be a non-empty digit string, got '{}'",
                phone.country_prefix
            ));
        }

        if phone.local_min_digits == 0 || phone.local_min_digits > phone.local_max_digits {
            return Err("local_min_digits must be between 1 and local_max_digits".to_string());
        }

        if phone.min_phone_digits == 0 || phone.min_phone_digits > phone.max_phone_digits {
            return Err("min_phone_digits must be between 1 and max_phone_digits".to_string());
        }

        if self.distribution.max_contacts_per_campaign == 0 {
            return Err("max_contacts_per_campaign must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            sniff_lines: 10,
            max_columns: 256,
            max_file_bytes: 20 * 1024 * 1024,
            suggestion_sample_rows: 50,
            phone_column_threshold: 0.6,
        }
    }
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            country_prefix: "55".to_string(),
            local_min_digits: 10,
            local_max_digits: 11,
            min_phone_digits: 8,
            max_phone_digits: 15,
            strip_trunk_zeros: false,
        }
    }
}

impl Default for RemainderPolicy {
    fn default() -> Self {
        RemainderPolicy::LastAgentAbsorbs
    }
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            max_contacts_per_campaign: DEFAULT_MAX_CONTACTS_PER_CAMPAIGN,
            remainder_policy: RemainderPolicy::default(),
        }
    }
}

impl DistributionConfig {
    /// Contact count actually used for allocation math
    pub fn effective_total(&self, total_contacts: usize) -> usize {
        total_contacts.min(self.max_contacts_per_campaign)
    }
}
