//! # Upload Analysis
//!
//! Turns the bytes of an uploaded lead file into a [`RawTable`] and a
//! suggested [`ColumnMapping`].
//!
//! ```text
//!  bytes ──► sniff_format ──┬─► decode_text ─► detect_delimiter ─► read_records ──┐
//!                           └─► read_first_sheet (xlsx / xls / ods) ──────────────┤
//!                                                                                 ▼
//!                                      RawTable::from_rows ─► suggest_mapping ─► AnalyzedTable
//! ```
//!
//! Only structural problems fail: an unknown container
//! ([`CampaignError::UnsupportedFormat`]) or nothing below the header
//! ([`CampaignError::EmptyFile`]). Odd cells are kept verbatim so the user
//! can see them in the preview.
//!
//! ## Example
//!
//! ```
//! use campaign_engine::ingestion::{FileFormat, TableAnalyzer};
//!
//! let analyzer = TableAnalyzer::default();
//! let upload = "Nome;Fone;Cidade\nAna;11999998888;SP\nBia;(21) 98888-7777;RJ\n";
//! let analyzed = analyzer.analyze(upload.as_bytes(), None).unwrap();
//!
//! assert_eq!(analyzed.format, FileFormat::DelimitedText);
//! assert_eq!(analyzed.delimiter, Some(b';'));
//! assert_eq!(analyzed.table.headers(), &["Nome", "Fone", "Cidade"]);
//! assert_eq!(analyzed.suggested.phone, Some(1));
//! assert_eq!(analyzed.suggested.name, Some(0));
//! ```

pub mod delimited;
pub mod format;
pub mod spreadsheet;
pub mod suggest;
pub mod table;

pub use format::{sniff_format, FileFormat};
pub use suggest::suggest_mapping;
pub use table::RawTable;

use serde::Serialize;
use tracing::info;

use crate::config::{CampaignConfig, IngestionConfig, PhoneConfig};
use crate::error::{CampaignError, Result};
use crate::mapping::ColumnMapping;

/// Result of analyzing one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedTable {
    /// Detected container format
    pub format: FileFormat,
    /// Field delimiter, for delimited text only
    pub delimiter: Option<u8>,
    /// Rectangular table with preview
    pub table: RawTable,
    /// Best-guess mapping, always overridable
    pub suggested: ColumnMapping,
}

/// Upload analyzer
#[derive(Debug, Clone, Default)]
pub struct TableAnalyzer {
    ingestion: IngestionConfig,
    phone: PhoneConfig,
}

impl TableAnalyzer {
    pub fn new(ingestion: IngestionConfig, phone: PhoneConfig) -> Self {
        Self { ingestion, phone }
    }

    pub fn from_config(config: &CampaignConfig) -> Self {
        Self::new(config.ingestion.clone(), config.phone.clone())
    }

    /// Analyze an uploaded file
    ///
    /// `declared` is an optional hint (for example from the file extension);
    /// the content decides.
    ///
    /// # Errors
    ///
    /// - [`CampaignError::FileTooLarge`] above `max_file_bytes`
    /// - [`CampaignError::EmptyFile`] for empty input or a header without rows
    /// - [`CampaignError::UnsupportedFormat`] for binary or unreadable containers
    pub fn analyze(&self, bytes: &[u8], declared: Option<FileFormat>) -> Result<AnalyzedTable> {
        if bytes.len() > self.ingestion.max_file_bytes {
            return Err(CampaignError::FileTooLarge {
                size: bytes.len(),
                limit: self.ingestion.max_file_bytes,
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CampaignError::EmptyFile);
        }

        let format = sniff_format(bytes, declared)?;
        let (rows, delimiter) = match format {
            FileFormat::DelimitedText => {
                let text = format::decode_text(bytes)?;
                let delimiter =
                    delimited::detect_delimiter(&text, self.ingestion.sniff_lines).unwrap_or(b',');
                (delimited::read_records(&text, delimiter), Some(delimiter))
            }
            spreadsheet_format => (spreadsheet::read_first_sheet(bytes, spreadsheet_format)?, None),
        };

        let table = RawTable::from_rows(rows, &self.ingestion)?;
        let suggested = suggest_mapping(&table, &self.phone, &self.ingestion);

        info!(
            "📥 Analyzed {} upload: {} columns, {} data rows",
            format,
            table.column_count(),
            table.total_rows()
        );

        Ok(AnalyzedTable {
            format,
            delimiter,
            table,
            suggested,
        })
    }
}
