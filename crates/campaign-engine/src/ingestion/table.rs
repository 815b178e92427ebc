//! Rectangular table built from parsed upload rows
//!
//! All leniency about ragged input lives here: rows are padded or truncated
//! once, headers are made addressable and unique, so later stages can index
//! freely.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::{IngestionConfig, MAX_PREVIEW_ROWS};
use crate::error::{CampaignError, Result};

/// Parsed upload with a header row and rectangular body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTable {
    headers: Vec<String>,
    preview_rows: Vec<Vec<String>>,
    body_rows: Vec<Vec<String>>,
    total_rows: usize,
}

impl RawTable {
    /// Build a table from raw parsed rows, the first non-blank one being the header
    ///
    /// # Errors
    ///
    /// [`CampaignError::EmptyFile`] when there is no header or no data row.
    pub fn from_rows(rows: Vec<Vec<String>>, config: &IngestionConfig) -> Result<Self> {
        let mut rows = rows.into_iter().filter(|row| !is_blank(row));
        let headers = rows.next().ok_or(CampaignError::EmptyFile)?;
        let body_rows: Vec<Vec<String>> = rows.collect();
        if body_rows.is_empty() {
            return Err(CampaignError::EmptyFile);
        }

        let widest = body_rows.iter().map(Vec::len).max().unwrap_or(0);
        let width = headers.len().max(widest).min(config.max_columns);
        Ok(Self::from_parts(headers, body_rows, width, config.preview_rows))
    }

    /// Assemble a table from headers and body rows, forcing every row to
    /// `headers.len()` cells
    pub fn new(headers: Vec<String>, body_rows: Vec<Vec<String>>, preview_rows: usize) -> Self {
        let width = headers.len();
        Self::from_parts(headers, body_rows, width, preview_rows)
    }

    fn from_parts(
        mut headers: Vec<String>,
        mut body_rows: Vec<Vec<String>>,
        width: usize,
        preview_rows: usize,
    ) -> Self {
        headers.resize(width, String::new());
        let headers = addressable_headers(headers);

        let mut ragged = 0usize;
        for row in body_rows.iter_mut() {
            if row.len() != width {
                ragged += 1;
                row.resize(width, String::new());
            }
        }
        if ragged > 0 {
            debug!("Padded or truncated {} ragged rows to {} columns", ragged, width);
        }

        let preview_len = preview_rows.clamp(1, MAX_PREVIEW_ROWS).min(body_rows.len());
        let preview_rows = body_rows[..preview_len].to_vec();
        let total_rows = body_rows.len();

        Self {
            headers,
            preview_rows,
            body_rows,
            total_rows,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// First rows for display
    pub fn preview_rows(&self) -> &[Vec<String>] {
        &self.preview_rows
    }

    pub fn body_rows(&self) -> &[Vec<String>] {
        &self.body_rows
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Position of a header by exact name
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.body_rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }

    /// Split into headers and body rows
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.body_rows)
    }
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Trim headers, label empty ones by position and suffix duplicates
fn addressable_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(headers.len());
    headers
        .into_iter()
        .enumerate()
        .map(|(index, header)| {
            let trimmed = header.trim();
            let base = if trimmed.is_empty() {
                format!("Column {}", index + 1)
            } else {
                trimmed.to_string()
            };

            let mut candidate = base.clone();
            let mut copy = 2;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{} ({})", base, copy);
                copy += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn test_ragged_rows_are_padded_to_widest() {
        let rows = vec![
            row(&["Nome", "Fone"]),
            row(&["Ana", "11999998888", "SP"]),
            row(&["Bia"]),
        ];
        let table = RawTable::from_rows(rows, &IngestionConfig::default()).unwrap();

        assert_eq!(table.headers(), &["Nome", "Fone", "Column 3"]);
        assert_eq!(table.body_rows()[1], row(&["Bia", "", ""]));
        assert!(table.body_rows().iter().all(|r| r.len() == 3));
        assert_eq!(table.total_rows(), 2);
    }

    #[test]
    fn test_columns_beyond_limit_are_truncated() {
        let config = IngestionConfig {
            max_columns: 2,
            ..IngestionConfig::default()
        };
        let rows = vec![row(&["a", "b", "c"]), row(&["1", "2", "3"])];
        let table = RawTable::from_rows(rows, &config).unwrap();
        assert_eq!(table.headers(), &["a", "b"]);
        assert_eq!(table.body_rows()[0], row(&["1", "2"]));
    }

    #[test]
    fn test_headers_are_trimmed_synthesized_and_unique() {
        let rows = vec![
            row(&[" Nome ", "", "Nome", "Nome"]),
            row(&["x", "y", "z", "w"]),
        ];
        let table = RawTable::from_rows(rows, &IngestionConfig::default()).unwrap();
        assert_eq!(table.headers(), &["Nome", "Column 2", "Nome (2)", "Nome (3)"]);
        assert_eq!(table.header_index("Nome (2)"), Some(2));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let rows = vec![
            row(&["", " "]),
            row(&["Nome", "Fone"]),
            row(&["", ""]),
            row(&["Ana", "1"]),
        ];
        let table = RawTable::from_rows(rows, &IngestionConfig::default()).unwrap();
        assert_eq!(table.headers(), &["Nome", "Fone"]);
        assert_eq!(table.total_rows(), 1);
    }

    #[test]
    fn test_header_only_is_empty_file() {
        let rows = vec![row(&["Nome", "Fone"]), row(&["", ""])];
        assert_eq!(
            RawTable::from_rows(rows, &IngestionConfig::default()),
            Err(CampaignError::EmptyFile)
        );
        assert_eq!(
            RawTable::from_rows(Vec::new(), &IngestionConfig::default()),
            Err(CampaignError::EmptyFile)
        );
    }

    #[test]
    fn test_preview_is_bounded() {
        let mut rows = vec![row(&["n"])];
        rows.extend((0..100).map(|i| vec![i.to_string()]));
        let table = RawTable::from_rows(rows, &IngestionConfig::default()).unwrap();
        assert_eq!(table.preview_rows().len(), 5);
        assert_eq!(table.total_rows(), 100);

        let table = RawTable::new(vec!["n".to_string()], vec![vec!["1".to_string()]], 50);
        assert_eq!(table.preview_rows().len(), 1);
    }

    #[test]
    fn test_new_forces_header_width() {
        let table = RawTable::new(
            row(&["a", "b"]),
            vec![row(&["1", "2", "3"]), row(&[])],
            5,
        );
        assert_eq!(table.body_rows(), &[row(&["1", "2"]), row(&["", ""])]);
        assert_eq!(table.column(1).collect::<Vec<_>>(), vec!["2", ""]);
    }
}
