//! Heuristic column mapping suggestion
//!
//! The suggestion is only a starting point for the mapping screen; the user
//! always confirms or overrides it before normalization runs.

use tracing::debug;

use super::table::RawTable;
use crate::config::{IngestionConfig, PhoneConfig};
use crate::mapping::ColumnMapping;

/// Header tokens that name a person or company
const NAME_TOKENS: &[&str] = &[
    "nome", "name", "cliente", "client", "customer", "contato", "contact", "razao", "lead",
    "responsavel", "pessoa", "fullname", "firstname",
];

/// Header tokens that name a phone column
const PHONE_TOKENS: &[&str] = &[
    "telefone", "fone", "phone", "telephone", "celular", "cel", "tel", "whatsapp", "whats",
    "mobile", "numero", "number", "contato1",
];

/// Characters users sprinkle into phone numbers
const PHONE_PUNCTUATION: &[char] = &['+', '(', ')', '-', '.', '/'];

/// Suggest `name` and `phone` columns for a table; extras are left unmapped
pub fn suggest_mapping(
    table: &RawTable,
    phone_config: &PhoneConfig,
    config: &IngestionConfig,
) -> ColumnMapping {
    let phone = suggest_phone_column(table, phone_config, config);
    let name = suggest_name_column(table, phone);

    debug!(
        "Suggested mapping: name={:?} phone={:?} over {} columns",
        name,
        phone,
        table.column_count()
    );

    ColumnMapping {
        name,
        phone,
        ..ColumnMapping::default()
    }
}

/// Whether a single value reads as a phone number
pub fn is_phone_like(value: &str, config: &PhoneConfig) -> bool {
    let mut digits = 0usize;
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            digits += 1;
        } else if !(ch.is_whitespace() || PHONE_PUNCTUATION.contains(&ch)) {
            return false;
        }
    }
    (config.min_phone_digits..=config.max_phone_digits).contains(&digits)
}

/// Share of sampled non-empty values that look like phones
pub fn phone_score(table: &RawTable, column: usize, phone: &PhoneConfig, sample: usize) -> f64 {
    let mut sampled = 0usize;
    let mut phone_like = 0usize;
    for value in table
        .column(column)
        .filter(|value| !value.trim().is_empty())
        .take(sample)
    {
        sampled += 1;
        if is_phone_like(value, phone) {
            phone_like += 1;
        }
    }

    if sampled == 0 {
        0.0
    } else {
        phone_like as f64 / sampled as f64
    }
}

fn suggest_phone_column(
    table: &RawTable,
    phone: &PhoneConfig,
    config: &IngestionConfig,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for column in 0..table.column_count() {
        let score = phone_score(table, column, phone, config.suggestion_sample_rows);
        debug!("Column {} '{}' phone score {:.2}", column, table.headers()[column], score);
        if score < config.phone_column_threshold {
            continue;
        }
        // strictly greater keeps the leftmost column on ties
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((column, score));
        }
    }

    if let Some((column, _)) = best {
        return Some(column);
    }

    (0..table.column_count()).find(|column| {
        header_matches(&table.headers()[*column], PHONE_TOKENS)
            && phone_score(table, *column, phone, config.suggestion_sample_rows) > 0.0
    })
}

fn suggest_name_column(table: &RawTable, phone: Option<usize>) -> Option<usize> {
    let candidates = || (0..table.column_count()).filter(move |column| Some(*column) != phone);

    candidates()
        .find(|column| header_matches(&table.headers()[*column], NAME_TOKENS))
        .or_else(|| candidates().next())
}

/// Case and accent insensitive token match against a header
pub fn header_matches(header: &str, tokens: &[&str]) -> bool {
    let folded: String = header
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_accent)
        .collect();

    let compact: String = folded.chars().filter(|c| c.is_alphanumeric()).collect();
    folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| tokens.contains(&token))
        || tokens.contains(&compact.as_str())
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}
