//! Delimited text: delimiter inference and quote-aware record reading

use std::collections::HashMap;

use tracing::{debug, warn};

/// Delimiters considered, in tie-break order
pub const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Infer the field delimiter from the first `sample_records` non-blank records
///
/// Each candidate scores the number of records whose unquoted occurrence
/// count equals its most frequent non-zero count. The highest score wins,
/// then the higher per-record count, then candidate order. `None` means no
/// candidate occurs at all (a single-column file).
pub fn detect_delimiter(text: &str, sample_records: usize) -> Option<u8> {
    let records = sample_counts(text, sample_records);

    let mut best: Option<(usize, usize, u8)> = None;
    for (position, delimiter) in CANDIDATE_DELIMITERS.iter().enumerate() {
        let Some((mode, score)) = consistent_count(records.iter().map(|counts| counts[position]))
        else {
            continue;
        };
        debug!(
            "Delimiter {:?}: {} of {} records have {} occurrences",
            *delimiter as char,
            score,
            records.len(),
            mode
        );

        let better = match best {
            None => true,
            Some((best_score, best_mode, _)) => (score, mode) > (best_score, best_mode),
        };
        if better {
            best = Some((score, mode, *delimiter));
        }
    }

    best.map(|(_, _, delimiter)| delimiter)
}

/// Most frequent non-zero count and how many records share it
fn consistent_count(counts: impl Iterator<Item = usize>) -> Option<(usize, usize)> {
    let mut frequency: HashMap<usize, usize> = HashMap::new();
    for count in counts.filter(|count| *count > 0) {
        *frequency.entry(count).or_default() += 1;
    }
    frequency
        .into_iter()
        .max_by_key(|(count, records)| (*records, *count))
        .map(|(count, records)| (count, records))
}

/// Per-record occurrence counts of every candidate outside quoted sections
fn sample_counts(text: &str, limit: usize) -> Vec<[usize; 3]> {
    let mut records = Vec::new();
    let mut counts = [0usize; 3];
    let mut in_quotes = false;
    let mut blank = true;

    for ch in text.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            blank = false;
            continue;
        }
        if in_quotes {
            if !ch.is_whitespace() {
                blank = false;
            }
            continue;
        }
        if ch == '\n' {
            if !blank {
                records.push(counts);
                if records.len() >= limit {
                    return records;
                }
            }
            counts = [0; 3];
            blank = true;
            continue;
        }
        match CANDIDATE_DELIMITERS.iter().position(|d| *d as char == ch) {
            Some(position) => counts[position] += 1,
            None if !ch.is_whitespace() => blank = false,
            None => {}
        }
    }

    if !blank && records.len() < limit {
        records.push(counts);
    }
    records
}

/// Read every record with the given delimiter, keeping cells verbatim
///
/// Records that fail to parse are skipped with a warning; a malformed line
/// never aborts the upload.
pub fn read_records(text: &str, delimiter: u8) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        match record {
            Ok(record) => rows.push(record.iter().map(str::to_string).collect()),
            Err(e) => warn!("Skipping unreadable record {}: {}", index + 1, e),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_semicolon_over_commas_in_values() {
        let text = "Nome;Fone;Cidade\nAna;11999998888;São Paulo, SP\nBia;21988887777;Rio, RJ\n";
        assert_eq!(detect_delimiter(text, 10), Some(b';'));
    }

    #[test]
    fn test_detects_tab_and_comma() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3\n", 10), Some(b'\t'));
        assert_eq!(detect_delimiter("a,b\n1,2\n3,4\n", 10), Some(b','));
    }

    #[test]
    fn test_quoted_delimiters_do_not_count() {
        let text = "name;phone\n\"Silva, Ana\";1199\n\"Souza, Bia\";2198\n";
        assert_eq!(detect_delimiter(text, 10), Some(b';'));

        let text = "\"a;b\",c\n\"d;e\",f\n";
        assert_eq!(detect_delimiter(text, 10), Some(b','));
    }

    #[test]
    fn test_single_column_has_no_delimiter() {
        assert_eq!(detect_delimiter("phone\n11999998888\n", 10), None);
        assert_eq!(detect_delimiter("", 10), None);
    }

    #[test]
    fn test_sample_limit_is_respected() {
        let mut text = String::from("a;b\n1;2\n");
        for _ in 0..20 {
            text.push_str("x,y,z\n");
        }
        assert_eq!(detect_delimiter(&text, 2), Some(b';'));
        assert_eq!(detect_delimiter(&text, 22), Some(b','));
    }

    #[test]
    fn test_read_records_honours_quotes() {
        let rows = read_records("name,city\n\"Silva, Ana\",\"São Paulo\"\nBia\n", b',');
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["Silva, Ana".to_string(), "São Paulo".to_string()]);
        assert_eq!(rows[2], vec!["Bia".to_string()]);
    }

    #[test]
    fn test_read_records_keeps_cells_verbatim() {
        let rows = read_records("a;b\n  x ; y\n", b';');
        assert_eq!(rows[1], vec!["  x ".to_string(), " y".to_string()]);
    }
}
