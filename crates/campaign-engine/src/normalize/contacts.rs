//! Row to contact mapping

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::phone::normalize_phone;
use crate::config::{CampaignConfig, PhoneConfig};
use crate::ingestion::RawTable;
use crate::mapping::ColumnMapping;
use crate::types::Contact;

/// Applies a confirmed column mapping to uploaded rows
#[derive(Debug, Clone, Default)]
pub struct ContactNormalizer {
    phone: PhoneConfig,
}

impl ContactNormalizer {
    pub fn new(phone: PhoneConfig) -> Self {
        Self { phone }
    }

    pub fn from_config(config: &CampaignConfig) -> Self {
        Self::new(config.phone.clone())
    }

    pub fn phone_config(&self) -> &PhoneConfig {
        &self.phone
    }

    /// Map every body row to a [`Contact`]
    ///
    /// The mapping is checked against `headers.len()` first, so a mapping
    /// built for a wider table cannot index past a row. Rows shorter than
    /// the header read missing cells as empty. Never fails: contacts without
    /// a usable phone are kept with `phone: None`.
    pub fn normalize(
        &self,
        body_rows: &[Vec<String>],
        mapping: &ColumnMapping,
        add_country_code: bool,
        headers: &[String],
    ) -> Vec<Contact> {
        let mapping = mapping.sanitize(headers.len());

        let contacts: Vec<Contact> = body_rows
            .iter()
            .enumerate()
            .map(|(row_index, row)| {
                self.contact_from_row(row_index, row, &mapping, add_country_code)
            })
            .collect();

        let without_phone = contacts.iter().filter(|c| !c.has_phone()).count();
        if without_phone > 0 {
            debug!("{} of {} contacts have no usable phone", without_phone, contacts.len());
        }
        info!(
            "📇 Normalized {} contacts (country code: {})",
            contacts.len(),
            if add_country_code { "on" } else { "off" }
        );
        contacts
    }

    /// [`ContactNormalizer::normalize`] over an analyzed table
    pub fn apply_mapping(
        &self,
        table: &RawTable,
        mapping: &ColumnMapping,
        add_country_code: bool,
    ) -> Vec<Contact> {
        self.normalize(table.body_rows(), mapping, add_country_code, table.headers())
    }

    fn contact_from_row(
        &self,
        row_index: usize,
        row: &[String],
        mapping: &ColumnMapping,
        add_country_code: bool,
    ) -> Contact {
        let cell = |index: Option<usize>| index.and_then(|i| row.get(i)).map(String::as_str);

        let name = cell(mapping.name)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        let phone = cell(mapping.phone)
            .and_then(|raw| normalize_phone(raw, add_country_code, &self.phone));

        let extras = mapping
            .extras()
            .filter_map(|(field, index)| {
                let value = row.get(index)?.trim();
                (!value.is_empty()).then(|| (field, value.to_string()))
            })
            .collect();

        Contact {
            row_index,
            name,
            phone,
            extras,
        }
    }
}

/// Pair every header with its raw cell, one map per row
///
/// No normalization happens here; the output is meant for archival and
/// export. Missing trailing cells read as empty strings.
pub fn rows_to_objects(
    headers: &[String],
    body_rows: &[Vec<String>],
) -> Vec<BTreeMap<String, String>> {
    body_rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    (header.clone(), row.get(index).cloned().unwrap_or_default())
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::LogicalField;
    use crate::types::ExtraField;
    use proptest::prelude::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn test_ana_and_bia() {
        let headers = strings(&["Nome", "Fone", "Cidade"]);
        let rows = vec![
            strings(&["Ana", "11999998888", "SP"]),
            strings(&["Bia", "(21) 98888-7777", "RJ"]),
        ];
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1)
            .with(LogicalField::Extra1, 2);

        let contacts = ContactNormalizer::default().normalize(&rows, &mapping, true, &headers);

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name.as_deref(), Some("Ana"));
        assert_eq!(contacts[0].phone.as_deref(), Some("5511999998888"));
        assert_eq!(contacts[0].extra(ExtraField::Extra1), Some("SP"));
        assert_eq!(contacts[1].name.as_deref(), Some("Bia"));
        assert_eq!(contacts[1].phone.as_deref(), Some("5521988887777"));
        assert_eq!(contacts[1].extra(ExtraField::Extra1), Some("RJ"));
        assert_eq!(contacts[1].row_index, 1);
    }

    #[test]
    fn test_without_country_code_phone_is_the_plain_digits() {
        let headers = strings(&["Nome", "Fone"]);
        let rows = vec![strings(&["Ana", "0800 123 4567"])];
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1);

        let contacts = ContactNormalizer::default().normalize(&rows, &mapping, false, &headers);
        assert_eq!(contacts[0].phone.as_deref(), Some("08001234567"));
    }

    #[test]
    fn test_blank_values_are_absent_and_rows_kept() {
        let headers = strings(&["Nome", "Fone", "Obs"]);
        let rows = vec![strings(&["  ", "n/d", ""])];
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1)
            .with(LogicalField::Extra2, 2);

        let contacts = ContactNormalizer::default().normalize(&rows, &mapping, true, &headers);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name, None);
        assert_eq!(contacts[0].phone, None);
        assert!(contacts[0].extras.is_empty());
    }

    #[test]
    fn test_out_of_range_mapping_is_ignored() {
        let headers = strings(&["Nome", "Fone"]);
        let rows = vec![strings(&["Ana", "11999998888", "leftover"])];
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1)
            .with(LogicalField::Extra3, 2);

        let contacts = ContactNormalizer::default().normalize(&rows, &mapping, false, &headers);
        assert_eq!(contacts[0].phone.as_deref(), Some("11999998888"));
        assert_eq!(contacts[0].extra(ExtraField::Extra3), None);
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let headers = strings(&["Nome", "Fone"]);
        let rows = vec![strings(&["Ana"])];
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1);

        let contacts = ContactNormalizer::default().normalize(&rows, &mapping, true, &headers);
        assert_eq!(contacts[0].name.as_deref(), Some("Ana"));
        assert_eq!(contacts[0].phone, None);
    }

    #[test]
    fn test_apply_mapping_over_table() {
        let table = RawTable::new(
            strings(&["Nome", "Fone"]),
            vec![strings(&[" Caio ", "+55 31 97777-6666"])],
            5,
        );
        let mapping = ColumnMapping::default()
            .with(LogicalField::Name, 0)
            .with(LogicalField::Phone, 1);
        let contacts = ContactNormalizer::default().apply_mapping(&table, &mapping, true);
        assert_eq!(contacts[0].name.as_deref(), Some("Caio"));
        assert_eq!(contacts[0].phone.as_deref(), Some("5531977776666"));
    }

    #[test]
    fn test_rows_to_objects_keeps_raw_cells() {
        let headers = strings(&["Nome", "Fone"]);
        let rows = vec![strings(&[" Ana ", "(11) 99999-8888"])];
        let objects = rows_to_objects(&headers, &rows);
        assert_eq!(objects[0]["Nome"], " Ana ");
        assert_eq!(objects[0]["Fone"], "(11) 99999-8888");
    }

    proptest! {
        #[test]
        fn prop_rows_to_objects_round_trip(
            width in 1usize..6,
            cells in proptest::collection::vec(".{0,8}", 0..40),
        ) {
            let headers: Vec<String> = (0..width).map(|i| format!("h{}", i)).collect();
            let rows: Vec<Vec<String>> = cells.chunks(width)
                .filter(|chunk| chunk.len() == width)
                .map(|chunk| chunk.to_vec())
                .collect();

            let objects = rows_to_objects(&headers, &rows);
            prop_assert_eq!(objects.len(), rows.len());
            for (object, row) in objects.iter().zip(&rows) {
                let rebuilt: Vec<String> = headers.iter().map(|h| object[h].clone()).collect();
                prop_assert_eq!(&rebuilt, row);
            }
        }

        #[test]
        fn prop_any_mapping_is_safe(
            indices in proptest::collection::vec(proptest::option::of(0usize..12), 5),
            width in 1usize..5,
        ) {
            let headers: Vec<String> = (0..width).map(|i| format!("c{}", i)).collect();
            let rows = vec![vec!["11999998888".to_string(); width]];
            let mut mapping = ColumnMapping::default();
            for (field, index) in LogicalField::ALL.into_iter().zip(indices) {
                mapping.set(field, index);
            }

            let contacts = ContactNormalizer::default().normalize(&rows, &mapping, true, &headers);
            prop_assert_eq!(contacts.len(), 1);
            let phone_mapped = matches!(mapping.phone, Some(i) if i < width);
            prop_assert_eq!(contacts[0].has_phone(), phone_mapped);
        }
    }
}
