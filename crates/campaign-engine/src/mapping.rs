//! Column mapping between uploaded columns and contact fields
//!
//! The mapping UI sends indices it got from the user ([`RawColumnMapping`]).
//! They are sanitized once against the table width into a
//! [`ColumnMapping`], after which every present index is safe to read.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::ExtraField;

/// Logical contact fields a column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalField {
    Name,
    Phone,
    Extra1,
    Extra2,
    Extra3,
}

impl LogicalField {
    pub const ALL: [LogicalField; 5] = [
        LogicalField::Name,
        LogicalField::Phone,
        LogicalField::Extra1,
        LogicalField::Extra2,
        LogicalField::Extra3,
    ];

    /// The extra slot this field addresses, if any
    pub fn extra(&self) -> Option<ExtraField> {
        match self {
            LogicalField::Extra1 => Some(ExtraField::Extra1),
            LogicalField::Extra2 => Some(ExtraField::Extra2),
            LogicalField::Extra3 => Some(ExtraField::Extra3),
            LogicalField::Name | LogicalField::Phone => None,
        }
    }
}

impl From<ExtraField> for LogicalField {
    fn from(field: ExtraField) -> Self {
        match field {
            ExtraField::Extra1 => LogicalField::Extra1,
            ExtraField::Extra2 => LogicalField::Extra2,
            ExtraField::Extra3 => LogicalField::Extra3,
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogicalField::Name => "name",
            LogicalField::Phone => "phone",
            LogicalField::Extra1 => "extra1",
            LogicalField::Extra2 => "extra2",
            LogicalField::Extra3 => "extra3",
        };
        f.pad(name)
    }
}

/// Unvalidated mapping as submitted by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawColumnMapping {
    pub name: Option<i64>,
    pub phone: Option<i64>,
    pub extra1: Option<i64>,
    pub extra2: Option<i64>,
    pub extra3: Option<i64>,
}

impl RawColumnMapping {
    pub fn get(&self, field: LogicalField) -> Option<i64> {
        match field {
            LogicalField::Name => self.name,
            LogicalField::Phone => self.phone,
            LogicalField::Extra1 => self.extra1,
            LogicalField::Extra2 => self.extra2,
            LogicalField::Extra3 => self.extra3,
        }
    }

    /// Drop every index that is negative or outside `0..column_count`
    pub fn sanitize(&self, column_count: usize) -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        for field in LogicalField::ALL {
            let Some(raw) = self.get(field) else {
                continue;
            };
            match usize::try_from(raw) {
                Ok(index) if index < column_count => mapping.set(field, Some(index)),
                _ => warn!(
                    "Dropping {} mapping: column {} is outside 0..{}",
                    field, raw, column_count
                ),
            }
        }
        mapping
    }
}

/// Validated mapping from logical fields to column indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: Option<usize>,
    pub phone: Option<usize>,
    pub extra1: Option<usize>,
    pub extra2: Option<usize>,
    pub extra3: Option<usize>,
}

impl ColumnMapping {
    pub fn get(&self, field: LogicalField) -> Option<usize> {
        match field {
            LogicalField::Name => self.name,
            LogicalField::Phone => self.phone,
            LogicalField::Extra1 => self.extra1,
            LogicalField::Extra2 => self.extra2,
            LogicalField::Extra3 => self.extra3,
        }
    }

    pub fn set(&mut self, field: LogicalField, index: Option<usize>) {
        let slot = match field {
            LogicalField::Name => &mut self.name,
            LogicalField::Phone => &mut self.phone,
            LogicalField::Extra1 => &mut self.extra1,
            LogicalField::Extra2 => &mut self.extra2,
            LogicalField::Extra3 => &mut self.extra3,
        };
        *slot = index;
    }

    /// Builder-style variant of [`ColumnMapping::set`]
    pub fn with(mut self, field: LogicalField, index: usize) -> Self {
        self.set(field, Some(index));
        self
    }

    /// Re-check indices against a table width, dropping stale ones
    pub fn sanitize(&self, column_count: usize) -> ColumnMapping {
        let mut mapping = *self;
        for field in LogicalField::ALL {
            if let Some(index) = self.get(field) {
                if index >= column_count {
                    warn!(
                        "Dropping {} mapping: column {} is outside 0..{}",
                        field, index, column_count
                    );
                    mapping.set(field, None);
                }
            }
        }
        mapping
    }

    /// Mapped extra slots with their column
    pub fn extras(&self) -> impl Iterator<Item = (ExtraField, usize)> + '_ {
        ExtraField::ALL
            .into_iter()
            .filter_map(|field| self.get(field.into()).map(|index| (field, index)))
    }

    pub fn is_empty(&self) -> bool {
        LogicalField::ALL.iter().all(|field| self.get(*field).is_none())
    }
}

impl From<ColumnMapping> for RawColumnMapping {
    fn from(mapping: ColumnMapping) -> Self {
        let widen = |index: Option<usize>| index.and_then(|i| i64::try_from(i).ok());
        Self {
            name: widen(mapping.name),
            phone: widen(mapping.phone),
            extra1: widen(mapping.extra1),
            extra2: widen(mapping.extra2),
            extra3: widen(mapping.extra3),
        }
    }
}
