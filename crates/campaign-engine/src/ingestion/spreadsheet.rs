//! Spreadsheet containers read through calamine

use std::fmt;
use std::io::{Cursor, Read, Seek};

use calamine::{open_workbook_from_rs, Data, Ods, Reader, Xls, Xlsx};
use tracing::debug;

use super::format::FileFormat;
use crate::error::{CampaignError, Result};

/// Read the first worksheet that holds any cell, rendered as text rows
pub fn read_first_sheet(bytes: &[u8], format: FileFormat) -> Result<Vec<Vec<String>>> {
    let cursor = Cursor::new(bytes);
    match format {
        FileFormat::Xlsx => {
            let workbook: Xlsx<_> = open_workbook_from_rs(cursor).map_err(open_error(format))?;
            first_sheet_rows(workbook)
        }
        FileFormat::Xls => {
            let workbook: Xls<_> = open_workbook_from_rs(cursor).map_err(open_error(format))?;
            first_sheet_rows(workbook)
        }
        FileFormat::Ods => {
            let workbook: Ods<_> = open_workbook_from_rs(cursor).map_err(open_error(format))?;
            first_sheet_rows(workbook)
        }
        FileFormat::DelimitedText => Err(CampaignError::unsupported_format(
            "delimited text is not a spreadsheet container",
        )),
    }
}

fn open_error<E: fmt::Display>(format: FileFormat) -> impl Fn(E) -> CampaignError {
    move |e| CampaignError::unsupported_format(format!("cannot open {} workbook: {}", format, e))
}

fn first_sheet_rows<RS, R>(mut workbook: R) -> Result<Vec<Vec<String>>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: fmt::Display,
{
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            CampaignError::unsupported_format(format!("cannot read worksheet '{}': {}", name, e))
        })?;
        if range.is_empty() {
            debug!("Skipping empty worksheet '{}'", name);
            continue;
        }

        debug!("Reading worksheet '{}' ({} rows)", name, range.height());
        return Ok(range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect());
    }

    Ok(Vec::new())
}

/// Render a cell the way a user typed it
///
/// Phone numbers stored as numbers come back as floats; integral values are
/// printed without a fractional part.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", *value as i64)
        }
        other => other.to_string(),
    }
}
