//! Spreadsheet extraction using calamine.
//!
//! Every sheet of the workbook becomes an ordered list of row records keyed by the
//! sheet's header row. Either all sheets are read or the extraction fails; a workbook
//! is never returned with some sheets silently missing.
//!
//! # Supported Formats
//!
//! - `.xlsx` - Excel 2007+
//! - `.xls` - legacy Excel (BIFF)
//!
//! # Header Rules
//!
//! - The first row of the used range is the header row
//! - A blank header cell is named `Unnamed: <column index>`
//! - Repeated header names get `.1`, `.2`, ... suffixes
//! - Fully blank data rows are skipped

use crate::types::{CellValue, EntityValue, RowRecord, StructuredData, WorkbookContent};
use crate::{DocintakeError, Result};
use calamine::{Data, Range, Reader, open_workbook_auto};
use std::collections::HashSet;
use std::path::Path;

/// Largest float that converts to `i64` without losing precision.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Read every sheet of the workbook at `path`.
pub fn read_workbook(path: &Path) -> Result<WorkbookContent> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        DocintakeError::spreadsheet_with_source(format!("Failed to open workbook {}: {}", path.display(), e), e)
    })?;

    let sheet_names = workbook.sheet_names();
    let mut sheets = WorkbookContent::with_capacity(sheet_names.len());

    for name in sheet_names {
        let range = workbook.worksheet_range(&name).map_err(|e| {
            DocintakeError::spreadsheet_with_source(format!("Failed to read sheet '{}': {}", name, e), e)
        })?;
        let records = sheet_to_records(&range);
        tracing::debug!("Sheet '{}': {} rows", name, records.len());
        sheets.insert(name, records);
    }

    Ok(sheets)
}

/// Convert one sheet's used range to row records.
pub fn sheet_to_records(range: &Range<Data>) -> Vec<RowRecord> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Vec::new();
    };

    let first_column = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let headers = header_names(header_row, first_column);

    rows.filter(|row| !row.iter().all(is_blank))
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(index, header)| {
                    let value = row.get(index).map(cell_value).unwrap_or_else(CellValue::empty);
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn header_names(row: &[Data], first_column: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(row.len());
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    row.iter()
        .enumerate()
        .map(|(offset, cell)| {
            let base = match cell_value(cell).to_string() {
                name if name.trim().is_empty() => format!("Unnamed: {}", first_column + offset),
                name => name,
            };

            let mut name = base.clone();
            while seen.contains(&name) {
                let count = counts.entry(base.clone()).or_insert(0);
                *count += 1;
                name = format!("{}.{}", base, count);
            }
            seen.insert(name.clone());
            name
        })
        .collect()
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Convert a calamine cell to a scalar. Blank cells become `""`.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::empty(),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT {
                CellValue::Int(*f as i64)
            } else {
                CellValue::Float(*f)
            }
        }
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => CellValue::Text(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Structured data from the questionnaire sheet: its first row, every cell as a string.
///
/// `None` when the workbook has no such sheet or the sheet has no data rows.
pub fn profile_data(workbook: &WorkbookContent, sheet: &str) -> Option<StructuredData> {
    let first_row = workbook.get(sheet)?.first()?;
    Some(
        first_row
            .iter()
            .map(|(column, value)| (column.clone(), EntityValue::Single(value.to_string())))
            .collect(),
    )
}
