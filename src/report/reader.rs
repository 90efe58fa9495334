//! Reading an exported workbook back into text rows

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;

use crate::entities::{RiskEntry, ValidationError};
use crate::report::sheet::{entry_from_row, ENTRY_COLUMNS};
use crate::report::ExportError;

/// Text content of one worksheet; `rows` excludes the header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetData {
    /// Whether the header row matches the risk-entry layout
    pub fn is_entry_sheet(&self) -> bool {
        self.headers.len() >= ENTRY_COLUMNS.len()
            && self.headers.iter().zip(ENTRY_COLUMNS).all(|(h, c)| h == c)
    }
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read every worksheet of an XLSX workbook held in memory
pub fn read_xlsx_bytes(bytes: &[u8]) -> Result<Vec<SheetData>, ExportError> {
    let mut workbook: Xlsx<Cursor<&[u8]>> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e: calamine::XlsxError| ExportError::Read(e.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExportError::Read(format!("{}: {}", name, e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|r| r.iter().map(cell_string).collect())
            .unwrap_or_default();
        let width = headers.len();
        let rows = rows
            .map(|r| {
                let mut row: Vec<String> = r.iter().map(cell_string).collect();
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();

        sheets.push(SheetData { name, headers, rows });
    }
    Ok(sheets)
}

/// Read every worksheet of the XLSX workbook at `path`
pub fn read_xlsx(path: &Path) -> Result<Vec<SheetData>, ExportError> {
    let bytes = std::fs::read(path)?;
    read_xlsx_bytes(&bytes)
}

/// Rebuild the risk entries stored in a process sheet
pub fn entries_from_sheet(sheet: &SheetData) -> Result<Vec<RiskEntry>, ValidationError> {
    sheet.rows.iter().map(|row| entry_from_row(row)).collect()
}
