//! Table rendering for list output

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::truncate_str;

/// A column of a list table
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub header: &'static str,
    /// Maximum characters shown; longer cells are truncated
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(header: &'static str, width: usize) -> Self {
        Self { header, width }
    }
}

/// Render rows under `columns` as a rounded table
pub fn render(columns: &[ColumnDef], rows: &[Vec<String>]) -> String {
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header.to_string()));
    for row in rows {
        builder.push_record(
            columns
                .iter()
                .zip(row)
                .map(|(col, cell)| truncate_str(cell, col.width)),
        );
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
