//! Report building and spreadsheet export

pub mod reader;
pub mod rollup;
pub mod sheet;
pub mod writer;

use chrono::NaiveDate;
use thiserror::Error;

pub use reader::{entries_from_sheet, read_xlsx, read_xlsx_bytes, SheetData};
pub use rollup::{
    improvement_tracking, reduction_items, reduction_rollup, ImprovementItem, ImprovementStatus,
    ImprovementSummary, ProcessRollup, ReductionItem,
};
pub use sheet::{build_report, entry_cells, entry_from_row, sheet_name, Cell, ExportOptions, Report, Sheet};
pub use writer::{to_xlsx_bytes, write_csv_dir, write_xlsx};

/// MIME type of the exported workbook
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Errors that can occur while writing or reading a report
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot read workbook: {0}")]
    Read(String),
}

/// Default file name of the exported workbook, e.g. `RiskAssessment_20260515.xlsx`
pub fn report_file_name(date: NaiveDate) -> String {
    format!("RiskAssessment_{}.xlsx", date.format("%Y%m%d"))
}
