//! Report writers: XLSX workbook and CSV directory

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::entities::RiskBand;
use crate::report::sheet::{Cell, Report, Sheet};
use crate::report::ExportError;

/// Widest column, in characters
const MAX_COLUMN_WIDTH: usize = 50;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
}

fn score_format(band: RiskBand) -> Format {
    Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_background_color(Color::RGB(band.fill_rgb()))
        .set_font_color(Color::RGB(band.font_rgb()))
}

/// Display width estimate; Hangul and other wide glyphs count double
fn display_width(s: &str) -> usize {
    s.lines()
        .map(|line| line.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum())
        .max()
        .unwrap_or(0)
}

fn write_sheet(ws: &mut Worksheet, sheet: &Sheet) -> Result<(), XlsxError> {
    ws.set_name(&sheet.name)?;

    let header = header_format();
    let wrap = Format::new().set_text_wrap().set_align(FormatAlign::Top);
    let mut widths: Vec<usize> = sheet.headers.iter().map(|h| display_width(h)).collect();

    for (col, title) in sheet.headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, title, &header)?;
    }

    for (r, row) in sheet.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(s) if s.is_empty() => {}
                Cell::Text(s) if s.contains('\n') => {
                    ws.write_string_with_format(r, c, s, &wrap)?;
                }
                Cell::Text(s) => {
                    ws.write_string(r, c, s)?;
                }
                Cell::Number(n) => {
                    ws.write_number(r, c, *n as f64)?;
                }
                Cell::Score(score) => {
                    let fmt = score_format(RiskBand::from_score(*score));
                    ws.write_number_with_format(r, c, f64::from(*score), &fmt)?;
                }
            }
            if let Some(w) = widths.get_mut(col) {
                *w = (*w).max(display_width(&cell.to_string()));
            }
        }
    }

    for (col, width) in widths.into_iter().enumerate() {
        ws.set_column_width(col as u16, (width.clamp(6, MAX_COLUMN_WIDTH) + 2) as f64)?;
    }
    ws.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Serialize the report as an XLSX workbook in memory
pub fn to_xlsx_bytes(report: &Report) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let ws = workbook.add_worksheet();
        write_sheet(ws, sheet)?;
        debug!(sheet = %sheet.name, rows = sheet.rows.len(), "wrote worksheet");
    }
    Ok(workbook.save_to_buffer()?)
}

/// Write the report as an XLSX workbook at `path`
pub fn write_xlsx(report: &Report, path: &Path) -> Result<(), ExportError> {
    let bytes = to_xlsx_bytes(report)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)?;
    info!(path = %path.display(), sheets = report.sheets.len(), "exported workbook");
    Ok(())
}

/// Write one CSV file per sheet into `dir`
///
/// Files start with a UTF-8 byte-order mark so spreadsheet applications
/// detect the encoding of Korean text.
pub fn write_csv_dir(report: &Report, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(report.sheets.len());

    for sheet in &report.sheets {
        let path = dir.join(format!("{}.csv", sheet.name));
        let mut file = fs::File::create(&path)?;
        std::io::Write::write_all(&mut file, "\u{feff}".as_bytes())?;

        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            wtr.write_record(row.iter().map(Cell::to_string))?;
        }
        wtr.flush()?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "exported CSV sheets");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AssessmentRegister;
    use crate::report::sheet::{build_report, ExportOptions, COMPANY_SHEET, PROCESS_SHEET};

    #[test]
    fn test_display_width_counts_wide_chars() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("공정"), 4);
        assert_eq!(display_width("a\n공정명"), 6);
    }

    #[test]
    fn test_xlsx_bytes_are_zip() {
        let report = build_report(&AssessmentRegister::new(), ExportOptions::default());
        let bytes = to_xlsx_bytes(&report).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_csv_dir_has_file_per_sheet() {
        let tmp = tempfile::tempdir().unwrap();
        let report = build_report(&AssessmentRegister::new(), ExportOptions::default());
        let files = write_csv_dir(&report, tmp.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(tmp.path().join(format!("{}.csv", COMPANY_SHEET)).exists());

        let content = fs::read_to_string(tmp.path().join(format!("{}.csv", PROCESS_SHEET))).unwrap();
        assert!(content.starts_with('\u{feff}'));
        assert!(content.contains("공정명,공정설명"));
        assert!(content.contains("공정 1,"));
    }
}
