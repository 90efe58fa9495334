//! Regulation lookup table
//!
//! Maps minor hazard categories to the regulation articles that apply to
//! them. The table is a flat list of (major, minor, citation) rows loaded
//! from a CSV file or the first worksheet of a workbook; the same minor
//! category may appear on many rows.

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::entities::category::{HazardCategorySet, MajorCategory};

/// Header of the major category column
pub const MAJOR_COLUMN: &str = "대분류 위험 요인";
/// Header of the minor category column
pub const MINOR_COLUMN: &str = "중분류 위험 요인";
/// Header of the citation column
pub const CITATION_COLUMN: &str = "법규";

const REQUIRED_COLUMNS: [&str; 3] = [MAJOR_COLUMN, MINOR_COLUMN, CITATION_COLUMN];

/// Errors that can occur while loading the lookup table
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("regulation table not found: {0}")]
    NotFound(PathBuf),

    #[error("regulation table is missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("unsupported regulation table format '{0}' (expected csv, xlsx, xls or ods)")]
    UnsupportedFormat(String),

    #[error("regulation table has no header row")]
    NoHeader,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the regulation table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegulationRow {
    pub major_category: String,
    pub minor_category: String,
    pub citation: String,
}

impl RegulationRow {
    pub fn new(
        major_category: impl Into<String>,
        minor_category: impl Into<String>,
        citation: impl Into<String>,
    ) -> Self {
        Self {
            major_category: major_category.into(),
            minor_category: minor_category.into(),
            citation: citation.into(),
        }
    }
}

/// Read-only regulation reference data
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    rows: Vec<RegulationRow>,
    categories: HazardCategorySet,
    source: Option<PathBuf>,
}

impl LookupTable {
    /// Table with no rows; hazard classification is unavailable
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<RegulationRow>) -> Self {
        let mut categories = HazardCategorySet::new();
        for row in &rows {
            match MajorCategory::from_label(&row.major_category) {
                Some(category) => categories.insert(category, row.minor_category.clone()),
                None => debug!(
                    major = %row.major_category,
                    "ignoring regulation row with unrecognised major category"
                ),
            }
        }
        Self {
            rows,
            categories,
            source: None,
        }
    }

    /// Load from a file, choosing the parser by extension
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let mut table = match ext.as_str() {
            "csv" | "txt" => {
                let file = std::fs::File::open(path)?;
                Self::from_csv_reader(file)?
            }
            "xlsx" | "xlsm" | "xls" | "ods" => Self::from_workbook(path)?,
            other => return Err(LoadError::UnsupportedFormat(other.to_string())),
        };
        table.source = Some(path.to_path_buf());

        debug!(
            path = %path.display(),
            rows = table.len(),
            hazards = table.categories.len(),
            "loaded regulation table"
        );
        Ok(table)
    }

    /// Load, or fall back to an empty table with a warning
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!("{}; hazard classification is unavailable", e);
                Self::empty()
            }
        }
    }

    /// Parse CSV content with a header row
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();
        let mut records = Vec::new();
        for record in rdr.records() {
            records.push(record?.iter().map(String::from).collect::<Vec<_>>());
        }
        Ok(Self::from_rows(rows_from_records(&headers, records)?))
    }

    fn from_workbook(path: &Path) -> Result<Self, LoadError> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| LoadError::Workbook(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LoadError::Workbook("workbook has no worksheets".to_string()))?
            .map_err(|e| LoadError::Workbook(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or(LoadError::NoHeader)?
            .iter()
            .map(cell_text)
            .collect();
        let records = rows.map(|r| r.iter().map(cell_text).collect::<Vec<_>>());
        Ok(Self::from_rows(rows_from_records(&headers, records)?))
    }

    pub fn rows(&self) -> &[RegulationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// File the table was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Distinct minor hazards grouped by the six known major categories
    pub fn categories_by_major(&self) -> &HazardCategorySet {
        &self.categories
    }

    /// Every citation whose minor category equals `hazard`, in table order
    ///
    /// Rows with a blank citation name a hazard but contribute no citation.
    pub fn citations_for(&self, hazard: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.minor_category == hazard && !r.citation.is_empty())
            .map(|r| r.citation.clone())
            .collect()
    }
}

fn field(record: &[String], i: usize) -> String {
    record.get(i).map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Render a workbook cell as trimmed text
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Map header names to column positions and build rows
///
/// Header names are compared after stripping a byte-order mark and
/// surrounding whitespace. Rows without a minor category are skipped; rows
/// without a citation are kept so the hazard stays selectable.
fn rows_from_records<I>(headers: &[String], records: I) -> Result<Vec<RegulationRow>, LoadError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
    };

    let mut positions = [0usize; 3];
    let mut missing = Vec::new();
    for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
        match position(name) {
            Some(i) => *slot = i,
            None => missing.push(name.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(LoadError::Schema { missing });
    }
    let [major, minor, citation] = positions;

    Ok(records
        .into_iter()
        .map(|record| RegulationRow {
            major_category: field(&record, major),
            minor_category: field(&record, minor),
            citation: field(&record, citation),
        })
        .filter(|row| !row.minor_category.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\u{feff}대분류 위험 요인,중분류 위험 요인,법규\n\
        전기적 요인,감전,안전보건규칙 제301조\n\
        전기적 요인,감전,안전보건규칙 제302조\n\
        기계(설비)적 요인,끼임,안전보건규칙 제87조\n\
        방사선 요인,피폭,원자력안전법\n";

    fn sample_table() -> LookupTable {
        LookupTable::from_csv_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_csv_with_bom_parses() {
        let table = sample_table();
        assert_eq!(table.len(), 4);
        assert_eq!(table.rows()[0].major_category, "전기적 요인");
    }

    #[test]
    fn test_citations_keep_table_order() {
        let table = sample_table();
        assert_eq!(
            table.citations_for("감전"),
            vec!["안전보건규칙 제301조", "안전보건규칙 제302조"]
        );
        assert!(table.citations_for("추락").is_empty());
        assert!(LookupTable::empty().citations_for("감전").is_empty());
    }

    #[test]
    fn test_unknown_major_category_excluded_from_catalog() {
        let table = sample_table();
        let categories = table.categories_by_major();
        assert_eq!(categories.len(), 2);
        assert!(categories.contains(MajorCategory::Electrical, "감전"));
        assert!(!categories.iter().any(|(_, h)| h.contains("피폭")));
        // The row itself is still available for citation lookup
        assert_eq!(table.citations_for("피폭"), vec!["원자력안전법"]);
    }

    #[test]
    fn test_missing_columns_is_schema_error() {
        let csv = "대분류 위험 요인,법규\n전기적 요인,제301조\n";
        match LookupTable::from_csv_reader(csv.as_bytes()) {
            Err(LoadError::Schema { missing }) => assert_eq!(missing, vec![MINOR_COLUMN]),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_hazard_without_citation_stays_in_catalog() {
        let csv = "대분류 위험 요인,중분류 위험 요인,법규\n\
            생물학적 요인,감염,\n\
            전기적 요인,감전,A\n\
            전기적 요인,아크, 제303조 \n\
            전기적 요인,,제304조\n";
        let table = LookupTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table
            .categories_by_major()
            .contains(MajorCategory::Biological, "감염"));
        assert!(table.citations_for("감염").is_empty());
        assert_eq!(table.citations_for("아크"), vec!["제303조"]);
    }

    #[test]
    fn test_columns_found_by_name_not_position() {
        let csv = "법규,비고,중분류 위험 요인,대분류 위험 요인\n제87조,,끼임,기계(설비)적 요인\n";
        let table = LookupTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.citations_for("끼임"), vec!["제87조"]);
        assert!(table
            .categories_by_major()
            .contains(MajorCategory::Mechanical, "끼임"));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = LookupTable::load(Path::new("/nonexistent/regulations.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_load_or_empty_degrades() {
        let table = LookupTable::load_or_empty(Path::new("/nonexistent/regulations.csv"));
        assert!(table.is_empty());
        assert!(table.categories_by_major().is_empty());
    }

    #[test]
    fn test_load_from_file_records_source() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let table = LookupTable::load(file.path()).unwrap();
        assert_eq!(table.source(), Some(file.path()));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        assert!(matches!(
            LookupTable::load(file.path()),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "json"
        ));
    }
}
