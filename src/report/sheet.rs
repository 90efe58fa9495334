//! Flattening the register into named tabular sheets

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::entry::{normalize_citations, normalize_newlines};
use crate::entities::{
    AssessmentRegister, MajorCategory, Process, RiskEntry, ValidationError,
};
use crate::report::rollup;

pub const COMPANY_SHEET: &str = "CompanyInfo";
pub const PROCESS_SHEET: &str = "ProcessList";
pub const RISK_INFO_SHEET: &str = "RiskInfo";
pub const CLASSIFICATION_SHEET: &str = "Classification";
pub const REDUCTION_SHEET: &str = "ReductionPlan";

/// Characters of the process name kept in its sheet name
pub const SHEET_NAME_CHARS: usize = 20;

/// Date format used in every sheet
pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const COMPANY_COLUMNS: [&str; 9] = [
    "회사명",
    "주소",
    "전화번호",
    "팩스번호",
    "대표자",
    "주요생산품",
    "근로자수",
    "평가일자",
    "평가자",
];

pub const PROCESS_COLUMNS: [&str; 2] = ["공정명", "공정설명"];

/// Risk entry columns, in record order
pub const ENTRY_COLUMNS: [&str; 15] = [
    "분류",
    "유해 위험 요인",
    "작업내용",
    "원인",
    "관련 법규",
    "현재상태 및 조치",
    "가능성(빈도)",
    "중대성(강도)",
    "위험성",
    "감소 대책",
    "개선후 위험성",
    "개선 예정일",
    "완료일",
    "담당자",
    "비고",
];

pub const REDUCTION_COLUMNS: [&str; 6] = [
    "공정명",
    "유해 위험 요인",
    "위험성",
    "감소 대책",
    "개선 예정일",
    "담당자",
];

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
    /// Risk score; writers colour it by band
    Score(u8),
}

impl Cell {
    /// Text cell; carriage returns become `\n`
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.contains('\r') {
            Cell::Text(normalize_newlines(&s))
        } else {
            Cell::Text(s)
        }
    }

    fn date(d: Option<NaiveDate>) -> Self {
        Cell::Text(d.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default())
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Score(s) => write!(f, "{}", s),
        }
    }
}

/// A named table with a header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            name: name.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Ordered collection of sheets ready to be written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub sheets: Vec<Sheet>,
}

impl Report {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Export switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Append the risk-info, classification and reduction-plan sheets
    pub detail_sheets: bool,
}

/// Sheet name for the process at 0-based `index`
///
/// `"{index + 1}_{first 20 characters of the name}"`. Characters Excel does
/// not allow in sheet names are replaced with `_`.
pub fn sheet_name(index: usize, process_name: &str) -> String {
    let truncated: String = process_name
        .chars()
        .take(SHEET_NAME_CHARS)
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let mut name = format!("{}_{}", index + 1, truncated);
    if name.ends_with('\'') {
        name.pop();
        name.push('_');
    }
    name
}

/// Cells for one entry, in [`ENTRY_COLUMNS`] order
pub fn entry_cells(entry: &RiskEntry) -> Vec<Cell> {
    vec![
        Cell::text(entry.category.label()),
        Cell::text(&entry.hazard),
        Cell::text(&entry.task_description),
        Cell::text(&entry.cause),
        Cell::text(normalize_citations(&entry.legal_basis).join("\n")),
        Cell::text(&entry.current_controls),
        Cell::text(entry.likelihood.to_string()),
        Cell::text(entry.severity.to_string()),
        Cell::Score(entry.risk_score()),
        Cell::text(&entry.reduction_plan),
        Cell::text(entry.post_improvement_risk.label()),
        Cell::date(entry.target_date),
        Cell::date(entry.completion_date),
        Cell::text(&entry.owner),
        Cell::text(&entry.note),
    ]
}

fn parse_date(s: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::Date(s.to_string()))
}

/// Rebuild an entry from a text row in [`ENTRY_COLUMNS`] order
///
/// The score column is ignored and rederived from the rating.
pub fn entry_from_row(row: &[String]) -> Result<RiskEntry, ValidationError> {
    if row.len() < ENTRY_COLUMNS.len() {
        return Err(ValidationError::RowWidth {
            expected: ENTRY_COLUMNS.len(),
            found: row.len(),
        });
    }

    let category = row[0]
        .parse::<MajorCategory>()
        .map_err(|_| ValidationError::Category(row[0].clone()))?;
    let legal_basis = normalize_citations(row[4].lines());

    let mut entry = RiskEntry::new(category, row[1].clone(), legal_basis)
        .with_rating(row[6].parse()?, row[7].parse()?);
    entry.task_description = row[2].clone();
    entry.cause = row[3].clone();
    entry.current_controls = row[5].clone();
    entry.reduction_plan = row[9].clone();
    entry.post_improvement_risk = row[10].parse()?;
    entry.target_date = parse_date(&row[11])?;
    entry.completion_date = parse_date(&row[12])?;
    entry.owner = row[13].clone();
    entry.note = row[14].clone();
    Ok(entry)
}

fn company_sheet(register: &AssessmentRegister) -> Sheet {
    let company = &register.company;
    let workplace = &register.workplace;
    let mut sheet = Sheet::new(COMPANY_SHEET, &COMPANY_COLUMNS);
    sheet.rows.push(vec![
        Cell::text(&company.name),
        Cell::text(&company.address),
        Cell::text(&company.tel),
        Cell::text(&company.fax),
        Cell::text(&workplace.ceo),
        Cell::text(&workplace.products),
        Cell::Number(i64::from(workplace.employee_count)),
        Cell::date(Some(workplace.eval_date)),
        Cell::text(&workplace.evaluator),
    ]);
    sheet
}

fn process_sheet(register: &AssessmentRegister) -> Sheet {
    let mut sheet = Sheet::new(PROCESS_SHEET, &PROCESS_COLUMNS);
    sheet.rows = register
        .processes()
        .iter()
        .map(|p| vec![Cell::text(&p.name), Cell::text(&p.description)])
        .collect();
    sheet
}

fn entry_sheet(index: usize, process: &Process) -> Sheet {
    let mut sheet = Sheet::new(sheet_name(index, &process.name), &ENTRY_COLUMNS);
    sheet.rows = process.entries().iter().map(entry_cells).collect();
    sheet
}

fn risk_info_sheet(register: &AssessmentRegister) -> Sheet {
    let mut sheet = Sheet::new(
        RISK_INFO_SHEET,
        &["공정명", "원(재)료", "기계기구 및 설비명", "유해화학물질"],
    );
    sheet.rows = register
        .processes()
        .iter()
        .map(|p| {
            vec![
                Cell::text(&p.name),
                Cell::text(p.materials.join(", ")),
                Cell::text(p.equipment.join(", ")),
                Cell::text(p.chemicals.join(", ")),
            ]
        })
        .collect();
    sheet
}

fn classification_sheet(register: &AssessmentRegister) -> Sheet {
    let mut sheet = Sheet::new(CLASSIFICATION_SHEET, &["공정명", "분류", "유해위험요인"]);
    for p in register.processes() {
        for (category, hazards) in p.selected_hazards() {
            for hazard in hazards {
                sheet.rows.push(vec![
                    Cell::text(&p.name),
                    Cell::text(category.label()),
                    Cell::text(hazard),
                ]);
            }
        }
    }
    sheet
}

fn reduction_sheet(register: &AssessmentRegister) -> Sheet {
    let mut sheet = Sheet::new(REDUCTION_SHEET, &REDUCTION_COLUMNS);
    for group in rollup::reduction_rollup(register) {
        for item in group.items {
            sheet.rows.push(vec![
                Cell::text(&group.process),
                Cell::text(item.hazard),
                Cell::Score(item.risk_score),
                Cell::text(item.reduction_plan),
                Cell::date(item.target_date),
                Cell::text(item.owner),
            ]);
        }
    }
    sheet
}

/// Build the report sheets for a register
///
/// Always starts with the company and process-list sheets, followed by one
/// sheet per process that has entries. Never fails on an empty register.
pub fn build_report(register: &AssessmentRegister, options: ExportOptions) -> Report {
    let mut sheets = vec![company_sheet(register), process_sheet(register)];

    sheets.extend(
        register
            .processes()
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.entries().is_empty())
            .map(|(i, p)| entry_sheet(i, p)),
    );

    if options.detail_sheets {
        sheets.push(risk_info_sheet(register));
        sheets.push(classification_sheet(register));
        sheets.push(reduction_sheet(register));
    }

    Report { sheets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Likelihood, PostImprovementRisk, Severity};

    fn register_with_entries() -> AssessmentRegister {
        let mut reg = AssessmentRegister::new();
        reg.add_process(Some("조립".into()));
        reg.add_process(Some("Very Long Process Name Exceeding Twenty Chars".into()));
        reg.process_mut(2).unwrap().set_entries(vec![
            RiskEntry::new(MajorCategory::Electrical, "감전", vec!["A".into()]),
        ]);
        reg
    }

    #[test]
    fn test_sheet_name_truncates_to_twenty_chars() {
        assert_eq!(
            sheet_name(2, "Very Long Process Name Exceeding Twenty Chars"),
            "3_Very Long Process Na"
        );
        assert_eq!(sheet_name(0, "공정 1"), "1_공정 1");
    }

    #[test]
    fn test_sheet_name_counts_characters_not_bytes() {
        let name = "가나다라마바사아자차카타파하가나다라마바사아";
        let sheet = sheet_name(9, name);
        assert_eq!(sheet.chars().count(), 3 + 20);
        assert!(sheet.starts_with("10_가나다"));
    }

    #[test]
    fn test_sheet_name_replaces_forbidden_chars() {
        assert_eq!(sheet_name(0, "A/B [C]: D*?\\"), "1_A_B _C__ D___");
        assert_eq!(sheet_name(0, "quoted'"), "1_quoted_");
    }

    #[test]
    fn test_empty_register_has_two_sheets() {
        let report = build_report(&AssessmentRegister::new(), ExportOptions::default());
        assert_eq!(report.sheet_names(), vec![COMPANY_SHEET, PROCESS_SHEET]);
        assert_eq!(report.sheets[0].rows.len(), 1);
        assert_eq!(report.sheets[1].rows.len(), 1);
    }

    #[test]
    fn test_only_processes_with_entries_get_sheets() {
        let report = build_report(&register_with_entries(), ExportOptions::default());
        assert_eq!(
            report.sheet_names(),
            vec![COMPANY_SHEET, PROCESS_SHEET, "3_Very Long Process Na"]
        );
        let entries = &report.sheets[2];
        assert_eq!(entries.headers.len(), ENTRY_COLUMNS.len());
        assert_eq!(entries.rows[0][8], Cell::Score(6));
    }

    #[test]
    fn test_detail_sheets_appended() {
        let options = ExportOptions { detail_sheets: true };
        let report = build_report(&register_with_entries(), options);
        let names = report.sheet_names();
        assert_eq!(names.len(), 6);
        assert_eq!(&names[3..], &[RISK_INFO_SHEET, CLASSIFICATION_SHEET, REDUCTION_SHEET]);
        // Default-rated entries sit below the rollup threshold
        assert!(report.sheet(REDUCTION_SHEET).unwrap().rows.is_empty());
    }

    #[test]
    fn test_entry_row_round_trip() {
        let mut entry = RiskEntry::new(
            MajorCategory::Chemical,
            "유기용제",
            vec!["제420조".into(), "제421조, 제2항".into()],
        )
        .with_rating(Likelihood::Frequent, Severity::Serious);
        entry.task_description = "세척".into();
        entry.cause = "환기 불량".into();
        entry.current_controls = "방독마스크".into();
        entry.reduction_plan = "국소배기장치 설치".into();
        entry.post_improvement_risk = PostImprovementRisk::Medium;
        entry.target_date = NaiveDate::from_ymd_opt(2026, 6, 30);
        entry.owner = "박반장".into();
        entry.note = "비고, 메모".into();

        let row: Vec<String> = entry_cells(&entry).iter().map(Cell::to_string).collect();
        assert_eq!(row[8], "12");
        assert_eq!(row[11], "2026-06-30");
        assert_eq!(row[12], "");
        assert_eq!(entry_from_row(&row).unwrap(), entry);
    }

    #[test]
    fn test_entry_from_row_rejects_bad_values() {
        let mut row: Vec<String> = entry_cells(&RiskEntry::new(
            MajorCategory::Electrical,
            "감전",
            vec![],
        ))
        .iter()
        .map(Cell::to_string)
        .collect();
        row[6] = "보통(7)".into();
        assert!(matches!(
            entry_from_row(&row),
            Err(ValidationError::Likelihood(_))
        ));
        assert!(matches!(
            entry_from_row(&row[..3]),
            Err(ValidationError::RowWidth { found: 3, .. })
        ));
    }
}
