//! Spreadsheet export tests

mod common;

use common::{riskreg_in, select_and_regenerate, setup_test_register, stdout_json};
use predicates::prelude::*;
use riskreg::core::{LookupTable, RegulationRow};
use riskreg::entities::{AssessmentRegister, EntryPatch, MajorCategory, PostImprovementRisk};
use riskreg::report::{
    build_report, entries_from_sheet, read_xlsx, read_xlsx_bytes, to_xlsx_bytes, ExportOptions,
};
use std::fs;

fn lookup() -> LookupTable {
    LookupTable::from_rows(vec![
        RegulationRow::new("전기적 요인", "감전", "A"),
        RegulationRow::new("전기적 요인", "감전", "B"),
        RegulationRow::new("기계(설비)적 요인", "끼임", "제87조"),
    ])
}

/// Three processes; only the third has an assessment table
fn register_with_long_name() -> AssessmentRegister {
    let table = lookup();
    let mut reg = AssessmentRegister::new();
    reg.add_process(Some("조립".into()));
    let index = reg.add_process(Some("Very Long Process Name Exceeding Twenty Chars".into()));

    reg.select_hazards(index, MajorCategory::Electrical, vec!["감전".into()], &table)
        .unwrap();
    reg.select_hazards(index, MajorCategory::Mechanical, vec!["끼임".into()], &table)
        .unwrap();
    reg.regenerate_entries(index, &table).unwrap();

    let patch = EntryPatch {
        task_description: Some("분전반 점검".into()),
        cause: Some("충전부 노출".into()),
        current_controls: Some("절연장갑 착용".into()),
        likelihood: Some(4),
        severity: Some(4),
        reduction_plan: Some("충전부 방호판 설치\n정기 점검".into()),
        post_improvement_risk: Some(PostImprovementRisk::Medium),
        target_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 6, 30)),
        completion_date: Some(chrono::NaiveDate::from_ymd_opt(2026, 7, 2)),
        owner: Some("박반장".into()),
        note: Some("분기별 재평가".into()),
        ..Default::default()
    };
    reg.edit_entry(index, 1, &patch).unwrap();
    reg
}

// ============================================================================
// Library Round Trip Tests
// ============================================================================

#[test]
fn test_long_process_name_sheet() {
    let report = build_report(&register_with_long_name(), ExportOptions::default());
    assert_eq!(
        report.sheet_names(),
        vec!["CompanyInfo", "ProcessList", "3_Very Long Process Na"]
    );
}

#[test]
fn test_export_then_read_back_preserves_entries() {
    let reg = register_with_long_name();
    let bytes = to_xlsx_bytes(&build_report(&reg, ExportOptions::default())).unwrap();
    let sheets = read_xlsx_bytes(&bytes).unwrap();

    let process_sheet = sheets
        .iter()
        .find(|s| s.name == "3_Very Long Process Na")
        .unwrap();
    assert!(process_sheet.is_entry_sheet());

    let entries = entries_from_sheet(process_sheet).unwrap();
    assert_eq!(entries, reg.processes()[2].entries());
    assert_eq!(entries[1].risk_score(), 16);
    assert_eq!(entries[1].legal_basis, vec!["A", "B"]);
}

#[test]
fn test_export_round_trip_keeps_multiline_and_padded_text() {
    let mut reg = register_with_long_name();
    let patch = EntryPatch {
        legal_basis: Some(vec![" 제1조 ".into(), "".into(), "제2조\r\n제2항".into()]),
        cause: Some("  앞뒤 공백  ".into()),
        current_controls: Some("1. 점검\r\n2. 교육\r3. 표지".into()),
        note: Some("a\r\nb".into()),
        ..Default::default()
    };
    reg.edit_entry(2, 0, &patch).unwrap();

    let bytes = to_xlsx_bytes(&build_report(&reg, ExportOptions::default())).unwrap();
    let sheets = read_xlsx_bytes(&bytes).unwrap();
    let process_sheet = sheets
        .iter()
        .find(|s| s.name == "3_Very Long Process Na")
        .unwrap();
    assert!(process_sheet
        .rows
        .iter()
        .flatten()
        .all(|cell| !cell.contains("_x000D_")));

    let entries = entries_from_sheet(process_sheet).unwrap();
    assert_eq!(entries, reg.processes()[2].entries());
    assert_eq!(entries[0].legal_basis, vec!["제1조", "제2조", "제2항"]);
    assert_eq!(entries[0].cause, "  앞뒤 공백  ");
    assert_eq!(entries[0].current_controls, "1. 점검\n2. 교육\n3. 표지");
    assert_eq!(entries[0].note, "a\nb");
}

#[test]
fn test_empty_register_exports_two_sheets() {
    let bytes = to_xlsx_bytes(&build_report(&AssessmentRegister::new(), ExportOptions::default()))
        .unwrap();
    let sheets = read_xlsx_bytes(&bytes).unwrap();

    let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["CompanyInfo", "ProcessList"]);
    assert_eq!(sheets[1].rows, vec![vec!["공정 1".to_string(), String::new()]]);
}

#[test]
fn test_detail_sheets_contain_reduction_plan() {
    let reg = register_with_long_name();
    let options = ExportOptions {
        detail_sheets: true,
    };
    let sheets = read_xlsx_bytes(&to_xlsx_bytes(&build_report(&reg, options)).unwrap()).unwrap();

    let reduction = sheets.iter().find(|s| s.name == "ReductionPlan").unwrap();
    assert_eq!(reduction.rows.len(), 1);
    assert_eq!(reduction.rows[0][1], "감전");
    assert_eq!(reduction.rows[0][2], "16");

    let classification = sheets.iter().find(|s| s.name == "Classification").unwrap();
    assert_eq!(classification.rows.len(), 2);
}

// ============================================================================
// Export Command Tests
// ============================================================================

#[test]
fn test_export_command_writes_workbook() {
    let tmp = setup_test_register();
    select_and_regenerate(&tmp, "electrical", &["감전"]);

    riskreg_in(&tmp)
        .args(["export", "-o", "out/report.xlsx"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1_공정 1"));

    let sheets = read_xlsx(&tmp.path().join("out/report.xlsx")).unwrap();
    assert_eq!(sheets.len(), 3);
    assert_eq!(sheets[2].rows[0][8], "6");
}

#[test]
fn test_export_default_name_in_report_dir() {
    let tmp = setup_test_register();

    let exported = stdout_json(
        riskreg_in(&tmp)
            .env("RISKREG_REPORT_DIR", "reports")
            .args(["export", "-f", "json"]),
    );
    let path = exported["path"].as_str().unwrap();
    assert!(path.starts_with("reports"));
    assert!(path.contains("RiskAssessment_"));
    assert!(path.ends_with(".xlsx"));
    assert_eq!(
        exported["mime"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(tmp.path().join(path).exists());
}

#[test]
fn test_export_csv_directory() {
    let tmp = setup_test_register();
    select_and_regenerate(&tmp, "electrical", &["감전"]);

    riskreg_in(&tmp)
        .args(["export", "--csv", "csv", "--detail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 6 CSV files"));

    let content = fs::read_to_string(tmp.path().join("csv/1_공정 1.csv")).unwrap();
    assert!(content.contains("유해 위험 요인"));
    assert!(content.contains("감전"));
}
