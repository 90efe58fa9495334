//! `riskreg export` - write the register as a spreadsheet

use chrono::Local;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::helpers::Session;
use crate::cli::output::print_structured;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::report::{
    build_report, report_file_name, write_csv_dir, write_xlsx, ExportOptions, XLSX_MIME,
};

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Output workbook (default: <report_dir>/RiskAssessment_<YYYYMMDD>.xlsx)
    #[arg(long, short = 'o', conflicts_with = "csv")]
    pub output: Option<PathBuf>,

    /// Write one CSV file per sheet into this directory instead
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Also write the risk-info, classification and reduction-plan sheets
    #[arg(long)]
    pub detail: bool,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let options = ExportOptions {
        detail_sheets: args.detail,
    };
    let report = build_report(&session.register, options);

    if let Some(dir) = args.csv {
        let files = write_csv_dir(&report, &dir).into_diagnostic()?;
        println!(
            "{} Exported {} CSV files to {}",
            style("✓").green(),
            files.len(),
            style(dir.display()).cyan()
        );
        return Ok(());
    }

    let path = args.output.unwrap_or_else(|| {
        session
            .config
            .report_dir()
            .join(report_file_name(Local::now().date_naive()))
    });
    write_xlsx(&report, &path).into_diagnostic()?;

    #[derive(Serialize)]
    struct Exported<'a> {
        path: &'a std::path::Path,
        mime: &'static str,
        sheets: Vec<&'a str>,
    }
    let exported = Exported {
        path: &path,
        mime: XLSX_MIME,
        sheets: report.sheet_names(),
    };
    if global.output != OutputFormat::Auto && print_structured(&exported, global.output)? {
        return Ok(());
    }

    println!(
        "{} Exported {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    for name in report.sheet_names() {
        println!("  {}", name);
    }
    Ok(())
}
