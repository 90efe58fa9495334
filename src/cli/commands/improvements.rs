//! `riskreg improvements` - progress of planned improvements

use chrono::Local;
use console::style;
use miette::Result;

use crate::cli::helpers::{format_date, one_line, parse_date_arg, Session};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, ColumnDef};
use crate::cli::GlobalOpts;
use crate::report::{improvement_tracking, ImprovementStatus};

const IMPROVEMENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("PROCESS", 14),
    ColumnDef::new("HAZARD", 18),
    ColumnDef::new("SCORE", 5),
    ColumnDef::new("REDUCTION PLAN", 28),
    ColumnDef::new("STATUS", 11),
    ColumnDef::new("TARGET", 10),
    ColumnDef::new("DONE", 10),
    ColumnDef::new("OWNER", 10),
];

#[derive(clap::Args, Debug)]
pub struct ImprovementsArgs {
    /// Reference date for overdue checks (YYYY-MM-DD, default: today)
    #[arg(long)]
    pub today: Option<String>,

    /// Hide completed improvements
    #[arg(long)]
    pub pending: bool,
}

pub fn run(args: ImprovementsArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let today = match args.today.as_deref() {
        Some(s) => parse_date_arg(s)?,
        None => None,
    }
    .unwrap_or_else(|| Local::now().date_naive());

    let mut summary = improvement_tracking(&session.register, today);
    if args.pending {
        summary.retain(|i| i.status != ImprovementStatus::Completed);
    }

    if print_structured(&summary, effective_format(global.output, true))? {
        return Ok(());
    }

    if summary.items.is_empty() {
        println!("No improvements planned.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = summary
        .items
        .iter()
        .map(|i| {
            vec![
                i.process.clone(),
                i.hazard.clone(),
                i.risk_score.to_string(),
                one_line(&i.reduction_plan),
                i.status.to_string(),
                format_date(i.target_date),
                format_date(i.completion_date),
                i.owner.clone(),
            ]
        })
        .collect();
    println!("{}", render(IMPROVEMENT_COLUMNS, &rows));

    let count = |s: ImprovementStatus| summary.counts.get(&s).copied().unwrap_or(0);
    println!(
        "\n{} completed, {} overdue, {} scheduled, {} unscheduled",
        style(count(ImprovementStatus::Completed)).green(),
        style(count(ImprovementStatus::Overdue)).red(),
        count(ImprovementStatus::Scheduled),
        style(count(ImprovementStatus::Unscheduled)).yellow()
    );
    Ok(())
}
