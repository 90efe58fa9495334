//! `riskreg rollup` - reduction plan for high-risk entries

use console::style;
use miette::Result;

use crate::cli::helpers::{format_date, one_line, Session};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, ColumnDef};
use crate::cli::GlobalOpts;
use crate::entities::HIGH_RISK_THRESHOLD;
use crate::report::reduction_rollup;

const ROLLUP_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("HAZARD", 20),
    ColumnDef::new("SCORE", 5),
    ColumnDef::new("REDUCTION PLAN", 36),
    ColumnDef::new("TARGET", 10),
    ColumnDef::new("OWNER", 10),
];

#[derive(clap::Args, Debug)]
pub struct RollupArgs {
    /// Include processes with no entry at or above the threshold
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: RollupArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let mut rollup = reduction_rollup(&session.register);
    if !args.all {
        rollup.retain(|group| !group.items.is_empty());
    }

    if print_structured(&rollup, effective_format(global.output, true))? {
        return Ok(());
    }

    if rollup.is_empty() {
        println!("No entries scored {} or higher.", HIGH_RISK_THRESHOLD);
        return Ok(());
    }

    for group in &rollup {
        println!("{} ({})", style(&group.process).bold(), group.items.len());
        if group.items.is_empty() {
            continue;
        }
        let rows: Vec<Vec<String>> = group
            .items
            .iter()
            .map(|item| {
                vec![
                    item.hazard.clone(),
                    item.risk_score.to_string(),
                    one_line(&item.reduction_plan),
                    format_date(item.target_date),
                    item.owner.clone(),
                ]
            })
            .collect();
        println!("{}\n", render(ROLLUP_COLUMNS, &rows));
    }

    let total: usize = rollup.iter().map(|g| g.items.len()).sum();
    println!("{} entries need reduction (위험성 ≥ {})", total, HIGH_RISK_THRESHOLD);
    Ok(())
}
