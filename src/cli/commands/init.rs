//! `riskreg init` - create a new work file

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, load_config};
use crate::cli::GlobalOpts;
use crate::core::{workfile, LookupTable};
use crate::entities::AssessmentRegister;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Company name (회사명)
    #[arg(long, short = 'c')]
    pub company: Option<String>,

    /// Overwrite an existing work file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let path = config.workfile();

    if path.exists()
        && args.force
        && !confirm(global, &format!("Overwrite {} with an empty register?", path.display()))?
    {
        println!("Aborted.");
        return Ok(());
    }

    let mut register = AssessmentRegister::new();
    if let Some(name) = args.company {
        register.company.name = name;
    }
    if let Some(evaluator) = config.evaluator() {
        register.workplace.evaluator = evaluator.to_string();
    }

    workfile::create(&path, &register, args.force).into_diagnostic()?;
    println!(
        "{} Created work file {}",
        style("✓").green(),
        style(path.display()).cyan()
    );

    let regulations = config.regulations();
    let table = LookupTable::load_or_empty(&regulations);
    if table.is_empty() {
        println!(
            "{} No regulation table at {}; hazard selection is unavailable until one is provided with --regulations",
            style("!").yellow(),
            regulations.display()
        );
    } else {
        println!(
            "  {} regulation rows, {} hazards from {}",
            table.len(),
            table.categories_by_major().len(),
            style(regulations.display()).dim()
        );
    }

    Ok(())
}
