//! `riskreg hazard` - hazard catalog and per-process selection

use clap::Subcommand;
use console::style;
use miette::{bail, IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::cli::filters::CliCategory;
use crate::cli::helpers::Session;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, ColumnDef};
use crate::cli::GlobalOpts;
use crate::core::LookupTable;
use crate::entities::MajorCategory;

const CATALOG_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("CATEGORY", 16),
    ColumnDef::new("HAZARD", 30),
    ColumnDef::new("CITATIONS", 10),
];

#[derive(Subcommand, Debug)]
pub enum HazardCommands {
    /// List hazards known to the regulation table
    Catalog {
        /// Only this major category
        #[arg(long, short = 'c', value_enum)]
        category: Option<CliCategory>,
    },

    /// Show the regulation citations for a hazard
    Citations {
        /// Minor hazard name, e.g. 감전
        hazard: String,
    },

    /// Replace the selected hazards of one category
    ///
    /// Selecting nothing clears the category.
    Select {
        #[arg(long, short = 'c', value_enum)]
        category: CliCategory,

        /// Hazard names from the catalog
        hazards: Vec<String>,

        /// Process number (default: current)
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },

    /// Clear every selected hazard of a process
    Clear {
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },
}

pub fn run(cmd: HazardCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        HazardCommands::Catalog { category } => run_catalog(category, global),
        HazardCommands::Citations { hazard } => run_citations(&hazard, global),
        HazardCommands::Select {
            category,
            hazards,
            process,
        } => run_select(category.into(), hazards, process, global),
        HazardCommands::Clear { process } => {
            let mut session = Session::open(global)?;
            let index = session.process_index(process)?;
            let p = session.register.process_mut(index).into_diagnostic()?;
            p.clear_hazards();
            let name = p.name.clone();
            session.save()?;
            println!("{} Cleared hazard selection of {}", style("✓").green(), style(name).cyan());
            Ok(())
        }
    }
}

/// The table the session is configured with; an error when nothing loaded
fn require_table(session: &Session) -> Result<LookupTable> {
    let table = session.lookup_table();
    if table.is_empty() {
        bail!(
            "regulation table {} is not loaded; pass --regulations <file>",
            session.config.regulations().display()
        );
    }
    Ok(table)
}

fn run_catalog(category: Option<CliCategory>, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let table = require_table(&session)?;
    let only = category.map(MajorCategory::from);

    let catalog: BTreeMap<&str, Vec<&str>> = table
        .categories_by_major()
        .iter()
        .filter(|(c, _)| only.map_or(true, |o| o == *c))
        .map(|(c, hazards)| (c.label(), hazards.iter().map(String::as_str).collect()))
        .collect();

    if print_structured(&catalog, effective_format(global.output, true))? {
        return Ok(());
    }

    let mut rows = Vec::new();
    for (major, hazards) in table.categories_by_major().iter() {
        if only.is_some_and(|o| o != major) {
            continue;
        }
        for hazard in hazards {
            rows.push(vec![
                major.label().to_string(),
                hazard.clone(),
                table.citations_for(hazard).len().to_string(),
            ]);
        }
    }
    if rows.is_empty() {
        println!("No hazards found.");
        return Ok(());
    }
    println!("{}", render(CATALOG_COLUMNS, &rows));
    println!("\n{} hazards", rows.len());
    Ok(())
}

fn run_citations(hazard: &str, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let table = require_table(&session)?;
    let citations = table.citations_for(hazard);

    #[derive(Serialize)]
    struct View<'a> {
        hazard: &'a str,
        citations: &'a [String],
    }
    let view = View {
        hazard,
        citations: &citations,
    };
    if print_structured(&view, effective_format(global.output, true))? {
        return Ok(());
    }

    if citations.is_empty() {
        println!("No citations for {}", style(hazard).yellow());
        return Ok(());
    }
    println!("{}", style(hazard).bold());
    for citation in &citations {
        println!("  - {}", citation);
    }
    Ok(())
}

fn run_select(
    category: MajorCategory,
    hazards: Vec<String>,
    process: Option<usize>,
    global: &GlobalOpts,
) -> Result<()> {
    let mut session = Session::open(global)?;
    let index = session.process_index(process)?;
    let table = session.lookup_table();
    let count = hazards.len();

    session
        .register
        .select_hazards(index, category, hazards, &table)
        .into_diagnostic()?;
    session.save()?;

    let name = &session.register.processes()[index].name;
    if count == 0 {
        println!(
            "{} Cleared {} for {}",
            style("✓").green(),
            category.label(),
            style(name).cyan()
        );
    } else {
        println!(
            "{} Selected {} hazards under {} for {}",
            style("✓").green(),
            count,
            category.label(),
            style(name).cyan()
        );
        println!(
            "  Run {} to rebuild the assessment table",
            style("riskreg assess regenerate").yellow()
        );
    }
    Ok(())
}
