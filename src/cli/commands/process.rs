//! `riskreg process` - process management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::filters::CliItemList;
use crate::cli::helpers::{confirm, to_index, Session};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, ColumnDef};
use crate::cli::GlobalOpts;
use crate::entities::{ItemList, Process};

const PROCESS_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("#", 4),
    ColumnDef::new("NAME", 24),
    ColumnDef::new("DESCRIPTION", 30),
    ColumnDef::new("HAZARDS", 8),
    ColumnDef::new("ENTRIES", 8),
    ColumnDef::new("HIGH", 6),
];

#[derive(Subcommand, Debug)]
pub enum ProcessCommands {
    /// List processes
    List,

    /// Show one process with its items and selected hazards
    Show {
        /// Process number (default: current)
        number: Option<usize>,
    },

    /// Append a process
    Add {
        /// Process name (default: "공정 N")
        name: Option<String>,
    },

    /// Remove the last process
    Remove,

    /// Rename a process
    Rename {
        /// Process number
        number: usize,
        /// New name
        name: String,
    },

    /// Set a process description
    Describe {
        /// Process number
        number: usize,
        /// Description text
        description: String,
    },

    /// Make a process the current one
    Select {
        /// Process number
        number: usize,
    },

    /// Edit materials, equipment or chemicals of a process
    #[command(subcommand)]
    Item(ItemCommands),
}

#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Append an item
    Add {
        #[arg(value_enum)]
        list: CliItemList,
        value: String,
        /// Process number (default: current)
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },

    /// Replace an item
    Update {
        #[arg(value_enum)]
        list: CliItemList,
        /// Item number
        number: usize,
        value: String,
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },

    /// Remove an item
    Remove {
        #[arg(value_enum)]
        list: CliItemList,
        /// Item number
        number: usize,
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },
}

#[derive(Serialize)]
struct ProcessSummary<'a> {
    number: usize,
    name: &'a str,
    description: &'a str,
    current: bool,
    selected_hazards: usize,
    entries: usize,
    high_risk: usize,
}

impl<'a> ProcessSummary<'a> {
    fn new(index: usize, process: &'a Process, current: usize) -> Self {
        Self {
            number: index + 1,
            name: &process.name,
            description: &process.description,
            current: index == current,
            selected_hazards: process.selected_count(),
            entries: process.entries().len(),
            high_risk: process.high_risk_entries().count(),
        }
    }
}

pub fn run(cmd: ProcessCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProcessCommands::List => run_list(global),
        ProcessCommands::Show { number } => run_show(number, global),
        ProcessCommands::Add { name } => run_add(name, global),
        ProcessCommands::Remove => run_remove(global),
        ProcessCommands::Rename { number, name } => {
            let mut session = Session::open(global)?;
            session
                .register
                .rename_process(to_index(number)?, &name)
                .into_diagnostic()?;
            session.save()?;
            println!("{} Renamed process {} to {}", style("✓").green(), number, style(name.trim()).cyan());
            Ok(())
        }
        ProcessCommands::Describe {
            number,
            description,
        } => {
            let mut session = Session::open(global)?;
            session
                .register
                .set_description(to_index(number)?, &description)
                .into_diagnostic()?;
            session.save()?;
            println!("{} Updated description of process {}", style("✓").green(), number);
            Ok(())
        }
        ProcessCommands::Select { number } => {
            let mut session = Session::open(global)?;
            session
                .register
                .select_process(to_index(number)?)
                .into_diagnostic()?;
            session.save()?;
            println!(
                "{} Current process: {}",
                style("✓").green(),
                style(&session.register.current_process().name).cyan()
            );
            Ok(())
        }
        ProcessCommands::Item(cmd) => run_item(cmd, global),
    }
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let reg = &session.register;
    let current = reg.current_index();
    let summaries: Vec<ProcessSummary> = reg
        .processes()
        .iter()
        .enumerate()
        .map(|(i, p)| ProcessSummary::new(i, p, current))
        .collect();

    if print_structured(&summaries, effective_format(global.output, true))? {
        return Ok(());
    }

    let rows: Vec<Vec<String>> = summaries
        .iter()
        .map(|s| {
            let marker = if s.current { "*" } else { "" };
            vec![
                format!("{}{}", s.number, marker),
                s.name.to_string(),
                s.description.to_string(),
                s.selected_hazards.to_string(),
                s.entries.to_string(),
                s.high_risk.to_string(),
            ]
        })
        .collect();
    println!("{}", render(PROCESS_COLUMNS, &rows));
    println!("\n{} processes, * = current", summaries.len());
    Ok(())
}

fn run_show(number: Option<usize>, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let index = session.process_index(number)?;
    let process = session.register.process(index).into_diagnostic()?;

    if print_structured(process, effective_format(global.output, false))? {
        return Ok(());
    }

    println!("{} {}", style(index + 1).dim(), style(&process.name).bold());
    if !process.description.is_empty() {
        println!("  {}", process.description);
    }
    for list in [ItemList::Materials, ItemList::Equipment, ItemList::Chemicals] {
        let items = process.items(list);
        let shown = if items.is_empty() {
            "-".to_string()
        } else {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}. {}", i + 1, item))
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("  {:<16} {}", style(list.label()).dim(), shown);
    }
    for (category, hazards) in process.selected_hazards() {
        let names: Vec<&str> = hazards.iter().map(String::as_str).collect();
        println!("  {:<16} {}", style(category.label()).dim(), names.join(", "));
    }
    println!("  {} entries", process.entries().len());
    Ok(())
}

fn run_add(name: Option<String>, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let index = session.register.add_process(name);
    session.save()?;
    println!(
        "{} Added process {} {}",
        style("✓").green(),
        index + 1,
        style(&session.register.processes()[index].name).cyan()
    );
    Ok(())
}

fn run_remove(global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let reg = &session.register;
    let last = reg.processes().len();
    if last > 1 {
        let process = &reg.processes()[last - 1];
        let prompt = format!(
            "Remove process {} '{}' and its {} entries?",
            last,
            process.name,
            process.entries().len()
        );
        if !confirm(global, &prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let removed = session.register.remove_last_process().into_diagnostic()?;
    session.save()?;
    println!("{} Removed process {}", style("✓").green(), style(removed.name).cyan());
    Ok(())
}

fn run_item(cmd: ItemCommands, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let message = match cmd {
        ItemCommands::Add {
            list,
            value,
            process,
        } => {
            let index = session.process_index(process)?;
            let list = ItemList::from(list);
            session
                .register
                .process_mut(index)
                .into_diagnostic()?
                .add_item(list, value.clone());
            format!("Added {} to {}", style(value).cyan(), list.label())
        }
        ItemCommands::Update {
            list,
            number,
            value,
            process,
        } => {
            let index = session.process_index(process)?;
            let list = ItemList::from(list);
            session
                .register
                .process_mut(index)
                .into_diagnostic()?
                .update_item(list, to_index(number)?, value.clone())
                .into_diagnostic()?;
            format!("Set {} item {} to {}", list.label(), number, style(value).cyan())
        }
        ItemCommands::Remove {
            list,
            number,
            process,
        } => {
            let index = session.process_index(process)?;
            let list = ItemList::from(list);
            let removed = session
                .register
                .process_mut(index)
                .into_diagnostic()?
                .remove_item(list, to_index(number)?)
                .into_diagnostic()?;
            format!("Removed {} from {}", style(removed).cyan(), list.label())
        }
    };
    session.save()?;
    println!("{} {}", style("✓").green(), message);
    Ok(())
}
