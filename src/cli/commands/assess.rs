//! `riskreg assess` - the risk assessment table of a process

use clap::Subcommand;
use console::style;
use miette::{bail, IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::filters::BandFilter;
use crate::cli::helpers::{confirm, format_date, one_line, parse_date_arg, to_index, Session};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::{render, ColumnDef};
use crate::cli::GlobalOpts;
use crate::entities::{
    EntryPatch, Likelihood, PostImprovementRisk, Regenerated, RiskBand, RiskEntry, Severity,
};

const ENTRY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("#", 4),
    ColumnDef::new("CATEGORY", 12),
    ColumnDef::new("HAZARD", 20),
    ColumnDef::new("L", 9),
    ColumnDef::new("S", 9),
    ColumnDef::new("SCORE", 5),
    ColumnDef::new("BAND", 6),
    ColumnDef::new("REDUCTION PLAN", 24),
    ColumnDef::new("OWNER", 10),
];

#[derive(Subcommand, Debug)]
pub enum AssessCommands {
    /// Rebuild the table from the selected hazards
    ///
    /// Existing entries and their edits are discarded.
    Regenerate {
        /// Process number (default: current)
        #[arg(long, short = 'p')]
        process: Option<usize>,
    },

    /// List the entries of a process
    List {
        #[arg(long, short = 'p')]
        process: Option<usize>,

        /// Only entries in this risk band
        #[arg(long, short = 'b', value_enum, default_value = "all")]
        band: BandFilter,
    },

    /// Show one entry
    Show {
        /// Entry number
        entry: usize,

        #[arg(long, short = 'p')]
        process: Option<usize>,
    },

    /// Edit one entry
    Edit(EditArgs),
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Entry number
    pub entry: usize,

    /// Process number (default: current)
    #[arg(long, short = 'p')]
    pub process: Option<usize>,

    /// 가능성(빈도): 1-5 or a label such as 보통
    #[arg(long, short = 'l')]
    pub likelihood: Option<String>,

    /// 중대성(강도): 1-4 or a label such as 위험
    #[arg(long, short = 's')]
    pub severity: Option<String>,

    /// 작업내용
    #[arg(long)]
    pub task: Option<String>,

    /// 원인
    #[arg(long)]
    pub cause: Option<String>,

    /// 관련 법규, repeat for several citations
    #[arg(long = "legal-basis")]
    pub legal_basis: Option<Vec<String>>,

    /// 현재상태 및 조치
    #[arg(long)]
    pub controls: Option<String>,

    /// 감소 대책
    #[arg(long)]
    pub plan: Option<String>,

    /// 개선후 위험성: 낮음, 보통 or 높음
    #[arg(long)]
    pub post_risk: Option<String>,

    /// 개선 예정일 (YYYY-MM-DD, or "none" to clear)
    #[arg(long)]
    pub target_date: Option<String>,

    /// 완료일 (YYYY-MM-DD, or "none" to clear)
    #[arg(long)]
    pub completion_date: Option<String>,

    /// 담당자
    #[arg(long)]
    pub owner: Option<String>,

    /// 비고
    #[arg(long)]
    pub note: Option<String>,
}

impl EditArgs {
    fn to_patch(&self) -> Result<EntryPatch> {
        let likelihood = self
            .likelihood
            .as_deref()
            .map(str::parse::<Likelihood>)
            .transpose()
            .into_diagnostic()?;
        let severity = self
            .severity
            .as_deref()
            .map(str::parse::<Severity>)
            .transpose()
            .into_diagnostic()?;
        let post_improvement_risk = self
            .post_risk
            .as_deref()
            .map(str::parse::<PostImprovementRisk>)
            .transpose()
            .into_diagnostic()?;

        Ok(EntryPatch {
            task_description: self.task.clone(),
            cause: self.cause.clone(),
            legal_basis: self.legal_basis.clone(),
            current_controls: self.controls.clone(),
            likelihood: likelihood.map(u8::from),
            severity: severity.map(u8::from),
            reduction_plan: self.plan.clone(),
            post_improvement_risk,
            target_date: self.target_date.as_deref().map(parse_date_arg).transpose()?,
            completion_date: self
                .completion_date
                .as_deref()
                .map(parse_date_arg)
                .transpose()?,
            owner: self.owner.clone(),
            note: self.note.clone(),
        })
    }
}

#[derive(Serialize)]
struct EntryView<'a> {
    number: usize,
    band: RiskBand,
    #[serde(flatten)]
    entry: &'a RiskEntry,
}

pub fn run(cmd: AssessCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AssessCommands::Regenerate { process } => run_regenerate(process, global),
        AssessCommands::List { process, band } => run_list(process, band, global),
        AssessCommands::Show { entry, process } => run_show(entry, process, global),
        AssessCommands::Edit(args) => run_edit(args, global),
    }
}

fn run_regenerate(process: Option<usize>, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let index = session.process_index(process)?;
    let existing = session.register.processes()[index].entries().len();

    if existing > 0 {
        let prompt = format!(
            "Discard the {} existing entries of '{}' and rebuild?",
            existing,
            session.register.processes()[index].name
        );
        if !confirm(global, &prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let table = session.lookup_table();
    let outcome = session
        .register
        .regenerate_entries(index, &table)
        .into_diagnostic()?;
    session.save()?;

    let name = &session.register.processes()[index].name;
    match outcome {
        Regenerated::Entries(n) => println!(
            "{} Generated {} entries for {}",
            style("✓").green(),
            n,
            style(name).cyan()
        ),
        Regenerated::NoHazardsSelected => println!(
            "{} No hazards selected for {}; the assessment table is empty",
            style("!").yellow(),
            style(name).cyan()
        ),
    }
    Ok(())
}

fn run_list(process: Option<usize>, band: BandFilter, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let index = session.process_index(process)?;
    let p = session.register.process(index).into_diagnostic()?;

    let views: Vec<EntryView> = p
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| band.matches(e.risk_score()))
        .map(|(i, e)| EntryView {
            number: i + 1,
            band: e.band(),
            entry: e,
        })
        .collect();

    if print_structured(&views, effective_format(global.output, true))? {
        return Ok(());
    }

    if views.is_empty() {
        println!("No entries found for {}.", style(&p.name).cyan());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = views
        .iter()
        .map(|v| {
            vec![
                v.number.to_string(),
                v.entry.category.label().to_string(),
                v.entry.hazard.clone(),
                v.entry.likelihood.to_string(),
                v.entry.severity.to_string(),
                v.entry.risk_score().to_string(),
                v.band.to_string(),
                one_line(&v.entry.reduction_plan),
                v.entry.owner.clone(),
            ]
        })
        .collect();
    println!("{}", style(&p.name).bold());
    println!("{}", render(ENTRY_COLUMNS, &rows));

    let high = views.iter().filter(|v| v.band == RiskBand::High).count();
    if high > 0 {
        println!("\n{} entries, {} high risk", views.len(), style(high).red());
    } else {
        println!("\n{} entries", views.len());
    }
    Ok(())
}

fn run_show(entry: usize, process: Option<usize>, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let index = session.process_index(process)?;
    let p = session.register.process(index).into_diagnostic()?;
    let i = to_index(entry)?;
    let Some(e) = p.entries().get(i) else {
        bail!("entry {} does not exist (process has {})", entry, p.entries().len());
    };

    let view = EntryView {
        number: entry,
        band: e.band(),
        entry: e,
    };
    if print_structured(&view, effective_format(global.output, false))? {
        return Ok(());
    }

    let field = |label: &str, value: String| {
        let value = if value.is_empty() { "-".to_string() } else { value };
        println!("  {:<14} {}", style(label).dim(), value);
    };
    println!("{} {}", style(entry).dim(), style(&e.hazard).bold());
    field("분류", e.category.label().to_string());
    field("작업내용", e.task_description.clone());
    field("원인", e.cause.clone());
    field("관련 법규", one_line(&e.legal_basis_text()));
    field("현재상태 및 조치", e.current_controls.clone());
    field("가능성(빈도)", e.likelihood.to_string());
    field("중대성(강도)", e.severity.to_string());
    field("위험성", format!("{} ({})", e.risk_score(), e.band()));
    field("감소 대책", e.reduction_plan.clone());
    field("개선후 위험성", e.post_improvement_risk.label().to_string());
    field("개선 예정일", format_date(e.target_date));
    field("완료일", format_date(e.completion_date));
    field("담당자", e.owner.clone());
    field("비고", e.note.clone());
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let patch = args.to_patch()?;
    if patch.is_empty() {
        bail!("nothing to change; pass at least one field option");
    }

    let mut session = Session::open(global)?;
    let index = session.process_index(args.process)?;
    let entry = session
        .register
        .edit_entry(index, to_index(args.entry)?, &patch)
        .into_diagnostic()?;
    let (hazard, score, band) = (entry.hazard.clone(), entry.risk_score(), entry.band());
    session.save()?;

    let score = match band {
        RiskBand::High => style(score).red(),
        RiskBand::Medium => style(score).yellow(),
        RiskBand::Low => style(score).green(),
    };
    println!(
        "{} Updated entry {} {} (위험성 {})",
        style("✓").green(),
        args.entry,
        style(hazard).cyan(),
        score
    );
    Ok(())
}
