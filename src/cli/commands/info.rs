//! `riskreg info` - company and workplace details

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{parse_date_arg, Session};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::GlobalOpts;
use crate::entities::{CompanyInfo, WorkplaceInfo};

#[derive(Subcommand, Debug)]
pub enum InfoCommands {
    /// Show company and workplace details
    Show,

    /// Update company and workplace details
    Set(SetArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct SetArgs {
    /// 회사명
    #[arg(long)]
    pub name: Option<String>,

    /// 주소
    #[arg(long)]
    pub address: Option<String>,

    /// 전화번호
    #[arg(long)]
    pub tel: Option<String>,

    /// 팩스번호
    #[arg(long)]
    pub fax: Option<String>,

    /// 대표자
    #[arg(long)]
    pub ceo: Option<String>,

    /// 주요생산품
    #[arg(long)]
    pub products: Option<String>,

    /// 근로자수
    #[arg(long)]
    pub employees: Option<u32>,

    /// 평가일자 (YYYY-MM-DD)
    #[arg(long)]
    pub eval_date: Option<String>,

    /// 평가자
    #[arg(long)]
    pub evaluator: Option<String>,
}

#[derive(Serialize)]
struct InfoView<'a> {
    company: &'a CompanyInfo,
    workplace: &'a WorkplaceInfo,
}

pub fn run(cmd: InfoCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        InfoCommands::Show => run_show(global),
        InfoCommands::Set(args) => run_set(args, global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let reg = &session.register;
    let view = InfoView {
        company: &reg.company,
        workplace: &reg.workplace,
    };
    if print_structured(&view, effective_format(global.output, false))? {
        return Ok(());
    }

    let field = |label: &str, value: &str| {
        let value = if value.is_empty() { "-" } else { value };
        println!("  {:<12} {}", style(label).dim(), value);
    };
    println!("{}", style("사업장 정보").bold());
    field("회사명", &reg.company.name);
    field("주소", &reg.company.address);
    field("전화번호", &reg.company.tel);
    field("팩스번호", &reg.company.fax);
    println!("{}", style("사업장 개요").bold());
    field("대표자", &reg.workplace.ceo);
    field("주요생산품", &reg.workplace.products);
    field("근로자수", &reg.workplace.employee_count.to_string());
    field("평가일자", &reg.workplace.eval_date.to_string());
    field("평가자", &reg.workplace.evaluator);
    Ok(())
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let mut company = session.register.company.clone();
    if let Some(v) = args.name {
        company.name = v;
    }
    if let Some(v) = args.address {
        company.address = v;
    }
    if let Some(v) = args.tel {
        company.tel = v;
    }
    if let Some(v) = args.fax {
        company.fax = v;
    }

    let mut workplace = session.register.workplace.clone();
    if let Some(v) = args.ceo {
        workplace.ceo = v;
    }
    if let Some(v) = args.products {
        workplace.products = v;
    }
    if let Some(v) = args.employees {
        workplace.employee_count = v;
    }
    if let Some(v) = args.eval_date {
        if let Some(date) = parse_date_arg(&v)? {
            workplace.eval_date = date;
        }
    }
    if let Some(v) = args.evaluator {
        workplace.evaluator = v;
    }

    session.register.set_company_info(company);
    session.register.set_workplace_info(workplace);
    session.save()?;
    println!("{} Updated company and workplace details", style("✓").green());
    Ok(())
}
