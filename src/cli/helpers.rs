//! Shared helper functions for CLI commands
//!
//! Session loading, index conversion and small parsing helpers used across
//! the command modules.

use chrono::NaiveDate;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{bail, miette, IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::{workfile, Config, LookupTable};
use crate::entities::AssessmentRegister;

/// Config with the global CLI flags applied on top
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    config.merge(Config {
        workfile: global.file.clone(),
        regulations: global.regulations.clone(),
        ..Default::default()
    });
    config
}

/// A loaded work file and the settings it was resolved with
pub struct Session {
    pub config: Config,
    pub path: PathBuf,
    pub register: AssessmentRegister,
}

impl Session {
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = load_config(global);
        let path = config.workfile();
        let register = workfile::load(&path).into_diagnostic()?;
        Ok(Self {
            config,
            path,
            register,
        })
    }

    pub fn save(&self) -> Result<()> {
        workfile::save(&self.path, &self.register).into_diagnostic()
    }

    /// Regulation table; a missing or broken file yields an empty table
    pub fn lookup_table(&self) -> LookupTable {
        LookupTable::load_or_empty(&self.config.regulations())
    }

    /// 0-based index of the process named by a 1-based CLI number
    pub fn process_index(&self, number: Option<usize>) -> Result<usize> {
        let index = number.map(to_index).transpose()?;
        self.register.resolve_index(index).into_diagnostic()
    }
}

/// Convert a 1-based number from the command line to an index
pub fn to_index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| miette!("numbers start at 1"))
}

/// Ask for confirmation unless `--yes` was given
///
/// Without a terminal the answer is no.
pub fn confirm(global: &GlobalOpts, prompt: &str) -> Result<bool> {
    if global.yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        eprintln!(
            "{} {} (pass --yes to confirm)",
            style("!").yellow(),
            prompt
        );
        return Ok(false);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Parse a `YYYY-MM-DD` date; `none` or an empty string clears it
pub fn parse_date_arg(s: &str) -> Result<Option<NaiveDate>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Ok(Some(d)),
        Err(_) => bail!("invalid date '{}', expected YYYY-MM-DD", s),
    }
}

/// Truncate a string to `max_chars` characters, adding "..." if truncated
///
/// Counts characters, not bytes, so Hangul is never split mid-codepoint.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse multi-line text to one line for table cells
pub fn one_line(s: &str) -> String {
    s.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join("; ")
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("가나다라마바사", 5), "가나...");
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2026-03-01").unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert_eq!(parse_date_arg("none").unwrap(), None);
        assert!(parse_date_arg("03/01/2026").is_err());
    }

    #[test]
    fn test_to_index() {
        assert_eq!(to_index(1).unwrap(), 0);
        assert!(to_index(0).is_err());
    }

    #[test]
    fn test_one_line() {
        assert_eq!(one_line("제1조\n 제2조 \n"), "제1조; 제2조");
    }
}
