//! Assessment register - the unit of work exported to a report
//!
//! The register owns the company and workplace details and the ordered list
//! of processes. It always holds at least one process, and the current
//! process index always points at one of them.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::lookup::LookupTable;
use crate::entities::category::MajorCategory;
use crate::entities::entry::{EntryPatch, RiskEntry};
use crate::entities::process::{ItemList, Process};
use crate::entities::rating::ValidationError;

/// Errors raised by register commands
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("cannot remove the last remaining process")]
    LastProcess,

    #[error("process {} does not exist (register has {len})", .index + 1)]
    ProcessIndex { index: usize, len: usize },

    #[error("entry {} does not exist (process has {len})", .index + 1)]
    EntryIndex { index: usize, len: usize },

    #[error("{list} item {} does not exist (list has {len})", .index + 1)]
    ItemIndex {
        list: ItemList,
        index: usize,
        len: usize,
    },

    #[error("process name cannot be empty")]
    EmptyName,

    #[error("'{hazard}' is not a known hazard under {category}")]
    UnknownHazard {
        category: MajorCategory,
        hazard: String,
    },

    #[error("regulation table is not loaded; hazard classification is unavailable")]
    CatalogUnavailable,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// 사업장 정보
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub tel: String,
    pub fax: String,
}

/// 사업장 개요
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkplaceInfo {
    pub ceo: String,
    pub products: String,
    pub employee_count: u32,
    pub eval_date: NaiveDate,
    pub evaluator: String,
}

impl Default for WorkplaceInfo {
    fn default() -> Self {
        Self {
            ceo: String::new(),
            products: String::new(),
            employee_count: 0,
            eval_date: Local::now().date_naive(),
            evaluator: String::new(),
        }
    }
}

/// Result of regenerating a process's entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regenerated {
    /// The table was rebuilt with this many entries
    Entries(usize),
    /// Nothing was selected; the table is now empty
    NoHazardsSelected,
}

/// The whole assessment for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRegister {
    #[serde(default)]
    pub company: CompanyInfo,

    #[serde(default)]
    pub workplace: WorkplaceInfo,

    #[serde(default)]
    processes: Vec<Process>,

    #[serde(default)]
    current_process: usize,
}

impl Default for AssessmentRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentRegister {
    /// New register with one placeholder process
    pub fn new() -> Self {
        Self {
            company: CompanyInfo::default(),
            workplace: WorkplaceInfo::default(),
            processes: vec![Process::new(Process::default_name(1))],
            current_process: 0,
        }
    }

    /// Restore invariants after deserialization
    ///
    /// Guarantees at least one process, clamps the current index,
    /// normalises entry text and rederives every risk score.
    pub fn normalized(mut self) -> Self {
        if self.processes.is_empty() {
            warn!("register had no processes; adding a placeholder");
            self.processes.push(Process::new(Process::default_name(1)));
        }
        if self.current_process >= self.processes.len() {
            self.current_process = self.processes.len() - 1;
        }
        for (i, process) in self.processes.iter_mut().enumerate() {
            if process.name.trim().is_empty() {
                process.name = Process::default_name(i + 1);
            }
            process.normalize_entries();
        }
        self
    }

    pub fn set_company_info(&mut self, company: CompanyInfo) {
        info!(company = %company.name, "updated company info");
        self.company = company;
    }

    pub fn set_workplace_info(&mut self, workplace: WorkplaceInfo) {
        info!(eval_date = %workplace.eval_date, "updated workplace info");
        self.workplace = workplace;
    }

    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    pub fn process(&self, index: usize) -> Result<&Process, RegisterError> {
        self.processes.get(index).ok_or(RegisterError::ProcessIndex {
            index,
            len: self.processes.len(),
        })
    }

    pub fn process_mut(&mut self, index: usize) -> Result<&mut Process, RegisterError> {
        let len = self.processes.len();
        self.processes
            .get_mut(index)
            .ok_or(RegisterError::ProcessIndex { index, len })
    }

    pub fn current_index(&self) -> usize {
        self.current_process
    }

    pub fn current_process(&self) -> &Process {
        &self.processes[self.current_process]
    }

    /// Resolve an optional index to the current process when absent
    pub fn resolve_index(&self, index: Option<usize>) -> Result<usize, RegisterError> {
        let index = index.unwrap_or(self.current_process);
        self.process(index).map(|_| index)
    }

    /// Append a process; a blank name gets the numbered placeholder
    pub fn add_process(&mut self, name: Option<String>) -> usize {
        let n = self.processes.len() + 1;
        let name = name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Process::default_name(n));
        info!(process = %name, "added process");
        self.processes.push(Process::new(name));
        self.processes.len() - 1
    }

    /// Remove the last process; the register never drops below one
    pub fn remove_last_process(&mut self) -> Result<Process, RegisterError> {
        if self.processes.len() <= 1 {
            return Err(RegisterError::LastProcess);
        }
        let removed = self.processes.pop().ok_or(RegisterError::LastProcess)?;
        if self.current_process >= self.processes.len() {
            self.current_process = self.processes.len() - 1;
        }
        info!(process = %removed.name, "removed process");
        Ok(removed)
    }

    pub fn select_process(&mut self, index: usize) -> Result<(), RegisterError> {
        self.process(index)?;
        self.current_process = index;
        Ok(())
    }

    pub fn rename_process(&mut self, index: usize, name: &str) -> Result<(), RegisterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegisterError::EmptyName);
        }
        self.process_mut(index)?.name = name.to_string();
        Ok(())
    }

    pub fn set_description(&mut self, index: usize, description: &str) -> Result<(), RegisterError> {
        self.process_mut(index)?.description = description.to_string();
        Ok(())
    }

    /// Replace a process's selection for one category
    pub fn select_hazards(
        &mut self,
        index: usize,
        category: MajorCategory,
        hazards: Vec<String>,
        table: &LookupTable,
    ) -> Result<(), RegisterError> {
        self.process_mut(index)?
            .select_hazards(category, hazards, table.categories_by_major())
    }

    /// Rebuild the entries of a process from its selected hazards
    pub fn regenerate_entries(
        &mut self,
        index: usize,
        table: &LookupTable,
    ) -> Result<Regenerated, RegisterError> {
        let process = self.process_mut(index)?;
        match process.regenerate(table) {
            0 => {
                warn!(process = %process.name, "no hazards selected; entries cleared");
                Ok(Regenerated::NoHazardsSelected)
            }
            n => {
                info!(process = %process.name, entries = n, "regenerated assessment table");
                Ok(Regenerated::Entries(n))
            }
        }
    }

    /// Edit one entry and recompute the process's scores
    ///
    /// An invalid rating rejects the whole edit and keeps the prior values.
    pub fn edit_entry(
        &mut self,
        index: usize,
        entry: usize,
        patch: &EntryPatch,
    ) -> Result<&RiskEntry, RegisterError> {
        self.process_mut(index)?.edit_entry(entry, patch)
    }

    /// Total number of entries across all processes
    pub fn entry_count(&self) -> usize {
        self.processes.iter().map(|p| p.entries().len()).sum()
    }
}
