//! Derived views over the register
//!
//! Neither view is stored; both are recomputed from the entries on demand.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::entities::{AssessmentRegister, RiskEntry, HIGH_RISK_THRESHOLD};

/// One line of the reduction plan (위험성 감소 대책)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReductionItem {
    pub hazard: String,
    pub risk_score: u8,
    pub reduction_plan: String,
    pub target_date: Option<NaiveDate>,
    pub owner: String,
}

impl From<&RiskEntry> for ReductionItem {
    fn from(entry: &RiskEntry) -> Self {
        Self {
            hazard: entry.hazard.clone(),
            risk_score: entry.risk_score(),
            reduction_plan: entry.reduction_plan.clone(),
            target_date: entry.target_date,
            owner: entry.owner.clone(),
        }
    }
}

/// Reduction items of one process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRollup {
    pub process: String,
    pub items: Vec<ReductionItem>,
}

/// Entries scoring at or above the high-risk threshold, in order
pub fn reduction_items(entries: &[RiskEntry]) -> Vec<ReductionItem> {
    entries
        .iter()
        .filter(|e| e.risk_score() >= HIGH_RISK_THRESHOLD)
        .map(ReductionItem::from)
        .collect()
}

/// Reduction plan for every process that has an assessment table
pub fn reduction_rollup(register: &AssessmentRegister) -> Vec<ProcessRollup> {
    register
        .processes()
        .iter()
        .filter(|p| !p.entries().is_empty())
        .map(|p| ProcessRollup {
            process: p.name.clone(),
            items: reduction_items(p.entries()),
        })
        .collect()
}

/// Progress of a planned improvement (개선활동)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImprovementStatus {
    Completed,
    Overdue,
    Scheduled,
    Unscheduled,
}

impl ImprovementStatus {
    pub fn of(entry: &RiskEntry, today: NaiveDate) -> Self {
        match (entry.completion_date, entry.target_date) {
            (Some(_), _) => ImprovementStatus::Completed,
            (None, Some(target)) if target < today => ImprovementStatus::Overdue,
            (None, Some(_)) => ImprovementStatus::Scheduled,
            (None, None) => ImprovementStatus::Unscheduled,
        }
    }
}

impl std::fmt::Display for ImprovementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImprovementStatus::Completed => write!(f, "completed"),
            ImprovementStatus::Overdue => write!(f, "overdue"),
            ImprovementStatus::Scheduled => write!(f, "scheduled"),
            ImprovementStatus::Unscheduled => write!(f, "unscheduled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImprovementItem {
    pub process: String,
    pub hazard: String,
    pub risk_score: u8,
    pub reduction_plan: String,
    pub status: ImprovementStatus,
    pub target_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub owner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImprovementSummary {
    pub items: Vec<ImprovementItem>,
    pub counts: BTreeMap<ImprovementStatus, usize>,
}

impl ImprovementSummary {
    fn from_items(items: Vec<ImprovementItem>) -> Self {
        let mut counts = BTreeMap::new();
        for item in &items {
            *counts.entry(item.status).or_insert(0) += 1;
        }
        Self { items, counts }
    }

    /// Keep only matching items; counts cover the kept items
    pub fn retain(&mut self, keep: impl FnMut(&ImprovementItem) -> bool) {
        let items = std::mem::take(&mut self.items)
            .into_iter()
            .filter(keep)
            .collect();
        *self = Self::from_items(items);
    }
}

/// Track every entry that carries a reduction plan
pub fn improvement_tracking(register: &AssessmentRegister, today: NaiveDate) -> ImprovementSummary {
    let mut items = Vec::new();
    for process in register.processes() {
        for entry in process
            .entries()
            .iter()
            .filter(|e| !e.reduction_plan.trim().is_empty())
        {
            let status = ImprovementStatus::of(entry, today);
            items.push(ImprovementItem {
                process: process.name.clone(),
                hazard: entry.hazard.clone(),
                risk_score: entry.risk_score(),
                reduction_plan: entry.reduction_plan.clone(),
                status,
                target_date: entry.target_date,
                completion_date: entry.completion_date,
                owner: entry.owner.clone(),
            });
        }
    }

    ImprovementSummary::from_items(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Likelihood, MajorCategory, Severity};

    fn rated(hazard: &str, l: Likelihood, s: Severity) -> RiskEntry {
        RiskEntry::new(MajorCategory::Mechanical, hazard, vec![]).with_rating(l, s)
    }

    fn scored_entries() -> Vec<RiskEntry> {
        vec![
            rated("a", Likelihood::Rare, Severity::Moderate),
            rated("b", Likelihood::Moderate, Severity::Serious),
            rated("c", Likelihood::Frequent, Severity::Serious),
            rated("d", Likelihood::VeryFrequent, Severity::Critical),
        ]
    }

    #[test]
    fn test_rollup_keeps_high_scores_in_order() {
        let entries = scored_entries();
        let scores: Vec<u8> = entries.iter().map(|e| e.risk_score()).collect();
        assert_eq!(scores, vec![4, 9, 12, 20]);

        let items = reduction_items(&entries);
        let kept: Vec<(&str, u8)> = items
            .iter()
            .map(|i| (i.hazard.as_str(), i.risk_score))
            .collect();
        assert_eq!(kept, vec![("b", 9), ("c", 12), ("d", 20)]);
    }

    #[test]
    fn test_rollup_skips_processes_without_entries() {
        let mut reg = AssessmentRegister::new();
        reg.add_process(Some("도장".into()));
        reg.process_mut(1).unwrap().set_entries(scored_entries());

        let rollup = reduction_rollup(&reg);
        assert_eq!(rollup.len(), 1);
        assert_eq!(rollup[0].process, "도장");
        assert_eq!(rollup[0].items.len(), 3);
    }

    #[test]
    fn test_improvement_status() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut e = rated("x", Likelihood::Moderate, Severity::Moderate);
        assert_eq!(ImprovementStatus::of(&e, today), ImprovementStatus::Unscheduled);

        e.target_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        assert_eq!(ImprovementStatus::of(&e, today), ImprovementStatus::Scheduled);

        e.target_date = NaiveDate::from_ymd_opt(2026, 4, 30);
        assert_eq!(ImprovementStatus::of(&e, today), ImprovementStatus::Overdue);

        e.completion_date = NaiveDate::from_ymd_opt(2026, 5, 2);
        assert_eq!(ImprovementStatus::of(&e, today), ImprovementStatus::Completed);
    }

    #[test]
    fn test_improvement_tracking_only_planned_entries() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut entries = scored_entries();
        entries[1].reduction_plan = "안전난간 설치".into();
        entries[2].reduction_plan = "인터록".into();
        entries[2].completion_date = NaiveDate::from_ymd_opt(2026, 4, 1);

        let mut reg = AssessmentRegister::new();
        reg.process_mut(0).unwrap().set_entries(entries);

        let summary = improvement_tracking(&reg, today);
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.counts[&ImprovementStatus::Completed], 1);
        assert_eq!(summary.counts[&ImprovementStatus::Unscheduled], 1);
        assert!(!summary.counts.contains_key(&ImprovementStatus::Overdue));
    }

    #[test]
    fn test_retain_recounts_statuses() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let mut entries = scored_entries();
        entries[1].reduction_plan = "안전난간 설치".into();
        entries[2].reduction_plan = "인터록".into();
        entries[2].completion_date = NaiveDate::from_ymd_opt(2026, 4, 1);

        let mut reg = AssessmentRegister::new();
        reg.process_mut(0).unwrap().set_entries(entries);

        let mut summary = improvement_tracking(&reg, today);
        summary.retain(|i| i.status != ImprovementStatus::Completed);
        assert_eq!(summary.items.len(), 1);
        assert!(!summary.counts.contains_key(&ImprovementStatus::Completed));
        assert_eq!(summary.counts[&ImprovementStatus::Unscheduled], 1);
    }
}
