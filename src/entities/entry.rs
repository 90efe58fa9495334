//! Risk entry - one assessed hazard within a process step

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::category::MajorCategory;
use crate::entities::rating::{
    risk_score, Likelihood, PostImprovementRisk, RiskBand, Severity, ValidationError,
};

/// Line breaks are stored as `\n`
pub fn normalize_newlines(s: &str) -> String {
    if s.contains('\r') {
        s.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        s.to_string()
    }
}

/// Split citations into one trimmed, non-empty citation per line
pub fn normalize_citations<I, S>(citations: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    citations
        .into_iter()
        .flat_map(|c| {
            normalize_newlines(c.as_ref())
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// A row of the risk assessment table (위험성평가표)
///
/// `risk_score` is derived from likelihood and severity and is only written
/// by [`RiskEntry::recompute`]. Text fields use `\n` line breaks and each
/// citation is a single trimmed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskEntry {
    /// Major category the hazard was selected under
    pub category: MajorCategory,

    /// Minor hazard (유해 위험 요인)
    pub hazard: String,

    /// 작업내용
    #[serde(default)]
    pub task_description: String,

    /// 원인
    #[serde(default)]
    pub cause: String,

    /// Regulation citations (관련 법규)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legal_basis: Vec<String>,

    /// 현재상태 및 조치
    #[serde(default)]
    pub current_controls: String,

    #[serde(default)]
    pub likelihood: Likelihood,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default)]
    risk_score: u8,

    /// 감소 대책
    #[serde(default)]
    pub reduction_plan: String,

    #[serde(default)]
    pub post_improvement_risk: PostImprovementRisk,

    /// 개선 예정일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,

    /// 완료일
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<NaiveDate>,

    /// 담당자
    #[serde(default)]
    pub owner: String,

    /// 비고
    #[serde(default)]
    pub note: String,
}

impl RiskEntry {
    /// New entry with the default 보통/보통 rating
    pub fn new(category: MajorCategory, hazard: impl Into<String>, legal_basis: Vec<String>) -> Self {
        Self {
            category,
            hazard: hazard.into(),
            task_description: String::new(),
            cause: String::new(),
            legal_basis: normalize_citations(legal_basis),
            current_controls: String::new(),
            likelihood: Likelihood::default(),
            severity: Severity::default(),
            risk_score: 0,
            reduction_plan: String::new(),
            post_improvement_risk: PostImprovementRisk::default(),
            target_date: None,
            completion_date: None,
            owner: String::new(),
            note: String::new(),
        }
        .recompute()
    }

    /// Set the rating and recompute the score
    pub fn with_rating(mut self, likelihood: Likelihood, severity: Severity) -> Self {
        self.likelihood = likelihood;
        self.severity = severity;
        self.recompute()
    }

    /// Return the entry with `risk_score` rederived from the current rating
    pub fn recompute(mut self) -> Self {
        self.risk_score = risk_score(self.likelihood, self.severity);
        self
    }

    pub(crate) fn recompute_in_place(&mut self) {
        self.risk_score = risk_score(self.likelihood, self.severity);
    }

    pub fn risk_score(&self) -> u8 {
        self.risk_score
    }

    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score)
    }

    pub(crate) fn normalize_text(&mut self) {
        self.legal_basis = normalize_citations(&self.legal_basis);
        for field in [
            &mut self.task_description,
            &mut self.cause,
            &mut self.current_controls,
            &mut self.reduction_plan,
            &mut self.owner,
            &mut self.note,
        ] {
            *field = normalize_newlines(field);
        }
    }

    /// Citations joined for display, one per line
    pub fn legal_basis_text(&self) -> String {
        self.legal_basis.join("\n")
    }
}

/// A partial update to the editable fields of a [`RiskEntry`]
///
/// Category, hazard and score are not editable. Likelihood and severity are
/// carried as raw grades and checked before anything is applied, so a
/// rejected patch leaves the entry untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub task_description: Option<String>,
    pub cause: Option<String>,
    pub legal_basis: Option<Vec<String>>,
    pub current_controls: Option<String>,
    pub likelihood: Option<u8>,
    pub severity: Option<u8>,
    pub reduction_plan: Option<String>,
    pub post_improvement_risk: Option<PostImprovementRisk>,
    /// `Some(None)` clears the date
    pub target_date: Option<Option<NaiveDate>>,
    pub completion_date: Option<Option<NaiveDate>>,
    pub owner: Option<String>,
    pub note: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate, then apply to `entry`. The score is not touched here; the
    /// owning process recomputes all of its entries afterwards. Text is
    /// normalised the same way as entries read from disk.
    pub fn apply(&self, entry: &mut RiskEntry) -> Result<(), ValidationError> {
        let likelihood = self.likelihood.map(Likelihood::try_from).transpose()?;
        let severity = self.severity.map(Severity::try_from).transpose()?;

        if let Some(l) = likelihood {
            entry.likelihood = l;
        }
        if let Some(s) = severity {
            entry.severity = s;
        }
        if let Some(ref v) = self.task_description {
            entry.task_description = normalize_newlines(v);
        }
        if let Some(ref v) = self.cause {
            entry.cause = normalize_newlines(v);
        }
        if let Some(ref v) = self.legal_basis {
            entry.legal_basis = normalize_citations(v);
        }
        if let Some(ref v) = self.current_controls {
            entry.current_controls = normalize_newlines(v);
        }
        if let Some(ref v) = self.reduction_plan {
            entry.reduction_plan = normalize_newlines(v);
        }
        if let Some(v) = self.post_improvement_risk {
            entry.post_improvement_risk = v;
        }
        if let Some(v) = self.target_date {
            entry.target_date = v;
        }
        if let Some(v) = self.completion_date {
            entry.completion_date = v;
        }
        if let Some(ref v) = self.owner {
            entry.owner = normalize_newlines(v);
        }
        if let Some(ref v) = self.note {
            entry.note = normalize_newlines(v);
        }
        Ok(())
    }
}
