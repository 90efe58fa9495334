//! Likelihood and severity scales
//!
//! The register uses the 5×4 grading scale: a five-level likelihood
//! (빈도) and a four-level severity (강도). The product is the risk score.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Scores at or above this value are carried into the reduction plan
pub const HIGH_RISK_THRESHOLD: u8 = 9;

/// Errors raised when a value falls outside the fixed scales
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("likelihood must be between 1 and 5, got '{0}'")]
    Likelihood(String),

    #[error("severity must be between 1 and 4, got '{0}'")]
    Severity(String),

    #[error("unknown post-improvement risk '{0}' (expected 낮음, 보통 or 높음)")]
    PostImprovementRisk(String),

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    Date(String),

    #[error("unknown hazard category '{0}'")]
    Category(String),

    #[error("row has {found} columns, expected {expected}")]
    RowWidth { expected: usize, found: usize },
}

/// Split "보통(3)" into ("보통", Some("3")); plain input has no number part
fn split_labelled(s: &str) -> (&str, Option<&str>) {
    let s = s.trim();
    match (s.find('('), s.strip_suffix(')')) {
        (Some(open), Some(body)) => (s[..open].trim(), Some(body[open + 1..].trim())),
        _ => (s, None),
    }
}

/// 가능성(빈도) - how often the hazard leads to harm
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Likelihood {
    VeryRare = 1,
    Rare = 2,
    #[default]
    Moderate = 3,
    Frequent = 4,
    VeryFrequent = 5,
}

impl Likelihood {
    /// Scale from highest to lowest, the order used in pickers
    pub const ALL: [Likelihood; 5] = [
        Likelihood::VeryFrequent,
        Likelihood::Frequent,
        Likelihood::Moderate,
        Likelihood::Rare,
        Likelihood::VeryRare,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Likelihood::VeryRare => "매우가끔",
            Likelihood::Rare => "가끔",
            Likelihood::Moderate => "보통",
            Likelihood::Frequent => "자주",
            Likelihood::VeryFrequent => "매우자주",
        }
    }
}

impl TryFrom<u8> for Likelihood {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Likelihood::VeryRare),
            2 => Ok(Likelihood::Rare),
            3 => Ok(Likelihood::Moderate),
            4 => Ok(Likelihood::Frequent),
            5 => Ok(Likelihood::VeryFrequent),
            other => Err(ValidationError::Likelihood(other.to_string())),
        }
    }
}

impl From<Likelihood> for u8 {
    fn from(l: Likelihood) -> Self {
        l.value()
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.label(), self.value())
    }
}

impl FromStr for Likelihood {
    type Err = ValidationError;

    /// Accepts "3", "보통" or "보통(3)"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ValidationError::Likelihood(s.trim().to_string());
        let (label, number) = split_labelled(s);
        if let Some(n) = number {
            let l = n.parse::<u8>().map_err(|_| err()).and_then(Likelihood::try_from)?;
            return if label.is_empty() || label == l.label() { Ok(l) } else { Err(err()) };
        }
        if let Ok(n) = label.parse::<u8>() {
            return Likelihood::try_from(n).map_err(|_| err());
        }
        Self::ALL.into_iter().find(|l| l.label() == label).ok_or_else(err)
    }
}

/// 중대성(강도) - how bad the harm would be
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Severity {
    Minor = 1,
    #[default]
    Moderate = 2,
    Serious = 3,
    Critical = 4,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Serious,
        Severity::Moderate,
        Severity::Minor,
    ];

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Minor => "양호",
            Severity::Moderate => "보통",
            Severity::Serious => "위험",
            Severity::Critical => "매우위험",
        }
    }
}

impl TryFrom<u8> for Severity {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Severity::Minor),
            2 => Ok(Severity::Moderate),
            3 => Ok(Severity::Serious),
            4 => Ok(Severity::Critical),
            other => Err(ValidationError::Severity(other.to_string())),
        }
    }
}

impl From<Severity> for u8 {
    fn from(s: Severity) -> Self {
        s.value()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.label(), self.value())
    }
}

impl FromStr for Severity {
    type Err = ValidationError;

    /// Accepts "2", "보통" or "보통(2)"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ValidationError::Severity(s.trim().to_string());
        let (label, number) = split_labelled(s);
        if let Some(n) = number {
            let sev = n.parse::<u8>().map_err(|_| err()).and_then(Severity::try_from)?;
            return if label.is_empty() || label == sev.label() { Ok(sev) } else { Err(err()) };
        }
        if let Ok(n) = label.parse::<u8>() {
            return Severity::try_from(n).map_err(|_| err());
        }
        Self::ALL.into_iter().find(|sev| sev.label() == label).ok_or_else(err)
    }
}

/// 개선후 위험성 - residual risk expected once the reduction plan is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PostImprovementRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl PostImprovementRisk {
    pub const ALL: [PostImprovementRisk; 3] = [
        PostImprovementRisk::High,
        PostImprovementRisk::Medium,
        PostImprovementRisk::Low,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PostImprovementRisk::Low => "낮음",
            PostImprovementRisk::Medium => "보통",
            PostImprovementRisk::High => "높음",
        }
    }
}

impl std::fmt::Display for PostImprovementRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for PostImprovementRisk {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "낮음" | "low" => Ok(PostImprovementRisk::Low),
            "보통" | "medium" => Ok(PostImprovementRisk::Medium),
            "높음" | "high" => Ok(PostImprovementRisk::High),
            _ => Err(ValidationError::PostImprovementRisk(s.trim().to_string())),
        }
    }
}

/// Colour band of a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl RiskBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            12..=u8::MAX => RiskBand::High,
            6..=11 => RiskBand::Medium,
            _ => RiskBand::Low,
        }
    }

    /// Cell fill as 0xRRGGBB
    pub fn fill_rgb(self) -> u32 {
        match self {
            RiskBand::High => 0xFF8787,
            RiskBand::Medium => 0xFFD43B,
            RiskBand::Low => 0x51CF66,
        }
    }

    /// High-band cells use white text on the red fill
    pub fn font_rgb(self) -> u32 {
        match self {
            RiskBand::High => 0xFFFFFF,
            _ => 0x000000,
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Medium => write!(f, "medium"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

/// Likelihood × severity
pub fn risk_score(likelihood: Likelihood, severity: Severity) -> u8 {
    likelihood.value() * severity.value()
}
