//! Hazard classification
//!
//! Major categories follow the six-way split used by the Korean occupational
//! safety regulation tables (산업안전보건기준). Minor categories are free text
//! and come from the regulation lookup table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Major hazard category - top level of the classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum MajorCategory {
    /// 기계(설비)적 요인 - crushing, cutting, entanglement, falling objects
    #[default]
    Mechanical,
    /// 전기적 요인 - shock, arc flash, static
    Electrical,
    /// 화학(물질)적 요인 - toxic, corrosive, flammable substances
    Chemical,
    /// 생물학적 요인 - pathogens, animal and plant hazards
    Biological,
    /// 작업특성 요인 - noise, posture, heavy lifting, shift work
    TaskCharacteristic,
    /// 작업환경 요인 - heat, cold, lighting, confined spaces
    WorkEnvironment,
}

impl MajorCategory {
    /// All categories in their fixed presentation order
    pub const ALL: [MajorCategory; 6] = [
        MajorCategory::Mechanical,
        MajorCategory::Electrical,
        MajorCategory::Chemical,
        MajorCategory::Biological,
        MajorCategory::TaskCharacteristic,
        MajorCategory::WorkEnvironment,
    ];

    /// Label as it appears in the regulation table and in reports
    pub fn label(&self) -> &'static str {
        match self {
            MajorCategory::Mechanical => "기계(설비)적 요인",
            MajorCategory::Electrical => "전기적 요인",
            MajorCategory::Chemical => "화학(물질)적 요인",
            MajorCategory::Biological => "생물학적 요인",
            MajorCategory::TaskCharacteristic => "작업특성 요인",
            MajorCategory::WorkEnvironment => "작업환경 요인",
        }
    }

    /// Match an exact table label
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for MajorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for MajorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(category) = Self::from_label(s) {
            return Ok(category);
        }
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "mechanical" | "mech" | "기계" => Ok(MajorCategory::Mechanical),
            "electrical" | "electric" | "전기" => Ok(MajorCategory::Electrical),
            "chemical" | "chem" | "화학" => Ok(MajorCategory::Chemical),
            "biological" | "bio" | "생물" => Ok(MajorCategory::Biological),
            "task_characteristic" | "task" | "ergonomic" | "작업특성" => {
                Ok(MajorCategory::TaskCharacteristic)
            }
            "work_environment" | "environment" | "env" | "작업환경" => {
                Ok(MajorCategory::WorkEnvironment)
            }
            _ => Err(format!("Unknown hazard category: {}", s)),
        }
    }
}

/// Minor hazards observed per major category
///
/// Derived from the regulation rows; every major category is always present
/// as a key, possibly with an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardCategorySet {
    groups: BTreeMap<MajorCategory, BTreeSet<String>>,
}

impl Default for HazardCategorySet {
    fn default() -> Self {
        Self {
            groups: MajorCategory::ALL
                .into_iter()
                .map(|c| (c, BTreeSet::new()))
                .collect(),
        }
    }
}

impl HazardCategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, category: MajorCategory, hazard: impl Into<String>) {
        self.groups.entry(category).or_default().insert(hazard.into());
    }

    /// Minor hazards for a category
    pub fn hazards(&self, category: MajorCategory) -> &BTreeSet<String> {
        // Every category is inserted at construction
        &self.groups[&category]
    }

    pub fn contains(&self, category: MajorCategory, hazard: &str) -> bool {
        self.hazards(category).contains(hazard)
    }

    /// True when no category has any hazard
    pub fn is_empty(&self) -> bool {
        self.groups.values().all(BTreeSet::is_empty)
    }

    /// Total number of distinct (category, hazard) pairs
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MajorCategory, &BTreeSet<String>)> {
        self.groups.iter().map(|(c, h)| (*c, h))
    }
}
