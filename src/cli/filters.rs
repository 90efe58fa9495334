//! CLI-friendly enums and filters

use clap::ValueEnum;

use crate::entities::{ItemList, MajorCategory, RiskBand};

/// CLI-friendly major category enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliCategory {
    /// 기계적 요인
    Mechanical,
    /// 전기적 요인
    Electrical,
    /// 화학적 요인
    Chemical,
    /// 생물학적 요인
    Biological,
    /// 작업특성 요인
    Task,
    /// 작업환경 요인
    Environment,
}

impl From<CliCategory> for MajorCategory {
    fn from(cli: CliCategory) -> Self {
        match cli {
            CliCategory::Mechanical => MajorCategory::Mechanical,
            CliCategory::Electrical => MajorCategory::Electrical,
            CliCategory::Chemical => MajorCategory::Chemical,
            CliCategory::Biological => MajorCategory::Biological,
            CliCategory::Task => MajorCategory::TaskCharacteristic,
            CliCategory::Environment => MajorCategory::WorkEnvironment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliItemList {
    Materials,
    Equipment,
    Chemicals,
}

impl From<CliItemList> for ItemList {
    fn from(cli: CliItemList) -> Self {
        match cli {
            CliItemList::Materials => ItemList::Materials,
            CliItemList::Equipment => ItemList::Equipment,
            CliItemList::Chemicals => ItemList::Chemicals,
        }
    }
}

/// Risk band filter for entry lists
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum BandFilter {
    Low,
    Medium,
    High,
    /// Score at or above the reduction threshold
    Reduce,
    #[default]
    All,
}

impl BandFilter {
    pub fn matches(&self, score: u8) -> bool {
        match self {
            BandFilter::Low => RiskBand::from_score(score) == RiskBand::Low,
            BandFilter::Medium => RiskBand::from_score(score) == RiskBand::Medium,
            BandFilter::High => RiskBand::from_score(score) == RiskBand::High,
            BandFilter::Reduce => score >= crate::entities::HIGH_RISK_THRESHOLD,
            BandFilter::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_filter() {
        assert!(BandFilter::Low.matches(5));
        assert!(BandFilter::Medium.matches(9));
        assert!(BandFilter::Reduce.matches(9));
        assert!(!BandFilter::Reduce.matches(8));
        assert!(BandFilter::High.matches(20));
        assert!(BandFilter::All.matches(1));
    }

    #[test]
    fn test_cli_category_maps_to_major() {
        assert_eq!(
            MajorCategory::from(CliCategory::Task).label(),
            "작업특성 요인"
        );
    }
}
